//! Engine timer queries.

use crate::Hge;

impl Hge {
    /// Time in seconds since the engine's run loop started.
    pub fn timer_time(&self) -> f32 {
        unsafe { hge_sys::HGE_Timer_GetTime(self.handle) }
    }

    /// Time in seconds the last frame took.
    pub fn timer_delta(&self) -> f32 {
        unsafe { hge_sys::HGE_Timer_GetDelta(self.handle) }
    }

    /// Current frames per second.
    pub fn timer_fps(&self) -> i32 {
        unsafe { hge_sys::HGE_Timer_GetFPS(self.handle) }
    }
}
