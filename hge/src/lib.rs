//! Safe host-facing interface to the engine.
//!
//! [`Hge`] owns an engine instance and exposes the lifecycle calls, the typed
//! system-state accessors and the state-function registration. Handlers
//! registered through [`Hge::set_state_func`] are plain Rust functions; the
//! engine-facing trampoline wiring lives in the `hge_callback_glue` crate.

extern crate failure;
extern crate hge_callback_glue;
extern crate hge_sys;

#[macro_use]
extern crate log;

pub mod timer;

use std::ffi::{CStr, CString};

use failure::{err_msg, Error};

pub use hge_callback_glue::StateFunc;
pub use hge_sys::{BoolState, FuncState, IntState, StringState};
pub use hge_sys::{FPS_UNLIMITED, FPS_VSYNC, VERSION};

//==================================================================================================
// Hge
//==================================================================================================
//
/// Owning wrapper around an engine instance.
///
/// The handle is allocated by the engine and released again when this value
/// drops. Everything in between passes it through unchanged.
pub struct Hge {
    pub(crate) handle: *mut hge_sys::HGE_t,
}

impl Hge {
    /// Creates a new engine instance.
    pub fn new() -> Hge {
        let handle = unsafe { hge_sys::HGE_Create(hge_sys::VERSION) };
        info!("Created engine instance (interface version {:#x})", hge_sys::VERSION);
        Hge { handle }
    }

    /// Initializes hardware and software needed to run the engine.
    pub fn system_initiate(&self) -> Result<(), Error> {
        if unsafe { hge_sys::HGE_System_Initiate(self.handle) } == hge_sys::FALSE {
            return Err(err_msg(format!(
                "Could not initiate engine: {}",
                self.error_message()
            )));
        }
        Ok(())
    }

    /// Hands control to the engine's run loop. The engine keeps invoking the
    /// registered frame handler (and the render handler, if any) until the
    /// frame handler returns `true`.
    pub fn system_start(&self) -> Result<(), Error> {
        if unsafe { hge_sys::HGE_System_Start(self.handle) } == hge_sys::FALSE {
            return Err(err_msg(format!(
                "Could not start engine run loop: {}",
                self.error_message()
            )));
        }
        Ok(())
    }

    /// Restores the video mode and frees engine-allocated resources.
    pub fn system_shutdown(&self) {
        unsafe { hge_sys::HGE_System_Shutdown(self.handle) };
    }

    /// Last error description reported by the engine.
    pub fn error_message(&self) -> String {
        let message = unsafe { hge_sys::HGE_System_GetErrorMessage(self.handle) };
        if message.is_null() {
            return String::new();
        }
        unsafe { CStr::from_ptr(message) }
            .to_string_lossy()
            .into_owned()
    }

    //----------------------------------------------------------------------------------------------
    // State functions

    /// Registers `func` as the handler for the given state-function slot and
    /// installs that slot's trampoline in the engine. Passing `None` clears
    /// the slot on both sides.
    ///
    /// The engine requires a frame handler before [`system_start`]; all other
    /// slots are optional.
    ///
    /// [`system_start`]: #method.system_start
    pub fn set_state_func(&self, which: FuncState, func: Option<StateFunc>) {
        hge_callback_glue::store_state_func(which, func);

        if func.is_none() {
            debug!("Cleared the {:?} state function", which);
            unsafe { hge_callback_glue::clear_state_func(self.handle, which) };
            return;
        }

        debug!("Installing trampoline for the {:?} state function", which);
        unsafe {
            match which {
                FuncState::Frame => hge_callback_glue::set_frame_func(self.handle, which),
                FuncState::Render => hge_callback_glue::set_render_func(self.handle, which),
                FuncState::FocusLost => hge_callback_glue::set_focus_lost_func(self.handle, which),
                FuncState::FocusGain => hge_callback_glue::set_focus_gain_func(self.handle, which),
                FuncState::GfxRestore => {
                    hge_callback_glue::set_gfx_restore_func(self.handle, which)
                }
                FuncState::Exit => hge_callback_glue::set_exit_func(self.handle, which),
            }
        }
    }

    /// The handler currently registered for `which`.
    // NOTE: The engine-side slot holds a trampoline, not the handler, so
    //       this reads back from the host table.
    pub fn state_func(&self, which: FuncState) -> Option<StateFunc> {
        hge_callback_glue::state_func(which)
    }

    //----------------------------------------------------------------------------------------------
    // Typed system states

    /// Sets a boolean system state.
    pub fn set_state_bool(&self, which: BoolState, value: bool) {
        let value = if value { hge_sys::TRUE } else { hge_sys::FALSE };
        unsafe { hge_sys::HGE_System_SetStateBool(self.handle, which, value) };
    }

    /// Sets an integer system state.
    pub fn set_state_int(&self, which: IntState, value: i32) {
        unsafe { hge_sys::HGE_System_SetStateInt(self.handle, which, value) };
    }

    /// Sets a string system state. The engine copies the value.
    pub fn set_state_string(&self, which: StringState, value: &str) {
        let value = CString::new(value).unwrap_or_default();
        unsafe { hge_sys::HGE_System_SetStateString(self.handle, which, value.as_ptr()) };
    }

    /// Reads a boolean system state back from the engine.
    pub fn state_bool(&self, which: BoolState) -> bool {
        (unsafe { hge_sys::HGE_System_GetStateBool(self.handle, which) }) != hge_sys::FALSE
    }

    /// Reads an integer system state back from the engine.
    pub fn state_int(&self, which: IntState) -> i32 {
        unsafe { hge_sys::HGE_System_GetStateInt(self.handle, which) }
    }

    /// Reads a string system state back from the engine. An unset state
    /// reads as the empty string.
    pub fn state_string(&self, which: StringState) -> String {
        let value = unsafe { hge_sys::HGE_System_GetStateString(self.handle, which) };
        if value.is_null() {
            return String::new();
        }
        unsafe { CStr::from_ptr(value) }
            .to_string_lossy()
            .into_owned()
    }
}

impl Drop for Hge {
    fn drop(&mut self) {
        unsafe { hge_sys::HGE_Release(self.handle) };
    }
}

//==================================================================================================
// Tests
//==================================================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_states_round_trip_through_the_engine() {
        let hge = Hge::new();

        hge.set_state_bool(BoolState::Windowed, true);
        hge.set_state_bool(BoolState::UseSound, false);
        hge.set_state_int(IntState::ScreenWidth, 800);
        hge.set_state_int(IntState::Fps, FPS_UNLIMITED);
        hge.set_state_string(StringState::Title, "Typed state check");

        assert!(hge.state_bool(BoolState::Windowed));
        assert!(!hge.state_bool(BoolState::UseSound));
        assert_eq!(hge.state_int(IntState::ScreenWidth), 800);
        assert_eq!(hge.state_int(IntState::Fps), FPS_UNLIMITED);
        assert_eq!(hge.state_string(StringState::Title), "Typed state check");
        assert_eq!(hge.state_string(StringState::LogFile), "");
    }

    fn noop_handler() -> bool {
        false
    }

    #[test]
    fn state_func_registration_installs_and_clears_the_engine_slot() {
        let hge = Hge::new();

        hge.set_state_func(FuncState::Frame, Some(noop_handler));
        assert_eq!(
            hge.state_func(FuncState::Frame).map(|f| f as usize),
            Some(noop_handler as usize)
        );
        unsafe {
            assert!((*hge.handle).state_func(FuncState::Frame).is_some());
        }

        hge.set_state_func(FuncState::Frame, None);
        assert!(hge.state_func(FuncState::Frame).is_none());
        unsafe {
            assert!((*hge.handle).state_func(FuncState::Frame).is_none());
        }
    }

    #[test]
    fn engine_failures_surface_the_engine_error_message() {
        let hge = Hge::new();
        hge.system_initiate().unwrap();

        // No frame handler registered on this handle.
        let error = hge.system_start().unwrap_err();
        assert!(format!("{}", error).contains("Frame function"));
    }
}
