//! Raw C interface of the engine (`hge-unix-c`).
//!
//! Everything in here mirrors the engine's own header one to one: the opaque
//! instance handle, the state selector enumerations, the callback signature
//! for the state-function slots and the foreign entry points themselves. No
//! validation and no translation happens on this level.
//!
//! With the `fake-engine` feature (and in this crate's own tests) the foreign
//! declarations are swapped for the in-process stand-in from the `fake`
//! module, which has the same names and signatures but records everything it
//! is handed.

#![allow(non_camel_case_types)]
#![allow(non_snake_case)]

extern crate libc;

use libc::c_int;

/// The engine's C boolean.
pub type Bool = c_int;
pub const TRUE: Bool = 1;
pub const FALSE: Bool = 0;

/// Engine interface version this binding was written against.
pub const VERSION: c_int = 0x181;

/// Fixed FPS special values for `IntState::Fps`.
pub const FPS_UNLIMITED: c_int = 0;
pub const FPS_VSYNC: c_int = -1;

/// Callback signature the engine requires for every state-function slot:
/// no arguments, boolean result, nullable ("no handler installed").
pub type StateCallback = Option<unsafe extern "C" fn() -> Bool>;

/// Opaque engine instance. Allocated and owned by the engine itself; this
/// binding only ever passes it through.
#[cfg(not(any(test, feature = "fake-engine")))]
#[repr(C)]
pub struct HGE_t {
    _opaque: [u8; 0],
}

//==================================================================================================
// State selectors
//==================================================================================================
//
// Discriminants are the values from the engine header and go over the wire
// unchanged; the engine itself decides what to do with an unknown one.

/// Boolean system states.
#[repr(C)]
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum BoolState {
    Windowed = 1,      // run in window? (default: false)
    ZBuffer = 2,       // use z-buffer? (default: false)
    TextureFilter = 3, // texture filtering? (default: true)
    UseSound = 4,      // use sound? (default: true)
    DontSuspend = 5,   // focus lost: suspend? (default: false)
    HideMouse = 6,     // hide system cursor? (default: true)
    ShowSplash = 7,    // show splash? (default: true)
}

/// State-function slots. Frame is the one the engine insists on having
/// before its run loop starts; the rest are optional.
#[repr(C)]
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum FuncState {
    Frame = 8,
    Render = 9,
    FocusLost = 10,
    FocusGain = 11,
    GfxRestore = 12,
    Exit = 13,
}

impl FuncState {
    /// Number of state-function slots.
    pub const COUNT: usize = 6;

    /// Zero-based table index for this slot.
    pub fn index(self) -> usize {
        self as usize - FuncState::Frame as usize
    }
}

/// Integer system states.
#[repr(C)]
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum IntState {
    ScreenWidth = 17,  // screen width (default: 800)
    ScreenHeight = 18, // screen height (default: 600)
    ScreenBpp = 19,    // screen bitdepth (default: 32)
    SampleRate = 20,   // sample rate (default: 44100)
    FxVolume = 21,     // global fx volume (default: 100)
    MusVolume = 22,    // global music volume (default: 100)
    StreamVolume = 23, // stream music volume (default: 100)
    Fps = 24,          // fixed fps (default: FPS_UNLIMITED)
    PowerStatus = 25,  // battery life percent + status: read only
}

/// String system states.
#[repr(C)]
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum StringState {
    Icon = 26,    // icon resource (default: none)
    Title = 27,   // window title (default: "HGE")
    IniFile = 28, // ini file (default: none)
    LogFile = 29, // log file (default: none)
}

//==================================================================================================
// Foreign entry points
//==================================================================================================

#[cfg(not(any(test, feature = "fake-engine")))]
mod ffi {
    use libc::{c_char, c_float, c_int};

    use super::{Bool, BoolState, FuncState, HGE_t, IntState, StateCallback, StringState};

    #[link(name = "hge-unix-c")]
    extern "C" {
        pub fn HGE_Create(ver: c_int) -> *mut HGE_t;
        pub fn HGE_Release(hge: *mut HGE_t);

        pub fn HGE_System_Initiate(hge: *mut HGE_t) -> Bool;
        pub fn HGE_System_Shutdown(hge: *mut HGE_t);
        pub fn HGE_System_Start(hge: *mut HGE_t) -> Bool;
        pub fn HGE_System_GetErrorMessage(hge: *mut HGE_t) -> *const c_char;

        /// The engine's "set state function" primitive: installs `value` as
        /// the handler for the `state` slot.
        pub fn HGE_System_SetStateFunc(hge: *mut HGE_t, state: FuncState, value: StateCallback);
        pub fn HGE_System_SetStateBool(hge: *mut HGE_t, state: BoolState, value: Bool);
        pub fn HGE_System_SetStateInt(hge: *mut HGE_t, state: IntState, value: c_int);
        pub fn HGE_System_SetStateString(hge: *mut HGE_t, state: StringState, value: *const c_char);

        pub fn HGE_System_GetStateBool(hge: *mut HGE_t, state: BoolState) -> Bool;
        pub fn HGE_System_GetStateInt(hge: *mut HGE_t, state: IntState) -> c_int;
        pub fn HGE_System_GetStateString(hge: *mut HGE_t, state: StringState) -> *const c_char;

        pub fn HGE_Timer_GetTime(hge: *mut HGE_t) -> c_float;
        pub fn HGE_Timer_GetDelta(hge: *mut HGE_t) -> c_float;
        pub fn HGE_Timer_GetFPS(hge: *mut HGE_t) -> c_int;
    }
}

#[cfg(not(any(test, feature = "fake-engine")))]
pub use ffi::*;

#[cfg(any(test, feature = "fake-engine"))]
mod fake;

#[cfg(any(test, feature = "fake-engine"))]
pub use fake::*;

//==================================================================================================
// Tests
//==================================================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selector_discriminants_match_the_engine_header() {
        assert_eq!(BoolState::Windowed as c_int, 1);
        assert_eq!(BoolState::ShowSplash as c_int, 7);
        assert_eq!(FuncState::Frame as c_int, 8);
        assert_eq!(FuncState::Exit as c_int, 13);
        assert_eq!(IntState::ScreenWidth as c_int, 17);
        assert_eq!(StringState::LogFile as c_int, 29);
    }

    #[test]
    fn func_state_indices_are_dense_and_zero_based() {
        assert_eq!(FuncState::Frame.index(), 0);
        assert_eq!(FuncState::Render.index(), 1);
        assert_eq!(FuncState::Exit.index(), FuncState::COUNT - 1);
    }

    unsafe extern "C" fn stop_immediately() -> Bool {
        TRUE
    }

    #[test]
    fn fake_engine_refuses_to_start_without_initiate() {
        unsafe {
            let hge = HGE_Create(VERSION);
            HGE_System_SetStateFunc(hge, FuncState::Frame, Some(stop_immediately));
            assert_eq!(HGE_System_Start(hge), FALSE);

            let msg = std::ffi::CStr::from_ptr(HGE_System_GetErrorMessage(hge));
            assert!(msg.to_string_lossy().contains("not initiated"));
            HGE_Release(hge);
        }
    }

    #[test]
    fn fake_engine_refuses_to_start_without_frame_function() {
        unsafe {
            let hge = HGE_Create(VERSION);
            assert_eq!(HGE_System_Initiate(hge), TRUE);
            assert_eq!(HGE_System_Start(hge), FALSE);

            let msg = std::ffi::CStr::from_ptr(HGE_System_GetErrorMessage(hge));
            assert!(msg.to_string_lossy().contains("Frame function"));
            HGE_Release(hge);
        }
    }

    #[test]
    fn fake_engine_records_each_registration() {
        unsafe {
            let hge = HGE_Create(VERSION);
            assert_eq!((*hge).registrations(FuncState::Exit), 0);

            HGE_System_SetStateFunc(hge, FuncState::Exit, Some(stop_immediately));
            HGE_System_SetStateFunc(hge, FuncState::Exit, Some(stop_immediately));
            assert_eq!((*hge).registrations(FuncState::Exit), 2);
            assert_eq!((*hge).fire(FuncState::Exit), Some(TRUE));

            HGE_System_SetStateFunc(hge, FuncState::Exit, None);
            assert!((*hge).state_func(FuncState::Exit).is_none());
            HGE_Release(hge);
        }
    }
}
