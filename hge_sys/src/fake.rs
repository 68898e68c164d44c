//! In-process stand-in for the engine.
//!
//! Exposes the exact function names and signatures of the foreign interface,
//! but backed by a plain struct instead of the real engine, so that the
//! callback wiring can be exercised without linking the native library. The
//! handle records every registration it receives and its run loop ticks a
//! deterministic 10 ms timer.

use std::collections::HashMap;
use std::ffi::{CStr, CString};
use std::ptr;

use libc::{c_char, c_float, c_int};

use crate::{Bool, BoolState, FuncState, IntState, StateCallback, StringState, FALSE, TRUE};

const TICK_SECONDS: c_float = 0.01;

/// Fake engine instance. The real handle is opaque; this one is a plain
/// struct so tests can inspect the callback-slot table directly.
pub struct HGE_t {
    initiated: bool,
    func_slots: [StateCallback; FuncState::COUNT],
    func_registrations: [usize; FuncState::COUNT],
    bool_states: HashMap<c_int, Bool>,
    int_states: HashMap<c_int, c_int>,
    string_states: HashMap<c_int, CString>,
    time: c_float,
    delta: c_float,
    last_error: CString,
}

impl HGE_t {
    fn new() -> HGE_t {
        HGE_t {
            initiated: false,
            func_slots: [None; FuncState::COUNT],
            func_registrations: [0; FuncState::COUNT],
            bool_states: HashMap::new(),
            int_states: HashMap::new(),
            string_states: HashMap::new(),
            time: 0.0,
            delta: 0.0,
            last_error: CString::default(),
        }
    }

    fn set_error(&mut self, message: &str) {
        self.last_error = CString::new(message).unwrap_or_default();
    }

    /// The callback currently installed for `which`.
    pub fn state_func(&self, which: FuncState) -> StateCallback {
        self.func_slots[which.index()]
    }

    /// How many times `HGE_System_SetStateFunc` was called for `which`.
    pub fn registrations(&self, which: FuncState) -> usize {
        self.func_registrations[which.index()]
    }

    /// Invokes the callback installed for `which`, as the engine's own event
    /// dispatch would, and returns its result.
    pub fn fire(&self, which: FuncState) -> Option<Bool> {
        self.func_slots[which.index()].map(|func| unsafe { func() })
    }
}

pub unsafe extern "C" fn HGE_Create(_ver: c_int) -> *mut HGE_t {
    Box::into_raw(Box::new(HGE_t::new()))
}

pub unsafe extern "C" fn HGE_Release(hge: *mut HGE_t) {
    if !hge.is_null() {
        drop(Box::from_raw(hge));
    }
}

pub unsafe extern "C" fn HGE_System_Initiate(hge: *mut HGE_t) -> Bool {
    (*hge).initiated = true;
    TRUE
}

pub unsafe extern "C" fn HGE_System_Shutdown(hge: *mut HGE_t) {
    (*hge).initiated = false;
}

/// Run loop of the stand-in: advance the timer, invoke the frame callback,
/// stop once it returns `TRUE`, otherwise invoke the render callback.
pub unsafe extern "C" fn HGE_System_Start(hge: *mut HGE_t) -> Bool {
    if !(*hge).initiated {
        (*hge).set_error("System_Start: System is not initiated");
        return FALSE;
    }
    let frame = match (*hge).func_slots[FuncState::Frame.index()] {
        Some(func) => func,
        None => {
            (*hge).set_error("System_Start: Frame function is not assigned");
            return FALSE;
        }
    };

    loop {
        (*hge).delta = TICK_SECONDS;
        (*hge).time += TICK_SECONDS;

        // NOTE: No borrow of the handle may be live across these calls, the
        //       callbacks are free to reenter through the same handle.
        if frame() != FALSE {
            break;
        }
        if let Some(render) = (*hge).func_slots[FuncState::Render.index()] {
            render();
        }
    }

    TRUE
}

pub unsafe extern "C" fn HGE_System_GetErrorMessage(hge: *mut HGE_t) -> *const c_char {
    (*hge).last_error.as_ptr()
}

pub unsafe extern "C" fn HGE_System_SetStateFunc(hge: *mut HGE_t, state: FuncState, value: StateCallback) {
    (*hge).func_slots[state.index()] = value;
    (*hge).func_registrations[state.index()] += 1;
}

pub unsafe extern "C" fn HGE_System_SetStateBool(hge: *mut HGE_t, state: BoolState, value: Bool) {
    (*hge).bool_states.insert(state as c_int, value);
}

pub unsafe extern "C" fn HGE_System_SetStateInt(hge: *mut HGE_t, state: IntState, value: c_int) {
    (*hge).int_states.insert(state as c_int, value);
}

pub unsafe extern "C" fn HGE_System_SetStateString(hge: *mut HGE_t, state: StringState, value: *const c_char) {
    if value.is_null() {
        (*hge).string_states.remove(&(state as c_int));
    } else {
        let copy = CStr::from_ptr(value).to_owned();
        (*hge).string_states.insert(state as c_int, copy);
    }
}

pub unsafe extern "C" fn HGE_System_GetStateBool(hge: *mut HGE_t, state: BoolState) -> Bool {
    *(*hge).bool_states.get(&(state as c_int)).unwrap_or(&FALSE)
}

pub unsafe extern "C" fn HGE_System_GetStateInt(hge: *mut HGE_t, state: IntState) -> c_int {
    *(*hge).int_states.get(&(state as c_int)).unwrap_or(&0)
}

pub unsafe extern "C" fn HGE_System_GetStateString(hge: *mut HGE_t, state: StringState) -> *const c_char {
    match (*hge).string_states.get(&(state as c_int)) {
        Some(value) => value.as_ptr(),
        None => ptr::null(),
    }
}

pub unsafe extern "C" fn HGE_Timer_GetTime(hge: *mut HGE_t) -> c_float {
    (*hge).time
}

pub unsafe extern "C" fn HGE_Timer_GetDelta(hge: *mut HGE_t) -> c_float {
    (*hge).delta
}

pub unsafe extern "C" fn HGE_Timer_GetFPS(hge: *mut HGE_t) -> c_int {
    if (*hge).delta > 0.0 {
        (1.0 / (*hge).delta).round() as c_int
    } else {
        0
    }
}
