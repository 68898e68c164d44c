//! This crate's whole purpose is to install fixed trampoline functions as the
//! engine's state-function callbacks and to forward their invocations to the
//! handlers registered on the host side.
//!
//! # Problem
//!
//! The engine is a precompiled native library. Its run loop invokes the
//! installed state functions through plain C function pointers with a fixed
//! signature (no arguments, boolean result). Such a pointer can carry no
//! state, so the engine can never call a Rust closure directly, and handing
//! it the address of an arbitrary user function would tie the foreign-call
//! contract to whatever the user happens to register.
//!
//! # Workaround using this crate
//!
//! For every state-function slot there is exactly one statically-known
//! `extern "C"` trampoline. Its only job is to forward into the matching
//! host entry point and hand the boolean result back to the engine
//! unchanged. The entry points dispatch through a process-wide handler
//! table that [`store_state_func`] fills in before the engine's run loop
//! starts.
//!
//! The registrars ([`set_frame_func`] and friends) are the only place where
//! a function pointer crosses over to the engine, and each of them is fixed
//! at compile time to exactly one trampoline. Keeping six enumerated
//! trampolines instead of one generic dispatch table means the pointer
//! handed to the engine is always a compile-time constant, never data.
//!
//! # Problems of the workaround
//!
//! The handler table is process-wide, exactly like the engine's own callback
//! table behind it. Two engine instances in one process would share their
//! host handlers. The original binding this is modeled on has the same
//! restriction, and the engine itself is single-instance in practice.

#[macro_use]
extern crate log;
extern crate hge_sys;

use std::sync::RwLock;

use hge_sys::{Bool, FuncState, HGE_System_SetStateFunc, HGE_t, FALSE, TRUE};

/// Host-side handler type for all state-function slots.
pub type StateFunc = fn() -> bool;

static FUNC_CBS: RwLock<[Option<StateFunc>; FuncState::COUNT]> =
    RwLock::new([None; FuncState::COUNT]);

/// Registers `func` as the host handler for the `which` slot. Does not touch
/// the engine; installing the trampoline on the engine side is the
/// registrars' job.
pub fn store_state_func(which: FuncState, func: Option<StateFunc>) {
    let mut cbs = FUNC_CBS
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    cbs[which.index()] = func;
}

/// The host handler currently registered for `which`.
pub fn state_func(which: FuncState) -> Option<StateFunc> {
    let cbs = FUNC_CBS
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    cbs[which.index()]
}

fn dispatch(which: FuncState) -> bool {
    match state_func(which) {
        Some(func) => func(),
        None => {
            // NOTE: We are inside an `extern "C"` frame here, so this must
            //       never panic. An empty slot reports "keep running".
            warn!("Engine invoked the {:?} slot but no handler is registered", which);
            false
        }
    }
}

//==================================================================================================
// Host entry points
//==================================================================================================
//
// One per slot, each reading its own entry of the handler table. These are
// what the trampolines resolve to.

fn frame_func() -> bool {
    dispatch(FuncState::Frame)
}

fn render_func() -> bool {
    dispatch(FuncState::Render)
}

fn focus_lost_func() -> bool {
    dispatch(FuncState::FocusLost)
}

fn focus_gain_func() -> bool {
    dispatch(FuncState::FocusGain)
}

fn gfx_restore_func() -> bool {
    dispatch(FuncState::GfxRestore)
}

fn exit_func() -> bool {
    dispatch(FuncState::Exit)
}

//==================================================================================================
// Trampolines
//==================================================================================================
//
// Zero arguments, boolean result, no captured state: exactly the callback
// signature the engine dispatches through. Each forwards unconditionally to
// its host entry point and returns that result unchanged.

pub extern "C" fn frame_func_trampoline() -> Bool {
    if frame_func() {
        TRUE
    } else {
        FALSE
    }
}

pub extern "C" fn render_func_trampoline() -> Bool {
    if render_func() {
        TRUE
    } else {
        FALSE
    }
}

pub extern "C" fn focus_lost_func_trampoline() -> Bool {
    if focus_lost_func() {
        TRUE
    } else {
        FALSE
    }
}

pub extern "C" fn focus_gain_func_trampoline() -> Bool {
    if focus_gain_func() {
        TRUE
    } else {
        FALSE
    }
}

pub extern "C" fn gfx_restore_func_trampoline() -> Bool {
    if gfx_restore_func() {
        TRUE
    } else {
        FALSE
    }
}

pub extern "C" fn exit_func_trampoline() -> Bool {
    if exit_func() {
        TRUE
    } else {
        FALSE
    }
}

//==================================================================================================
// Registrars
//==================================================================================================
//
// One per slot. Each performs exactly one write into the engine's callback
// table, installing its own trampoline for the selector it is handed.

/// Installs the frame trampoline as the engine's handler for `which`.
///
/// # Safety
///
/// `hge` must be a live engine handle. The selector is passed through to the
/// engine unvalidated, like everything else on this level.
pub unsafe fn set_frame_func(hge: *mut HGE_t, which: FuncState) {
    HGE_System_SetStateFunc(hge, which, Some(frame_func_trampoline));
}

/// Installs the render trampoline as the engine's handler for `which`.
///
/// # Safety
///
/// Same contract as [`set_frame_func`].
pub unsafe fn set_render_func(hge: *mut HGE_t, which: FuncState) {
    HGE_System_SetStateFunc(hge, which, Some(render_func_trampoline));
}

/// Installs the focus-lost trampoline as the engine's handler for `which`.
///
/// # Safety
///
/// Same contract as [`set_frame_func`].
pub unsafe fn set_focus_lost_func(hge: *mut HGE_t, which: FuncState) {
    HGE_System_SetStateFunc(hge, which, Some(focus_lost_func_trampoline));
}

/// Installs the focus-gain trampoline as the engine's handler for `which`.
///
/// # Safety
///
/// Same contract as [`set_frame_func`].
pub unsafe fn set_focus_gain_func(hge: *mut HGE_t, which: FuncState) {
    HGE_System_SetStateFunc(hge, which, Some(focus_gain_func_trampoline));
}

/// Installs the graphics-restore trampoline as the engine's handler for
/// `which`.
///
/// # Safety
///
/// Same contract as [`set_frame_func`].
pub unsafe fn set_gfx_restore_func(hge: *mut HGE_t, which: FuncState) {
    HGE_System_SetStateFunc(hge, which, Some(gfx_restore_func_trampoline));
}

/// Installs the exit trampoline as the engine's handler for `which`.
///
/// # Safety
///
/// Same contract as [`set_frame_func`].
pub unsafe fn set_exit_func(hge: *mut HGE_t, which: FuncState) {
    HGE_System_SetStateFunc(hge, which, Some(exit_func_trampoline));
}

/// Hands the engine a null callback pointer for `which`, the engine's own
/// convention for "no handler". The host table entry is the caller's to
/// clear via [`store_state_func`].
///
/// # Safety
///
/// Same contract as [`set_frame_func`].
pub unsafe fn clear_state_func(hge: *mut HGE_t, which: FuncState) {
    HGE_System_SetStateFunc(hge, which, None);
}

//==================================================================================================
// Tests
//==================================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use hge_sys::{HGE_Create, HGE_Release, VERSION};

    // The handler table is process-wide; tests that touch it serialize here.
    static REGISTRY_LOCK: Mutex<()> = Mutex::new(());

    static FRAME_CALLS: AtomicUsize = AtomicUsize::new(0);
    static RENDER_CALLS: AtomicUsize = AtomicUsize::new(0);
    static FOCUS_LOST_CALLS: AtomicUsize = AtomicUsize::new(0);
    static FOCUS_GAIN_CALLS: AtomicUsize = AtomicUsize::new(0);
    static GFX_RESTORE_CALLS: AtomicUsize = AtomicUsize::new(0);
    static EXIT_CALLS: AtomicUsize = AtomicUsize::new(0);

    fn frame_stub() -> bool {
        FRAME_CALLS.fetch_add(1, Ordering::SeqCst);
        true
    }
    fn render_stub() -> bool {
        RENDER_CALLS.fetch_add(1, Ordering::SeqCst);
        true
    }
    fn focus_lost_stub() -> bool {
        FOCUS_LOST_CALLS.fetch_add(1, Ordering::SeqCst);
        true
    }
    fn focus_gain_stub() -> bool {
        FOCUS_GAIN_CALLS.fetch_add(1, Ordering::SeqCst);
        true
    }
    fn gfx_restore_stub() -> bool {
        GFX_RESTORE_CALLS.fetch_add(1, Ordering::SeqCst);
        true
    }
    fn exit_stub() -> bool {
        EXIT_CALLS.fetch_add(1, Ordering::SeqCst);
        true
    }

    fn refusing_stub() -> bool {
        false
    }

    fn call_counts() -> [usize; 6] {
        [
            FRAME_CALLS.load(Ordering::SeqCst),
            RENDER_CALLS.load(Ordering::SeqCst),
            FOCUS_LOST_CALLS.load(Ordering::SeqCst),
            FOCUS_GAIN_CALLS.load(Ordering::SeqCst),
            GFX_RESTORE_CALLS.load(Ordering::SeqCst),
            EXIT_CALLS.load(Ordering::SeqCst),
        ]
    }

    /// The binding-correctness check, run once per slot: the registrar
    /// records exactly one registration of exactly its own trampoline, the
    /// recorded pointer forwards to the registered stub exactly once with
    /// the boolean passed through, and re-registering swaps in the same
    /// trampoline again instead of accumulating anything.
    fn check_slot(
        registrar: unsafe fn(*mut HGE_t, FuncState),
        which: FuncState,
        trampoline: extern "C" fn() -> Bool,
        stub: StateFunc,
    ) {
        let _guard = REGISTRY_LOCK
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        unsafe {
            let hge = HGE_Create(VERSION);

            store_state_func(which, Some(stub));
            registrar(hge, which);

            let recorded = (*hge).state_func(which);
            assert_eq!(recorded.map(|f| f as usize), Some(trampoline as usize));
            assert_eq!((*hge).registrations(which), 1);

            // Firing the recorded pointer reaches the stub for this slot
            // exactly once, and no other slot's stub.
            let mut expected = call_counts();
            expected[which.index()] += 1;
            assert_eq!((*hge).fire(which), Some(TRUE));
            assert_eq!(call_counts(), expected);

            registrar(hge, which);
            assert_eq!((*hge).registrations(which), 2);
            let recorded_again = (*hge).state_func(which);
            assert_eq!(recorded_again.map(|f| f as usize), Some(trampoline as usize));

            store_state_func(which, None);
            HGE_Release(hge);
        }
    }

    #[test]
    fn frame_slot_binds_its_own_trampoline() {
        check_slot(
            set_frame_func,
            FuncState::Frame,
            frame_func_trampoline,
            frame_stub,
        );
    }

    #[test]
    fn render_slot_binds_its_own_trampoline() {
        check_slot(
            set_render_func,
            FuncState::Render,
            render_func_trampoline,
            render_stub,
        );
    }

    #[test]
    fn focus_lost_slot_binds_its_own_trampoline() {
        check_slot(
            set_focus_lost_func,
            FuncState::FocusLost,
            focus_lost_func_trampoline,
            focus_lost_stub,
        );
    }

    #[test]
    fn focus_gain_slot_binds_its_own_trampoline() {
        check_slot(
            set_focus_gain_func,
            FuncState::FocusGain,
            focus_gain_func_trampoline,
            focus_gain_stub,
        );
    }

    #[test]
    fn gfx_restore_slot_binds_its_own_trampoline() {
        check_slot(
            set_gfx_restore_func,
            FuncState::GfxRestore,
            gfx_restore_func_trampoline,
            gfx_restore_stub,
        );
    }

    #[test]
    fn exit_slot_binds_its_own_trampoline() {
        check_slot(
            set_exit_func,
            FuncState::Exit,
            exit_func_trampoline,
            exit_stub,
        );
    }

    #[test]
    fn negative_results_pass_through_unchanged() {
        let _guard = REGISTRY_LOCK
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        unsafe {
            let hge = HGE_Create(VERSION);
            store_state_func(FuncState::Frame, Some(refusing_stub));
            set_frame_func(hge, FuncState::Frame);

            assert_eq!((*hge).fire(FuncState::Frame), Some(FALSE));

            store_state_func(FuncState::Frame, None);
            HGE_Release(hge);
        }
    }

    #[test]
    fn empty_slot_reports_keep_running() {
        let _guard = REGISTRY_LOCK
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        store_state_func(FuncState::GfxRestore, None);
        assert_eq!(gfx_restore_func_trampoline(), FALSE);
    }

    #[test]
    fn clearing_hands_the_engine_a_null_pointer() {
        let _guard = REGISTRY_LOCK
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        unsafe {
            let hge = HGE_Create(VERSION);
            store_state_func(FuncState::Exit, Some(exit_stub));
            set_exit_func(hge, FuncState::Exit);
            assert!((*hge).state_func(FuncState::Exit).is_some());

            store_state_func(FuncState::Exit, None);
            clear_state_func(hge, FuncState::Exit);

            assert!((*hge).state_func(FuncState::Exit).is_none());
            assert_eq!((*hge).registrations(FuncState::Exit), 2);
            HGE_Release(hge);
        }
    }
}
