//! Port of the engine's first tutorial: a minimal application that sets its
//! system states, registers its state functions and hands control to the
//! engine's run loop.
//!
//! Runs against the in-process fake engine:
//!
//!     cargo run --example tutorial01 --features fake-engine

extern crate failure;
extern crate fern;
extern crate hge;

#[macro_use]
extern crate log;

use std::sync::atomic::{AtomicUsize, Ordering};

use failure::{Error, ResultExt};
use hge::{BoolState, FuncState, Hge, IntState, StringState};

const LOG_LEVEL_GENERAL: log::LevelFilter = log::LevelFilter::Trace;
const LOG_LEVEL_GLUE: log::LevelFilter = log::LevelFilter::Debug;

// The fake engine has no input surface, so the frame handler stops the run
// loop after a fixed number of frames instead of waiting for a keypress.
const RUN_FRAMES: usize = 100;

static FRAME_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn frame_func() -> bool {
    FRAME_COUNTER.fetch_add(1, Ordering::SeqCst) + 1 >= RUN_FRAMES
}

fn render_func() -> bool {
    false
}

fn focus_lost_func() -> bool {
    info!("Window focus lost");
    false
}

fn focus_gain_func() -> bool {
    info!("Window focus gained");
    false
}

fn gfx_restore_func() -> bool {
    info!("Graphics context restored");
    false
}

fn exit_func() -> bool {
    info!("Exit requested");
    true
}

fn main() -> Result<(), Error> {
    // Initializing logger
    //
    fern::Dispatch::new()
        .format(|out, message, record| out.finish(format_args!("{}: {}", record.level(), message)))
        .level(LOG_LEVEL_GENERAL)
        .level_for("hge_callback_glue", LOG_LEVEL_GLUE)
        .chain(std::io::stdout())
        .apply()
        .context("Could not initialize logger")?;

    let hge = Hge::new();

    hge.set_state_string(StringState::LogFile, "tutorial01.log");
    hge.set_state_string(StringState::Title, "Tutorial 01 - Minimal application");
    hge.set_state_bool(BoolState::Windowed, true);
    hge.set_state_bool(BoolState::UseSound, false);
    hge.set_state_int(IntState::Fps, 100);

    hge.set_state_func(FuncState::Frame, Some(frame_func));
    hge.set_state_func(FuncState::Render, Some(render_func));
    hge.set_state_func(FuncState::FocusLost, Some(focus_lost_func));
    hge.set_state_func(FuncState::FocusGain, Some(focus_gain_func));
    hge.set_state_func(FuncState::GfxRestore, Some(gfx_restore_func));
    hge.set_state_func(FuncState::Exit, Some(exit_func));

    hge.system_initiate().context("Could not initiate the engine")?;

    //
    info!("Entering engine run loop");
    info!("------------------------");
    //
    hge.system_start().context("Engine run loop failed")?;

    info!(
        "Run loop finished after {} frames ({:.2}s engine time, {} fps)",
        FRAME_COUNTER.load(Ordering::SeqCst),
        hge.timer_time(),
        hge.timer_fps()
    );

    hge.system_shutdown();
    Ok(())
}
