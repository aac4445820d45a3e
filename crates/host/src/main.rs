//! Headless host loop.
//!
//! Plays the part of a game engine: advances a simulated clock, feeds frame
//! and fixed physics ticks to a coroutine [`Launcher`], and drives the AI
//! state machine of [`scenario::Scenario`] once per frame.
//! Run with: `cargo run -p tick-host -- --frames 600`

mod scenario;

use anyhow::{Result, bail};
use clap::Parser;
use coroutine::{Launcher, ProcessMode, SchedulerConfig};
use tracing::info;

use scenario::Scenario;

/// Drives coroutines and behavior trees with a simulated frame loop
#[derive(Parser)]
#[command(name = "tick-host")]
#[command(version, long_about = None)]
struct Cli {
    /// Maximum number of frames to simulate
    #[arg(long, default_value_t = 600)]
    frames: u32,

    /// Frame delta in seconds
    #[arg(long, default_value_t = 1.0 / 60.0)]
    delta: f64,

    /// Fixed physics step in seconds
    #[arg(long, default_value_t = 0.02)]
    physics_step: f64,

    /// Frame phase coroutines run in (overrides COROUTINE_PROCESS_MODE)
    #[arg(long)]
    mode: Option<ProcessMode>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    // Written as a negated conjunction so NaN is rejected too.
    if !(cli.delta > 0.0 && cli.physics_step > 0.0) {
        bail!("--delta and --physics-step must be positive");
    }

    let mut config = SchedulerConfig::from_env();
    if let Some(mode) = cli.mode {
        config.mode = mode;
    }
    info!(mode = %config.mode, auto_clean = config.auto_clean, "starting host loop");

    let launcher = Launcher::new(config);
    let mut scenario = Scenario::new(&launcher)?;

    let mut accumulator = 0.0;
    for frame in 0..cli.frames {
        launcher.process(cli.delta);

        accumulator += cli.delta;
        while accumulator >= cli.physics_step {
            launcher.physics_process(cli.physics_step);
            accumulator -= cli.physics_step;
        }

        scenario.update(cli.delta)?;

        if scenario.is_finished() {
            info!(frame, "scenario finished");
            break;
        }
    }

    info!("{}", launcher.info());
    Ok(())
}
