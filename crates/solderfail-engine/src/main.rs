//! Headless host for the solder-joint failure animation.
//!
//! This is the main entry point that wires the animation clock to a
//! presenter and a frame loop. It loads configuration, runs every
//! configured scenario in order, and optionally finishes on the static
//! force-analysis view.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `solderfail-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Create the animation clock and apply the speed
//! 4. Open the command channel and route Ctrl-C to a reset
//! 5. Run each scenario through the frame loop
//! 6. Show the analysis view if configured
//! 7. Log the result

mod error;

use std::io::Write as _;
use std::path::{Path, PathBuf};

use solderfail_core::clock::{Command, SimulationClock};
use solderfail_core::config::{LoggingConfig, PresenterOutput, SimulationConfig};
use solderfail_core::runner::{self, AnimationEndReason, FramePresenter, RunBounds};
use solderfail_presenter::{JsonLinesPresenter, LogPresenter};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;

/// Environment variable overriding the configuration file path.
const CONFIG_PATH_ENV: &str = "SOLDERFAIL_CONFIG";

/// Configuration file looked up in the working directory by default.
const DEFAULT_CONFIG_PATH: &str = "solderfail-config.yaml";

/// Application entry point for the engine.
///
/// # Errors
///
/// Returns an error if configuration is invalid or a run fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let config_path = resolve_config_path(std::env::var(CONFIG_PATH_ENV).ok());
    let (config, found) = load_config(&config_path)?;

    // 2. Initialize structured logging.
    init_tracing(&config.logging);
    info!("solderfail-engine starting");
    if found {
        info!(path = %config_path.display(), "Configuration loaded");
    } else {
        info!(path = %config_path.display(), "Config file not found, using defaults");
    }

    let modes = config.animation.parsed_modes()?;
    info!(
        modes = ?modes.iter().map(|m| m.name()).collect::<Vec<_>>(),
        speed = config.animation.speed,
        frame_interval_ms = config.animation.frame_interval_ms,
        max_frames = config.animation.max_frames,
        output = ?config.logging.output,
        "Animation configured"
    );

    // 3. Create the clock.
    let first_mode = modes.first().copied().unwrap_or_default();
    let mut clock = SimulationClock::new(
        config.kinematics.clone(),
        config.animation.frame_interval_ms,
        first_mode,
    )?;
    let requested = config.animation.speed;
    if !config.speed.contains(requested) {
        warn!(
            requested,
            min = config.speed.min,
            max = config.speed.max,
            "Speed outside the usual range, clamping"
        );
    }
    clock.set_speed(config.speed.clamp(requested))?;

    // 4. Command channel; Ctrl-C resets the running animation.
    let (commands, mut queue) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received, resetting");
            if commands.send(Command::Reset).is_err() {
                debug!("Command queue closed before interrupt was delivered");
            }
        }
    });

    let mut presenter = make_presenter(config.logging.output);
    let bounds = RunBounds::from(&config.animation);

    // 5. Run each scenario.
    let mut completed: usize = 0;
    let mut cancelled = false;
    for mode in modes {
        clock.set_mode(mode)?;
        let result =
            runner::run_animation(&mut clock, presenter.as_mut(), &mut queue, bounds).await?;
        runner::log_animation_end(&result);

        if clock.is_running() {
            clock.reset();
        }
        match result.end_reason {
            AnimationEndReason::Finished => completed = completed.saturating_add(1),
            AnimationEndReason::MaxFramesReached => {}
            AnimationEndReason::Cancelled | AnimationEndReason::Analysis => {
                cancelled = true;
                info!(%mode, "Run cancelled, skipping remaining scenarios");
                break;
            }
        }
    }

    // 6. Analysis view.
    if config.animation.show_analysis && !cancelled {
        clock.show_analysis()?;
        presenter.on_frame(&clock.snapshot());
    }
    std::io::stdout().flush().map_err(EngineError::from)?;

    // 7. Done.
    info!(
        completed,
        cancelled,
        final_phase = %clock.phase(),
        "solderfail-engine shutdown complete"
    );

    Ok(())
}

/// Install the tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured level. Logs go to
/// stderr so stdout stays free for the snapshot stream.
fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    if logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    }
}

/// The configuration file to read: the override if set, else the default.
fn resolve_config_path(override_path: Option<String>) -> PathBuf {
    override_path
        .filter(|p| !p.trim().is_empty())
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from)
}

/// Load the animation configuration.
///
/// A missing file is not an error: defaults are used. Environment
/// overrides apply either way. Returns whether the file existed.
fn load_config(path: &Path) -> Result<(SimulationConfig, bool), EngineError> {
    let file = read_config_file(path)?;
    let found = file.is_some();
    let mut config = file.unwrap_or_default();
    config.apply_env_overrides()?;
    config.validate()?;
    Ok((config, found))
}

/// Read the file if it exists, without consulting the environment.
fn read_config_file(path: &Path) -> Result<Option<SimulationConfig>, EngineError> {
    if !path.exists() {
        return Ok(None);
    }
    let contents = std::fs::read_to_string(path)?;
    Ok(Some(SimulationConfig::parse(&contents)?))
}

/// Build the presenter selected in the logging section.
fn make_presenter(output: PresenterOutput) -> Box<dyn FramePresenter> {
    match output {
        PresenterOutput::Log => Box::new(LogPresenter::new()),
        PresenterOutput::Jsonl => Box::new(JsonLinesPresenter::new(std::io::stdout())),
    }
}
