//! Frame loop runner with queued control commands.
//!
//! This module provides [`run_animation`], the async host loop that drives
//! one run of the clock:
//!
//! - **Start**: begins a run if the clock is not already running
//! - **Commands**: drains queued [`Command`]s between frames, so a reset or
//!   speed change lands before the next tick and never mid-tick
//! - **Presentation**: hands every snapshot to a [`FramePresenter`]
//! - **Pacing**: sleeps one frame interval between ticks
//! - **Termination**: stops on Finished, on cancellation (a reset or the
//!   analysis view), or when the frame bound is reached
//!
//! The runner wraps [`SimulationClock::tick`] and adds the control plane
//! around it.

use std::time::Duration;

use solderfail_types::{Phase, Snapshot};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, info, warn};

use crate::clock::{ClockError, Command, SimulationClock};
use crate::config::AnimationConfig;

/// Errors that can occur during an animation run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// A clock operation failed unexpectedly.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: ClockError,
    },
}

/// Reason an animation run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationEndReason {
    /// The run reached its terminal phase.
    Finished,
    /// A reset stopped the run before it finished.
    Cancelled,
    /// The analysis view replaced the run.
    Analysis,
    /// The configured frame bound was hit.
    MaxFramesReached,
}

/// Result of one animation run.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationResult {
    /// Why the run ended.
    pub end_reason: AnimationEndReason,
    /// Snapshot of the clock when the run ended.
    pub final_snapshot: Snapshot,
    /// Number of ticks the loop executed.
    pub frames: u64,
}

/// Pacing and safety bounds for the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunBounds {
    /// Wall-clock pause between frames. Zero runs the loop flat out.
    pub frame_interval: Duration,
    /// Maximum ticks per run (0 = unlimited).
    pub max_frames: u64,
}

impl RunBounds {
    /// Bounds for an unpaced run with no frame limit.
    pub const fn unpaced() -> Self {
        Self {
            frame_interval: Duration::ZERO,
            max_frames: 0,
        }
    }

    const fn frame_limit_reached(&self, frames: u64) -> bool {
        self.max_frames > 0 && frames >= self.max_frames
    }
}

impl From<&AnimationConfig> for RunBounds {
    fn from(config: &AnimationConfig) -> Self {
        Self {
            frame_interval: Duration::from_millis(u64::from(config.frame_interval_ms)),
            max_frames: config.max_frames,
        }
    }
}

/// Consumer of the snapshots produced by the loop.
///
/// Implementations draw the macro and micro views, update captions,
/// stream snapshots to a browser, and so on. The clock does not depend
/// on how any of that is done.
pub trait FramePresenter: Send {
    /// Called with every snapshot: once when the run starts, after every
    /// tick, and once more when a command ends the run.
    fn on_frame(&mut self, snapshot: &Snapshot);

    /// Called when a queued command is rejected by the clock.
    fn on_rejected(&mut self, command: Command, error: &ClockError) {
        debug!(%command, %error, "Command rejected");
    }
}

/// A presenter that ignores every frame, for tests and headless runs.
pub struct NoOpPresenter;

impl FramePresenter for NoOpPresenter {
    fn on_frame(&mut self, _snapshot: &Snapshot) {}
}

/// Run the clock until the animation ends.
///
/// Starts a run if the clock is not already running, then ticks once per
/// frame. Commands queued on `commands` are applied between frames;
/// rejected commands are reported to the presenter and otherwise ignored.
/// A closed command channel does not stop the run.
///
/// # Errors
///
/// Returns [`RunnerError`] if the run cannot be started.
pub async fn run_animation(
    clock: &mut SimulationClock,
    presenter: &mut dyn FramePresenter,
    commands: &mut UnboundedReceiver<Command>,
    bounds: RunBounds,
) -> Result<AnimationResult, RunnerError> {
    if !clock.is_running() {
        clock.start()?;
    }
    presenter.on_frame(&clock.snapshot());

    info!(
        mode = %clock.mode(),
        speed = clock.speed(),
        frame_interval = ?bounds.frame_interval,
        max_frames = bounds.max_frames,
        "Animation starting"
    );

    let mut frames: u64 = 0;

    loop {
        // --- Apply queued commands ---
        let mut applied = false;
        while let Ok(command) = commands.try_recv() {
            applied = true;
            if let Err(error) = clock.apply(command) {
                presenter.on_rejected(command, &error);
            }
        }

        // --- Check cancellation ---
        if !clock.is_running() {
            let end_reason = match clock.phase() {
                Phase::Finished => AnimationEndReason::Finished,
                Phase::Analysis => AnimationEndReason::Analysis,
                _ => AnimationEndReason::Cancelled,
            };
            let final_snapshot = clock.snapshot();
            presenter.on_frame(&final_snapshot);
            return Ok(AnimationResult {
                end_reason,
                final_snapshot,
                frames,
            });
        }
        if applied {
            debug!(phase = %clock.phase(), "Commands applied");
        }

        // --- Check frame bound ---
        if bounds.frame_limit_reached(frames) {
            warn!(frames, max_frames = bounds.max_frames, "Frame limit reached");
            return Ok(AnimationResult {
                end_reason: AnimationEndReason::MaxFramesReached,
                final_snapshot: clock.snapshot(),
                frames,
            });
        }

        // --- Tick ---
        let snapshot = clock.tick()?;
        frames = frames.saturating_add(1);
        presenter.on_frame(&snapshot);

        if snapshot.phase == Phase::Finished {
            return Ok(AnimationResult {
                end_reason: AnimationEndReason::Finished,
                final_snapshot: snapshot,
                frames,
            });
        }

        // --- Sleep for frame interval ---
        if !bounds.frame_interval.is_zero() {
            tokio::time::sleep(bounds.frame_interval).await;
        }
    }
}

/// Log the outcome of a run.
pub fn log_animation_end(result: &AnimationResult) {
    let snap = &result.final_snapshot;
    info!(
        reason = ?result.end_reason,
        frames = result.frames,
        mode = %snap.mode,
        phase = %snap.phase,
        deformation = snap.deformation,
        fracture_occurred = snap.fracture_occurred,
        "Animation ended"
    );
    if result.end_reason == AnimationEndReason::MaxFramesReached {
        warn!(phase = %snap.phase, "Animation stopped before reaching a terminal phase");
    }
}
