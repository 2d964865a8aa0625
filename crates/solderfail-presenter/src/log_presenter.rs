//! Presenter that narrates the animation through the tracing log.

use solderfail_core::clock::{ClockError, Command};
use solderfail_core::runner::FramePresenter;
use solderfail_types::Snapshot;
use tracing::{debug, info, warn};

use crate::caption::CaptionKey;

/// Logs the caption whenever it changes and a debug line for every frame.
#[derive(Debug, Default)]
pub struct LogPresenter {
    last: Option<CaptionKey>,
    frames: u64,
}

impl LogPresenter {
    /// Create a presenter that has shown nothing yet.
    pub const fn new() -> Self {
        Self {
            last: None,
            frames: 0,
        }
    }

    /// Number of frames presented so far.
    pub const fn frames(&self) -> u64 {
        self.frames
    }

    /// The caption currently on display.
    pub const fn current(&self) -> Option<CaptionKey> {
        self.last
    }
}

impl FramePresenter for LogPresenter {
    fn on_frame(&mut self, snapshot: &Snapshot) {
        self.frames = self.frames.saturating_add(1);

        debug!(
            frame = snapshot.frame,
            phase = %snapshot.phase,
            deformation = snapshot.deformation,
            stress = snapshot.stress_visible(),
            "Frame"
        );

        let key = CaptionKey::for_snapshot(snapshot);
        if self.last == Some(key) {
            return;
        }
        self.last = Some(key);

        let caption = key.caption();
        info!(
            mode = %snapshot.mode,
            phase = %snapshot.phase,
            status = caption.status,
            detail = caption.detail,
            "{}",
            caption.explanation
        );
    }

    fn on_rejected(&mut self, command: Command, error: &ClockError) {
        if error.is_invalid_transition() {
            debug!(%command, %error, "Ignored command");
        } else {
            warn!(%command, %error, "Rejected command");
        }
    }
}
