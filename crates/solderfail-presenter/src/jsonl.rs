//! Presenter that streams snapshots as JSON lines.
//!
//! Each frame becomes one line of JSON carrying the snapshot fields plus
//! the caption that applies to it. A browser presenter (or any other
//! consumer) can replay the animation from this stream without linking the
//! clock.

use std::io::Write;

use serde::Serialize;
use solderfail_core::runner::FramePresenter;
use solderfail_types::Snapshot;
use tracing::warn;

use crate::caption::{Caption, caption_for};

/// Errors that can occur while writing the snapshot stream.
#[derive(Debug, thiserror::Error)]
pub enum PresenterError {
    /// Writing to the underlying sink failed.
    #[error("failed to write frame: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Serializing the frame failed.
    #[error("failed to serialize frame: {source}")]
    Json {
        /// The underlying serialization error.
        #[from]
        source: serde_json::Error,
    },
}

/// One line of the stream.
#[derive(Debug, Serialize)]
struct FrameLine<'a> {
    #[serde(flatten)]
    snapshot: &'a Snapshot,
    caption: &'a Caption,
}

/// Writes one JSON object per frame to `W`.
///
/// Write failures do not stop the animation: the first one is logged and
/// counted, and later frames are still attempted.
#[derive(Debug)]
pub struct JsonLinesPresenter<W: Write> {
    sink: W,
    written: u64,
    failed: u64,
}

impl<W: Write> JsonLinesPresenter<W> {
    /// Stream frames to `sink`.
    pub const fn new(sink: W) -> Self {
        Self {
            sink,
            written: 0,
            failed: 0,
        }
    }

    /// Serialize one snapshot and write it as a line.
    ///
    /// # Errors
    ///
    /// Returns [`PresenterError`] if serialization or the write fails.
    pub fn write_snapshot(&mut self, snapshot: &Snapshot) -> Result<(), PresenterError> {
        let line = FrameLine {
            snapshot,
            caption: caption_for(snapshot),
        };
        serde_json::to_writer(&mut self.sink, &line)?;
        self.sink.write_all(b"\n")?;
        self.sink.flush()?;
        self.written = self.written.saturating_add(1);
        Ok(())
    }

    /// Number of lines written successfully.
    pub const fn written(&self) -> u64 {
        self.written
    }

    /// Number of frames that could not be written.
    pub const fn failed(&self) -> u64 {
        self.failed
    }

    /// Consume the presenter and return the sink.
    pub fn into_inner(self) -> W {
        self.sink
    }
}

impl<W: Write + Send> FramePresenter for JsonLinesPresenter<W> {
    fn on_frame(&mut self, snapshot: &Snapshot) {
        if let Err(error) = self.write_snapshot(snapshot) {
            if self.failed == 0 {
                warn!(%error, frame = snapshot.frame, "Snapshot stream write failed");
            }
            self.failed = self.failed.saturating_add(1);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp, clippy::indexing_slicing)]
mod tests {
    use solderfail_core::clock::SimulationClock;

    use super::*;

    struct BrokenSink;

    impl Write for BrokenSink {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("sink closed"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn writes_one_line_per_frame() {
        let mut clock = SimulationClock::default();
        let mut presenter = JsonLinesPresenter::new(Vec::new());

        clock.start().unwrap();
        presenter.on_frame(&clock.snapshot());
        for _ in 0..3 {
            let snap = clock.tick().unwrap();
            presenter.on_frame(&snap);
        }
        assert_eq!(presenter.written(), 4);

        let out = String::from_utf8(presenter.into_inner()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 4);

        let last: serde_json::Value = serde_json::from_str(lines[3]).unwrap();
        assert_eq!(last["phase"], "loading");
        assert_eq!(last["frame"], 3);
        assert_eq!(last["mode"]["bend"], "imc");
        assert!(last["caption"]["status"].as_str().unwrap().contains("bending"));
    }

    #[test]
    fn lines_deserialize_back_into_snapshots() {
        let clock = SimulationClock::default();
        let mut presenter = JsonLinesPresenter::new(Vec::new());
        presenter.write_snapshot(&clock.snapshot()).unwrap();

        let out = presenter.into_inner();
        let snap: Snapshot = serde_json::from_slice(&out).unwrap();
        assert_eq!(snap, clock.snapshot());
    }

    #[test]
    fn write_failures_are_counted_not_fatal() {
        let clock = SimulationClock::default();
        let mut presenter = JsonLinesPresenter::new(BrokenSink);
        presenter.on_frame(&clock.snapshot());
        presenter.on_frame(&clock.snapshot());
        assert_eq!(presenter.failed(), 2);
        assert_eq!(presenter.written(), 0);
        assert!(presenter.write_snapshot(&clock.snapshot()).is_err());
    }
}
