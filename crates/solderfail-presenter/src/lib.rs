//! Captions and frame presenters for the solder-joint failure animation.
//!
//! The clock knows nothing about how frames are shown. This crate maps
//! snapshots to explanatory captions and provides two
//! [`FramePresenter`](solderfail_core::runner::FramePresenter)
//! implementations for headless hosts.
//!
//! # Modules
//!
//! - [`caption`] -- [`CaptionKey`] and the caption text table.
//! - [`jsonl`] -- [`JsonLinesPresenter`], one JSON snapshot per line.
//! - [`log_presenter`] -- [`LogPresenter`], captions through `tracing`.

pub mod caption;
pub mod jsonl;
pub mod log_presenter;

pub use caption::{Caption, CaptionKey, caption_for};
pub use jsonl::{JsonLinesPresenter, PresenterError};
pub use log_presenter::LogPresenter;
