//! Animation clock, phase machine, and frame loop for the solder-joint
//! failure animation.
//!
//! This crate owns the state that drives one animation: which phase the
//! joint is in, how far it has deformed, and when the post-fracture hold
//! ends. Presentation lives elsewhere and only ever sees snapshots.
//!
//! # Modules
//!
//! - [`clock`] -- [`SimulationClock`], the phase machine and per-tick
//!   kinematics, plus the [`Command`] set that drives it.
//! - [`config`] -- Configuration loading from `solderfail-config.yaml` into
//!   strongly-typed structs.
//! - [`kinematics`] -- Pure per-family motion and threshold functions.
//! - [`runner`] -- The async frame loop with a queued command channel.
//! - [`timer`] -- Cancelable deferred phase transitions.
//!
//! [`SimulationClock`]: clock::SimulationClock
//! [`Command`]: clock::Command

pub mod clock;
pub mod config;
pub mod kinematics;
pub mod runner;
pub mod timer;
