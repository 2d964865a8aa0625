//! Scalar motion model for each loading family.
//!
//! Every function here is pure: given the current scalar, the tuning
//! constants, and the speed multiplier, it returns the next value or a
//! threshold decision. The clock owns the state and decides which
//! function runs by matching on the scenario's family.
//!
//! This is a scripted animation, not a physics model. The rebound is a
//! damped cosine with fixed decay and angular frequency; nothing is
//! derived from material properties.

use solderfail_types::Family;

use crate::config::KinematicsConfig;

/// Relative tolerance on "at or past" threshold checks. It absorbs the
/// rounding of repeated accumulation (well below 1e-13 relative over a
/// full run) without pulling a fracture forward for speeds that merely
/// come close to an exact multiple.
pub const THRESHOLD_RELATIVE_TOLERANCE: f64 = 1e-12;

/// Whether `value` has reached `threshold`, up to the relative tolerance.
fn reached(value: f64, threshold: f64) -> bool {
    value >= threshold * (1.0 - THRESHOLD_RELATIVE_TOLERANCE)
}

// ---------------------------------------------------------------------------
// Bend family
// ---------------------------------------------------------------------------

/// Bend fraction after one loading tick.
pub fn bend_step(deformation: f64, params: &KinematicsConfig, speed: f64) -> f64 {
    params.bend_rate.mul_add(speed, deformation)
}

/// Whether the bend has reached the fracture threshold.
pub fn bend_fractured(deformation: f64, params: &KinematicsConfig) -> bool {
    reached(deformation, params.fracture_bend_threshold)
}

/// Rebound time advanced by one tick.
pub fn rebound_step(params: &KinematicsConfig, speed: f64) -> f64 {
    params.rebound_freq * speed
}

/// Bend fraction at rebound time `t`: `exp(-decay * t) * cos(omega * t)`.
pub fn rebound_displacement(t: f64, params: &KinematicsConfig) -> f64 {
    (-params.rebound_decay * t).exp() * (params.rebound_angular_freq * t).cos()
}

/// Whether the rebound has died out.
pub fn rebound_settled(deformation: f64, t: f64, params: &KinematicsConfig) -> bool {
    deformation.abs() < params.settle_amplitude && t > params.settle_min_elapsed
}

// ---------------------------------------------------------------------------
// Pull family
// ---------------------------------------------------------------------------

/// Pull displacement after one tick, while loading or detaching.
pub fn pull_step(displacement: f64, params: &KinematicsConfig, speed: f64) -> f64 {
    params.pull_rate.mul_add(speed, displacement)
}

/// Whether the pull has reached the fracture threshold.
pub fn pull_fractured(displacement: f64, params: &KinematicsConfig) -> bool {
    reached(displacement, params.fracture_pull_threshold)
}

/// Whether the component has fully detached.
pub fn pull_detached(displacement: f64, params: &KinematicsConfig) -> bool {
    displacement > params.detach_complete_threshold
}

// ---------------------------------------------------------------------------
// Shared
// ---------------------------------------------------------------------------

/// Simulated milliseconds the fracture frame is held before the next
/// regime starts, scaled inversely by the speed multiplier.
pub fn fracture_hold_ms(family: Family, params: &KinematicsConfig, speed: f64) -> f64 {
    let base = match family {
        Family::Bend => params.bend_fracture_delay_ms,
        Family::Pull => params.pull_fracture_delay_ms,
    };
    base / speed
}
