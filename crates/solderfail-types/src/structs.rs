//! The per-frame snapshot exchanged between the clock and presenters.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{Family, Phase, SimulationMode};

/// Deformation magnitude above which the rebound still shows stress
/// concentration at the joint corners.
const REBOUND_STRESS_VISIBLE: f64 = 0.2;

/// Immutable read of the animation state, produced once per tick.
///
/// The meaning of [`deformation`](Self::deformation) depends on the
/// family of [`mode`](Self::mode): a signed bend fraction for the bend
/// family (nominally 0 to 1, overshooting to about 1.2 and then decaying),
/// or a monotonically increasing pull displacement for the pull family.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Snapshot {
    /// Active phase.
    pub phase: Phase,
    /// Selected scenario.
    pub mode: SimulationMode,
    /// Bend fraction or pull displacement, depending on the family.
    pub deformation: f64,
    /// Scaled time spent in the current regime.
    pub elapsed_ticks: f64,
    /// Whether the joint has fractured during this run.
    pub fracture_occurred: bool,
    /// Rate multiplier applied to all time integration.
    pub speed_multiplier: f64,
    /// Number of ticks executed since the run started.
    #[ts(type = "number")]
    pub frame: u64,
    /// Target of the scheduled deferred transition, if one is pending.
    pub pending_transition: Option<Phase>,
}

impl Snapshot {
    /// The kinematic track of the selected scenario.
    pub const fn family(&self) -> Family {
        self.mode.family()
    }

    /// Bend fraction, if the selected scenario is a bend.
    pub const fn bend_fraction(&self) -> Option<f64> {
        match self.family() {
            Family::Bend => Some(self.deformation),
            Family::Pull => None,
        }
    }

    /// Pull displacement, if the selected scenario is a pull.
    pub const fn pull_displacement(&self) -> Option<f64> {
        match self.family() {
            Family::Pull => Some(self.deformation),
            Family::Bend => None,
        }
    }

    /// Whether the presenter should draw stress concentration at the
    /// joint corners: always while bending, and during rebound while the
    /// oscillation is still large.
    pub fn stress_visible(&self) -> bool {
        match (self.bend_fraction(), self.phase) {
            (Some(_), Phase::Loading) => true,
            (Some(bend), Phase::Rebound) => bend.abs() > REBOUND_STRESS_VISIBLE,
            _ => false,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::enums::{BendFracture, PullFracture};

    fn snapshot(mode: SimulationMode, phase: Phase, deformation: f64) -> Snapshot {
        Snapshot {
            phase,
            mode,
            deformation,
            elapsed_ticks: 0.0,
            fracture_occurred: phase.is_post_fracture(),
            speed_multiplier: 1.0,
            frame: 0,
            pending_transition: None,
        }
    }

    #[test]
    fn deformation_accessors_follow_family() {
        let bend = snapshot(SimulationMode::Bend(BendFracture::Imc), Phase::Loading, 0.6);
        assert_eq!(bend.bend_fraction(), Some(0.6));
        assert_eq!(bend.pull_displacement(), None);

        let pull = snapshot(
            SimulationMode::Pull(PullFracture::PadCratering),
            Phase::Loading,
            12.0,
        );
        assert_eq!(pull.pull_displacement(), Some(12.0));
        assert_eq!(pull.bend_fraction(), None);
    }

    #[test]
    fn stress_indicator_rules() {
        let mode = SimulationMode::Bend(BendFracture::PadCratering);
        assert!(snapshot(mode, Phase::Loading, 0.1).stress_visible());
        assert!(snapshot(mode, Phase::Rebound, -0.5).stress_visible());
        assert!(!snapshot(mode, Phase::Rebound, 0.1).stress_visible());
        assert!(!snapshot(mode, Phase::Fracture, 1.2).stress_visible());

        let pull = SimulationMode::Pull(PullFracture::ZipperTear);
        assert!(!snapshot(pull, Phase::Loading, 10.0).stress_visible());
    }

    #[test]
    fn snapshot_json_shape() {
        let snap = snapshot(SimulationMode::Bend(BendFracture::Imc), Phase::Fracture, 1.2);
        let value = serde_json::to_value(snap).unwrap();
        assert_eq!(value["phase"], "fracture");
        assert_eq!(value["mode"]["bend"], "imc");
        assert_eq!(value["fracture_occurred"], true);
        assert!(value["pending_transition"].is_null());
    }
}
