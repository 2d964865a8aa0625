//! Enumeration types for the solder-joint failure animation.
//!
//! The scenario tag [`SimulationMode`] is a tagged union over the two
//! loading families, each carrying the fracture kind it demonstrates.
//! Selecting kinematics is a single `match` on the family; presenters use
//! the fracture kind to choose which failure picture to draw.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

/// The active stage of the animation state machine.
///
/// Exactly one phase is active at a time. Within a run the machine only
/// moves forward: `Loading -> Fracture -> (Rebound | Detaching) -> Finished`.
/// Returning to [`Phase::Idle`] requires an explicit reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Phase {
    /// Nothing is moving; all scalars are zero.
    Idle,
    /// Load is being applied. For the bend family this is the drop-impact
    /// bend; for the pull family it is the vertical pull before the joint
    /// gives way.
    Loading,
    /// The fracture threshold was crossed. The deformation is frozen while
    /// the deferred transition to the next regime is pending.
    Fracture,
    /// Bend family only: the board springs back in a damped oscillation.
    Rebound,
    /// Pull family only: the component keeps lifting away after fracture.
    Detaching,
    /// The run is over. Ticking is a no-op until the next start or reset.
    Finished,
    /// Static force-analysis view. No kinematics run in this phase.
    Analysis,
}

impl Phase {
    /// Whether the host loop should keep ticking in this phase.
    pub const fn is_running(self) -> bool {
        matches!(
            self,
            Self::Loading | Self::Fracture | Self::Rebound | Self::Detaching
        )
    }

    /// Whether a new run may be started from this phase.
    pub const fn can_start(self) -> bool {
        matches!(self, Self::Idle | Self::Analysis | Self::Finished)
    }

    /// Whether the fracture flag must be set while in this phase.
    pub const fn is_post_fracture(self) -> bool {
        matches!(
            self,
            Self::Fracture | Self::Rebound | Self::Detaching | Self::Finished
        )
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Fracture => "fracture",
            Self::Rebound => "rebound",
            Self::Detaching => "detaching",
            Self::Finished => "finished",
            Self::Analysis => "analysis",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Families and fracture kinds
// ---------------------------------------------------------------------------

/// The kinematic track a scenario runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Family {
    /// Lateral board bend from a drop impact, followed by rebound.
    Bend,
    /// Vertical pull or peel of the component, followed by detachment.
    Pull,
}

/// The physical failure a scenario illustrates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum FractureKind {
    /// Brittle crack through the intermetallic layer at the solder-pad
    /// interface. The pad stays on the board.
    Intermetallic,
    /// The copper pad delaminates from the laminate and leaves with the
    /// component, tearing a crater into the board resin.
    PadCratering,
    /// Joints fail in sequence from the package edge inward, like a
    /// zipper opening under peel.
    ZipperTear,
}

/// Fracture kinds demonstrated by the bend family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum BendFracture {
    /// Intermetallic-layer fracture.
    Imc,
    /// Pad cratering under bend.
    PadCratering,
}

/// Fracture kinds demonstrated by the pull family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum PullFracture {
    /// Pad cratering under vertical pull.
    PadCratering,
    /// Edge-first zipper tear under peel.
    ZipperTear,
}

// ---------------------------------------------------------------------------
// SimulationMode
// ---------------------------------------------------------------------------

/// A failure scenario: the loading family plus the fracture it shows.
///
/// The default scenario is the intermetallic bend, matching the first
/// entry of the scenario picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum SimulationMode {
    /// Drop-impact bend scenario.
    Bend(BendFracture),
    /// Pull or peel scenario.
    Pull(PullFracture),
}

impl SimulationMode {
    /// Every scenario, in picker order.
    pub const ALL: [Self; 4] = [
        Self::Bend(BendFracture::Imc),
        Self::Bend(BendFracture::PadCratering),
        Self::Pull(PullFracture::PadCratering),
        Self::Pull(PullFracture::ZipperTear),
    ];

    /// The kinematic track this scenario runs on.
    pub const fn family(self) -> Family {
        match self {
            Self::Bend(_) => Family::Bend,
            Self::Pull(_) => Family::Pull,
        }
    }

    /// The fracture this scenario illustrates.
    pub const fn fracture_kind(self) -> FractureKind {
        match self {
            Self::Bend(BendFracture::Imc) => FractureKind::Intermetallic,
            Self::Bend(BendFracture::PadCratering) | Self::Pull(PullFracture::PadCratering) => {
                FractureKind::PadCratering
            }
            Self::Pull(PullFracture::ZipperTear) => FractureKind::ZipperTear,
        }
    }

    /// The short name used in configuration files and logs.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bend(BendFracture::Imc) => "imc",
            Self::Bend(BendFracture::PadCratering) => "cratering",
            Self::Pull(PullFracture::PadCratering) => "pull_cratering",
            Self::Pull(PullFracture::ZipperTear) => "pull_zipper",
        }
    }
}

impl Default for SimulationMode {
    fn default() -> Self {
        Self::Bend(BendFracture::Imc)
    }
}

impl fmt::Display for SimulationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a scenario name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown simulation mode: {name}")]
pub struct ModeParseError {
    /// The name that failed to parse.
    pub name: String,
}

impl FromStr for SimulationMode {
    type Err = ModeParseError;

    /// Parse a scenario name. Matching is case-insensitive and treats `-`
    /// and `_` alike; a few long-form aliases are accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        match normalized.as_str() {
            "imc" | "imc_bend" | "bend_imc" => Ok(Self::Bend(BendFracture::Imc)),
            "cratering" | "bend_cratering" | "cratering_bend" => {
                Ok(Self::Bend(BendFracture::PadCratering))
            }
            "pull_cratering" | "pull" => Ok(Self::Pull(PullFracture::PadCratering)),
            "pull_zipper" | "zipper" | "pull_zipper_tear" => {
                Ok(Self::Pull(PullFracture::ZipperTear))
            }
            _ => Err(ModeParseError {
                name: s.to_owned(),
            }),
        }
    }
}
