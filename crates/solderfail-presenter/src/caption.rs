//! Explanatory captions keyed by what the animation is showing.
//!
//! A caption has three lines: a short macro-view status, a micro-view
//! detail, and a longer explanation of the failure mechanism. Which
//! caption applies is a pure function of the snapshot, so every presenter
//! shows the same text for the same frame.

use serde::Serialize;
use solderfail_types::{Family, FractureKind, Phase, Snapshot};

/// Which caption a frame should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaptionKey {
    /// Nothing has started yet.
    Idle,
    /// Bend family, loading.
    Bending,
    /// Pull family, loading.
    Pulling,
    /// The joint has just broken.
    Fracture {
        /// Loading family, which decides the failure narrative.
        family: Family,
        /// The failure being illustrated.
        kind: FractureKind,
    },
    /// Bend family, damped spring-back.
    Rebound,
    /// Pull family, component lifting away.
    Detaching,
    /// The run is over.
    Finished(Family),
    /// Static force-analysis view.
    Analysis,
}

impl CaptionKey {
    /// Derive the caption key for a snapshot.
    pub const fn for_snapshot(snapshot: &Snapshot) -> Self {
        let family = snapshot.mode.family();
        match snapshot.phase {
            Phase::Idle => Self::Idle,
            Phase::Loading => match family {
                Family::Bend => Self::Bending,
                Family::Pull => Self::Pulling,
            },
            Phase::Fracture => Self::Fracture {
                family,
                kind: snapshot.mode.fracture_kind(),
            },
            Phase::Rebound => Self::Rebound,
            Phase::Detaching => Self::Detaching,
            Phase::Finished => Self::Finished(family),
            Phase::Analysis => Self::Analysis,
        }
    }

    /// The caption text for this key.
    pub const fn caption(self) -> &'static Caption {
        match self {
            Self::Idle => &IDLE,
            Self::Bending => &BENDING,
            Self::Pulling => &PULLING,
            Self::Fracture {
                family: Family::Bend,
                kind: FractureKind::PadCratering,
            } => &BEND_CRATERING,
            Self::Fracture {
                family: Family::Bend,
                ..
            } => &BEND_IMC,
            Self::Fracture {
                family: Family::Pull,
                kind: FractureKind::ZipperTear,
            } => &PULL_ZIPPER,
            Self::Fracture {
                family: Family::Pull,
                ..
            } => &PULL_MIXED,
            Self::Rebound => &REBOUND,
            Self::Detaching => &DETACHING,
            Self::Finished(Family::Bend) => &FINISHED_BEND,
            Self::Finished(Family::Pull) => &FINISHED_PULL,
            Self::Analysis => &ANALYSIS,
        }
    }
}

/// The three caption lines shown alongside a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Caption {
    /// Macro-view status line.
    pub status: &'static str,
    /// Micro-view status line.
    pub detail: &'static str,
    /// Explanation of the mechanism.
    pub explanation: &'static str,
}

/// Caption for a snapshot.
pub const fn caption_for(snapshot: &Snapshot) -> &'static Caption {
    CaptionKey::for_snapshot(snapshot).caption()
}

const IDLE: Caption = Caption {
    status: "Status: at rest",
    detail: "Micro view: no change",
    explanation: "Start the animation to watch the joint fail.",
};

const BENDING: Caption = Caption {
    status: "Status: severe bending (high strain rate)",
    detail: "Micro view: joint stretched, stress concentrates, solder embrittles",
    explanation: "0-0.5 ms: the drop impact bends the board hard. At this strain rate \
                  the solder behaves as a brittle material and cannot relieve stress \
                  by deforming, so a large tensile load reaches the interface.",
};

const PULLING: Caption = Caption {
    status: "Status: vertical pull / peel",
    detail: "Micro view: shape factor S = 6.1, gel stiffens",
    explanation: "With a 0.5 mm gel layer the shape factor is S = 6.1. Under that \
                  confinement the gel's apparent stiffness rises by an order of \
                  magnitude: it hardens hydrostatically and transmits the pull to the \
                  package almost like a hydraulic fluid.",
};

const BEND_IMC: Caption = Caption {
    status: "Status: limit reached, interface fracture",
    detail: "Failure: brittle crack through the intermetallic layer",
    explanation: "The crack runs along the intermetallic compound at the solder-pad \
                  interface. The pad stays on the board; the joint opens above it.",
};

const BEND_CRATERING: Caption = Caption {
    status: "Status: limit reached, pad cratering",
    detail: "Failure: pad torn out of the laminate resin",
    explanation: "The laminate under the pad gives way before the solder does. The \
                  copper pad lifts out of the board, leaving a crater in the resin.",
};

const PULL_MIXED: Caption = Caption {
    status: "Status: limit reached, mixed failure",
    detail: "Failure: signal pads crater, ground-plane pads crack at the IMC",
    explanation: "Isolated signal pads have weak adhesion: they crater and leave with \
                  the package. Pads tied into large copper pours are well anchored: \
                  they stay on the board and the intermetallic layer cracks instead. \
                  The vertical load exceeded the strength of both interfaces.",
};

const PULL_ZIPPER: Caption = Caption {
    status: "Status: limit reached, zipper tear",
    detail: "Failure: perimeter joints fail first, the crack front runs inward",
    explanation: "The overhang acts as a lever about the outermost ball row. The \
                  perimeter joints carry the peak load and fail first, then each row \
                  inward fails in turn, like a zipper opening.",
};

const REBOUND: Caption = Caption {
    status: "Status: damped spring-back",
    detail: "Micro view: crack closes and reopens (intermittent contact)",
    explanation: "Afterwards the board rebounds in a damped oscillation. The crack can \
                  close during the swing, so the circuit shows intermittent failures.",
};

const DETACHING: Caption = Caption {
    status: "Status: component lifting away",
    detail: "Micro view: fractured joints separate",
    explanation: "With the joints broken nothing holds the package down; the pull \
                  carries it clear of the board.",
};

const FINISHED_BEND: Caption = Caption {
    status: "Status: at rest (failed)",
    detail: "Micro view: cracked joint",
    explanation: "The board has settled, but the joint is cracked through.",
};

const FINISHED_PULL: Caption = Caption {
    status: "Status: at rest (detached)",
    detail: "Micro view: component removed",
    explanation: "The component has separated from the board.",
};

const ANALYSIS: Caption = Caption {
    status: "Status: force analysis",
    detail: "View: package from above",
    explanation: "Ball diameter 0.33 mm, 153 balls. The package edge has no balls, \
                  leaving an overhang. The gel bonds the whole underside, overhang \
                  included, so pulling on it works like a crowbar pivoting on the \
                  outer ball row and adds a peel moment to the edge joints.",
};
