//! End-to-end behaviour of the animation clock across modes and speeds.
//!
//! The speed grid covers the slider range 0.10 to 3.00 in steps of 0.01.
//! Expected tick counts are computed in integer arithmetic so the
//! assertions are exact.

#![allow(
    clippy::unwrap_used,
    clippy::float_cmp,
    clippy::panic,
    clippy::missing_panics_doc,
    clippy::arithmetic_side_effects
)]

use proptest::prelude::*;
use solderfail_core::clock::SimulationClock;
use solderfail_core::config::KinematicsConfig;
use solderfail_types::{BendFracture, Family, Phase, PullFracture, SimulationMode, Snapshot};

fn clock(mode: SimulationMode, speed: f64) -> SimulationClock {
    let mut c = SimulationClock::new(KinematicsConfig::default(), 16, mode).unwrap();
    c.set_speed(speed).unwrap();
    c
}

/// Start a run and tick it to completion, returning every snapshot.
fn run_to_end(c: &mut SimulationClock, limit: usize) -> Vec<Snapshot> {
    c.start().unwrap();
    let mut frames = Vec::new();
    for _ in 0..limit {
        let snap = c.tick().unwrap();
        frames.push(snap);
        if snap.phase == Phase::Finished {
            return frames;
        }
    }
    panic!("run did not finish within {limit} ticks");
}

fn phase_order(frames: &[Snapshot]) -> Vec<Phase> {
    let mut order: Vec<Phase> = frames.iter().map(|s| s.phase).collect();
    order.dedup();
    order
}

/// `ceil(1.2 / (0.15 * v / 100))`
fn expected_bend_fracture_tick(speed_pct: u32) -> usize {
    usize::try_from(800_u32.div_ceil(speed_pct)).unwrap()
}

/// `ceil(20 / (0.5 * v / 100))`
fn expected_pull_fracture_tick(speed_pct: u32) -> usize {
    usize::try_from(4000_u32.div_ceil(speed_pct)).unwrap()
}

fn speed_pct() -> impl Strategy<Value = u32> {
    10_u32..=300
}

fn any_mode() -> impl Strategy<Value = SimulationMode> {
    prop::sample::select(SimulationMode::ALL.to_vec())
}

#[test]
fn bend_at_unit_speed_fractures_after_eight_ticks() {
    let mut c = clock(SimulationMode::Bend(BendFracture::Imc), 1.0);
    c.start().unwrap();
    let mut last = c.snapshot();
    for _ in 0..8 {
        last = c.tick().unwrap();
    }
    assert!((last.deformation - 1.2).abs() < 1e-12);
    assert_eq!(last.phase, Phase::Fracture);
    assert!(last.fracture_occurred);
}

#[test]
fn pull_at_double_speed_fractures_after_twenty_ticks() {
    let mut c = clock(SimulationMode::Pull(PullFracture::PadCratering), 2.0);
    c.start().unwrap();
    let mut last = c.snapshot();
    for _ in 0..20 {
        last = c.tick().unwrap();
    }
    assert_eq!(last.pull_displacement(), Some(20.0));
    assert_eq!(last.phase, Phase::Fracture);
}

#[test]
fn every_rebound_frame_matches_the_damped_cosine() {
    let mut c = clock(SimulationMode::Bend(BendFracture::Imc), 1.0);
    let frames = run_to_end(&mut c, 10_000);
    let after_hold: Vec<&Snapshot> = frames
        .iter()
        .skip_while(|s| s.phase != Phase::Rebound)
        .collect();
    assert!(!after_hold.is_empty());
    for snap in after_hold {
        let t = snap.elapsed_ticks;
        assert_eq!(snap.deformation, (-0.1 * t).exp() * (5.0 * t).cos());
    }
}

#[test]
fn detaching_moves_on_its_entry_frame() {
    let mut c = clock(SimulationMode::Pull(PullFracture::ZipperTear), 1.0);
    let frames = run_to_end(&mut c, 10_000);
    let entry = frames.iter().find(|s| s.phase == Phase::Detaching).unwrap();
    assert_eq!(entry.deformation, 20.5);
}

#[test]
fn speed_just_off_the_grid_follows_the_closed_form() {
    // ceil(1.2 / (0.15 * speed)) is 9 here, not 8.
    let speed = 8.0 / (8.0 + 1e-11);
    let mut c = clock(SimulationMode::Bend(BendFracture::Imc), speed);
    let frames = run_to_end(&mut c, 100_000);
    let first_fracture = frames.iter().position(|s| s.fracture_occurred);
    assert_eq!(first_fracture, Some(8));
}

#[test]
fn every_mode_runs_its_family_track() {
    for mode in SimulationMode::ALL {
        let mut c = clock(mode, 1.0);
        let frames = run_to_end(&mut c, 10_000);
        let expected = match mode.family() {
            Family::Bend => vec![Phase::Loading, Phase::Fracture, Phase::Rebound, Phase::Finished],
            Family::Pull => {
                vec![Phase::Loading, Phase::Fracture, Phase::Detaching, Phase::Finished]
            }
        };
        assert_eq!(phase_order(&frames), expected, "mode {mode}");
    }
}

#[test]
fn stress_glow_follows_the_bend() {
    let mut c = clock(SimulationMode::Bend(BendFracture::PadCratering), 1.0);
    let frames = run_to_end(&mut c, 10_000);
    assert!(
        frames
            .iter()
            .filter(|s| s.phase == Phase::Loading)
            .all(Snapshot::stress_visible)
    );
    assert!(
        frames
            .iter()
            .filter(|s| s.phase == Phase::Rebound && s.deformation.abs() <= 0.2)
            .all(|s| !s.stress_visible())
    );
}

proptest! {
    #[test]
    fn bend_fracture_tick_matches_closed_form(v in speed_pct()) {
        let speed = f64::from(v) / 100.0;
        let mut c = clock(SimulationMode::Bend(BendFracture::Imc), speed);
        let frames = run_to_end(&mut c, 100_000);

        let first_fracture = frames
            .iter()
            .position(|s| s.fracture_occurred)
            .map(|i| i + 1);
        prop_assert_eq!(first_fracture, Some(expected_bend_fracture_tick(v)));

        let at = expected_bend_fracture_tick(v) - 1;
        prop_assert_eq!(frames.get(at).map(|s| s.phase), Some(Phase::Fracture));
        // Once set, the flag stays set for the rest of the run.
        prop_assert!(frames.iter().skip(at).all(|s| s.fracture_occurred));
    }

    #[test]
    fn pull_fracture_tick_matches_closed_form(v in speed_pct()) {
        let speed = f64::from(v) / 100.0;
        let mut c = clock(SimulationMode::Pull(PullFracture::ZipperTear), speed);
        let frames = run_to_end(&mut c, 100_000);

        let first_fracture = frames
            .iter()
            .position(|s| s.phase == Phase::Fracture)
            .map(|i| i + 1);
        prop_assert_eq!(first_fracture, Some(expected_pull_fracture_tick(v)));
    }

    #[test]
    fn pull_ordering_holds_at_every_speed(v in speed_pct()) {
        let speed = f64::from(v) / 100.0;
        let mut c = clock(SimulationMode::Pull(PullFracture::PadCratering), speed);
        let frames = run_to_end(&mut c, 100_000);

        prop_assert_eq!(
            phase_order(&frames),
            vec![Phase::Loading, Phase::Fracture, Phase::Detaching, Phase::Finished]
        );

        let crossed_20 = frames.iter().position(|s| s.deformation >= 20.0);
        let crossed_100 = frames.iter().position(|s| s.deformation > 100.0);
        prop_assert!(crossed_20.is_some());
        prop_assert!(crossed_20 < crossed_100);

        // Displacement never decreases.
        let monotonic = frames.windows(2).all(|w| match w {
            [a, b] => b.deformation >= a.deformation,
            _ => true,
        });
        prop_assert!(monotonic);
    }

    #[test]
    fn finished_is_terminal(mode in any_mode(), v in speed_pct()) {
        let speed = f64::from(v) / 100.0;
        let mut c = clock(mode, speed);
        run_to_end(&mut c, 100_000);
        let before = c.snapshot();
        for _ in 0..3 {
            prop_assert!(c.tick().unwrap_err().is_invalid_transition());
        }
        prop_assert_eq!(c.snapshot(), before);
    }

    #[test]
    fn reset_from_any_point_is_clean(
        mode in any_mode(),
        v in speed_pct(),
        ticks in 0_usize..600,
    ) {
        let speed = f64::from(v) / 100.0;
        let mut c = clock(mode, speed);
        c.start().unwrap();
        for _ in 0..ticks {
            if !c.is_running() {
                break;
            }
            c.tick().unwrap();
        }

        c.reset();
        let snap = c.snapshot();
        prop_assert_eq!(snap.phase, Phase::Idle);
        prop_assert_eq!(snap.deformation, 0.0);
        prop_assert!(!snap.fracture_occurred);
        prop_assert_eq!(snap.pending_transition, None);
        prop_assert_eq!(snap.mode, mode);
        prop_assert_eq!(snap.speed_multiplier, speed);

        // A fresh run starts from zero with no transition left over.
        c.start().unwrap();
        let first = c.tick().unwrap();
        prop_assert_eq!(first.phase, Phase::Loading);
        prop_assert_eq!(first.pending_transition, None);
        prop_assert!(!first.fracture_occurred);
    }
}
