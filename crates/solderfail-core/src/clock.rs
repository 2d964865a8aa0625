//! The animation clock: phase machine plus per-tick kinematics.
//!
//! [`SimulationClock`] is the single owner of the animation state. It is
//! mutated only by [`tick`](SimulationClock::tick) and the commands
//! ([`start`](SimulationClock::start), [`reset`](SimulationClock::reset),
//! [`set_mode`](SimulationClock::set_mode),
//! [`set_speed`](SimulationClock::set_speed),
//! [`show_analysis`](SimulationClock::show_analysis)). Every tick yields a
//! [`Snapshot`] for the presenter.
//!
//! # Phase table
//!
//! | Family | Phase      | Per tick                                | Exit                          |
//! |--------|------------|-----------------------------------------|-------------------------------|
//! | bend   | Loading    | `d += bend_rate * speed`                | `d >= 1.2` -> Fracture        |
//! | both   | Fracture   | deferred timer counts down              | timer due -> Rebound/Detaching, first step runs on the same tick |
//! | bend   | Rebound    | `t += 0.3 * speed`, `d = e^-0.1t cos 5t`| `abs(d) < 0.01 && t > 5` -> Finished |
//! | pull   | Loading    | `d += pull_rate * speed`                | `d >= 20` -> Fracture         |
//! | pull   | Detaching  | `d += pull_rate * speed`                | `d > 100` -> Finished         |
//!
//! Invalid commands never corrupt the state: they return a [`ClockError`]
//! and leave everything as it was. In a UI-driven demo repeated clicks
//! are expected, so callers usually log these and move on.

use solderfail_types::{Family, Phase, SimulationMode, Snapshot};
use tracing::{debug, info, trace, warn};

use crate::config::{ConfigError, KinematicsConfig};
use crate::kinematics;
use crate::timer::{DeferredTransition, TimerHandle, TimerIds};

/// Errors returned by clock commands.
#[derive(Debug, thiserror::Error)]
pub enum ClockError {
    /// A command argument is out of range.
    #[error("invalid parameter {name}: {value}")]
    InvalidParameter {
        /// Name of the offending parameter.
        name: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// A command is not valid in the current phase. The state is unchanged.
    #[error("cannot {command} while {phase}")]
    InvalidTransition {
        /// The rejected command.
        command: Command,
        /// The phase the clock was in.
        phase: Phase,
    },

    /// The kinematic constants failed validation.
    #[error("invalid kinematics: {source}")]
    Config {
        /// The underlying validation error.
        #[from]
        source: ConfigError,
    },
}

impl ClockError {
    /// Whether this is a rejected transition, the expected outcome of
    /// repeated or out-of-order user input.
    pub const fn is_invalid_transition(&self) -> bool {
        matches!(self, Self::InvalidTransition { .. })
    }
}

/// A control command accepted by the clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// Begin a fresh run in the current mode.
    Start,
    /// Abort whatever is happening and return to idle.
    Reset,
    /// Select a scenario (implies a reset).
    SetMode(SimulationMode),
    /// Change the speed multiplier.
    SetSpeed(f64),
    /// Switch to the static force-analysis view.
    ShowAnalysis,
    /// Advance one frame.
    Tick,
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Start => f.write_str("start"),
            Self::Reset => f.write_str("reset"),
            Self::SetMode(mode) => write!(f, "set mode to {mode}"),
            Self::SetSpeed(speed) => write!(f, "set speed to {speed}"),
            Self::ShowAnalysis => f.write_str("show analysis"),
            Self::Tick => f.write_str("tick"),
        }
    }
}

/// The mutable core record of one animation.
///
/// `deformation` is a bend fraction for the bend family and a pull
/// displacement for the pull family; only the active family's meaning
/// applies. `fracture_occurred` is set once per run and only cleared by a
/// reset or a fresh start.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationState {
    /// Active phase.
    pub phase: Phase,
    /// Selected scenario.
    pub mode: SimulationMode,
    /// Scaled time in the current regime.
    pub elapsed_ticks: f64,
    /// Bend fraction or pull displacement.
    pub deformation: f64,
    /// Whether the joint has fractured during this run.
    pub fracture_occurred: bool,
    /// Rate multiplier applied to all time integration.
    pub speed_multiplier: f64,
    /// Ticks executed since the run started.
    pub frame: u64,
    /// The scheduled post-fracture transition, if any.
    pub pending: Option<DeferredTransition>,
}

impl SimulationState {
    /// A zeroed, idle state.
    pub const fn idle(mode: SimulationMode, speed_multiplier: f64) -> Self {
        Self {
            phase: Phase::Idle,
            mode,
            elapsed_ticks: 0.0,
            deformation: 0.0,
            fracture_occurred: false,
            speed_multiplier,
            frame: 0,
            pending: None,
        }
    }
}

/// Phase machine and kinematics for one animation instance.
///
/// Instances are fully independent; there is no shared or global state.
#[derive(Debug, Clone)]
pub struct SimulationClock {
    state: SimulationState,
    params: KinematicsConfig,
    frame_ms: f64,
    timer_ids: TimerIds,
}

impl SimulationClock {
    /// Create an idle clock.
    ///
    /// `frame_interval_ms` is the simulated duration of one tick, used to
    /// count down the post-fracture hold.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidParameter`] if `frame_interval_ms` is
    /// zero, or [`ClockError::Config`] if the kinematics fail validation.
    pub fn new(
        params: KinematicsConfig,
        frame_interval_ms: u32,
        mode: SimulationMode,
    ) -> Result<Self, ClockError> {
        if frame_interval_ms == 0 {
            return Err(ClockError::InvalidParameter {
                name: "frame_interval_ms",
                value: 0.0,
            });
        }
        params.validate()?;
        Ok(Self {
            state: SimulationState::idle(mode, 1.0),
            params,
            frame_ms: f64::from(frame_interval_ms),
            timer_ids: TimerIds::default(),
        })
    }

    /// Read-only view of the full state.
    pub const fn state(&self) -> &SimulationState {
        &self.state
    }

    /// Active phase.
    pub const fn phase(&self) -> Phase {
        self.state.phase
    }

    /// Selected scenario.
    pub const fn mode(&self) -> SimulationMode {
        self.state.mode
    }

    /// Current speed multiplier.
    pub const fn speed(&self) -> f64 {
        self.state.speed_multiplier
    }

    /// Whether the host loop should keep ticking.
    pub const fn is_running(&self) -> bool {
        self.state.phase.is_running()
    }

    /// Handle of the pending post-fracture transition, if one is scheduled.
    pub fn pending_handle(&self) -> Option<TimerHandle> {
        self.state.pending.as_ref().map(DeferredTransition::handle)
    }

    /// Immutable snapshot of the current state for the presenter.
    pub fn snapshot(&self) -> Snapshot {
        let s = &self.state;
        Snapshot {
            phase: s.phase,
            mode: s.mode,
            deformation: s.deformation,
            elapsed_ticks: s.elapsed_ticks,
            fracture_occurred: s.fracture_occurred,
            speed_multiplier: s.speed_multiplier,
            frame: s.frame,
            pending_transition: s.pending.as_ref().map(DeferredTransition::target),
        }
    }

    // -----------------------------------------------------------------------
    // Commands
    // -----------------------------------------------------------------------

    /// Dispatch a [`Command`].
    ///
    /// # Errors
    ///
    /// Propagates the error of the underlying command.
    pub fn apply(&mut self, command: Command) -> Result<(), ClockError> {
        match command {
            Command::Start => self.start(),
            Command::Reset => {
                self.reset();
                Ok(())
            }
            Command::SetMode(mode) => self.set_mode(mode),
            Command::SetSpeed(speed) => self.set_speed(speed).map(|_prev| ()),
            Command::ShowAnalysis => self.show_analysis(),
            Command::Tick => self.tick().map(|_snapshot| ()),
        }
    }

    /// Select a scenario and reset.
    ///
    /// Mode changes mid-run are rejected; reset first.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidTransition`] while running.
    pub fn set_mode(&mut self, mode: SimulationMode) -> Result<(), ClockError> {
        self.guard(Command::SetMode(mode), !self.is_running())?;
        self.state.mode = mode;
        self.reset();
        info!(%mode, "Mode selected");
        Ok(())
    }

    /// Change the speed multiplier. Returns the previous multiplier.
    ///
    /// Any finite positive value is accepted; the usual slider range is
    /// 0.1 to 3.0. The new speed applies from the next tick. A pending
    /// post-fracture hold keeps the duration computed when it was
    /// scheduled.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidParameter`] for zero, negative, or
    /// non-finite values.
    pub fn set_speed(&mut self, multiplier: f64) -> Result<f64, ClockError> {
        if !(multiplier.is_finite() && multiplier > 0.0) {
            return Err(ClockError::InvalidParameter {
                name: "speed_multiplier",
                value: multiplier,
            });
        }
        let prev = self.state.speed_multiplier;
        self.state.speed_multiplier = multiplier;
        debug!(prev, speed = multiplier, "Speed changed");
        Ok(prev)
    }

    /// Begin a fresh run in the current mode.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidTransition`] if a run is already in
    /// progress; the running animation is left untouched.
    pub fn start(&mut self) -> Result<(), ClockError> {
        self.guard(Command::Start, self.state.phase.can_start())?;
        self.state = SimulationState::idle(self.state.mode, self.state.speed_multiplier);
        self.enter(Phase::Loading);
        info!(
            mode = %self.state.mode,
            speed = self.state.speed_multiplier,
            "Run started"
        );
        Ok(())
    }

    /// Return to idle from any phase, zeroing every scalar and cancelling
    /// any pending transition. Mode and speed are kept.
    pub fn reset(&mut self) {
        if let Some(pending) = self.state.pending.as_ref() {
            debug!(
                timer = pending.handle().id(),
                target = %pending.target(),
                "Cancelled pending transition"
            );
        }
        let from = self.state.phase;
        self.state = SimulationState::idle(self.state.mode, self.state.speed_multiplier);
        debug!(%from, "Reset to idle");
    }

    /// Switch to the static force-analysis view.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidTransition`] unless idle or finished.
    pub fn show_analysis(&mut self) -> Result<(), ClockError> {
        self.guard(
            Command::ShowAnalysis,
            matches!(self.state.phase, Phase::Idle | Phase::Finished),
        )?;
        self.state = SimulationState::idle(self.state.mode, self.state.speed_multiplier);
        self.enter(Phase::Analysis);
        Ok(())
    }

    /// Advance one frame and return the resulting snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidTransition`] when idle, finished, or
    /// showing the analysis view. Nothing changes in that case.
    pub fn tick(&mut self) -> Result<Snapshot, ClockError> {
        self.guard(Command::Tick, self.is_running())?;
        self.state.frame = self.state.frame.saturating_add(1);

        let moving = self.state.phase != Phase::Fracture || self.hold_fracture();
        if moving {
            match self.state.mode.family() {
                Family::Bend => self.tick_bend(),
                Family::Pull => self.tick_pull(),
            }
        }

        trace!(
            frame = self.state.frame,
            phase = %self.state.phase,
            deformation = self.state.deformation,
            elapsed = self.state.elapsed_ticks,
            "Tick"
        );
        Ok(self.snapshot())
    }

    // -----------------------------------------------------------------------
    // Kinematics per family
    // -----------------------------------------------------------------------

    fn tick_bend(&mut self) {
        let speed = self.state.speed_multiplier;
        match self.state.phase {
            Phase::Loading => {
                self.state.elapsed_ticks += speed;
                self.state.deformation =
                    kinematics::bend_step(self.state.deformation, &self.params, speed);
                if kinematics::bend_fractured(self.state.deformation, &self.params) {
                    self.fracture(Phase::Rebound);
                }
            }
            Phase::Rebound => {
                self.state.elapsed_ticks += kinematics::rebound_step(&self.params, speed);
                let t = self.state.elapsed_ticks;
                self.state.deformation = kinematics::rebound_displacement(t, &self.params);
                if kinematics::rebound_settled(self.state.deformation, t, &self.params) {
                    self.enter(Phase::Finished);
                }
            }
            other => warn!(phase = %other, "Bend tick in a phase with no bend kinematics"),
        }
    }

    fn tick_pull(&mut self) {
        let speed = self.state.speed_multiplier;
        match self.state.phase {
            Phase::Loading => {
                self.state.elapsed_ticks += speed;
                self.state.deformation =
                    kinematics::pull_step(self.state.deformation, &self.params, speed);
                if !self.state.fracture_occurred
                    && kinematics::pull_fractured(self.state.deformation, &self.params)
                {
                    self.fracture(Phase::Detaching);
                }
            }
            Phase::Detaching => {
                self.state.elapsed_ticks += speed;
                self.state.deformation =
                    kinematics::pull_step(self.state.deformation, &self.params, speed);
                if kinematics::pull_detached(self.state.deformation, &self.params) {
                    self.enter(Phase::Finished);
                }
            }
            other => warn!(phase = %other, "Pull tick in a phase with no pull kinematics"),
        }
    }

    // -----------------------------------------------------------------------
    // Transitions
    // -----------------------------------------------------------------------

    /// Enter Fracture and schedule the hold that leads to `next`.
    fn fracture(&mut self, next: Phase) {
        let hold_ms = kinematics::fracture_hold_ms(
            self.state.mode.family(),
            &self.params,
            self.state.speed_multiplier,
        );
        let handle = self.timer_ids.issue();
        self.state.fracture_occurred = true;
        self.state.pending = Some(DeferredTransition::new(handle, next, hold_ms));
        self.enter(Phase::Fracture);
        debug!(timer = handle.id(), target = %next, hold_ms, "Scheduled post-fracture transition");
    }

    /// Spend one frame of the post-fracture hold. Returns `true` once the
    /// next regime has been entered.
    fn hold_fracture(&mut self) -> bool {
        let frame_ms = self.frame_ms;
        let due = self
            .state
            .pending
            .as_mut()
            .is_none_or(|pending| pending.advance(frame_ms));
        if !due {
            return false;
        }
        let fallback = post_fracture_phase(self.state.mode.family());
        let next = self
            .state
            .pending
            .take()
            .map_or(fallback, |pending| pending.target());
        self.enter(next);
        true
    }

    fn enter(&mut self, phase: Phase) {
        let from = self.state.phase;
        self.state.phase = phase;
        if matches!(phase, Phase::Loading | Phase::Rebound) {
            self.state.elapsed_ticks = 0.0;
        }
        info!(
            %from,
            to = %phase,
            mode = %self.state.mode,
            frame = self.state.frame,
            deformation = self.state.deformation,
            "Phase transition"
        );
    }

    fn guard(&self, command: Command, allowed: bool) -> Result<(), ClockError> {
        if allowed {
            Ok(())
        } else {
            debug!(%command, phase = %self.state.phase, "Command rejected");
            Err(ClockError::InvalidTransition {
                command,
                phase: self.state.phase,
            })
        }
    }
}

impl Default for SimulationClock {
    fn default() -> Self {
        Self {
            state: SimulationState::idle(SimulationMode::default(), 1.0),
            params: KinematicsConfig::default(),
            frame_ms: 16.0,
            timer_ids: TimerIds::default(),
        }
    }
}

/// The regime that follows a fracture for each family.
const fn post_fracture_phase(family: Family) -> Phase {
    match family {
        Family::Bend => Phase::Rebound,
        Family::Pull => Phase::Detaching,
    }
}
