//! Cancelable deferred phase transitions.
//!
//! After a fracture the machine holds the fracture frame for a short,
//! speed-scaled pause before switching regime. The pause is modelled as a
//! [`DeferredTransition`] owned by the simulation state rather than a
//! free-running callback, so dropping it cancels it: a reset can never be
//! followed by a stale transition from the previous run.
//!
//! Time is measured in simulated milliseconds. The clock charges one frame
//! interval per tick, which matches wall-clock time when the host ticks at
//! the configured frame rate.

use solderfail_types::Phase;

/// Identifies one scheduled transition.
///
/// Handles are never reused within a clock, even across resets, so a
/// handle taken before a reset never matches a timer scheduled after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerHandle(u64);

impl TimerHandle {
    /// Raw handle value, for logging.
    pub const fn id(self) -> u64 {
        self.0
    }
}

/// Source of fresh [`TimerHandle`]s.
#[derive(Debug, Clone, Default)]
pub struct TimerIds {
    next: u64,
}

impl TimerIds {
    /// Issue the next handle.
    pub const fn issue(&mut self) -> TimerHandle {
        let handle = TimerHandle(self.next);
        self.next = self.next.wrapping_add(1);
        handle
    }
}

/// A phase transition waiting for its delay to elapse.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeferredTransition {
    handle: TimerHandle,
    target: Phase,
    remaining_ms: f64,
}

impl DeferredTransition {
    /// Schedule a transition to `target` after `delay_ms` simulated
    /// milliseconds. Negative delays are treated as zero.
    pub fn new(handle: TimerHandle, target: Phase, delay_ms: f64) -> Self {
        Self {
            handle,
            target,
            remaining_ms: delay_ms.max(0.0),
        }
    }

    /// The handle this transition was scheduled under.
    pub const fn handle(&self) -> TimerHandle {
        self.handle
    }

    /// The phase entered when the transition fires.
    pub const fn target(&self) -> Phase {
        self.target
    }

    /// Simulated milliseconds left before the transition fires.
    pub const fn remaining_ms(&self) -> f64 {
        self.remaining_ms
    }

    /// Spend `elapsed_ms` of the delay. Returns `true` once the
    /// transition is due.
    pub fn advance(&mut self, elapsed_ms: f64) -> bool {
        self.remaining_ms = (self.remaining_ms - elapsed_ms).max(0.0);
        self.is_due()
    }

    /// Whether the delay has fully elapsed.
    pub fn is_due(&self) -> bool {
        self.remaining_ms <= 0.0
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn handles_are_unique() {
        let mut ids = TimerIds::default();
        let a = ids.issue();
        let b = ids.issue();
        assert_ne!(a, b);
        assert_eq!(b.id(), a.id() + 1);
    }

    #[test]
    fn fires_once_delay_is_spent() {
        let mut ids = TimerIds::default();
        let mut timer = DeferredTransition::new(ids.issue(), Phase::Rebound, 100.0);
        assert!(!timer.advance(16.0));
        assert!(!timer.advance(16.0));
        assert_eq!(timer.remaining_ms(), 68.0);
        for _ in 0..4 {
            let _ = timer.advance(16.0);
        }
        assert!(timer.advance(16.0));
        assert_eq!(timer.remaining_ms(), 0.0);
        assert_eq!(timer.target(), Phase::Rebound);
    }

    #[test]
    fn zero_delay_is_due_on_first_advance() {
        let mut ids = TimerIds::default();
        let mut timer = DeferredTransition::new(ids.issue(), Phase::Detaching, -5.0);
        assert!(timer.is_due());
        assert!(timer.advance(0.0));
    }
}
