#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure timer system that turns elapsed time into propagation steps.

use std::time::Duration;

use fire_propagation_core::{Command, Event, PropagationInterval, SimulationState};

/// Pure system that emits step commands while the simulation runs.
///
/// Elapsed time only accumulates in the running state. Leaving that state
/// discards the partial tick, so a pause or reset observed earlier in the same
/// event batch always wins over a pending step.
///
/// A single time advance yields at most one step. Whole intervals beyond the
/// first are dropped rather than replayed as a backlog.
#[derive(Debug)]
pub struct Ticker {
    interval: Duration,
    accumulator: Duration,
    state: SimulationState,
}

impl Ticker {
    /// Creates a new ticker using the provided propagation interval.
    #[must_use]
    pub fn new(interval: PropagationInterval) -> Self {
        Self {
            interval: interval.as_duration(),
            accumulator: Duration::ZERO,
            state: SimulationState::Idle,
        }
    }

    /// Time accumulated toward the next step.
    #[must_use]
    pub fn pending(&self) -> Duration {
        self.accumulator
    }

    /// Time remaining until the next step fires, if the simulation runs.
    #[must_use]
    pub fn until_next_step(&self) -> Option<Duration> {
        self.state
            .is_running()
            .then(|| self.interval.saturating_sub(self.accumulator))
    }

    /// Consumes world events in order and emits due step commands.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        for event in events {
            match event {
                Event::SimulationStateChanged { to, .. } => {
                    self.state = *to;
                    if !to.is_running() {
                        self.accumulator = Duration::ZERO;
                    }
                }
                Event::IntervalChanged { interval } => {
                    self.interval = interval.as_duration();
                    // The in-flight tick fires at most once under the new period.
                    self.accumulator = self.accumulator.min(self.interval);
                }
                Event::TimeAdvanced { dt } if self.state.is_running() => {
                    self.accumulator = self.accumulator.saturating_add(*dt);
                    if self.resolve_due_step() {
                        out.push(Command::StepGeneration);
                    }
                }
                _ => {}
            }
        }
    }

    fn resolve_due_step(&mut self) -> bool {
        if self.interval.is_zero() {
            self.accumulator = Duration::ZERO;
            return true;
        }
        if self.accumulator < self.interval {
            return false;
        }

        // Keep only the phase within the current interval.
        let remainder = self.accumulator.as_nanos() % self.interval.as_nanos();
        self.accumulator = Duration::from_nanos(u64::try_from(remainder).unwrap_or(u64::MAX));
        true
    }
}
