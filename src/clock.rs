//! Step counter for the simulation run.

use serde::{Deserialize, Serialize};

/// Discrete simulation time, measured in completed steps.
pub type Time = u64;

/// Monotonically increasing step counter.
///
/// Starts at 0, meaning no steps have been executed yet. The counter is the
/// sole source of truth for the current step: result snapshots take their
/// time index from here, never from the kernel.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct SimulationClock {
    step: Time,
}

impl SimulationClock {
    pub fn new() -> Self {
        Self { step: 0 }
    }

    /// Increment the counter by exactly one and return the new value.
    pub fn advance(&mut self) -> Time {
        self.step += 1;
        self.step
    }

    /// The number of completed steps, without mutating the counter.
    pub fn current(&self) -> Time {
        self.step
    }
}
