//! Boundary to the simulation kernel.
//!
//! The governance and stepping core consumes the kernel through a narrow
//! interface: advance one discrete time unit under the current parameter
//! values, and project kernel-internal state into the externally visible
//! snapshot. Everything else about the kernel (contact networks, disease
//! progression, tracing mechanics) is opaque here, which is what lets the
//! stepping protocol be tested against a scripted fake.

mod reference;

pub use reference::ReferenceKernel;

use serde::{Deserialize, Serialize};

use crate::clock::Time;
use crate::errors::FatalKernelError;
use crate::model::ResultSnapshot;
use crate::params::ParameterStore;

/// Aggregates reported by the kernel for one completed step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepOutcome {
    /// Infections that occurred during this step.
    pub new_infected: u64,
    /// Cumulative infections since the start of the run.
    pub total_infected: u64,
    /// Cumulative deaths since the start of the run.
    pub total_death: u64,
    /// Cumulative symptomatic cases since the start of the run.
    pub n_symptoms: u64,
    /// Individuals in quarantine during this step.
    pub n_quarantine: u64,
    /// Cumulative tests ordered since the start of the run.
    pub n_tests: u64,
    /// Whether lockdown was in force during this step.
    pub lockdown: bool,
    /// Whether the contact-tracing app was active during this step.
    pub app_turned_on: bool,
}

/// A stateful simulation kernel advanced one discrete time unit at a time.
///
/// Kernel state is exclusively owned by its model and mutates only through
/// [`Kernel::advance_one_step`]. A [`FatalKernelError`] is terminal for the
/// run; the model surfaces it without retrying.
pub trait Kernel {
    /// Execute exactly one discrete time unit under the given parameters.
    fn advance_one_step(
        &mut self,
        params: &ParameterStore,
    ) -> Result<StepOutcome, FatalKernelError>;

    /// Project a step outcome into the externally visible snapshot.
    ///
    /// `time` is supplied by the model's clock, the sole source of truth
    /// for the step index.
    fn snapshot_results(&self, outcome: &StepOutcome, time: Time) -> ResultSnapshot;
}
