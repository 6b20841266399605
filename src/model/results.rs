//! Per-step result snapshots.

use serde::{Deserialize, Serialize};

use crate::clock::Time;

/// Immutable record produced by one step-advance.
///
/// Exactly one snapshot corresponds to the most recently completed step;
/// the model keeps only the latest, so callers wanting a history copy one
/// out after each step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultSnapshot {
    /// Step index at which this snapshot was taken (1 after the first step).
    pub time: Time,
    /// Whether lockdown was in force during the step.
    pub lockdown: bool,
    /// Whether the contact-tracing app was active during the step.
    pub app_turned_on: bool,
    /// Cumulative infections since the start of the run.
    pub total_infected: u64,
    /// Cumulative deaths since the start of the run.
    pub total_death: u64,
    /// Cumulative symptomatic cases since the start of the run.
    pub n_symptoms: u64,
    /// Individuals in quarantine during the step.
    pub n_quarantine: u64,
    /// Cumulative tests ordered since the start of the run.
    pub n_tests: u64,
}
