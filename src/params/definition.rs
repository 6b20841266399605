//! The declared parameter universe.
//!
//! Every parameter known to the simulator is declared here, once, with its
//! value kind and mutability class. The declarations are indexed by the
//! global [`PARAMETER_REGISTRY`], which is built on first access and never
//! mutated afterwards. Mutability is a property of the name, fixed at
//! crate-definition time; no instance can reclassify a parameter.
//!
//! # Usage
//!
//! ```rust
//! use epistep::params::{Mutability, PARAMETER_REGISTRY};
//!
//! let def = PARAMETER_REGISTRY.get("lockdown_on").unwrap();
//! assert_eq!(def.mutability, Mutability::RuntimeMutable);
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::LazyLock;

use crate::errors::{ModelError, ModelResult};

/// Scalar value carried by every parameter.
pub type ParamValue = f64;

/// Value kind of a parameter.
///
/// Each kind owns its range check; every write path goes through
/// [`ParamKind::validate`] before anything is stored. There is no clamping
/// or default substitution: an out-of-range value fails loudly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParamKind {
    /// Non-negative whole number (counts, durations, seeds).
    Integer,
    /// Boolean flag encoded as 0 or 1.
    Flag,
    /// Fraction in the closed interval [0, 1].
    Fraction,
}

impl ParamKind {
    /// Check `value` against this kind's range.
    ///
    /// Returns the value unchanged on success so callers can validate and
    /// store in one expression.
    pub fn validate(&self, name: &str, value: ParamValue) -> ModelResult<ParamValue> {
        let reason = if !value.is_finite() {
            Some("value must be finite")
        } else {
            match self {
                ParamKind::Integer if value < 0.0 || value.fract() != 0.0 => {
                    Some("expected a non-negative whole number")
                }
                ParamKind::Flag if value != 0.0 && value != 1.0 => Some("expected 0 or 1"),
                ParamKind::Fraction if !(0.0..=1.0).contains(&value) => {
                    Some("expected a fraction in [0, 1]")
                }
                _ => None,
            }
        };

        match reason {
            Some(reason) => Err(ModelError::InvalidParameterValue {
                name: name.to_string(),
                value,
                reason: reason.to_string(),
            }),
            None => Ok(value),
        }
    }
}

impl std::fmt::Display for ParamKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParamKind::Integer => write!(f, "Integer"),
            ParamKind::Flag => write!(f, "Flag"),
            ParamKind::Fraction => write!(f, "Fraction"),
        }
    }
}

/// Mutability class of a parameter.
///
/// A capability distinction, not a type hierarchy: one parameter record type
/// carries the tag and the store's `update` operation dispatches on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mutability {
    /// Settable only while the store is being built; frozen once stepping
    /// begins.
    ConstructionOnly,
    /// May be changed between steps through the governed update path.
    RuntimeMutable,
}

impl std::fmt::Display for Mutability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mutability::ConstructionOnly => write!(f, "ConstructionOnly"),
            Mutability::RuntimeMutable => write!(f, "RuntimeMutable"),
        }
    }
}

/// Declaration of a single parameter.
#[derive(Debug, Clone, Copy)]
pub struct ParameterDefinition {
    /// Unique identifier, as it appears in parameter template columns.
    pub name: &'static str,
    /// Value kind, owning the range check.
    pub kind: ParamKind,
    /// Mutability class.
    pub mutability: Mutability,
    /// Baseline value used when neither template nor override supplies one.
    pub default: ParamValue,
    /// Human-readable description.
    pub description: &'static str,
}

impl ParameterDefinition {
    const fn new(
        name: &'static str,
        kind: ParamKind,
        mutability: Mutability,
        default: ParamValue,
        description: &'static str,
    ) -> Self {
        Self {
            name,
            kind,
            mutability,
            default,
            description,
        }
    }
}

use Mutability::{ConstructionOnly, RuntimeMutable};
use ParamKind::{Flag, Fraction, Integer};

/// The full declared parameter universe.
///
/// Any name outside this table is rejected by every operation, however
/// plausible it looks.
pub static PARAMETER_UNIVERSE: &[ParameterDefinition] = &[
    // Construction-only: population, seeding and run length
    ParameterDefinition::new(
        "rng_seed",
        Integer,
        ConstructionOnly,
        1.0,
        "Seed for the kernel's random number generator",
    ),
    ParameterDefinition::new(
        "n_total",
        Integer,
        ConstructionOnly,
        10_000.0,
        "Total population size",
    ),
    ParameterDefinition::new(
        "end_time",
        Integer,
        ConstructionOnly,
        100.0,
        "Number of simulated days in a complete run",
    ),
    ParameterDefinition::new(
        "n_seed_infection",
        Integer,
        ConstructionOnly,
        10.0,
        "Individuals infected at the start of the run",
    ),
    ParameterDefinition::new(
        "days_of_interactions",
        Integer,
        ConstructionOnly,
        10.0,
        "Days of interaction history retained for tracing",
    ),
    ParameterDefinition::new(
        "mean_daily_interactions",
        Integer,
        ConstructionOnly,
        13.0,
        "Mean interactions per individual per day",
    ),
    ParameterDefinition::new(
        "lockdown_days_constant",
        Integer,
        ConstructionOnly,
        30.0,
        "Default lockdown duration, in days",
    ),
    // Construction-only: transmission characteristics
    ParameterDefinition::new(
        "infection_prob_per_contact",
        Fraction,
        ConstructionOnly,
        0.03,
        "Probability that a single infectious contact transmits",
    ),
    ParameterDefinition::new(
        "fraction_asymptomatic",
        Fraction,
        ConstructionOnly,
        0.34,
        "Fraction of infections that never develop symptoms",
    ),
    ParameterDefinition::new(
        "asymptomatic_infectious_factor",
        Fraction,
        ConstructionOnly,
        0.29,
        "Relative infectiousness of asymptomatic individuals",
    ),
    ParameterDefinition::new(
        "lockdown_multiplier",
        Fraction,
        ConstructionOnly,
        0.29,
        "Scaling applied to daily interactions while lockdown is on",
    ),
    ParameterDefinition::new(
        "case_fatality_fraction",
        Fraction,
        ConstructionOnly,
        0.01,
        "Fraction of infections that result in death",
    ),
    // Runtime-mutable: interventions that may be toggled between steps
    ParameterDefinition::new(
        "lockdown_on",
        Flag,
        RuntimeMutable,
        0.0,
        "Whether a population-wide lockdown is in force",
    ),
    ParameterDefinition::new(
        "app_turned_on",
        Flag,
        RuntimeMutable,
        0.0,
        "Whether the contact-tracing app is active",
    ),
    ParameterDefinition::new(
        "app_users_fraction",
        Fraction,
        RuntimeMutable,
        0.85,
        "Fraction of the population using the contact-tracing app",
    ),
    ParameterDefinition::new(
        "test_on_symptoms",
        Flag,
        RuntimeMutable,
        0.0,
        "Order a test when an individual develops symptoms",
    ),
    ParameterDefinition::new(
        "test_on_traced",
        Flag,
        RuntimeMutable,
        0.0,
        "Order a test when an individual is traced as a contact",
    ),
    ParameterDefinition::new(
        "quarantine_on_traced",
        Flag,
        RuntimeMutable,
        0.0,
        "Quarantine individuals traced as contacts",
    ),
    ParameterDefinition::new(
        "traceable_interaction_fraction",
        Fraction,
        RuntimeMutable,
        0.8,
        "Fraction of interactions recoverable by manual tracing",
    ),
    ParameterDefinition::new(
        "tracing_network_depth",
        Integer,
        RuntimeMutable,
        0.0,
        "Degrees of separation followed when tracing contacts",
    ),
    ParameterDefinition::new(
        "allow_clinical_diagnosis",
        Flag,
        RuntimeMutable,
        1.0,
        "Treat a clinical diagnosis as a positive result for tracing",
    ),
    ParameterDefinition::new(
        "quarantine_household_on_positive",
        Flag,
        RuntimeMutable,
        0.0,
        "Quarantine the household when a member tests positive",
    ),
    ParameterDefinition::new(
        "quarantine_household_on_symptoms",
        Flag,
        RuntimeMutable,
        0.0,
        "Quarantine the household when a member develops symptoms",
    ),
    ParameterDefinition::new(
        "quarantine_household_on_traced",
        Flag,
        RuntimeMutable,
        0.0,
        "Quarantine the household when a member is traced",
    ),
    ParameterDefinition::new(
        "quarantine_household_contacts_on_positive",
        Flag,
        RuntimeMutable,
        0.0,
        "Trace the contacts of household members of a positive case",
    ),
    ParameterDefinition::new(
        "quarantine_days",
        Integer,
        RuntimeMutable,
        7.0,
        "Days an individual remains in quarantine",
    ),
    ParameterDefinition::new(
        "test_order_wait",
        Integer,
        RuntimeMutable,
        1.0,
        "Days between ordering a test and taking it",
    ),
    ParameterDefinition::new(
        "test_result_wait",
        Integer,
        RuntimeMutable,
        1.0,
        "Days between taking a test and receiving the result",
    ),
    ParameterDefinition::new(
        "self_quarantine_fraction",
        Fraction,
        RuntimeMutable,
        0.8,
        "Fraction of symptomatic individuals who self-quarantine",
    ),
];

/// Immutable index over [`PARAMETER_UNIVERSE`].
///
/// Shared by every store and model in the process; built once behind
/// [`PARAMETER_REGISTRY`] and never mutated.
pub struct ParameterRegistry {
    by_name: HashMap<&'static str, &'static ParameterDefinition>,
}

impl ParameterRegistry {
    fn from_universe(universe: &'static [ParameterDefinition]) -> Self {
        let mut by_name = HashMap::with_capacity(universe.len());
        for def in universe {
            let previous = by_name.insert(def.name, def);
            assert!(
                previous.is_none(),
                "parameter '{}' declared twice in the universe",
                def.name
            );
        }
        Self { by_name }
    }

    /// Look up a declaration by name.
    pub fn get(&self, name: &str) -> Option<&'static ParameterDefinition> {
        self.by_name.get(name).copied()
    }

    /// Whether `name` belongs to the declared universe.
    pub fn is_declared(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// All declarations, sorted by name for stable output.
    pub fn list(&self) -> Vec<&'static ParameterDefinition> {
        let mut result: Vec<_> = self.by_name.values().copied().collect();
        result.sort_by_key(|def| def.name);
        result
    }

    /// Names permitted for runtime mutation, sorted.
    pub fn runtime_mutable(&self) -> Vec<&'static str> {
        let mut result: Vec<_> = self
            .by_name
            .values()
            .filter(|def| def.mutability == Mutability::RuntimeMutable)
            .map(|def| def.name)
            .collect();
        result.sort_unstable();
        result
    }

    /// Number of declared parameters.
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

/// Global parameter registry instance.
pub static PARAMETER_REGISTRY: LazyLock<ParameterRegistry> =
    LazyLock::new(|| ParameterRegistry::from_universe(PARAMETER_UNIVERSE));
