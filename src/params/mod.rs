//! Parameter governance.
//!
//! Parameters come in two tiers: construction-only values that are frozen
//! once stepping begins, and a fixed allow-list of runtime-mutable values
//! that may change between steps. The declared universe lives in
//! [`definition`]; per-run values live in a [`ParameterStore`]; tabular
//! input and run staging live in [`template`].

mod definition;
mod store;
mod template;

pub use definition::{
    Mutability, ParamKind, ParamValue, ParameterDefinition, ParameterRegistry,
    PARAMETER_REGISTRY, PARAMETER_UNIVERSE,
};
pub use store::ParameterStore;
pub use template::{HouseholdDemographics, TemplateInput, HOUSEHOLD_BINS};
