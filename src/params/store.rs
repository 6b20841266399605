//! Two-tier parameter store.
//!
//! The store holds a current value for every parameter in the declared
//! universe. Construction-time writes ([`ParameterStore::set`]) may target
//! either mutability class; once the store is sealed (which the model does
//! on the first step-advance) the construction-only class is frozen and the
//! governed [`ParameterStore::update`] path is the only way to change a
//! value.

use log::debug;
use std::collections::{BTreeMap, HashMap};

use super::definition::{Mutability, ParamValue, ParameterDefinition, PARAMETER_REGISTRY};
use crate::errors::{ModelError, ModelResult};

/// Current values for the full parameter universe.
///
/// Exclusively owned by one model; `get` and `update` are not atomic with
/// respect to concurrent access, so sharing across threads needs external
/// synchronisation.
#[derive(Debug, Clone)]
pub struct ParameterStore {
    values: HashMap<&'static str, ParamValue>,
    sealed: bool,
}

impl ParameterStore {
    /// Build a store holding the universe defaults.
    pub fn from_defaults() -> Self {
        let values = PARAMETER_REGISTRY
            .list()
            .into_iter()
            .map(|def| (def.name, def.default))
            .collect();
        Self {
            values,
            sealed: false,
        }
    }

    /// Build a store from a baseline record applied on top of the defaults.
    ///
    /// The baseline is typically one row of a parameter template. Every
    /// entry must name a declared parameter and pass its kind's range check;
    /// mutability is not consulted since nothing is frozen yet.
    pub fn from_baseline<K, I>(baseline: I) -> ModelResult<Self>
    where
        K: AsRef<str>,
        I: IntoIterator<Item = (K, ParamValue)>,
    {
        let mut store = Self::from_defaults();
        for (name, value) in baseline {
            store.set(name.as_ref(), value)?;
        }
        Ok(store)
    }

    fn definition(name: &str) -> ModelResult<&'static ParameterDefinition> {
        PARAMETER_REGISTRY
            .get(name)
            .ok_or_else(|| ModelError::UnknownParameter(name.to_string()))
    }

    /// Current value of a parameter.
    pub fn get(&self, name: &str) -> ModelResult<ParamValue> {
        let def = Self::definition(name)?;
        Ok(self.values[def.name])
    }

    /// Construction-time write, valid for either mutability class.
    ///
    /// Fails with `ImmutableParameter` once the store has been sealed: from
    /// that point the construction-only class is frozen and runtime-mutable
    /// parameters must go through [`ParameterStore::update`].
    pub fn set(&mut self, name: &str, value: ParamValue) -> ModelResult<()> {
        let def = Self::definition(name)?;
        if self.sealed {
            return Err(ModelError::ImmutableParameter(name.to_string()));
        }
        let value = def.kind.validate(def.name, value)?;
        self.values.insert(def.name, value);
        Ok(())
    }

    /// Governed runtime write.
    ///
    /// Checks run in order: the name must be declared, it must be classified
    /// runtime-mutable, and the value must pass the kind's range check. Any
    /// failure leaves the stored value untouched; on success the new value
    /// is visible to all subsequent reads and to the kernel on the next
    /// step-advance.
    pub fn update(&mut self, name: &str, value: ParamValue) -> ModelResult<()> {
        let def = Self::definition(name)?;
        if def.mutability == Mutability::ConstructionOnly {
            return Err(ModelError::ImmutableParameter(name.to_string()));
        }
        let value = def.kind.validate(def.name, value)?;
        debug!("updated running parameter {} = {}", def.name, value);
        self.values.insert(def.name, value);
        Ok(())
    }

    /// Freeze the construction-only class.
    ///
    /// Called by the model on the first step-advance. Idempotent.
    pub fn seal(&mut self) {
        if !self.sealed {
            debug!("parameter store sealed; construction-only parameters frozen");
            self.sealed = true;
        }
    }

    /// Whether the construction-only class has been frozen.
    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Every current value, sorted by name for stable output.
    pub fn resolved(&self) -> BTreeMap<&'static str, ParamValue> {
        self.values.iter().map(|(name, value)| (*name, *value)).collect()
    }
}
