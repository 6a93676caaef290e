//! Registry of check types.
//!
//! Check types are registered explicitly at startup; a definition read from
//! the checks file is turned into a check by the factory of its type.

use std::collections::BTreeMap;

use log::debug;
use serde_yaml::Value;

use crate::checks::yaml::{YAML, YamlCheck};
use crate::checks::{Check, CheckError};
use crate::types::CheckType;

/// Builds a check from its raw definition.
pub type CheckFactory = fn(Value) -> Result<Box<dyn Check>, CheckError>;

/// Map from check type to the factory building checks of that type.
#[derive(Debug, Clone, Default)]
pub struct CheckRegistry {
    factories: BTreeMap<CheckType, CheckFactory>,
}

impl CheckRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with every built-in check type.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(YAML, YamlCheck::factory);
        registry
    }

    pub fn register(&mut self, check_type: impl Into<CheckType>, factory: CheckFactory) {
        let check_type = check_type.into();
        debug!("Registering check type '{}'", check_type);
        self.factories.insert(check_type, factory);
    }

    pub fn is_registered(&self, check_type: &CheckType) -> bool {
        self.factories.contains_key(check_type)
    }

    /// Registered types, in sorted order.
    pub fn types(&self) -> impl Iterator<Item = &CheckType> {
        self.factories.keys()
    }

    /// Build and initialise a check from its definition.
    pub fn create(&self, check_type: &CheckType, definition: Value) -> Result<Box<dyn Check>, CheckError> {
        let factory = self
            .factories
            .get(check_type)
            .ok_or_else(|| CheckError::UnknownType(check_type.to_string()))?;
        let mut check = factory(definition)?;
        check.init(check_type);
        Ok(check)
    }
}
