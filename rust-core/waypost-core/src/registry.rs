//! # Pattern Type Registry
//!
//! Maps type tags to [`PatternType`] objects. Built once at startup and
//! shared read-only (behind an `Arc`) by the collection, the router and
//! the URL generator.

use crate::error::{Error, Result};
use crate::types::{PatternType, ScalarType};
use std::collections::HashMap;
use std::sync::Arc;

/// Registry of placeholder types keyed by tag
#[derive(Debug, Clone)]
pub struct PatternTypes {
    types: HashMap<String, Arc<dyn PatternType>>,
}

impl Default for PatternTypes {
    /// Registry with every built-in type registered
    fn default() -> Self {
        let mut types = Self::empty();
        types
            .register(ScalarType::int())
            .register(ScalarType::str())
            .register(ScalarType::slug())
            .register(ScalarType::alpha())
            .register(ScalarType::bool())
            .register(ScalarType::float())
            .register(ScalarType::year())
            .register(ScalarType::month())
            .register(ScalarType::day());
        types
    }
}

impl PatternTypes {
    /// Create a registry with no types registered
    #[must_use]
    pub fn empty() -> Self {
        Self {
            types: HashMap::new(),
        }
    }

    /// Register a type under its own tag, replacing any previous one
    pub fn register<T: PatternType + 'static>(&mut self, pattern_type: T) -> &mut Self {
        self.types
            .insert(pattern_type.tag().to_string(), Arc::new(pattern_type));
        self
    }

    /// Look up a type by tag
    #[must_use]
    pub fn get(&self, tag: &str) -> Option<&Arc<dyn PatternType>> {
        self.types.get(tag)
    }

    /// Resolve the type of `placeholder` (e.g. `<id:int>`) for `route`
    ///
    /// # Errors
    ///
    /// Returns `Error::UndefinedParameter` naming the placeholder and the
    /// route when the tag is not registered.
    pub fn resolve(&self, tag: &str, placeholder: &str, route: &str) -> Result<&Arc<dyn PatternType>> {
        self.get(tag)
            .ok_or_else(|| Error::undefined_parameter(placeholder, route))
    }

    /// Check whether a tag is registered
    #[must_use]
    pub fn contains(&self, tag: &str) -> bool {
        self.types.contains_key(tag)
    }

    /// Number of registered types
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Check if no types are registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
