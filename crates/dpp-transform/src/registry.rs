use std::collections::BTreeMap;

use crate::builtins;
use crate::outcome::TransformOutcome;
use dpp_model::TransformSpec;
use serde_json::Value;

/// A registered transform function.
pub type TransformFn = Box<dyn Fn(&Value, &TransformSpec) -> TransformOutcome + Send + Sync>;

/// Name-keyed transform functions.
///
/// Rules name their transform (`type: int`); the mapping engine resolves
/// names here once per configuration, so an unknown name fails before any
/// record is processed. Re-registering a name replaces the earlier function.
pub struct TransformRegistry {
    transforms: BTreeMap<String, TransformFn>,
}

impl TransformRegistry {
    /// An empty registry, for callers composing their own transform set.
    pub fn new() -> Self {
        Self {
            transforms: BTreeMap::new(),
        }
    }

    /// Registry with the built-in transforms.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("str", builtins::to_str);
        registry.register("int", builtins::to_int);
        registry.register("float", builtins::to_float);
        registry.register("datetime", builtins::to_datetime);
        registry.register("lookup", builtins::lookup);
        registry.register("template", builtins::template);
        registry.register("aggregate", builtins::aggregate);
        registry
    }

    pub fn register<F>(&mut self, name: &str, transform: F)
    where
        F: Fn(&Value, &TransformSpec) -> TransformOutcome + Send + Sync + 'static,
    {
        self.transforms.insert(name.to_string(), Box::new(transform));
    }

    pub fn get(&self, name: &str) -> Option<&TransformFn> {
        self.transforms.get(name)
    }

    /// Applies the named transform, or `None` when the name is unknown.
    pub fn apply(
        &self,
        name: &str,
        value: &Value,
        spec: &TransformSpec,
    ) -> Option<TransformOutcome> {
        self.get(name).map(|transform| transform(value, spec))
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        self.transforms.keys().cloned().collect()
    }
}

impl Default for TransformRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}
