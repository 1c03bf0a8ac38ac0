//! Parameter registry - ordered placeholder -> value bindings for one compile call.

use indexmap::IndexMap;
use serde_json::{Map, Value};

use super::value::SqlValue;

/// Ordered collection of generated placeholders and the literals bound to them.
///
/// Names are `@0`, `@1`, … assigned by a monotonically increasing counter in
/// the order values are registered, which is also the order they are first
/// referenced in the emitted text. A name is never reused within a registry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterRegistry {
    bindings: IndexMap<String, SqlValue>,
    next_index: usize,
}

impl ParameterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a value and return its placeholder name.
    pub fn register(&mut self, value: impl Into<SqlValue>) -> String {
        let name = format!("@{}", self.next_index);
        self.next_index += 1;
        self.bindings.insert(name.clone(), value.into());
        name
    }

    pub fn get(&self, name: &str) -> Option<&SqlValue> {
        self.bindings.get(name)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Bindings in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SqlValue)> {
        self.bindings.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn into_bindings(self) -> IndexMap<String, SqlValue> {
        self.bindings
    }

    /// Bindings as an ordered JSON object.
    pub fn to_json(&self) -> Value {
        let map: Map<String, Value> = self
            .bindings
            .iter()
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect();
        Value::Object(map)
    }
}
