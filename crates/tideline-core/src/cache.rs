//! Read-only view of the normalized cache snapshot
//!
//! The cache engine itself is external. What the link sees is a snapshot:
//! entities keyed by id, each a map from store field name to JSON value.
//! References between entities are objects of the form `{"__ref": "<id>"}`.
//!
//! # Store field names
//!
//! A field without arguments is stored under its schema name. A field with
//! arguments is stored under `name({...})` where the braces hold the
//! resolved arguments as JSON with keys in sorted order. Variables with no
//! binding are left out of the key.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::document::Field;
use crate::operation::Variables;

/// Key marking an entity reference inside a cached value
pub const REFERENCE_KEY: &str = "__ref";

/// Entity id of the root query object
pub const DEFAULT_ROOT_QUERY_ID: &str = "ROOT_QUERY";

/// An offline read could not be satisfied
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("Cache miss: no cached value at '{path}'")]
pub struct CacheMissError {
    /// Response path of the missing field (or entity)
    pub path: String,
}

impl CacheMissError {
    /// Create a cache miss for a response path
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

/// Snapshot of the normalized cache
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NormalizedSnapshot {
    entities: BTreeMap<String, Map<String, Value>>,
}

impl NormalizedSnapshot {
    /// Empty snapshot
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`insert_entity`](Self::insert_entity)
    pub fn with_entity(mut self, id: impl Into<String>, fields: Value) -> Self {
        self.insert_entity(id, fields);
        self
    }

    /// Insert or replace an entity. Non-object values are stored as an
    /// empty entity.
    pub fn insert_entity(&mut self, id: impl Into<String>, fields: Value) {
        let fields = match fields {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        self.entities.insert(id.into(), fields);
    }

    /// Look up an entity by id
    pub fn entity(&self, id: &str) -> Option<&Map<String, Value>> {
        self.entities.get(id)
    }

    /// Number of entities
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether the snapshot holds no entities
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Build a reference value pointing at `id`
    pub fn reference(id: impl Into<String>) -> Value {
        let mut map = Map::new();
        map.insert(REFERENCE_KEY.to_string(), Value::String(id.into()));
        Value::Object(map)
    }

    /// Entity id a value refers to, if it is a reference
    pub fn as_reference(value: &Value) -> Option<&str> {
        value.as_object()?.get(REFERENCE_KEY)?.as_str()
    }
}

/// Key a field's value is stored under in its parent entity
pub fn store_field_name(field: &Field, variables: &Variables) -> String {
    if field.arguments.is_empty() {
        return field.name.clone();
    }

    let args: Map<String, Value> = field
        .arguments
        .iter()
        .filter_map(|(name, value)| value.resolve(variables).map(|v| (name.clone(), v)))
        .collect();

    format!("{}({})", field.name, Value::Object(args))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::ArgumentValue;
    use serde_json::json;

    #[test]
    fn plain_fields_use_their_name() {
        assert_eq!(store_field_name(&Field::new("todos"), &Variables::new()), "todos");
    }

    #[test]
    fn arguments_are_sorted_and_substituted() {
        let field = Field::new("todo")
            .arg("id", ArgumentValue::variable("id"))
            .arg("archived", ArgumentValue::literal(false));
        let mut vars = Variables::new();
        vars.insert("id".into(), json!("7"));
        assert_eq!(
            store_field_name(&field, &vars),
            r#"todo({"archived":false,"id":"7"})"#
        );
    }

    #[test]
    fn unbound_variables_are_dropped_from_key() {
        let field = Field::new("todo").arg("id", ArgumentValue::variable("id"));
        assert_eq!(store_field_name(&field, &Variables::new()), "todo({})");
    }

    #[test]
    fn references_round_trip() {
        let reference = NormalizedSnapshot::reference("Todo:1");
        assert_eq!(NormalizedSnapshot::as_reference(&reference), Some("Todo:1"));
        assert_eq!(NormalizedSnapshot::as_reference(&json!({ "id": 1 })), None);
    }
}
