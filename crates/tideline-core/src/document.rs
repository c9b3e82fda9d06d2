//! Pre-parsed GraphQL operation documents
//!
//! Parsing happens upstream of the link. A [`Document`] is the part of the
//! parsed AST the link needs: the operation kind, an optional name, and the
//! selection tree used to read answers out of the normalized cache.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::operation::Variables;

/// Kind of a GraphQL operation, taken from its operation definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    /// Read operation
    Query,
    /// Write operation
    Mutation,
    /// Long-lived subscription; always forwarded untouched
    Subscription,
}

impl OperationKind {
    /// Keyword used for this kind in GraphQL source
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Mutation => "mutation",
            Self::Subscription => "subscription",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value bound to a field argument
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ArgumentValue {
    /// Inline literal
    Literal(Value),
    /// Reference to an operation variable (`$name`)
    Variable(String),
}

impl ArgumentValue {
    /// Shorthand for a literal argument
    pub fn literal(value: impl Into<Value>) -> Self {
        Self::Literal(value.into())
    }

    /// Shorthand for a variable reference
    pub fn variable(name: impl Into<String>) -> Self {
        Self::Variable(name.into())
    }

    /// Resolve against bound variables.
    ///
    /// Returns `None` for a variable with no binding.
    pub fn resolve(&self, variables: &Variables) -> Option<Value> {
        match self {
            Self::Literal(value) => Some(value.clone()),
            Self::Variable(name) => variables.get(name).cloned(),
        }
    }
}

/// A selected field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    /// Schema field name
    pub name: String,
    /// Response alias, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    /// Arguments by name
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub arguments: BTreeMap<String, ArgumentValue>,
    /// Sub-selection; empty for leaf fields
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub selection_set: Vec<Field>,
}

impl Field {
    /// Create a leaf field
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: None,
            arguments: BTreeMap::new(),
            selection_set: Vec::new(),
        }
    }

    /// Set the response alias
    pub fn aliased(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Add an argument
    pub fn arg(mut self, name: impl Into<String>, value: ArgumentValue) -> Self {
        self.arguments.insert(name.into(), value);
        self
    }

    /// Replace the sub-selection
    pub fn select(mut self, fields: impl IntoIterator<Item = Field>) -> Self {
        self.selection_set = fields.into_iter().collect();
        self
    }

    /// Key under which this field appears in a response
    pub fn response_key(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    /// Whether the field selects a scalar
    pub fn is_leaf(&self) -> bool {
        self.selection_set.is_empty()
    }
}

/// A single-operation GraphQL document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Operation kind
    pub kind: OperationKind,
    /// Operation name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Root selection
    pub selection_set: Vec<Field>,
}

impl Document {
    /// Create a document of the given kind
    pub fn new(kind: OperationKind, selection_set: impl IntoIterator<Item = Field>) -> Self {
        Self {
            kind,
            name: None,
            selection_set: selection_set.into_iter().collect(),
        }
    }

    /// Create a query document
    pub fn query(selection_set: impl IntoIterator<Item = Field>) -> Self {
        Self::new(OperationKind::Query, selection_set)
    }

    /// Create a mutation document
    pub fn mutation(selection_set: impl IntoIterator<Item = Field>) -> Self {
        Self::new(OperationKind::Mutation, selection_set)
    }

    /// Create a subscription document
    pub fn subscription(selection_set: impl IntoIterator<Item = Field>) -> Self {
        Self::new(OperationKind::Subscription, selection_set)
    }

    /// Set the operation name
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Name of the first root field, e.g. `updateTodo` for
    /// `mutation { updateTodo(...) { id } }`.
    pub fn operation_field_name(&self) -> Option<&str> {
        self.selection_set.first().map(|field| field.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn response_key_prefers_alias() {
        let field = Field::new("todo").aliased("first");
        assert_eq!(field.response_key(), "first");
        assert_eq!(Field::new("todo").response_key(), "todo");
    }

    #[test]
    fn operation_field_name_uses_first_root_field() {
        let doc = Document::mutation([Field::new("updateTodo"), Field::new("touch")]);
        assert_eq!(doc.operation_field_name(), Some("updateTodo"));
        assert_eq!(Document::query([]).operation_field_name(), None);
    }

    #[test]
    fn unbound_variable_resolves_to_none() {
        let mut vars = Variables::new();
        vars.insert("id".into(), json!("1"));
        assert_eq!(ArgumentValue::variable("id").resolve(&vars), Some(json!("1")));
        assert_eq!(ArgumentValue::variable("other").resolve(&vars), None);
        assert_eq!(ArgumentValue::literal(3).resolve(&vars), Some(json!(3)));
    }

    #[test]
    fn documents_serialize_compactly() {
        let doc = Document::query([Field::new("todo")
            .arg("id", ArgumentValue::variable("id"))
            .select([Field::new("title")])])
        .named("GetTodo");
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(
            value,
            json!({
                "kind": "query",
                "name": "GetTodo",
                "selectionSet": [{
                    "name": "todo",
                    "arguments": { "id": { "kind": "variable", "value": "id" } },
                    "selectionSet": [{ "name": "title" }]
                }]
            })
        );
    }
}
