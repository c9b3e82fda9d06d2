//! Responses, GraphQL errors and transport failures
//!
//! [`OperationError`] is the loosely shaped failure a transport reports. The
//! conflict resolver classifies it once into a closed signal; nothing else
//! inspects its fields.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One segment of a response path
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    /// Object key
    Key(String),
    /// List index
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => f.write_str(key),
            Self::Index(index) => write!(f, "{index}"),
        }
    }
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        Self::Key(key.to_string())
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

/// Render a path as `a.0.b`
pub fn render_path(path: &[PathSegment]) -> String {
    path.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(".")
}

/// A GraphQL error entry as returned by the server
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphQLError {
    /// Human readable message
    #[serde(default)]
    pub message: String,
    /// Server-specific classification, e.g. `DynamoDB:ConditionalCheckFailedException`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    /// Server-side data attached to the error (current remote state for
    /// conditional-check failures)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Response path the error applies to
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<PathSegment>,
}

impl GraphQLError {
    /// Create an error with a message only
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    /// Set the error type
    pub fn with_error_type(mut self, error_type: impl Into<String>) -> Self {
        self.error_type = Some(error_type.into());
        self
    }

    /// Attach data
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Set the path
    pub fn with_path(mut self, path: impl IntoIterator<Item = PathSegment>) -> Self {
        self.path = path.into_iter().collect();
        self
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// A single result emitted on a link stream
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GraphQLResponse {
    /// Result data
    #[serde(default)]
    pub data: Option<Value>,
    /// Errors reported alongside the data
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<GraphQLError>,
    /// Whether this is a locally computed optimistic result
    #[serde(default, skip_serializing_if = "is_false")]
    pub optimistic: bool,
}

impl GraphQLResponse {
    /// A response carrying data only
    pub fn from_data(data: Value) -> Self {
        Self {
            data: Some(data),
            ..Self::default()
        }
    }

    /// An optimistic response
    pub fn optimistic(data: Value) -> Self {
        Self {
            data: Some(data),
            errors: Vec::new(),
            optimistic: true,
        }
    }
}

/// Network-level failure reported by a transport
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, thiserror::Error)]
#[serde(rename_all = "camelCase")]
#[error("Network error: {message}")]
pub struct NetworkError {
    /// Human readable message
    #[serde(default)]
    pub message: String,
    /// HTTP status, when there was one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    /// Errors raised on the client side of the transport
    #[serde(default, rename = "graphQLErrors")]
    pub graphql_errors: Vec<GraphQLError>,
}

impl NetworkError {
    /// Create a network error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    /// Set the HTTP status
    pub fn with_status(mut self, status: u16) -> Self {
        self.status_code = Some(status);
        self
    }

    /// Attach client-side errors
    pub fn with_graphql_errors(mut self, errors: impl IntoIterator<Item = GraphQLError>) -> Self {
        self.graphql_errors = errors.into_iter().collect();
        self
    }
}

/// Failure of a GraphQL operation as surfaced by the transport
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, thiserror::Error)]
#[serde(rename_all = "camelCase")]
#[error("Operation failed: {message}")]
pub struct OperationError {
    /// Human readable message
    #[serde(default)]
    pub message: String,
    /// Errors from the GraphQL response
    #[serde(default, rename = "graphQLErrors")]
    pub graphql_errors: Vec<GraphQLError>,
    /// Transport failure, if the request did not complete
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_error: Option<NetworkError>,
    /// Whether retrying can never succeed
    #[serde(default)]
    pub permanent: bool,
}

impl OperationError {
    /// Create an error with a message only
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    /// Error made of GraphQL errors
    pub fn from_graphql(errors: impl IntoIterator<Item = GraphQLError>) -> Self {
        let graphql_errors: Vec<GraphQLError> = errors.into_iter().collect();
        let message = graphql_errors
            .first()
            .map(|err| err.message.clone())
            .unwrap_or_else(|| "GraphQL error".to_string());
        Self {
            message,
            graphql_errors,
            ..Self::default()
        }
    }

    /// Error wrapping a network failure
    pub fn from_network(network: NetworkError) -> Self {
        Self {
            message: network.message.clone(),
            network_error: Some(network),
            ..Self::default()
        }
    }

    /// Mark as permanent
    pub fn permanent(mut self) -> Self {
        self.permanent = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn path_renders_dotted() {
        let path = vec![PathSegment::from("todos"), 2.into(), "title".into()];
        assert_eq!(render_path(&path), "todos.2.title");
    }

    #[test]
    fn optimistic_flag_is_omitted_when_false() {
        let value = serde_json::to_value(GraphQLResponse::from_data(json!({}))).unwrap();
        assert_eq!(value, json!({ "data": {} }));
        let value = serde_json::to_value(GraphQLResponse::optimistic(json!({}))).unwrap();
        assert_eq!(value, json!({ "data": {}, "optimistic": true }));
    }

    #[test]
    fn operation_error_parses_loose_payloads() {
        let raw = json!({
            "message": "conflict",
            "graphQLErrors": [{
                "message": "The conditional request failed",
                "errorType": "DynamoDB:ConditionalCheckFailedException",
                "data": { "v": 1 },
                "path": ["updateTodo", 0]
            }]
        });
        let err: OperationError = serde_json::from_value(raw).unwrap();
        assert!(!err.permanent);
        assert!(err.network_error.is_none());
        assert_eq!(
            err.graphql_errors[0].path,
            vec![PathSegment::Key("updateTodo".into()), PathSegment::Index(0)]
        );
    }
}
