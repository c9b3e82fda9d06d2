//! Operations and their context bag

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::document::{Document, OperationKind};

/// Variable bindings of an operation
pub type Variables = Map<String, Value>;

type OptimisticFn = dyn Fn(&Variables) -> Value + Send + Sync;

/// Locally computed stand-in for a mutation's eventual server response
#[derive(Clone)]
pub enum OptimisticResponse {
    /// Fixed value
    Static(Value),
    /// Value computed from the operation's variables
    Computed(Arc<OptimisticFn>),
}

impl OptimisticResponse {
    /// Wrap a function of the variables
    pub fn computed<F>(f: F) -> Self
    where
        F: Fn(&Variables) -> Value + Send + Sync + 'static,
    {
        Self::Computed(Arc::new(f))
    }

    /// Produce the optimistic value for these variables
    pub fn evaluate(&self, variables: &Variables) -> Value {
        match self {
            Self::Static(value) => value.clone(),
            Self::Computed(f) => f(variables),
        }
    }
}

impl fmt::Debug for OptimisticResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(value) => f.debug_tuple("Static").field(value).finish(),
            Self::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

impl From<Value> for OptimisticResponse {
    fn from(value: Value) -> Self {
        Self::Static(value)
    }
}

/// Context attached to an operation
#[derive(Debug, Clone, Default)]
pub struct OperationContext {
    /// Declared optimistic response, if any
    pub optimistic_response: Option<OptimisticResponse>,
    /// Queries to refetch once the mutation lands
    pub refetch_queries: Vec<Document>,
    /// Set by the replayer so the link forwards instead of enqueueing
    pub is_replay: bool,
    /// Context keys owned by other links
    pub extensions: Map<String, Value>,
}

/// A single GraphQL request travelling through the link chain
#[derive(Debug, Clone)]
pub struct Operation {
    /// Parsed document
    pub document: Document,
    /// Variable bindings
    pub variables: Variables,
    /// Context bag
    pub context: OperationContext,
}

impl Operation {
    /// Create an operation with an empty context
    pub fn new(document: Document, variables: Variables) -> Self {
        Self {
            document,
            variables,
            context: OperationContext::default(),
        }
    }

    /// Kind of the operation, from its document
    pub fn kind(&self) -> OperationKind {
        self.document.kind
    }

    /// Operation name, if the document declares one
    pub fn name(&self) -> Option<&str> {
        self.document.name.as_deref()
    }

    /// Declare an optimistic response
    pub fn with_optimistic_response(mut self, response: impl Into<OptimisticResponse>) -> Self {
        self.context.optimistic_response = Some(response.into());
        self
    }

    /// Declare queries to refetch after the mutation
    pub fn with_refetch_queries(mut self, queries: impl IntoIterator<Item = Document>) -> Self {
        self.context.refetch_queries = queries.into_iter().collect();
        self
    }

    /// Mark this operation as a replay of a queued effect
    pub fn as_replay(mut self) -> Self {
        self.context.is_replay = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Field;
    use serde_json::json;

    fn vars(value: Value) -> Variables {
        match value {
            Value::Object(map) => map,
            _ => Variables::new(),
        }
    }

    #[test]
    fn computed_response_sees_variables() {
        let response = OptimisticResponse::computed(|v| json!({ "echo": v.get("title") }));
        let out = response.evaluate(&vars(json!({ "title": "milk" })));
        assert_eq!(out, json!({ "echo": "milk" }));
    }

    #[test]
    fn builder_sets_context() {
        let op = Operation::new(Document::mutation([Field::new("addTodo")]), Variables::new())
            .with_optimistic_response(json!({ "addTodo": null }))
            .as_replay();
        assert_eq!(op.kind(), OperationKind::Mutation);
        assert!(op.context.is_replay);
        assert!(op.context.optimistic_response.is_some());
    }
}
