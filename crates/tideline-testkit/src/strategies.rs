//! Property test strategies for link types
//!
//! Strategies for the failure shapes a replay can produce and for the
//! operations the interceptor routes. They generate small values so shrinking
//! stays fast.

use proptest::prelude::*;

// Re-export proptest for convenience
pub use proptest;

use serde_json::{json, Value};
use tideline_core::{
    Document, Field, GraphQLError, NetworkError, Operation, OperationError, OperationKind,
};

use crate::fixtures::{vars, CONDITIONAL_CHECK_FAILED};

/// Small JSON scalars
pub fn arb_scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        (-1000i64..1000).prop_map(Value::from),
        "[a-z]{0,8}".prop_map(Value::from),
    ]
}

/// A `errorType` drawn from the kinds of failures a replay sees
pub fn arb_error_type() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        Just(None),
        Just(Some(CONDITIONAL_CHECK_FAILED.to_string())),
        Just(Some("ValidationError".to_string())),
        Just(Some("AWSAppSyncClient:NoCredentials".to_string())),
        "[A-Z][a-z]{2,6}:[A-Z][a-z]{2,6}".prop_map(Some),
    ]
}

/// A GraphQL error with an arbitrary type and optional data
pub fn arb_graphql_error() -> impl Strategy<Value = GraphQLError> {
    (arb_error_type(), proptest::option::of(arb_scalar())).prop_map(|(error_type, data)| {
        let mut error = GraphQLError::new("replay failed");
        error.error_type = error_type;
        error.data = data.map(|value| json!({ "current": value }));
        error
    })
}

/// Any replay failure: GraphQL errors, a network error, both or neither
pub fn arb_operation_error() -> impl Strategy<Value = OperationError> {
    (
        proptest::collection::vec(arb_graphql_error(), 0..3),
        proptest::option::of((
            proptest::option::of(400u16..600),
            proptest::collection::vec(arb_graphql_error(), 0..2),
        )),
        any::<bool>(),
    )
        .prop_map(|(graphql_errors, network, permanent)| {
            let mut error = OperationError::new("replay failed");
            error.graphql_errors = graphql_errors;
            error.network_error = network.map(|(status, errors)| {
                let mut network = NetworkError::new("transport failure").with_graphql_errors(errors);
                network.status_code = status;
                network
            });
            error.permanent = permanent;
            error
        })
}

/// Operation kind
pub fn arb_operation_kind() -> impl Strategy<Value = OperationKind> {
    prop_oneof![
        Just(OperationKind::Query),
        Just(OperationKind::Mutation),
        Just(OperationKind::Subscription),
    ]
}

/// A single-field operation of any kind, optionally flagged as a replay
pub fn arb_operation() -> impl Strategy<Value = Operation> {
    (arb_operation_kind(), "[a-z][a-zA-Z]{0,8}", arb_scalar(), any::<bool>()).prop_map(
        |(kind, field, value, is_replay)| {
            let document = Document::new(kind, [Field::new(field)]);
            let operation = Operation::new(document, vars(json!({ "input": value })));
            if is_replay {
                operation.as_replay()
            } else {
                operation
            }
        },
    )
}
