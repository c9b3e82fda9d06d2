//! Shared todo-list fixtures
//!
//! A small schema used throughout the link tests:
//!
//! ```graphql
//! query   { todos { id title done } }
//! query   ($id: ID!) { todo(id: $id) { id title } }
//! mutation($title: String!) { addTodo(title: $title) { id title done } }
//! mutation($id: ID!, $version: Int!) { updateTodo(id: $id, version: $version) { id version } }
//! ```

use serde_json::{json, Value};
use tideline_core::{
    store_field_name, ArgumentValue, Document, Effect, Field, GraphQLError, NetworkError,
    NormalizedSnapshot, Operation, OperationError, PathSegment, QueueAction, Variables,
};

/// Error type the server reports for a failed conditional write
pub const CONDITIONAL_CHECK_FAILED: &str = "DynamoDB:ConditionalCheckFailedException";

/// Build variables from a JSON object literal
pub fn vars(value: Value) -> Variables {
    match value {
        Value::Object(map) => map,
        _ => Variables::new(),
    }
}

fn todo_selection() -> [Field; 3] {
    [Field::new("id"), Field::new("title"), Field::new("done")]
}

fn todo_field() -> Field {
    Field::new("todo")
        .arg("id", ArgumentValue::variable("id"))
        .select([Field::new("id"), Field::new("title")])
}

/// `query { todos { id title done } }`
pub fn todos_query() -> Document {
    Document::query([Field::new("todos").select(todo_selection())]).named("ListTodos")
}

/// `query ($id: ID!) { todo(id: $id) { id title } }`
pub fn todo_query() -> Document {
    Document::query([todo_field()]).named("GetTodo")
}

/// `mutation ($title: String!) { addTodo(title: $title) { id title done } }`
pub fn add_todo_mutation() -> Document {
    Document::mutation([Field::new("addTodo")
        .arg("title", ArgumentValue::variable("title"))
        .select(todo_selection())])
    .named("AddTodo")
}

/// `mutation ($id: ID!, $version: Int!) { updateTodo(id: $id, version: $version) { id version } }`
pub fn update_todo_mutation() -> Document {
    Document::mutation([Field::new("updateTodo")
        .arg("id", ArgumentValue::variable("id"))
        .arg("version", ArgumentValue::variable("version"))
        .select([Field::new("id"), Field::new("version")])])
    .named("UpdateTodo")
}

/// `subscription { onAddTodo { id } }`
pub fn on_add_todo_subscription() -> Document {
    Document::subscription([Field::new("onAddTodo").select([Field::new("id")])])
}

/// Snapshot with two todos reachable from `todos` and `todo(id: "1")`
pub fn todo_snapshot() -> NormalizedSnapshot {
    let todo_key = store_field_name(&todo_field(), &vars(json!({ "id": "1" })));
    NormalizedSnapshot::new()
        .with_entity(
            "ROOT_QUERY",
            json!({
                "todos": [
                    NormalizedSnapshot::reference("Todo:1"),
                    NormalizedSnapshot::reference("Todo:2"),
                ],
                todo_key: NormalizedSnapshot::reference("Todo:1"),
            }),
        )
        .with_entity(
            "Todo:1",
            json!({ "__typename": "Todo", "id": "1", "title": "Buy milk", "done": false }),
        )
        .with_entity(
            "Todo:2",
            json!({ "__typename": "Todo", "id": "2", "title": "Walk dog", "done": true }),
        )
}

/// `addTodo` with an optimistic response echoing the title
pub fn add_todo(title: &str) -> Operation {
    Operation::new(add_todo_mutation(), vars(json!({ "title": title }))).with_optimistic_response(
        json!({ "addTodo": { "id": "temp-1", "title": title, "done": false } }),
    )
}

/// `updateTodo` without an optimistic response
pub fn update_todo(id: &str, version: i64) -> Operation {
    Operation::new(
        update_todo_mutation(),
        vars(json!({ "id": id, "version": version })),
    )
}

/// Enqueue action for `updateTodo`, refetching the todo list
pub fn queued_update(id: &str, version: i64) -> QueueAction {
    QueueAction::enqueue(Effect::new(
        update_todo_mutation(),
        vars(json!({ "id": id, "version": version })),
        vec![todos_query()],
    ))
}

/// Conditional-check failure reporting `current` as the server's state
pub fn conditional_check_error(current: Value) -> OperationError {
    OperationError::from_graphql([GraphQLError::new("The conditional request failed")
        .with_error_type(CONDITIONAL_CHECK_FAILED)
        .with_data(current)
        .with_path([PathSegment::from("updateTodo")])])
}

/// Server-side validation failure
pub fn validation_error() -> OperationError {
    OperationError::from_graphql([GraphQLError::new("Validation error of type FieldUndefined")
        .with_error_type("ValidationError")])
}

/// Failure raised by the client side of the transport
pub fn client_protocol_error() -> OperationError {
    OperationError::from_network(NetworkError::new("Request rejected by client").with_graphql_errors([
        GraphQLError::new("No credentials").with_error_type("AWSAppSyncClient:NoCredentials"),
    ]))
}

/// Plain connectivity failure
pub fn network_failure() -> OperationError {
    OperationError::from_network(NetworkError::new("Network request failed"))
}
