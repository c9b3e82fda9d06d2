//! Effect encoder
//!
//! Turns a mutation operation into a durable enqueue action plus, when one
//! was declared, the optimistic result to hand back to the caller.

use serde_json::Value;
use tideline_core::{Effect, Operation, OperationKind, QueueAction};

/// Output of encoding a mutation
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedMutation {
    /// Enqueue action to dispatch to the store
    pub action: QueueAction,
    /// Optimistic result, if the operation declared one
    pub optimistic: Option<Value>,
}

/// Encodes mutations into queue actions
#[derive(Debug, Clone, Copy, Default)]
pub struct EffectEncoder;

impl EffectEncoder {
    /// Encode `operation`.
    ///
    /// Returns `None` for replays (the operation must reach the network
    /// untouched) and for anything that is not a mutation.
    pub fn encode(operation: &Operation) -> Option<EncodedMutation> {
        if operation.kind() != OperationKind::Mutation || operation.context.is_replay {
            return None;
        }

        let optimistic = operation
            .context
            .optimistic_response
            .as_ref()
            .map(|response| response.evaluate(&operation.variables));

        let effect = Effect::new(
            operation.document.clone(),
            operation.variables.clone(),
            operation.context.refetch_queries.clone(),
        );

        tracing::debug!(
            mutation = operation.document.operation_field_name().unwrap_or("<anonymous>"),
            optimistic = optimistic.is_some(),
            "Encoded mutation effect"
        );

        Some(EncodedMutation {
            action: QueueAction::enqueue(effect),
            optimistic,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tideline_core::{ActionKind, Document, Field, OptimisticResponse, Variables};

    fn mutation() -> Operation {
        let mut vars = Variables::new();
        vars.insert("title".into(), json!("milk"));
        Operation::new(Document::mutation([Field::new("addTodo")]), vars)
    }

    #[test]
    fn replay_encodes_nothing() {
        assert!(EffectEncoder::encode(&mutation().as_replay()).is_none());
    }

    #[test]
    fn queries_encode_nothing() {
        let op = Operation::new(Document::query([Field::new("todos")]), Variables::new());
        assert!(EffectEncoder::encode(&op).is_none());
    }

    #[test]
    fn mutation_without_optimistic_response_still_enqueues() {
        let encoded = EffectEncoder::encode(&mutation()).unwrap();
        assert_eq!(encoded.action.kind, ActionKind::Enqueue);
        assert!(encoded.optimistic.is_none());
        let effect = encoded.action.effect().unwrap();
        assert!(!effect.is_replaying());
        assert_eq!(effect.variables["title"], json!("milk"));
    }

    #[test]
    fn computed_optimistic_response_uses_variables() {
        let op = mutation().with_optimistic_response(OptimisticResponse::computed(|v| {
            json!({ "addTodo": { "id": "tmp", "title": v["title"] } })
        }));
        let encoded = EffectEncoder::encode(&op).unwrap();
        assert_eq!(
            encoded.optimistic,
            Some(json!({ "addTodo": { "id": "tmp", "title": "milk" } }))
        );
    }

    #[test]
    fn refetch_queries_travel_with_the_effect() {
        let refetch = Document::query([Field::new("todos")]);
        let op = mutation().with_refetch_queries([refetch.clone()]);
        let encoded = EffectEncoder::encode(&op).unwrap();
        assert_eq!(encoded.action.effect().unwrap().refetch_queries, vec![refetch]);
    }
}
