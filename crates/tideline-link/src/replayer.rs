//! Effect replayer
//!
//! Called by the external scheduler when it decides a queued effect should
//! go out. The effect is flagged as replaying and re-issued as a mutation
//! whose context carries `is_replay`, so the offline link forwards it to the
//! network instead of enqueueing it again.

use tideline_core::{GraphQLResponse, MutationClient, Operation, OperationError, QueueAction};

/// Re-issues queued effects
#[derive(Debug, Clone, Copy, Default)]
pub struct EffectReplayer;

impl EffectReplayer {
    /// Build the replay operation for the effect carried by `action`,
    /// flagging the effect as replaying.
    ///
    /// Returns `None` when the action carries no effect.
    pub fn prepare(action: &mut QueueAction) -> Option<Operation> {
        let effect = action.effect_mut()?;
        let first_replay = effect.mark_replaying();
        let operation = Operation::new(effect.mutation.clone(), effect.variables.clone())
            .with_refetch_queries(effect.refetch_queries.iter().cloned())
            .as_replay();

        tracing::info!(
            mutation = effect.mutation.operation_field_name().unwrap_or("<anonymous>"),
            first_replay,
            "Replaying queued mutation"
        );
        Some(operation)
    }

    /// Replay the effect carried by `action` through `client`.
    ///
    /// An action without an effect fails with a permanent error, so the
    /// scheduler's discard predicate drops it.
    pub async fn replay<C>(
        client: &C,
        action: &mut QueueAction,
    ) -> Result<GraphQLResponse, OperationError>
    where
        C: MutationClient + ?Sized,
    {
        let operation = Self::prepare(action).ok_or_else(|| {
            OperationError::new(format!(
                "action {} carries no offline effect",
                action.kind.as_str()
            ))
            .permanent()
        })?;
        client.mutate(operation).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tideline_core::{ActionKind, Document, Effect, Field, Variables};

    fn action() -> QueueAction {
        let mut vars = Variables::new();
        vars.insert("id".into(), json!("1"));
        QueueAction::enqueue(Effect::new(
            Document::mutation([Field::new("deleteTodo")]),
            vars,
            vec![Document::query([Field::new("todos")])],
        ))
    }

    #[test]
    fn prepare_marks_replaying_and_sets_replay_context() {
        let mut action = action();
        let operation = EffectReplayer::prepare(&mut action).unwrap();
        assert!(operation.context.is_replay);
        assert_eq!(operation.variables["id"], json!("1"));
        assert_eq!(operation.context.refetch_queries.len(), 1);
        assert!(operation.context.optimistic_response.is_none());
        assert!(action.effect().unwrap().is_replaying());
    }

    #[test]
    fn replaying_stays_set_across_replays() {
        let mut action = action();
        EffectReplayer::prepare(&mut action).unwrap();
        EffectReplayer::prepare(&mut action).unwrap();
        assert!(action.effect().unwrap().is_replaying());
    }

    #[test]
    fn prepare_skips_actions_without_effect() {
        let mut action = QueueAction {
            kind: ActionKind::Commit,
            payload: json!(null),
            meta: None,
        };
        assert!(EffectReplayer::prepare(&mut action).is_none());
    }
}
