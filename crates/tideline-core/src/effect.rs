//! Queued effects and the queue actions that carry them
//!
//! The wire shape matches what the external store and scheduler expect:
//!
//! ```text
//! { "type": "ENQUEUE_EFFECT",
//!   "payload": {},
//!   "meta": { "offline": { "effect":   { mutation, variables, refetchQueries, replaying },
//!                          "commit":   { "type": "COMMIT_EFFECT" },
//!                          "rollback": { "type": "ROLLBACK_EFFECT" } } } }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::document::Document;
use crate::errors::Result;
use crate::operation::Variables;

/// Action type of an enqueue
pub const ENQUEUE_EFFECT: &str = "ENQUEUE_EFFECT";
/// Action type of a commit
pub const COMMIT_EFFECT: &str = "COMMIT_EFFECT";
/// Action type of a rollback
pub const ROLLBACK_EFFECT: &str = "ROLLBACK_EFFECT";

/// A mutation awaiting or undergoing replay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Effect {
    /// Mutation document
    pub mutation: Document,
    /// Variables to send; replaced when a conflict resolver corrects them
    pub variables: Variables,
    /// Queries to refetch after the mutation lands
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub refetch_queries: Vec<Document>,
    #[serde(default)]
    replaying: bool,
}

impl Effect {
    /// New effect, not yet handed to the replayer
    pub fn new(mutation: Document, variables: Variables, refetch_queries: Vec<Document>) -> Self {
        Self {
            mutation,
            variables,
            refetch_queries,
            replaying: false,
        }
    }

    /// Whether the scheduler has handed this effect to the replayer
    pub fn is_replaying(&self) -> bool {
        self.replaying
    }

    /// Flag the effect as replaying. Returns `true` only on the first call;
    /// the flag never goes back to `false`.
    pub fn mark_replaying(&mut self) -> bool {
        !std::mem::replace(&mut self.replaying, true)
    }
}

/// Kind of a queue action
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActionKind {
    /// A new effect entered the queue
    Enqueue,
    /// The effect's replay succeeded
    Commit,
    /// The effect was discarded; optimistic state must be undone
    Rollback,
    /// Any action this crate does not produce
    Other(String),
}

impl ActionKind {
    /// Wire name of the kind
    pub fn as_str(&self) -> &str {
        match self {
            Self::Enqueue => ENQUEUE_EFFECT,
            Self::Commit => COMMIT_EFFECT,
            Self::Rollback => ROLLBACK_EFFECT,
            Self::Other(kind) => kind,
        }
    }
}

impl From<String> for ActionKind {
    fn from(kind: String) -> Self {
        match kind.as_str() {
            ENQUEUE_EFFECT => Self::Enqueue,
            COMMIT_EFFECT => Self::Commit,
            ROLLBACK_EFFECT => Self::Rollback,
            _ => Self::Other(kind),
        }
    }
}

impl From<ActionKind> for String {
    fn from(kind: ActionKind) -> Self {
        match kind {
            ActionKind::Other(kind) => kind,
            known => known.as_str().to_string(),
        }
    }
}

/// Commit or rollback descriptor stored with an enqueued effect
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionDescriptor {
    /// Kind the scheduler dispatches
    #[serde(rename = "type")]
    pub kind: ActionKind,
}

impl ActionDescriptor {
    /// Descriptor dispatched after a successful replay
    pub fn commit() -> Self {
        Self {
            kind: ActionKind::Commit,
        }
    }

    /// Descriptor dispatched after a discard
    pub fn rollback() -> Self {
        Self {
            kind: ActionKind::Rollback,
        }
    }

    /// Materialize into a dispatchable action carrying `payload`
    pub fn with_payload(&self, payload: Value) -> QueueAction {
        QueueAction {
            kind: self.kind.clone(),
            payload,
            meta: None,
        }
    }
}

/// Offline metadata of an enqueue action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfflineMeta {
    /// The queued effect
    pub effect: Effect,
    /// Dispatched on success
    pub commit: ActionDescriptor,
    /// Dispatched on discard
    pub rollback: ActionDescriptor,
}

/// Metadata block of a queue action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionMeta {
    /// Offline metadata
    pub offline: OfflineMeta,
}

/// Action dispatched to the external store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueAction {
    /// Action kind
    #[serde(rename = "type")]
    pub kind: ActionKind,
    /// Action payload
    #[serde(default)]
    pub payload: Value,
    /// Present on enqueue actions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<ActionMeta>,
}

impl QueueAction {
    /// Enqueue action for `effect` with commit and rollback descriptors
    pub fn enqueue(effect: Effect) -> Self {
        Self {
            kind: ActionKind::Enqueue,
            payload: Value::Object(Map::new()),
            meta: Some(ActionMeta {
                offline: OfflineMeta {
                    effect,
                    commit: ActionDescriptor::commit(),
                    rollback: ActionDescriptor::rollback(),
                },
            }),
        }
    }

    /// Offline metadata, if this action carries an effect
    pub fn offline(&self) -> Option<&OfflineMeta> {
        self.meta.as_ref().map(|meta| &meta.offline)
    }

    /// The carried effect
    pub fn effect(&self) -> Option<&Effect> {
        self.offline().map(|offline| &offline.effect)
    }

    /// The carried effect, mutably
    pub fn effect_mut(&mut self) -> Option<&mut Effect> {
        self.meta.as_mut().map(|meta| &mut meta.offline.effect)
    }

    /// Commit action for a successful replay, if this action carries an effect
    pub fn commit_with(&self, payload: Value) -> Option<QueueAction> {
        self.offline()
            .map(|offline| offline.commit.with_payload(payload))
    }

    /// Rollback action for a discarded effect, if this action carries an effect
    pub fn rollback_with(&self, payload: Value) -> Option<QueueAction> {
        self.offline()
            .map(|offline| offline.rollback.with_payload(payload))
    }

    /// Serialize for a durable queue
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Restore from a durable queue
    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Field;
    use crate::errors::TidelineError;
    use assert_matches::assert_matches;
    use serde_json::json;

    fn effect() -> Effect {
        let mut vars = Variables::new();
        vars.insert("v".into(), json!(1));
        Effect::new(Document::mutation([Field::new("updateTodo")]), vars, Vec::new())
    }

    #[test]
    fn replaying_flips_once_and_never_regresses() {
        let mut effect = effect();
        assert!(!effect.is_replaying());
        assert!(effect.mark_replaying());
        assert!(!effect.mark_replaying());
        assert!(effect.is_replaying());
    }

    #[test]
    fn enqueue_matches_wire_shape() {
        let value = serde_json::to_value(QueueAction::enqueue(effect())).unwrap();
        assert_eq!(value["type"], json!("ENQUEUE_EFFECT"));
        assert_eq!(value["payload"], json!({}));
        assert_eq!(value["meta"]["offline"]["effect"]["variables"], json!({ "v": 1 }));
        assert_eq!(value["meta"]["offline"]["effect"]["replaying"], json!(false));
        assert_eq!(value["meta"]["offline"]["commit"], json!({ "type": "COMMIT_EFFECT" }));
        assert_eq!(value["meta"]["offline"]["rollback"], json!({ "type": "ROLLBACK_EFFECT" }));
    }

    #[test]
    fn unknown_kinds_are_preserved() {
        let action: QueueAction =
            serde_json::from_value(json!({ "type": "Offline/BUSY", "payload": true })).unwrap();
        assert_eq!(action.kind, ActionKind::Other("Offline/BUSY".into()));
        assert!(action.effect().is_none());
        assert_eq!(serde_json::to_value(&action).unwrap()["type"], json!("Offline/BUSY"));
    }

    #[test]
    fn durable_round_trip_keeps_replaying_flag() {
        let mut action = QueueAction::enqueue(effect());
        action.effect_mut().unwrap().mark_replaying();
        let restored = QueueAction::from_json(&action.to_json().unwrap()).unwrap();
        assert_eq!(restored, action);
        assert!(restored.effect().unwrap().is_replaying());
    }

    #[test]
    fn corrupt_queue_entries_are_serialization_errors() {
        assert_matches!(
            QueueAction::from_json("{\"type\":"),
            Err(TidelineError::Serialization { .. })
        );
    }

    #[test]
    fn commit_and_rollback_materialize_from_descriptors() {
        let action = QueueAction::enqueue(effect());
        let commit = action.commit_with(json!({ "ok": true })).unwrap();
        assert_eq!(commit.kind, ActionKind::Commit);
        assert_eq!(commit.payload, json!({ "ok": true }));
        let rollback = action.rollback_with(Value::Null).unwrap();
        assert_eq!(rollback.kind, ActionKind::Rollback);
        assert!(commit.commit_with(Value::Null).is_none());
    }
}
