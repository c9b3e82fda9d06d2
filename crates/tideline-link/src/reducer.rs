//! Lifecycle reducer
//!
//! Folds queue actions into [`LifecycleState`] counters. The host store runs
//! it on every dispatched action; actions of any other kind leave the state
//! exactly as it was.

use tideline_core::{ActionKind, LifecycleState, QueueAction};

/// Apply `action` to `state`
pub fn reduce_lifecycle(state: LifecycleState, action: &QueueAction) -> LifecycleState {
    match action.kind {
        ActionKind::Enqueue => LifecycleState {
            enqueued: state.enqueued.saturating_add(1),
            ..state
        },
        ActionKind::Commit => LifecycleState {
            committed: state.committed.saturating_add(1),
            ..state
        },
        ActionKind::Rollback => LifecycleState {
            rolled_back: state.rolled_back.saturating_add(1),
            ..state
        },
        ActionKind::Other(_) => state,
    }
}
