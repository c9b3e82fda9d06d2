//! Store state visible to the link
//!
//! The store is owned outside the link. The link reads connectivity and the
//! cache snapshot from it and appends actions; the lifecycle counters are
//! maintained by the store through the lifecycle reducer.

use serde::{Deserialize, Serialize};

use crate::cache::NormalizedSnapshot;

/// Connectivity as last detected by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfflineStatus {
    /// Whether the network is believed reachable
    pub online: bool,
}

impl Default for OfflineStatus {
    fn default() -> Self {
        Self { online: true }
    }
}

/// Effect lifecycle counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LifecycleState {
    /// Effects enqueued
    pub enqueued: u64,
    /// Effects committed after a successful replay
    pub committed: u64,
    /// Effects rolled back after a discard
    pub rolled_back: u64,
}

impl LifecycleState {
    /// Effects enqueued but not yet settled
    pub fn pending(&self) -> u64 {
        self.enqueued
            .saturating_sub(self.committed)
            .saturating_sub(self.rolled_back)
    }
}

/// Snapshot of the external store
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreState {
    /// Connectivity
    pub offline: OfflineStatus,
    /// Normalized cache snapshot
    pub cache: NormalizedSnapshot,
    /// Effect lifecycle counters
    pub lifecycle: LifecycleState,
}

impl StoreState {
    /// Whether the store believes the network is reachable
    pub fn is_online(&self) -> bool {
        self.offline.online
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_store_is_online_and_empty() {
        let state = StoreState::default();
        assert!(state.is_online());
        assert!(state.cache.is_empty());
        assert_eq!(state.lifecycle.pending(), 0);
    }

    #[test]
    fn pending_never_underflows() {
        let lifecycle = LifecycleState {
            enqueued: 1,
            committed: 1,
            rolled_back: 1,
        };
        assert_eq!(lifecycle.pending(), 0);
    }
}
