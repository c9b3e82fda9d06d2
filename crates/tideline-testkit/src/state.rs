//! In-memory store double
//!
//! Holds a [`StoreState`] behind a lock, records every dispatched action and
//! folds it through [`reduce_lifecycle`] the way a host store would.

use std::sync::Arc;

use parking_lot::Mutex;
use tideline_core::{NormalizedSnapshot, QueueAction, StateHandle, StoreState};
use tideline_link::reduce_lifecycle;

#[derive(Debug, Default)]
struct Inner {
    state: Arc<StoreState>,
    dispatched: Vec<QueueAction>,
}

/// Store double implementing [`StateHandle`]
#[derive(Debug, Clone, Default)]
pub struct InMemoryState {
    inner: Arc<Mutex<Inner>>,
}

impl InMemoryState {
    /// Online store with an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Offline store with an empty cache
    pub fn offline() -> Self {
        let state = Self::new();
        state.set_online(false);
        state
    }

    /// Store seeded with `cache`
    pub fn with_cache(online: bool, cache: NormalizedSnapshot) -> Self {
        let state = Self::new();
        state.set_online(online);
        state.set_cache(cache);
        state
    }

    /// This store as the trait object the link takes
    pub fn handle(&self) -> Arc<dyn StateHandle> {
        Arc::new(self.clone())
    }

    /// Flip connectivity
    pub fn set_online(&self, online: bool) {
        self.update(|state| state.offline.online = online);
    }

    /// Replace the cache snapshot
    pub fn set_cache(&self, cache: NormalizedSnapshot) {
        self.update(|state| state.cache = cache);
    }

    /// Current state
    pub fn current(&self) -> Arc<StoreState> {
        Arc::clone(&self.inner.lock().state)
    }

    /// Every action dispatched so far, in order
    pub fn dispatched(&self) -> Vec<QueueAction> {
        self.inner.lock().dispatched.clone()
    }

    /// Dispatched actions that carry an effect
    pub fn enqueued(&self) -> Vec<QueueAction> {
        self.inner
            .lock()
            .dispatched
            .iter()
            .filter(|action| action.effect().is_some())
            .cloned()
            .collect()
    }

    fn update(&self, f: impl FnOnce(&mut StoreState)) {
        let mut inner = self.inner.lock();
        f(Arc::make_mut(&mut inner.state));
    }
}

impl StateHandle for InMemoryState {
    fn snapshot(&self) -> Arc<StoreState> {
        self.current()
    }

    fn dispatch(&self, action: QueueAction) {
        let mut inner = self.inner.lock();
        let lifecycle = reduce_lifecycle(inner.state.lifecycle, &action);
        Arc::make_mut(&mut inner.state).lifecycle = lifecycle;
        tracing::trace!(kind = action.kind.as_str(), "Store received action");
        inner.dispatched.push(action);
    }
}
