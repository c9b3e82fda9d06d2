//! Scheduler double
//!
//! [`Outbox`] plays the part of the external offline scheduler: it keeps
//! queued actions in durable (JSON) form, replays the oldest one through a
//! [`MutationClient`], consults the discard predicate on failure and
//! dispatches the commit or rollback action to the store.

use std::collections::VecDeque;
use std::sync::Arc;

use tideline_core::{
    GraphQLResponse, MutationClient, OperationError, QueueAction, StateHandle, TidelineError,
};
use tideline_link::{DiscardPredicate, EffectReplayer};

/// What happened to the head of the queue
#[derive(Debug, Clone, PartialEq)]
pub enum ReplayReport {
    /// Replay succeeded; the commit action was dispatched
    Committed(GraphQLResponse),
    /// Replay failed and the effect was discarded; the rollback action was
    /// dispatched
    RolledBack(OperationError),
    /// Replay failed and the effect stays at the head of the queue
    Retrying {
        /// Failures so far, including this one
        retry_count: u32,
    },
}

#[derive(Debug)]
struct Entry {
    raw: String,
    retry_count: u32,
}

/// In-memory durable queue driving replays
pub struct Outbox {
    client: Arc<dyn MutationClient>,
    store: Arc<dyn StateHandle>,
    predicate: DiscardPredicate,
    queue: VecDeque<Entry>,
}

impl Outbox {
    /// Outbox replaying through `client` and reporting to `store`
    pub fn new(
        client: Arc<dyn MutationClient>,
        store: Arc<dyn StateHandle>,
        predicate: DiscardPredicate,
    ) -> Self {
        Self {
            client,
            store,
            predicate,
            queue: VecDeque::new(),
        }
    }

    /// Persist the effect-carrying actions among `actions`
    pub fn capture(
        &mut self,
        actions: impl IntoIterator<Item = QueueAction>,
    ) -> Result<(), TidelineError> {
        for action in actions.into_iter().filter(|a| a.effect().is_some()) {
            self.queue.push_back(Entry {
                raw: action.to_json()?,
                retry_count: 0,
            });
        }
        Ok(())
    }

    /// Queued actions
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether nothing is queued
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Current form of the head action
    pub fn peek(&self) -> Result<Option<QueueAction>, TidelineError> {
        self.queue
            .front()
            .map(|entry| QueueAction::from_json(&entry.raw))
            .transpose()
    }

    /// Replay the head of the queue once
    pub async fn replay_next(&mut self) -> Result<Option<ReplayReport>, TidelineError> {
        let Some(entry) = self.queue.pop_front() else {
            return Ok(None);
        };
        let mut action = QueueAction::from_json(&entry.raw)?;

        match EffectReplayer::replay(self.client.as_ref(), &mut action).await {
            Ok(response) => {
                let payload = serde_json::to_value(&response)?;
                if let Some(commit) = action.commit_with(payload) {
                    self.store.dispatch(commit);
                }
                Ok(Some(ReplayReport::Committed(response)))
            }
            Err(error) => {
                if self
                    .predicate
                    .should_discard(&error, &mut action, entry.retry_count)
                {
                    let payload = serde_json::to_value(&error)?;
                    if let Some(rollback) = action.rollback_with(payload) {
                        self.store.dispatch(rollback);
                    }
                    return Ok(Some(ReplayReport::RolledBack(error)));
                }

                let retry_count = entry.retry_count.saturating_add(1);
                self.queue.push_front(Entry {
                    raw: action.to_json()?,
                    retry_count,
                });
                Ok(Some(ReplayReport::Retrying { retry_count }))
            }
        }
    }

    /// Replay until the queue is empty or `max_attempts` replays have run
    pub async fn drain(&mut self, max_attempts: usize) -> Result<Vec<ReplayReport>, TidelineError> {
        let mut reports = Vec::new();
        while reports.len() < max_attempts {
            match self.replay_next().await? {
                Some(report) => reports.push(report),
                None => break,
            }
        }
        Ok(reports)
    }
}

impl std::fmt::Debug for Outbox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Outbox")
            .field("predicate", &self.predicate)
            .field("queued", &self.queue.len())
            .finish_non_exhaustive()
    }
}
