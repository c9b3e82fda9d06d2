//! Offline mutations flowing through the queue and back out through replay.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use assert_matches::assert_matches;
use futures::StreamExt;
use serde_json::json;
use tideline_core::{ActionKind, Operation};
use tideline_link::{
    ConflictContext, ConflictResolver, DiscardPredicate, LinkClient, OfflineLink, ResolverError,
    ResolverVerdict,
};
use tideline_testkit::*;

struct Harness {
    state: InMemoryState,
    transport: MockTransport,
    link: Arc<OfflineLink>,
}

impl Harness {
    fn offline() -> Self {
        init_test_tracing();
        let state = InMemoryState::with_cache(false, todo_snapshot());
        let link = Arc::new(OfflineLink::new(state.handle()));
        Self {
            state,
            transport: MockTransport::new(),
            link,
        }
    }

    fn outbox(&self, predicate: DiscardPredicate) -> Outbox {
        let client = LinkClient::new(Arc::clone(&self.link), self.transport.handle());
        Outbox::new(Arc::new(client), self.state.handle(), predicate)
    }

    async fn issue(&self, operation: Operation) {
        let results: Vec<_> = self
            .link
            .request(operation, &self.transport)
            .collect()
            .await;
        assert_eq!(results.len(), 1);
    }
}

fn bump_to_server_version(
    ctx: &ConflictContext<'_>,
) -> Result<ResolverVerdict, ResolverError> {
    let current = ctx
        .data
        .and_then(|data| data["version"].as_i64())
        .ok_or_else(|| ResolverError::new("no server version"))?;
    let mut next = ctx.variables.clone();
    next.insert("version".into(), json!(current));
    Ok(ResolverVerdict::Replace(next))
}

#[tokio::test]
async fn queued_mutation_commits_after_conflict_correction() {
    let harness = Harness::offline();
    harness.issue(add_todo("Buy bread")).await;
    assert_eq!(harness.transport.call_count(), 0);

    let mut outbox = harness.outbox(DiscardPredicate::new(ConflictResolver::new(Some(
        Arc::new(bump_to_server_version),
    ))));
    outbox.capture([queued_update("1", 3)]).unwrap();
    outbox.capture(harness.state.enqueued()).unwrap();
    assert_eq!(outbox.len(), 2);

    harness.state.set_online(true);
    harness
        .transport
        .fail_with(conditional_check_error(json!({ "id": "1", "version": 5 })))
        .respond_with(json!({ "updateTodo": { "id": "1", "version": 6 } }))
        .respond_with(json!({ "addTodo": { "id": "3", "title": "Buy bread", "done": false } }));

    let first = outbox.replay_next().await.unwrap();
    assert_eq!(first, Some(ReplayReport::Retrying { retry_count: 1 }));
    let head = outbox.peek().unwrap().unwrap();
    assert!(head.effect().unwrap().is_replaying());
    assert_eq!(head.effect().unwrap().variables["version"], json!(5));

    let rest = outbox.drain(10).await.unwrap();
    assert_eq!(rest.len(), 2);
    assert!(rest
        .iter()
        .all(|report| matches!(report, ReplayReport::Committed(_))));
    assert!(outbox.is_empty());

    let sent = harness.transport.operations();
    assert_eq!(sent.len(), 3);
    assert!(sent.iter().all(|op| op.context.is_replay));
    assert_eq!(sent[1].variables["version"], json!(5));
    assert_eq!(sent[2].variables["title"], json!("Buy bread"));

    // Replays are forwarded, never enqueued again.
    assert_eq!(harness.state.enqueued().len(), 1);
    let lifecycle = harness.state.current().lifecycle;
    assert_eq!(lifecycle.committed, 2);
    assert_eq!(lifecycle.pending(), 0);
}

#[tokio::test]
async fn rejected_mutation_is_rolled_back() {
    let harness = Harness::offline();
    harness.issue(add_todo("Bad")).await;

    let mut outbox = harness.outbox(DiscardPredicate::default());
    outbox.capture(harness.state.enqueued()).unwrap();
    harness.state.set_online(true);
    harness.transport.fail_with(validation_error());

    let reports = outbox.drain(5).await.unwrap();

    assert_matches!(reports.as_slice(), [ReplayReport::RolledBack(error)] => {
        assert_eq!(error, &validation_error());
    });
    let rollback = harness.state.dispatched().pop().unwrap();
    assert_eq!(rollback.kind, ActionKind::Rollback);
    assert_eq!(rollback.payload["graphQLErrors"][0]["errorType"], json!("ValidationError"));
    assert_eq!(harness.state.current().lifecycle.rolled_back, 1);
    assert_eq!(harness.state.current().lifecycle.pending(), 0);
}

#[tokio::test]
async fn transient_failures_give_up_past_the_retry_ceiling() {
    let harness = Harness::offline();
    harness.issue(add_todo("Flaky")).await;

    let mut outbox = harness.outbox(DiscardPredicate::default());
    outbox.capture(harness.state.enqueued()).unwrap();
    for _ in 0..20 {
        harness.transport.fail_with(network_failure());
    }

    let reports = outbox.drain(20).await.unwrap();

    assert_eq!(reports.len(), 12);
    assert_eq!(reports[10], ReplayReport::Retrying { retry_count: 11 });
    assert_matches!(reports[11], ReplayReport::RolledBack(_));
    assert_eq!(harness.transport.call_count(), 12);
    assert!(outbox.is_empty());
}
