//! Offline link: the mutation interceptor
//!
//! Every outgoing operation enters [`OfflineLink::request`], which picks
//! exactly one path:
//!
//! ```text
//! offline query ──────────────► OfflineQueryServer ─► one result, complete
//! mutation (not a replay) ────► EffectEncoder ─► dispatch ENQUEUE_EFFECT
//!                                  ├─ optimistic result ─► one result, complete
//!                                  └─ none ─────────────► forward
//! everything else (incl. replays) ──────────────────────► forward
//! ```
//!
//! Forwarded results are relayed verbatim, errors included. Dropping the
//! returned stream drops the forwarded stream, releasing the transport.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tideline_core::{
    GraphQLResponse, LinkError, NextLink, OfflineLinkConfig, Operation, OperationKind,
    ResultStream, StateHandle,
};

use crate::conflict::{ConflictHandler, ConflictResolver, DiscardPredicate};
use crate::encoder::EffectEncoder;
use crate::query_server::OfflineQueryServer;

/// Path chosen for an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Answer from the cache snapshot
    OfflineRead,
    /// Encode as a queued effect
    Enqueue,
    /// Send downstream unchanged
    Forward,
}

impl Route {
    /// Choose a route from connectivity and the operation's kind and
    /// replay flag
    pub fn classify(online: bool, kind: OperationKind, is_replay: bool) -> Self {
        match kind {
            OperationKind::Query if !online => Self::OfflineRead,
            OperationKind::Mutation if !is_replay => Self::Enqueue,
            _ => Self::Forward,
        }
    }
}

/// Link that keeps a GraphQL client usable while offline
pub struct OfflineLink {
    state: Arc<dyn StateHandle>,
    config: OfflineLinkConfig,
}

impl OfflineLink {
    /// Link over `state` with default configuration
    pub fn new(state: Arc<dyn StateHandle>) -> Self {
        Self::with_config(state, OfflineLinkConfig::default())
    }

    /// Link over `state` with explicit configuration
    pub fn with_config(state: Arc<dyn StateHandle>, config: OfflineLinkConfig) -> Self {
        Self { state, config }
    }

    /// Active configuration
    pub fn config(&self) -> &OfflineLinkConfig {
        &self.config
    }

    /// Discard predicate for the scheduler, using this link's conflict
    /// configuration
    pub fn discard_predicate(
        &self,
        handler: Option<Arc<dyn ConflictHandler>>,
    ) -> DiscardPredicate {
        DiscardPredicate::new(ConflictResolver::with_config(
            handler,
            self.config.conflict.clone(),
        ))
    }

    /// Handle one operation; `forward` is the next stage of the chain
    pub fn request(&self, operation: Operation, forward: &dyn NextLink) -> ResultStream {
        let snapshot = self.state.snapshot();
        let route = Route::classify(
            snapshot.is_online(),
            operation.kind(),
            operation.context.is_replay,
        );

        tracing::debug!(
            operation = operation.name().unwrap_or("<anonymous>"),
            kind = %operation.kind(),
            online = snapshot.is_online(),
            ?route,
            "Routing operation"
        );

        match route {
            Route::OfflineRead => {
                let server =
                    OfflineQueryServer::with_root(&snapshot.cache, &self.config.root_query_id);
                let result = server
                    .read(&operation.document, &operation.variables)
                    .map(GraphQLResponse::from_data)
                    .map_err(LinkError::from);
                if let Err(err) = &result {
                    tracing::debug!(error = %err, "Offline read missed the cache");
                }
                single(result)
            }
            Route::Enqueue => self.enqueue(operation, forward),
            Route::Forward => forward.forward(operation),
        }
    }

    fn enqueue(&self, operation: Operation, forward: &dyn NextLink) -> ResultStream {
        let Some(encoded) = EffectEncoder::encode(&operation) else {
            return forward.forward(operation);
        };

        self.state.dispatch(encoded.action);

        match encoded.optimistic {
            Some(data) => single(Ok(GraphQLResponse::optimistic(data))),
            None => {
                // The effect stays queued for replay while this call also runs
                // live; a replay of it is forwarded through the is_replay flag.
                tracing::warn!(
                    operation = operation.name().unwrap_or("<anonymous>"),
                    "Mutation has no optimistic response; enqueued and forwarded"
                );
                forward.forward(operation)
            }
        }
    }
}

impl std::fmt::Debug for OfflineLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OfflineLink")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn single(item: Result<GraphQLResponse, LinkError>) -> ResultStream {
    stream::once(futures::future::ready(item)).boxed()
}
