//! Tideline Link: Offline Operation Interceptor and Conflict Resolution
//!
//! A link that sits in a GraphQL client's operation pipeline and keeps the
//! application usable while the network is unreachable.
//!
//! # Components
//!
//! - [`OfflineLink`]: routes each operation to the cache, the queue or the
//!   transport
//! - [`OfflineQueryServer`]: answers queries from the cache snapshot
//! - [`EffectEncoder`]: turns mutations into queued effects with an
//!   optimistic result
//! - [`EffectReplayer`]: re-issues queued effects for the scheduler
//! - [`ConflictResolver`] / [`DiscardPredicate`]: decide discard or retry
//!   after a failed replay
//! - [`reduce_lifecycle`]: lifecycle counters for the host store
//! - [`LinkClient`]: the link chained in front of a transport
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tideline_core::{NextLink, StateHandle};
//! use tideline_link::{make_discard_predicate, EffectReplayer, LinkClient, OfflineLink};
//!
//! # async fn example(store: Arc<dyn StateHandle>, transport: Arc<dyn NextLink>) {
//! let link = Arc::new(OfflineLink::new(store));
//! let client = LinkClient::new(link, transport);
//!
//! // Scheduler side: replay a queued action and decide what to do on failure.
//! let should_discard = make_discard_predicate(None);
//! # let mut action: tideline_core::QueueAction = unimplemented!();
//! if let Err(error) = EffectReplayer::replay(&client, &mut action).await {
//!     let _give_up = should_discard(&error, &mut action, 0);
//! }
//! # }
//! ```

#![forbid(unsafe_code)]

pub mod client;
pub mod conflict;
pub mod encoder;
pub mod interceptor;
pub mod query_server;
pub mod reducer;
pub mod replayer;

pub use client::LinkClient;
pub use conflict::{
    make_discard_predicate, make_discard_predicate_with_config, ConflictContext, ConflictHandler,
    ConflictResolver, ConflictSignal, DiscardPredicate, ResolutionOutcome, ResolverError,
    ResolverVerdict,
};
pub use encoder::{EffectEncoder, EncodedMutation};
pub use interceptor::{OfflineLink, Route};
pub use query_server::OfflineQueryServer;
pub use reducer::reduce_lifecycle;
pub use replayer::EffectReplayer;
