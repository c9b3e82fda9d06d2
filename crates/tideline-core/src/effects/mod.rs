//! Effect Traits at the Link's External Seams
//!
//! Pure trait definitions for everything the link does not own. This module
//! defines **what** the link needs from its collaborators; handlers in the
//! host application (or `tideline-testkit`) define **how**.
//!
//! | Trait | Collaborator |
//! |---|---|
//! | [`StateHandle`] | process-wide store: connectivity, cache snapshot, action log |
//! | [`NextLink`] | next stage of the link chain, ultimately the network |
//! | [`MutationClient`] | client used by the scheduler to replay queued effects |
//!
//! Result streams are `futures` streams. Dropping a stream is cancellation:
//! a forwarded stream is dropped with it, which releases the transport
//! subscription.

use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::effect::QueueAction;
use crate::errors::LinkError;
use crate::operation::Operation;
use crate::response::{GraphQLResponse, OperationError};
use crate::state::StoreState;

/// Stream of results for a single operation
pub type ResultStream = BoxStream<'static, Result<GraphQLResponse, LinkError>>;

/// Handle to the externally owned store
///
/// The link only reads snapshots and appends actions. The store applies
/// dispatched actions one at a time.
pub trait StateHandle: Send + Sync {
    /// Current store state
    fn snapshot(&self) -> Arc<StoreState>;

    /// Append an action to the store
    fn dispatch(&self, action: QueueAction);
}

/// Next stage of the link chain
pub trait NextLink: Send + Sync {
    /// Send `operation` onward and stream its results
    fn forward(&self, operation: Operation) -> ResultStream;
}

impl<F> NextLink for F
where
    F: Fn(Operation) -> ResultStream + Send + Sync,
{
    fn forward(&self, operation: Operation) -> ResultStream {
        self(operation)
    }
}

/// Client able to execute a mutation to completion
#[async_trait]
pub trait MutationClient: Send + Sync {
    /// Execute `operation` and resolve with its first result
    async fn mutate(&self, operation: Operation) -> Result<GraphQLResponse, OperationError>;
}
