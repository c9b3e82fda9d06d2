//! Link client
//!
//! Minimal client that sends operations through an [`OfflineLink`] in front
//! of a transport. It is what the scheduler hands to the replayer: replays
//! enter the link with `is_replay` set and come out at the transport.

use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;
use tideline_core::{
    GraphQLResponse, MutationClient, NextLink, Operation, OperationError, ResultStream,
};

use crate::interceptor::OfflineLink;

/// An offline link chained in front of a transport
#[derive(Clone)]
pub struct LinkClient {
    link: Arc<OfflineLink>,
    transport: Arc<dyn NextLink>,
}

impl LinkClient {
    /// Chain `link` in front of `transport`
    pub fn new(link: Arc<OfflineLink>, transport: Arc<dyn NextLink>) -> Self {
        Self { link, transport }
    }

    /// The offline link
    pub fn link(&self) -> &OfflineLink {
        &self.link
    }

    /// Run `operation` through the chain
    pub fn execute(&self, operation: Operation) -> ResultStream {
        self.link.request(operation, self.transport.as_ref())
    }
}

impl NextLink for LinkClient {
    fn forward(&self, operation: Operation) -> ResultStream {
        self.execute(operation)
    }
}

#[async_trait]
impl MutationClient for LinkClient {
    async fn mutate(&self, operation: Operation) -> Result<GraphQLResponse, OperationError> {
        let mut results = self.execute(operation);
        match results.next().await {
            Some(result) => result.map_err(OperationError::from),
            None => Err(OperationError::new("stream completed without a result")),
        }
    }
}

impl std::fmt::Debug for LinkClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinkClient")
            .field("link", &self.link)
            .finish_non_exhaustive()
    }
}
