//! Scripted transport double
//!
//! [`MockTransport`] is the terminal [`NextLink`] of a test chain. Replies
//! are consumed in order; once the script runs out every call gets an empty
//! successful response. Every forwarded operation is recorded.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tideline_core::{GraphQLResponse, LinkError, NextLink, Operation, OperationError, ResultStream};

/// One scripted reply
#[derive(Debug, Clone)]
pub enum TransportReply {
    /// Emit these items, then complete
    Items(Vec<Result<GraphQLResponse, LinkError>>),
    /// Never emit and never complete
    Pending,
}

impl TransportReply {
    /// A single successful response carrying `data`
    pub fn data(data: Value) -> Self {
        Self::Items(vec![Ok(GraphQLResponse::from_data(data))])
    }

    /// A single failure
    pub fn error(error: OperationError) -> Self {
        Self::Items(vec![Err(LinkError::Operation(error))])
    }
}

#[derive(Debug, Default)]
struct Inner {
    script: VecDeque<TransportReply>,
    operations: Vec<Operation>,
}

/// Transport double implementing [`NextLink`]
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    inner: Arc<Mutex<Inner>>,
    live_streams: Arc<AtomicUsize>,
}

impl MockTransport {
    /// Transport with an empty script
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a reply to the script
    pub fn push(&self, reply: TransportReply) -> &Self {
        self.inner.lock().script.push_back(reply);
        self
    }

    /// Append a successful reply carrying `data`
    pub fn respond_with(&self, data: Value) -> &Self {
        self.push(TransportReply::data(data))
    }

    /// Append a failing reply
    pub fn fail_with(&self, error: OperationError) -> &Self {
        self.push(TransportReply::error(error))
    }

    /// This transport as a shareable trait object
    pub fn handle(&self) -> Arc<dyn NextLink> {
        Arc::new(self.clone())
    }

    /// Operations forwarded so far, in order
    pub fn operations(&self) -> Vec<Operation> {
        self.inner.lock().operations.clone()
    }

    /// Number of forwarded operations
    pub fn call_count(&self) -> usize {
        self.inner.lock().operations.len()
    }

    /// Pending streams handed out and not yet dropped
    pub fn live_streams(&self) -> usize {
        self.live_streams.load(Ordering::SeqCst)
    }
}

impl NextLink for MockTransport {
    fn forward(&self, operation: Operation) -> ResultStream {
        let reply = {
            let mut inner = self.inner.lock();
            inner.operations.push(operation);
            inner.script.pop_front()
        };

        match reply {
            Some(TransportReply::Items(items)) => stream::iter(items).boxed(),
            Some(TransportReply::Pending) => {
                let guard = LiveStream::new(Arc::clone(&self.live_streams));
                stream::pending()
                    .map(move |item: Result<GraphQLResponse, LinkError>| {
                        let _held = &guard;
                        item
                    })
                    .boxed()
            }
            None => stream::iter([Ok(GraphQLResponse::from_data(json!({})))]).boxed(),
        }
    }
}

/// Counts a pending stream as live until the stream is dropped
#[derive(Debug)]
struct LiveStream(Arc<AtomicUsize>);

impl LiveStream {
    fn new(counter: Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for LiveStream {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use futures::executor::block_on;
    use tideline_core::{Document, Field, Variables};

    fn operation() -> Operation {
        Operation::new(Document::query([Field::new("todos")]), Variables::new())
    }

    #[test]
    fn script_is_consumed_in_order_then_defaults() {
        let transport = MockTransport::new();
        transport
            .respond_with(json!({ "n": 1 }))
            .fail_with(OperationError::new("boom"));

        let first: Vec<_> = block_on(transport.forward(operation()).collect());
        assert_eq!(first, vec![Ok(GraphQLResponse::from_data(json!({ "n": 1 })))]);

        let second: Vec<_> = block_on(transport.forward(operation()).collect());
        assert_matches!(second.as_slice(), [Err(LinkError::Operation(_))]);

        let third: Vec<_> = block_on(transport.forward(operation()).collect());
        assert_eq!(third, vec![Ok(GraphQLResponse::from_data(json!({})))]);
        assert_eq!(transport.call_count(), 3);
    }

    #[test]
    fn pending_stream_is_live_until_dropped() {
        let transport = MockTransport::new();
        transport.push(TransportReply::Pending);
        let stream = transport.forward(operation());
        assert_eq!(transport.live_streams(), 1);
        drop(stream);
        assert_eq!(transport.live_streams(), 0);
    }
}
