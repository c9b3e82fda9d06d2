//! Tideline Testing Infrastructure
//!
//! Deterministic doubles for every collaborator the offline link talks to,
//! so link behavior can be tested without a store, a network or a real
//! scheduler.
//!
//! # Usage
//!
//! Add this to your crate's `Cargo.toml` dev-dependencies:
//! ```toml
//! [dev-dependencies]
//! tideline-testkit = { workspace = true }
//! ```
//!
//! Then in your tests:
//! ```rust,no_run
//! use tideline_link::OfflineLink;
//! use tideline_testkit::{InMemoryState, MockTransport};
//!
//! let state = InMemoryState::offline();
//! let transport = MockTransport::new();
//! let link = OfflineLink::new(state.handle());
//! // ... drive `link.request(op, &transport)`
//! ```

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

pub mod fixtures;
pub mod outbox;
pub mod state;
pub mod strategies;
pub mod transport;

pub use fixtures::*;
pub use outbox::{Outbox, ReplayReport};
pub use state::InMemoryState;
pub use transport::{MockTransport, TransportReply};

/// Install a test subscriber honoring `RUST_LOG`; safe to call from every test
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
