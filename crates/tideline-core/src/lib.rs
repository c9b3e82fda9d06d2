//! Tideline Core: Foundation Types for the Offline Link
//!
//! This crate defines **what** the offline link works with; `tideline-link`
//! defines **how** operations are routed, queued, replayed and reconciled.
//!
//! # Contents
//!
//! - [`document`]: pre-parsed GraphQL operation documents
//! - [`operation`]: operations, variables and the typed context bag
//! - [`response`]: responses, GraphQL errors and transport failures
//! - [`effect`]: queued effects and the queue actions that carry them
//! - [`cache`]: read-only view of the normalized cache snapshot
//! - [`state`]: the externally owned store state seen by the link
//! - [`config`]: link configuration with validation and env overrides
//! - [`effects`]: traits at every external seam (store, transport, client)
//!
//! Everything with side effects is reached through a trait in [`effects`],
//! so the link can be driven by real collaborators or by the deterministic
//! handlers in `tideline-testkit`.

#![forbid(unsafe_code)]

pub mod cache;
pub mod config;
pub mod document;
pub mod effect;
pub mod effects;
pub mod errors;
pub mod operation;
pub mod response;
pub mod state;

pub use cache::{store_field_name, CacheMissError, NormalizedSnapshot, REFERENCE_KEY};
pub use config::{ConfigValidation, ConflictConfig, EnvOverrides, OfflineLinkConfig};
pub use document::{ArgumentValue, Document, Field, OperationKind};
pub use effect::{ActionDescriptor, ActionKind, ActionMeta, Effect, OfflineMeta, QueueAction};
pub use effects::{MutationClient, NextLink, ResultStream, StateHandle};
pub use errors::{LinkError, Result, TidelineError};
pub use operation::{Operation, OperationContext, OptimisticResponse, Variables};
pub use response::{GraphQLError, GraphQLResponse, NetworkError, OperationError, PathSegment};
pub use state::{LifecycleState, OfflineStatus, StoreState};
