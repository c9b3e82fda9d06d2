//! Conflict resolution for replayed mutations
//!
//! When the scheduler replays a queued effect and the replay fails, it asks
//! whether to give up on the effect. The answer is computed in two steps:
//!
//! 1. [`ConflictSignal::classify`] turns the transport's loosely shaped
//!    [`OperationError`] into a closed signal, once.
//! 2. [`ConflictResolver::resolve`] maps the signal, the queued effect and
//!    the retry count to a [`ResolutionOutcome`]. First match wins:
//!
//! | Signal | Outcome |
//! |---|---|
//! | conditional-check failure, handler says discard | `Discard` |
//! | conditional-check failure, handler returns variables | `Retry` with them |
//! | conditional-check failure, handler fails | `Discard` |
//! | conditional-check failure, no handler or handler defers | default rule |
//! | GraphQL validation/execution errors | `Discard` |
//! | client protocol error | `Discard` |
//! | anything else | default rule |
//!
//! The default rule discards permanent errors and anything past the retry
//! ceiling, and retries unchanged otherwise.
//!
//! [`DiscardPredicate`] wraps both steps behind the boolean contract the
//! scheduler consumes, writing corrected variables back into the queued
//! action.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tideline_core::{
    ConflictConfig, Document, Effect, GraphQLError, OperationError, OperationKind, PathSegment,
    QueueAction, Variables,
};

/// Closed classification of a replay failure
#[derive(Debug, Clone, PartialEq)]
pub enum ConflictSignal {
    /// Remote preconditions no longer match; the input is stale
    ConditionalCheckFailure {
        /// Current remote state reported by the server
        data: Option<Value>,
        /// Path of the rejected field
        path: Vec<PathSegment>,
        /// Permanence reported by the transport
        permanent: bool,
    },
    /// The server rejected the operation itself
    GraphQLValidationError {
        /// Reported errors
        errors: Vec<GraphQLError>,
    },
    /// The client side of the transport refused the request
    ClientProtocolError {
        /// Error type that matched the client error prefix
        error_type: String,
    },
    /// Anything else, typically connectivity
    TransientError {
        /// Permanence reported by the transport
        permanent: bool,
    },
}

impl ConflictSignal {
    /// Classify a replay failure
    pub fn classify(error: &OperationError, config: &ConflictConfig) -> Self {
        let conditional = error.graphql_errors.iter().find(|err| {
            err.error_type.as_deref() == Some(config.conditional_check_error_type.as_str())
        });
        if let Some(conflict) = conditional {
            return Self::ConditionalCheckFailure {
                data: conflict.data.clone(),
                path: conflict.path.clone(),
                permanent: error.permanent,
            };
        }

        if !error.graphql_errors.is_empty() {
            return Self::GraphQLValidationError {
                errors: error.graphql_errors.clone(),
            };
        }

        let client_error = error
            .network_error
            .iter()
            .flat_map(|network| network.graphql_errors.iter())
            .filter_map(|err| err.error_type.as_deref())
            .find(|error_type| error_type.starts_with(config.client_error_prefix.as_str()));
        if let Some(error_type) = client_error {
            return Self::ClientProtocolError {
                error_type: error_type.to_string(),
            };
        }

        Self::TransientError {
            permanent: error.permanent,
        }
    }

    /// Whether the transport marked the failure permanent.
    ///
    /// Only meaningful for signals that can reach the default rule
    /// (conditional-check failures and transient errors). Validation and
    /// client protocol errors are always discarded and report `false`.
    pub fn is_permanent(&self) -> bool {
        match self {
            Self::ConditionalCheckFailure { permanent, .. } | Self::TransientError { permanent } => {
                *permanent
            }
            Self::GraphQLValidationError { .. } | Self::ClientProtocolError { .. } => false,
        }
    }
}

/// What the scheduler should do with a failed effect
#[derive(Debug, Clone, PartialEq)]
pub enum ResolutionOutcome {
    /// Drop the effect and roll back its optimistic state
    Discard,
    /// Keep the effect; replace its variables first when given
    Retry {
        /// Corrected variables from a conflict handler
        new_variables: Option<Variables>,
    },
}

impl ResolutionOutcome {
    /// Retry with the effect unchanged
    pub fn retry_unchanged() -> Self {
        Self::Retry {
            new_variables: None,
        }
    }

    /// Boolean form consumed by the scheduler
    pub fn should_discard(&self) -> bool {
        matches!(self, Self::Discard)
    }
}

/// Everything a conflict handler gets to see
#[derive(Debug, Clone, Copy)]
pub struct ConflictContext<'a> {
    /// The queued mutation
    pub mutation: &'a Document,
    /// Root field of the mutation
    pub mutation_name: Option<&'a str>,
    /// Operation kind of the queued document
    pub operation_type: OperationKind,
    /// Variables the replay was sent with
    pub variables: &'a Variables,
    /// Current remote state reported with the conflict
    pub data: Option<&'a Value>,
    /// Retries so far
    pub retry_count: u32,
}

/// Decision of a conflict handler
#[derive(Debug, Clone, PartialEq)]
pub enum ResolverVerdict {
    /// Give up on the mutation
    Discard,
    /// Retry with these variables
    Replace(Variables),
    /// No opinion; fall back to the default rule
    Defer,
}

/// A conflict handler failed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Conflict handler failed: {reason}")]
pub struct ResolverError {
    /// Failure description
    pub reason: String,
}

impl ResolverError {
    /// Create a resolver error
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Application-supplied handler for conditional-check conflicts
///
/// Must be deterministic: the scheduler may ask again with identical inputs
/// and relies on getting the same answer.
pub trait ConflictHandler: Send + Sync {
    /// Decide what to do about a conflict
    fn resolve_conflict(&self, ctx: &ConflictContext<'_>) -> Result<ResolverVerdict, ResolverError>;
}

impl<F> ConflictHandler for F
where
    F: Fn(&ConflictContext<'_>) -> Result<ResolverVerdict, ResolverError> + Send + Sync,
{
    fn resolve_conflict(&self, ctx: &ConflictContext<'_>) -> Result<ResolverVerdict, ResolverError> {
        self(ctx)
    }
}

/// Pure decision procedure over classified replay failures
#[derive(Clone, Default)]
pub struct ConflictResolver {
    handler: Option<Arc<dyn ConflictHandler>>,
    config: ConflictConfig,
}

impl ConflictResolver {
    /// Resolver with default configuration
    pub fn new(handler: Option<Arc<dyn ConflictHandler>>) -> Self {
        Self::with_config(handler, ConflictConfig::default())
    }

    /// Resolver with explicit configuration
    pub fn with_config(handler: Option<Arc<dyn ConflictHandler>>, config: ConflictConfig) -> Self {
        Self { handler, config }
    }

    /// Active configuration
    pub fn config(&self) -> &ConflictConfig {
        &self.config
    }

    /// Decide the fate of `effect` after a failed replay
    pub fn resolve(
        &self,
        signal: &ConflictSignal,
        effect: &Effect,
        retry_count: u32,
    ) -> ResolutionOutcome {
        self.decide(signal, Some(effect), retry_count)
    }

    pub(crate) fn decide(
        &self,
        signal: &ConflictSignal,
        effect: Option<&Effect>,
        retry_count: u32,
    ) -> ResolutionOutcome {
        match signal {
            ConflictSignal::ConditionalCheckFailure { data, .. } => {
                let consulted = match (self.handler.as_deref(), effect) {
                    (Some(handler), Some(effect)) => {
                        consult(handler, effect, data.as_ref(), retry_count)
                    }
                    _ => None,
                };
                consulted.unwrap_or_else(|| self.default_outcome(signal, retry_count))
            }
            ConflictSignal::GraphQLValidationError { .. } => ResolutionOutcome::Discard,
            ConflictSignal::ClientProtocolError { .. } => ResolutionOutcome::Discard,
            ConflictSignal::TransientError { .. } => self.default_outcome(signal, retry_count),
        }
    }

    fn default_outcome(&self, signal: &ConflictSignal, retry_count: u32) -> ResolutionOutcome {
        if signal.is_permanent() || retry_count > self.config.max_retries {
            ResolutionOutcome::Discard
        } else {
            ResolutionOutcome::retry_unchanged()
        }
    }
}

impl fmt::Debug for ConflictResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConflictResolver")
            .field("has_handler", &self.handler.is_some())
            .field("config", &self.config)
            .finish()
    }
}

/// Ask the handler; `None` means fall through to the default rule
fn consult(
    handler: &dyn ConflictHandler,
    effect: &Effect,
    data: Option<&Value>,
    retry_count: u32,
) -> Option<ResolutionOutcome> {
    let ctx = ConflictContext {
        mutation: &effect.mutation,
        mutation_name: effect.mutation.operation_field_name(),
        operation_type: effect.mutation.kind,
        variables: &effect.variables,
        data,
        retry_count,
    };

    match handler.resolve_conflict(&ctx) {
        Ok(ResolverVerdict::Discard) => {
            tracing::debug!(mutation = ctx.mutation_name, "Conflict handler discarded mutation");
            Some(ResolutionOutcome::Discard)
        }
        Ok(ResolverVerdict::Replace(variables)) => {
            tracing::debug!(
                mutation = ctx.mutation_name,
                retry_count,
                "Conflict handler corrected variables"
            );
            Some(ResolutionOutcome::Retry {
                new_variables: Some(variables),
            })
        }
        Ok(ResolverVerdict::Defer) => None,
        Err(err) => {
            tracing::warn!(
                mutation = ctx.mutation_name,
                error = %err,
                "Conflict handler failed; discarding"
            );
            Some(ResolutionOutcome::Discard)
        }
    }
}

/// Scheduler-facing discard decision
///
/// Applies `Retry { new_variables: Some(..) }` to the queued action in
/// place; the scheduler's next replay picks up the corrected variables.
#[derive(Debug, Clone, Default)]
pub struct DiscardPredicate {
    resolver: ConflictResolver,
}

impl DiscardPredicate {
    /// Predicate over `resolver`
    pub fn new(resolver: ConflictResolver) -> Self {
        Self { resolver }
    }

    /// The underlying resolver
    pub fn resolver(&self) -> &ConflictResolver {
        &self.resolver
    }

    /// Decide whether to stop retrying `action` after `error`
    pub fn should_discard(
        &self,
        error: &OperationError,
        action: &mut QueueAction,
        retry_count: u32,
    ) -> bool {
        let signal = ConflictSignal::classify(error, self.resolver.config());
        let outcome = self.resolver.decide(&signal, action.effect(), retry_count);

        match outcome {
            ResolutionOutcome::Discard => {
                tracing::warn!(retry_count, ?signal, "Discarding queued mutation");
                true
            }
            ResolutionOutcome::Retry { new_variables } => {
                if let (Some(variables), Some(effect)) = (new_variables, action.effect_mut()) {
                    effect.variables = variables;
                }
                false
            }
        }
    }
}

/// Build the scheduler's discard callback with the default markers and
/// retry ceiling
pub fn make_discard_predicate(
    handler: Option<Arc<dyn ConflictHandler>>,
) -> impl Fn(&OperationError, &mut QueueAction, u32) -> bool + Send + Sync {
    make_discard_predicate_with_config(handler, ConflictConfig::default())
}

/// Build the scheduler's discard callback from an explicit configuration
pub fn make_discard_predicate_with_config(
    handler: Option<Arc<dyn ConflictHandler>>,
    config: ConflictConfig,
) -> impl Fn(&OperationError, &mut QueueAction, u32) -> bool + Send + Sync {
    let predicate = DiscardPredicate::new(ConflictResolver::with_config(handler, config));
    move |error: &OperationError, action: &mut QueueAction, retry_count: u32| {
        predicate.should_discard(error, action, retry_count)
    }
}
