//! Error types shared across the Tideline crates
//!
//! [`TidelineError`] covers configuration and (de)serialization of durable
//! records. [`LinkError`] is what a result stream yields on failure: either
//! the offline cache could not answer, or the downstream transport failed.

use serde::{Deserialize, Serialize};

use crate::cache::CacheMissError;
use crate::response::OperationError;

/// Error raised while loading configuration or restoring durable records
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum TidelineError {
    /// A durable record (queued action, config file) could not be
    /// (de)serialized
    #[error("Serialization error: {message}")]
    Serialization {
        /// What failed to (de)serialize
        message: String,
    },

    /// Configuration could not be loaded or failed validation
    #[error("Configuration error: {message}")]
    Config {
        /// The offending setting and why it was rejected
        message: String,
    },
}

impl TidelineError {
    /// Create a serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for TidelineError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(err.to_string())
    }
}

/// Standard Result type for Tideline operations
pub type Result<T> = std::result::Result<T, TidelineError>;

/// Failure surfaced on a link result stream
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LinkError {
    /// An offline read could not be satisfied from the cache snapshot
    #[error(transparent)]
    CacheMiss(#[from] CacheMissError),

    /// The downstream transport failed; relayed verbatim
    #[error(transparent)]
    Operation(#[from] OperationError),
}

impl From<LinkError> for OperationError {
    fn from(err: LinkError) -> Self {
        match err {
            LinkError::Operation(err) => err,
            // There is no network to retry against, so the failure is final.
            LinkError::CacheMiss(miss) => OperationError::new(miss.to_string()).permanent(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn json_errors_map_to_serialization() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_matches!(TidelineError::from(err), TidelineError::Serialization { .. });
    }

    #[test]
    fn cache_miss_becomes_permanent_operation_error() {
        let link_err = LinkError::from(CacheMissError::new("todo.title"));
        let op_err = OperationError::from(link_err);
        assert!(op_err.permanent);
        assert!(op_err.message.contains("todo.title"));
    }

    #[test]
    fn operation_errors_pass_through_unchanged() {
        let original = OperationError::new("boom");
        let op_err = OperationError::from(LinkError::from(original.clone()));
        assert_eq!(op_err, original);
    }
}
