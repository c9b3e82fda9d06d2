//! Link configuration
//!
//! Defaults reproduce the behavior of the AppSync offline link: conflicts are
//! recognised by the `DynamoDB:ConditionalCheckFailedException` error type,
//! client-side protocol errors by the `AWSAppSyncClient:` prefix, and a
//! replay is given up after more than ten retries.
//!
//! Every field can be overridden from the environment:
//!
//! | Variable | Field |
//! |---|---|
//! | `TIDELINE_ROOT_QUERY_ID` | `root_query_id` |
//! | `TIDELINE_MAX_RETRIES` | `conflict.max_retries` |
//! | `TIDELINE_CONDITIONAL_CHECK_ERROR` | `conflict.conditional_check_error_type` |
//! | `TIDELINE_CLIENT_ERROR_PREFIX` | `conflict.client_error_prefix` |

pub mod traits;
pub mod validation;

use serde::{Deserialize, Serialize};

use crate::cache::DEFAULT_ROOT_QUERY_ID;
use crate::errors::{Result, TidelineError};

pub use traits::{ConfigValidation, EnvOverrides};
pub use validation::ValidationError;

/// Error type marking an optimistic-concurrency rejection
pub const DEFAULT_CONDITIONAL_CHECK_ERROR: &str = "DynamoDB:ConditionalCheckFailedException";
/// Error type prefix of client-side protocol errors
pub const DEFAULT_CLIENT_ERROR_PREFIX: &str = "AWSAppSyncClient:";
/// Retries allowed before a replay is discarded
pub const DEFAULT_MAX_RETRIES: u32 = 10;

/// How replay failures are classified and bounded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConflictConfig {
    /// `errorType` of a conditional-check conflict
    pub conditional_check_error_type: String,
    /// `errorType` prefix of client protocol errors
    pub client_error_prefix: String,
    /// Discard once the retry count exceeds this
    pub max_retries: u32,
}

impl Default for ConflictConfig {
    fn default() -> Self {
        Self {
            conditional_check_error_type: DEFAULT_CONDITIONAL_CHECK_ERROR.to_string(),
            client_error_prefix: DEFAULT_CLIENT_ERROR_PREFIX.to_string(),
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

impl ConfigValidation for ConflictConfig {
    fn validate(&self) -> std::result::Result<(), TidelineError> {
        validation::require_non_empty(
            "conflict.conditional_check_error_type",
            &self.conditional_check_error_type,
        )?;
        validation::require_non_empty("conflict.client_error_prefix", &self.client_error_prefix)?;
        Ok(())
    }
}

/// Top-level configuration of the offline link
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OfflineLinkConfig {
    /// Entity id of the root query object in the cache snapshot
    pub root_query_id: String,
    /// Replay failure handling
    pub conflict: ConflictConfig,
}

impl Default for OfflineLinkConfig {
    fn default() -> Self {
        Self {
            root_query_id: DEFAULT_ROOT_QUERY_ID.to_string(),
            conflict: ConflictConfig::default(),
        }
    }
}

impl OfflineLinkConfig {
    /// Parse from JSON; missing fields take their defaults. The result is
    /// validated.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw)
            .map_err(|e| TidelineError::config(format!("Invalid JSON: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults with environment overrides applied, validated
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.merge_with_env()?;
        config.validate()?;
        Ok(config)
    }
}

impl ConfigValidation for OfflineLinkConfig {
    fn validate(&self) -> std::result::Result<(), TidelineError> {
        validation::require_non_empty("root_query_id", &self.root_query_id)?;
        self.conflict.validate()
    }
}

impl EnvOverrides for OfflineLinkConfig {
    const PREFIX: &'static str = "TIDELINE_";

    fn apply_override(&mut self, key: &str, value: &str) -> std::result::Result<(), TidelineError> {
        match key {
            "ROOT_QUERY_ID" => self.root_query_id = value.to_string(),
            "MAX_RETRIES" => {
                self.conflict.max_retries = validation::parse_u32("conflict.max_retries", value)?;
            }
            "CONDITIONAL_CHECK_ERROR" => {
                self.conflict.conditional_check_error_type = value.to_string();
            }
            "CLIENT_ERROR_PREFIX" => self.conflict.client_error_prefix = value.to_string(),
            _ => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_validate() {
        let config = OfflineLinkConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.root_query_id, "ROOT_QUERY");
        assert_eq!(config.conflict.max_retries, 10);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = OfflineLinkConfig::from_json_str(r#"{ "conflict": { "maxRetries": 3 } }"#)
            .unwrap();
        assert_eq!(config.conflict.max_retries, 3);
        assert_eq!(
            config.conflict.conditional_check_error_type,
            DEFAULT_CONDITIONAL_CHECK_ERROR
        );
    }

    #[test]
    fn blank_markers_fail_validation() {
        let result = OfflineLinkConfig::from_json_str(r#"{ "conflict": { "clientErrorPrefix": " " } }"#);
        assert_matches!(result, Err(TidelineError::Config { .. }));
    }

    #[test]
    fn env_overrides_apply_prefixed_keys_only() {
        let mut config = OfflineLinkConfig::default();
        config
            .merge_with_vars(vars(&[
                ("TIDELINE_MAX_RETRIES", "4"),
                ("TIDELINE_ROOT_QUERY_ID", "Query"),
                ("OTHER_MAX_RETRIES", "99"),
                ("TIDELINE_UNKNOWN", "x"),
            ]))
            .unwrap();
        assert_eq!(config.conflict.max_retries, 4);
        assert_eq!(config.root_query_id, "Query");
    }

    #[test]
    fn from_env_reads_process_environment() {
        std::env::set_var("TIDELINE_CLIENT_ERROR_PREFIX", "MyClient:");
        let config = OfflineLinkConfig::from_env();
        std::env::remove_var("TIDELINE_CLIENT_ERROR_PREFIX");

        let config = config.unwrap();
        assert_eq!(config.conflict.client_error_prefix, "MyClient:");
        assert_eq!(config.conflict.max_retries, DEFAULT_MAX_RETRIES);
    }

    #[test]
    fn malformed_override_is_rejected() {
        let mut config = OfflineLinkConfig::default();
        let result = config.merge_with_vars(vars(&[("TIDELINE_MAX_RETRIES", "many")]));
        assert_matches!(result, Err(TidelineError::Config { .. }));
    }
}
