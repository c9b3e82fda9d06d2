//! Configuration traits

use crate::errors::TidelineError;

/// Configuration that can check its own invariants
pub trait ConfigValidation {
    /// Validate this configuration
    fn validate(&self) -> Result<(), TidelineError>;
}

/// Configuration that accepts `PREFIX_KEY=value` overrides
pub trait EnvOverrides {
    /// Variable prefix, e.g. `TIDELINE_`
    const PREFIX: &'static str;

    /// Apply one override. `key` has the prefix stripped. Unknown keys are
    /// ignored; malformed values are errors.
    fn apply_override(&mut self, key: &str, value: &str) -> Result<(), TidelineError>;

    /// Apply every prefixed variable from `vars`
    fn merge_with_vars<I>(&mut self, vars: I) -> Result<(), TidelineError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            if let Some(stripped) = key.strip_prefix(Self::PREFIX) {
                self.apply_override(stripped, &value)?;
            }
        }
        Ok(())
    }

    /// Apply every prefixed variable from the process environment
    fn merge_with_env(&mut self) -> Result<(), TidelineError> {
        self.merge_with_vars(std::env::vars())
    }
}
