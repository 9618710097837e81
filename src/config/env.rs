//! Environment variable access
//!
//! [`EnvSource`] takes one snapshot of the environment at startup so that the
//! rest of the application never reads `std::env` implicitly. Tests build a
//! source from a literal list of pairs instead of mutating the process env.

use crate::domain::{CardScanError, Result};
use std::collections::HashMap;

/// Snapshot of environment key/value pairs
#[derive(Debug, Clone, Default)]
pub struct EnvSource {
    vars: HashMap<String, String>,
}

impl EnvSource {
    /// Captures the current process environment
    pub fn from_process() -> Self {
        Self {
            vars: std::env::vars().collect(),
        }
    }

    /// Builds a source from explicit pairs
    ///
    /// ```rust
    /// use cardscan::config::EnvSource;
    ///
    /// let env = EnvSource::from_pairs([("DEBUG", "yes")]);
    /// assert!(env.is_debug_enabled());
    /// ```
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Returns the value of `key`, or `default` when unset
    ///
    /// Empty values are treated as unset.
    pub fn get(&self, key: &str, default: Option<&str>) -> Option<String> {
        match self.vars.get(key).filter(|v| !v.trim().is_empty()) {
            Some(value) => Some(value.clone()),
            None => {
                if default.is_none() {
                    tracing::debug!(key = %key, "Environment variable not found");
                }
                default.map(str::to_string)
            }
        }
    }

    /// Returns the value of a required variable
    ///
    /// # Errors
    ///
    /// Returns a configuration error naming the key when it is unset or empty.
    pub fn require(&self, key: &str) -> Result<String> {
        self.get(key, None).ok_or_else(|| {
            CardScanError::Configuration(format!("Missing required environment variable: {key}"))
        })
    }

    /// Parses the value of `key` as an integer
    ///
    /// An unset or unparseable value yields `default`; the latter logs a warning.
    pub fn get_int(&self, key: &str, default: Option<i64>) -> Option<i64> {
        match self.get(key, None) {
            Some(raw) => match raw.trim().parse::<i64>() {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(key = %key, value = %raw, "Environment variable is not a valid integer");
                    default
                }
            },
            None => default,
        }
    }

    /// Parses the value of `key` as a boolean
    ///
    /// `true`, `1`, `yes` and `on` (any case) are true; any other set value is
    /// false. An unset value yields `default`.
    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        match self.get(key, None) {
            Some(raw) => matches!(
                raw.trim().to_ascii_lowercase().as_str(),
                "true" | "1" | "yes" | "on"
            ),
            None => default,
        }
    }

    /// Whether `DEBUG` is enabled
    pub fn is_debug_enabled(&self) -> bool {
        self.get_bool("DEBUG", false)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key, None).is_some()
    }
}
