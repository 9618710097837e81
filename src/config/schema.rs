//! Configuration schema types
//!
//! This module defines the typed configuration for cardscan. The same structs
//! are filled either from the environment or from an optional TOML file.

use crate::config::SecretString;
use serde::{Deserialize, Serialize};

/// Main cardscan configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Web server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Azure Document Intelligence settings
    pub document: DocumentIntelligenceConfig,

    /// Azure Blob Storage settings
    pub storage: StorageConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error describing the first invalid value
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.server.validate()?;
        self.document.validate()?;
        self.storage.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Debug mode: shows a banner in the UI and lowers the default log level
    #[serde(default)]
    pub debug: bool,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            debug: false,
        }
    }
}

/// Web server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address to listen on
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Maximum accepted upload size in megabytes
    #[serde(default = "default_max_upload_mb")]
    pub max_upload_mb: usize,
}

impl ServerConfig {
    fn validate(&self) -> Result<(), String> {
        if self.bind_addr.parse::<std::net::SocketAddr>().is_err() {
            return Err(format!(
                "server.bind_addr '{}' is not a valid socket address",
                self.bind_addr
            ));
        }

        if self.max_upload_mb == 0 || self.max_upload_mb > 50 {
            return Err(format!(
                "server.max_upload_mb must be between 1 and 50, got {}",
                self.max_upload_mb
            ));
        }

        Ok(())
    }

    /// Upload limit in bytes
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb * 1024 * 1024
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            max_upload_mb: default_max_upload_mb(),
        }
    }
}

/// Azure Document Intelligence configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentIntelligenceConfig {
    /// Resource endpoint, e.g. `https://my-resource.cognitiveservices.azure.com/`
    pub endpoint: String,

    /// Resource API key
    /// Stored securely in memory and automatically zeroized on drop
    pub api_key: SecretString,

    /// Azure region of the resource
    pub region: String,

    /// Prebuilt model used for analysis
    #[serde(default = "default_model_id")]
    pub model_id: String,

    /// REST API version
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Delay between polls when the service sends no Retry-After header
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Polls before giving up on an operation
    #[serde(default = "default_max_poll_attempts")]
    pub max_poll_attempts: u32,

    /// Per-request HTTP timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl DocumentIntelligenceConfig {
    fn validate(&self) -> Result<(), String> {
        use secrecy::ExposeSecret;

        validate_http_url("document.endpoint", &self.endpoint)?;

        if self.api_key.expose_secret().is_empty() {
            return Err("document.api_key cannot be empty".to_string());
        }

        if self.region.trim().is_empty() {
            return Err("document.region cannot be empty".to_string());
        }

        if self.model_id.trim().is_empty() {
            return Err("document.model_id cannot be empty".to_string());
        }

        if self.max_poll_attempts == 0 {
            return Err("document.max_poll_attempts must be at least 1".to_string());
        }

        if self.timeout_seconds == 0 {
            return Err("document.timeout_seconds must be at least 1".to_string());
        }

        Ok(())
    }
}

/// Azure Blob Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Storage account connection string
    /// Stored securely in memory and automatically zeroized on drop
    pub connection_string: SecretString,

    /// Container that receives the uploaded images
    pub container_name: String,

    /// Account name used to sign SAS URLs
    #[serde(default)]
    pub account_name: Option<String>,

    /// Account key used to sign SAS URLs
    #[serde(default)]
    pub account_key: Option<SecretString>,

    /// Return signed URLs instead of direct blob URLs
    #[serde(default = "default_true")]
    pub use_sas: bool,

    /// Lifetime of generated SAS URLs
    #[serde(default = "default_sas_expiration_hours")]
    pub sas_expiration_hours: u32,

    /// Per-request HTTP timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl StorageConfig {
    fn validate(&self) -> Result<(), String> {
        use secrecy::ExposeSecret;

        if self.connection_string.expose_secret().is_empty() {
            return Err("storage.connection_string cannot be empty".to_string());
        }

        validate_container_name(&self.container_name)?;

        if self.sas_expiration_hours == 0 || self.sas_expiration_hours > 168 {
            return Err(format!(
                "storage.sas_expiration_hours must be between 1 and 168, got {}",
                self.sas_expiration_hours
            ));
        }

        if self.timeout_seconds == 0 {
            return Err("storage.timeout_seconds must be at least 1".to_string());
        }

        Ok(())
    }

    /// Whether both SAS signing credentials are configured
    pub fn has_sas_credentials(&self) -> bool {
        self.account_name.is_some() && self.account_key.is_some()
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable JSON file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Directory for log files
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Rotation policy (daily, hourly, never)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when local logging is enabled".to_string());
        }

        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

fn validate_http_url(field: &str, value: &str) -> Result<(), String> {
    let parsed =
        url::Url::parse(value).map_err(|e| format!("{field} '{value}' is not a valid URL: {e}"))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(format!("{field} must start with http:// or https://"));
    }
    Ok(())
}

/// Azure container naming rules: 3-63 chars of lowercase letters, digits and
/// single hyphens, starting and ending with a letter or digit
pub(crate) fn validate_container_name(name: &str) -> Result<(), String> {
    let len = name.len();
    if !(3..=63).contains(&len) {
        return Err(format!(
            "storage.container_name must be 3-63 characters, got {len}"
        ));
    }

    let valid_chars = name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    let starts_ok = name.starts_with(|c: char| c.is_ascii_alphanumeric());
    let ends_ok = name.ends_with(|c: char| c.is_ascii_alphanumeric());

    if !valid_chars || !starts_ok || !ends_ok || name.contains("--") {
        return Err(format!(
            "storage.container_name '{name}' must use lowercase letters, digits and single hyphens"
        ));
    }

    Ok(())
}

pub(crate) fn default_log_level() -> String {
    "info".to_string()
}

pub(crate) fn default_bind_addr() -> String {
    "127.0.0.1:8501".to_string()
}

pub(crate) fn default_max_upload_mb() -> usize {
    10
}

pub(crate) fn default_model_id() -> String {
    "prebuilt-creditCard".to_string()
}

pub(crate) fn default_api_version() -> String {
    "2024-11-30".to_string()
}

pub(crate) fn default_poll_interval_ms() -> u64 {
    1000
}

pub(crate) fn default_max_poll_attempts() -> u32 {
    120
}

pub(crate) fn default_timeout_seconds() -> u64 {
    60
}

pub(crate) fn default_true() -> bool {
    true
}

pub(crate) fn default_sas_expiration_hours() -> u32 {
    24
}

fn default_local_path() -> String {
    "logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
