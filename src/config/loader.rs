//! Configuration loading from the environment or a TOML file
//!
//! The environment is the primary source: the variable names below are the
//! ones operators already put in their `.env` files. A TOML file may be used
//! instead, with `${VAR}` placeholders and the same variables as overrides.

use super::env::EnvSource;
use super::schema::{
    default_api_version, default_bind_addr, default_max_poll_attempts, default_max_upload_mb,
    default_model_id, default_poll_interval_ms, default_timeout_seconds, AppConfig,
    ApplicationConfig, DocumentIntelligenceConfig, LoggingConfig, ServerConfig, StorageConfig,
};
use super::secret::{secret_string, secret_string_opt};
use crate::domain::errors::CardScanError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Variables that must be set, with a description used in error messages
pub const REQUIRED_VARS: [(&str, &str); 5] = [
    ("AZURE_DOCS_API_KEY", "Azure Document Intelligence API Key"),
    ("AZURE_DOCS_ENDPOINT", "Azure Document Intelligence Endpoint"),
    ("AZURE_DOCS_REGION", "Azure Document Intelligence Region"),
    ("AZURE_STORAGE_CONN_STRING", "Azure Storage Connection String"),
    ("AZURE_STORAGE_CONTAINER_NAME", "Azure Storage Container Name"),
];

/// Variables that are reported as a warning when absent
pub const OPTIONAL_VARS: [(&str, &str); 3] = [
    ("AZURE_STORAGE_STORAGE_NAME", "Azure Storage Account Name"),
    ("AZURE_STORAGE_API_KEY", "Azure Storage API Key"),
    ("DEBUG", "Enable debug mode"),
];

/// Loads configuration from the process environment
///
/// Call `dotenvy::dotenv()` first if a `.env` file should be honoured.
///
/// # Errors
///
/// Returns a configuration error listing every missing required variable, or
/// the first invalid value.
pub fn load_from_env() -> Result<AppConfig> {
    config_from_env(&EnvSource::from_process())
}

/// Builds the configuration from an environment snapshot
///
/// # Examples
///
/// ```
/// use cardscan::config::{config_from_env, EnvSource};
///
/// let env = EnvSource::from_pairs([
///     ("AZURE_DOCS_API_KEY", "key"),
///     ("AZURE_DOCS_ENDPOINT", "https://cards.cognitiveservices.azure.com/"),
///     ("AZURE_DOCS_REGION", "eastus"),
///     ("AZURE_STORAGE_CONN_STRING", "AccountName=acct;AccountKey=a2V5"),
///     ("AZURE_STORAGE_CONTAINER_NAME", "cards"),
/// ]);
/// let config = config_from_env(&env).unwrap();
/// assert_eq!(config.storage.container_name, "cards");
/// ```
pub fn config_from_env(env: &EnvSource) -> Result<AppConfig> {
    let missing_required: Vec<String> = REQUIRED_VARS
        .iter()
        .filter(|(name, _)| !env.contains(name))
        .map(|(name, description)| format!("{name} ({description})"))
        .collect();

    if !missing_required.is_empty() {
        let message = format!(
            "Missing required environment variables: {}",
            missing_required.join(", ")
        );
        tracing::error!(missing = ?missing_required, "Configuration incomplete");
        return Err(CardScanError::Configuration(message));
    }

    let missing_optional: Vec<&str> = OPTIONAL_VARS
        .iter()
        .filter(|(name, _)| !env.contains(name))
        .map(|(name, _)| *name)
        .collect();
    if !missing_optional.is_empty() {
        tracing::warn!(missing = ?missing_optional, "Optional environment variables not set");
    }

    let mut config = AppConfig {
        application: ApplicationConfig::default(),
        server: ServerConfig {
            bind_addr: default_bind_addr(),
            max_upload_mb: default_max_upload_mb(),
        },
        document: DocumentIntelligenceConfig {
            endpoint: env.require("AZURE_DOCS_ENDPOINT")?,
            api_key: secret_string(env.require("AZURE_DOCS_API_KEY")?),
            region: env.require("AZURE_DOCS_REGION")?,
            model_id: default_model_id(),
            api_version: default_api_version(),
            poll_interval_ms: default_poll_interval_ms(),
            max_poll_attempts: default_max_poll_attempts(),
            timeout_seconds: default_timeout_seconds(),
        },
        storage: StorageConfig {
            connection_string: secret_string(env.require("AZURE_STORAGE_CONN_STRING")?),
            container_name: env.require("AZURE_STORAGE_CONTAINER_NAME")?,
            account_name: None,
            account_key: None,
            use_sas: true,
            sas_expiration_hours: 24,
            timeout_seconds: default_timeout_seconds(),
        },
        logging: LoggingConfig::default(),
    };

    apply_env_overrides(&mut config, env)?;
    finish(config)
}

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Substitutes `${VAR}` placeholders from the environment
/// 3. Parses the TOML into [`AppConfig`]
/// 4. Applies environment variable overrides
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if the file is missing or unreadable, a placeholder refers
/// to an unset variable, parsing fails, or validation fails.
pub fn load_config(path: impl AsRef<Path>) -> Result<AppConfig> {
    load_config_with_env(path, &EnvSource::from_process())
}

/// Same as [`load_config`] with an explicit environment snapshot
pub fn load_config_with_env(path: impl AsRef<Path>, env: &EnvSource) -> Result<AppConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(CardScanError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        CardScanError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents, env)?;

    let mut config: AppConfig = toml::from_str(&contents)
        .map_err(|e| CardScanError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config, env)?;
    finish(config)
}

fn finish(config: AppConfig) -> Result<AppConfig> {
    config.validate().map_err(|e| {
        CardScanError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    tracing::info!(
        container = %config.storage.container_name,
        endpoint = %config.document.endpoint,
        use_sas = config.storage.use_sas,
        debug = config.application.debug,
        "Configuration loaded"
    );

    Ok(config)
}

/// Substitutes `${VAR_NAME}` placeholders, leaving comment lines untouched
fn substitute_env_vars(input: &str, env: &EnvSource) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| CardScanError::Configuration(format!("Invalid placeholder pattern: {e}")))?;
    let mut lines = Vec::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            lines.push(line.to_string());
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match env.get(var_name, None) {
                Some(value) => {
                    processed_line = processed_line.replace(&cap[0], &value);
                }
                None => {
                    if !missing_vars.iter().any(|m| m == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        lines.push(processed_line);
    }

    if !missing_vars.is_empty() {
        return Err(CardScanError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(lines.join("\n"))
}

fn env_u64(env: &EnvSource, key: &str) -> Result<Option<u64>> {
    match env.get_int(key, None) {
        Some(value) if value < 0 => Err(CardScanError::Configuration(format!(
            "{key} must not be negative, got {value}"
        ))),
        Some(value) => Ok(Some(value as u64)),
        None => Ok(None),
    }
}

/// Applies environment variable overrides on top of file or default values
fn apply_env_overrides(config: &mut AppConfig, env: &EnvSource) -> Result<()> {
    // Application
    config.application.debug = env.get_bool("DEBUG", config.application.debug);
    match env.get("CARDSCAN_LOG_LEVEL", None) {
        Some(level) => config.application.log_level = level.to_lowercase(),
        None if config.application.debug => config.application.log_level = "debug".to_string(),
        None => {}
    }

    // Server
    if let Some(addr) = env.get("CARDSCAN_BIND_ADDR", None) {
        config.server.bind_addr = addr;
    }
    if let Some(mb) = env_u64(env, "CARDSCAN_MAX_UPLOAD_MB")? {
        config.server.max_upload_mb = mb as usize;
    }
    let timeout = env_u64(env, "CARDSCAN_HTTP_TIMEOUT_SECONDS")?;

    // Document Intelligence
    if let Some(val) = env.get("AZURE_DOCS_ENDPOINT", None) {
        config.document.endpoint = val;
    }
    if let Some(val) = env.get("AZURE_DOCS_API_KEY", None) {
        config.document.api_key = secret_string(val);
    }
    if let Some(val) = env.get("AZURE_DOCS_REGION", None) {
        config.document.region = val;
    }
    if let Some(val) = env.get("AZURE_DOCS_MODEL_ID", None) {
        config.document.model_id = val;
    }
    if let Some(val) = env.get("AZURE_DOCS_API_VERSION", None) {
        config.document.api_version = val;
    }
    if let Some(val) = env_u64(env, "AZURE_DOCS_POLL_INTERVAL_MS")? {
        config.document.poll_interval_ms = val;
    }
    if let Some(val) = env_u64(env, "AZURE_DOCS_MAX_POLL_ATTEMPTS")? {
        config.document.max_poll_attempts = u32::try_from(val).unwrap_or(u32::MAX);
    }

    // Blob Storage
    if let Some(val) = env.get("AZURE_STORAGE_CONN_STRING", None) {
        config.storage.connection_string = secret_string(val);
    }
    if let Some(val) = env.get("AZURE_STORAGE_CONTAINER_NAME", None) {
        config.storage.container_name = val;
    }
    if let Some(val) = env.get("AZURE_STORAGE_STORAGE_NAME", None) {
        config.storage.account_name = Some(val);
    }
    if env.contains("AZURE_STORAGE_API_KEY") {
        config.storage.account_key = secret_string_opt(env.get("AZURE_STORAGE_API_KEY", None));
    }
    config.storage.use_sas = env.get_bool("AZURE_STORAGE_USE_SAS", config.storage.use_sas);
    if let Some(val) = env_u64(env, "AZURE_STORAGE_SAS_EXPIRATION_HOURS")? {
        config.storage.sas_expiration_hours = u32::try_from(val).unwrap_or(u32::MAX);
    }

    if let Some(seconds) = timeout {
        config.document.timeout_seconds = seconds;
        config.storage.timeout_seconds = seconds;
    }

    // Logging
    if let Some(dir) = env.get("CARDSCAN_LOG_DIR", None) {
        config.logging.local_enabled = true;
        config.logging.local_path = dir;
    }
    if let Some(rotation) = env.get("CARDSCAN_LOG_ROTATION", None) {
        config.logging.local_rotation = rotation.to_lowercase();
    }

    Ok(())
}
