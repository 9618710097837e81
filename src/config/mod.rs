//! Configuration management for cardscan.
//!
//! Configuration is read once at startup into an immutable [`AppConfig`] which
//! is then passed by reference to the clients and the web layer. Nothing reads
//! the environment after that point.
//!
//! # Sources
//!
//! - The process environment (after an optional `.env` file), see
//!   [`load_from_env`]
//! - A TOML file with `${VAR_NAME}` placeholders, see [`load_config`]
//!
//! In both cases the environment variables override file values.
//!
//! # Required Environment Variables
//!
//! ```bash
//! AZURE_DOCS_API_KEY=...
//! AZURE_DOCS_ENDPOINT=https://my-resource.cognitiveservices.azure.com/
//! AZURE_DOCS_REGION=eastus
//! AZURE_STORAGE_CONN_STRING="DefaultEndpointsProtocol=https;AccountName=...;AccountKey=...;EndpointSuffix=core.windows.net"
//! AZURE_STORAGE_CONTAINER_NAME=cards
//! ```
//!
//! # Example Configuration File
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [server]
//! bind_addr = "0.0.0.0:8501"
//!
//! [document]
//! endpoint = "https://my-resource.cognitiveservices.azure.com/"
//! api_key = "${AZURE_DOCS_API_KEY}"
//! region = "eastus"
//!
//! [storage]
//! connection_string = "${AZURE_STORAGE_CONN_STRING}"
//! container_name = "cards"
//! sas_expiration_hours = 24
//! ```

pub mod env;
pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use env::EnvSource;
pub use loader::{config_from_env, load_config, load_config_with_env, load_from_env};
pub use schema::{
    AppConfig, ApplicationConfig, DocumentIntelligenceConfig, LoggingConfig, ServerConfig,
    StorageConfig,
};
pub use secret::{secret_string, secret_string_opt, SecretString, SecretValue};

use crate::domain::Result;

/// Loads from `path` when given, otherwise from the environment
pub fn load(path: Option<&str>) -> Result<AppConfig> {
    match path {
        Some(path) => load_config(path),
        None => load_from_env(),
    }
}
