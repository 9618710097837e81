//! Validate config command implementation
//!
//! Loads the configuration the same way `serve` does, validates it, and checks
//! that the service clients can be built from it. No network calls are made.

use crate::adapters::blob::StorageConnection;
use crate::adapters::DocumentIntelligenceClient;
use crate::config::AppConfig;
use crate::domain::Result;
use clap::Args;
use secrecy::ExposeSecret;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, source: &str, loaded: Result<AppConfig>) -> anyhow::Result<i32> {
        tracing::info!(source = %source, "Validating configuration");

        println!("🔍 Validating configuration from: {source}");
        println!();

        let config = match loaded {
            Ok(c) => {
                println!("✅ Configuration loaded successfully");
                c
            }
            Err(e) => {
                println!("❌ Failed to load configuration");
                println!("   Error: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        if let Err(e) = config.validate() {
            println!("❌ Configuration validation failed");
            println!("   Error: {e}");
            println!();
            return Ok(2);
        }

        let connection =
            match StorageConnection::parse(config.storage.connection_string.expose_secret().as_ref())
            {
                Ok(connection) => connection,
                Err(e) => {
                    println!("❌ {e}");
                    return Ok(2);
                }
            };

        if let Err(e) = DocumentIntelligenceClient::new(&config.document) {
            println!("❌ {e}");
            return Ok(2);
        }

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Debug: {}", config.application.debug);
        println!("  Bind Address: {}", config.server.bind_addr);
        println!("  Max Upload: {} MB", config.server.max_upload_mb);
        println!("  Document Intelligence Endpoint: {}", config.document.endpoint);
        println!("  Document Intelligence Region: {}", config.document.region);
        println!("  Model: {}", config.document.model_id);
        println!("  API Version: {}", config.document.api_version);
        println!("  Storage Account: {}", connection.account_name());
        println!("  Blob Endpoint: {}", connection.blob_endpoint());
        println!("  Container: {}", config.storage.container_name);

        if config.storage.use_sas && config.storage.has_sas_credentials() {
            println!(
                "  URL Mode: SAS ({} hour expiry)",
                config.storage.sas_expiration_hours
            );
        } else if config.storage.use_sas {
            println!("  URL Mode: direct (SAS enabled but signing credentials are missing)");
        } else {
            println!("  URL Mode: direct");
        }

        if config.logging.local_enabled {
            println!("  File Logging: {}", config.logging.local_path);
        }
        println!();

        Ok(0)
    }
}
