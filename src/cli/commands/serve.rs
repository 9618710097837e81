//! Serve command implementation
//!
//! Builds the Azure clients once and runs the web front end until a shutdown
//! signal arrives.

use crate::config::AppConfig;
use crate::core::CardAnalysisPipeline;
use crate::domain::{CardScanError, StorageError};
use crate::web;
use clap::Args;
use tokio::sync::watch;

/// Arguments for the serve command
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to listen on, overrides CARDSCAN_BIND_ADDR
    #[arg(short, long)]
    pub bind: Option<String>,
}

impl ServeArgs {
    /// Execute the serve command
    ///
    /// Returns exit code 2 when the configuration cannot be used to build the
    /// clients; runtime failures propagate as errors.
    pub async fn execute(
        &self,
        mut config: AppConfig,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        if let Some(bind) = &self.bind {
            config.server.bind_addr = bind.clone();
        }

        if let Err(e) = config.validate() {
            tracing::error!(error = %e, "Invalid configuration");
            eprintln!("❌ Configuration validation failed: {e}");
            return Ok(2);
        }

        let pipeline = match CardAnalysisPipeline::from_config(&config) {
            Ok(pipeline) => pipeline,
            Err(e) if is_configuration_error(&e) => {
                tracing::error!(error = %e, "Could not create service clients");
                eprintln!("❌ {e}");
                return Ok(2);
            }
            Err(e) => return Err(e.into()),
        };

        println!("🚀 Cardscan listening on http://{}", config.server.bind_addr);

        web::serve(&config, pipeline, shutdown_signal).await?;

        tracing::info!("Server stopped");
        Ok(0)
    }
}

fn is_configuration_error(error: &CardScanError) -> bool {
    matches!(
        error,
        CardScanError::Configuration(_)
            | CardScanError::Storage(StorageError::InvalidConnectionString(_))
    )
}
