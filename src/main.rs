// Cardscan - Credit card analysis with Azure Document Intelligence
// Copyright (c) 2025 Cardscan Contributors
// Licensed under the MIT License

use cardscan::cli::{Cli, Commands};
use cardscan::config::{self, AppConfig, LoggingConfig};
use cardscan::domain::Result;
use cardscan::logging::{init_logging, resolve_log_level, with_startup_logging};
use clap::Parser;
use std::process;
use tokio::sync::watch;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Console-only logging while the configuration loads
    let startup_level = cli.log_level.as_deref().unwrap_or("info");
    let loaded = with_startup_logging(startup_level, || config::load(cli.config.as_deref()));

    let log_level = match resolve_log_level(
        cli.log_level.as_deref(),
        loaded
            .as_ref()
            .ok()
            .map(|c| c.application.log_level.as_str()),
    ) {
        Ok(level) => level,
        Err(e) => {
            eprintln!("❌ {e}");
            process::exit(2);
        }
    };
    let logging_config = match &loaded {
        Ok(c) => c.logging.clone(),
        Err(_) => LoggingConfig::default(),
    };

    let log_guard = match init_logging(&log_level, &logging_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(5);
        }
    };

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "Cardscan - Credit card analysis with Azure Document Intelligence"
    );

    // Create shutdown signal channel for graceful shutdown
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    tokio::spawn(async move {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            match signal(SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    tokio::select! {
                        _ = tokio::signal::ctrl_c() => {
                            tracing::info!("Received SIGINT (Ctrl+C), initiating graceful shutdown...");
                        }
                        _ = sigterm.recv() => {
                            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to install SIGTERM handler, using Ctrl+C only");
                    let _ = tokio::signal::ctrl_c().await;
                    tracing::info!("Received SIGINT (Ctrl+C), initiating graceful shutdown...");
                }
            }
            println!("\n⚠️  Shutdown signal received, finishing in-flight requests...");
            let _ = shutdown_tx.send(true);
        }

        #[cfg(not(unix))]
        {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            } else {
                tracing::info!("Received SIGINT (Ctrl+C), initiating graceful shutdown...");
                println!("\n⚠️  Shutdown signal received, finishing in-flight requests...");
                let _ = shutdown_tx.send(true);
            }
        }
    });

    let exit_code = match execute_command(&cli, loaded, shutdown_rx).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command execution failed");
            eprintln!("Error: {e}");
            5 // Fatal error exit code
        }
    };

    drop(log_guard);
    process::exit(exit_code);
}

/// Execute the CLI command
async fn execute_command(
    cli: &Cli,
    loaded: Result<AppConfig>,
    shutdown_signal: watch::Receiver<bool>,
) -> anyhow::Result<i32> {
    match &cli.command {
        Commands::Serve(args) => match loaded {
            Ok(config) => args.execute(config, shutdown_signal).await,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("❌ {e}");
                Ok(2)
            }
        },
        Commands::ValidateConfig(args) => {
            let source = cli.config.as_deref().unwrap_or("environment");
            args.execute(source, loaded).await
        }
    }
}
