//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for cardscan using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// Cardscan - credit card analysis with Azure Document Intelligence
#[derive(Parser, Debug)]
#[command(name = "cardscan")]
#[command(version, about, long_about = None)]
#[command(author = "Cardscan Contributors")]
pub struct Cli {
    /// Optional TOML configuration file; the environment is used when omitted
    #[arg(short, long, env = "CARDSCAN_CONFIG")]
    pub config: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "CARDSCAN_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the web front end
    Serve(commands::serve::ServeArgs),

    /// Load and validate the configuration without starting the server
    ValidateConfig(commands::validate::ValidateArgs),
}
