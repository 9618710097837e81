// Cardscan - Credit card analysis with Azure Document Intelligence
// Copyright (c) 2025 Cardscan Contributors
// Licensed under the MIT License

//! # Cardscan - Credit Card Analysis with Azure Document Intelligence
//!
//! Cardscan is a small web front end that lets a user upload a photo of a
//! credit card, stores it in Azure Blob Storage, extracts the card fields with
//! the Document Intelligence prebuilt credit card model, and shows which
//! fields were found.
//!
//! ## Overview
//!
//! This library provides:
//! - **Uploading** images to a blob container and returning a SAS or direct URL
//! - **Analyzing** that URL with Azure Document Intelligence
//! - **Validating** the extracted fields (holder name, number and expiration
//!   are required; CVV, network and issuing bank are advisory)
//! - **Rendering** the result in the browser
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`web`] - HTTP routes and HTML rendering
//! - [`core`] - Validation and the analysis pipeline
//! - [`adapters`] - Azure Blob Storage and Document Intelligence clients
//! - [`domain`] - Card fields, uploads and error types
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cardscan::config::load_from_env;
//! use cardscan::core::CardAnalysisPipeline;
//! use cardscan::domain::ImageUpload;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_from_env()?;
//!     let pipeline = CardAnalysisPipeline::from_config(&config)?;
//!
//!     let image = ImageUpload::new("card.png", std::fs::read("card.png")?)?;
//!     let outcome = pipeline.process(image).await?;
//!
//!     println!("{}", outcome.report.format_summary());
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Library code returns [`domain::CardScanError`]. Storage and analysis
//! failures keep their own variants so the web layer can tell the user which
//! step failed.
//!
//! ```rust,no_run
//! use cardscan::domain::CardScanError;
//!
//! fn example() -> Result<(), CardScanError> {
//!     let config = cardscan::config::load_config("cardscan.toml")?;
//!     println!("{}", config.server.bind_addr);
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
pub mod web;
