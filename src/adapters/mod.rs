//! External service integrations for cardscan.
//!
//! - [`blob`] - Azure Blob Storage (image upload, SAS URLs)
//! - [`document`] - Azure Document Intelligence (credit card extraction)
//!
//! # Design Pattern
//!
//! Each adapter exposes a trait ([`BlobStore`], [`DocumentAnalyzer`]) and an
//! Azure implementation. The pipeline only sees the traits, so tests run it
//! against in-memory stubs.
//!
//! ```rust,no_run
//! use cardscan::adapters::{AzureBlobStore, BlobStore, DocumentIntelligenceClient};
//! use cardscan::config::load_from_env;
//! use std::sync::Arc;
//!
//! # fn example() -> cardscan::domain::Result<()> {
//! let config = load_from_env()?;
//! let store: Arc<dyn BlobStore> = Arc::new(AzureBlobStore::new(&config.storage)?);
//! let analyzer = Arc::new(DocumentIntelligenceClient::new(&config.document)?);
//! # Ok(())
//! # }
//! ```

pub mod blob;
pub mod document;

pub use blob::{AzureBlobStore, BlobStore};
pub use document::{DocumentAnalyzer, DocumentIntelligenceClient};
