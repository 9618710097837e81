//! Azure Blob Storage adapter
//!
//! Uploads card images to a container and returns a URL the analysis service
//! can read: a read-only SAS URL when signing credentials are configured,
//! otherwise the direct blob URL.

pub mod auth;
pub mod client;
pub mod connection;
pub mod sas;
pub mod traits;

pub use client::AzureBlobStore;
pub use connection::StorageConnection;
pub use sas::SasError;
pub use traits::BlobStore;
