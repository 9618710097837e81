//! Blob storage abstraction
//!
//! The pipeline depends on this trait rather than on [`super::AzureBlobStore`]
//! so that tests can swap in an in-memory store.

use crate::domain::{BlobName, ImageUpload, Result, UploadedAsset};
use async_trait::async_trait;

/// Stores uploaded card images and hands back a readable URL
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Upload `image` under `blob_name`, overwriting any existing blob
    ///
    /// When `use_signed_url` is set the returned URL carries a read-only SAS
    /// token, unless signing is unavailable, in which case the direct blob URL
    /// is returned and [`UploadedAsset::url_kind`] says so.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the container cannot be created, the upload
    /// is rejected, or the service cannot be reached.
    async fn upload(
        &self,
        image: &ImageUpload,
        blob_name: &BlobName,
        use_signed_url: bool,
    ) -> Result<UploadedAsset>;
}
