//! Document analysis abstraction

use crate::domain::{ExtractedCardFields, Result};
use async_trait::async_trait;

/// Extracts credit card fields from an image
#[async_trait]
pub trait DocumentAnalyzer: Send + Sync {
    /// Analyze an image the service can download from `url`
    ///
    /// # Errors
    ///
    /// Returns an analysis error if the service rejects the request, the
    /// operation fails, or polling times out. An image with no recognisable
    /// card yields an empty field map, not an error.
    async fn analyze_url(&self, url: &str) -> Result<ExtractedCardFields>;

    /// Analyze image bytes sent inline with the request
    ///
    /// # Errors
    ///
    /// Same as [`DocumentAnalyzer::analyze_url`].
    async fn analyze_bytes(&self, bytes: &[u8]) -> Result<ExtractedCardFields>;
}
