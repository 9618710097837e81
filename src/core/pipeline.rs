//! Card analysis pipeline
//!
//! One request runs upload, analysis and validation in order. A failure in
//! upload or analysis stops the pipeline; nothing is retried.

use crate::adapters::{AzureBlobStore, BlobStore, DocumentAnalyzer, DocumentIntelligenceClient};
use crate::config::AppConfig;
use crate::core::validation::{validate, ValidationReport};
use crate::domain::{BlobName, ExtractedCardFields, ImageUpload, Result, UploadedAsset};
use crate::{log_error_with_context, log_stage_complete};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

/// Everything produced for one uploaded image
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisOutcome {
    pub asset: UploadedAsset,
    pub fields: ExtractedCardFields,
    pub report: ValidationReport,
}

/// Upload, analyze and validate a card image
///
/// The pipeline holds shared handles to the two services so that one instance
/// can serve every request.
#[derive(Clone)]
pub struct CardAnalysisPipeline {
    store: Arc<dyn BlobStore>,
    analyzer: Arc<dyn DocumentAnalyzer>,
    use_signed_url: bool,
}

impl CardAnalysisPipeline {
    pub fn new(
        store: Arc<dyn BlobStore>,
        analyzer: Arc<dyn DocumentAnalyzer>,
        use_signed_url: bool,
    ) -> Self {
        Self {
            store,
            analyzer,
            use_signed_url,
        }
    }

    /// Build the Azure-backed pipeline
    ///
    /// # Errors
    ///
    /// Returns an error if either client cannot be constructed from the
    /// configuration.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let store = AzureBlobStore::new(&config.storage)?;
        let analyzer = DocumentIntelligenceClient::new(&config.document)?;

        Ok(Self::new(
            Arc::new(store),
            Arc::new(analyzer),
            config.storage.use_sas,
        ))
    }

    /// Run the full pipeline for one image
    ///
    /// # Errors
    ///
    /// Returns the storage error if the upload fails (analysis is not
    /// attempted) or the analysis error if extraction fails.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use cardscan::config::load_from_env;
    /// use cardscan::core::CardAnalysisPipeline;
    /// use cardscan::domain::ImageUpload;
    ///
    /// # async fn example() -> cardscan::domain::Result<()> {
    /// let config = load_from_env()?;
    /// let pipeline = CardAnalysisPipeline::from_config(&config)?;
    ///
    /// let image = ImageUpload::new("card.jpg", std::fs::read("card.jpg")?)?;
    /// let outcome = pipeline.process(image).await?;
    /// println!("{}", outcome.report.format_summary());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn process(&self, image: ImageUpload) -> Result<AnalysisOutcome> {
        let started = Instant::now();
        let blob_name = BlobName::generate(image.file_name());

        tracing::info!(
            file = %image.file_name(),
            blob = %blob_name,
            bytes = image.size(),
            "Processing card image"
        );

        let stage = Instant::now();
        let asset = self
            .store
            .upload(&image, &blob_name, self.use_signed_url)
            .await
            .map_err(|e| {
                log_error_with_context!(&e, "upload");
                e
            })?;
        log_stage_complete!("upload", stage.elapsed());

        let stage = Instant::now();
        let fields = self.analyzer.analyze_url(&asset.url).await.map_err(|e| {
            log_error_with_context!(&e, "analysis");
            e
        })?;
        log_stage_complete!("analysis", stage.elapsed());

        let report = validate(&fields);
        if report.is_fully_detected() {
            tracing::info!(
                detected = report.detected_count(),
                total = report.total_count(),
                status = %report.status,
                "Card validated"
            );
        } else {
            tracing::warn!(
                detected = report.detected_count(),
                total = report.total_count(),
                status = %report.status,
                "Card partially validated"
            );
        }
        log_stage_complete!("pipeline", started.elapsed());

        Ok(AnalysisOutcome {
            asset,
            fields,
            report,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AccessUrlKind, AnalysisError, CardScanError, StorageError};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

    struct FailingStore;

    #[async_trait]
    impl BlobStore for FailingStore {
        async fn upload(&self, _: &ImageUpload, blob: &BlobName, _: bool) -> Result<UploadedAsset> {
            Err(StorageError::UploadFailed {
                blob: blob.to_string(),
                status: 500,
                message: "InternalError".to_string(),
            }
            .into())
        }
    }

    struct FixedStore;

    #[async_trait]
    impl BlobStore for FixedStore {
        async fn upload(
            &self,
            image: &ImageUpload,
            blob: &BlobName,
            signed: bool,
        ) -> Result<UploadedAsset> {
            Ok(UploadedAsset {
                blob_name: blob.clone(),
                url: format!("https://example.blob.core.windows.net/cards/{blob}"),
                url_kind: if signed {
                    AccessUrlKind::Signed
                } else {
                    AccessUrlKind::Direct
                },
                size_bytes: image.size() as u64,
                content_type: image.format().content_type().to_string(),
            })
        }
    }

    #[derive(Default)]
    struct CountingAnalyzer {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl DocumentAnalyzer for CountingAnalyzer {
        async fn analyze_url(&self, _: &str) -> Result<ExtractedCardFields> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(AnalysisError::Timeout { attempts: 1 }.into())
        }

        async fn analyze_bytes(&self, _: &[u8]) -> Result<ExtractedCardFields> {
            self.analyze_url("").await
        }
    }

    #[tokio::test]
    async fn test_upload_failure_skips_analysis() {
        let analyzer = Arc::new(CountingAnalyzer::default());
        let pipeline = CardAnalysisPipeline::new(Arc::new(FailingStore), analyzer.clone(), true);

        let result = pipeline
            .process(ImageUpload::new("card.png", PNG.to_vec()).unwrap())
            .await;

        assert!(matches!(result, Err(CardScanError::Storage(_))));
        assert_eq!(analyzer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_analysis_failure_is_returned() {
        let analyzer = Arc::new(CountingAnalyzer::default());
        let pipeline = CardAnalysisPipeline::new(Arc::new(FixedStore), analyzer.clone(), false);

        let result = pipeline
            .process(ImageUpload::new("card.png", PNG.to_vec()).unwrap())
            .await;

        assert!(matches!(
            result,
            Err(CardScanError::Analysis(AnalysisError::Timeout { .. }))
        ));
        assert_eq!(analyzer.calls.load(Ordering::SeqCst), 1);
    }
}
