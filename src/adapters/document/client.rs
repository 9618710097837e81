//! Azure Document Intelligence REST client
//!
//! Submits an analyze request, then polls the returned `Operation-Location`
//! until the operation reaches a terminal status.

use super::models::{AnalyzeOperation, AnalyzeRequest, ErrorEnvelope, OperationStatus};
use super::traits::DocumentAnalyzer;
use crate::config::{DocumentIntelligenceConfig, SecretString};
use crate::domain::{AnalysisError, CardScanError, ExtractedCardFields, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use reqwest::{Client, ClientBuilder, Response, StatusCode};
use secrecy::ExposeSecret;
use std::time::{Duration, Instant};
use url::Url;

const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";

/// Client for the prebuilt credit card model
pub struct DocumentIntelligenceClient {
    client: Client,
    analyze_endpoint: Url,
    api_key: SecretString,
    model_id: String,
    poll_interval: Duration,
    max_poll_attempts: u32,
}

impl DocumentIntelligenceClient {
    /// Create a client from configuration
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the endpoint does not form a valid
    /// analyze URL or the HTTP client cannot be built.
    pub fn new(config: &DocumentIntelligenceConfig) -> Result<Self> {
        let analyze_endpoint = analyze_endpoint(config)?;

        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                CardScanError::Configuration(format!("Failed to create HTTP client: {e}"))
            })?;

        tracing::info!(
            endpoint = %config.endpoint,
            region = %config.region,
            model = %config.model_id,
            api_version = %config.api_version,
            "Document Intelligence client initialized"
        );

        Ok(Self {
            client,
            analyze_endpoint,
            api_key: config.api_key.clone(),
            model_id: config.model_id.clone(),
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            max_poll_attempts: config.max_poll_attempts,
        })
    }

    fn api_key(&self) -> &str {
        self.api_key.expose_secret().as_ref()
    }

    async fn analyze(&self, request: AnalyzeRequest) -> Result<ExtractedCardFields> {
        let started = Instant::now();
        let (operation_url, first_delay) = self.submit(&request).await?;
        let fields = self.poll(&operation_url, first_delay).await?;

        if fields.is_empty() {
            tracing::warn!(model = %self.model_id, "No credit card fields detected in image");
        } else {
            tracing::info!(
                model = %self.model_id,
                field_count = fields.len(),
                duration_ms = started.elapsed().as_millis() as u64,
                "Extracted fields from credit card"
            );
        }

        Ok(fields)
    }

    /// Start the analyze operation
    ///
    /// Returns the status URL and the delay the service asked for before the
    /// first poll.
    async fn submit(
        &self,
        request: &AnalyzeRequest,
    ) -> std::result::Result<(String, Option<Duration>), AnalysisError> {
        let response = self
            .client
            .post(self.analyze_endpoint.clone())
            .header(SUBSCRIPTION_KEY_HEADER, self.api_key())
            .json(request)
            .send()
            .await
            .map_err(|e| AnalysisError::ConnectionFailed(e.to_string()))?;

        match response.status() {
            StatusCode::ACCEPTED => {}
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                let (_, message) = service_error(response).await;
                return Err(AnalysisError::AuthenticationFailed(message));
            }
            status => {
                let (_, message) = service_error(response).await;
                return Err(AnalysisError::RequestRejected {
                    status: status.as_u16(),
                    message,
                });
            }
        }

        let location = response
            .headers()
            .get("operation-location")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| {
                AnalysisError::InvalidResponse(
                    "analyze response has no Operation-Location header".to_string(),
                )
            })?;

        tracing::debug!(operation = %strip_query(&location), "Analyze operation accepted");
        Ok((location, retry_after(&response)))
    }

    async fn poll(
        &self,
        operation_url: &str,
        first_delay: Option<Duration>,
    ) -> std::result::Result<ExtractedCardFields, AnalysisError> {
        let mut delay = first_delay.unwrap_or(self.poll_interval);

        for attempt in 1..=self.max_poll_attempts {
            tokio::time::sleep(delay).await;

            let response = self
                .client
                .get(operation_url)
                .header(SUBSCRIPTION_KEY_HEADER, self.api_key())
                .send()
                .await
                .map_err(|e| AnalysisError::ConnectionFailed(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                let (_, message) = service_error(response).await;
                return Err(AnalysisError::RequestRejected {
                    status: status.as_u16(),
                    message,
                });
            }

            delay = retry_after(&response).unwrap_or(self.poll_interval);

            let operation: AnalyzeOperation = response
                .json()
                .await
                .map_err(|e| AnalysisError::InvalidResponse(e.to_string()))?;

            tracing::debug!(attempt, status = ?operation.status, "Polled analyze operation");

            if !operation.status.is_terminal() {
                continue;
            }

            if operation.status == OperationStatus::Succeeded {
                return Ok(operation
                    .analyze_result
                    .map(|result| result.to_card_fields())
                    .unwrap_or_default());
            }

            let error = operation.error.unwrap_or_default();
            return Err(AnalysisError::OperationFailed {
                code: if error.code.is_empty() {
                    format!("{:?}", operation.status)
                } else {
                    error.code
                },
                message: error.message,
            });
        }

        Err(AnalysisError::Timeout {
            attempts: self.max_poll_attempts,
        })
    }
}

#[async_trait]
impl DocumentAnalyzer for DocumentIntelligenceClient {
    async fn analyze_url(&self, url: &str) -> Result<ExtractedCardFields> {
        if url.trim().is_empty() {
            return Err(CardScanError::Validation(
                "document URL is required".to_string(),
            ));
        }

        tracing::info!(source = %strip_query(url), "Analyzing credit card image");
        self.analyze(AnalyzeRequest::UrlSource(url.to_string())).await
    }

    async fn analyze_bytes(&self, bytes: &[u8]) -> Result<ExtractedCardFields> {
        if bytes.is_empty() {
            return Err(CardScanError::Validation(
                "document content is empty".to_string(),
            ));
        }

        tracing::info!(bytes = bytes.len(), "Analyzing credit card image");
        self.analyze(AnalyzeRequest::Base64Source(
            general_purpose::STANDARD.encode(bytes),
        ))
        .await
    }
}

fn analyze_endpoint(config: &DocumentIntelligenceConfig) -> Result<Url> {
    let raw = format!(
        "{}/documentintelligence/documentModels/{}:analyze",
        config.endpoint.trim_end_matches('/'),
        config.model_id
    );
    let mut url = Url::parse(&raw).map_err(|e| {
        CardScanError::Configuration(format!("Invalid Document Intelligence endpoint: {e}"))
    })?;
    url.query_pairs_mut()
        .append_pair("api-version", &config.api_version);
    Ok(url)
}

fn retry_after(response: &Response) -> Option<Duration> {
    response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

// Returns (code, message), falling back to the raw body
async fn service_error(response: Response) -> (String, String) {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    match serde_json::from_str::<ErrorEnvelope>(&body) {
        Ok(envelope) => (envelope.error.code, envelope.error.message),
        Err(_) if body.trim().is_empty() => (status.as_u16().to_string(), status.to_string()),
        Err(_) => (status.as_u16().to_string(), body),
    }
}

// SAS tokens must not end up in the logs
fn strip_query(url: &str) -> &str {
    url.split('?').next().unwrap_or(url)
}
