//! Wire models for the Document Intelligence analyze API
//!
//! Only the parts of the response that cardscan reads are modelled. Unknown
//! properties are ignored.

use crate::domain::ExtractedCardFields;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Body of the analyze request
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AnalyzeRequest {
    /// Publicly readable (or SAS) URL of the document
    UrlSource(String),
    /// Base64-encoded document bytes
    Base64Source(String),
}

/// Status of a long-running analyze operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OperationStatus {
    NotStarted,
    Running,
    Succeeded,
    Failed,
    Canceled,
    #[serde(other)]
    Unknown,
}

impl OperationStatus {
    /// Whether polling should stop
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OperationStatus::Succeeded | OperationStatus::Failed | OperationStatus::Canceled
        )
    }
}

/// Response of `GET {Operation-Location}`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeOperation {
    pub status: OperationStatus,
    #[serde(default)]
    pub analyze_result: Option<AnalyzeResult>,
    #[serde(default)]
    pub error: Option<ServiceError>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResult {
    #[serde(default)]
    pub model_id: Option<String>,
    #[serde(default)]
    pub documents: Vec<AnalyzedDocument>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzedDocument {
    #[serde(default)]
    pub doc_type: Option<String>,
    #[serde(default)]
    pub fields: HashMap<String, Option<DocumentField>>,
    #[serde(default)]
    pub confidence: Option<f64>,
}

/// One extracted field; `content` is the text as it appears on the card
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentField {
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
}

/// Error object returned by the service, both inline and as `{"error": ...}`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceError {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub error: ServiceError,
}

impl AnalyzeResult {
    /// Collects every field with content into a field map
    ///
    /// Fields from later documents replace same-named fields from earlier ones.
    pub fn to_card_fields(&self) -> ExtractedCardFields {
        let mut extracted = ExtractedCardFields::new();

        for document in &self.documents {
            if document.fields.is_empty() {
                tracing::debug!(doc_type = ?document.doc_type, "Document has no fields");
                continue;
            }

            for (name, field) in &document.fields {
                match field.as_ref().and_then(|f| f.content.as_deref()) {
                    Some(content) => {
                        tracing::debug!(field = %name, "Extracted field");
                        extracted.insert(name.as_str(), content);
                    }
                    None => tracing::debug!(field = %name, "Field has no content"),
                }
            }
        }

        extracted
    }
}
