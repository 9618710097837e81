//! Domain error types
//!
//! This module defines the error hierarchy for cardscan. Errors raised by the
//! HTTP clients are converted into domain variants so that no third-party types
//! leak out of the adapters.

use thiserror::Error;

/// Main cardscan error type
///
/// This is the primary error type used throughout the application.
#[derive(Debug, Error)]
pub enum CardScanError {
    /// Configuration-related errors (missing or invalid settings)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Azure Blob Storage errors
    #[error("Blob storage error: {0}")]
    Storage(#[from] StorageError),

    /// Azure Document Intelligence errors
    #[error("Document analysis error: {0}")]
    Analysis(#[from] AnalysisError),

    /// Invalid user input (unsupported file type, empty upload, ...)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl CardScanError {
    /// Whether the error happened while talking to an external service
    pub fn is_upstream(&self) -> bool {
        matches!(self, CardScanError::Storage(_) | CardScanError::Analysis(_))
    }
}

/// Blob Storage errors
///
/// Errors that occur when interacting with Azure Blob Storage.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The connection string could not be parsed
    #[error("Invalid connection string: {0}")]
    InvalidConnectionString(String),

    /// Failed to reach the storage endpoint
    #[error("Failed to connect to blob storage: {0}")]
    ConnectionFailed(String),

    /// Request was rejected with 401/403
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Container could not be created or accessed
    #[error("Failed to create container '{container}': {message}")]
    ContainerCreationFailed { container: String, message: String },

    /// Blob upload failed
    #[error("Failed to upload blob '{blob}': {status} - {message}")]
    UploadFailed {
        blob: String,
        status: u16,
        message: String,
    },

    /// Blob properties could not be read back after upload
    #[error("Failed to read properties of blob '{0}'")]
    PropertiesUnavailable(String),

    /// Request could not be built or signed
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Document Intelligence errors
///
/// Errors that occur when submitting documents for analysis or polling results.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Failed to reach the Document Intelligence endpoint
    #[error("Failed to connect to Document Intelligence: {0}")]
    ConnectionFailed(String),

    /// Request was rejected with 401/403
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The service returned a non-success status
    #[error("Request rejected: {status} - {message}")]
    RequestRejected { status: u16, message: String },

    /// The analyze operation finished with status `failed`
    #[error("Analysis operation failed: {code} - {message}")]
    OperationFailed { code: String, message: String },

    /// Response did not have the expected shape
    #[error("Invalid response from service: {0}")]
    InvalidResponse(String),

    /// Polling gave up before the operation completed
    #[error("Analysis did not complete after {attempts} polling attempts")]
    Timeout { attempts: u32 },
}

// Conversion from std::io::Error
impl From<std::io::Error> for CardScanError {
    fn from(err: std::io::Error) -> Self {
        CardScanError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for CardScanError {
    fn from(err: serde_json::Error) -> Self {
        CardScanError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for CardScanError {
    fn from(err: toml::de::Error) -> Self {
        CardScanError::Configuration(format!("TOML parse error: {err}"))
    }
}
