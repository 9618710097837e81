//! Domain models and types for cardscan.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Card data** ([`CardField`], [`ExtractedCardFields`])
//! - **Upload types** ([`ImageUpload`], [`UploadedAsset`], [`BlobName`])
//! - **Error types** ([`CardScanError`], [`StorageError`], [`AnalysisError`])
//! - **Result type alias** ([`Result`])
//!
//! # Example
//!
//! ```rust
//! use cardscan::domain::{CardField, ExtractedCardFields};
//!
//! let mut fields = ExtractedCardFields::new();
//! fields.insert("CardHolderName", "JOHN DOE");
//! assert_eq!(fields.get(CardField::CardHolderName), Some("JOHN DOE"));
//! assert!(fields.get(CardField::IssuingBank).is_none());
//! ```

pub mod asset;
pub mod card;
pub mod errors;
pub mod result;

// Re-export commonly used types for convenience
pub use asset::{AccessUrlKind, BlobName, ImageFormat, ImageUpload, UploadedAsset};
pub use card::{CardField, ExtractedCardFields};
pub use errors::{AnalysisError, CardScanError, StorageError};
pub use result::Result;
