//! Core logic for cardscan.
//!
//! # Modules
//!
//! - [`validation`] - Field presence checks and the validation report
//! - [`pipeline`] - Upload, analysis and validation of one image
//!
//! # Workflow
//!
//! 1. **Name**: Generate a unique blob name from the uploaded file name
//! 2. **Upload**: Store the image and obtain a readable URL (SAS or direct)
//! 3. **Analyze**: Run the prebuilt credit card model against that URL
//! 4. **Validate**: Check the required fields and build the report
//!
//! # Example
//!
//! ```rust
//! use cardscan::core::validation::validate;
//! use cardscan::domain::{CardField, ExtractedCardFields};
//!
//! let mut fields = ExtractedCardFields::new();
//! fields.insert("CardHolderName", "JOHN DOE");
//!
//! let report = validate(&fields);
//! assert!(!report.is_valid());
//! assert_eq!(
//!     report.missing_required(),
//!     vec![CardField::CardNumber, CardField::ExpirationDate]
//! );
//! ```

pub mod pipeline;
pub mod validation;

pub use pipeline::{AnalysisOutcome, CardAnalysisPipeline};
pub use validation::{validate, ValidationReport, ValidationStatus};
