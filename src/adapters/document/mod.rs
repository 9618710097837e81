//! Azure Document Intelligence adapter
//!
//! Runs the prebuilt credit card model against an uploaded image and maps the
//! result into [`ExtractedCardFields`](crate::domain::ExtractedCardFields).

pub mod client;
pub mod models;
pub mod traits;

pub use client::DocumentIntelligenceClient;
pub use traits::DocumentAnalyzer;
