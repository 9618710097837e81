//! Credit card field validation
//!
//! Turns an extracted field map into a [`ValidationReport`]. No I/O.

pub mod report;
pub mod rules;

pub use report::{FieldCheck, ValidationReport, ValidationStatus};
pub use rules::{is_field_valid, validate};
