//! Validation report structures
//!
//! A report is a read-only view over one field map. It is built by
//! [`validate`](super::validate) and consumed by the web layer and the logs.

use crate::domain::CardField;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Overall outcome of a validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationStatus {
    /// All required fields are present
    Valid,
    /// At least one required field is missing or blank
    Invalid,
}

impl fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationStatus::Valid => write!(f, "valid"),
            ValidationStatus::Invalid => write!(f, "invalid"),
        }
    }
}

/// Result of checking a single known field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldCheck {
    pub field: CardField,

    /// Extracted text, if any
    pub value: Option<String>,

    /// Present and non-blank
    pub is_valid: bool,

    pub required: bool,
}

/// Per-field and aggregate validation results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    /// When the validation was performed
    pub validated_at: DateTime<Utc>,

    /// One entry per known field, in display order
    pub checks: Vec<FieldCheck>,

    /// Extracted fields (known or not) with non-blank content
    pub detected: usize,

    /// All fields returned by the analysis
    pub total: usize,

    pub status: ValidationStatus,
}

impl ValidationReport {
    pub(crate) fn new(checks: Vec<FieldCheck>, detected: usize, total: usize) -> Self {
        let status = if checks.iter().all(|c| !c.required || c.is_valid) {
            ValidationStatus::Valid
        } else {
            ValidationStatus::Invalid
        };

        Self {
            validated_at: Utc::now(),
            checks,
            detected,
            total,
            status,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.status == ValidationStatus::Valid
    }

    /// Required fields that are missing or blank
    pub fn missing_required(&self) -> Vec<CardField> {
        self.checks
            .iter()
            .filter(|c| c.required && !c.is_valid)
            .map(|c| c.field)
            .collect()
    }

    pub fn detected_count(&self) -> usize {
        self.detected
    }

    pub fn total_count(&self) -> usize {
        self.total
    }

    /// Every extracted field has content
    ///
    /// False for an empty analysis.
    pub fn is_fully_detected(&self) -> bool {
        self.total > 0 && self.detected == self.total
    }

    /// Check for one field
    pub fn check(&self, field: CardField) -> Option<&FieldCheck> {
        self.checks.iter().find(|c| c.field == field)
    }

    /// Format the report as a human-readable string
    pub fn format_summary(&self) -> String {
        let mut summary = String::new();
        summary.push_str("Card Validation Report\n");
        summary.push_str(&format!("  Validated at: {}\n", self.validated_at));
        summary.push_str(&format!(
            "  Fields detected: {}/{}\n",
            self.detected, self.total
        ));
        summary.push_str(&format!("  Status: {}\n", self.status));

        for check in &self.checks {
            let mark = if check.is_valid { "✓" } else { "✗" };
            let kind = if check.required { "required" } else { "advisory" };
            summary.push_str(&format!(
                "  {} {} ({})\n",
                mark,
                check.field.display_name(),
                kind
            ));
        }

        let missing = self.missing_required();
        if !missing.is_empty() {
            let names: Vec<&str> = missing.iter().map(|f| f.key()).collect();
            summary.push_str(&format!("  Missing required: {}\n", names.join(", ")));
        }

        summary
    }
}
