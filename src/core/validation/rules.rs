//! Field presence rules

use super::report::{FieldCheck, ValidationReport};
use crate::domain::{CardField, ExtractedCardFields};

/// A field value counts when it is present and not blank
pub fn is_field_valid(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.trim().is_empty())
}

/// Validate an extracted field map
///
/// Pure: the same map always yields the same checks and status. Only the
/// required fields decide the status; advisory fields are reported but never
/// make a card invalid.
///
/// # Example
///
/// ```
/// use cardscan::core::validation::{validate, ValidationStatus};
/// use cardscan::domain::ExtractedCardFields;
///
/// let fields: ExtractedCardFields = [
///     ("CardHolderName", "JOHN DOE"),
///     ("CardNumber", "4532 0000 0000 1234"),
///     ("ExpirationDate", "12/25"),
/// ]
/// .into_iter()
/// .collect();
///
/// let report = validate(&fields);
/// assert_eq!(report.status, ValidationStatus::Valid);
/// ```
pub fn validate(fields: &ExtractedCardFields) -> ValidationReport {
    let checks: Vec<FieldCheck> = CardField::ALL
        .iter()
        .map(|&field| {
            let value = fields.get(field);
            let is_valid = is_field_valid(value);
            if !is_valid {
                tracing::debug!(field = %field, "Field validation failed");
            }
            FieldCheck {
                field,
                value: value.map(str::to_string),
                is_valid,
                required: field.is_required(),
            }
        })
        .collect();

    let detected = fields
        .iter()
        .filter(|(_, value)| is_field_valid(Some(*value)))
        .count();

    ValidationReport::new(checks, detected, fields.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::validation::ValidationStatus;

    #[test]
    fn test_is_field_valid() {
        assert!(is_field_valid(Some("JOHN")));
        assert!(!is_field_valid(Some("   ")));
        assert!(!is_field_valid(Some("")));
        assert!(!is_field_valid(None));
    }

    #[test]
    fn test_blank_required_field_is_invalid() {
        let fields: ExtractedCardFields = [
            ("CardHolderName", " "),
            ("CardNumber", "4532"),
            ("ExpirationDate", "12/25"),
        ]
        .into_iter()
        .collect();

        let report = validate(&fields);
        assert_eq!(report.status, ValidationStatus::Invalid);
        assert_eq!(report.missing_required(), vec![CardField::CardHolderName]);
        assert_eq!(report.detected_count(), 2);
        assert_eq!(report.total_count(), 3);
        assert!(!report.is_fully_detected());
    }

    #[test]
    fn test_unknown_fields_count_toward_total() {
        let fields: ExtractedCardFields = [
            ("CardHolderName", "JOHN DOE"),
            ("CardNumber", "4532"),
            ("ExpirationDate", "12/25"),
            ("CustomerServicePhoneNumbers", "0800"),
        ]
        .into_iter()
        .collect();

        let report = validate(&fields);
        assert!(report.is_valid());
        assert_eq!(report.total_count(), 4);
        assert_eq!(report.checks.len(), CardField::ALL.len());
    }
}
