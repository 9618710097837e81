//! Result type alias for cardscan

use super::errors::CardScanError;

/// Result type alias for cardscan operations
///
/// # Examples
///
/// ```
/// use cardscan::domain::result::Result;
/// use cardscan::domain::errors::CardScanError;
///
/// fn failing_function() -> Result<()> {
///     Err(CardScanError::Validation("empty upload".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, CardScanError>;
