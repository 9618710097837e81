//! Credit card fields extracted by document analysis
//!
//! The prebuilt credit card model returns a dictionary of named fields. Only
//! fields with content are kept; a field the model did not detect is simply
//! absent from [`ExtractedCardFields`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Known credit card fields, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CardField {
    /// Name printed on the card
    CardHolderName,
    /// Primary account number
    CardNumber,
    /// Expiration date (as printed, e.g. `12/25`)
    ExpirationDate,
    /// CVV/CVC code
    CardVerificationValue,
    /// Card network (Visa, Mastercard, ...)
    PaymentNetwork,
    /// Bank that issued the card
    IssuingBank,
}

impl CardField {
    /// All known fields in display order
    pub const ALL: [CardField; 6] = [
        CardField::CardHolderName,
        CardField::CardNumber,
        CardField::ExpirationDate,
        CardField::CardVerificationValue,
        CardField::PaymentNetwork,
        CardField::IssuingBank,
    ];

    /// Fields that must be present for a card to be considered valid
    pub const REQUIRED: [CardField; 3] = [
        CardField::CardHolderName,
        CardField::CardNumber,
        CardField::ExpirationDate,
    ];

    /// Field name as returned by the Document Intelligence model
    pub fn key(&self) -> &'static str {
        match self {
            CardField::CardHolderName => "CardHolderName",
            CardField::CardNumber => "CardNumber",
            CardField::ExpirationDate => "ExpirationDate",
            CardField::CardVerificationValue => "CardVerificationValue",
            CardField::PaymentNetwork => "PaymentNetwork",
            CardField::IssuingBank => "IssuingBank",
        }
    }

    /// Human readable label
    pub fn display_name(&self) -> &'static str {
        match self {
            CardField::CardHolderName => "Cardholder Name",
            CardField::CardNumber => "Card Number",
            CardField::ExpirationDate => "Expiration Date",
            CardField::CardVerificationValue => "CVV/CVC",
            CardField::PaymentNetwork => "Payment Network",
            CardField::IssuingBank => "Issuing Bank",
        }
    }

    pub fn is_required(&self) -> bool {
        Self::REQUIRED.contains(self)
    }
}

impl fmt::Display for CardField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl FromStr for CardField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CardField::ALL
            .iter()
            .copied()
            .find(|field| field.key() == s)
            .ok_or_else(|| format!("Unknown card field: {s}"))
    }
}

/// Field map produced by one analysis call
///
/// Keys are the model's field names. Unknown fields are kept as-is so they
/// count toward the detected total.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedCardFields {
    fields: BTreeMap<String, String>,
}

impl ExtractedCardFields {
    /// Creates an empty field map
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a field by its model name
    pub fn insert(&mut self, name: impl Into<String>, content: impl Into<String>) {
        self.fields.insert(name.into(), content.into());
    }

    /// Returns the content of a known field, if detected
    pub fn get(&self, field: CardField) -> Option<&str> {
        self.fields.get(field.key()).map(String::as_str)
    }

    /// Returns the content of any field by its model name
    pub fn get_raw(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn contains(&self, field: CardField) -> bool {
        self.fields.contains_key(field.key())
    }

    /// Number of extracted fields, known or not
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates over `(name, content)` pairs in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K, V> FromIterator<(K, V)> for ExtractedCardFields
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut fields = Self::new();
        for (name, content) in iter {
            fields.insert(name, content);
        }
        fields
    }
}
