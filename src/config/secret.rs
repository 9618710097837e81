//! Secure credential handling using the secrecy crate
//!
//! API keys and the storage connection string are wrapped in [`SecretString`]
//! so they are zeroed on drop and redacted from `Debug` output. Call
//! `expose_secret()` only at the point where the value goes on the wire.
//!
//! # Example
//!
//! ```rust
//! use cardscan::config::secret_string;
//! use secrecy::ExposeSecret;
//!
//! let key = secret_string("doc-intelligence-key".to_string());
//! assert_eq!(key.expose_secret().as_ref(), "doc-intelligence-key");
//! assert!(!format!("{key:?}").contains("doc-intelligence-key"));
//! ```

use secrecy::{CloneableSecret, DebugSecret, Secret, SerializableSecret};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zeroize::Zeroize;

/// String newtype that satisfies the bounds `Secret<T>` needs
#[derive(Clone, Debug, Zeroize)]
#[zeroize(drop)]
pub struct SecretValue(String);

impl CloneableSecret for SecretValue {}
impl DebugSecret for SecretValue {}
impl SerializableSecret for SecretValue {}

impl From<String> for SecretValue {
    fn from(s: String) -> Self {
        SecretValue(s)
    }
}

impl PartialEq<str> for SecretValue {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl AsRef<str> for SecretValue {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl SecretValue {
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl Serialize for SecretValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SecretValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(SecretValue)
    }
}

/// Secret string: zeroed on drop, redacted in Debug, explicit access only
pub type SecretString = Secret<SecretValue>;

/// Wraps a String in a [`SecretString`]
#[inline]
pub fn secret_string(value: String) -> SecretString {
    Secret::new(SecretValue::from(value))
}

/// Wraps an optional String in an optional [`SecretString`]
#[inline]
pub fn secret_string_opt(value: Option<String>) -> Option<SecretString> {
    value.map(secret_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_secret_string_creation() {
        let secret = secret_string("api-key".to_string());
        assert_eq!(secret.expose_secret(), "api-key");
    }

    #[test]
    fn test_secret_string_opt() {
        assert!(secret_string_opt(Some("key".to_string())).is_some());
        assert!(secret_string_opt(None).is_none());
    }

    #[test]
    fn test_whitespace_secret_is_empty() {
        let secret = secret_string("   ".to_string());
        assert!(secret.expose_secret().is_empty());
    }

    #[test]
    fn test_secret_debug_redacted() {
        let secret = secret_string("AccountKey=c2VjcmV0".to_string());
        let debug_output = format!("{secret:?}");
        assert!(!debug_output.contains("c2VjcmV0"));
    }

    #[test]
    fn test_secret_serde() {
        #[derive(Serialize, Deserialize)]
        struct Section {
            api_key: SecretString,
        }

        let section: Section = toml::from_str("api_key = \"abc123\"").unwrap();
        assert_eq!(section.api_key.expose_secret(), "abc123");

        let json = serde_json::to_string(&section).unwrap();
        assert!(json.contains("abc123"));
    }
}
