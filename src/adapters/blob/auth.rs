//! Shared Key authorization for the Blob service
//!
//! Each request is signed with HMAC-SHA256 over a canonical description of the
//! request, keyed with the base64-decoded account key. The same credential
//! signs SAS tokens.

use base64::{engine::general_purpose, Engine as _};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, Secret};
use sha2::Sha256;
use std::fmt;

type HmacSha256 = Hmac<Sha256>;

/// Storage API version sent in `x-ms-version` and used for SAS tokens
pub const STORAGE_API_VERSION: &str = "2021-08-06";

/// Account name plus decoded account key
pub struct SharedKeyCredential {
    account_name: String,
    key: Secret<Vec<u8>>,
}

impl SharedKeyCredential {
    /// Creates a credential from a base64 account key
    ///
    /// # Errors
    ///
    /// Returns the decode error message if the key is not valid base64.
    pub fn new(account_name: impl Into<String>, base64_key: &str) -> Result<Self, String> {
        let key = general_purpose::STANDARD
            .decode(base64_key.trim())
            .map_err(|e| e.to_string())?;
        if key.is_empty() {
            return Err("key is empty".to_string());
        }
        Ok(Self {
            account_name: account_name.into(),
            key: Secret::new(key),
        })
    }

    pub fn account_name(&self) -> &str {
        &self.account_name
    }

    /// Base64 HMAC-SHA256 signature of `string_to_sign`
    ///
    /// # Errors
    ///
    /// Returns the MAC error message if the key is rejected.
    pub fn sign(&self, string_to_sign: &str) -> Result<String, String> {
        let mut mac = match HmacSha256::new_from_slice(self.key.expose_secret()) {
            Ok(mac) => mac,
            Err(e) => return Err(e.to_string()),
        };
        mac.update(string_to_sign.as_bytes());
        Ok(general_purpose::STANDARD.encode(mac.finalize().into_bytes()))
    }

    /// Value for the `Authorization` header
    ///
    /// # Errors
    ///
    /// Fails when [`sign`](Self::sign) does.
    pub fn authorization(&self, request: &SignableRequest<'_>) -> Result<String, String> {
        let signature = self.sign(&request.string_to_sign(&self.account_name))?;
        Ok(format!("SharedKey {}:{}", self.account_name, signature))
    }
}

impl fmt::Debug for SharedKeyCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedKeyCredential")
            .field("account_name", &self.account_name)
            .field("key", &"[REDACTED]")
            .finish()
    }
}

/// The parts of an outgoing request that take part in the signature
#[derive(Debug, Clone)]
pub struct SignableRequest<'a> {
    /// HTTP verb in upper case
    pub method: &'a str,
    /// Body length; zero is signed as an empty string
    pub content_length: usize,
    pub content_type: Option<&'a str>,
    /// `x-ms-*` headers sent with the request
    pub ms_headers: Vec<(&'a str, String)>,
    /// Percent-encoded URL path
    pub path: &'a str,
    /// Query parameters
    pub query: Vec<(&'a str, &'a str)>,
}

impl SignableRequest<'_> {
    /// Canonical string-to-sign for the Blob service
    pub fn string_to_sign(&self, account_name: &str) -> String {
        let content_length = if self.content_length == 0 {
            String::new()
        } else {
            self.content_length.to_string()
        };

        let mut headers: Vec<(String, &str)> = self
            .ms_headers
            .iter()
            .map(|(name, value)| (name.to_ascii_lowercase(), value.trim()))
            .collect();
        headers.sort_by(|a, b| a.0.cmp(&b.0));

        let mut query: Vec<(String, &str)> = self
            .query
            .iter()
            .map(|(name, value)| (name.to_ascii_lowercase(), *value))
            .collect();
        query.sort_by(|a, b| a.0.cmp(&b.0));

        let mut out = String::new();
        out.push_str(self.method);
        out.push('\n');
        // Content-Encoding, Content-Language
        out.push_str("\n\n");
        out.push_str(&content_length);
        out.push('\n');
        // Content-MD5
        out.push('\n');
        out.push_str(self.content_type.unwrap_or(""));
        out.push('\n');
        // Date, If-Modified-Since, If-Match, If-None-Match, If-Unmodified-Since, Range
        out.push_str("\n\n\n\n\n\n");

        for (name, value) in headers {
            out.push_str(&name);
            out.push(':');
            out.push_str(value);
            out.push('\n');
        }

        out.push('/');
        out.push_str(account_name);
        out.push_str(self.path);
        for (name, value) in query {
            out.push('\n');
            out.push_str(&name);
            out.push(':');
            out.push_str(value);
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credential() -> SharedKeyCredential {
        SharedKeyCredential::new("acct", "a2V5LWJ5dGVz").unwrap()
    }

    #[test]
    fn test_string_to_sign_for_put_blob() {
        let request = SignableRequest {
            method: "PUT",
            content_length: 42,
            content_type: Some("image/png"),
            ms_headers: vec![
                ("x-ms-version", STORAGE_API_VERSION.to_string()),
                ("x-ms-blob-type", "BlockBlob".to_string()),
                ("x-ms-date", "Mon, 01 Jan 2024 00:00:00 GMT".to_string()),
            ],
            path: "/cards/card.png",
            query: vec![],
        };

        let expected = "PUT\n\n\n42\n\nimage/png\n\n\n\n\n\n\n\
                        x-ms-blob-type:BlockBlob\n\
                        x-ms-date:Mon, 01 Jan 2024 00:00:00 GMT\n\
                        x-ms-version:2021-08-06\n\
                        /acct/cards/card.png";
        assert_eq!(request.string_to_sign("acct"), expected);
    }

    #[test]
    fn test_string_to_sign_with_query_and_empty_body() {
        let request = SignableRequest {
            method: "PUT",
            content_length: 0,
            content_type: None,
            ms_headers: vec![],
            path: "/cards",
            query: vec![("restype", "container")],
        };

        assert_eq!(
            request.string_to_sign("acct"),
            "PUT\n\n\n\n\n\n\n\n\n\n\n\n/acct/cards\nrestype:container"
        );
    }

    #[test]
    fn test_sign_is_deterministic_base64() {
        let cred = credential();
        let first = cred.sign("hello").unwrap();
        assert_eq!(first, cred.sign("hello").unwrap());
        assert_ne!(first, cred.sign("hello!").unwrap());
        // 32-byte digest encodes to 44 base64 characters
        assert_eq!(first.len(), 44);
        assert!(general_purpose::STANDARD.decode(&first).is_ok());
    }

    #[test]
    fn test_authorization_header_format() {
        let request = SignableRequest {
            method: "HEAD",
            content_length: 0,
            content_type: None,
            ms_headers: vec![],
            path: "/cards/x.png",
            query: vec![],
        };
        let header = credential().authorization(&request).unwrap();
        assert!(header.starts_with("SharedKey acct:"));
    }

    #[test]
    fn test_invalid_key() {
        assert!(SharedKeyCredential::new("acct", "%%%").is_err());
        assert!(SharedKeyCredential::new("acct", "").is_err());
    }

    #[test]
    fn test_debug_redacts_key() {
        let debug = format!("{:?}", credential());
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains("a2V5"));
    }
}
