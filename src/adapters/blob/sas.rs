//! Service SAS generation for single blobs
//!
//! A read-only SAS lets Document Intelligence fetch the uploaded image without
//! the container being public.

use super::auth::{SharedKeyCredential, STORAGE_API_VERSION};
use chrono::{DateTime, Utc};
use thiserror::Error;
use url::form_urlencoded;

/// Reasons a SAS URL could not be produced
///
/// These never fail an upload: the client falls back to the direct URL.
#[derive(Debug, Clone, Error)]
pub enum SasError {
    /// Signing account name or key is not configured
    #[error("SAS generation requires AZURE_STORAGE_STORAGE_NAME and AZURE_STORAGE_API_KEY")]
    MissingCredentials,

    /// The signing key is not valid base64
    #[error("SAS signing key is invalid: {0}")]
    InvalidKey(String),

    /// The configured lifetime does not fit a timestamp
    #[error("SAS expiration of {0} hours is out of range")]
    ExpiryOutOfRange(u32),
}

/// Expiry instant `hours` from `now`
///
/// # Errors
///
/// Returns [`SasError::ExpiryOutOfRange`] when the result overflows.
pub fn expiry_after(now: DateTime<Utc>, hours: u32) -> Result<DateTime<Utc>, SasError> {
    chrono::Duration::try_hours(i64::from(hours))
        .and_then(|lifetime| now.checked_add_signed(lifetime))
        .ok_or(SasError::ExpiryOutOfRange(hours))
}

/// Parameters of a blob-scoped service SAS
#[derive(Debug, Clone)]
pub struct BlobSasParams<'a> {
    pub container: &'a str,
    pub blob: &'a str,
    /// Permission letters, `r` for read
    pub permissions: &'a str,
    pub expiry: DateTime<Utc>,
    /// Restrict to HTTPS
    pub https_only: bool,
}

impl BlobSasParams<'_> {
    fn canonical_resource(&self, account_name: &str) -> String {
        format!("/blob/{}/{}/{}", account_name, self.container, self.blob)
    }

    fn string_to_sign(&self, account_name: &str, expiry: &str) -> String {
        let protocol = if self.https_only { "https" } else { "" };
        [
            self.permissions,
            "", // signedStart
            expiry,
            &self.canonical_resource(account_name),
            "", // signedIdentifier
            "", // signedIP
            protocol,
            STORAGE_API_VERSION,
            "b", // signedResource
            "", // signedSnapshotTime
            "", // signedEncryptionScope
            "", // rscc
            "", // rscd
            "", // rsce
            "", // rscl
            "", // rsct
        ]
        .join("\n")
    }
}

/// Builds the SAS query string (without the leading `?`)
///
/// # Errors
///
/// Returns [`SasError::InvalidKey`] if signing fails.
pub fn generate_blob_sas(
    credential: &SharedKeyCredential,
    params: &BlobSasParams<'_>,
) -> Result<String, SasError> {
    let expiry = params.expiry.format("%Y-%m-%dT%H:%M:%SZ").to_string();
    let signature = credential
        .sign(&params.string_to_sign(credential.account_name(), &expiry))
        .map_err(SasError::InvalidKey)?;

    let mut query = form_urlencoded::Serializer::new(String::new());
    query.append_pair("sv", STORAGE_API_VERSION);
    if params.https_only {
        query.append_pair("spr", "https");
    }
    query
        .append_pair("se", &expiry)
        .append_pair("sr", "b")
        .append_pair("sp", params.permissions)
        .append_pair("sig", &signature);
    Ok(query.finish())
}
