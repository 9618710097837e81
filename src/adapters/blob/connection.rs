//! Storage account connection string parsing
//!
//! Supports the account-key form
//! (`DefaultEndpointsProtocol=https;AccountName=..;AccountKey=..;EndpointSuffix=..`),
//! an explicit `BlobEndpoint` (Azurite, private endpoints) and the
//! `UseDevelopmentStorage=true` shortcut.

use super::auth::SharedKeyCredential;
use crate::domain::StorageError;
use url::Url;

const DEV_ACCOUNT_NAME: &str = "devstoreaccount1";
const DEV_ACCOUNT_KEY: &str =
    "Eby8vdM02xNOcqFlqUwJPLlmEtlCDXJ1OUzFT50uSRZ6IFsuFq2UVErCz4I6tq/K1SZFPTOtr/KBHBeksoGMGw==";
const DEV_BLOB_ENDPOINT: &str = "http://127.0.0.1:10000/devstoreaccount1";

/// Parsed storage connection: account credential plus blob service endpoint
pub struct StorageConnection {
    credential: SharedKeyCredential,
    blob_endpoint: Url,
}

impl StorageConnection {
    /// Parses a connection string
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidConnectionString`] if the account name or
    /// key is missing, the key is not base64, or the endpoint is not a URL.
    pub fn parse(connection_string: &str) -> Result<Self, StorageError> {
        let mut account_name = None;
        let mut account_key = None;
        let mut protocol = "https".to_string();
        let mut suffix = "core.windows.net".to_string();
        let mut blob_endpoint = None;
        let mut development = false;

        for part in connection_string.split(';') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            let (key, value) = part.split_once('=').ok_or_else(|| {
                StorageError::InvalidConnectionString(format!(
                    "segment without '=': {}",
                    key_only(part)
                ))
            })?;

            match key.trim().to_ascii_lowercase().as_str() {
                "accountname" => account_name = Some(value.trim().to_string()),
                "accountkey" => account_key = Some(value.trim().to_string()),
                "defaultendpointsprotocol" => protocol = value.trim().to_ascii_lowercase(),
                "endpointsuffix" => suffix = value.trim().to_string(),
                "blobendpoint" => blob_endpoint = Some(value.trim().to_string()),
                "usedevelopmentstorage" => development = value.trim().eq_ignore_ascii_case("true"),
                _ => {}
            }
        }

        if development {
            account_name.get_or_insert_with(|| DEV_ACCOUNT_NAME.to_string());
            account_key.get_or_insert_with(|| DEV_ACCOUNT_KEY.to_string());
            blob_endpoint.get_or_insert_with(|| DEV_BLOB_ENDPOINT.to_string());
        }

        let account_name = account_name.filter(|n| !n.is_empty()).ok_or_else(|| {
            StorageError::InvalidConnectionString("AccountName is missing".to_string())
        })?;
        let account_key = account_key.filter(|k| !k.is_empty()).ok_or_else(|| {
            StorageError::InvalidConnectionString("AccountKey is missing".to_string())
        })?;

        let endpoint = blob_endpoint
            .unwrap_or_else(|| format!("{protocol}://{account_name}.blob.{suffix}"));
        let blob_endpoint = Url::parse(endpoint.trim_end_matches('/')).map_err(|e| {
            StorageError::InvalidConnectionString(format!("invalid blob endpoint: {e}"))
        })?;

        let credential = SharedKeyCredential::new(account_name, &account_key).map_err(|e| {
            StorageError::InvalidConnectionString(format!("AccountKey is not valid: {e}"))
        })?;

        Ok(Self {
            credential,
            blob_endpoint,
        })
    }

    pub fn account_name(&self) -> &str {
        self.credential.account_name()
    }

    pub fn credential(&self) -> &SharedKeyCredential {
        &self.credential
    }

    /// Blob service endpoint without a trailing slash
    pub fn blob_endpoint(&self) -> &Url {
        &self.blob_endpoint
    }

    /// URL of a container or blob under the blob endpoint
    pub fn resource_url(&self, container: &str, blob: Option<&str>) -> Result<Url, StorageError> {
        let mut url = self.blob_endpoint.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                StorageError::InvalidRequest(format!(
                    "blob endpoint cannot be a base: {}",
                    self.blob_endpoint
                ))
            })?;
            segments.pop_if_empty().push(container);
            if let Some(blob) = blob {
                segments.extend(blob.split('/'));
            }
        }
        Ok(url)
    }
}

// Keeps secrets out of error messages when a segment is malformed
fn key_only(segment: &str) -> &str {
    segment.split('=').next().unwrap_or("")
}
