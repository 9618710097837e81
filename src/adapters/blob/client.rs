//! Azure Blob Storage client
//!
//! Talks to the Blob service REST API directly with Shared Key authorization.
//! A single instance is built at startup and shared between requests.

use super::auth::{SharedKeyCredential, SignableRequest, STORAGE_API_VERSION};
use super::connection::StorageConnection;
use super::sas::{expiry_after, generate_blob_sas, BlobSasParams, SasError};
use super::traits::BlobStore;
use crate::config::StorageConfig;
use crate::domain::{
    AccessUrlKind, BlobName, CardScanError, ImageUpload, Result, StorageError, UploadedAsset,
};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, ClientBuilder, Method, Response, StatusCode};
use secrecy::ExposeSecret;
use std::time::Duration;
use tokio::sync::OnceCell;
use url::Url;

/// Blob store backed by an Azure Storage account
///
/// # Example
///
/// ```no_run
/// use cardscan::adapters::blob::{AzureBlobStore, BlobStore};
/// use cardscan::config::load_from_env;
/// use cardscan::domain::{BlobName, ImageUpload};
///
/// # async fn example() -> cardscan::domain::Result<()> {
/// let config = load_from_env()?;
/// let store = AzureBlobStore::new(&config.storage)?;
///
/// let image = ImageUpload::new("card.png", std::fs::read("card.png")?)?;
/// let asset = store.upload(&image, &BlobName::generate("card.png"), true).await?;
/// println!("{}", asset.url);
/// # Ok(())
/// # }
/// ```
pub struct AzureBlobStore {
    client: Client,
    connection: StorageConnection,
    container_name: String,
    sas_credential: std::result::Result<SharedKeyCredential, SasError>,
    sas_expiration_hours: u32,
    container_ready: OnceCell<()>,
}

impl AzureBlobStore {
    /// Create a store from configuration
    ///
    /// No request is made here. The container is created lazily before the
    /// first upload.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection string is invalid or the HTTP client
    /// cannot be built.
    pub fn new(config: &StorageConfig) -> Result<Self> {
        let connection =
            StorageConnection::parse(config.connection_string.expose_secret().as_ref())?;

        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                CardScanError::Configuration(format!("Failed to create HTTP client: {e}"))
            })?;

        let sas_credential = sas_credential_from_config(config);
        if config.use_sas {
            if let Err(e) = &sas_credential {
                tracing::warn!(
                    error = %e,
                    "SAS signing unavailable, uploads will return direct blob URLs"
                );
            }
        }

        tracing::info!(
            account = %connection.account_name(),
            endpoint = %connection.blob_endpoint(),
            container = %config.container_name,
            "Blob storage client initialized"
        );

        Ok(Self {
            client,
            connection,
            container_name: config.container_name.clone(),
            sas_credential,
            sas_expiration_hours: config.sas_expiration_hours,
            container_ready: OnceCell::new(),
        })
    }

    pub fn container_name(&self) -> &str {
        &self.container_name
    }

    /// Create the container once per process
    ///
    /// An existing container counts as success. A failed attempt is retried on
    /// the next upload.
    pub async fn ensure_container_exists(&self) -> Result<()> {
        self.container_ready
            .get_or_try_init(|| self.create_container())
            .await?;
        Ok(())
    }

    async fn create_container(&self) -> std::result::Result<(), StorageError> {
        let url = self.connection.resource_url(&self.container_name, None)?;
        let url = with_query(url, &[("restype", "container")]);

        let response = self.send_signed(Method::PUT, url, &[], None, Vec::new()).await?;

        match response.status() {
            StatusCode::CREATED => {
                tracing::info!(container = %self.container_name, "Created blob container");
                Ok(())
            }
            StatusCode::CONFLICT => {
                tracing::debug!(container = %self.container_name, "Blob container already exists");
                Ok(())
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                let message = error_message(response).await;
                Err(StorageError::AuthenticationFailed(message))
            }
            _ => {
                let message = error_message(response).await;
                Err(StorageError::ContainerCreationFailed {
                    container: self.container_name.clone(),
                    message,
                })
            }
        }
    }

    /// Size of a stored blob, read from its properties
    ///
    /// `None` when the service omits the content length.
    async fn blob_size(
        &self,
        blob_url: &Url,
        blob_name: &BlobName,
    ) -> std::result::Result<Option<u64>, StorageError> {
        let response = self
            .send_signed(Method::HEAD, blob_url.clone(), &[], None, Vec::new())
            .await?;

        if !response.status().is_success() {
            tracing::warn!(
                blob = %blob_name,
                status = response.status().as_u16(),
                "Blob properties request failed"
            );
            return Err(StorageError::PropertiesUnavailable(blob_name.to_string()));
        }

        // HEAD responses have no body, so the header is the only source
        Ok(response
            .headers()
            .get(reqwest::header::CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok()))
    }

    /// Blob URL with a read-only SAS token appended
    fn signed_url(
        &self,
        blob_url: &Url,
        blob_name: &BlobName,
    ) -> std::result::Result<Url, SasError> {
        let credential = self.sas_credential.as_ref().map_err(SasError::clone)?;
        let params = BlobSasParams {
            container: &self.container_name,
            blob: blob_name.as_str(),
            permissions: "r",
            expiry: expiry_after(Utc::now(), self.sas_expiration_hours)?,
            https_only: blob_url.scheme() == "https",
        };

        let mut url = blob_url.clone();
        url.set_query(Some(&generate_blob_sas(credential, &params)?));
        Ok(url)
    }

    async fn send_signed(
        &self,
        method: Method,
        url: Url,
        headers: &[(&str, &str)],
        content_type: Option<&str>,
        body: Vec<u8>,
    ) -> std::result::Result<Response, StorageError> {
        let date = Utc::now().format("%a, %d %b %Y %H:%M:%S GMT").to_string();

        let mut ms_headers = vec![
            ("x-ms-date", date),
            ("x-ms-version", STORAGE_API_VERSION.to_string()),
        ];
        ms_headers.extend(headers.iter().map(|(name, value)| (*name, value.to_string())));

        let query: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        let signable = SignableRequest {
            method: method.as_str(),
            content_length: body.len(),
            content_type,
            ms_headers: ms_headers.clone(),
            path: url.path(),
            query: query.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect(),
        };
        let authorization = self
            .connection
            .credential()
            .authorization(&signable)
            .map_err(StorageError::InvalidRequest)?;

        let mut request = self
            .client
            .request(method.clone(), url.clone())
            .header(reqwest::header::AUTHORIZATION, authorization);
        for (name, value) in &ms_headers {
            request = request.header(*name, value.as_str());
        }
        if let Some(content_type) = content_type {
            request = request.header(reqwest::header::CONTENT_TYPE, content_type);
        }
        if method == Method::PUT {
            request = request.body(body);
        }

        tracing::debug!(method = %method, path = %url.path(), "Sending blob storage request");

        request
            .send()
            .await
            .map_err(|e| StorageError::ConnectionFailed(e.to_string()))
    }
}

#[async_trait]
impl BlobStore for AzureBlobStore {
    async fn upload(
        &self,
        image: &ImageUpload,
        blob_name: &BlobName,
        use_signed_url: bool,
    ) -> Result<UploadedAsset> {
        self.ensure_container_exists().await?;

        let blob_url = self
            .connection
            .resource_url(&self.container_name, Some(blob_name.as_str()))?;
        let content_type = image.format().content_type();

        tracing::info!(
            blob = %blob_name,
            container = %self.container_name,
            bytes = image.size(),
            "Uploading image"
        );

        let response = self
            .send_signed(
                Method::PUT,
                blob_url.clone(),
                &[("x-ms-blob-type", "BlockBlob")],
                Some(content_type),
                image.bytes().to_vec(),
            )
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(StorageError::AuthenticationFailed(error_message(response).await).into());
        }
        if !status.is_success() {
            return Err(StorageError::UploadFailed {
                blob: blob_name.to_string(),
                status: status.as_u16(),
                message: error_message(response).await,
            }
            .into());
        }

        let size_bytes = self
            .blob_size(&blob_url, blob_name)
            .await?
            .unwrap_or(image.size() as u64);
        tracing::info!(blob = %blob_name, size_bytes, "Upload complete");

        let (url, url_kind) = if use_signed_url {
            match self.signed_url(&blob_url, blob_name) {
                Ok(url) => (url, AccessUrlKind::Signed),
                Err(e) => {
                    tracing::warn!(
                        blob = %blob_name,
                        error = %e,
                        "Could not generate SAS URL, falling back to direct URL"
                    );
                    (blob_url, AccessUrlKind::Direct)
                }
            }
        } else {
            (blob_url, AccessUrlKind::Direct)
        };

        Ok(UploadedAsset {
            blob_name: blob_name.clone(),
            url: url.to_string(),
            url_kind,
            size_bytes,
            content_type: content_type.to_string(),
        })
    }
}

fn sas_credential_from_config(
    config: &StorageConfig,
) -> std::result::Result<SharedKeyCredential, SasError> {
    match (&config.account_name, &config.account_key) {
        (Some(name), Some(key)) => {
            SharedKeyCredential::new(name.as_str(), key.expose_secret().as_ref())
                .map_err(SasError::InvalidKey)
        }
        _ => Err(SasError::MissingCredentials),
    }
}

fn with_query(mut url: Url, pairs: &[(&str, &str)]) -> Url {
    url.query_pairs_mut().extend_pairs(pairs);
    url
}

// Prefers the service error code header over the XML body
async fn error_message(response: Response) -> String {
    let status = response.status();
    let code = response
        .headers()
        .get("x-ms-error-code")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    match code {
        Some(code) => code,
        None => {
            let body = response.text().await.unwrap_or_default();
            if body.trim().is_empty() {
                status.to_string()
            } else {
                body
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::secret_string;

    fn config(account_name: Option<&str>, account_key: Option<&str>) -> StorageConfig {
        StorageConfig {
            connection_string: secret_string(
                "AccountName=acct;AccountKey=a2V5LWJ5dGVz;BlobEndpoint=https://acct.blob.core.windows.net"
                    .to_string(),
            ),
            container_name: "cards".to_string(),
            account_name: account_name.map(str::to_string),
            account_key: account_key.map(|k| secret_string(k.to_string())),
            use_sas: true,
            sas_expiration_hours: 24,
            timeout_seconds: 10,
        }
    }

    #[test]
    fn test_signed_url_has_token() {
        let store = AzureBlobStore::new(&config(Some("acct"), Some("a2V5LWJ5dGVz"))).unwrap();
        let name = BlobName::new("abc-card.png").unwrap();
        let blob_url = store
            .connection
            .resource_url("cards", Some(name.as_str()))
            .unwrap();

        let url = store.signed_url(&blob_url, &name).unwrap();
        let query = url.query().unwrap();
        assert!(url
            .as_str()
            .starts_with("https://acct.blob.core.windows.net/cards/abc-card.png?"));
        assert!(query.contains("sig="));
        assert!(query.contains("sp=r"));
        assert!(query.contains("spr=https"));
    }

    #[test]
    fn test_signed_url_without_credentials() {
        let store = AzureBlobStore::new(&config(None, Some("a2V5LWJ5dGVz"))).unwrap();
        let name = BlobName::new("abc-card.png").unwrap();
        let blob_url = store
            .connection
            .resource_url("cards", Some(name.as_str()))
            .unwrap();
        assert!(matches!(
            store.signed_url(&blob_url, &name),
            Err(SasError::MissingCredentials)
        ));
    }

    #[test]
    fn test_invalid_sas_key() {
        let result = sas_credential_from_config(&config(Some("acct"), Some("not base64!")));
        assert!(matches!(result, Err(SasError::InvalidKey(_))));
    }

    #[test]
    fn test_with_query() {
        let url = Url::parse("https://acct.blob.core.windows.net/cards").unwrap();
        assert_eq!(
            with_query(url, &[("restype", "container")]).as_str(),
            "https://acct.blob.core.windows.net/cards?restype=container"
        );
    }

    #[test]
    fn test_new_rejects_bad_connection_string() {
        let mut cfg = config(None, None);
        cfg.connection_string = secret_string("AccountName=acct".to_string());
        assert!(matches!(
            AzureBlobStore::new(&cfg),
            Err(CardScanError::Storage(StorageError::InvalidConnectionString(_)))
        ));
    }

    #[test]
    fn test_out_of_range_expiry_is_sas_error() {
        let mut oversized = config(Some("acct"), Some("a2V5LWJ5dGVz"));
        oversized.sas_expiration_hours = u32::MAX;
        let store = AzureBlobStore::new(&oversized).unwrap();
        let name = BlobName::new("abc-card.png").unwrap();
        let blob_url = store
            .connection
            .resource_url("cards", Some(name.as_str()))
            .unwrap();

        assert!(matches!(
            store.signed_url(&blob_url, &name),
            Err(SasError::ExpiryOutOfRange(_))
        ));
    }
}
