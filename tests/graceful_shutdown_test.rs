//! Integration tests for graceful shutdown of the web server

use async_trait::async_trait;
use cardscan::adapters::{BlobStore, DocumentAnalyzer};
use cardscan::config::{
    secret_string, AppConfig, ApplicationConfig, DocumentIntelligenceConfig, LoggingConfig,
    ServerConfig, StorageConfig,
};
use cardscan::core::CardAnalysisPipeline;
use cardscan::domain::{
    AnalysisError, BlobName, ExtractedCardFields, ImageUpload, Result, StorageError,
    UploadedAsset,
};
use cardscan::web::serve;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

struct UnusedStore;

#[async_trait]
impl BlobStore for UnusedStore {
    async fn upload(&self, _: &ImageUpload, blob: &BlobName, _: bool) -> Result<UploadedAsset> {
        Err(StorageError::PropertiesUnavailable(blob.to_string()).into())
    }
}

struct UnusedAnalyzer;

#[async_trait]
impl DocumentAnalyzer for UnusedAnalyzer {
    async fn analyze_url(&self, _: &str) -> Result<ExtractedCardFields> {
        Err(AnalysisError::Timeout { attempts: 0 }.into())
    }

    async fn analyze_bytes(&self, _: &[u8]) -> Result<ExtractedCardFields> {
        Err(AnalysisError::Timeout { attempts: 0 }.into())
    }
}

fn pipeline() -> CardAnalysisPipeline {
    CardAnalysisPipeline::new(Arc::new(UnusedStore), Arc::new(UnusedAnalyzer), false)
}

fn config(bind_addr: String) -> AppConfig {
    AppConfig {
        application: ApplicationConfig::default(),
        server: ServerConfig {
            bind_addr,
            max_upload_mb: 1,
        },
        document: DocumentIntelligenceConfig {
            endpoint: "https://cards.cognitiveservices.azure.com/".to_string(),
            api_key: secret_string("docs-key".to_string()),
            region: "eastus".to_string(),
            model_id: "prebuilt-creditCard".to_string(),
            api_version: "2024-11-30".to_string(),
            poll_interval_ms: 10,
            max_poll_attempts: 1,
            timeout_seconds: 1,
        },
        storage: StorageConfig {
            connection_string: secret_string("AccountName=acct;AccountKey=a2V5".to_string()),
            container_name: "cards".to_string(),
            account_name: None,
            account_key: None,
            use_sas: false,
            sas_expiration_hours: 1,
            timeout_seconds: 1,
        },
        logging: LoggingConfig::default(),
    }
}

async fn free_addr() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap().to_string()
}

#[tokio::test]
async fn test_shutdown_signal_propagation() {
    let (shutdown_tx, shutdown_rx1) = watch::channel(false);
    let shutdown_rx2 = shutdown_rx1.clone();

    assert!(!*shutdown_rx1.borrow());
    assert!(!*shutdown_rx2.borrow());

    shutdown_tx.send(true).unwrap();

    assert!(*shutdown_rx1.borrow());
    assert!(*shutdown_rx2.borrow());
}

#[tokio::test]
async fn test_server_stops_on_signal() {
    let addr = free_addr().await;
    let config = config(addr.clone());
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let server = tokio::spawn(async move { serve(&config, pipeline(), shutdown_rx).await });

    // Wait for the listener to come up
    let client = reqwest::Client::new();
    let mut healthy = false;
    for _ in 0..50 {
        if let Ok(response) = client.get(format!("http://{addr}/health")).send().await {
            healthy = response.status().is_success();
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(healthy, "server did not become healthy");

    shutdown_tx.send(true).unwrap();

    let result = tokio::time::timeout(Duration::from_secs(5), server)
        .await
        .expect("server did not stop in time")
        .unwrap();
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_dropped_sender_stops_server() {
    let addr = free_addr().await;
    let config = config(addr);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    drop(shutdown_tx);

    let result = tokio::time::timeout(
        Duration::from_secs(5),
        serve(&config, pipeline(), shutdown_rx),
    )
    .await
    .expect("server did not stop in time");
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_invalid_bind_address() {
    let (_shutdown_tx, shutdown_rx) = watch::channel(false);
    let result = serve(&config("not-an-address".to_string()), pipeline(), shutdown_rx).await;
    assert!(result.is_err());
}
