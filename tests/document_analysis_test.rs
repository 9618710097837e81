//! Document Intelligence client against a mock analyze endpoint

use cardscan::adapters::{DocumentAnalyzer, DocumentIntelligenceClient};
use cardscan::config::{secret_string, DocumentIntelligenceConfig};
use cardscan::domain::{AnalysisError, CardField, CardScanError};
use mockito::{Matcher, Mock, Server, ServerGuard};
use serde_json::json;
use std::time::Duration;

const ANALYZE_PATH: &str = "/documentintelligence/documentModels/prebuilt-creditCard:analyze";
const IMAGE_URL: &str = "https://acct.blob.core.windows.net/cards/abc-card.png?sig=secret";

fn docs_config(server: &ServerGuard, max_poll_attempts: u32) -> DocumentIntelligenceConfig {
    DocumentIntelligenceConfig {
        endpoint: format!("{}/", server.url()),
        api_key: secret_string("docs-key".to_string()),
        region: "eastus".to_string(),
        model_id: "prebuilt-creditCard".to_string(),
        api_version: "2024-11-30".to_string(),
        poll_interval_ms: 10,
        max_poll_attempts,
        timeout_seconds: 5,
    }
}

async fn mock_submit(server: &mut ServerGuard) -> Mock {
    let location = format!("{}/op/1?api-version=2024-11-30", server.url());
    server
        .mock("POST", ANALYZE_PATH)
        .match_query(Matcher::UrlEncoded(
            "api-version".to_string(),
            "2024-11-30".to_string(),
        ))
        .match_header("ocp-apim-subscription-key", "docs-key")
        .with_status(202)
        .with_header("operation-location", &location)
        .create_async()
        .await
}

fn operation(status: &str) -> String {
    json!({ "status": status }).to_string()
}

fn succeeded_body() -> String {
    json!({
        "status": "succeeded",
        "analyzeResult": {
            "modelId": "prebuilt-creditCard",
            "documents": [{
                "docType": "creditCard",
                "confidence": 0.99,
                "fields": {
                    "CardHolderName": { "type": "string", "content": "JOHN DOE", "confidence": 0.98 },
                    "CardNumber": { "type": "string", "content": "4532 0000 0000 1234", "confidence": 0.97 },
                    "ExpirationDate": { "type": "string", "content": "12/25", "confidence": 0.95 },
                    "PaymentNetwork": { "type": "string", "content": "Visa" },
                    "IssuingBank": null
                }
            }]
        }
    })
    .to_string()
}

#[tokio::test]
async fn test_analyze_url_polls_until_succeeded() {
    let mut server = Server::new_async().await;
    let submit = server
        .mock("POST", ANALYZE_PATH)
        .match_query(Matcher::Any)
        .match_header("ocp-apim-subscription-key", "docs-key")
        .match_body(Matcher::Json(json!({ "urlSource": IMAGE_URL })))
        .with_status(202)
        .with_header("operation-location", &format!("{}/op/1", server.url()))
        .create_async()
        .await;
    let running = server
        .mock("GET", "/op/1")
        .with_status(200)
        .with_body(operation("running"))
        .expect(1)
        .create_async()
        .await;
    let done = server
        .mock("GET", "/op/1")
        .with_status(200)
        .with_body(succeeded_body())
        .expect(1)
        .create_async()
        .await;

    let client = DocumentIntelligenceClient::new(&docs_config(&server, 5)).unwrap();
    let fields = client.analyze_url(IMAGE_URL).await.unwrap();

    submit.assert_async().await;
    running.assert_async().await;
    done.assert_async().await;

    assert_eq!(fields.len(), 4);
    assert_eq!(fields.get(CardField::CardHolderName), Some("JOHN DOE"));
    assert_eq!(fields.get(CardField::CardNumber), Some("4532 0000 0000 1234"));
    assert_eq!(fields.get(CardField::ExpirationDate), Some("12/25"));
    assert_eq!(fields.get(CardField::PaymentNetwork), Some("Visa"));
    assert!(!fields.contains(CardField::IssuingBank));
}

#[tokio::test]
async fn test_retry_after_overrides_poll_interval() {
    let mut server = Server::new_async().await;
    let _submit = server
        .mock("POST", ANALYZE_PATH)
        .match_query(Matcher::Any)
        .with_status(202)
        .with_header("operation-location", &format!("{}/op/3", server.url()))
        .with_header("retry-after", "0")
        .create_async()
        .await;
    let running = server
        .mock("GET", "/op/3")
        .with_status(200)
        .with_header("retry-after", "0")
        .with_body(operation("running"))
        .expect(1)
        .create_async()
        .await;
    let done = server
        .mock("GET", "/op/3")
        .with_status(200)
        .with_body(succeeded_body())
        .expect(1)
        .create_async()
        .await;

    // A minute between polls would blow the deadline unless Retry-After wins
    let mut config = docs_config(&server, 5);
    config.poll_interval_ms = 60_000;
    let client = DocumentIntelligenceClient::new(&config).unwrap();

    let fields = tokio::time::timeout(Duration::from_secs(5), client.analyze_url(IMAGE_URL))
        .await
        .expect("polling ignored Retry-After")
        .unwrap();

    running.assert_async().await;
    done.assert_async().await;
    assert_eq!(fields.get(CardField::CardHolderName), Some("JOHN DOE"));
}

#[tokio::test]
async fn test_analyze_bytes_sends_base64_source() {
    let mut server = Server::new_async().await;
    let submit = server
        .mock("POST", ANALYZE_PATH)
        .match_query(Matcher::Any)
        .match_body(Matcher::Json(json!({ "base64Source": "AQID" })))
        .with_status(202)
        .with_header("operation-location", &format!("{}/op/2", server.url()))
        .create_async()
        .await;
    let _done = server
        .mock("GET", "/op/2")
        .with_status(200)
        .with_body(succeeded_body())
        .create_async()
        .await;

    let client = DocumentIntelligenceClient::new(&docs_config(&server, 3)).unwrap();
    let fields = client.analyze_bytes(&[1, 2, 3]).await.unwrap();

    submit.assert_async().await;
    assert_eq!(fields.get(CardField::ExpirationDate), Some("12/25"));
}

#[tokio::test]
async fn test_succeeded_without_documents_is_empty() {
    let mut server = Server::new_async().await;
    let _submit = mock_submit(&mut server).await;
    let _done = server
        .mock("GET", "/op/1")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(json!({ "status": "succeeded", "analyzeResult": { "documents": [] } }).to_string())
        .create_async()
        .await;

    let client = DocumentIntelligenceClient::new(&docs_config(&server, 3)).unwrap();
    let fields = client.analyze_url(IMAGE_URL).await.unwrap();
    assert!(fields.is_empty());
}

#[tokio::test]
async fn test_failed_operation_carries_service_error() {
    let mut server = Server::new_async().await;
    let _submit = mock_submit(&mut server).await;
    let _failed = server
        .mock("GET", "/op/1")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(
            json!({
                "status": "failed",
                "error": { "code": "InvalidContent", "message": "The file is corrupted" }
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = DocumentIntelligenceClient::new(&docs_config(&server, 3)).unwrap();
    let err = client.analyze_url(IMAGE_URL).await.unwrap_err();

    match err {
        CardScanError::Analysis(AnalysisError::OperationFailed { code, message }) => {
            assert_eq!(code, "InvalidContent");
            assert_eq!(message, "The file is corrupted");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_polling_gives_up_after_max_attempts() {
    let mut server = Server::new_async().await;
    let _submit = mock_submit(&mut server).await;
    let poll = server
        .mock("GET", "/op/1")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(operation("running"))
        .expect(3)
        .create_async()
        .await;

    let client = DocumentIntelligenceClient::new(&docs_config(&server, 3)).unwrap();
    let err = client.analyze_url(IMAGE_URL).await.unwrap_err();

    poll.assert_async().await;
    assert!(matches!(
        err,
        CardScanError::Analysis(AnalysisError::Timeout { attempts: 3 })
    ));
}

#[tokio::test]
async fn test_missing_operation_location_is_invalid_response() {
    let mut server = Server::new_async().await;
    let _submit = server
        .mock("POST", ANALYZE_PATH)
        .match_query(Matcher::Any)
        .with_status(202)
        .create_async()
        .await;

    let client = DocumentIntelligenceClient::new(&docs_config(&server, 3)).unwrap();
    let err = client.analyze_url(IMAGE_URL).await.unwrap_err();
    assert!(matches!(
        err,
        CardScanError::Analysis(AnalysisError::InvalidResponse(_))
    ));
}

#[tokio::test]
async fn test_bad_key_is_authentication_error() {
    let mut server = Server::new_async().await;
    let _submit = server
        .mock("POST", ANALYZE_PATH)
        .match_query(Matcher::Any)
        .with_status(401)
        .with_body(
            json!({ "error": { "code": "401", "message": "Access denied due to invalid subscription key" } })
                .to_string(),
        )
        .create_async()
        .await;

    let client = DocumentIntelligenceClient::new(&docs_config(&server, 3)).unwrap();
    let err = client.analyze_url(IMAGE_URL).await.unwrap_err();

    match err {
        CardScanError::Analysis(AnalysisError::AuthenticationFailed(message)) => {
            assert!(message.contains("invalid subscription key"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_rejected_request_keeps_status() {
    let mut server = Server::new_async().await;
    let _submit = server
        .mock("POST", ANALYZE_PATH)
        .match_query(Matcher::Any)
        .with_status(400)
        .with_body(json!({ "error": { "code": "InvalidRequest", "message": "Invalid URL" } }).to_string())
        .create_async()
        .await;

    let client = DocumentIntelligenceClient::new(&docs_config(&server, 3)).unwrap();
    let err = client.analyze_url(IMAGE_URL).await.unwrap_err();

    match err {
        CardScanError::Analysis(AnalysisError::RequestRejected { status, message }) => {
            assert_eq!(status, 400);
            assert_eq!(message, "Invalid URL");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_empty_inputs_are_rejected_locally() {
    let server = Server::new_async().await;
    let client = DocumentIntelligenceClient::new(&docs_config(&server, 3)).unwrap();

    assert!(matches!(
        client.analyze_url("  ").await,
        Err(CardScanError::Validation(_))
    ));
    assert!(matches!(
        client.analyze_bytes(&[]).await,
        Err(CardScanError::Validation(_))
    ));
}
