//! Route handlers

use super::render;
use super::server::AppState;
use crate::domain::{CardScanError, ImageUpload};
use axum::extract::multipart::{Multipart, MultipartError};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Multipart field that carries the image
pub const UPLOAD_FIELD: &str = "card";

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// `GET /`
pub async fn index(State(state): State<AppState>) -> Html<String> {
    Html(render::index_page(state.debug))
}

/// `GET /health`
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `POST /analyze`
pub async fn analyze(State(state): State<AppState>, multipart: Multipart) -> Response {
    let upload = match read_upload(multipart).await {
        Ok(upload) => upload,
        Err((status, message)) => {
            tracing::warn!(status = status.as_u16(), reason = %message, "Rejected upload");
            return (status, Html(render::error_page(state.debug, &message))).into_response();
        }
    };

    let file_name = upload.file_name().to_string();

    match state.pipeline.process(upload).await {
        Ok(outcome) => {
            Html(render::result_page(state.debug, &file_name, &outcome)).into_response()
        }
        Err(e) => {
            let (status, message) = failure_message(&e, &file_name);
            (status, Html(render::error_page(state.debug, &message))).into_response()
        }
    }
}

async fn read_upload(mut multipart: Multipart) -> Result<ImageUpload, (StatusCode, String)> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_rejection)? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let file_name = field
            .file_name()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or("upload")
            .to_string();
        let bytes = field.bytes().await.map_err(multipart_rejection)?;

        return ImageUpload::new(file_name, bytes.to_vec())
            .map_err(|e| (StatusCode::BAD_REQUEST, user_message(&e)));
    }

    Err((
        StatusCode::BAD_REQUEST,
        "No file was uploaded. Please select a PNG, JPG or JPEG image.".to_string(),
    ))
}

fn multipart_rejection(e: MultipartError) -> (StatusCode, String) {
    let status = e.status();
    let message = if status == StatusCode::PAYLOAD_TOO_LARGE {
        "The uploaded file is too large.".to_string()
    } else {
        format!("Invalid upload: {}", e.body_text())
    };
    (status, message)
}

// Validation messages are written for users; everything else is summarized
fn user_message(error: &CardScanError) -> String {
    match error {
        CardScanError::Validation(message) => message.clone(),
        other => other.to_string(),
    }
}

fn failure_message(error: &CardScanError, file_name: &str) -> (StatusCode, String) {
    match error {
        CardScanError::Storage(_) => (
            StatusCode::BAD_GATEWAY,
            format!("Could not upload '{file_name}' to Azure Blob Storage. Please try again."),
        ),
        CardScanError::Analysis(_) => (
            StatusCode::BAD_GATEWAY,
            "Could not analyze image. Please try again later.".to_string(),
        ),
        CardScanError::Validation(message) => (StatusCode::BAD_REQUEST, message.clone()),
        _ => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Error while processing the card information.".to_string(),
        ),
    }
}
