//! HTTP request handlers for API endpoints

use crate::document::{self, UploadedDocument};
use crate::error::ApiError;
use crate::export;
use crate::server::AppState;
use crate::server::response::{ExportRequest, content_response, download_response};
use axum::Json;
use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, State};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::info;

/// Multipart field carrying the uploaded file.
pub const UPLOAD_FIELD: &str = "file";

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `POST /api/extract`: multipart upload in, `{"content": ...}` out.
pub async fn extract_text(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ApiError> {
    let upload = read_upload(multipart?).await?;
    info!(
        file = %upload.file_name,
        bytes = upload.bytes.len(),
        "extract request"
    );

    let content =
        tokio::task::spawn_blocking(move || document::extract_upload(&upload)).await??;
    Ok(content_response(content))
}

/// `POST /api/convert-to-excel`: `{"content": ...}` in, XLSX download out.
/// Absent and empty `content` are both refused.
pub async fn convert_to_excel(
    State(state): State<AppState>,
    request: Result<Json<ExportRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = request?;
    let content = request
        .content
        .filter(|content| !content.is_empty())
        .ok_or_else(ApiError::missing_content)?;
    info!(chars = content.chars().count(), "export request");

    let download = tokio::task::spawn_blocking(move || export::export_text(&content))
        .await?
        .map_err(|error| ApiError::from(error).expose_details(state.expose_details))?;
    Ok(download_response(download))
}

/// `POST /api/python-extract`: multipart upload in, script-produced XLSX out.
pub async fn python_extract(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ApiError> {
    let upload = read_upload(multipart?).await?;
    info!(
        file = %upload.file_name,
        bytes = upload.bytes.len(),
        "script extraction request"
    );

    let download = state
        .bridge
        .convert(&upload)
        .await
        .map_err(|error| ApiError::from(error).expose_details(state.expose_details))?;
    Ok(download_response(download))
}

/// JSON 404 for unknown routes.
pub async fn not_found() -> ApiError {
    ApiError::not_found()
}

/// JSON 405 for known routes hit with the wrong method.
pub async fn method_not_allowed() -> ApiError {
    ApiError::method_not_allowed()
}

/// Read the first `file` field of a multipart body.
async fn read_upload(mut multipart: Multipart) -> Result<UploadedDocument, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_owned();
        let bytes = field.bytes().await?;
        return Ok(UploadedDocument::new(file_name, bytes.to_vec()));
    }

    Err(ApiError::missing_file())
}
