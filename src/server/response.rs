use crate::export::Download;
use axum::Json;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

/// Header naming the kind of body a response carries, so clients never have
/// to guess from the content type.
pub const OUTCOME_HEADER: &str = "x-doc2sheet-outcome";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    /// JSON `{"content": ...}` with extracted text.
    Content,
    /// Binary spreadsheet download.
    Spreadsheet,
    /// JSON error payload.
    Error,
}

impl ResponseKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ResponseKind::Content => "content",
            ResponseKind::Spreadsheet => "spreadsheet",
            ResponseKind::Error => "error",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "content" => Some(ResponseKind::Content),
            "spreadsheet" => Some(ResponseKind::Spreadsheet),
            "error" => Some(ResponseKind::Error),
            _ => None,
        }
    }

    pub fn header(self) -> (HeaderName, HeaderValue) {
        (
            HeaderName::from_static(OUTCOME_HEADER),
            HeaderValue::from_static(self.as_str()),
        )
    }
}

/// Body of a successful extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractResponse {
    pub content: String,
}

/// Body of an export request. `content` is optional so a missing field can be
/// reported as a validation error instead of a decoding error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportRequest {
    #[serde(default)]
    pub content: Option<String>,
}

pub fn content_response(content: String) -> Response {
    (
        StatusCode::OK,
        [ResponseKind::Content.header()],
        Json(ExtractResponse { content }),
    )
        .into_response()
}

pub fn download_response(download: Download) -> Response {
    let disposition = HeaderValue::from_bytes(download.content_disposition().as_bytes())
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"));
    (
        StatusCode::OK,
        [
            (CONTENT_TYPE, HeaderValue::from_static(download.content_type)),
            (CONTENT_DISPOSITION, disposition),
            ResponseKind::Spreadsheet.header(),
        ],
        download.bytes,
    )
        .into_response()
}
