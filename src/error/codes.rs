use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

/// Machine-readable error codes carried in every JSON error body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    /// Multipart request without a `file` field.
    #[serde(rename = "E_MISSING_FILE")]
    MissingFile,
    /// Export request without a `content` field.
    #[serde(rename = "E_MISSING_CONTENT")]
    MissingContent,
    /// Body could not be decoded (malformed multipart or JSON).
    #[serde(rename = "E_BAD_REQUEST")]
    BadRequest,
    /// File extension is not one of pdf, docx, html, txt. Reported as an
    /// extraction failure.
    #[serde(rename = "E_UNSUPPORTED_TYPE")]
    UnsupportedType,
    /// Body exceeds the configured upload limit.
    #[serde(rename = "E_TOO_LARGE")]
    TooLarge,
    /// No route matches the request path.
    #[serde(rename = "E_NOT_FOUND")]
    NotFound,
    /// The path exists but not for this HTTP method.
    #[serde(rename = "E_METHOD_NOT_ALLOWED")]
    MethodNotAllowed,
    /// In-process extraction failed.
    #[serde(rename = "E_EXTRACTION")]
    Extraction,
    /// Spreadsheet encoding failed.
    #[serde(rename = "E_EXPORT")]
    Export,
    /// External extraction script missing from its configured location.
    #[serde(rename = "E_SCRIPT_NOT_FOUND")]
    ScriptNotFound,
    /// External script ran but produced no spreadsheet.
    #[serde(rename = "E_CONVERSION_FAILED")]
    ConversionFailed,
    /// External script exceeded its time budget and was killed.
    #[serde(rename = "E_TIMEOUT")]
    Timeout,
    #[serde(rename = "E_INTERNAL")]
    Internal,
}

impl ErrorCode {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorCode::MissingFile | ErrorCode::MissingContent | ErrorCode::BadRequest => {
                StatusCode::BAD_REQUEST
            }
            ErrorCode::TooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ErrorCode::UnsupportedType
            | ErrorCode::Extraction
            | ErrorCode::Export
            | ErrorCode::ScriptNotFound
            | ErrorCode::ConversionFailed
            | ErrorCode::Timeout
            | ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingFile => "E_MISSING_FILE",
            ErrorCode::MissingContent => "E_MISSING_CONTENT",
            ErrorCode::BadRequest => "E_BAD_REQUEST",
            ErrorCode::UnsupportedType => "E_UNSUPPORTED_TYPE",
            ErrorCode::TooLarge => "E_TOO_LARGE",
            ErrorCode::NotFound => "E_NOT_FOUND",
            ErrorCode::MethodNotAllowed => "E_METHOD_NOT_ALLOWED",
            ErrorCode::Extraction => "E_EXTRACTION",
            ErrorCode::Export => "E_EXPORT",
            ErrorCode::ScriptNotFound => "E_SCRIPT_NOT_FOUND",
            ErrorCode::ConversionFailed => "E_CONVERSION_FAILED",
            ErrorCode::Timeout => "E_TIMEOUT",
            ErrorCode::Internal => "E_INTERNAL",
        }
    }
}
