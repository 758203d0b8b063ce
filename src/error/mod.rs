pub mod codes;
pub mod payload;

pub use codes::ErrorCode;
pub use payload::ErrorPayload;

use crate::bridge::BridgeError;
use crate::document::ExtractError;
use crate::export::ExportError;
use crate::server::response::ResponseKind;
use axum::Json;
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::{error, warn};

/// Handler-boundary error. Every failure of an endpoint ends up here and is
/// rendered as an [`ErrorPayload`] with the status of its [`ErrorCode`].
#[derive(Debug)]
pub struct ApiError {
    code: ErrorCode,
    message: String,
    details: Option<String>,
    expose_details: bool,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
            expose_details: false,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Include `details` in the response body. Details are always logged.
    pub fn expose_details(mut self, expose: bool) -> Self {
        self.expose_details = expose;
        self
    }

    pub fn missing_file() -> Self {
        Self::new(ErrorCode::MissingFile, "No file provided")
    }

    pub fn missing_content() -> Self {
        Self::new(ErrorCode::MissingContent, "No content provided")
    }

    pub fn not_found() -> Self {
        Self::new(ErrorCode::NotFound, "Not found")
    }

    pub fn method_not_allowed() -> Self {
        Self::new(ErrorCode::MethodNotAllowed, "Method not allowed")
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn details(&self) -> Option<&str> {
        self.details.as_deref()
    }

    pub fn payload(&self) -> ErrorPayload {
        ErrorPayload {
            error: self.message.clone(),
            code: self.code,
            details: self.details.clone().filter(|_| self.expose_details),
        }
    }

    fn from_transport(status: StatusCode, message: String) -> Self {
        let code = if status == StatusCode::PAYLOAD_TOO_LARGE {
            ErrorCode::TooLarge
        } else {
            ErrorCode::BadRequest
        };
        Self::new(code, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.code.status();
        if status.is_server_error() {
            error!(
                code = self.code.as_str(),
                details = self.details.as_deref().unwrap_or(""),
                "{}",
                self.message
            );
        } else {
            warn!(code = self.code.as_str(), "{}", self.message);
        }

        (status, [ResponseKind::Error.header()], Json(self.payload())).into_response()
    }
}

impl From<ExtractError> for ApiError {
    fn from(error: ExtractError) -> Self {
        match error {
            ExtractError::UnsupportedFileType { .. } => {
                Self::new(ErrorCode::UnsupportedType, error.to_string())
            }
            other => Self::new(ErrorCode::Extraction, other.to_string()),
        }
    }
}

impl From<ExportError> for ApiError {
    fn from(error: ExportError) -> Self {
        Self::new(ErrorCode::Export, "Failed to convert to Excel").with_details(error.to_string())
    }
}

impl From<BridgeError> for ApiError {
    fn from(error: BridgeError) -> Self {
        let code = match &error {
            BridgeError::ScriptNotFound(_) => ErrorCode::ScriptNotFound,
            BridgeError::ConversionFailed { .. } | BridgeError::Launch { .. } => {
                ErrorCode::ConversionFailed
            }
            BridgeError::Timeout(_) => ErrorCode::Timeout,
            BridgeError::Workspace(_) | BridgeError::Io { .. } => ErrorCode::Internal,
        };
        let api_error = Self::new(code, error.to_string());
        match error.details() {
            Some(details) => api_error.with_details(details),
            None => api_error,
        }
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        Self::from_transport(rejection.status(), rejection.body_text())
    }
}

impl From<MultipartError> for ApiError {
    fn from(error: MultipartError) -> Self {
        Self::from_transport(error.status(), error.body_text())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::from_transport(rejection.status(), rejection.body_text())
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(error: tokio::task::JoinError) -> Self {
        Self::new(ErrorCode::Internal, "Request processing aborted").with_details(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;

    #[test]
    fn unsupported_type_is_reported_as_server_failure() {
        let error = ApiError::from(ExtractError::UnsupportedFileType {
            extension: Some("csv".to_owned()),
        });

        assert_eq!(error.code(), ErrorCode::UnsupportedType);
        assert_eq!(error.code().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn parse_failures_are_extraction_errors() {
        let error = ApiError::from(ExtractError::Docx("failed to open docx package".to_owned()));

        assert_eq!(error.code(), ErrorCode::Extraction);
        assert!(!error.message().is_empty());
    }

    #[test]
    fn conversion_failure_keeps_stdout_as_details() {
        let error = ApiError::from(BridgeError::ConversionFailed {
            stdout: "Found 0 tables".to_owned(),
        });

        assert_eq!(error.code(), ErrorCode::ConversionFailed);
        assert_eq!(error.details(), Some("Found 0 tables"));
    }

    #[test]
    fn details_are_hidden_unless_exposed() {
        let error = ApiError::from(BridgeError::ScriptNotFound(PathBuf::from("extract.py")));
        assert!(error.payload().details.is_none());

        let exposed = error.expose_details(true);
        assert_eq!(exposed.payload().details.as_deref(), Some("extract.py"));
    }

    #[test]
    fn export_failure_details_follow_expose_flag() {
        let error = ApiError::from(ExportError::RowLimit(1_048_577));
        assert_eq!(error.code(), ErrorCode::Export);
        assert!(error.payload().details.is_none());

        let exposed = error.expose_details(true);
        assert_eq!(exposed.payload().error, "Failed to convert to Excel");
        assert_eq!(
            exposed.payload().details.as_deref(),
            Some("row 1048577 exceeds the worksheet row limit")
        );
    }

    #[test]
    fn method_not_allowed_renders_405() {
        let response = ApiError::method_not_allowed().into_response();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[test]
    fn timeout_maps_to_timeout_code() {
        let error = ApiError::from(BridgeError::Timeout(Duration::from_secs(3)));

        assert_eq!(error.code(), ErrorCode::Timeout);
        assert!(error.message().contains("3s"));
    }

    #[test]
    fn error_response_is_json_with_outcome_header() {
        let response = ApiError::missing_file().into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let outcome = response
            .headers()
            .get(crate::server::response::OUTCOME_HEADER)
            .expect("outcome header");
        assert_eq!(outcome, "error");
        let content_type = response
            .headers()
            .get(axum::http::header::CONTENT_TYPE)
            .expect("content type");
        assert_eq!(content_type, "application/json");
    }
}
