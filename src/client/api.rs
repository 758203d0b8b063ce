use crate::client::SelectedFile;
use crate::error::{ErrorCode, ErrorPayload};
use crate::server::handlers::UPLOAD_FIELD;
use crate::server::response::{ExportRequest, ExtractResponse, OUTCOME_HEADER, ResponseKind};
use reqwest::multipart::{Form, Part};
use reqwest::{Response, StatusCode};
use std::fmt;

pub const DEFAULT_SERVER: &str = "http://127.0.0.1:8080";

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{message}")]
    Server {
        status: StatusCode,
        code: Option<ErrorCode>,
        message: String,
    },

    #[error("unexpected response from server (status {status}, outcome {outcome})")]
    UnexpectedResponse {
        status: StatusCode,
        outcome: OutcomeHeader,
    },
}

/// Raw outcome header value as received, for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutcomeHeader(pub Option<String>);

impl fmt::Display for OutcomeHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(value) => f.write_str(value),
            None => f.write_str("missing"),
        }
    }
}

/// Typed access to the three server endpoints.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_owned(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `POST /api/extract`, returning the extracted text.
    pub async fn extract(&self, file: &SelectedFile) -> Result<String, ClientError> {
        let response = self
            .http
            .post(self.url("/api/extract"))
            .multipart(upload_form(file))
            .send()
            .await?;
        let response = expect_kind(response, ResponseKind::Content).await?;
        let body: ExtractResponse = response.json().await?;
        Ok(body.content)
    }

    /// `POST /api/convert-to-excel`, returning spreadsheet bytes.
    pub async fn convert_to_excel(&self, content: &str) -> Result<Vec<u8>, ClientError> {
        let response = self
            .http
            .post(self.url("/api/convert-to-excel"))
            .json(&ExportRequest {
                content: Some(content.to_owned()),
            })
            .send()
            .await?;
        let response = expect_kind(response, ResponseKind::Spreadsheet).await?;
        Ok(response.bytes().await?.to_vec())
    }

    /// `POST /api/python-extract`, returning spreadsheet bytes.
    pub async fn python_extract(&self, file: &SelectedFile) -> Result<Vec<u8>, ClientError> {
        let response = self
            .http
            .post(self.url("/api/python-extract"))
            .multipart(upload_form(file))
            .send()
            .await?;
        let response = expect_kind(response, ResponseKind::Spreadsheet).await?;
        Ok(response.bytes().await?.to_vec())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

fn upload_form(file: &SelectedFile) -> Form {
    Form::new().part(
        UPLOAD_FIELD,
        Part::bytes(file.bytes.clone()).file_name(file.name.clone()),
    )
}

/// Accept the response only when the outcome header announces `expected`.
/// Error outcomes are decoded into [`ClientError::Server`].
async fn expect_kind(response: Response, expected: ResponseKind) -> Result<Response, ClientError> {
    let status = response.status();
    let raw = response
        .headers()
        .get(OUTCOME_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    let kind = raw.as_deref().and_then(ResponseKind::parse);

    match kind {
        Some(kind) if kind == expected && status.is_success() => Ok(response),
        Some(ResponseKind::Error) => {
            let payload: ErrorPayload = response.json().await?;
            Err(ClientError::Server {
                status,
                code: Some(payload.code),
                message: payload.error,
            })
        }
        _ => Err(ClientError::UnexpectedResponse {
            status,
            outcome: OutcomeHeader(raw),
        }),
    }
}
