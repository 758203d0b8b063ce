pub mod dispatch;
pub mod docx;
pub mod html;
pub mod pdf;
pub mod text;

pub use dispatch::{extract, extract_format, extract_upload};
use std::path::Path;

/// Input formats the dispatcher knows how to turn into text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentFormat {
    Pdf,
    Docx,
    Html,
    Text,
}

impl DocumentFormat {
    /// Extensions accepted for upload, in display order.
    pub const ACCEPTED_EXTENSIONS: [&'static str; 4] = ["pdf", "docx", "html", "txt"];

    /// Parse an extension (without the dot), ignoring ASCII case.
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "pdf" => Some(DocumentFormat::Pdf),
            "docx" => Some(DocumentFormat::Docx),
            "html" => Some(DocumentFormat::Html),
            "txt" => Some(DocumentFormat::Text),
            _ => None,
        }
    }

    pub fn from_file_name(file_name: &str) -> Option<Self> {
        file_extension(file_name).and_then(|extension| Self::from_extension(&extension))
    }

    pub fn extension(self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "pdf",
            DocumentFormat::Docx => "docx",
            DocumentFormat::Html => "html",
            DocumentFormat::Text => "txt",
        }
    }
}

/// Lowercased text after the last `.` of a file name, if there is one.
pub fn file_extension(file_name: &str) -> Option<String> {
    file_name
        .rsplit_once('.')
        .map(|(_, extension)| extension.to_ascii_lowercase())
}

/// A file received from a client, alive for the duration of one request.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl UploadedDocument {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    pub fn extension(&self) -> Option<String> {
        file_extension(&self.file_name)
    }

    /// File name without its final extension (`report.v2.pdf` -> `report.v2`).
    pub fn stem(&self) -> &str {
        Path::new(&self.file_name)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("upload")
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("Unsupported file type for text extraction{}", describe_extension(.extension))]
    UnsupportedFileType { extension: Option<String> },

    #[error("PDF extraction failed: {0}")]
    Pdf(String),

    #[error("DOCX extraction failed: {0}")]
    Docx(String),

    #[error("HTML extraction failed: {0}")]
    Html(String),
}

fn describe_extension(extension: &Option<String>) -> String {
    match extension.as_deref() {
        Some(extension) if !extension.is_empty() => format!(" (.{extension})"),
        _ => String::new(),
    }
}
