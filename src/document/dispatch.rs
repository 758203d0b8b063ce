use crate::document::{DocumentFormat, ExtractError, UploadedDocument, docx, html, pdf, text};
use tracing::debug;

/// Extract text using format dispatch from extension.
pub fn extract(bytes: &[u8], extension: &str) -> Result<String, ExtractError> {
    let format = DocumentFormat::from_extension(extension).ok_or_else(|| {
        ExtractError::UnsupportedFileType {
            extension: Some(extension.to_lowercase()),
        }
    })?;

    extract_format(bytes, format)
}

/// Extract text from an uploaded file, inferring the format from its name.
pub fn extract_upload(upload: &UploadedDocument) -> Result<String, ExtractError> {
    match upload.extension() {
        Some(extension) => extract(&upload.bytes, &extension),
        None => Err(ExtractError::UnsupportedFileType { extension: None }),
    }
}

pub fn extract_format(bytes: &[u8], format: DocumentFormat) -> Result<String, ExtractError> {
    let text = match format {
        DocumentFormat::Pdf => pdf::extract_text(bytes)?,
        DocumentFormat::Docx => docx::extract_raw_text(bytes)?,
        DocumentFormat::Html => html::extract_body_text(bytes)?,
        DocumentFormat::Text => text::decode(bytes),
    };
    debug!(
        format = format.extension(),
        input_bytes = bytes.len(),
        output_chars = text.chars().count(),
        "extracted text"
    );
    Ok(text)
}
