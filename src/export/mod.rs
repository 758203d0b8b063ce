pub mod xlsx;

pub use xlsx::{ExportError, export_text, sheet_rows};

pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// A binary payload meant to be saved by the receiver under `file_name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
    pub file_name: String,
    quote_file_name: bool,
}

impl Download {
    pub fn xlsx(bytes: Vec<u8>, file_name: impl Into<String>) -> Self {
        Self {
            bytes,
            content_type: XLSX_CONTENT_TYPE,
            file_name: file_name.into(),
            quote_file_name: false,
        }
    }

    /// Render the file name quoted in `Content-Disposition`.
    pub fn quoted(mut self) -> Self {
        self.quote_file_name = true;
        self
    }

    pub fn content_disposition(&self) -> String {
        let file_name = header_safe_file_name(&self.file_name);
        if self.quote_file_name {
            format!("attachment; filename=\"{file_name}\"")
        } else {
            format!("attachment; filename={file_name}")
        }
    }
}

/// Characters that would break a quoted header parameter become `_`.
fn header_safe_file_name(file_name: &str) -> String {
    file_name
        .chars()
        .map(|ch| match ch {
            '"' | '\\' => '_',
            ch if ch.is_control() => '_',
            ch => ch,
        })
        .collect()
}
