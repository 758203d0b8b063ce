use crate::document::text::non_blank_lines;
use crate::export::Download;
use rust_xlsxwriter::{Workbook, XlsxError};
use tracing::debug;

/// Worksheet name and header cell of exported workbooks.
pub const SHEET_TITLE: &str = "Extracted Text";

/// Suggested file name for exported workbooks.
pub const EXPORT_FILE_NAME: &str = "extracted_text.xlsx";

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to encode spreadsheet: {0}")]
    Encode(#[from] XlsxError),

    #[error("row {0} exceeds the worksheet row limit")]
    RowLimit(usize),
}

/// Row model of the exported sheet: the header followed by every non-blank
/// line of `text`, one per row.
pub fn sheet_rows(text: &str) -> Vec<&str> {
    std::iter::once(SHEET_TITLE)
        .chain(non_blank_lines(text))
        .collect()
}

/// Encode `text` as a single-sheet workbook ready for download.
pub fn export_text(text: &str) -> Result<Download, ExportError> {
    let rows = sheet_rows(text);
    let bytes = encode_rows(&rows)?;
    debug!(rows = rows.len(), bytes = bytes.len(), "encoded spreadsheet");
    Ok(Download::xlsx(bytes, EXPORT_FILE_NAME))
}

fn encode_rows(rows: &[&str]) -> Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_TITLE)?;

    for (index, value) in rows.iter().enumerate() {
        let row = u32::try_from(index).map_err(|_| ExportError::RowLimit(index))?;
        worksheet.write_string(row, 0, *value)?;
    }

    Ok(workbook.save_to_buffer()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{Reader, Xlsx, open_workbook_from_rs};
    use std::io::Cursor;

    /// Read column 0 of the exported sheet back as strings.
    fn read_rows(bytes: &[u8]) -> Vec<String> {
        let mut workbook: Xlsx<_> =
            open_workbook_from_rs(Cursor::new(bytes.to_vec())).expect("open exported workbook");
        let range = workbook
            .worksheet_range(SHEET_TITLE)
            .expect("exported sheet present");
        range
            .rows()
            .map(|row| row.first().map(ToString::to_string).unwrap_or_default())
            .collect()
    }

    #[test]
    fn drops_blank_lines_and_prepends_header() {
        let download =
            export_text("line one\n\nline two\n   \nline three").expect("export text");

        assert_eq!(
            read_rows(&download.bytes),
            vec!["Extracted Text", "line one", "line two", "line three"]
        );
    }

    #[test]
    fn empty_text_exports_header_only() {
        let download = export_text("").expect("export empty text");
        assert_eq!(read_rows(&download.bytes), vec!["Extracted Text"]);
    }

    #[test]
    fn blank_only_text_exports_header_only() {
        let download = export_text("\n   \n\t\n").expect("export blank text");
        assert_eq!(read_rows(&download.bytes), vec!["Extracted Text"]);
    }

    #[test]
    fn row_count_is_non_blank_lines_plus_header() {
        let text = "a\n\nb\nc\n \nd\n";
        assert_eq!(sheet_rows(text).len(), 5);

        let download = export_text(text).expect("export text");
        assert_eq!(read_rows(&download.bytes).len(), 5);
    }

    #[test]
    fn sheet_is_named_after_extraction() {
        let download = export_text("only").expect("export text");
        let workbook: Xlsx<_> =
            open_workbook_from_rs(Cursor::new(download.bytes)).expect("open exported workbook");

        assert_eq!(workbook.sheet_names(), vec![SHEET_TITLE.to_owned()]);
    }

    #[test]
    fn download_carries_export_file_name() {
        let download = export_text("x").expect("export text");

        assert_eq!(download.file_name, EXPORT_FILE_NAME);
        assert_eq!(
            download.content_disposition(),
            "attachment; filename=extracted_text.xlsx"
        );
    }

    #[test]
    fn oversized_cell_is_an_export_error() {
        let line = "x".repeat(40_000);
        let error = export_text(&line).expect_err("cell exceeds xlsx string limit");
        assert!(matches!(error, ExportError::Encode(_)));
    }
}
