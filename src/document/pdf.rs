use crate::document::ExtractError;
use lopdf::content::Content;
use lopdf::{Document, Encoding, Object, ObjectId};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Separator appended after every page, including the last one.
pub const PAGE_SEPARATOR: &str = "\n\n";

/// TJ displacement (thousandths of an em) wide enough to count as a word gap.
const WORD_GAP: i64 = -100;

/// Extract text from an in-memory PDF, page by page in page order.
pub fn extract_text(bytes: &[u8]) -> Result<String, ExtractError> {
    let document = Document::load_mem(bytes)
        .map_err(|error| ExtractError::Pdf(format!("failed reading pdf: {error}")))?;
    let pages = document.get_pages();
    debug!(pages = pages.len(), "loaded pdf");

    let mut text = String::new();
    // BTreeMap iterates in ascending page number.
    for (page_number, page_id) in pages {
        text.push_str(&page_text(&document, page_number, page_id)?);
        text.push_str(PAGE_SEPARATOR);
    }
    Ok(text)
}

/// Text of one page: every shown string is one text item, and the trimmed,
/// non-empty items are joined with single spaces.
pub fn page_text(
    document: &Document,
    page_number: u32,
    page_id: ObjectId,
) -> Result<String, ExtractError> {
    let page_error = |error: lopdf::Error| {
        ExtractError::Pdf(format!("failed reading page {page_number}: {error}"))
    };

    let encodings = document
        .get_page_fonts(page_id)
        .map_err(page_error)?
        .into_iter()
        .map(|(name, font)| font.get_font_encoding(document).map(|encoding| (name, encoding)))
        .collect::<lopdf::Result<BTreeMap<Vec<u8>, Encoding>>>()
        .map_err(page_error)?;
    let content = document
        .get_page_content(page_id)
        .and_then(|data| Content::decode(&data))
        .map_err(page_error)?;

    let mut items: Vec<String> = Vec::new();
    let mut encoding: Option<&Encoding> = None;
    for operation in &content.operations {
        let shown = match operation.operator.as_str() {
            "Tf" => {
                encoding = operation
                    .operands
                    .first()
                    .and_then(|operand| operand.as_name().ok())
                    .and_then(|name| encodings.get(name));
                continue;
            }
            "Tj" | "TJ" | "'" => &operation.operands[..],
            // `aw ac string "`: only the string is shown.
            "\"" => operation.operands.last().map(std::slice::from_ref).unwrap_or_default(),
            _ => continue,
        };

        let Some(encoding) = encoding else {
            warn!(page = page_number, "text shown without a known font");
            continue;
        };
        let mut item = String::new();
        collect_shown_text(&mut item, encoding, shown).map_err(page_error)?;
        let item = item.trim();
        if !item.is_empty() {
            items.push(item.to_owned());
        }
    }

    Ok(items.join(" "))
}

fn collect_shown_text(
    text: &mut String,
    encoding: &Encoding,
    operands: &[Object],
) -> lopdf::Result<()> {
    for operand in operands {
        match operand {
            Object::String(bytes, _) => text.push_str(&Document::decode_text(encoding, bytes)?),
            Object::Array(elements) => collect_shown_text(text, encoding, elements)?,
            Object::Integer(gap) if *gap < WORD_GAP => text.push(' '),
            Object::Real(gap) if f64::from(*gap) < WORD_GAP as f64 => text.push(' '),
            _ => {}
        }
    }
    Ok(())
}
