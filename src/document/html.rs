use crate::document::ExtractError;
use scraper::{Html, Selector};

/// Extract the text content of an HTML document's `<body>`.
///
/// Every text node under the body is concatenated in document order, the same
/// way the DOM `textContent` property does (script and style text included).
/// A document without a body yields an empty string.
pub fn extract_body_text(bytes: &[u8]) -> Result<String, ExtractError> {
    let source = String::from_utf8_lossy(bytes);
    let document = Html::parse_document(&source);
    let body = Selector::parse("body")
        .map_err(|error| ExtractError::Html(format!("invalid body selector: {error}")))?;

    Ok(document
        .select(&body)
        .next()
        .map(|element| element.text().collect())
        .unwrap_or_default())
}
