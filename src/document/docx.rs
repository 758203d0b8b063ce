use crate::document::ExtractError;
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use std::io::{BufRead, BufReader, Cursor};
use zip::ZipArchive;

/// Main part of a WordprocessingML package.
const MAIN_PART: &str = "word/document.xml";

/// Terminator written after every paragraph.
const PARAGRAPH_END: &str = "\n\n";

/// Extract raw text from an in-memory DOCX package.
///
/// Text runs are concatenated as-is, tabs and breaks inside runs become `\t`
/// and `\n`, and every paragraph ends with a blank line. No other formatting
/// is applied.
pub fn extract_raw_text(bytes: &[u8]) -> Result<String, ExtractError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|error| ExtractError::Docx(format!("failed to open docx package: {error}")))?;
    let part = archive.by_name(MAIN_PART).map_err(|error| {
        ExtractError::Docx(format!("missing main document part '{MAIN_PART}': {error}"))
    })?;

    raw_text_from_xml(BufReader::new(part))
}

fn raw_text_from_xml<R: BufRead>(source: R) -> Result<String, ExtractError> {
    let mut reader = Reader::from_reader(source);
    let mut buf = Vec::with_capacity(1024);
    let mut text = String::new();
    let mut in_run = false;
    let mut in_text = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(element)) => match element.local_name().as_ref() {
                b"r" => in_run = true,
                b"t" if in_run => in_text = true,
                b"tab" if in_run => text.push('\t'),
                b"br" | b"cr" if in_run => text.push('\n'),
                _ => {}
            },
            Ok(Event::Empty(element)) => match element.local_name().as_ref() {
                b"tab" if in_run => text.push('\t'),
                b"br" | b"cr" if in_run => text.push('\n'),
                b"p" => text.push_str(PARAGRAPH_END),
                _ => {}
            },
            Ok(Event::End(element)) => match element.local_name().as_ref() {
                b"r" => in_run = false,
                b"t" => in_text = false,
                b"p" => text.push_str(PARAGRAPH_END),
                _ => {}
            },
            Ok(Event::Text(content)) if in_text => {
                let unescaped = content.unescape().map_err(|error| {
                    ExtractError::Docx(format!(
                        "invalid text at position {}: {error}",
                        reader.buffer_position()
                    ))
                })?;
                text.push_str(&unescaped);
            }
            Ok(Event::Eof) => break,
            Err(error) => {
                return Err(ExtractError::Docx(format!(
                    "malformed document xml at position {}: {error}",
                    reader.buffer_position()
                )));
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(text)
}
