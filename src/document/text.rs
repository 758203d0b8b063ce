/// Decode plain text bytes as UTF-8, replacing invalid sequences with U+FFFD.
pub fn decode(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// Lines of `text` split on `\n`, keeping only those with non-whitespace
/// content. Order is preserved and lines are not trimmed.
pub fn non_blank_lines(text: &str) -> Vec<&str> {
    text.split('\n')
        .filter(|line| !line.trim().is_empty())
        .collect()
}
