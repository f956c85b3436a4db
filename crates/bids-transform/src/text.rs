//! Text cleanup for values headed into TSV cells.

/// Clean a free-text value for a TSV cell.
///
/// Tabs, newlines, carriage returns and commas become spaces, runs of
/// whitespace collapse to one space, and the result is trimmed. Returns
/// `None` when nothing remains or the text is one of the spellings
/// (`nan`, `none`, `null`) that spreadsheets use for missing data.
pub fn sanitize_tsv_text(value: &str) -> Option<String> {
    let mut cleaned = String::with_capacity(value.len());
    let mut pending_space = false;
    for ch in value.chars() {
        let ch = match ch {
            '\t' | '\n' | '\r' | ',' => ' ',
            other => other,
        };
        if ch.is_whitespace() {
            pending_space = !cleaned.is_empty();
            continue;
        }
        if pending_space {
            cleaned.push(' ');
            pending_space = false;
        }
        cleaned.push(ch);
    }
    if cleaned.is_empty() {
        return None;
    }
    match cleaned.to_ascii_lowercase().as_str() {
        "nan" | "none" | "null" => None,
        _ => Some(cleaned),
    }
}
