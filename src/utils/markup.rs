//! Escaping helpers shared by the HTML and SpreadsheetML writers.

/// Escapes the five markup-significant characters (`'` becomes `&apos;`).
pub fn escape_markup(text: &str) -> String {
    quick_xml::escape::escape(text).into_owned()
}

/// Escapes text for an XML part and drops control characters XML 1.0 cannot carry.
pub fn escape_xml_text(text: &str) -> String {
    let cleaned: String = text
        .chars()
        .filter(|ch| !ch.is_control() || matches!(ch, '\t' | '\n' | '\r'))
        .collect();
    escape_markup(&cleaned)
}
