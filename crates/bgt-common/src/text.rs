//! Text normalization for spreadsheet cells and headers.
//!
//! Exports from different agencies disagree on spacing, line breaks inside
//! header cells, full-width digits and invisible characters. Everything that
//! is compared (headers, aliases, rule targets, cell values) is first passed
//! through [`normalize_text`] so comparisons are stable.

use unicode_normalization::UnicodeNormalization;

/// Zero-width space, non-joiner, joiner and the byte-order mark.
fn is_invisible(ch: char) -> bool {
    matches!(ch, '\u{200B}'..='\u{200D}' | '\u{FEFF}')
}

/// Canonicalizes raw cell text.
///
/// Invisible characters are removed first, then the text is NFKC-normalized,
/// then every whitespace run (including embedded newlines) collapses to a
/// single space and the ends are trimmed. The function is total and
/// idempotent.
///
/// # Examples
///
/// ```
/// use bgt_common::normalize_text;
///
/// assert_eq!(normalize_text("  ปี\n 2569\u{200B} "), "ปี 2569");
/// assert_eq!(normalize_text(""), "");
/// ```
pub fn normalize_text(raw: &str) -> String {
    let visible: String = raw.chars().filter(|ch| !is_invisible(*ch)).collect();
    let composed: String = visible.nfkc().collect();
    let mut normalized = String::with_capacity(composed.len());
    for part in composed.split_whitespace() {
        if !normalized.is_empty() {
            normalized.push(' ');
        }
        normalized.push_str(part);
    }
    normalized
}

/// Comparison key: normalized and lowercased.
///
/// Thai has no case, but aliases such as `FY2569` arrive in mixed case.
pub fn fold_key(raw: &str) -> String {
    normalize_text(raw).to_lowercase()
}

/// True when the text is empty after normalization.
pub fn is_blank(raw: &str) -> bool {
    raw.chars()
        .all(|ch| ch.is_whitespace() || is_invisible(ch))
}
