//! Property tests for the text normalizer.

use bgt_common::{fold_key, normalize_text};
use proptest::prelude::*;

proptest! {
    #[test]
    fn normalizing_twice_is_a_no_op(raw in "\\PC*") {
        let once = normalize_text(&raw);
        prop_assert_eq!(normalize_text(&once), once);
    }

    #[test]
    fn normalized_text_has_no_edge_or_double_whitespace(raw in "[ \\t\\nก-ฮa-zA-Z0-9\u{200B}\u{FEFF}]{0,40}") {
        let normalized = normalize_text(&raw);
        prop_assert_eq!(normalized.trim(), normalized.as_str());
        prop_assert!(!normalized.contains("  "));
        prop_assert!(!normalized.contains('\n'));
        prop_assert!(!normalized.contains('\u{200B}'), "normalized contains U+200B");
        prop_assert!(!normalized.contains('\u{FEFF}'), "normalized contains U+FEFF");
    }

    #[test]
    fn fold_key_is_stable(raw in "\\PC*") {
        let key = fold_key(&raw);
        prop_assert_eq!(fold_key(&key), key);
    }
}

#[test]
fn thai_headers_with_line_breaks() {
    assert_eq!(normalize_text("ผลผลิต/\nโครงการ"), "ผลผลิต/ โครงการ");
    assert_eq!(normalize_text("ปี 2569"), "ปี 2569");
}
