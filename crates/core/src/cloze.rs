// crates/core/src/cloze.rs
//! Cloze (fill-in-the-blank) text transforms for question editors.
//!
//! Storage form keeps the stem with `____` blank markers plus a separate
//! ordered answer list. For inline editing the answers are embedded in the
//! stem inside square brackets ("The capital of France is [Paris]"), and
//! parsed back out on save. Pure functions; no I/O.

/// Canonical blank marker used in stored cloze stems.
pub const BLANK_MARKER: &str = "____";

/// Embed answers into a stem for inline editing.
///
/// Each blank marker is replaced, left to right, with `[answer]`, consuming
/// answers positionally. Blanks beyond the answer list become `[]`; surplus
/// answers are ignored.
pub fn format_for_editing(stem: &str, answers: &[String]) -> String {
    let mut out = String::with_capacity(stem.len() + answers.iter().map(|a| a.len()).sum::<usize>());
    let mut answers = answers.iter();
    let mut rest = stem;
    while let Some(pos) = rest.find(BLANK_MARKER) {
        out.push_str(&rest[..pos]);
        out.push('[');
        if let Some(answer) = answers.next() {
            out.push_str(answer);
        }
        out.push(']');
        rest = &rest[pos + BLANK_MARKER.len()..];
    }
    out.push_str(rest);
    out
}

/// Extract inline `[...]` answers from an edited stem.
///
/// Returns the storage-form stem (brackets restored to blank markers) and the
/// ordered answer list. Brackets do not nest: an opening bracket whose
/// span would contain another `[`, or that has no closing bracket, is treated
/// as literal text, as is any unmatched `]`.
pub fn parse_from_editing(text: &str) -> (String, Vec<String>) {
    let mut stem = String::with_capacity(text.len());
    let mut answers = Vec::new();
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'[' {
            if let Some(close) = text[i + 1..].find(']') {
                let inner = &text[i + 1..i + 1 + close];
                if !inner.contains('[') {
                    answers.push(inner.to_string());
                    stem.push_str(BLANK_MARKER);
                    i += close + 2;
                    continue;
                }
            }
        }
        // Literal byte (including stray brackets). Safe to copy bytewise:
        // '[' and ']' are ASCII, so we never split a UTF-8 sequence.
        let ch_len = utf8_len(bytes[i]);
        stem.push_str(&text[i..i + ch_len]);
        i += ch_len;
    }
    (stem, answers)
}

fn utf8_len(first_byte: u8) -> usize {
    match first_byte {
        b if b < 0x80 => 1,
        b if b < 0xE0 => 2,
        b if b < 0xF0 => 3,
        _ => 4,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn owned(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_format_basic() {
        let stem = "The ____ of France is ____.";
        let edited = format_for_editing(stem, &owned(&["capital", "Paris"]));
        assert_eq!(edited, "The [capital] of France is [Paris].");
    }

    #[test]
    fn test_format_more_blanks_than_answers() {
        let edited = format_for_editing("____ and ____", &owned(&["salt"]));
        assert_eq!(edited, "[salt] and []");
    }

    #[test]
    fn test_format_no_blanks() {
        assert_eq!(format_for_editing("plain text", &owned(&["x"])), "plain text");
    }

    #[test]
    fn test_parse_basic() {
        let (stem, answers) = parse_from_editing("The [capital] of France is [Paris].");
        assert_eq!(stem, "The ____ of France is ____.");
        assert_eq!(answers, owned(&["capital", "Paris"]));
    }

    #[test]
    fn test_parse_empty_answer() {
        let (stem, answers) = parse_from_editing("Fill [] here");
        assert_eq!(stem, "Fill ____ here");
        assert_eq!(answers, owned(&[""]));
    }

    #[test]
    fn test_parse_unbalanced_open_is_literal() {
        let (stem, answers) = parse_from_editing("a [b c");
        assert_eq!(stem, "a [b c");
        assert!(answers.is_empty());
    }

    #[test]
    fn test_parse_stray_close_is_literal() {
        let (stem, answers) = parse_from_editing("a ] b [x]");
        assert_eq!(stem, "a ] b ____");
        assert_eq!(answers, owned(&["x"]));
    }

    #[test]
    fn test_parse_nested_open_treated_literal() {
        // The outer bracket cannot close over a nested '[' — it stays literal
        // and only the inner pair is an answer.
        let (stem, answers) = parse_from_editing("[a[b]]");
        assert_eq!(stem, "[a____]");
        assert_eq!(answers, owned(&["b"]));
    }

    #[test]
    fn test_parse_multibyte_literal_text() {
        let (stem, answers) = parse_from_editing("héllo [wörld] ✓");
        assert_eq!(stem, "héllo ____ ✓");
        assert_eq!(answers, owned(&["wörld"]));
    }

    #[test]
    fn test_round_trip_simple() {
        let stem = "A ____ B ____ C";
        let answers = owned(&["one", "two"]);
        let (back_stem, back_answers) = parse_from_editing(&format_for_editing(stem, &answers));
        assert_eq!(back_stem, stem);
        assert_eq!(back_answers, answers);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        /// Literal text with no brackets, no underscores (so no accidental
        /// blank markers).
        fn literal() -> impl Strategy<Value = String> {
            "[a-zA-Z0-9 .,;:!?-]{0,20}"
        }

        fn answer() -> impl Strategy<Value = String> {
            "[a-zA-Z0-9 ]{0,12}"
        }

        proptest! {
            #[test]
            fn round_trip(pieces in prop::collection::vec(literal(), 1..6),
                          answers in prop::collection::vec(answer(), 0..5)) {
                // Stem: literal pieces joined by exactly answers.len() blanks.
                let blanks = answers.len();
                let mut pieces = pieces;
                while pieces.len() < blanks + 1 {
                    pieces.push(String::new());
                }
                let pieces = &pieces[..blanks + 1];
                let stem = pieces.join(BLANK_MARKER);

                let (back_stem, back_answers) =
                    parse_from_editing(&format_for_editing(&stem, &answers));
                prop_assert_eq!(back_stem, stem);
                prop_assert_eq!(back_answers, answers);
            }
        }
    }
}
