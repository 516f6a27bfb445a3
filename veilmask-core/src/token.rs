// veilmask-core/src/token.rs
//! Placeholder token grammar.
//!
//! A placeholder is `"[" category "_" sequence "]"` where `category` is one
//! of the fixed [`Category`] tags and `sequence` is a positive decimal
//! integer with no leading zeros. This exact grammar is both the output of
//! masking and the only shape unmasking will resolve; any bracketed token
//! outside this grammar (e.g. `[Foo_1]`, `[Client_01]`) passes through
//! untouched.
//!
//! License: MIT OR APACHE 2.0

use once_cell::sync::Lazy;
use regex::Regex;

use crate::category::Category;

/// Marker a presentation layer may append after a revealed placeholder.
/// Stripped before unmask matching so decorated text still round-trips.
pub const DECORATION_MARKER: &str = " \u{1F512}";

static PLACEHOLDER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[(Client|Company|Entity|Email|Card|ID)_([1-9][0-9]*)\]")
        .expect("placeholder grammar pattern is valid")
});

static PLACEHOLDER_EXACT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\[(Client|Company|Entity|Email|Card|ID)_([1-9][0-9]*)\]$")
        .expect("anchored placeholder grammar pattern is valid")
});

/// The compiled scanner for placeholder tokens embedded in running text.
pub fn placeholder_pattern() -> &'static Regex {
    &PLACEHOLDER_RE
}

/// Renders the placeholder token for a category and 1-based sequence number.
pub fn format_placeholder(category: Category, sequence: u32) -> String {
    format!("[{}_{}]", category.as_str(), sequence)
}

/// Parses a string that must be exactly one well-formed placeholder.
///
/// Returns the category and sequence number, or `None` for anything outside
/// the grammar (unknown category, leading zeros, embedded whitespace,
/// surrounding text).
pub fn parse_placeholder(token: &str) -> Option<(Category, u32)> {
    let caps = PLACEHOLDER_EXACT_RE.captures(token)?;
    let category = caps[1].parse::<Category>().ok()?;
    let sequence = caps[2].parse::<u32>().ok()?;
    Some((category, sequence))
}

/// Removes every decoration marker a presentation layer may have appended.
pub fn strip_decorations(text: &str) -> String {
    if text.contains(DECORATION_MARKER) {
        text.replace(DECORATION_MARKER, "")
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_the_wire_grammar() {
        assert_eq!(format_placeholder(Category::Client, 1), "[Client_1]");
        assert_eq!(format_placeholder(Category::Id, 12), "[ID_12]");
    }

    #[test]
    fn parses_only_exact_tokens() {
        assert_eq!(parse_placeholder("[Email_3]"), Some((Category::Email, 3)));
        assert_eq!(parse_placeholder("[Card_10]"), Some((Category::Card, 10)));
        assert_eq!(parse_placeholder("[Foo_1]"), None);
        assert_eq!(parse_placeholder("[Client_01]"), None);
        assert_eq!(parse_placeholder("[Client_1] "), None);
        assert_eq!(parse_placeholder("[Client_1"), None);
        assert_eq!(parse_placeholder("[client_1]"), None);
    }

    #[test]
    fn scanner_skips_out_of_vocabulary_tokens() {
        let hits: Vec<&str> = placeholder_pattern()
            .find_iter("[Client_2] met [Foo_1] at [Company_11]")
            .map(|m| m.as_str())
            .collect();
        assert_eq!(hits, vec!["[Client_2]", "[Company_11]"]);
    }

    #[test]
    fn strips_every_decoration_marker() {
        let decorated = format!(
            "Ask [Client_1]{} about [Email_2]{}",
            DECORATION_MARKER, DECORATION_MARKER
        );
        assert_eq!(strip_decorations(&decorated), "Ask [Client_1] about [Email_2]");
        assert_eq!(strip_decorations("plain text"), "plain text");
    }
}
