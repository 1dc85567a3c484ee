//! Text manipulation utilities for working with identifiers in source code.

use std::ops::Range;

/// Check if a character can start a C-family identifier.
///
/// Uses Unicode Standard Annex #31 rules, plus `_` and the `$` extension.
#[inline]
pub fn is_identifier_start(c: char) -> bool {
    c == '_' || c == '$' || unicode_ident::is_xid_start(c)
}

/// Check if a character can continue a C-family identifier.
#[inline]
pub fn is_identifier_continue(c: char) -> bool {
    c == '$' || unicode_ident::is_xid_continue(c)
}

/// Check if a whole string is a valid identifier.
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) if is_identifier_start(first) => chars.all(is_identifier_continue),
        _ => false,
    }
}

/// Byte range of the identifier that covers `offset`.
///
/// Returns `None` if `offset` is not on an identifier character.
///
/// # Example
/// ```
/// use cxindex::core::text_utils::identifier_at;
///
/// let line = "int foo = bar;";
/// assert_eq!(identifier_at(line, 5), Some(4..7));
/// assert_eq!(identifier_at(line, 3), None);
/// ```
pub fn identifier_at(text: &str, offset: usize) -> Option<Range<usize>> {
    let c = text.get(offset..)?.chars().next()?;
    if !is_identifier_continue(c) {
        return None;
    }

    let mut start = offset;
    for (idx, ch) in text[..offset].char_indices().rev() {
        if !is_identifier_continue(ch) {
            break;
        }
        start = idx;
    }

    let end = text[offset..]
        .char_indices()
        .find(|&(_, ch)| !is_identifier_continue(ch))
        .map_or(text.len(), |(idx, _)| offset + idx);

    let word = &text[start..end];
    word.chars()
        .next()
        .filter(|&first| is_identifier_start(first))
        .map(|_| start..end)
}

/// Split a selector-style name into its pieces: `"foo:bar:"` gives
/// `["foo", "bar"]`, a plain name gives itself.
pub fn name_pieces(name: &str) -> Vec<&str> {
    name.split(':').filter(|piece| !piece.is_empty()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers() {
        assert!(is_identifier("Test"));
        assert!(is_identifier("_x1"));
        assert!(!is_identifier("1x"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("a-b"));
    }

    #[test]
    fn identifier_at_rejects_numbers() {
        assert_eq!(identifier_at("x = 42;", 4), None);
        assert_eq!(identifier_at("Test t;", 0), Some(0..4));
        assert_eq!(identifier_at("Test t;", 5), Some(5..6));
    }

    #[test]
    fn selector_pieces() {
        assert_eq!(name_pieces("Test"), vec!["Test"]);
        assert_eq!(name_pieces("perform:with:"), vec!["perform", "with"]);
    }
}
