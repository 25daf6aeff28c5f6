// Character classification and simple case mapping.

/// Convert a character to its simple lowercase equivalent.
///
/// Uses Rust's built-in Unicode case mapping. For characters with
/// multi-character lowercase expansions, returns only the first character,
/// keeping the mapping one-to-one so that folded abbreviations stay the
/// same length as what was typed.
pub fn simple_lower(c: char) -> char {
    let mut iter = c.to_lowercase();
    iter.next().unwrap_or(c)
}

/// Convert a character to its simple uppercase equivalent.
///
/// One-to-one for the same reason as [`simple_lower`].
pub fn simple_upper(c: char) -> char {
    let mut iter = c.to_uppercase();
    iter.next().unwrap_or(c)
}

/// Check whether a character is an uppercase letter.
pub fn is_upper(c: char) -> bool {
    c != simple_lower(c)
}

/// Check whether a character is a lowercase letter.
pub fn is_lower(c: char) -> bool {
    c != simple_upper(c)
}

/// Punctuation characters treated as word boundaries by default.
const DEFAULT_BOUNDARY_PUNCTUATION: &[char] = &[
    '.', ',', ';', ':', '!', '?', '\'', '"', '(', ')', '[', ']', '{', '}', '/', '&', '-',
];

/// The set of boundary-signaling ("end") characters recognized by the
/// matching engine.
///
/// An end character marks the edge between words: it is what allows a
/// word-boundary abbreviation to restart cleanly and what triggers the
/// completion of rules that wait for a completion key. The default set is
/// all whitespace plus common punctuation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndChars {
    /// Explicitly configured characters, sorted for binary search.
    chars: Vec<char>,
    /// Whether any Unicode whitespace character also counts.
    include_whitespace: bool,
}

impl EndChars {
    /// Build an end-character set from an explicit list.
    ///
    /// Whitespace is *not* implied; callers wanting the conventional
    /// behavior should use [`EndChars::default`] or include the whitespace
    /// characters they care about.
    pub fn new(chars: impl IntoIterator<Item = char>) -> Self {
        let mut chars: Vec<char> = chars.into_iter().collect();
        chars.sort_unstable();
        chars.dedup();
        Self {
            chars,
            include_whitespace: false,
        }
    }

    /// Check whether a character is an end character.
    pub fn contains(&self, c: char) -> bool {
        (self.include_whitespace && c.is_whitespace()) || self.chars.binary_search(&c).is_ok()
    }
}

impl Default for EndChars {
    /// Whitespace and common punctuation.
    fn default() -> Self {
        let mut chars = DEFAULT_BOUNDARY_PUNCTUATION.to_vec();
        chars.sort_unstable();
        Self {
            chars,
            include_whitespace: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_lower_ascii() {
        assert_eq!(simple_lower('A'), 'a');
        assert_eq!(simple_lower('a'), 'a');
        assert_eq!(simple_lower('1'), '1');
    }

    #[test]
    fn simple_lower_non_ascii() {
        assert_eq!(simple_lower('\u{00C4}'), '\u{00E4}'); // Ä -> ä
        assert_eq!(simple_lower('\u{0130}'), 'i'); // İ has a two-char lowering
    }

    #[test]
    fn simple_upper_ascii() {
        assert_eq!(simple_upper('a'), 'A');
        assert_eq!(simple_upper('A'), 'A');
    }

    #[test]
    fn simple_upper_multi_char_mapping() {
        // ß uppercases to "SS"; the simple mapping keeps only the first char.
        assert_eq!(simple_upper('\u{00DF}'), 'S');
    }

    #[test]
    fn upper_lower_predicates() {
        assert!(is_upper('A'));
        assert!(!is_upper('a'));
        assert!(is_lower('a'));
        assert!(!is_lower('A'));
        assert!(!is_upper('1'));
        assert!(!is_lower('.'));
    }

    #[test]
    fn default_end_chars_include_whitespace() {
        let end = EndChars::default();
        assert!(end.contains(' '));
        assert!(end.contains('\t'));
        assert!(end.contains('\n'));
        assert!(end.contains('\u{00A0}')); // NO-BREAK SPACE
    }

    #[test]
    fn default_end_chars_include_punctuation() {
        let end = EndChars::default();
        for c in ['.', ',', '!', '?', ';', ':', '(', ')'] {
            assert!(end.contains(c), "expected {c:?} to be an end char");
        }
    }

    #[test]
    fn default_end_chars_exclude_letters_and_digits() {
        let end = EndChars::default();
        assert!(!end.contains('a'));
        assert!(!end.contains('Z'));
        assert!(!end.contains('7'));
    }

    #[test]
    fn custom_set_replaces_default() {
        let end = EndChars::new(['#', '|']);
        assert!(end.contains('#'));
        assert!(end.contains('|'));
        assert!(!end.contains(' '));
        assert!(!end.contains('.'));
    }

    #[test]
    fn custom_set_deduplicates() {
        let end = EndChars::new(['#', '#', '#']);
        assert!(end.contains('#'));
    }
}
