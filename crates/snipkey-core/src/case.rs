// Case pattern detection and match-case output transformation.

use crate::character::{is_lower, is_upper, simple_upper};

/// Classification of character casing within a typed trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaseType {
    /// No letters found (only digits, punctuation, etc.).
    NoLetters,
    /// All letters are lowercase: "brb".
    AllLower,
    /// First letter is uppercase, rest are lowercase: "Brb".
    FirstUpper,
    /// Mixed case that does not fit other patterns: "bRb".
    Complex,
    /// All letters are uppercase: "BRB".
    AllUpper,
}

/// Detect the case pattern of a character slice.
///
/// Non-letter characters (digits, punctuation, a trailing completion key)
/// are ignored when determining the pattern.
pub fn detect_case(word: &[char]) -> CaseType {
    if word.is_empty() {
        return CaseType::NoLetters;
    }

    let mut first_uc = false;
    let mut rest_lc = true;
    let mut all_uc = true;
    let mut no_letters = true;

    if is_upper(word[0]) {
        first_uc = true;
        no_letters = false;
    }
    if is_lower(word[0]) {
        all_uc = false;
        no_letters = false;
    }

    for &c in &word[1..] {
        if is_upper(c) {
            no_letters = false;
            rest_lc = false;
        }
        if is_lower(c) {
            all_uc = false;
            no_letters = false;
        }
    }

    if no_letters {
        return CaseType::NoLetters;
    }
    if all_uc {
        return CaseType::AllUpper;
    }
    if !rest_lc {
        return CaseType::Complex;
    }
    if first_uc {
        CaseType::FirstUpper
    } else {
        CaseType::AllLower
    }
}

/// Transform an expansion output so its casing mirrors the typed trigger.
///
/// Only two patterns transform the output:
/// - `AllUpper` -- every letter of the output is uppercased.
/// - `FirstUpper` -- the first character of the output is uppercased and
///   the rest is left as configured.
///
/// `AllLower`, `Complex` and `NoLetters` leave the output untouched:
/// lowering it would destroy intentional capitalization inside the
/// configured expansion (names, acronyms).
pub fn apply_trigger_case(output: &str, case_type: CaseType) -> String {
    match case_type {
        CaseType::AllUpper => output.chars().map(simple_upper).collect(),
        CaseType::FirstUpper => {
            let mut chars = output.chars();
            match chars.next() {
                Some(first) => {
                    let mut result = String::with_capacity(output.len());
                    result.push(simple_upper(first));
                    result.extend(chars);
                    result
                }
                None => String::new(),
            }
        }
        CaseType::NoLetters | CaseType::AllLower | CaseType::Complex => output.to_string(),
    }
}
