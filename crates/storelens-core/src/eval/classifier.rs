//! Search query type classification
//!
//! Pure heuristics, no model call. A caller-supplied type on the task
//! always wins over automatic classification.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Category of a search query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchType {
    /// Product code lookup, e.g. "BK608"
    PartNumber,

    /// Single dictionary-like term, e.g. "gasket"
    EnglishWord,

    /// Multi-word query, e.g. "brake pads toyota camry"
    MultipleTerms,
}

impl SearchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PartNumber => "part_number",
            Self::EnglishWord => "english_word",
            Self::MultipleTerms => "multiple_terms",
        }
    }
}

impl std::fmt::Display for SearchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

lazy_static! {
    static ref LETTERS_THEN_DIGITS: Regex = Regex::new(r"^[A-Za-z]+[0-9]+$").expect("valid regex");
    static ref DIGITS_THEN_LETTERS: Regex = Regex::new(r"^[0-9]+[A-Za-z]+$").expect("valid regex");
}

/// Check whether a single token looks like a product code.
///
/// Letters and digits only (hyphens allowed), at least one digit, and
/// either no lowercase letters or a letters-run/digits-run shape.
pub fn is_part_number_shape(token: &str) -> bool {
    if token.is_empty() {
        return false;
    }
    if !token.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return false;
    }
    if !token.chars().any(|c| c.is_ascii_digit()) {
        return false;
    }

    let no_lowercase = token
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .all(|c| c.is_ascii_uppercase());

    no_lowercase || LETTERS_THEN_DIGITS.is_match(token) || DIGITS_THEN_LETTERS.is_match(token)
}

/// Classify a raw query string.
///
/// Multi-word queries are always `MultipleTerms`. A single token in
/// part-number shape is `PartNumber`; note this intentionally captures
/// tokens like "4runner" that are also plausible words. Everything else
/// is `EnglishWord`.
pub fn classify(query: &str) -> SearchType {
    let tokens: Vec<&str> = query.split_whitespace().collect();

    if tokens.len() > 1 {
        return SearchType::MultipleTerms;
    }

    match tokens.first() {
        Some(token) if is_part_number_shape(token) => SearchType::PartNumber,
        _ => SearchType::EnglishWord,
    }
}
