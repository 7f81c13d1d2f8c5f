//! # Gluten Scanner Module
//!
//! Keyword scanning for gluten-containing ingredients.
//!
//! ## Features
//!
//! - Immutable [`IngredientVocabulary`] built once at startup from configuration
//! - Case-insensitive substring matching over free text (no word boundaries:
//!   "buckwheat" reports "wheat")
//! - OCR text normalization so keywords broken across label lines still match

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeSet;
use tracing::{debug, trace};

/// Keywords used when no `GLUTEN_KEYWORDS` override is configured
pub const DEFAULT_GLUTEN_KEYWORDS: &[&str] = &[
    "wheat",
    "barley",
    "rye",
    "malt",
    "brewer's yeast",
    "farro",
    "spelt",
    "kamut",
    "triticale",
    "bulgur",
    "durum",
    "semolina",
    "einkorn",
    "emmer",
    "wheat starch",
    "wheat flour",
    "barley malt",
    "rye flour",
];

lazy_static! {
    // A word hyphenated at a line break, e.g. "whe-\nat"
    static ref HYPHENATED_BREAK: Regex =
        Regex::new(r"(\w)-\s*\n\s*(\w)").expect("Hyphenation pattern should be valid");
    static ref WHITESPACE_RUN: Regex =
        Regex::new(r"\s+").expect("Whitespace pattern should be valid");
}

/// Set of lowercase ingredient keywords that indicate gluten
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngredientVocabulary {
    keywords: BTreeSet<String>,
}

/// Vocabulary entries found in a piece of text, in sorted order
pub type ScanResult = BTreeSet<String>;

impl IngredientVocabulary {
    /// Build a vocabulary from raw keywords.
    ///
    /// Entries are trimmed and lowercased; blank entries are dropped.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use celiac_bot::gluten_scanner::IngredientVocabulary;
    ///
    /// let vocabulary = IngredientVocabulary::new(["Wheat", "  rye ", ""]);
    /// assert_eq!(vocabulary.len(), 2);
    /// assert!(vocabulary.contains("wheat"));
    /// ```
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords = keywords
            .into_iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        Self { keywords }
    }

    /// Parse a comma-separated keyword list such as `"wheat, rye,barley"`
    pub fn from_csv(list: &str) -> Self {
        Self::new(list.split(','))
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    pub fn contains(&self, keyword: &str) -> bool {
        self.keywords.contains(keyword)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.keywords.iter().map(String::as_str)
    }

    /// Scan `text` against this vocabulary. See [`scan`].
    pub fn scan(&self, text: &str) -> ScanResult {
        scan(text, self)
    }
}

impl Default for IngredientVocabulary {
    fn default() -> Self {
        Self::new(DEFAULT_GLUTEN_KEYWORDS.iter().copied())
    }
}

/// Return every vocabulary entry that occurs as a substring of the lowercased text.
///
/// Matching is plain containment: no fuzzy matching and no word-boundary checks.
///
/// # Examples
///
/// ```rust
/// use celiac_bot::gluten_scanner::{scan, IngredientVocabulary};
///
/// let found = scan("Contains WHEAT flour", &IngredientVocabulary::default());
/// assert!(found.contains("wheat"));
/// assert!(found.contains("wheat flour"));
/// ```
pub fn scan(text: &str, vocabulary: &IngredientVocabulary) -> ScanResult {
    if text.is_empty() {
        return ScanResult::new();
    }

    let lowered = text.to_lowercase();
    let found: ScanResult = vocabulary
        .keywords
        .iter()
        .filter(|keyword| lowered.contains(keyword.as_str()))
        .cloned()
        .collect();

    debug!(
        text_length = text.len(),
        matches_found = found.len(),
        "Gluten keyword scan completed"
    );
    found
}

/// Flatten OCR output into a single line.
///
/// Words hyphenated across a line break are joined back together and every
/// run of whitespace becomes one space.
pub fn normalize_ocr_text(text: &str) -> String {
    let joined = HYPHENATED_BREAK.replace_all(text, "$1$2");
    let normalized = WHITESPACE_RUN.replace_all(joined.trim(), " ").into_owned();
    trace!(before = text.len(), after = normalized.len(), "Normalized OCR text");
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_vocabulary() {
        let vocabulary = IngredientVocabulary::default();
        assert_eq!(vocabulary.len(), DEFAULT_GLUTEN_KEYWORDS.len());
        assert!(vocabulary.contains("brewer's yeast"));
        assert!(!vocabulary.contains("corn"));
    }

    #[test]
    fn test_vocabulary_from_csv() {
        let vocabulary = IngredientVocabulary::from_csv(" Wheat ,RYE,, spelt ,");
        let keywords: Vec<&str> = vocabulary.iter().collect();
        assert_eq!(keywords, vec!["rye", "spelt", "wheat"]);
    }

    #[test]
    fn test_scan_ignores_case() {
        let vocabulary = IngredientVocabulary::default();
        let text = "Ingredients: Barley Malt Extract";
        assert_eq!(scan(&text.to_uppercase(), &vocabulary), scan(&text.to_lowercase(), &vocabulary));
        assert!(scan(text, &vocabulary).contains("barley malt"));
    }

    #[test]
    fn test_scan_empty_text() {
        assert!(scan("", &IngredientVocabulary::default()).is_empty());
    }

    #[test]
    fn test_scan_matches_inside_longer_words() {
        let found = scan("organic buckwheat groats", &IngredientVocabulary::default());
        assert!(found.contains("wheat"));
    }

    #[test]
    fn test_normalize_joins_hyphenated_words() {
        assert_eq!(normalize_ocr_text("semo-\nlina, rice"), "semolina, rice");
    }

    #[test]
    fn test_normalize_collapses_line_breaks() {
        assert_eq!(
            normalize_ocr_text("  sugar, wheat\n  flour,\t\tsalt \n"),
            "sugar, wheat flour, salt"
        );
    }
}
