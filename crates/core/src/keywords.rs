//! Top keyword extraction from a single document.

use serde::Serialize;

use crate::Result;
use crate::vectorizer::{TfidfConfig, TfidfVectorizer};

/// Default number of keywords reported per page.
pub const DEFAULT_KEYWORD_COUNT: usize = 5;

/// A term and its TF-IDF weight within the document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Keyword {
    pub term: String,
    pub weight: f64,
}

/// Keywords ordered by descending weight.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Keywords(pub Vec<Keyword>);

impl Keywords {
    /// Terms joined with `|`, the export representation.
    pub fn joined(&self) -> String {
        self.terms().join("|")
    }

    pub fn terms(&self) -> Vec<&str> {
        self.0.iter().map(|k| k.term.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Picks the `n` highest-weighted terms of `text`.
///
/// The vectorizer is fit on this one document, so weights reduce to
/// normalized term counts. Ties are broken alphabetically. Fewer than `n`
/// terms are returned when the vocabulary is smaller.
///
/// # Errors
///
/// Returns [`SeoscopeError::EmptyVocabulary`](crate::SeoscopeError::EmptyVocabulary)
/// when the text has no usable terms.
///
/// # Example
///
/// ```rust
/// use seoscope_core::extract_keywords;
///
/// let keywords = extract_keywords("Garden tools for the garden and the lawn.", 2).unwrap();
/// assert_eq!(keywords.joined(), "garden|lawn");
/// ```
pub fn extract_keywords(text: &str, n: usize) -> Result<Keywords> {
    let vectorizer = TfidfVectorizer::fit(&[text], &TfidfConfig::default())?;
    let weights = vectorizer.transform(text);
    let names = vectorizer.feature_names();

    let mut ranked: Vec<Keyword> = names
        .into_iter()
        .zip(weights)
        .map(|(term, weight)| Keyword { term: term.to_string(), weight })
        .collect();

    ranked.sort_by(|a, b| b.weight.total_cmp(&a.weight).then_with(|| a.term.cmp(&b.term)));
    ranked.truncate(n);

    Ok(Keywords(ranked))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SeoscopeError;

    #[test]
    fn test_keywords_ranked_by_frequency() {
        let text = "Rust rust RUST compiler compiler borrow checker lifetimes";
        let keywords = extract_keywords(text, 3).unwrap();
        assert_eq!(keywords.terms(), vec!["rust", "compiler", "borrow"]);
    }

    #[test]
    fn test_weights_never_increase() {
        let text = "seo seo seo content content quality ranking ranking ranking ranking links";
        let keywords = extract_keywords(text, 5).unwrap();

        assert_eq!(keywords.joined(), "ranking|seo|content|links|quality");
        for pair in keywords.0.windows(2) {
            assert!(pair[0].weight >= pair[1].weight);
        }
        assert!(keywords.0[0].weight > keywords.0[1].weight);
    }

    #[test]
    fn test_short_input_returns_available_terms() {
        let keywords = extract_keywords("Hello world", 5).unwrap();
        assert_eq!(keywords.len(), 2);
        assert_eq!(keywords.joined(), "hello|world");
    }

    #[test]
    fn test_zero_requested() {
        assert!(extract_keywords("garden hose", 0).unwrap().is_empty());
    }

    #[test]
    fn test_degenerate_text_is_an_error() {
        assert!(matches!(extract_keywords("", 5), Err(SeoscopeError::EmptyVocabulary)));
        assert!(matches!(extract_keywords("it is what it is", 5), Err(SeoscopeError::EmptyVocabulary)));
    }
}
