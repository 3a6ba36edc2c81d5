//! TF-IDF term weighting.
//!
//! Mirrors the defaults of scikit-learn's `TfidfVectorizer` with
//! `stop_words="english"`: lowercase tokens of two or more word characters,
//! English stop words removed, a vocabulary capped by corpus frequency,
//! smoothed IDF and L2-normalized rows. A fitted vectorizer serializes to JSON
//! so a vector space can be shared with a reference corpus.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::stop_words::is_stop_word;
use crate::{Result, SeoscopeError};

static TOKEN_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\w\w+\b").unwrap());

/// Settings applied when fitting a vocabulary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfidfConfig {
    /// Keep at most this many terms, the most frequent first.
    pub max_features: usize,
    /// Drop English stop words.
    pub remove_stop_words: bool,
}

impl Default for TfidfConfig {
    fn default() -> Self {
        Self { max_features: 1000, remove_stop_words: true }
    }
}

/// A fitted vocabulary with per-term inverse document frequencies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    #[serde(default)]
    pub config: TfidfConfig,
    /// Term to column index; columns follow alphabetical term order.
    pub vocabulary: BTreeMap<String, usize>,
    /// Inverse document frequency per column.
    pub idf: Vec<f64>,
}

impl TfidfVectorizer {
    /// Learns vocabulary and IDF weights from a set of documents.
    ///
    /// # Errors
    ///
    /// Returns [`SeoscopeError::EmptyVocabulary`] when no document has a
    /// usable term.
    pub fn fit(documents: &[&str], config: &TfidfConfig) -> Result<Self> {
        let mut term_frequency: HashMap<String, usize> = HashMap::new();
        let mut document_frequency: HashMap<String, usize> = HashMap::new();

        for doc in documents {
            let counts = count_terms(doc, config);
            for (term, count) in counts {
                *term_frequency.entry(term.clone()).or_default() += count;
                *document_frequency.entry(term).or_default() += 1;
            }
        }

        if term_frequency.is_empty() {
            return Err(SeoscopeError::EmptyVocabulary);
        }

        let mut ranked: Vec<(String, usize)> = term_frequency.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(config.max_features);

        let mut terms: Vec<String> = ranked.into_iter().map(|(term, _)| term).collect();
        terms.sort();

        let n = documents.len() as f64;
        let idf = terms
            .iter()
            .map(|term| {
                let df = document_frequency.get(term).copied().unwrap_or(0) as f64;
                ((1.0 + n) / (1.0 + df)).ln() + 1.0
            })
            .collect();

        let vocabulary = terms.into_iter().enumerate().map(|(index, term)| (term, index)).collect();

        Ok(Self { config: config.clone(), vocabulary, idf })
    }

    /// Maps a document into this vectorizer's space without refitting.
    ///
    /// Terms outside the vocabulary are ignored; a document with none of the
    /// vocabulary's terms maps to the zero vector.
    pub fn transform(&self, document: &str) -> Vec<f64> {
        let mut vector = vec![0.0; self.idf.len()];

        for (term, count) in count_terms(document, &self.config) {
            if let Some(&index) = self.vocabulary.get(&term)
                && let Some(weight) = self.idf.get(index)
            {
                vector[index] = count as f64 * weight;
            }
        }

        let norm = vector.iter().map(|x| x * x).sum::<f64>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|x| *x /= norm);
        }

        vector
    }

    /// Term for each column, in column order.
    pub fn feature_names(&self) -> Vec<&str> {
        let mut names = vec![""; self.vocabulary.len()];
        for (term, &index) in &self.vocabulary {
            if let Some(slot) = names.get_mut(index) {
                *slot = term.as_str();
            }
        }
        names
    }

    pub fn dimension(&self) -> usize {
        self.idf.len()
    }

    /// Loads a vectorizer previously written with [`save`](Self::save).
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(SeoscopeError::FileNotFound(path.to_path_buf()));
        }
        let vectorizer: Self = serde_json::from_str(&fs::read_to_string(path)?)?;

        if vectorizer.vocabulary.len() != vectorizer.idf.len()
            || vectorizer.vocabulary.values().any(|&i| i >= vectorizer.idf.len())
        {
            return Err(SeoscopeError::ModelError(format!(
                "vectorizer at {} has {} terms but {} idf weights",
                path.display(),
                vectorizer.vocabulary.len(),
                vectorizer.idf.len()
            )));
        }

        Ok(vectorizer)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, serde_json::to_string(self)?)?;
        Ok(())
    }
}

/// Produces the TF-IDF vector used for similarity search.
///
/// With no vectorizer, a fresh one is fit on this single document. A supplied
/// vectorizer is only used to transform, never refit, so the vector stays in
/// the space the vectorizer was trained in. The vectorizer that was used is
/// returned alongside the vector.
pub fn tfidf_vector(text: &str, fitted: Option<TfidfVectorizer>) -> Result<(Vec<f64>, TfidfVectorizer)> {
    let vectorizer = match fitted {
        Some(vectorizer) => vectorizer,
        None => TfidfVectorizer::fit(&[text], &TfidfConfig::default())?,
    };

    let vector = vectorizer.transform(text);
    Ok((vector, vectorizer))
}

fn count_terms(document: &str, config: &TfidfConfig) -> HashMap<String, usize> {
    let lowered = document.to_lowercase();
    let mut counts = HashMap::new();

    for m in TOKEN_PATTERN.find_iter(&lowered) {
        let token = m.as_str();
        if config.remove_stop_words && is_stop_word(token) {
            continue;
        }
        *counts.entry(token.to_string()).or_default() += 1;
    }

    counts
}
