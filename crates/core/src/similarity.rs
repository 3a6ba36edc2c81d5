//! Near-duplicate search against a reference corpus.
//!
//! The corpus is a CSV file with `url`, `title` and `embedding` columns, where
//! each embedding is a JSON array of numbers. The file is read in full on every
//! query.
//!
//! Missing or unreadable reference data is reported as "no similar content":
//! [`find_similar`] returns an empty list and logs the cause. Use
//! [`try_find_similar`] to see the error instead.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Result, SeoscopeError};

/// Default minimum similarity; matches must be strictly above it.
pub const DEFAULT_THRESHOLD: f64 = 0.70;

/// At most this many matches are returned.
pub const MAX_MATCHES: usize = 5;

const UNKNOWN_TITLE: &str = "Unknown";

/// A reference page that closely resembles the query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarityMatch {
    pub url: String,
    /// Cosine similarity rounded to two decimals.
    pub similarity: f64,
    pub title: String,
}

#[derive(Debug, Deserialize)]
struct ReferenceRow {
    url: String,
    #[serde(default)]
    title: Option<String>,
    embedding: String,
}

/// Cosine similarity of two vectors.
///
/// Returns `0.0` for empty vectors, vectors of different lengths, or when
/// either vector has zero norm.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0;
    let mut norm_a = 0.0;
    let mut norm_b = 0.0;

    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < f64::EPSILON {
        return 0.0;
    }

    dot / denom
}

/// Finds reference pages more similar to `vector` than `threshold`.
///
/// Any problem with the reference data yields an empty list.
pub fn find_similar(vector: &[f64], reference_path: &Path, threshold: f64) -> Vec<SimilarityMatch> {
    match try_find_similar(vector, reference_path, threshold) {
        Ok(matches) => matches,
        Err(SeoscopeError::FileNotFound(path)) => {
            tracing::debug!(path = %path.display(), "no reference corpus");
            Vec::new()
        }
        Err(e) => {
            tracing::warn!(error = %e, "similarity search skipped");
            Vec::new()
        }
    }
}

/// Like [`find_similar`], but reports why the reference data was unusable.
///
/// # Errors
///
/// - [`SeoscopeError::FileNotFound`] when the corpus file does not exist
/// - [`SeoscopeError::ReferenceError`] for a missing column, a malformed
///   embedding, or an embedding whose length differs from the query's
pub fn try_find_similar(vector: &[f64], reference_path: &Path, threshold: f64) -> Result<Vec<SimilarityMatch>> {
    if !reference_path.exists() {
        return Err(SeoscopeError::FileNotFound(reference_path.to_path_buf()));
    }

    let mut reader = csv::Reader::from_path(reference_path)?;

    let headers = reader.headers()?;
    if !headers.iter().any(|h| h == "embedding") {
        return Err(SeoscopeError::ReferenceError("corpus has no 'embedding' column".to_string()));
    }

    let mut scored = Vec::new();
    for (line, row) in reader.deserialize::<ReferenceRow>().enumerate() {
        let row = row?;
        let embedding: Vec<f64> = serde_json::from_str(&row.embedding)
            .map_err(|e| SeoscopeError::ReferenceError(format!("row {}: bad embedding: {e}", line + 1)))?;

        if embedding.len() != vector.len() {
            return Err(SeoscopeError::ReferenceError(format!(
                "row {} has {} dimensions, query has {}",
                line + 1,
                embedding.len(),
                vector.len()
            )));
        }

        let score = cosine_similarity(vector, &embedding);
        if score > threshold {
            let title = row.title.filter(|t| !t.is_empty()).unwrap_or_else(|| UNKNOWN_TITLE.to_string());
            scored.push((score, row.url, title));
        }
    }

    scored.sort_by(|a, b| b.0.total_cmp(&a.0));
    scored.truncate(MAX_MATCHES);

    tracing::debug!(matches = scored.len(), "similarity search complete");

    Ok(scored
        .into_iter()
        .map(|(score, url, title)| SimilarityMatch { url, similarity: round2(score), title })
        .collect())
}

/// Rounds to two decimals, the precision used in exports.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
