//! Export formats for an [`Analysis`](crate::Analysis).
//!
//! [`AnalysisReport`] is the flat export record. Its fields serialize in a
//! fixed order so downstream consumers can rely on the layout.

pub mod json;
pub mod text;

pub use json::{JsonConfig, JsonFormatter, convert_to_json};
pub use text::{TextConfig, TextFormatter, convert_to_text};

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::analyzer::Analysis;
use crate::classifier::{QualityLabel, VerdictSource};
use crate::similarity::{SimilarityMatch, round2};

/// Flat export record of one analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub url: String,
    pub title: String,
    pub word_count: usize,
    pub sentence_count: usize,
    /// Flesch Reading Ease rounded to two decimals.
    pub readability_score: f64,
    /// `null` when classification failed.
    pub quality_label: Option<QualityLabel>,
    pub is_thin_content: bool,
    /// Keywords joined with `|`.
    pub top_keywords: String,
    pub similar_content: Vec<SimilarityMatch>,
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub details: Option<ReportDetails>,
}

/// Extra fields appended when details are requested.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportDetails {
    pub reading_level: String,
    pub quality_source: Option<VerdictSource>,
    pub quality_probabilities: RankedProbabilities,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality_error: Option<String>,
}

/// Label probabilities, most likely first; serialized as an ordered map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RankedProbabilities(pub Vec<(QualityLabel, f64)>);

impl Serialize for RankedProbabilities {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (label, probability) in &self.0 {
            map.serialize_entry(label.as_str(), probability)?;
        }
        map.end()
    }
}

impl AnalysisReport {
    /// Builds the export record, optionally with the detail fields.
    pub fn new(analysis: &Analysis, include_details: bool) -> Self {
        let details = include_details.then(|| ReportDetails {
            reading_level: analysis.reading_level().to_string(),
            quality_source: analysis.quality.as_ref().map(|q| q.source),
            quality_probabilities: RankedProbabilities(
                analysis.quality.as_ref().map(|q| q.ranked_probabilities()).unwrap_or_default(),
            ),
            quality_error: analysis.quality_error.clone(),
        });

        Self {
            url: analysis.url.clone(),
            title: analysis.document.title.clone(),
            word_count: analysis.features.word_count,
            sentence_count: analysis.features.sentence_count,
            readability_score: round2(analysis.features.flesch_reading_ease),
            quality_label: analysis.quality.as_ref().map(|q| q.label),
            is_thin_content: analysis.features.is_thin,
            top_keywords: analysis.keywords.joined(),
            similar_content: analysis.similar.clone(),
            details,
        }
    }
}

impl From<&Analysis> for AnalysisReport {
    fn from(analysis: &Analysis) -> Self {
        Self::new(analysis, false)
    }
}
