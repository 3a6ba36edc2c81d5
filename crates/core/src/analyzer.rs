//! The end-to-end analysis pipeline.
//!
//! An [`Analyzer`] is built once from an [`AnalyzerConfig`]. It loads the
//! quality model (or settles on the heuristic) and the optional persisted
//! vectorizer up front, then runs fetch, parse, features, keywords,
//! classification and similarity search for each page it is given.

use std::path::{Path, PathBuf};

use crate::classifier::{QualityClassifier, QualityVerdict};
use crate::features::{FeatureVector, ReadingLevel, extract_features};
use crate::fetch::FetchConfig;
#[cfg(feature = "fetch")]
use crate::fetch::fetch_url;
use crate::keywords::{DEFAULT_KEYWORD_COUNT, Keywords, extract_keywords};
use crate::parse::{ParsedDocument, parse_html};
use crate::similarity::{DEFAULT_THRESHOLD, SimilarityMatch, find_similar};
use crate::vectorizer::{TfidfVectorizer, tfidf_vector};
use crate::{Result, SeoscopeError};

pub const DEFAULT_MODEL_PATH: &str = "models/quality_model.json";
pub const DEFAULT_ENCODER_PATH: &str = "models/label_encoder.json";
pub const DEFAULT_REFERENCE_PATH: &str = "data/features.csv";

/// Configuration for an [`Analyzer`].
///
/// # Example
///
/// ```rust
/// use seoscope_core::AnalyzerConfig;
///
/// let config = AnalyzerConfig::builder()
///     .timeout(5)
///     .threshold(0.8)
///     .keyword_count(10)
///     .build();
/// assert_eq!(config.fetch.timeout, 5);
/// ```
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// HTTP settings for [`Analyzer::analyze_url`].
    pub fetch: FetchConfig,

    /// Random forest model file (default: `models/quality_model.json`).
    pub model_path: PathBuf,

    /// Label encoder file (default: `models/label_encoder.json`).
    pub encoder_path: PathBuf,

    /// Reference corpus CSV (default: `data/features.csv`).
    pub reference_path: PathBuf,

    /// Persisted vectorizer; when unset each page is vectorized on its own vocabulary.
    pub vectorizer_path: Option<PathBuf>,

    /// Similarity threshold, exclusive (default: 0.70).
    pub threshold: f64,

    /// Number of keywords reported (default: 5).
    pub keyword_count: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            fetch: FetchConfig::default(),
            model_path: artifact_path(DEFAULT_MODEL_PATH),
            encoder_path: artifact_path(DEFAULT_ENCODER_PATH),
            reference_path: artifact_path(DEFAULT_REFERENCE_PATH),
            vectorizer_path: None,
            threshold: DEFAULT_THRESHOLD,
            keyword_count: DEFAULT_KEYWORD_COUNT,
        }
    }
}

impl AnalyzerConfig {
    pub fn builder() -> AnalyzerConfigBuilder {
        AnalyzerConfigBuilder::new()
    }
}

/// Builder for AnalyzerConfig.
pub struct AnalyzerConfigBuilder {
    config: AnalyzerConfig,
}

impl AnalyzerConfigBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self { config: AnalyzerConfig::default() }
    }

    /// Sets the request timeout in seconds.
    pub fn timeout(mut self, seconds: u64) -> Self {
        self.config.fetch.timeout = seconds;
        self
    }

    pub fn user_agent(mut self, value: impl Into<String>) -> Self {
        self.config.fetch.user_agent = value.into();
        self
    }

    pub fn model_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.model_path = path.into();
        self
    }

    pub fn encoder_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.encoder_path = path.into();
        self
    }

    /// Points both model artifacts at their standard names inside `dir`.
    pub fn model_dir(mut self, dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        self.config.model_path = dir.join("quality_model.json");
        self.config.encoder_path = dir.join("label_encoder.json");
        self
    }

    pub fn reference_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.reference_path = path.into();
        self
    }

    pub fn vectorizer_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.vectorizer_path = Some(path.into());
        self
    }

    pub fn threshold(mut self, value: f64) -> Self {
        self.config.threshold = value;
        self
    }

    pub fn keyword_count(mut self, value: usize) -> Self {
        self.config.keyword_count = value;
        self
    }

    /// Builds the config.
    pub fn build(self) -> AnalyzerConfig {
        self.config
    }
}

impl Default for AnalyzerConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolves a default artifact location.
///
/// A path that exists relative to the working directory wins; otherwise the
/// same relative path under the user config directory (`~/.config/seoscope`
/// on Linux) is used if it exists. Falls back to the relative path.
fn artifact_path(relative: &str) -> PathBuf {
    let local = PathBuf::from(relative);
    if local.exists() {
        return local;
    }

    dirs::config_dir()
        .map(|dir| dir.join("seoscope").join(relative))
        .filter(|candidate| candidate.exists())
        .unwrap_or(local)
}

/// Everything learned about one page.
#[derive(Debug, Clone)]
pub struct Analysis {
    /// Page URL, or the input label for local files.
    pub url: String,
    pub document: ParsedDocument,
    pub features: FeatureVector,
    /// Empty when the text had no usable terms.
    pub keywords: Keywords,
    /// `None` when the trained model failed on this page.
    pub quality: Option<QualityVerdict>,
    /// Why `quality` is missing.
    pub quality_error: Option<String>,
    pub similar: Vec<SimilarityMatch>,
}

impl Analysis {
    pub fn title(&self) -> &str {
        &self.document.title
    }

    pub fn reading_level(&self) -> ReadingLevel {
        self.features.reading_level()
    }
}

/// Runs the analysis pipeline with preloaded artifacts.
///
/// Holds no mutable state, so one instance can serve concurrent requests
/// behind an `Arc`.
#[derive(Debug, Clone)]
pub struct Analyzer {
    config: AnalyzerConfig,
    classifier: QualityClassifier,
    vectorizer: Option<TfidfVectorizer>,
}

impl Analyzer {
    /// Loads artifacts named by `config`.
    ///
    /// A missing or broken model falls back to the heuristic classifier.
    ///
    /// # Errors
    ///
    /// Fails only when `config.vectorizer_path` is set and cannot be loaded.
    pub fn new(config: AnalyzerConfig) -> Result<Self> {
        let classifier = QualityClassifier::load(&config.model_path, &config.encoder_path);
        Self::with_classifier(config, classifier)
    }

    /// Uses `classifier` instead of loading one from `config`'s model paths.
    pub fn with_classifier(config: AnalyzerConfig, classifier: QualityClassifier) -> Result<Self> {
        let vectorizer = config.vectorizer_path.as_deref().map(TfidfVectorizer::load).transpose()?;

        tracing::debug!(
            trained = classifier.is_trained(),
            persisted_vectorizer = vectorizer.is_some(),
            reference = %config.reference_path.display(),
            "analyzer ready"
        );

        Ok(Self { config, classifier, vectorizer })
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn classifier(&self) -> &QualityClassifier {
        &self.classifier
    }

    /// Fetches `url` and analyzes the response.
    ///
    /// # Errors
    ///
    /// Halts on an invalid URL, any fetch failure, or a page with no readable
    /// content. See [`analyze_html`](Self::analyze_html).
    #[cfg(feature = "fetch")]
    pub async fn analyze_url(&self, url: &str) -> Result<Analysis> {
        let raw = fetch_url(url, &self.config.fetch).await?;
        self.analyze_html(&raw, url)
    }

    /// Analyzes raw HTML already in hand.
    ///
    /// Keyword extraction and similarity search degrade to empty results on
    /// failure. A model failure leaves `quality` empty and records the reason.
    ///
    /// # Errors
    ///
    /// - [`SeoscopeError::NoBodyFound`] when the page has no content region
    /// - [`SeoscopeError::NoContent`] when the content region has no words
    pub fn analyze_html(&self, raw: &[u8], url: &str) -> Result<Analysis> {
        let document = parse_html(raw)?;
        if document.word_count == 0 {
            return Err(SeoscopeError::NoContent);
        }
        let text = document.body_text.as_str();

        let features = extract_features(text);
        tracing::debug!(
            url,
            words = features.word_count,
            sentences = features.sentence_count,
            flesch = features.flesch_reading_ease,
            "extracted features"
        );

        let keywords = extract_keywords(text, self.config.keyword_count).unwrap_or_else(|e| {
            tracing::warn!(url, error = %e, "keyword extraction failed");
            Keywords::default()
        });

        let (quality, quality_error) = match self.classifier.classify(&features) {
            Ok(verdict) => (Some(verdict), None),
            Err(e) => {
                tracing::warn!(url, error = %e, "quality classification failed");
                (None, Some(e.to_string()))
            }
        };

        let similar = match self.vectorize(text) {
            Ok(vector) => find_similar(&vector, &self.config.reference_path, self.config.threshold),
            Err(e) => {
                tracing::warn!(url, error = %e, "vectorization failed, skipping similarity search");
                Vec::new()
            }
        };

        Ok(Analysis { url: url.to_string(), document, features, keywords, quality, quality_error, similar })
    }

    fn vectorize(&self, text: &str) -> Result<Vec<f64>> {
        match &self.vectorizer {
            Some(vectorizer) => Ok(vectorizer.transform(text)),
            None => tfidf_vector(text, None).map(|(vector, _)| vector),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{QualityLabel, VerdictSource};
    use crate::vectorizer::TfidfConfig;
    use std::fs;

    const SENTENCE: &str = "The big cat sat on the red mat by the garden window paper river yellow basket silver morning button pencil.";

    fn page(body: &str) -> String {
        format!("<html><head><title>Sample</title></head><body><main><p>{body}</p></main></body></html>")
    }

    fn heuristic_analyzer(dir: &Path) -> Analyzer {
        let config = AnalyzerConfig::builder().reference_path(dir.join("features.csv")).build();
        Analyzer::with_classifier(config, QualityClassifier::Heuristic).unwrap()
    }

    #[test]
    fn test_builder_defaults() {
        let config = AnalyzerConfig::builder().build();
        assert_eq!(config.threshold, DEFAULT_THRESHOLD);
        assert_eq!(config.keyword_count, 5);
        assert_eq!(config.fetch.timeout, 10);
        assert!(config.model_path.ends_with("models/quality_model.json"));
        assert!(config.vectorizer_path.is_none());
    }

    #[test]
    fn test_builder_model_dir() {
        let config = AnalyzerConfig::builder().model_dir("/opt/seoscope").build();
        assert_eq!(config.model_path, PathBuf::from("/opt/seoscope/quality_model.json"));
        assert_eq!(config.encoder_path, PathBuf::from("/opt/seoscope/label_encoder.json"));
    }

    #[test]
    fn test_long_standard_page_is_high_quality() {
        let dir = tempfile::tempdir().unwrap();
        let analyzer = heuristic_analyzer(dir.path());
        let html = page(&vec![SENTENCE; 100].join(" "));

        let analysis = analyzer.analyze_html(html.as_bytes(), "https://example.com/guide").unwrap();

        assert_eq!(analysis.title(), "Sample");
        assert_eq!(analysis.features.word_count, 2000);
        assert_eq!(analysis.features.sentence_count, 100);
        assert!(!analysis.features.is_thin);
        let quality = analysis.quality.unwrap();
        assert_eq!(quality.label, QualityLabel::High);
        assert_eq!(quality.source, VerdictSource::Heuristic);
        assert_eq!(analysis.keywords.len(), 5);
        assert!(analysis.similar.is_empty());
    }

    #[test]
    fn test_short_page_is_thin_and_low() {
        let dir = tempfile::tempdir().unwrap();
        let analyzer = heuristic_analyzer(dir.path());

        let analysis = analyzer.analyze_html(page(SENTENCE).as_bytes(), "local").unwrap();
        assert!(analysis.features.is_thin);
        assert_eq!(analysis.quality.unwrap().label, QualityLabel::Low);
    }

    #[test]
    fn test_no_body_halts() {
        let dir = tempfile::tempdir().unwrap();
        let analyzer = heuristic_analyzer(dir.path());

        let result = analyzer.analyze_html(b"<p>no landmarks</p>", "local");
        assert!(matches!(result, Err(SeoscopeError::NoBodyFound)));
    }

    #[test]
    fn test_empty_body_halts() {
        let dir = tempfile::tempdir().unwrap();
        let analyzer = heuristic_analyzer(dir.path());

        let result = analyzer.analyze_html(b"<html><body><script>x()</script></body></html>", "local");
        assert!(matches!(result, Err(SeoscopeError::NoContent)));
    }

    #[test]
    fn test_stop_word_page_degrades_keywords() {
        let dir = tempfile::tempdir().unwrap();
        let analyzer = heuristic_analyzer(dir.path());

        let analysis = analyzer.analyze_html(page("It is what it is.").as_bytes(), "local").unwrap();
        assert!(analysis.keywords.is_empty());
        assert!(analysis.similar.is_empty());
        assert!(analysis.quality.is_some());
    }

    #[test]
    fn test_similarity_with_persisted_vectorizer() {
        let dir = tempfile::tempdir().unwrap();
        let docs = ["garden hose watering plants garden", "kitchen sink plumbing repair"];
        let vectorizer = TfidfVectorizer::fit(&docs, &TfidfConfig::default()).unwrap();
        let vectorizer_path = dir.path().join("vectorizer.json");
        vectorizer.save(&vectorizer_path).unwrap();

        let mut csv = String::from("url,title,embedding\n");
        for (i, doc) in docs.iter().enumerate() {
            let embedding = serde_json::to_string(&vectorizer.transform(doc)).unwrap();
            csv.push_str(&format!("https://ref.test/{i},Ref {i},\"{embedding}\"\n"));
        }
        let reference_path = dir.path().join("features.csv");
        fs::write(&reference_path, csv).unwrap();

        let config = AnalyzerConfig::builder()
            .reference_path(&reference_path)
            .vectorizer_path(&vectorizer_path)
            .build();
        let analyzer = Analyzer::with_classifier(config, QualityClassifier::Heuristic).unwrap();

        let analysis = analyzer.analyze_html(page(docs[0]).as_bytes(), "local").unwrap();
        assert_eq!(analysis.similar.len(), 1);
        assert_eq!(analysis.similar[0].url, "https://ref.test/0");
        assert_eq!(analysis.similar[0].title, "Ref 0");
        assert_eq!(analysis.similar[0].similarity, 1.0);
    }

    #[test]
    fn test_missing_vectorizer_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = AnalyzerConfig::builder().vectorizer_path(dir.path().join("missing.json")).build();
        assert!(matches!(
            Analyzer::with_classifier(config, QualityClassifier::Heuristic),
            Err(SeoscopeError::FileNotFound(_))
        ));
    }
}
