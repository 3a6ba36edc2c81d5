pub mod analyzer;
pub mod classifier;
pub mod error;
pub mod features;
pub mod fetch;
pub mod keywords;
pub mod parse;
pub mod report;
pub mod similarity;
pub mod stop_words;
pub mod vectorizer;

pub use analyzer::{Analysis, Analyzer, AnalyzerConfig, AnalyzerConfigBuilder};
pub use classifier::{
    ForestModel, LabelEncoder, QualityClassifier, QualityLabel, QualityVerdict, VerdictSource, heuristic_label,
};
pub use error::{Result, SeoscopeError};
pub use features::{FeatureVector, ReadingLevel, count_syllables, extract_features, flesch_reading_ease};
pub use fetch::{FetchConfig, validate_url};
#[cfg(feature = "fetch")]
pub use fetch::fetch_url;
pub use fetch::{fetch_file, fetch_stdin};
pub use keywords::{Keyword, Keywords, extract_keywords};
pub use parse::{Document, ParsedDocument, parse_html};
pub use report::{AnalysisReport, JsonConfig, JsonFormatter, TextConfig, TextFormatter};
pub use report::{convert_to_json, convert_to_text};
pub use similarity::{SimilarityMatch, cosine_similarity, find_similar, try_find_similar};
pub use vectorizer::{TfidfConfig, TfidfVectorizer, tfidf_vector};
