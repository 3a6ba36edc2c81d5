//! Error types for seoscope operations.
//!
//! This module defines the main error type [`SeoscopeError`] which represents
//! every failure a pipeline stage can report: fetching, parsing, term
//! weighting, classification, and reference corpus loading.
//!
//! # Example
//!
//! ```rust
//! use seoscope_core::{SeoscopeError, Result};
//!
//! fn require_text(text: &str) -> Result<&str> {
//!     if text.is_empty() {
//!         return Err(SeoscopeError::NoContent);
//!     }
//!     Ok(text)
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for analysis operations.
///
/// Network and parse variants halt an analysis. The remaining variants are
/// produced by stages whose failures the [`Analyzer`](crate::Analyzer)
/// downgrades to empty or missing results.
///
/// # Example
///
/// ```rust
/// use seoscope_core::{SeoscopeError, parse_html};
///
/// match parse_html(b"<p>no landmarks here</p>") {
///     Ok(doc) => println!("{} words", doc.word_count),
///     Err(SeoscopeError::NoBodyFound) => println!("no content region"),
///     Err(e) => println!("Error: {}", e),
/// }
/// ```
#[derive(Error, Debug)]
pub enum SeoscopeError {
    /// HTTP request errors from reqwest.
    ///
    /// Wraps DNS failures, refused connections, TLS problems and body read
    /// errors.
    #[cfg(feature = "fetch")]
    #[error("Request error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Request timeout.
    ///
    /// Returned when an HTTP request exceeds the configured timeout duration.
    #[error("Request timed out after {timeout} seconds")]
    Timeout { timeout: u64 },

    /// The server answered with something other than `200 OK`.
    #[error("Failed to fetch (status {status})")]
    StatusError { status: u16 },

    /// Invalid URL provided.
    ///
    /// Returned when a URL cannot be parsed or does not use http(s).
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// HTML parsing errors.
    #[error("Failed to parse HTML: {0}")]
    HtmlParseError(String),

    /// None of `<main>`, `<article>` or `<body>` is present in the markup.
    #[error("No body content found")]
    NoBodyFound,

    /// The content region was found but holds no words.
    #[error("No content could be extracted from the document")]
    NoContent,

    /// Term weighting produced no vocabulary.
    ///
    /// Happens for empty text, or text made only of stop words and
    /// single-character tokens.
    #[error("Empty vocabulary; the document may only contain stop words")]
    EmptyVocabulary,

    /// A pretrained model or label encoder is malformed or disagrees with its input.
    #[error("Model error: {0}")]
    ModelError(String),

    /// The reference corpus could not be read or decoded.
    #[error("Reference corpus error: {0}")]
    ReferenceError(String),

    /// File not found.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// I/O errors while reading inputs or writing reports.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Report serialization errors.
    #[error("Serialization error: {0}")]
    SerializeError(#[from] serde_json::Error),
}

impl From<csv::Error> for SeoscopeError {
    fn from(err: csv::Error) -> Self {
        SeoscopeError::ReferenceError(err.to_string())
    }
}

impl SeoscopeError {
    /// Whether this error came from the network stage.
    pub fn is_fetch_error(&self) -> bool {
        match self {
            #[cfg(feature = "fetch")]
            SeoscopeError::HttpError(_) => true,
            SeoscopeError::Timeout { .. } | SeoscopeError::StatusError { .. } => true,
            _ => false,
        }
    }
}

/// Result type alias for SeoscopeError.
///
/// This is a convenience alias for `std::result::Result<T, SeoscopeError>`.
pub type Result<T> = std::result::Result<T, SeoscopeError>;
