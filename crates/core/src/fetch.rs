//! Content fetching from URLs, files, and stdin.
//!
//! Every source yields raw bytes; decoding happens in [`crate::parse`].

use std::fs;
use std::path::PathBuf;

#[cfg(feature = "fetch")]
use std::time::Duration;

#[cfg(feature = "fetch")]
use reqwest::{Client, StatusCode};
use url::Url;

use crate::{Result, SeoscopeError};

/// Desktop Chrome identity; some sites serve stripped markup to unknown agents.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// HTTP client configuration for fetching web pages.
///
/// This struct controls timeout and user agent settings for HTTP requests.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Request timeout in seconds.
    pub timeout: u64,
    /// User-Agent header sent with every request.
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self { timeout: 10, user_agent: DEFAULT_USER_AGENT.to_string() }
    }
}

/// Checks that `url` is absolute and uses http or https.
pub fn validate_url(url: &str) -> Result<Url> {
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(SeoscopeError::InvalidUrl(
            "URL must start with http:// or https://".to_string(),
        ));
    }

    Url::parse(url).map_err(|e| SeoscopeError::InvalidUrl(e.to_string()))
}

/// Fetches the raw body of a URL.
///
/// Performs a single GET request (no retries). Anything other than `200 OK`
/// is reported as [`SeoscopeError::StatusError`], an elapsed timeout as
/// [`SeoscopeError::Timeout`], and any other transport problem as
/// [`SeoscopeError::HttpError`].
#[cfg(feature = "fetch")]
pub async fn fetch_url(url: &str, config: &FetchConfig) -> Result<Vec<u8>> {
    let parsed_url = validate_url(url)?;

    let client = Client::builder()
        .timeout(Duration::from_secs(config.timeout))
        .build()
        .map_err(SeoscopeError::HttpError)?;

    let to_error = |e: reqwest::Error| {
        if e.is_timeout() { SeoscopeError::Timeout { timeout: config.timeout } } else { SeoscopeError::HttpError(e) }
    };

    let response = client
        .get(parsed_url)
        .header("User-Agent", &config.user_agent)
        .send()
        .await
        .map_err(to_error)?;

    let status = response.status();
    if status != StatusCode::OK {
        tracing::debug!(url, status = status.as_u16(), "non-200 response");
        return Err(SeoscopeError::StatusError { status: status.as_u16() });
    }

    let content = response.bytes().await.map_err(to_error)?;
    tracing::debug!(url, bytes = content.len(), "fetched page");

    Ok(content.to_vec())
}

/// Reads HTML content from a local file.
///
/// Callers should validate and sanitize the path when accepting user input.
pub fn fetch_file(path: &str) -> Result<Vec<u8>> {
    let path_buf = PathBuf::from(path);

    if !path_buf.exists() { Err(SeoscopeError::FileNotFound(path_buf)) } else { Ok(fs::read(&path_buf)?) }
}

/// Reads HTML content from standard input until EOF.
pub fn fetch_stdin() -> Result<Vec<u8>> {
    use std::io::{self, Read};

    let mut buffer = Vec::new();
    io::stdin().read_to_end(&mut buffer)?;

    Ok(buffer)
}
