//! Loading HTML from URLs, files, and stdin.
//!
//! URL fetching needs the `fetch` feature; files and stdin are always
//! available.

use std::fs;
use std::path::Path;
#[cfg(feature = "fetch")]
use std::time::Duration;

#[cfg(feature = "fetch")]
use reqwest::Client;
#[cfg(feature = "fetch")]
use url::Url;

use crate::{Result, ScanwiseError};

/// HTTP client configuration for fetching pages.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Request timeout in seconds.
    pub timeout: u64,
    /// User-Agent header sent with every request.
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: 30,
            user_agent: format!("Mozilla/5.0 (compatible; Scanwise/{})", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Where an input document comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    Url(String),
    File(String),
    Stdin,
}

impl InputSource {
    /// `-` is stdin, anything with an http(s) scheme is a URL, the rest are paths.
    pub fn detect(input: &str) -> Self {
        if input == "-" {
            Self::Stdin
        } else if input.starts_with("http://") || input.starts_with("https://") {
            Self::Url(input.to_string())
        } else {
            Self::File(input.to_string())
        }
    }

    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Url(url) => Some(url),
            _ => None,
        }
    }
}

/// Fetches the body of `url` as text.
///
/// Follows redirects and honours the configured timeout.
#[cfg(feature = "fetch")]
pub async fn fetch_url(url: &str, config: &FetchConfig) -> Result<String> {
    let parsed_url = Url::parse(url).map_err(|e| ScanwiseError::InvalidUrl(e.to_string()))?;

    if !matches!(parsed_url.scheme(), "http" | "https") {
        return Err(ScanwiseError::InvalidUrl(format!("unsupported scheme: {}", parsed_url.scheme())));
    }

    let client = Client::builder()
        .timeout(Duration::from_secs(config.timeout))
        .build()
        .map_err(ScanwiseError::HttpError)?;

    tracing::debug!(url = %parsed_url, timeout = config.timeout, "fetching");

    let response = client
        .get(parsed_url)
        .header("User-Agent", &config.user_agent)
        .header("Accept", "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8")
        .header("Accept-Language", "en-US,en;q=0.9")
        .send()
        .await
        .map_err(|e| {
            if e.is_timeout() { ScanwiseError::Timeout { timeout: config.timeout } } else { ScanwiseError::HttpError(e) }
        })?
        .error_for_status()?;

    Ok(response.text().await?)
}

/// Reads HTML from a local file.
pub fn fetch_file(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();

    if !path.exists() {
        Err(ScanwiseError::FileNotFound(path.to_path_buf()))
    } else {
        fs::read_to_string(path).map_err(ScanwiseError::from)
    }
}

/// Reads HTML from standard input until EOF.
pub fn fetch_stdin() -> Result<String> {
    use std::io::{self, Read};

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;

    Ok(buffer)
}

/// Loads `source` with the matching fetcher.
#[cfg(feature = "fetch")]
pub async fn fetch_input(source: &InputSource, config: &FetchConfig) -> Result<String> {
    match source {
        InputSource::Url(url) => fetch_url(url, config).await,
        InputSource::File(path) => fetch_file(path),
        InputSource::Stdin => fetch_stdin(),
    }
}
