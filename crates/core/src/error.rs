//! Error types for Scanwise operations.
//!
//! The analysis path itself never fails: invalid selectors, broken patterns and
//! failing predicates all degrade to "no signal". [`ScanwiseError`] covers the
//! edges around it: loading documents, loading preset files and strict
//! selector compilation.
//!
//! # Example
//!
//! ```rust
//! use scanwise_core::{ScanwiseError, Result};
//!
//! fn load_document(html: &str) -> Result<String> {
//!     if html.is_empty() {
//!         return Err(ScanwiseError::EmptyDocument);
//!     }
//!     Ok(html.to_string())
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Scanwise.
#[derive(Error, Debug)]
pub enum ScanwiseError {
    /// HTTP request errors from reqwest.
    #[cfg(feature = "fetch")]
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Request timeout.
    ///
    /// Returned when an HTTP request exceeds the configured timeout duration.
    #[error("Request timed out after {timeout} seconds")]
    Timeout { timeout: u64 },

    /// Invalid URL provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// A CSS selector could not be compiled.
    ///
    /// Only surfaced by the strict constructors; the analysis path treats
    /// invalid selectors as matching nothing.
    #[error("Invalid selector `{selector}`: {reason}")]
    InvalidSelector { selector: String, reason: String },

    /// The input document had no content at all.
    #[error("Document is empty")]
    EmptyDocument,

    /// File not found.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// I/O errors while reading input or writing output.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A preset file could not be parsed.
    #[error("Failed to parse preset {path}: {source}")]
    PresetParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// No built-in or on-disk preset exists with this id.
    #[error("Unknown preset: {0}")]
    UnknownPreset(String),

    /// Serialization of an analysis result failed.
    #[error("Serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result type alias for [`ScanwiseError`].
pub type Result<T> = std::result::Result<T, ScanwiseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ScanwiseError::InvalidUrl("not a url".to_string());
        assert!(err.to_string().contains("Invalid URL"));
    }

    #[test]
    fn test_invalid_selector_error() {
        let err = ScanwiseError::InvalidSelector { selector: "[[p".to_string(), reason: "unexpected token".to_string() };
        assert!(err.to_string().contains("[[p"));
        assert!(err.to_string().contains("unexpected token"));
    }

    #[test]
    fn test_unknown_preset_error() {
        let err = ScanwiseError::UnknownPreset("wiki".to_string());
        assert_eq!(err.to_string(), "Unknown preset: wiki");
    }

    #[test]
    fn test_timeout_error() {
        let err = ScanwiseError::Timeout { timeout: 30 };
        assert!(err.to_string().contains("30"));
    }
}
