//! Error types for the OCR module.
//!
//! Structured errors for the OCR tool client, the MediaWiki action API
//! wrapper, and the bulk workflow, with context-rich messages for user
//! notifications.

use thiserror::Error;

/// Errors that can occur talking to the OCR tool or the MediaWiki API.
#[derive(Debug, Error)]
pub enum OcrError {
    /// Network-level error (DNS, connection refused, TLS, timeout).
    #[error("network error requesting {url}: {source}")]
    Http {
        /// The URL that failed.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// The OCR tool answered with its error envelope (`{"error": ...}`).
    #[error("OCR tool error: {message}")]
    Tool {
        /// The tool's error message.
        message: String,
    },

    /// The OCR tool answered successfully but recognized no text.
    #[error("no text recognized in image")]
    NoText,

    /// The MediaWiki API answered with its error envelope.
    #[error("MediaWiki API error {code}: {info}")]
    MwApi {
        /// Machine-readable error code, e.g. `articleexists`.
        code: String,
        /// Human-readable description.
        info: String,
    },

    /// A response parsed but did not have the expected shape.
    #[error("malformed API response from {url}: {message}")]
    BadResponse {
        /// The URL that produced the response.
        url: String,
        /// What was missing or wrong.
        message: String,
    },
}

impl OcrError {
    /// Creates a network error.
    pub fn http(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Http {
            url: url.into(),
            source,
        }
    }

    /// Creates an OCR tool error.
    pub fn tool(message: impl Into<String>) -> Self {
        Self::Tool {
            message: message.into(),
        }
    }

    /// Creates a MediaWiki API error.
    pub fn mw_api(code: impl Into<String>, info: impl Into<String>) -> Self {
        Self::MwApi {
            code: code.into(),
            info: info.into(),
        }
    }

    /// Creates a malformed-response error.
    pub fn bad_response(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::BadResponse {
            url: url.into(),
            message: message.into(),
        }
    }
}

// No blanket From<reqwest::Error>: every variant needs the URL context the
// source error does not carry, so callers go through the helper constructors.
