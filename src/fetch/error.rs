//! Error types for the fetch module.
//!
//! Every variant carries the book id or URL it relates to, so log lines and
//! user-facing messages can point at the failing asset.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while fetching or downloading an ebook asset.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error fetching {url}: {source}")]
    Network {
        /// The URL that failed.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before completion.
    #[error("timeout fetching {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// HTTP error response (4xx client errors, 5xx server errors).
    #[error("HTTP {status} fetching {url}")]
    HttpStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The backend rejected the session token.
    #[error("[AUTH] session rejected (HTTP {status}) fetching {url}\n  Suggestion: {suggestion}")]
    AuthRequired {
        /// The URL that requires authentication.
        url: String,
        /// The HTTP status code (401 or 403).
        status: u16,
        /// User-facing suggestion for resolving the auth issue.
        suggestion: &'static str,
    },

    /// The configured API base URL cannot address the asset endpoint.
    #[error("invalid API base URL: {url}")]
    InvalidUrl {
        /// The invalid URL string.
        url: String,
    },

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {source}")]
    Client {
        /// The underlying builder error.
        #[source]
        source: reqwest::Error,
    },

    /// The backend declared a media type other than `application/epub+zip`.
    #[error("book {book_id} was served as {} instead of an EPUB", content_type.as_deref().unwrap_or("an undeclared type"))]
    InvalidContentType {
        /// The book whose asset was rejected.
        book_id: String,
        /// The declared `Content-Type`, if any.
        content_type: Option<String>,
    },

    /// The backend returned a zero-length payload.
    #[error("book {book_id} was served as an empty file")]
    EmptyAsset {
        /// The book whose asset was empty.
        book_id: String,
    },

    /// File system error while saving a download.
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// The file path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl FetchError {
    /// Creates a network error from a reqwest error, promoting timeouts.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            Self::Timeout { url: url.into() }
        } else {
            Self::Network {
                url: url.into(),
                source,
            }
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates an authentication-required error.
    pub fn auth_required(url: impl Into<String>, status: u16) -> Self {
        Self::AuthRequired {
            url: url.into(),
            status,
            suggestion: "Sign in again and store the new token with `librova token <TOKEN>`.",
        }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Creates an invalid content type error.
    pub fn invalid_content_type(book_id: impl Into<String>, content_type: Option<String>) -> Self {
        Self::InvalidContentType {
            book_id: book_id.into(),
            content_type,
        }
    }

    /// Creates an empty asset error.
    pub fn empty_asset(book_id: impl Into<String>) -> Self {
        Self::EmptyAsset {
            book_id: book_id.into(),
        }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
