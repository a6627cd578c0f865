//! Error types for render engines.

use thiserror::Error;

use crate::epub::EpubError;

/// Errors reported by a render engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The asset could not be opened as an ebook.
    #[error("failed to open ebook: {0}")]
    Open(#[from] EpubError),

    /// The ebook has no reading order to display.
    #[error("ebook has no readable sections")]
    EmptySpine,

    /// A location token does not address anything in this ebook.
    #[error("location {token} does not exist in this ebook")]
    UnknownLocation {
        /// The rejected token or href.
        token: String,
    },

    /// Navigation was requested before anything was displayed.
    #[error("nothing is displayed yet")]
    NotDisplayed,

    /// The engine was already destroyed.
    #[error("render engine was destroyed")]
    Destroyed,
}

impl EngineError {
    /// Creates an unknown-location error.
    pub fn unknown_location(token: impl Into<String>) -> Self {
        Self::UnknownLocation {
            token: token.into(),
        }
    }
}
