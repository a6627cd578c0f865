//! Error types for reader sessions.

use thiserror::Error;

use crate::BookId;
use crate::fetch::FetchError;
use crate::render::EngineError;
use crate::storage::StorageError;

/// Errors that end a reading session.
///
/// Every variant is terminal for the book it names: the reader enters the
/// error state and stays there until a book is opened again.
#[derive(Debug, Error)]
pub enum ReaderError {
    /// The asset request failed (network, timeout, HTTP status, auth).
    #[error("failed to fetch book {book_id}: {source}")]
    Fetch {
        /// The book being opened.
        book_id: BookId,
        /// The underlying fetch error.
        #[source]
        source: FetchError,
    },

    /// The backend declared a media type other than EPUB.
    #[error("book {book_id} was served as {} instead of an EPUB", content_type.as_deref().unwrap_or("an undeclared type"))]
    InvalidContentType {
        /// The book being opened.
        book_id: BookId,
        /// The declared `Content-Type`, if any.
        content_type: Option<String>,
    },

    /// The backend returned a zero-length payload.
    #[error("book {book_id} was served as an empty file")]
    EmptyAsset {
        /// The book being opened.
        book_id: BookId,
    },

    /// The render engine could not be initialised against the asset.
    #[error("failed to open book {book_id}: {source}")]
    Construction {
        /// The book being opened.
        book_id: BookId,
        /// The underlying engine error.
        #[source]
        source: EngineError,
    },
}

/// Discriminant of [`ReaderError`], kept in [`ReaderState::Error`](super::ReaderState::Error).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReaderErrorKind {
    /// See [`ReaderError::Fetch`].
    Fetch,
    /// See [`ReaderError::InvalidContentType`].
    InvalidContentType,
    /// See [`ReaderError::EmptyAsset`].
    EmptyAsset,
    /// See [`ReaderError::Construction`].
    Construction,
}

impl ReaderError {
    /// Classifies a fetch failure for `book_id`.
    ///
    /// Content-type and empty-payload failures get their own variants; all
    /// other fetch failures stay wrapped.
    pub fn from_fetch(book_id: BookId, error: FetchError) -> Self {
        match error {
            FetchError::InvalidContentType { content_type, .. } => Self::InvalidContentType {
                book_id,
                content_type,
            },
            FetchError::EmptyAsset { .. } => Self::EmptyAsset { book_id },
            source => Self::Fetch { book_id, source },
        }
    }

    /// Creates a construction error.
    pub fn construction(book_id: BookId, source: EngineError) -> Self {
        Self::Construction { book_id, source }
    }

    /// Returns the book the error relates to.
    #[must_use]
    pub fn book_id(&self) -> &BookId {
        match self {
            Self::Fetch { book_id, .. }
            | Self::InvalidContentType { book_id, .. }
            | Self::EmptyAsset { book_id }
            | Self::Construction { book_id, .. } => book_id,
        }
    }

    /// Returns the error discriminant.
    #[must_use]
    pub fn kind(&self) -> ReaderErrorKind {
        match self {
            Self::Fetch { .. } => ReaderErrorKind::Fetch,
            Self::InvalidContentType { .. } => ReaderErrorKind::InvalidContentType,
            Self::EmptyAsset { .. } => ReaderErrorKind::EmptyAsset,
            Self::Construction { .. } => ReaderErrorKind::Construction,
        }
    }

    /// Returns the message shown in place of the reading surface.
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        self.kind().user_message()
    }
}

impl ReaderErrorKind {
    /// Returns the message shown in place of the reading surface.
    ///
    /// Asset problems are attributed to the publisher, not the reader.
    #[must_use]
    pub fn user_message(self) -> &'static str {
        match self {
            Self::Fetch => "Could not load this book. Check your connection and sign-in, then open it again.",
            Self::InvalidContentType => {
                "The publisher uploaded this book in an unsupported format. Please contact the publisher."
            }
            Self::EmptyAsset => "The publisher uploaded an empty file for this book. Please contact the publisher.",
            Self::Construction => "This book could not be opened. The file may be damaged.",
        }
    }
}

/// Failure to read or write a persisted reading position.
///
/// Never ends a session; callers log it and carry on.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// The location could not be encoded.
    #[error("failed to serialize location: {0}")]
    Serialize(#[source] serde_json::Error),

    /// The stored value is not a location token.
    #[error("stored location under {key} is unreadable: {source}")]
    Deserialize {
        /// The storage key that held the value.
        key: String,
        /// The underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// The store itself failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
}
