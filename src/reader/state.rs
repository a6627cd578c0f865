//! Observable reader state.

use std::fmt;

use super::chapters::ChapterIndex;
use super::error::{ReaderError, ReaderErrorKind};
use crate::BookId;

/// `Idle → Loading → Ready | Error`.
///
/// `Error` is terminal for its book; opening a book again starts over from
/// `Loading`. Unmounting always returns to `Idle`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ReaderState {
    /// No book or no surface yet.
    #[default]
    Idle,
    /// Fetch and construction are in flight.
    Loading {
        /// The book being opened.
        book_id: BookId,
    },
    /// The engine exists and its first display has resolved.
    Ready {
        /// The open book.
        book_id: BookId,
        /// Chapter index built for this session.
        chapters: ChapterIndex,
    },
    /// Opening failed; the error replaces the reading surface.
    Error {
        /// The book that failed.
        book_id: BookId,
        /// Which failure occurred.
        kind: ReaderErrorKind,
        /// Message for the reader.
        message: String,
    },
}

impl ReaderState {
    pub(crate) fn failed(error: &ReaderError) -> Self {
        Self::Error {
            book_id: error.book_id().clone(),
            kind: error.kind(),
            message: error.user_message().to_string(),
        }
    }

    /// Returns the book this state relates to, if any.
    #[must_use]
    pub fn book_id(&self) -> Option<&BookId> {
        match self {
            Self::Idle => None,
            Self::Loading { book_id } | Self::Ready { book_id, .. } | Self::Error { book_id, .. } => {
                Some(book_id)
            }
        }
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready { .. })
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }
}

impl fmt::Display for ReaderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::Loading { book_id } => write!(f, "loading {book_id}"),
            Self::Ready { book_id, .. } => write!(f, "reading {book_id}"),
            Self::Error { book_id, message, .. } => write!(f, "error opening {book_id}: {message}"),
        }
    }
}
