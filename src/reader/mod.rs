//! Reading-session manager.
//!
//! A [`Reader`] turns a book id and a [`Surface`](crate::render::Surface)
//! into a live reading session:
//!
//! 1. fetch the asset (authenticated with the stored session token)
//! 2. reject non-EPUB or empty payloads
//! 3. construct one render engine bound to the surface
//! 4. restore the last position, or start at the beginning
//! 5. build the chapter index
//!
//! Every step that resumes after an `await` is guarded by a [`MountToken`],
//! so opening another book or unmounting discards late results instead of
//! letting them overwrite newer state.

mod chapters;
mod error;
mod lifecycle;
mod position;
mod session;
mod state;
mod token;

pub use chapters::{ChapterEntry, ChapterIndex, ChapterSource, NO_CHAPTERS_MESSAGE, build_chapter_index};
pub use error::{PersistenceError, ReaderError, ReaderErrorKind};
pub use lifecycle::{OpenOutcome, Reader};
pub use state::ReaderState;
pub use token::MountToken;
