//! Librova Reader Library
//!
//! This library provides the reading core of the Librova ebook storefront:
//! it fetches a purchased EPUB from the backend, binds a render session to a
//! surface, keeps the reading position in durable storage and exposes
//! chapter navigation.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`fetch`] - Authenticated asset fetch and download against the REST backend
//! - [`epub`] - EPUB container, package and navigation parsing
//! - [`render`] - Render engine contract and the built-in spine paginator
//! - [`storage`] - Durable key-value storage for positions and credentials
//! - [`reader`] - Session lifecycle, navigation, position persistence and chapter index

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod epub;
pub mod fetch;
pub mod reader;
pub mod render;
pub mod storage;
#[cfg(test)]
pub mod test_support;
pub(crate) mod user_agent;

mod book;

// Re-export commonly used types
pub use book::BookId;
pub use epub::{EpubError, EpubPackage, NavPoint, PackageMetadata};
pub use fetch::{EPUB_MEDIA_TYPE, EbookAsset, EbookClient, FetchError};
pub use reader::{
    ChapterEntry, ChapterIndex, ChapterSource, MountToken, NO_CHAPTERS_MESSAGE, OpenOutcome,
    PersistenceError, Reader, ReaderError, ReaderErrorKind, ReaderState, build_chapter_index,
};
pub use render::{
    DEFAULT_FONT_SIZE, EngineError, Location, LocationListener, Navigation, Page,
    RenderEngine, RenderEngineFactory, SpineRenderer, SpineRendererFactory, SubscriptionId,
    Surface,
};
pub use storage::{
    JsonFileStore, KeyValueStore, MemoryStore, SESSION_TOKEN_KEY, StorageError, location_key,
};
