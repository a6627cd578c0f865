//! Authenticated ebook asset fetch against the storefront backend.
//!
//! The backend serves purchased ebooks from `GET /ebook/getebookfile/{bookId}`
//! behind a bearer token. This module fetches that asset into memory for the
//! reader and streams it to disk for the download affordance.
//!
//! # Features
//!
//! - Bearer authentication from the stored session token
//! - Declared media type must be `application/epub+zip`
//! - Zero-length payloads are rejected
//! - Connect and read timeouts on every request
//!
//! # Example
//!
//! ```no_run
//! use librova_reader::{BookId, EbookClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = EbookClient::new("https://api.librova.example")?;
//! let book_id = BookId::new("64f1c0ffee").ok_or("blank id")?;
//! let asset = client.fetch_asset(&book_id, Some("session-token")).await?;
//! println!("fetched {} bytes", asset.len());
//! # Ok(())
//! # }
//! ```

mod client;
mod constants;
mod error;

pub use client::{EbookAsset, EbookClient, is_epub_media_type};
pub use constants::{CONNECT_TIMEOUT_SECS, EPUB_MEDIA_TYPE, READ_TIMEOUT_SECS};
pub use error::FetchError;
