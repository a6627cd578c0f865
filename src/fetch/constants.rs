//! Constants for the fetch module (timeouts, media type, endpoint).

/// Default HTTP connect timeout (30 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default HTTP read timeout (2 minutes; ebooks are rarely larger than a few MB).
pub const READ_TIMEOUT_SECS: u64 = 120;

/// Media type the backend must declare for ebook assets.
pub const EPUB_MEDIA_TYPE: &str = "application/epub+zip";

/// Path segments of the asset endpoint, relative to the API base URL.
pub(crate) const ASSET_ENDPOINT_SEGMENTS: [&str; 2] = ["ebook", "getebookfile"];
