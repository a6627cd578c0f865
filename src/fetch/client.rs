//! HTTP client wrapper for the ebook asset endpoint.
//!
//! This module provides the `EbookClient` struct which fetches ebook assets
//! into memory for rendering and streams them to disk for downloads, with
//! timeout configuration and structured error handling.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::constants::{
    ASSET_ENDPOINT_SEGMENTS, CONNECT_TIMEOUT_SECS, EPUB_MEDIA_TYPE, READ_TIMEOUT_SECS,
};
use super::error::FetchError;
use crate::book::BookId;
use crate::user_agent;

/// Raw ebook bytes fetched for one book, with the media type the backend declared.
///
/// The bytes are shared so the render engine can hold them without copying.
#[derive(Debug, Clone)]
pub struct EbookAsset {
    book_id: BookId,
    content_type: String,
    bytes: Arc<[u8]>,
}

impl EbookAsset {
    /// Wraps already-fetched bytes.
    #[must_use]
    pub fn new(book_id: BookId, content_type: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            book_id,
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Returns the book this asset belongs to.
    #[must_use]
    pub fn book_id(&self) -> &BookId {
        &self.book_id
    }

    /// Returns the declared media type.
    #[must_use]
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Returns a shared handle to the raw bytes.
    #[must_use]
    pub fn bytes(&self) -> Arc<[u8]> {
        Arc::clone(&self.bytes)
    }

    /// Returns the payload length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns true if the payload is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// HTTP client for the storefront's ebook asset endpoint.
///
/// This client is designed to be created once and reused, taking advantage
/// of connection pooling.
///
/// # Example
///
/// ```no_run
/// use librova_reader::{BookId, EbookClient};
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = EbookClient::new("https://api.librova.example")?;
/// let book_id = BookId::new("64f1c0ffee").ok_or("blank id")?;
/// let path = client.download_to_dir(&book_id, Some("token"), Path::new("./books")).await?;
/// println!("Saved to: {}", path.display());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct EbookClient {
    client: Client,
    api_base: Url,
}

impl EbookClient {
    /// Creates a client for the given API base URL with default timeouts.
    ///
    /// Default configuration:
    /// - Connect timeout: 30 seconds
    /// - Read timeout: 2 minutes
    /// - Gzip decompression: enabled
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidUrl`] if `api_base` is not an absolute URL
    /// that can carry a path, or [`FetchError::Client`] if the HTTP client
    /// cannot be built.
    pub fn new(api_base: &str) -> Result<Self, FetchError> {
        Self::with_timeouts(api_base, CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS)
    }

    /// Creates a client with explicit timeout values.
    ///
    /// # Errors
    ///
    /// Same as [`new`](Self::new).
    #[instrument(level = "debug")]
    pub fn with_timeouts(
        api_base: &str,
        connect_timeout_secs: u64,
        read_timeout_secs: u64,
    ) -> Result<Self, FetchError> {
        let parsed = Url::parse(api_base).map_err(|_| FetchError::invalid_url(api_base))?;
        if parsed.cannot_be_a_base() {
            return Err(FetchError::invalid_url(api_base));
        }

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(connect_timeout_secs))
            .timeout(Duration::from_secs(read_timeout_secs))
            .gzip(true)
            .user_agent(user_agent::default_reader_user_agent())
            .build()
            .map_err(|source| FetchError::Client { source })?;

        Ok(Self {
            client,
            api_base: parsed,
        })
    }

    /// Builds `{api_base}/ebook/getebookfile/{bookId}` with the id percent-encoded.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidUrl`] if the base URL cannot carry path segments.
    pub fn asset_url(&self, book_id: &BookId) -> Result<Url, FetchError> {
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|()| FetchError::invalid_url(self.api_base.as_str()))?
            .pop_if_empty()
            .extend(ASSET_ENDPOINT_SEGMENTS)
            .push(book_id.as_str());
        Ok(url)
    }

    /// Fetches the ebook asset for `book_id` into memory.
    ///
    /// The declared media type is checked before the body is read, so a
    /// mislabelled response never reaches the render engine.
    ///
    /// # Errors
    ///
    /// Returns `FetchError` if:
    /// - The request fails (network error, timeout)
    /// - The server returns an error status (401/403 map to `AuthRequired`)
    /// - The declared media type is not `application/epub+zip`
    /// - The payload is empty
    #[instrument(skip(self, bearer), fields(book_id = %book_id))]
    pub async fn fetch_asset(
        &self,
        book_id: &BookId,
        bearer: Option<&str>,
    ) -> Result<EbookAsset, FetchError> {
        debug!("fetching ebook asset");
        let url = self.asset_url(book_id)?;
        let response = self.send(&url, bearer).await?;

        let content_type = declared_content_type(&response);
        if !is_epub_media_type(content_type.as_deref()) {
            warn!(content_type = ?content_type, "backend declared a non-EPUB media type");
            return Err(FetchError::invalid_content_type(
                book_id.as_str(),
                content_type,
            ));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::network(url.as_str(), e))?;
        if bytes.is_empty() {
            warn!("backend returned an empty ebook payload");
            return Err(FetchError::empty_asset(book_id.as_str()));
        }

        info!(bytes = bytes.len(), "ebook asset fetched");
        Ok(EbookAsset::new(
            book_id.clone(),
            content_type.unwrap_or_else(|| EPUB_MEDIA_TYPE.to_string()),
            bytes.to_vec(),
        ))
    }

    /// Streams the ebook asset for `book_id` to `{output_dir}/{bookId}.epub`.
    ///
    /// The output directory is created if needed. Partial files are removed
    /// when the transfer fails or turns out to be empty.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`fetch_asset`](Self::fetch_asset), plus
    /// [`FetchError::Io`] when writing to disk fails.
    #[must_use = "download result contains the path to the saved ebook"]
    #[instrument(skip(self, bearer), fields(book_id = %book_id, dir = %output_dir.display()))]
    pub async fn download_to_dir(
        &self,
        book_id: &BookId,
        bearer: Option<&str>,
        output_dir: &Path,
    ) -> Result<PathBuf, FetchError> {
        let url = self.asset_url(book_id)?;
        let response = self.send(&url, bearer).await?;

        let content_type = declared_content_type(&response);
        if !is_epub_media_type(content_type.as_deref()) {
            return Err(FetchError::invalid_content_type(
                book_id.as_str(),
                content_type,
            ));
        }

        tokio::fs::create_dir_all(output_dir)
            .await
            .map_err(|e| FetchError::io(output_dir, e))?;
        let file_path = output_dir.join(download_file_name(book_id));
        let mut file = File::create(&file_path)
            .await
            .map_err(|e| FetchError::io(file_path.clone(), e))?;

        let stream_result = stream_to_file(&mut file, response, url.as_str(), &file_path).await;
        drop(file);

        match stream_result {
            Ok(0) => {
                debug!(path = %file_path.display(), "removing empty download");
                let _ = tokio::fs::remove_file(&file_path).await;
                Err(FetchError::empty_asset(book_id.as_str()))
            }
            Ok(bytes) => {
                info!(path = %file_path.display(), bytes, "ebook downloaded");
                Ok(file_path)
            }
            Err(error) => {
                debug!(path = %file_path.display(), "cleaning up partial file after error");
                let _ = tokio::fs::remove_file(&file_path).await;
                Err(error)
            }
        }
    }

    async fn send(&self, url: &Url, bearer: Option<&str>) -> Result<reqwest::Response, FetchError> {
        let mut request = self.client.get(url.clone()).header(ACCEPT, EPUB_MEDIA_TYPE);
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        } else {
            debug!("no session token available; requesting without credentials");
        }

        let response = request
            .send()
            .await
            .map_err(|e| FetchError::network(url.as_str(), e))?;

        let status = response.status();
        if !status.is_success() {
            let status_code = status.as_u16();
            if matches!(status_code, 401 | 403) {
                return Err(FetchError::auth_required(url.as_str(), status_code));
            }
            return Err(FetchError::http_status(url.as_str(), status_code));
        }

        Ok(response)
    }
}

/// Returns true if the declared `Content-Type` names an EPUB container.
///
/// Only the media-type essence is compared (case-insensitive); parameters
/// such as `charset` are ignored. A missing header is not an EPUB.
#[must_use]
pub fn is_epub_media_type(content_type: Option<&str>) -> bool {
    content_type
        .and_then(|value| value.split(';').next())
        .is_some_and(|essence| essence.trim().eq_ignore_ascii_case(EPUB_MEDIA_TYPE))
}

fn declared_content_type(response: &reqwest::Response) -> Option<String> {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// File name used for downloads: the book id reduced to filesystem-safe characters.
fn download_file_name(book_id: &BookId) -> String {
    let stem: String = book_id
        .as_str()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let stem = stem.trim_start_matches('.');
    if stem.is_empty() {
        "ebook.epub".to_string()
    } else {
        format!("{stem}.epub")
    }
}

/// Streams response body to file, returning bytes written.
async fn stream_to_file(
    file: &mut File,
    response: reqwest::Response,
    url: &str,
    file_path: &Path,
) -> Result<u64, FetchError> {
    let mut writer = BufWriter::new(file);
    let mut stream = response.bytes_stream();
    let mut bytes_written: u64 = 0;

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.map_err(|e| FetchError::network(url, e))?;

        writer
            .write_all(&chunk)
            .await
            .map_err(|e| FetchError::io(file_path.to_path_buf(), e))?;

        bytes_written += chunk.len() as u64;
    }

    writer
        .flush()
        .await
        .map_err(|e| FetchError::io(file_path.to_path_buf(), e))?;

    Ok(bytes_written)
}
