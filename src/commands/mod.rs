//! CLI command handlers.

mod download;
mod read;
mod token;

use std::sync::Arc;

use anyhow::{Context, Result};
use librova_reader::{EbookClient, JsonFileStore, Reader, ReaderError, SpineRendererFactory};

use crate::app_config::Settings;

pub use download::run_download_command;
pub use read::run_read_command;
pub use token::run_token_command;

/// Builds a reader backed by the configured store and the spine renderer.
fn build_reader(settings: &Settings) -> Result<Reader> {
    let client = EbookClient::with_timeouts(
        &settings.api_base,
        settings.connect_timeout_secs,
        settings.read_timeout_secs,
    )
    .with_context(|| format!("Invalid API base URL '{}'", settings.api_base))?;
    let store = Arc::new(JsonFileStore::new(&settings.store_path));

    Ok(Reader::new(client, Arc::new(SpineRendererFactory), store).with_font_size(settings.font_size))
}

/// Wraps a reader error so the user-facing message leads the report.
fn reader_failure(error: ReaderError) -> anyhow::Error {
    let message = error.user_message();
    anyhow::Error::new(error).context(message)
}
