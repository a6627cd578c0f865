//! Download command handler: save a book's EPUB without opening it.

use std::io::{self, IsTerminal};
use std::path::Path;
use std::sync::atomic::Ordering;

use anyhow::Result;
use librova_reader::BookId;
use tracing::info;

use super::{build_reader, reader_failure};
use crate::app::progress_manager::spawn_progress_ui;
use crate::app::terminal::{is_dumb_terminal, should_use_spinner};
use crate::app_config::Settings;

pub async fn run_download_command(
    settings: &Settings,
    book_id: &BookId,
    output_dir: &Path,
    quiet: bool,
) -> Result<()> {
    let reader = build_reader(settings)?;
    let use_spinner = should_use_spinner(io::stderr().is_terminal(), quiet, is_dumb_terminal());

    let (handle, stop) = spawn_progress_ui(use_spinner, book_id.to_string());
    let result = reader.download(book_id, output_dir).await;
    stop.store(true, Ordering::SeqCst);
    if let Some(handle) = handle {
        let _ = handle.await;
    }

    let path = result.map_err(reader_failure)?;
    info!(book_id = %book_id, path = %path.display(), "Saved ebook");
    println!("{}", path.display());
    Ok(())
}
