//! CLI entry point for the Librova reader.

use anyhow::Result;
use clap::Parser;
use tracing::{debug, info};

mod app;
mod app_config;
mod cli;
mod commands;

use app::terminal::{default_log_level, init_tracing, is_dumb_terminal, no_color_env_requested};
use app_config::{Settings, default_store_path, load_default_file_config};
use cli::{Args, Command};
use commands::{run_download_command, run_read_command, run_token_command};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    init_tracing(
        default_log_level(args.quiet, args.verbose),
        no_color_env_requested() || is_dumb_terminal(),
    );
    debug!(?args, "CLI arguments parsed");

    let loaded = load_default_file_config()?;
    if let Some(path) = loaded.path.as_deref()
        && loaded.config.is_some()
    {
        debug!(path = %path.display(), "Loaded config file");
    }
    let settings = Settings::resolve(&args, loaded.config.as_ref(), default_store_path)?;
    debug!(?settings, "Effective settings");

    match args.command {
        Command::Read(read) => {
            info!(book_id = %read.book_id, "Opening book");
            run_read_command(&settings, read.book_id, read.font_size).await
        }
        Command::Download(download) => {
            run_download_command(&settings, &download.book_id, &download.output, args.quiet).await
        }
        Command::Token(token) => run_token_command(&settings, token.token.as_deref(), token.clear),
    }
}
