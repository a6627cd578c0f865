//! CLI argument definitions using clap derive macros.

use std::fmt;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use librova_reader::BookId;
use librova_reader::render::{MAX_FONT_SIZE, MIN_FONT_SIZE};

/// Read and download ebooks from a Librova storefront.
///
/// Librova fetches your purchased EPUBs, remembers where you stopped reading
/// and lets you page through them in the terminal.
#[derive(Parser, Debug)]
#[command(name = "librova")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Backend API base URL (overrides `api_base_url` in the config file)
    #[arg(long, value_name = "URL", global = true)]
    pub api_base: Option<String>,

    /// Storage file for reading positions and the session token
    #[arg(long, value_name = "PATH", global = true)]
    pub store: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Open a book and page through it interactively
    Read(ReadArgs),
    /// Save a book's EPUB file to disk
    Download(DownloadArgs),
    /// Store or clear the session token used for backend requests
    Token(TokenArgs),
}

#[derive(clap::Args, Debug)]
pub struct ReadArgs {
    /// Book identifier from the storefront
    #[arg(value_parser = parse_book_id)]
    pub book_id: BookId,

    /// Font size in percent (50-300)
    #[arg(short, long, value_parser = clap::value_parser!(u16).range(i64::from(MIN_FONT_SIZE)..=i64::from(MAX_FONT_SIZE)))]
    pub font_size: Option<u16>,
}

#[derive(clap::Args, Debug)]
pub struct DownloadArgs {
    /// Book identifier from the storefront
    #[arg(value_parser = parse_book_id)]
    pub book_id: BookId,

    /// Directory to save the EPUB into
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub output: PathBuf,
}

#[derive(clap::Args)]
pub struct TokenArgs {
    /// Bearer token issued at sign-in
    #[arg(required_unless_present = "clear", conflicts_with = "clear")]
    pub token: Option<String>,

    /// Remove the stored token
    #[arg(long)]
    pub clear: bool,
}

impl fmt::Debug for TokenArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenArgs")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("clear", &self.clear)
            .finish()
    }
}

fn parse_book_id(raw: &str) -> Result<BookId, String> {
    BookId::new(raw).ok_or_else(|| "book id must not be blank".to_string())
}
