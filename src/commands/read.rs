//! Read command handler: an interactive reading session on stdin/stdout.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use librova_reader::reader::NO_CHAPTERS_MESSAGE;
use librova_reader::{BookId, ChapterIndex, ChapterSource, OpenOutcome, Reader, Surface};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

use super::{build_reader, reader_failure};
use crate::app::surface::TerminalSurface;
use crate::app_config::Settings;

const HELP: &str = "\
commands:
  n, next          next page (also: empty line)
  p, prev          previous page
  toc              list chapters
  go <N|href>      jump to chapter N or to a locator
  font <percent>   set font size (50-300)
  download [dir]   save the EPUB (default: current directory)
  q, quit          close the book";

/// One line of reader input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ReaderCommand {
    Next,
    Previous,
    Toc,
    GoToChapter(usize),
    GoToHref(String),
    Font(u16),
    Download(Option<PathBuf>),
    Help,
    Quit,
}

pub(crate) fn parse_reader_command(line: &str) -> Result<ReaderCommand, String> {
    let line = line.trim();
    let (verb, rest) = line
        .split_once(char::is_whitespace)
        .map_or((line, ""), |(verb, rest)| (verb, rest.trim()));

    match (verb, rest) {
        ("" | "n" | "next", "") => Ok(ReaderCommand::Next),
        ("p" | "prev" | "previous", "") => Ok(ReaderCommand::Previous),
        ("toc" | "chapters", "") => Ok(ReaderCommand::Toc),
        ("h" | "help" | "?", "") => Ok(ReaderCommand::Help),
        ("q" | "quit" | "exit", "") => Ok(ReaderCommand::Quit),
        ("go", "") => Err("usage: go <chapter number|href>".to_string()),
        ("go", target) => match target.parse::<usize>() {
            Ok(0) => Err("chapters are numbered from 1".to_string()),
            Ok(number) => Ok(ReaderCommand::GoToChapter(number)),
            Err(_) => Ok(ReaderCommand::GoToHref(target.to_string())),
        },
        ("font", size) => size
            .trim_end_matches('%')
            .parse::<u16>()
            .map(ReaderCommand::Font)
            .map_err(|_| "usage: font <percent>".to_string()),
        ("download", "") => Ok(ReaderCommand::Download(None)),
        ("download", dir) => Ok(ReaderCommand::Download(Some(PathBuf::from(dir)))),
        _ => Err(format!("unknown command '{line}' (type 'help')")),
    }
}

pub(crate) fn format_chapters(index: &ChapterIndex) -> String {
    if index.source() == ChapterSource::Unavailable {
        return NO_CHAPTERS_MESSAGE.to_string();
    }

    let mut out = String::new();
    for (number, entry) in index.entries().iter().enumerate() {
        let _ = writeln!(out, "{:>3}. {}", number + 1, entry.label);
    }
    out.trim_end().to_string()
}

pub async fn run_read_command(
    settings: &Settings,
    book_id: BookId,
    font_size: Option<u16>,
) -> Result<()> {
    let mut reader = build_reader(settings)?;
    if let Some(font_size) = font_size {
        reader = reader.with_font_size(font_size);
    }
    let surface: Arc<dyn Surface> = Arc::new(TerminalSurface::stdout());

    match reader.open(book_id.clone(), surface).await {
        Ok(OpenOutcome::Ready) => {}
        Ok(OpenOutcome::Superseded) => return Ok(()),
        Err(error) => return Err(reader_failure(error)),
    }

    if let Some(chapters) = reader.chapters().await {
        println!("{}", format_chapters(&chapters));
    }

    // The session is torn down even when stdin fails mid-read.
    let result = read_commands(&reader, &book_id).await;
    reader.unmount().await;
    info!(book_id = %book_id, "Closed book");
    result
}

async fn read_commands(reader: &Reader, book_id: &BookId) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match parse_reader_command(&line) {
            Ok(ReaderCommand::Quit) => break,
            Ok(command) => execute(reader, book_id, command).await,
            Err(message) => eprintln!("{message}"),
        }
    }
    Ok(())
}

async fn execute(reader: &Reader, book_id: &BookId, command: ReaderCommand) {
    debug!(?command, "reader command");
    match command {
        ReaderCommand::Next => reader.next().await,
        ReaderCommand::Previous => reader.previous().await,
        ReaderCommand::Toc => {
            if let Some(chapters) = reader.chapters().await {
                println!("{}", format_chapters(&chapters));
            }
        }
        ReaderCommand::GoToChapter(number) => {
            if !reader.go_to_chapter(number - 1).await {
                eprintln!("no chapter {number}");
            }
        }
        ReaderCommand::GoToHref(href) => reader.go_to(&href).await,
        ReaderCommand::Font(percent) => {
            let applied = reader.set_font_size(percent).await;
            info!(font_size = applied, "Font size set");
        }
        ReaderCommand::Download(dir) => {
            let dir = dir.as_deref().unwrap_or(Path::new("."));
            match reader.download(book_id, dir).await {
                Ok(path) => println!("saved {}", path.display()),
                Err(error) => eprintln!("{}", error.user_message()),
            }
        }
        ReaderCommand::Help => println!("{HELP}"),
        ReaderCommand::Quit => {}
    }
}
