//! Shared fixtures for integration tests: EPUB containers, a recording
//! surface and the localhost socket guard.

#![allow(dead_code)]
#![allow(clippy::unwrap_used)]

use std::sync::{Arc, Mutex};

use librova_reader::{Page, Surface};

#[path = "../../src/test_support/epub_fixture.rs"]
mod epub_fixture;
#[path = "../../src/test_support/socket_guard.rs"]
mod socket_guard;

pub use epub_fixture::{TocStyle, build_epub, build_epub_with_non_linear};
pub use socket_guard::start_mock_server_or_skip;

/// Paragraphs long enough to span several pages at the default font size.
pub fn long_chapter(words: usize) -> Vec<String> {
    (0..words / 50)
        .map(|n| {
            (0..50)
                .map(|w| format!("word{n}x{w}"))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

/// Surface that keeps every presented page.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pages: Mutex<Vec<Page>>,
    clears: Mutex<usize>,
}

impl RecordingSurface {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn pages(&self) -> Vec<Page> {
        self.pages.lock().unwrap().clone()
    }

    pub fn last_page(&self) -> Option<Page> {
        self.pages.lock().unwrap().last().cloned()
    }

    pub fn clears(&self) -> usize {
        *self.clears.lock().unwrap()
    }
}

impl Surface for RecordingSurface {
    fn present(&self, page: &Page) {
        self.pages.lock().unwrap().push(page.clone());
    }

    fn clear(&self) {
        *self.clears.lock().unwrap() += 1;
    }
}
