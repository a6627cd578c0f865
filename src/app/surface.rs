//! Terminal rendering of pages.

use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

use librova_reader::{Page, Surface};
use tracing::warn;

/// Writes each presented page to a byte sink, framed by a status line.
pub(crate) struct TerminalSurface {
    out: Mutex<Box<dyn Write + Send>>,
}

impl TerminalSurface {
    pub(crate) fn stdout() -> Self {
        Self::new(Box::new(io::stdout()))
    }

    pub(crate) fn new(out: Box<dyn Write + Send>) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    fn write_with(&self, render: impl FnOnce(&mut dyn Write) -> io::Result<()>) {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(error) = render(out.as_mut()).and_then(|()| out.flush()) {
            warn!(error = %error, "failed to write to terminal");
        }
    }
}

/// One-line summary shown under each page.
pub(crate) fn status_line(page: &Page) -> String {
    format!(
        "[{} | section {}/{} | page {}/{} | {}%]",
        page.section_href,
        page.section_index + 1,
        page.section_count,
        page.page_index + 1,
        page.page_count,
        page.font_size
    )
}

impl Surface for TerminalSurface {
    fn present(&self, page: &Page) {
        self.write_with(|out| {
            writeln!(out)?;
            writeln!(out, "{}", page.text)?;
            writeln!(out)?;
            writeln!(out, "{}", status_line(page))
        });
    }

    fn clear(&self) {
        self.write_with(|out| writeln!(out, "[closed]"));
    }
}
