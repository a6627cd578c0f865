//! Chapter index derived from the engine's navigation metadata.

use tracing::{debug, warn};

use crate::render::{Navigation, RenderEngine};

/// Placeholder shown when a book exposes no chapters at all.
pub const NO_CHAPTERS_MESSAGE: &str = "No chapters available";

/// One navigable chapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterEntry {
    /// Human-readable label.
    pub label: String,
    /// Opaque locator handed back to [`RenderEngine::go_to`].
    pub href: String,
}

impl ChapterEntry {
    /// Creates an entry.
    pub fn new(label: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            href: href.into(),
        }
    }
}

/// Where a chapter index came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChapterSource {
    /// The book's own table of contents.
    TableOfContents,
    /// Synthesized from the reading order as "Chapter N".
    Spine,
    /// No usable navigation metadata.
    Unavailable,
}

/// Immutable, ordered chapter list for one session.
///
/// An [`Unavailable`](ChapterSource::Unavailable) index is distinct from a
/// loading state: callers should render [`NO_CHAPTERS_MESSAGE`] for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterIndex {
    source: ChapterSource,
    entries: Vec<ChapterEntry>,
}

impl ChapterIndex {
    /// Index for a book without navigation metadata.
    #[must_use]
    pub fn unavailable() -> Self {
        Self {
            source: ChapterSource::Unavailable,
            entries: Vec::new(),
        }
    }

    /// Derives the index from `navigation`.
    ///
    /// A non-empty table of contents wins; otherwise each spine item becomes
    /// "Chapter N" (1-indexed) in reading order.
    #[must_use]
    pub fn from_navigation(navigation: &Navigation) -> Self {
        if !navigation.toc.is_empty() {
            return Self {
                source: ChapterSource::TableOfContents,
                entries: navigation
                    .toc
                    .iter()
                    .map(|point| ChapterEntry::new(point.label.clone(), point.href.clone()))
                    .collect(),
            };
        }

        if !navigation.spine.is_empty() {
            return Self {
                source: ChapterSource::Spine,
                entries: navigation
                    .spine
                    .iter()
                    .enumerate()
                    .map(|(index, href)| ChapterEntry::new(format!("Chapter {}", index + 1), href.clone()))
                    .collect(),
            };
        }

        Self::unavailable()
    }

    /// Returns where the entries came from.
    #[must_use]
    pub fn source(&self) -> ChapterSource {
        self.source
    }

    /// Returns the entries in reading order.
    #[must_use]
    pub fn entries(&self) -> &[ChapterEntry] {
        &self.entries
    }

    /// Returns the entry at `index` (zero-based).
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&ChapterEntry> {
        self.entries.get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Builds the chapter index for an engine that has finished opening.
///
/// A failure to read navigation metadata yields an unavailable index.
pub fn build_chapter_index(engine: &dyn RenderEngine) -> ChapterIndex {
    match engine.navigation() {
        Ok(navigation) => {
            let index = ChapterIndex::from_navigation(&navigation);
            debug!(source = ?index.source(), chapters = index.len(), "built chapter index");
            index
        }
        Err(error) => {
            warn!(error = %error, "navigation metadata unavailable");
            ChapterIndex::unavailable()
        }
    }
}
