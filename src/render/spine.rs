//! Built-in engine that lays spine sections out as plain-text pages.
//!
//! Locations have the form `{section href}#page={n}` with `n` starting at 1.
//! Page numbers depend on the font size a location was taken at, so a page
//! past the end of its section is clamped to the last page instead of being
//! rejected. An unknown section or a malformed token is rejected.
//!
//! Page turns step over spine items marked `linear="no"`.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, instrument};

use super::engine::{
    DEFAULT_FONT_SIZE, LocationListener, Navigation, Page, RenderEngine, RenderEngineFactory,
    SubscriptionId, Surface, clamp_font_size,
};
use super::paginate::paginate;
use super::{EngineError, Location};
use crate::epub::EpubPackage;
use crate::fetch::EbookAsset;

/// Columns per line at the default font size.
const COLUMNS_AT_DEFAULT: usize = 60;

const LINES_PER_PAGE: usize = 30;

const PAGE_MARKER: &str = "#page=";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Position {
    section: usize,
    page: usize,
}

/// Paginating render engine over an [`EpubPackage`].
pub struct SpineRenderer {
    package: EpubPackage,
    surface: Arc<dyn Surface>,
    listeners: Vec<(SubscriptionId, LocationListener)>,
    next_subscription: u64,
    font_size: u16,
    position: Option<Position>,
    pages: Vec<String>,
    destroyed: bool,
}

impl SpineRenderer {
    /// Binds `package` to `surface` at `font_size` percent (clamped).
    #[must_use]
    pub fn new(package: EpubPackage, surface: Arc<dyn Surface>, font_size: u16) -> Self {
        Self {
            package,
            surface,
            listeners: Vec::new(),
            next_subscription: 0,
            font_size: clamp_font_size(font_size),
            position: None,
            pages: Vec::new(),
            destroyed: false,
        }
    }

    /// Returns the current font size in percent.
    #[must_use]
    pub fn font_size(&self) -> u16 {
        self.font_size
    }

    fn columns(&self) -> usize {
        (COLUMNS_AT_DEFAULT * usize::from(DEFAULT_FONT_SIZE) / usize::from(self.font_size)).max(1)
    }

    fn ensure_alive(&self) -> Result<(), EngineError> {
        if self.destroyed {
            Err(EngineError::Destroyed)
        } else {
            Ok(())
        }
    }

    fn layout_section(&self, section: usize) -> Result<Vec<String>, EngineError> {
        let href = &self.package.spine()[section].href;
        let paragraphs = self.package.section_text(href)?;
        Ok(paginate(&paragraphs, self.columns(), LINES_PER_PAGE))
    }

    /// Page turns skip `linear="no"` sections; they stay reachable by `go_to`.
    fn linear_after(&self, section: usize) -> Option<usize> {
        let spine = self.package.spine();
        (section + 1..spine.len()).find(|&index| spine[index].linear)
    }

    fn linear_before(&self, section: usize) -> Option<usize> {
        let spine = self.package.spine();
        (0..section).rev().find(|&index| spine[index].linear)
    }

    fn location_of(&self, position: Position) -> Location {
        let href = &self.package.spine()[position.section].href;
        Location::new(format!("{href}{PAGE_MARKER}{}", position.page + 1))
    }

    fn parse_location(&self, location: &Location) -> Result<Position, EngineError> {
        let token = location.as_str();
        let (href, page) = token
            .rsplit_once(PAGE_MARKER)
            .ok_or_else(|| EngineError::unknown_location(token))?;
        let page = page
            .parse::<usize>()
            .ok()
            .filter(|page| *page > 0)
            .ok_or_else(|| EngineError::unknown_location(token))?;
        let section = self
            .package
            .spine()
            .iter()
            .position(|item| item.href == href)
            .ok_or_else(|| EngineError::unknown_location(token))?;
        Ok(Position {
            section,
            page: page - 1,
        })
    }

    /// Installs freshly laid-out `pages`, presents `page` and notifies listeners.
    fn show(&mut self, section: usize, page: usize, pages: Vec<String>) -> Location {
        let page = page.min(pages.len().saturating_sub(1));
        let position = Position { section, page };
        let location = self.location_of(position);

        self.pages = pages;
        self.position = Some(position);

        self.surface.present(&Page {
            location: location.clone(),
            section_href: self.package.spine()[section].href.clone(),
            section_index: section,
            section_count: self.package.spine().len(),
            page_index: page,
            page_count: self.pages.len(),
            text: self.pages.get(page).cloned().unwrap_or_default(),
            font_size: self.font_size,
        });

        for (_, listener) in &self.listeners {
            listener(&location);
        }
        location
    }
}

#[async_trait]
impl RenderEngine for SpineRenderer {
    #[instrument(skip(self))]
    async fn display(&mut self, target: Option<&Location>) -> Result<Location, EngineError> {
        self.ensure_alive()?;
        let position = match target {
            Some(location) => self.parse_location(location)?,
            None if self.package.spine().is_empty() => return Err(EngineError::EmptySpine),
            None => Position {
                section: self
                    .package
                    .spine()
                    .iter()
                    .position(|item| item.linear)
                    .unwrap_or(0),
                page: 0,
            },
        };

        let pages = self.layout_section(position.section)?;
        let location = self.show(position.section, position.page, pages);
        debug!(location = %location, "displayed");
        Ok(location)
    }

    async fn next(&mut self) -> Result<(), EngineError> {
        self.ensure_alive()?;
        let position = self.position.ok_or(EngineError::NotDisplayed)?;

        if position.page + 1 < self.pages.len() {
            let pages = std::mem::take(&mut self.pages);
            self.show(position.section, position.page + 1, pages);
        } else if let Some(section) = self.linear_after(position.section) {
            let pages = self.layout_section(section)?;
            self.show(section, 0, pages);
        } else {
            debug!("already at the last page");
        }
        Ok(())
    }

    async fn previous(&mut self) -> Result<(), EngineError> {
        self.ensure_alive()?;
        let position = self.position.ok_or(EngineError::NotDisplayed)?;

        if position.page > 0 {
            let pages = std::mem::take(&mut self.pages);
            self.show(position.section, position.page - 1, pages);
        } else if let Some(section) = self.linear_before(position.section) {
            let pages = self.layout_section(section)?;
            let last = pages.len().saturating_sub(1);
            self.show(section, last, pages);
        } else {
            debug!("already at the first page");
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn go_to(&mut self, href: &str) -> Result<(), EngineError> {
        self.ensure_alive()?;
        let section = self
            .package
            .spine_index(href)
            .ok_or_else(|| EngineError::unknown_location(href))?;
        let pages = self.layout_section(section)?;
        self.show(section, 0, pages);
        Ok(())
    }

    fn navigation(&self) -> Result<Navigation, EngineError> {
        self.ensure_alive()?;
        Ok(Navigation {
            toc: self.package.toc().to_vec(),
            spine: self
                .package
                .spine()
                .iter()
                .map(|item| item.href.clone())
                .collect(),
        })
    }

    fn subscribe(&mut self, listener: LocationListener) -> SubscriptionId {
        self.next_subscription += 1;
        let id = SubscriptionId::new(self.next_subscription);
        self.listeners.push((id, listener));
        id
    }

    fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    fn set_font_size(&mut self, percent: u16) -> Result<(), EngineError> {
        self.ensure_alive()?;
        let percent = clamp_font_size(percent);
        if percent == self.font_size {
            return Ok(());
        }

        let old_columns = self.columns();
        self.font_size = percent;
        debug!(font_size = percent, "font size changed");

        // Keep roughly the same text on screen after re-layout.
        if let Some(position) = self.position {
            let pages = self.layout_section(position.section)?;
            let page = position.page * old_columns / self.columns();
            self.show(position.section, page, pages);
        }
        Ok(())
    }

    fn current_location(&self) -> Option<Location> {
        self.position.map(|position| self.location_of(position))
    }

    async fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        self.listeners.clear();
        self.pages.clear();
        self.position = None;
        self.surface.clear();
        debug!("render engine destroyed");
    }
}

/// Factory producing a [`SpineRenderer`] per session.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpineRendererFactory;

impl RenderEngineFactory for SpineRendererFactory {
    fn create(
        &self,
        asset: &EbookAsset,
        surface: Arc<dyn Surface>,
        font_size: u16,
    ) -> Result<Box<dyn RenderEngine>, EngineError> {
        let package = EpubPackage::from_bytes(asset.bytes())?;
        Ok(Box::new(SpineRenderer::new(package, surface, font_size)))
    }
}
