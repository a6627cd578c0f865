//! Traits and value types shared by every render engine.

use std::sync::Arc;

use async_trait::async_trait;

use super::{EngineError, Location};
use crate::epub::NavPoint;
use crate::fetch::EbookAsset;

/// Font size applied when nothing else is configured, in percent.
pub const DEFAULT_FONT_SIZE: u16 = 100;

/// Smallest accepted font size, in percent.
pub const MIN_FONT_SIZE: u16 = 50;

/// Largest accepted font size, in percent.
pub const MAX_FONT_SIZE: u16 = 300;

/// Clamps a requested font size into the supported range.
#[must_use]
pub fn clamp_font_size(percent: u16) -> u16 {
    percent.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE)
}

/// Callback invoked with every new location an engine settles on.
pub type LocationListener = Arc<dyn Fn(&Location) + Send + Sync>;

/// Handle returned by [`RenderEngine::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Wraps an engine-assigned subscription number.
    #[must_use]
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }
}

/// Navigation metadata an engine exposes once the ebook is open.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Navigation {
    /// Flattened table of contents, possibly empty.
    pub toc: Vec<NavPoint>,
    /// Locators of the reading order, possibly empty.
    pub spine: Vec<String>,
}

/// One page as presented on a surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// Location token of this page.
    pub location: Location,
    /// Locator of the section the page belongs to.
    pub section_href: String,
    /// Zero-based section position in the reading order.
    pub section_index: usize,
    /// Number of sections in the reading order.
    pub section_count: usize,
    /// Zero-based page position within the section.
    pub page_index: usize,
    /// Number of pages in the section at the current font size.
    pub page_count: usize,
    /// Page text; paragraphs are separated by blank lines.
    pub text: String,
    /// Font size the page was laid out for, in percent.
    pub font_size: u16,
}

/// Where an engine presents pages.
pub trait Surface: Send + Sync {
    /// Shows `page`, replacing whatever was shown before.
    fn present(&self, page: &Page);

    /// Removes everything the engine presented.
    fn clear(&self);
}

/// A render session bound to one ebook and one surface.
///
/// Every successful move (display, next, previous, go-to, re-layout) notifies
/// the subscribed listeners with the new location before returning.
///
/// # Object Safety
///
/// This trait uses `async_trait` so the reader can hold engines as
/// `Box<dyn RenderEngine>`.
#[async_trait]
pub trait RenderEngine: Send {
    /// Displays `target`, or the default start location when `None`.
    ///
    /// Returns the location actually displayed.
    async fn display(&mut self, target: Option<&Location>) -> Result<Location, EngineError>;

    /// Moves one page forward. At the end of the book this is a no-op.
    async fn next(&mut self) -> Result<(), EngineError>;

    /// Moves one page back. At the start of the book this is a no-op.
    async fn previous(&mut self) -> Result<(), EngineError>;

    /// Moves to the start of the section `href` points into.
    async fn go_to(&mut self, href: &str) -> Result<(), EngineError>;

    /// Returns the table of contents and reading order.
    fn navigation(&self) -> Result<Navigation, EngineError>;

    /// Registers a location-changed listener.
    fn subscribe(&mut self, listener: LocationListener) -> SubscriptionId;

    /// Removes a listener. Returns false if it was not registered.
    fn unsubscribe(&mut self, id: SubscriptionId) -> bool;

    /// Re-styles the content at `percent` of the base font size.
    fn set_font_size(&mut self, percent: u16) -> Result<(), EngineError>;

    /// Returns the currently displayed location, if any.
    fn current_location(&self) -> Option<Location>;

    /// Releases the surface and all listeners. Idempotent.
    async fn destroy(&mut self);
}

/// Builds one render engine per reading session.
pub trait RenderEngineFactory: Send + Sync {
    /// Opens `asset` and binds the engine to `surface`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] when the asset cannot be opened.
    fn create(
        &self,
        asset: &EbookAsset,
        surface: Arc<dyn Surface>,
        font_size: u16,
    ) -> Result<Box<dyn RenderEngine>, EngineError>;
}
