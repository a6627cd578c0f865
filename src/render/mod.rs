//! Render engine contract and the built-in spine paginator.
//!
//! A render engine owns the presentation of one ebook on one [`Surface`]. It
//! is driven by the reader through [`RenderEngine`] and reports every move
//! through location-changed listeners. Engines are single-caller: the reader
//! never drives one from two places at once.
//!
//! # Architecture
//!
//! - [`RenderEngine`] - Async trait implemented by engines
//! - [`RenderEngineFactory`] - Builds one engine per session from the fetched asset
//! - [`Location`] - Opaque position token emitted by an engine
//! - [`Surface`] - Where pages are presented (the mount point)
//! - [`SpineRenderer`] - Built-in engine paginating spine sections as text

mod engine;
mod error;
mod paginate;
mod spine;

pub use engine::{
    DEFAULT_FONT_SIZE, LocationListener, MAX_FONT_SIZE, MIN_FONT_SIZE, Navigation, Page,
    RenderEngine, RenderEngineFactory, SubscriptionId, Surface, clamp_font_size,
};
pub use error::EngineError;
pub use paginate::paginate;
pub use spine::{SpineRenderer, SpineRendererFactory};

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque reading position emitted by a render engine.
///
/// Only the engine that produced a location can interpret it; everyone else
/// stores and hands it back verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Location(String);

impl Location {
    /// Wraps a raw token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the raw token.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
