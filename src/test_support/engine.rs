//! Scriptable render engine that records every call.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::BookId;
use crate::epub::NavPoint;
use crate::fetch::{EPUB_MEDIA_TYPE, EbookAsset};
use crate::render::{
    EngineError, Location, LocationListener, Navigation, Page, RenderEngine, RenderEngineFactory,
    SubscriptionId, Surface,
};

/// A call observed by a [`RecordingEngine`] or its factory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCall {
    Create(String),
    Display(Option<String>),
    Next,
    Previous,
    GoTo(String),
    Subscribe,
    Unsubscribe,
    FontSize(u16),
    Destroy,
}

/// Behaviour knobs for engines built by a [`RecordingFactory`].
#[derive(Debug, Clone, Default)]
pub struct EngineScript {
    pub toc: Vec<NavPoint>,
    pub spine: Vec<String>,
    pub fail_create: bool,
    pub reject_stored_locations: bool,
    pub fail_default_display: bool,
    pub fail_navigation: bool,
}

pub struct RecordingFactory {
    script: EngineScript,
    calls: Arc<Mutex<Vec<EngineCall>>>,
}

#[allow(clippy::unwrap_used)]
impl RecordingFactory {
    pub fn new(script: EngineScript) -> Self {
        Self {
            script,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Every call made so far, across all engines this factory built.
    pub fn calls(&self) -> Vec<EngineCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn created(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, EngineCall::Create(_)))
            .count()
    }
}

#[allow(clippy::unwrap_used)]
impl RenderEngineFactory for RecordingFactory {
    fn create(
        &self,
        asset: &EbookAsset,
        _surface: Arc<dyn Surface>,
        _font_size: u16,
    ) -> Result<Box<dyn RenderEngine>, EngineError> {
        self.calls
            .lock()
            .unwrap()
            .push(EngineCall::Create(asset.book_id().to_string()));
        if self.script.fail_create {
            return Err(EngineError::EmptySpine);
        }
        Ok(Box::new(RecordingEngine {
            script: self.script.clone(),
            calls: Arc::clone(&self.calls),
            listeners: Vec::new(),
            next_subscription: 0,
            page: 0,
        }))
    }
}

/// Engine whose pages are named `page-{n}`.
pub struct RecordingEngine {
    script: EngineScript,
    calls: Arc<Mutex<Vec<EngineCall>>>,
    listeners: Vec<(SubscriptionId, LocationListener)>,
    next_subscription: u64,
    page: usize,
}

#[allow(clippy::unwrap_used)]
impl RecordingEngine {
    fn record(&self, call: EngineCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn emit(&self, location: &Location) {
        for (_, listener) in &self.listeners {
            listener(location);
        }
    }

    fn move_to(&mut self, page: usize) -> Location {
        self.page = page;
        let location = Location::new(format!("page-{page}"));
        self.emit(&location);
        location
    }
}

#[async_trait]
impl RenderEngine for RecordingEngine {
    async fn display(&mut self, target: Option<&Location>) -> Result<Location, EngineError> {
        self.record(EngineCall::Display(target.map(|l| l.as_str().to_string())));
        match target {
            Some(location) if self.script.reject_stored_locations => {
                Err(EngineError::unknown_location(location.as_str()))
            }
            Some(location) => {
                let page = location
                    .as_str()
                    .strip_prefix("page-")
                    .and_then(|n| n.parse().ok())
                    .unwrap_or(0);
                self.page = page;
                self.emit(location);
                Ok(location.clone())
            }
            None if self.script.fail_default_display => Err(EngineError::EmptySpine),
            None => Ok(self.move_to(0)),
        }
    }

    async fn next(&mut self) -> Result<(), EngineError> {
        self.record(EngineCall::Next);
        self.move_to(self.page + 1);
        Ok(())
    }

    async fn previous(&mut self) -> Result<(), EngineError> {
        self.record(EngineCall::Previous);
        self.move_to(self.page.saturating_sub(1));
        Ok(())
    }

    async fn go_to(&mut self, href: &str) -> Result<(), EngineError> {
        self.record(EngineCall::GoTo(href.to_string()));
        self.move_to(100);
        Ok(())
    }

    fn navigation(&self) -> Result<Navigation, EngineError> {
        if self.script.fail_navigation {
            return Err(EngineError::NotDisplayed);
        }
        Ok(Navigation {
            toc: self.script.toc.clone(),
            spine: self.script.spine.clone(),
        })
    }

    fn subscribe(&mut self, listener: LocationListener) -> SubscriptionId {
        self.record(EngineCall::Subscribe);
        self.next_subscription += 1;
        let id = SubscriptionId::new(self.next_subscription);
        self.listeners.push((id, listener));
        id
    }

    fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.record(EngineCall::Unsubscribe);
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        before != self.listeners.len()
    }

    fn set_font_size(&mut self, percent: u16) -> Result<(), EngineError> {
        self.record(EngineCall::FontSize(percent));
        Ok(())
    }

    fn current_location(&self) -> Option<Location> {
        Some(Location::new(format!("page-{}", self.page)))
    }

    async fn destroy(&mut self) {
        self.record(EngineCall::Destroy);
        self.listeners.clear();
    }
}

struct NullSurface;

impl Surface for NullSurface {
    fn present(&self, _page: &Page) {}

    fn clear(&self) {}
}

pub fn null_surface() -> Arc<dyn Surface> {
    Arc::new(NullSurface)
}

#[allow(clippy::unwrap_used)]
pub fn dummy_asset(book_id: &str) -> EbookAsset {
    EbookAsset::new(BookId::new(book_id).unwrap(), EPUB_MEDIA_TYPE, b"PK".to_vec())
}
