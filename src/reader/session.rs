//! One open book bound to one render engine.

use tracing::debug;

use super::chapters::ChapterIndex;
use super::token::MountToken;
use crate::BookId;
use crate::fetch::EbookAsset;
use crate::render::{RenderEngine, SubscriptionId};

/// Owns the render engine and the asset it was built from.
///
/// [`dispose`](Self::dispose) consumes the session, so teardown runs at most
/// once: the location listener is removed, the engine destroyed, then the
/// asset released.
pub(crate) struct ReadingSession {
    book_id: BookId,
    asset: EbookAsset,
    engine: Box<dyn RenderEngine>,
    subscription: SubscriptionId,
    chapters: ChapterIndex,
    token: MountToken,
}

impl ReadingSession {
    pub(crate) fn new(
        book_id: BookId,
        asset: EbookAsset,
        engine: Box<dyn RenderEngine>,
        subscription: SubscriptionId,
        token: MountToken,
    ) -> Self {
        Self {
            book_id,
            asset,
            engine,
            subscription,
            chapters: ChapterIndex::unavailable(),
            token,
        }
    }

    pub(crate) fn book_id(&self) -> &BookId {
        &self.book_id
    }

    pub(crate) fn chapters(&self) -> &ChapterIndex {
        &self.chapters
    }

    pub(crate) fn set_chapters(&mut self, chapters: ChapterIndex) {
        self.chapters = chapters;
    }

    pub(crate) fn engine(&self) -> &dyn RenderEngine {
        self.engine.as_ref()
    }

    pub(crate) fn engine_mut(&mut self) -> &mut dyn RenderEngine {
        self.engine.as_mut()
    }

    pub(crate) fn is_current(&self) -> bool {
        self.token.is_current()
    }

    pub(crate) async fn dispose(self) {
        let Self {
            book_id,
            asset,
            mut engine,
            subscription,
            token,
            ..
        } = self;

        engine.unsubscribe(subscription);
        engine.destroy().await;
        drop(engine);
        drop(asset);
        debug!(book_id = %book_id, generation = token.generation(), "session disposed");
    }
}
