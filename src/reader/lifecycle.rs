//! The reader: session lifecycle, navigation and display settings.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use super::chapters::{ChapterIndex, build_chapter_index};
use super::error::{PersistenceError, ReaderError};
use super::position::{Restored, location_listener, restore_position};
use super::session::ReadingSession;
use super::state::ReaderState;
use super::token::{Generation, MountToken};
use crate::BookId;
use crate::fetch::EbookClient;
use crate::render::{
    DEFAULT_FONT_SIZE, Location, RenderEngine, RenderEngineFactory, Surface, clamp_font_size,
};
use crate::storage::{KeyValueStore, SESSION_TOKEN_KEY};

/// Result of a completed [`Reader::open`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenOutcome {
    /// The session is installed and the reader is [`ReaderState::Ready`].
    Ready,
    /// A newer `open` or an `unmount` happened first; the result was discarded.
    Superseded,
}

struct ReaderInner {
    state: ReaderState,
    session: Option<ReadingSession>,
    font_size: u16,
}

/// Reading-session manager for one mount point.
///
/// At most one session exists at a time. Every method takes `&self`, so a
/// reader can be shared behind an `Arc` between the task opening books and
/// the task driving navigation.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use librova_reader::{BookId, EbookClient, MemoryStore, Page, Reader, SpineRendererFactory, Surface};
///
/// struct Stdout;
/// impl Surface for Stdout {
///     fn present(&self, page: &Page) { println!("{}", page.text); }
///     fn clear(&self) {}
/// }
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let reader = Reader::new(
///     EbookClient::new("https://api.librova.example")?,
///     Arc::new(SpineRendererFactory),
///     Arc::new(MemoryStore::new()),
/// );
/// let book = BookId::new("64f1c0ffee").ok_or("blank id")?;
/// reader.open(book, Arc::new(Stdout)).await?;
/// reader.next().await;
/// reader.unmount().await;
/// # Ok(())
/// # }
/// ```
pub struct Reader {
    client: EbookClient,
    factory: Arc<dyn RenderEngineFactory>,
    store: Arc<dyn KeyValueStore>,
    generation: Generation,
    inner: Mutex<ReaderInner>,
}

impl Reader {
    /// Creates an idle reader.
    pub fn new(
        client: EbookClient,
        factory: Arc<dyn RenderEngineFactory>,
        store: Arc<dyn KeyValueStore>,
    ) -> Self {
        Self {
            client,
            factory,
            store,
            generation: Generation::default(),
            inner: Mutex::new(ReaderInner {
                state: ReaderState::Idle,
                session: None,
                font_size: DEFAULT_FONT_SIZE,
            }),
        }
    }

    /// Sets the font size new sessions start with (clamped).
    #[must_use]
    pub fn with_font_size(mut self, percent: u16) -> Self {
        self.inner.get_mut().font_size = clamp_font_size(percent);
        self
    }

    /// Opens `book_id` on `surface`, replacing any current session.
    ///
    /// The previous session is disposed before the fetch starts. If another
    /// `open` or an [`unmount`](Self::unmount) happens while this one is in
    /// flight, its result is discarded and [`OpenOutcome::Superseded`] is
    /// returned.
    ///
    /// # Errors
    ///
    /// Returns [`ReaderError`] when fetching, validating or constructing the
    /// session fails. The reader is then in [`ReaderState::Error`].
    #[instrument(skip(self, surface), fields(book_id = %book_id))]
    pub async fn open(
        &self,
        book_id: BookId,
        surface: Arc<dyn Surface>,
    ) -> Result<OpenOutcome, ReaderError> {
        let (token, font_size) = {
            let mut inner = self.inner.lock().await;
            let token = self.generation.advance();
            if let Some(previous) = inner.session.take() {
                debug!(previous = %previous.book_id(), "tearing down previous session");
                previous.dispose().await;
            }
            inner.state = ReaderState::Loading {
                book_id: book_id.clone(),
            };
            (token, inner.font_size)
        };

        let loaded = self.load(&book_id, surface, font_size, &token).await;

        let mut inner = self.inner.lock().await;
        if !token.is_current() {
            if let Ok(Some(session)) = loaded {
                session.dispose().await;
            }
            debug!("open superseded");
            return Ok(OpenOutcome::Superseded);
        }

        match loaded {
            Ok(Some(session)) => {
                info!(chapters = session.chapters().len(), "book ready");
                inner.state = ReaderState::Ready {
                    book_id,
                    chapters: session.chapters().clone(),
                };
                inner.session = Some(session);
                Ok(OpenOutcome::Ready)
            }
            Ok(None) => Ok(OpenOutcome::Superseded),
            Err(error) => {
                warn!(error = %error, "failed to open book");
                inner.state = ReaderState::failed(&error);
                Err(error)
            }
        }
    }

    /// Fetches, constructs and positions a session without touching reader state.
    ///
    /// Returns `Ok(None)` as soon as `token` goes stale.
    async fn load(
        &self,
        book_id: &BookId,
        surface: Arc<dyn Surface>,
        font_size: u16,
        token: &MountToken,
    ) -> Result<Option<ReadingSession>, ReaderError> {
        let bearer = self.session_token();
        let fetched = self.client.fetch_asset(book_id, bearer.as_deref()).await;
        if !token.is_current() {
            debug!("discarding late asset response");
            return Ok(None);
        }
        let asset = fetched.map_err(|error| ReaderError::from_fetch(book_id.clone(), error))?;

        let mut engine = self
            .factory
            .create(&asset, surface, font_size)
            .map_err(|error| ReaderError::construction(book_id.clone(), error))?;
        let listener = location_listener(Arc::clone(&self.store), book_id.clone(), token.clone());
        let subscription = engine.subscribe(listener);
        let mut session =
            ReadingSession::new(book_id.clone(), asset, engine, subscription, token.clone());

        match restore_position(session.engine_mut(), self.store.as_ref(), book_id).await {
            Ok(Restored::Stored(location)) => debug!(location = %location, "resumed"),
            Ok(Restored::Default(location)) => debug!(location = %location, "started"),
            Err(error) => {
                session.dispose().await;
                return Err(ReaderError::construction(book_id.clone(), error));
            }
        }

        if !session.is_current() {
            session.dispose().await;
            return Ok(None);
        }

        let chapters = build_chapter_index(session.engine());
        session.set_chapters(chapters);
        Ok(Some(session))
    }

    /// Tears down the current session and returns to [`ReaderState::Idle`].
    ///
    /// In-flight opens are not cancelled; their results are discarded and
    /// they write nothing after this returns.
    #[instrument(skip(self))]
    pub async fn unmount(&self) {
        let mut inner = self.inner.lock().await;
        self.generation.invalidate();
        if let Some(session) = inner.session.take() {
            session.dispose().await;
        }
        inner.state = ReaderState::Idle;
        debug!("reader unmounted");
    }

    /// Moves one page forward. No-op without a session.
    pub async fn next(&self) {
        let mut inner = self.inner.lock().await;
        let Some(session) = inner.session.as_mut() else {
            debug!("next ignored: no session");
            return;
        };
        if let Err(error) = session.engine_mut().next().await {
            warn!(error = %error, "next page failed");
        }
    }

    /// Moves one page back. No-op without a session.
    pub async fn previous(&self) {
        let mut inner = self.inner.lock().await;
        let Some(session) = inner.session.as_mut() else {
            debug!("previous ignored: no session");
            return;
        };
        if let Err(error) = session.engine_mut().previous().await {
            warn!(error = %error, "previous page failed");
        }
    }

    /// Moves to the chapter locator `href`. No-op without a session.
    pub async fn go_to(&self, href: &str) {
        let mut inner = self.inner.lock().await;
        let Some(session) = inner.session.as_mut() else {
            debug!(href, "go-to ignored: no session");
            return;
        };
        if let Err(error) = session.engine_mut().go_to(href).await {
            warn!(href, error = %error, "go-to failed");
        }
    }

    /// Moves to chapter `index` (zero-based) of the current chapter index.
    ///
    /// Returns false when there is no session or no such chapter.
    pub async fn go_to_chapter(&self, index: usize) -> bool {
        let mut inner = self.inner.lock().await;
        let Some(session) = inner.session.as_mut() else {
            return false;
        };
        let Some(href) = session.chapters().get(index).map(|entry| entry.href.clone()) else {
            debug!(index, "no such chapter");
            return false;
        };
        if let Err(error) = session.engine_mut().go_to(&href).await {
            warn!(href = %href, error = %error, "go-to chapter failed");
        }
        true
    }

    /// Sets the font size in percent and applies it to the open session.
    ///
    /// Returns the size actually applied after clamping.
    pub async fn set_font_size(&self, percent: u16) -> u16 {
        let percent = clamp_font_size(percent);
        let mut inner = self.inner.lock().await;
        inner.font_size = percent;
        if let Some(session) = inner.session.as_mut()
            && let Err(error) = session.engine_mut().set_font_size(percent)
        {
            warn!(font_size = percent, error = %error, "font size change failed");
        }
        percent
    }

    /// Returns the current font size in percent.
    pub async fn font_size(&self) -> u16 {
        self.inner.lock().await.font_size
    }

    /// Returns a snapshot of the reader state.
    pub async fn state(&self) -> ReaderState {
        self.inner.lock().await.state.clone()
    }

    /// Returns the chapter index of the open session.
    pub async fn chapters(&self) -> Option<ChapterIndex> {
        let inner = self.inner.lock().await;
        inner.session.as_ref().map(|session| session.chapters().clone())
    }

    /// Returns the location the open session currently displays.
    pub async fn current_location(&self) -> Option<Location> {
        let inner = self.inner.lock().await;
        inner
            .session
            .as_ref()
            .and_then(|session| session.engine().current_location())
    }

    /// Saves the asset for `book_id` to `{dir}/{bookId}.epub`.
    ///
    /// Independent of the open session.
    ///
    /// # Errors
    ///
    /// Returns [`ReaderError`] classified the same way as for [`open`](Self::open).
    pub async fn download(&self, book_id: &BookId, dir: &Path) -> Result<PathBuf, ReaderError> {
        let bearer = self.session_token();
        self.client
            .download_to_dir(book_id, bearer.as_deref(), dir)
            .await
            .map_err(|error| ReaderError::from_fetch(book_id.clone(), error))
    }

    /// Reads the bearer credential; a storage failure means no credential.
    fn session_token(&self) -> Option<String> {
        match self.store.get(SESSION_TOKEN_KEY) {
            Ok(token) => token
                .map(|token| token.trim().to_string())
                .filter(|token| !token.is_empty()),
            Err(error) => {
                warn!(error = %PersistenceError::from(error), "failed to read session token");
                None
            }
        }
    }
}
