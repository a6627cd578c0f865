//! Reading-position persistence.
//!
//! Locations are stored JSON-encoded under [`location_key`]. Writes happen on
//! every location change and are best-effort: failures are logged and never
//! reach the session.

use std::sync::Arc;

use tracing::{debug, instrument, warn};

use super::error::PersistenceError;
use super::token::MountToken;
use crate::BookId;
use crate::render::{EngineError, Location, LocationListener, RenderEngine};
use crate::storage::{KeyValueStore, location_key};

/// How the first display of a session was resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Restored {
    /// The stored location was displayed.
    Stored(Location),
    /// The default start location was displayed.
    Default(Location),
}

pub(crate) fn save_location(
    store: &dyn KeyValueStore,
    book_id: &BookId,
    location: &Location,
) -> Result<(), PersistenceError> {
    let encoded = serde_json::to_string(location).map_err(PersistenceError::Serialize)?;
    store.set(&location_key(book_id), &encoded)?;
    Ok(())
}

pub(crate) fn load_location(
    store: &dyn KeyValueStore,
    book_id: &BookId,
) -> Result<Option<Location>, PersistenceError> {
    let key = location_key(book_id);
    let Some(encoded) = store.get(&key)? else {
        return Ok(None);
    };
    serde_json::from_str(&encoded)
        .map(Some)
        .map_err(|source| PersistenceError::Deserialize { key, source })
}

/// Returns a listener that persists every location while `token` is current.
pub(crate) fn location_listener(
    store: Arc<dyn KeyValueStore>,
    book_id: BookId,
    token: MountToken,
) -> LocationListener {
    Arc::new(move |location: &Location| {
        match token.with_current(|| save_location(store.as_ref(), &book_id, location)) {
            Some(Ok(())) => debug!(book_id = %book_id, location = %location, "position saved"),
            Some(Err(error)) => {
                warn!(book_id = %book_id, error = %error, "failed to persist reading position");
            }
            None => debug!(book_id = %book_id, "ignoring location from stale session"),
        }
    })
}

/// Displays the stored position for `book_id`, or the default start.
///
/// An unreadable or rejected stored location falls back to the default.
///
/// # Errors
///
/// Returns the engine error if even the default location cannot be shown.
#[instrument(skip(engine, store), fields(book_id = %book_id))]
pub(crate) async fn restore_position(
    engine: &mut dyn RenderEngine,
    store: &dyn KeyValueStore,
    book_id: &BookId,
) -> Result<Restored, EngineError> {
    let stored = load_location(store, book_id).unwrap_or_else(|error| {
        warn!(error = %error, "ignoring stored reading position");
        None
    });

    if let Some(location) = stored {
        match engine.display(Some(&location)).await {
            Ok(displayed) => {
                debug!(location = %displayed, "restored reading position");
                return Ok(Restored::Stored(displayed));
            }
            Err(error) => {
                warn!(location = %location, error = %error, "stored position rejected, starting from the beginning");
            }
        }
    }

    let displayed = engine.display(None).await?;
    Ok(Restored::Default(displayed))
}
