//! Generation counter guarding post-`await` state writes.
//!
//! Every call to [`Generation::advance`] or [`Generation::invalidate`] makes
//! all previously issued [`MountToken`]s stale. Work that resumes after an
//! `await` checks its token before touching shared state, so a late response
//! for an earlier book, or one arriving after unmount, is discarded.

use std::sync::{Arc, Mutex, PoisonError};

/// Source of mount tokens for one reader.
#[derive(Debug, Clone, Default)]
pub(crate) struct Generation {
    current: Arc<Mutex<u64>>,
}

impl Generation {
    /// Starts a new generation and returns its token.
    pub(crate) fn advance(&self) -> MountToken {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        *current += 1;
        MountToken {
            current: Arc::clone(&self.current),
            issued: *current,
        }
    }

    /// Makes every outstanding token stale without issuing a new one.
    pub(crate) fn invalidate(&self) {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        *current += 1;
    }
}

/// Owned proof that an operation belongs to the current mount.
#[derive(Debug, Clone)]
pub struct MountToken {
    current: Arc<Mutex<u64>>,
    issued: u64,
}

impl MountToken {
    /// Returns the generation this token was issued for.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.issued
    }

    /// Returns true while no newer mount or unmount has happened.
    #[must_use]
    pub fn is_current(&self) -> bool {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) == self.issued
    }

    /// Runs `f` only if the token is current.
    ///
    /// The generation cannot change while `f` runs, so a write performed here
    /// never lands after an invalidation.
    pub fn with_current<R>(&self, f: impl FnOnce() -> R) -> Option<R> {
        let current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        if *current == self.issued {
            Some(f())
        } else {
            None
        }
    }
}
