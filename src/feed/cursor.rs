//! Pagination cursor for a single feed.
//!
//! The cursor is the only mutable state of a feed. `page` and `has_more`
//! always reflect the last page response that was applied; a load never moves
//! them ahead of a response and a failed load never rolls them back.

use std::sync::{Mutex, PoisonError};

use super::types::{FeedAttributes, PageResponse};

/// Snapshot of the feed's pagination state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedCursor {
    /// Oldest page currently shown.
    pub page: u32,
    /// Whether an older page exists on the server.
    pub has_more: bool,
    /// Whether a page request is in flight.
    pub loading: bool,
}

impl FeedCursor {
    /// Cursor in the `Idle` state, seeded from the host page.
    #[must_use]
    pub fn from_attributes(attrs: &FeedAttributes) -> Self {
        Self {
            page: attrs.page,
            has_more: attrs.has_more,
            loading: false,
        }
    }

    /// Move to `Loading` if idle. Returns `false` when a load is already running.
    pub fn try_begin_load(&mut self) -> bool {
        if self.loading {
            return false;
        }
        self.loading = true;
        true
    }

    /// Back to `Idle`.
    pub fn finish_load(&mut self) {
        self.loading = false;
    }

    /// Whether a scroll at `scroll_top` should request the next older page.
    #[must_use]
    pub fn wants_older(&self, scroll_top: f64, threshold: f64) -> bool {
        scroll_top < threshold && self.has_more && !self.loading
    }

    /// Record a page that carried no posts: only `more` is trusted.
    pub fn apply_empty(&mut self, response: &PageResponse) {
        self.has_more = response.more;
    }

    /// Record a page that was rendered into the feed.
    ///
    /// Falls back to `requested` when the server omitted the page number.
    pub fn apply_loaded(&mut self, response: &PageResponse, requested: u32) {
        self.page = response.page.unwrap_or(requested);
        self.has_more = response.more;
    }
}

/// Releases the in-flight flag when dropped.
///
/// Held for the whole duration of a load so that every exit path, including
/// early returns and errors, puts the cursor back into `Idle`.
#[derive(Debug)]
pub(crate) struct LoadGuard<'a> {
    cursor: &'a Mutex<FeedCursor>,
}

impl<'a> LoadGuard<'a> {
    /// Check-then-set under one lock. `None` if a load is already in flight.
    #[allow(clippy::unnecessary_lazy_evaluations)]
    pub(crate) fn acquire(cursor: &'a Mutex<FeedCursor>) -> Option<Self> {
        let mut state = cursor.lock().unwrap_or_else(PoisonError::into_inner);
        // Must stay lazy: a guard built and dropped here would relock `cursor`.
        state.try_begin_load().then(|| Self { cursor })
    }
}

impl Drop for LoadGuard<'_> {
    fn drop(&mut self) {
        self.cursor
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .finish_load();
    }
}
