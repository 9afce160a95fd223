//! Reverse infinite scroll over a feed container.
//!
//! The scroller owns one feed's cursor and container. Scrolling near the top
//! requests the next older page; the page is rendered, prepended, and the
//! scroll offset is shifted by the added height so the content the user was
//! looking at stays in place.
//!
//! # States
//!
//! `Idle --(near top, has_more)--> Loading --(response or failure)--> Idle`
//!
//! A load that fails leaves `page` and `has_more` untouched. There is no
//! retry and no timeout: the next scroll tick near the top tries again.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, error, info};

use super::cursor::{FeedCursor, LoadGuard};
use super::render::render_batch;
use super::source::PageSource;
use super::surface::FeedSurface;
use super::types::FeedAttributes;
use crate::error::FeedError;

/// Scroll offset below which the next older page is requested.
pub const NEAR_TOP_THRESHOLD: f64 = 120.0;

/// Tunables for a scroller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollerSettings {
    /// Offset from the top that triggers loading.
    pub near_top_threshold: f64,
}

impl Default for ScrollerSettings {
    fn default() -> Self {
        Self {
            near_top_threshold: NEAR_TOP_THRESHOLD,
        }
    }
}

/// Result of a single [`FeedScroller::load_older_page`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Another load was in flight; nothing happened.
    Skipped,
    /// Cards were prepended and the cursor advanced to `page`.
    Loaded {
        /// Number of cards inserted.
        inserted: usize,
        /// Page the cursor now points at.
        page: u32,
    },
    /// The page had no posts; only the `more` flag was updated.
    Empty {
        /// New value of `has_more`.
        more: bool,
    },
    /// The server answered with a non-success status.
    Rejected {
        /// HTTP status code.
        status: u16,
    },
    /// Transport or decode failure, logged.
    Failed,
}

/// Pagination driver for one feed container.
#[derive(Debug)]
pub struct FeedScroller<S, P> {
    group_id: String,
    settings: ScrollerSettings,
    cursor: Mutex<FeedCursor>,
    surface: Mutex<S>,
    source: P,
}

impl<S, P> FeedScroller<S, P>
where
    S: FeedSurface + Send,
    P: PageSource,
{
    /// Attach to a feed container.
    ///
    /// Returns `None` without doing anything when there is no container.
    /// Otherwise the container is scrolled to the bottom so the newest
    /// messages are visible first.
    pub fn attach(
        surface: Option<S>,
        source: P,
        attrs: FeedAttributes,
        settings: ScrollerSettings,
    ) -> Option<Self> {
        let mut surface = surface?;
        surface.scroll_to_bottom();

        info!(
            name: "feed.attached",
            group_id = %attrs.group_id,
            page = attrs.page,
            has_more = attrs.has_more,
            "Feed scroller attached"
        );

        Some(Self {
            cursor: Mutex::new(FeedCursor::from_attributes(&attrs)),
            group_id: attrs.group_id,
            settings,
            surface: Mutex::new(surface),
            source,
        })
    }

    /// Group this feed belongs to.
    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    /// Current cursor state.
    pub fn cursor(&self) -> FeedCursor {
        *self.lock_cursor()
    }

    /// Access the container. Do not hold the guard across an await point.
    pub fn surface(&self) -> MutexGuard<'_, S> {
        self.surface.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Handle a scroll event on the container.
    ///
    /// Requests `page + 1` when the offset is below the threshold, an older
    /// page exists and nothing is loading. Returns `None` if no load was
    /// started.
    pub async fn on_scroll(&self) -> Option<LoadOutcome> {
        let scroll_top = self.surface().scroll_top();
        let next = {
            let cursor = self.lock_cursor();
            if !cursor.wants_older(scroll_top, self.settings.near_top_threshold) {
                return None;
            }
            cursor.page.saturating_add(1)
        };
        Some(self.load_older_page(next).await)
    }

    /// Fetch `target` and prepend it, keeping the visible content anchored.
    ///
    /// At most one load runs at a time; a call made while another is in
    /// flight returns [`LoadOutcome::Skipped`] with no side effects.
    pub async fn load_older_page(&self, target: u32) -> LoadOutcome {
        let Some(_guard) = LoadGuard::acquire(&self.cursor) else {
            return LoadOutcome::Skipped;
        };

        let response = match self.source.fetch_page(&self.group_id, target).await {
            Ok(response) => response,
            Err(FeedError::Status { status }) => {
                debug!(
                    name: "feed.page.rejected",
                    group_id = %self.group_id,
                    page = target,
                    status,
                    "Page request rejected"
                );
                return LoadOutcome::Rejected { status };
            }
            Err(e) => {
                error!(
                    name: "feed.page.failed",
                    group_id = %self.group_id,
                    page = target,
                    error = %e,
                    "Failed to load page"
                );
                return LoadOutcome::Failed;
            }
        };

        if response.posts.is_empty() {
            self.lock_cursor().apply_empty(&response);
            debug!(
                name: "feed.page.empty",
                group_id = %self.group_id,
                page = target,
                more = response.more,
                "Empty page"
            );
            return LoadOutcome::Empty {
                more: response.more,
            };
        }

        let cards = render_batch(&response.posts);
        let inserted = cards.len();
        {
            let mut surface = self.surface();
            let old_top = surface.scroll_top();
            let old_height = surface.scroll_height();
            surface.prepend(cards);
            let new_height = surface.scroll_height();
            surface.set_scroll_top(old_top + (new_height - old_height));
        }

        let page = {
            let mut cursor = self.lock_cursor();
            cursor.apply_loaded(&response, target);
            cursor.page
        };

        info!(
            name: "feed.page.loaded",
            group_id = %self.group_id,
            page,
            inserted,
            more = response.more,
            "Older page loaded"
        );

        LoadOutcome::Loaded { inserted, page }
    }

    fn lock_cursor(&self) -> MutexGuard<'_, FeedCursor> {
        self.cursor.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::error::Result;
    use crate::feed::surface::MemorySurface;
    use crate::feed::types::{Message, PageResponse};

    /// Replays canned results and records the pages requested.
    #[derive(Debug, Default)]
    struct Scripted {
        results: Mutex<VecDeque<Result<PageResponse>>>,
        requested: Mutex<Vec<u32>>,
        calls: AtomicUsize,
    }

    impl Scripted {
        fn new(results: Vec<Result<PageResponse>>) -> Self {
            Self {
                results: Mutex::new(results.into()),
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl PageSource for Scripted {
        async fn fetch_page(&self, _group_id: &str, page: u32) -> Result<PageResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.requested.lock().unwrap().push(page);
            self.results
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(FeedError::Status { status: 404 }))
        }
    }

    fn page(page: u32, more: bool, posts: &[(&str, &str)]) -> Result<PageResponse> {
        Ok(PageResponse {
            posts: posts.iter().map(|(a, t)| Message::new(*a, *t)).collect(),
            page: Some(page),
            more,
        })
    }

    fn filled_surface(n: usize) -> MemorySurface {
        let cards = (0..n)
            .map(|i| crate::feed::render::render_message(&Message::new("seed", i.to_string())))
            .collect();
        MemorySurface::with_cards(300.0, cards)
    }

    fn scroller(
        results: Vec<Result<PageResponse>>,
        page: u32,
        has_more: bool,
    ) -> FeedScroller<MemorySurface, Scripted> {
        FeedScroller::attach(
            Some(filled_surface(10)),
            Scripted::new(results),
            FeedAttributes {
                group_id: "1".into(),
                page,
                has_more,
            },
            ScrollerSettings::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_attach_without_container_is_noop() {
        let scroller: Option<FeedScroller<MemorySurface, Scripted>> = FeedScroller::attach(
            None,
            Scripted::default(),
            FeedAttributes::from_dataset(Some("1"), Some("1"), Some("true")),
            ScrollerSettings::default(),
        );
        assert!(scroller.is_none());
    }

    #[test]
    fn test_attach_scrolls_to_bottom() {
        let s = scroller(Vec::new(), 0, true);
        let surface = s.surface();
        assert!((surface.scroll_top() - surface.max_scroll_top()).abs() < f64::EPSILON);
        assert!(surface.scroll_top() > 0.0);
    }

    #[tokio::test]
    async fn test_scroll_above_threshold_does_nothing() {
        let s = scroller(vec![page(1, true, &[("a", "x")])], 0, true);
        s.surface().set_scroll_top(120.0);
        assert_eq!(s.on_scroll().await, None);
        assert_eq!(s.source.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_near_top_loads_next_page_in_server_order() {
        let s = scroller(vec![page(4, true, &[("a", "first"), ("b", "second")])], 3, true);
        s.surface().set_scroll_top(50.0);

        let outcome = s.on_scroll().await;
        assert_eq!(outcome, Some(LoadOutcome::Loaded { inserted: 2, page: 4 }));
        assert_eq!(*s.source.requested.lock().unwrap(), vec![4]);

        let surface = s.surface();
        assert_eq!(surface.cards().len(), 12);
        assert_eq!(surface.cards()[0].author, "a");
        assert_eq!(surface.cards()[1].author, "b");
        assert_eq!(surface.cards()[2].author, "seed");
        drop(surface);

        let cursor = s.cursor();
        assert_eq!(cursor.page, 4);
        assert!(cursor.has_more);
        assert!(!cursor.loading);
    }

    #[tokio::test]
    async fn test_scroll_position_is_anchored() {
        let s = scroller(vec![page(1, true, &[("a", "one\ntwo"), ("b", "three")])], 0, true);
        s.surface().set_scroll_top(40.0);
        let (old_top, old_height) = {
            let surface = s.surface();
            (surface.scroll_top(), surface.scroll_height())
        };

        s.load_older_page(1).await;

        let surface = s.surface();
        let delta = surface.scroll_height() - old_height;
        assert!((delta - (104.0 + 80.0)).abs() < f64::EPSILON);
        assert!((surface.scroll_top() - (old_top + delta)).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_status_failure_keeps_state_and_releases_guard() {
        let s = scroller(
            vec![
                Err(FeedError::Status { status: 500 }),
                page(3, false, &[("a", "x")]),
            ],
            2,
            true,
        );
        s.surface().set_scroll_top(0.0);

        assert_eq!(
            s.on_scroll().await,
            Some(LoadOutcome::Rejected { status: 500 })
        );
        let cursor = s.cursor();
        assert_eq!((cursor.page, cursor.has_more, cursor.loading), (2, true, false));
        assert_eq!(s.surface().cards().len(), 10);

        // Same page is requested again on the next scroll.
        assert_eq!(
            s.on_scroll().await,
            Some(LoadOutcome::Loaded { inserted: 1, page: 3 })
        );
        assert_eq!(*s.source.requested.lock().unwrap(), vec![3, 3]);
    }

    #[tokio::test]
    async fn test_decode_failure_keeps_state() {
        let decode = serde_json::from_str::<PageResponse>("{not json").unwrap_err();
        let s = scroller(vec![Err(FeedError::Decode(decode))], 5, true);

        assert_eq!(s.load_older_page(6).await, LoadOutcome::Failed);
        let cursor = s.cursor();
        assert_eq!((cursor.page, cursor.has_more, cursor.loading), (5, true, false));
    }

    #[tokio::test]
    async fn test_empty_page_with_more_allows_retry() {
        let s = scroller(vec![page(1, true, &[])], 0, true);
        let top = s.surface().scroll_top();

        assert_eq!(s.load_older_page(1).await, LoadOutcome::Empty { more: true });
        let cursor = s.cursor();
        assert_eq!((cursor.page, cursor.has_more, cursor.loading), (0, true, false));
        assert_eq!(s.surface().cards().len(), 10);
        assert!((s.surface().scroll_top() - top).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_empty_page_with_more_refetches_same_page_on_scroll() {
        let s = scroller(
            vec![page(1, true, &[]), page(1, false, &[("a", "late")])],
            0,
            true,
        );
        s.surface().set_scroll_top(0.0);
        assert_eq!(s.on_scroll().await, Some(LoadOutcome::Empty { more: true }));

        s.surface().set_scroll_top(0.0);
        assert_eq!(
            s.on_scroll().await,
            Some(LoadOutcome::Loaded { inserted: 1, page: 1 })
        );
        assert_eq!(*s.source.requested.lock().unwrap(), vec![1, 1]);
        assert_eq!(s.source.calls.load(Ordering::SeqCst), 2);
        assert_eq!(s.surface().cards()[0].author, "a");
    }

    #[tokio::test]
    async fn test_no_more_stops_further_fetches() {
        let s = scroller(vec![page(1, false, &[("a", "last")])], 0, true);
        s.surface().set_scroll_top(0.0);
        assert!(s.on_scroll().await.is_some());

        s.surface().set_scroll_top(0.0);
        assert_eq!(s.on_scroll().await, None);
        assert_eq!(s.on_scroll().await, None);
        assert_eq!(s.source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_empty_page_without_more_stops_further_fetches() {
        let s = scroller(vec![page(1, false, &[])], 0, true);
        s.surface().set_scroll_top(0.0);
        assert_eq!(s.on_scroll().await, Some(LoadOutcome::Empty { more: false }));
        assert_eq!(s.on_scroll().await, None);
        assert_eq!(s.source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_null_posts_reads_as_final_empty_page() {
        let body: PageResponse =
            serde_json::from_str(r#"{"posts": null, "page": 1, "more": false}"#).unwrap();
        let s = scroller(vec![Ok(body)], 0, true);
        s.surface().set_scroll_top(0.0);

        assert_eq!(s.on_scroll().await, Some(LoadOutcome::Empty { more: false }));
        assert!(!s.cursor().has_more);
        assert_eq!(s.surface().cards().len(), 10);

        s.surface().set_scroll_top(0.0);
        assert_eq!(s.on_scroll().await, None);
        assert_eq!(s.source.calls.load(Ordering::SeqCst), 1);
    }
}
