//! In-memory message history, paged newest-first.
//!
//! Page `0` is the newest page. Each page is returned in display order
//! (oldest first) so it can be prepended as a block.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{Duration, Utc};

use crate::feed::{Message, PageResponse};

/// Default number of messages per page.
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Thread-safe store of group message histories.
#[derive(Debug, Clone)]
pub struct PostStore {
    inner: Arc<PostStoreInner>,
}

#[derive(Debug)]
struct PostStoreInner {
    /// Per-group messages, sorted by creation time (oldest first).
    groups: RwLock<HashMap<String, Vec<Message>>>,
}

impl Default for PostStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PostStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(PostStoreInner {
                groups: RwLock::new(HashMap::new()),
            }),
        }
    }

    /// Create a store with demo conversations in groups `1`, `2` and `3`.
    ///
    /// Group `1` holds enough history to page through several times.
    #[must_use]
    pub fn with_demo_data() -> Self {
        let store = Self::new();
        let start = Utc::now() - Duration::days(1);

        let seed = [
            ("1", "jen", "I've hung the stockings!"),
            ("1", "brian", "Who's bringing cookies to the party?"),
            ("2", "eric", "Movie night this Friday?"),
            ("3", "vincent", "Secret Santa signups open."),
        ];
        let authors = ["jen", "brian", "eric", "ryan", "vincent", "bryan"];

        let mut minute = 0;
        for i in 0..64 {
            let author = authors[i % authors.len()];
            let text = if i % 5 == 0 {
                format!("Message {i}\nwith a second line")
            } else {
                format!("Message {i}")
            };
            store.insert("1", stamped(author, text, start + Duration::minutes(minute)));
            minute += 1;
        }
        for (group, author, text) in seed {
            store.insert(group, stamped(author, text.to_string(), start + Duration::minutes(minute)));
            minute += 1;
        }
        store
    }

    /// Add a message to a group, keeping the history ordered by creation time.
    ///
    /// Messages without a timestamp are stamped with the current time.
    pub fn insert(&self, group_id: &str, mut message: Message) {
        let created_at = *message.created_at.get_or_insert_with(Utc::now);
        let mut groups = self
            .inner
            .groups
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let posts = groups.entry(group_id.to_string()).or_default();
        let at = posts.partition_point(|p| p.created_at.is_some_and(|t| t <= created_at));
        posts.insert(at, message);
    }

    /// Total number of messages in a group.
    #[must_use]
    pub fn count(&self, group_id: &str) -> usize {
        self.inner
            .groups
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(group_id)
            .map_or(0, Vec::len)
    }

    /// Fetch one page of a group's history.
    ///
    /// Skips the `page * limit` newest messages, takes up to `limit` more and
    /// returns them oldest first. `more` is set when older messages remain.
    /// Unknown groups yield an empty page.
    #[must_use]
    pub fn page(&self, group_id: &str, page: u32, limit: usize) -> PageResponse {
        let groups = self
            .inner
            .groups
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        let posts = groups.get(group_id).map_or(&[][..], Vec::as_slice);

        let total = posts.len();
        let offset = (page as usize).saturating_mul(limit);
        let end = total.saturating_sub(offset);
        let start = end.saturating_sub(limit);
        let window = posts[start..end].to_vec();
        let more = total > offset.saturating_add(window.len());

        PageResponse {
            posts: window,
            page: Some(page),
            more,
        }
    }
}

fn stamped(author: &str, text: String, at: chrono::DateTime<Utc>) -> Message {
    Message {
        author: author.to_string(),
        text,
        created_at: Some(at),
    }
}
