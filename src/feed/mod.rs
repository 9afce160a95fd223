//! Reverse infinite scroll for a chat feed.
//!
//! A feed container shows the newest messages first (scrolled to the bottom).
//! When the user scrolls near the top, the next older page is fetched from
//! `GET /group/{groupId}/posts?page={n}` and prepended without moving the
//! content already on screen.
//!
//! # Architecture
//!
//! - [`FeedScroller`]: owns the cursor and drives loading on scroll
//! - [`FeedSurface`]: the container being mutated ([`MemorySurface`] in-crate)
//! - [`PageSource`]: where pages come from ([`HttpPageSource`] over HTTP)
//! - [`render`]: pure message-to-card rendering
//!
//! # Example
//!
//! ```rust
//! use feed_scroll::feed::{FeedAttributes, render_message, Message};
//!
//! let attrs = FeedAttributes::from_dataset(Some("0"), Some("1"), Some("True"));
//! assert!(attrs.has_more);
//!
//! let card = render_message(&Message::new("jen", "a\nb"));
//! assert_eq!(card.line_breaks(), 1);
//! ```

mod cursor;
pub mod render;
mod scroller;
mod source;
mod surface;
mod types;

pub use cursor::FeedCursor;
pub use render::{BodyNode, MessageCard, cards_html, render_batch, render_message};
pub use scroller::{FeedScroller, LoadOutcome, NEAR_TOP_THRESHOLD, ScrollerSettings};
pub use source::{HttpPageSource, PageSource};
pub use surface::{CARD_CHROME_HEIGHT, FeedSurface, LINE_HEIGHT, MemorySurface, card_height};
pub use types::{FeedAttributes, Message, PageResponse};
