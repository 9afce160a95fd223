//! The feed container the scroller mutates.

use super::render::MessageCard;

/// Height of a card without any body text: padding, border, author subtitle.
pub const CARD_CHROME_HEIGHT: f64 = 56.0;

/// Height of one body line.
pub const LINE_HEIGHT: f64 = 24.0;

/// A scrollable container holding rendered message cards.
///
/// Offsets and heights use the host's scroll unit (CSS pixels in a browser).
pub trait FeedSurface {
    /// Distance scrolled from the top.
    fn scroll_top(&self) -> f64;

    /// Total scrollable content height.
    fn scroll_height(&self) -> f64;

    /// Scroll to `offset`; the surface clamps it to its valid range.
    fn set_scroll_top(&mut self, offset: f64);

    /// Insert `cards` above the current first child.
    ///
    /// The first card of the batch becomes the topmost element and the
    /// batch keeps its relative order.
    fn prepend(&mut self, cards: Vec<MessageCard>);

    /// Scroll to the maximum offset, showing the newest messages.
    fn scroll_to_bottom(&mut self) {
        let height = self.scroll_height();
        self.set_scroll_top(height);
    }
}

/// In-memory container with a deterministic layout.
///
/// Each card is `CARD_CHROME_HEIGHT + LINE_HEIGHT * lines` tall. Scroll
/// offsets are clamped to `[0, scroll_height - viewport_height]`.
#[derive(Debug, Clone)]
pub struct MemorySurface {
    cards: Vec<MessageCard>,
    viewport_height: f64,
    scroll_top: f64,
}

impl MemorySurface {
    /// Empty container with the given visible height.
    #[must_use]
    pub fn new(viewport_height: f64) -> Self {
        Self {
            cards: Vec::new(),
            viewport_height,
            scroll_top: 0.0,
        }
    }

    /// Container pre-filled with the cards the host page rendered.
    #[must_use]
    pub fn with_cards(viewport_height: f64, cards: Vec<MessageCard>) -> Self {
        Self {
            cards,
            ..Self::new(viewport_height)
        }
    }

    /// Children in document order.
    #[must_use]
    pub fn cards(&self) -> &[MessageCard] {
        &self.cards
    }

    /// Visible height.
    #[must_use]
    pub fn viewport_height(&self) -> f64 {
        self.viewport_height
    }

    /// Largest valid scroll offset.
    #[must_use]
    pub fn max_scroll_top(&self) -> f64 {
        (self.content_height() - self.viewport_height).max(0.0)
    }

    fn content_height(&self) -> f64 {
        self.cards.iter().map(card_height).sum()
    }
}

impl FeedSurface for MemorySurface {
    fn scroll_top(&self) -> f64 {
        self.scroll_top
    }

    fn scroll_height(&self) -> f64 {
        self.content_height().max(self.viewport_height)
    }

    fn set_scroll_top(&mut self, offset: f64) {
        self.scroll_top = offset.clamp(0.0, self.max_scroll_top());
    }

    fn prepend(&mut self, cards: Vec<MessageCard>) {
        let below = std::mem::replace(&mut self.cards, cards);
        self.cards.extend(below);
    }
}

/// Laid-out height of a card.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn card_height(card: &MessageCard) -> f64 {
    CARD_CHROME_HEIGHT + LINE_HEIGHT * card.line_count() as f64
}
