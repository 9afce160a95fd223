//! Message card rendering.
//!
//! Rendering is split from DOM mutation: [`render_batch`] computes the cards
//! to prepend without touching any container, and [`MessageCard::to_html`]
//! produces the markup the host page and the dev server embed.

use super::types::Message;

/// A node inside a card body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyNode {
    /// A run of text, assigned as text content (never parsed as markup).
    Text(String),
    /// An explicit line break (`<br>`).
    LineBreak,
}

/// A rendered message: subtitle with the author, body with line-broken text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageCard {
    /// Author subtitle, verbatim.
    pub author: String,
    /// Body nodes in document order.
    pub body: Vec<BodyNode>,
}

impl MessageCard {
    /// Number of visual text lines in the body.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.line_breaks() + 1
    }

    /// Number of explicit line breaks in the body.
    #[must_use]
    pub fn line_breaks(&self) -> usize {
        self.body
            .iter()
            .filter(|node| matches!(node, BodyNode::LineBreak))
            .count()
    }

    /// Text segments in order, without the breaks between them.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.body.iter().filter_map(|node| match node {
            BodyNode::Text(text) => Some(text.as_str()),
            BodyNode::LineBreak => None,
        })
    }

    /// Render the card as HTML.
    #[must_use]
    pub fn to_html(&self) -> String {
        let mut out = String::from(
            r#"<div class="card mb-2"><div class="card-body"><h6 class="card-subtitle mb-2 text-muted">"#,
        );
        escape_into(&mut out, &self.author);
        out.push_str(r#"</h6><p class="card-text">"#);
        for node in &self.body {
            match node {
                BodyNode::Text(text) => escape_into(&mut out, text),
                BodyNode::LineBreak => out.push_str("<br>"),
            }
        }
        out.push_str("</p></div></div>");
        out
    }
}

/// Render a single message into a card.
///
/// The text is split on `\n` and the segments are re-joined with a line break
/// between each pair, with none before the first or after the last.
#[must_use]
pub fn render_message(message: &Message) -> MessageCard {
    let mut body = Vec::new();
    for (i, line) in message.text.split('\n').enumerate() {
        if i > 0 {
            body.push(BodyNode::LineBreak);
        }
        body.push(BodyNode::Text(line.to_string()));
    }
    MessageCard {
        author: message.author.clone(),
        body,
    }
}

/// Compute the cards to prepend for a page, preserving server order.
#[must_use]
pub fn render_batch(messages: &[Message]) -> Vec<MessageCard> {
    messages.iter().map(render_message).collect()
}

/// Render a list of cards as concatenated HTML.
#[must_use]
pub fn cards_html(cards: &[MessageCard]) -> String {
    cards.iter().map(MessageCard::to_html).collect()
}

/// Escape text for use as HTML text content or a quoted attribute value.
pub(crate) fn escape_into(out: &mut String, s: &str) {
    for c in s.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}
