//! Wire and host-element types for the feed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// A single chat message as served by the posts endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    /// Display name of the author.
    pub author: String,
    /// Message body. May contain embedded newlines.
    pub text: String,
    /// Creation time, when the server includes it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Message {
    /// Create a message without a timestamp.
    pub fn new(author: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            text: text.into(),
            created_at: None,
        }
    }
}

/// One page of older messages returned by `GET /group/{id}/posts`.
///
/// Missing or null fields degrade gracefully: no `posts` reads as an empty
/// page and no `more` reads as "no older pages".
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageResponse {
    /// Messages in display order (oldest first).
    #[serde(default, deserialize_with = "null_as_default")]
    pub posts: Vec<Message>,
    /// Page number this payload represents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    /// Whether a further, older page exists.
    #[serde(default, deserialize_with = "null_as_default")]
    pub more: bool,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Initial feed state declared by the host page on the container element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedAttributes {
    /// Group identifier, used verbatim in the endpoint path.
    pub group_id: String,
    /// Page already rendered by the host page.
    pub page: u32,
    /// Whether an older page is available.
    pub has_more: bool,
}

impl FeedAttributes {
    /// Parse the container's `data-*` attributes.
    ///
    /// The page is read from its leading digits, so `"3px"` is `3`; an absent
    /// value or one without leading digits reads as `0`. `has_more` is true
    /// only for the exact strings `"True"` and `"true"`.
    pub fn from_dataset(page: Option<&str>, group_id: Option<&str>, has_more: Option<&str>) -> Self {
        Self {
            group_id: group_id.unwrap_or_default().to_string(),
            page: page.and_then(leading_page_number).unwrap_or(0),
            has_more: matches!(has_more, Some("True" | "true")),
        }
    }
}

fn leading_page_number(raw: &str) -> Option<u32> {
    let digits = raw.trim_start();
    let digits = digits.strip_prefix('+').unwrap_or(digits);
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse().ok()
}
