//! Page sources: where older pages come from.

use async_trait::async_trait;
use tracing::debug;
use url::Url;

use super::types::PageResponse;
use crate::error::{FeedError, Result};

/// Fetches one page of a group's message history.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetch `page` for `group_id`.
    ///
    /// A non-success status is reported as [`FeedError::Status`], a malformed
    /// body as [`FeedError::Decode`].
    async fn fetch_page(&self, group_id: &str, page: u32) -> Result<PageResponse>;
}

/// [`PageSource`] backed by `GET /group/{groupId}/posts?page={n}`.
#[derive(Debug, Clone)]
pub struct HttpPageSource {
    base_url: Url,
    http: reqwest::Client,
}

impl HttpPageSource {
    /// Create a source for the server at `base_url` (e.g. `http://127.0.0.1:3000`).
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        Self::with_client(base_url, reqwest::Client::new())
    }

    /// Create a source with a custom reqwest client.
    pub fn with_client(base_url: impl AsRef<str>, http: reqwest::Client) -> Result<Self> {
        let base_url = Url::parse(base_url.as_ref())?;
        Ok(Self { base_url, http })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Endpoint URL for a page. The group id is inserted into the path as is.
    pub fn page_url(&self, group_id: &str, page: u32) -> Result<Url> {
        let mut url = self.base_url.join(&format!("/group/{group_id}/posts"))?;
        url.query_pairs_mut()
            .append_pair("page", &page.to_string());
        Ok(url)
    }
}

#[async_trait]
impl PageSource for HttpPageSource {
    async fn fetch_page(&self, group_id: &str, page: u32) -> Result<PageResponse> {
        let url = self.page_url(group_id, page)?;
        debug!(name: "feed.page.request", %url, "Requesting page");

        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_url() {
        let source = HttpPageSource::new("http://localhost:3000").unwrap();
        let url = source.page_url("12", 4).unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/group/12/posts?page=4");
    }

    #[test]
    fn test_page_url_ignores_base_path() {
        let source = HttpPageSource::new("http://localhost:3000/group/12").unwrap();
        let url = source.page_url("12", 1).unwrap();
        assert_eq!(url.path(), "/group/12/posts");
        assert_eq!(url.query(), Some("page=1"));
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            HttpPageSource::new("not a url"),
            Err(FeedError::InvalidUrl(_))
        ));
    }
}
