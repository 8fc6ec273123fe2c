//! Link-following pagination for list endpoints.
//!
//! List responses arrive as
//! `{"count": N, "results": [...], "links": [{"rel": "next", "href": ...}]}`.
//! A [`Pager`] keeps issuing GETs along the `next` link until the server
//! stops providing one. Nothing is cached between pages; every element is
//! decoded exactly once.

use futures::stream::{self, Stream, TryStreamExt};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::trace;
use url::Url;

use crate::client::{ProviderClient, RequestOpts};
use crate::error::ApiError;

#[derive(Debug, Clone, Deserialize)]
pub struct Link {
    pub rel: String,
    pub href: String,
}

/// One decoded page of a list response.
#[derive(Debug, Deserialize)]
pub struct Page<T> {
    pub count: u64,
    pub results: Vec<T>,
    #[serde(default)]
    pub links: Vec<Link>,
}

impl<T> Page<T> {
    /// The `href` of the `rel: "next"` link, when the server provided one.
    pub fn next_url(&self) -> Option<&str> {
        self.links
            .iter()
            .find(|link| link.rel == "next")
            .map(|link| link.href.as_str())
    }
}

/// Walks a paginated listing from its first URL.
pub struct Pager {
    client: ProviderClient,
    next: Option<Url>,
}

impl Pager {
    pub fn new(client: &ProviderClient, first: Url) -> Self {
        Pager {
            client: client.clone(),
            next: Some(first),
        }
    }

    /// Fetch and decode the next page, or `None` once the listing is
    /// exhausted.
    pub async fn next_page<T: DeserializeOwned>(&mut self) -> Result<Option<Page<T>>, ApiError> {
        let url = match self.next.take() {
            Some(url) => url,
            None => return Ok(None),
        };
        trace!("fetching page {}", url);
        let response = self.client.get(url, RequestOpts::default()).await?;
        let page: Page<T> = response.extract_into()?;
        self.next = page.next_url().map(Url::parse).transpose()?;
        Ok(Some(page))
    }

    /// Collect every element from every remaining page.
    pub async fn all_pages<T: DeserializeOwned>(mut self) -> Result<Vec<T>, ApiError> {
        let mut elements = Vec::new();
        while let Some(page) = self.next_page::<T>().await? {
            elements.reserve(page.results.len());
            elements.extend(page.results);
        }
        Ok(elements)
    }

    /// Element stream over the remaining pages. Pages are fetched lazily as
    /// the stream is polled.
    pub fn into_stream<T: DeserializeOwned>(self) -> impl Stream<Item = Result<T, ApiError>> {
        stream::try_unfold(self, |mut pager| async move {
            match pager.next_page::<T>().await? {
                Some(page) => Ok::<_, ApiError>(Some((page.results, pager))),
                None => Ok(None),
            }
        })
        .map_ok(|results| stream::iter(results.into_iter().map(Ok)))
        .try_flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, serde::Deserialize, PartialEq)]
    struct Item {
        id: String,
    }

    #[test]
    fn test_page_decodes_and_exposes_next_link() {
        let page: Page<Item> = serde_json::from_value(json!({
            "count": 5,
            "results": [{"id": "a"}, {"id": "b"}],
            "links": [
                {"rel": "first", "href": "https://api.example/v1/items?page=1"},
                {"rel": "next", "href": "https://api.example/v1/items?page=2"}
            ]
        }))
        .unwrap();
        assert_eq!(page.count, 5);
        assert_eq!(page.results.len(), 2);
        assert_eq!(page.next_url(), Some("https://api.example/v1/items?page=2"));
    }

    #[test]
    fn test_last_page_has_no_next_link() {
        let page: Page<Item> = serde_json::from_value(json!({
            "count": 2,
            "results": [{"id": "a"}, {"id": "b"}]
        }))
        .unwrap();
        assert_eq!(page.next_url(), None);
    }
}
