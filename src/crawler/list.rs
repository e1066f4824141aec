//! Listing crawler with cursor pagination
//!
//! Discovery starts from a human-facing listing page, resolves the JSON API
//! entry point embedded in it, then follows the `next_page` cursor until the
//! API reports no further page or an empty page.

use std::sync::Arc;

use url::Url;

use crate::crawler::fetcher::Fetcher;
use crate::error::Result;
use crate::models::ListingPage;
use crate::parser::{extract_api_url, extract_object_id};
use crate::storage::IdentifierSink;
use crate::utils::error::ParseError;

/// Summary of one pagination run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaginationStats {
    /// API pages fetched, including the terminating one
    pub pages: usize,

    /// Identifiers appended to the sink
    pub object_ids: usize,
}

/// Listing crawler with cursor pagination
pub struct ListingPaginator {
    fetcher: Arc<Fetcher>,
}

impl ListingPaginator {
    /// Create new paginator
    ///
    /// # Arguments
    ///
    /// * `fetcher` - Shared rate-limited fetcher
    #[must_use]
    pub fn new(fetcher: Arc<Fetcher>) -> Self {
        Self { fetcher }
    }

    /// Resolve the discovery API URL from the seed listing page
    ///
    /// # Errors
    ///
    /// Returns `ParseError::ApiUrlNotFound` if the page carries no
    /// `{"apiUrl": ...}` config payload, or the fetch error.
    pub async fn fetch_api_url(&self, listing_url: &str) -> Result<String> {
        tracing::info!(url = %listing_url, "Fetch initial api url");

        let html = self.fetcher.fetch_text(listing_url).await?;

        let api_url = extract_api_url(&html)
            .ok_or_else(|| ParseError::ApiUrlNotFound(listing_url.to_string()))?;

        Ok(resolve(listing_url, &api_url))
    }

    /// Fetch and decode one API page
    pub async fn fetch_page(&self, api_url: &str) -> Result<ListingPage> {
        let body = self.fetcher.fetch_text(api_url).await?;

        let page = serde_json::from_str(&body).map_err(|source| ParseError::InvalidListing {
            url: api_url.to_string(),
            source,
        })?;

        Ok(page)
    }

    /// Walk every listing page and append the discovered object ids to `sink`
    ///
    /// Ids are appended in page order without deduplication. Any fetch or
    /// parse failure aborts the traversal; ids appended before the failure
    /// stay in the sink.
    pub async fn run(&self, listing_url: &str, sink: &mut IdentifierSink) -> Result<PaginationStats> {
        let mut api_url = self.fetch_api_url(listing_url).await?;
        let mut stats = PaginationStats::default();

        loop {
            tracing::info!(url = %api_url, "Fetching data");

            let page = self.fetch_page(&api_url).await?;
            stats.pages += 1;

            let next = match page.next_cursor() {
                Some(next) if !page.is_last() => next,
                _ => {
                    tracing::info!(pages = stats.pages, "Reached the end");
                    break;
                }
            };

            let object_ids: Vec<_> = page
                .fragments()
                .iter()
                .filter_map(|fragment| {
                    let object_id = extract_object_id(fragment);
                    if object_id.is_none() {
                        tracing::trace!(fragment = %fragment, "Dropping fragment without object id");
                    }
                    object_id
                })
                .collect();

            tracing::info!(
                amount = object_ids.len(),
                fragments = page.fragments().len(),
                "Found object ids"
            );

            for object_id in &object_ids {
                sink.append(object_id).await?;
            }
            stats.object_ids += object_ids.len();

            api_url = resolve(&api_url, &next);
        }

        Ok(stats)
    }
}

/// Resolve a possibly relative URL against the URL it was found on
fn resolve(base: &str, target: &str) -> String {
    Url::parse(base)
        .and_then(|base| base.join(target))
        .map(|url| url.to_string())
        .unwrap_or_else(|_| target.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_absolute() {
        assert_eq!(
            resolve("https://example.com/api?page=1", "https://other.com/api?page=2"),
            "https://other.com/api?page=2"
        );
    }

    #[test]
    fn test_resolve_relative() {
        assert_eq!(
            resolve("https://example.com/api/search?page=1", "/api/search?page=2"),
            "https://example.com/api/search?page=2"
        );
        assert_eq!(
            resolve("https://example.com/api/search?page=1", "search?page=3"),
            "https://example.com/api/search?page=3"
        );
    }
}
