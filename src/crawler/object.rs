//! Object detail extraction
//!
//! Fetches one object's detail page through the shared fetcher and turns it
//! into an [`ObjectRecord`] with the [`ObjectParser`] field strategies.

use std::sync::Arc;

use crate::crawler::fetcher::Fetcher;
use crate::error::Result;
use crate::models::{ObjectId, ObjectRecord};
use crate::parser::ObjectParser;

/// Fetches detail pages and derives object records
pub struct ObjectExtractor {
    fetcher: Arc<Fetcher>,
    parser: ObjectParser,
}

impl ObjectExtractor {
    #[must_use]
    pub fn new(fetcher: Arc<Fetcher>) -> Self {
        Self {
            fetcher,
            parser: ObjectParser::new(),
        }
    }

    /// Fetch and extract one object
    ///
    /// Returns `Ok(None)` when the page lists no phone number. Network
    /// failures are returned as errors.
    pub async fn extract(&self, id: &ObjectId, url: &str) -> Result<Option<ObjectRecord>> {
        tracing::info!(object_id = %id, url = %url, "Scraping object");

        let html = self.fetcher.fetch_text(url).await?;

        Ok(self.parser.parse(&html, id, url))
    }
}
