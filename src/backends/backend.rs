use crate::error::Result;
use crate::results::{ContinueRequest, ScrapeRequest, ScrapeResult, SubpageBatch};
use std::future::Future;

/// Message shown when `/scrape` fails without an error body
pub const SCRAPE_FALLBACK_MESSAGE: &str = "Failed to scrape website";

/// Message shown when `/continue_scraping` fails without an error body
pub const CONTINUE_FALLBACK_MESSAGE: &str = "Failed to load more subpages";

// The two exchanges the viewer has with a scrape service
pub trait ScrapeBackend {
    /// Scrape the root page and the first slice of its subpages
    fn scrape(&self, request: &ScrapeRequest) -> impl Future<Output = Result<ScrapeResult>> + Send;

    /// Fetch a further slice of subpages for a previously scraped URL
    fn continue_scraping(
        &self,
        request: &ContinueRequest,
    ) -> impl Future<Output = Result<SubpageBatch>> + Send;
}
