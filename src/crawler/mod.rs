//! Crawler: admission, traversal, fetching, and reference rewriting

pub mod css;
pub mod fetcher;
pub mod rewriter;
pub mod scheduler;

mod coordinator;

pub use coordinator::{CrawlerOptions, WebsiteCrawler};
pub use fetcher::{build_http_client, FetchedResponse, RetryPolicy};
pub use scheduler::{GroupQueue, UrlGroup};

/// Terminal outcome of processing one URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// Fetched with status 200 and handed to the mirror writer
    Downloaded,

    /// Responded 3xx; the redirect target was pushed into the crawl
    Redirected,

    /// Exhausted the retry policy or failed in transit
    Failed,

    /// No mapping for the URL, or skipped by the already-crawled hook
    Skipped,
}

impl ProcessOutcome {
    /// Returns true when a body was fetched and persisted.
    pub fn is_downloaded(&self) -> bool {
        matches!(self, Self::Downloaded)
    }
}
