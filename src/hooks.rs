//! User hook surface
//!
//! Every hook is an optional boxed closure; unset hooks fall back to the
//! crawler's default behavior. Hooks run synchronously on the traversal
//! task — the only awaited user extension point is
//! [`crate::mapping::FetchTarget::wake_up`].

use std::path::PathBuf;

use chrono::{DateTime, Utc};

use crate::crawler::ProcessOutcome;
use crate::url::UrlSortTools;

/// Context handed to the `transform_url` hook.
#[derive(Debug, Clone)]
pub struct TransformScope {
    /// The page whose body produced the reference being rewritten
    pub come_from_page: String,

    /// Whether the built-in transform produced a `../`-relative value
    pub require_relocatable_url: bool,
}

/// A mirror-cache probe result handed to `can_ignore_if_already_crawled`.
#[derive(Debug, Clone)]
pub struct CacheHit {
    /// When the cached file was written
    pub added_to_cache: DateTime<Utc>,

    /// The cached file on disk
    pub file_path: PathBuf,

    /// The URL the cached file was fetched for
    pub source_url: String,
}

/// Notification that a URL is about to be fetched: `(local_url, fetch_url)`.
pub type OnUrlHook = Box<dyn FnMut(&str, &str)>;

/// Rewrites a page body after reference rewriting:
/// `(html, local_url, fetch_url) -> html`.
pub type OnHtmlHook = Box<dyn FnMut(String, &str, &str) -> String>;

/// Post-processes every rewritten attribute value.
pub type TransformUrlHook = Box<dyn FnMut(String, &TransformScope) -> String>;

/// Decides whether a cached URL can be skipped: `(local_url, hit) -> skip`.
pub type CanIgnoreHook = Box<dyn FnMut(&str, &CacheHit) -> bool>;

/// Filters URLs out of a group's drain: `(url, is_resource) -> download`.
pub type CanDownloadHook = Box<dyn FnMut(&str, bool) -> bool>;

/// Overrides the retry policy: `(url, retry_count, status) -> keep retrying`.
pub type InvalidStatusHook = Box<dyn FnMut(&str, u32, u16) -> bool>;

/// Fired after a group drains: `(page_url, outcome) -> keep crawling`.
pub type PageDownloadedHook = Box<dyn FnMut(&str, ProcessOutcome) -> bool>;

/// Fired after each resource fetch: `(url, outcome)`.
pub type ResourceDownloadedHook = Box<dyn FnMut(&str, ProcessOutcome)>;

/// Reorders or drops pending pages before they are queued.
pub type SortPagesHook = Box<dyn FnMut(&mut UrlSortTools)>;

/// The optional callbacks a crawl can be configured with.
#[derive(Default)]
pub struct Hooks {
    pub on_url: Option<OnUrlHook>,
    pub on_html: Option<OnHtmlHook>,
    pub transform_url: Option<TransformUrlHook>,
    pub can_ignore_if_already_crawled: Option<CanIgnoreHook>,
    pub can_download: Option<CanDownloadHook>,
    pub on_invalid_response_code_found: Option<InvalidStatusHook>,
    pub on_page_fully_downloaded: Option<PageDownloadedHook>,
    pub on_resource_downloaded: Option<ResourceDownloadedHook>,
    pub sort_pages_to_download: Option<SortPagesHook>,
}

impl std::fmt::Debug for Hooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let configured = |present: bool| if present { "set" } else { "unset" };
        f.debug_struct("Hooks")
            .field("on_url", &configured(self.on_url.is_some()))
            .field("on_html", &configured(self.on_html.is_some()))
            .field("transform_url", &configured(self.transform_url.is_some()))
            .field(
                "can_ignore_if_already_crawled",
                &configured(self.can_ignore_if_already_crawled.is_some()),
            )
            .field("can_download", &configured(self.can_download.is_some()))
            .field(
                "on_invalid_response_code_found",
                &configured(self.on_invalid_response_code_found.is_some()),
            )
            .field(
                "on_page_fully_downloaded",
                &configured(self.on_page_fully_downloaded.is_some()),
            )
            .field(
                "on_resource_downloaded",
                &configured(self.on_resource_downloaded.is_some()),
            )
            .field(
                "sort_pages_to_download",
                &configured(self.sort_pages_to_download.is_some()),
            )
            .finish()
    }
}
