//! Group scheduling primitives
//!
//! Traversal is organized around groups: one page plus every resource its
//! body references. The scheduler finishes a group's resources before the
//! next page starts, so a page and its assets always land in the mirror
//! together.

use std::collections::VecDeque;

use crate::url::is_resource_url;

/// One page and the URLs discovered while processing it.
///
/// The stack receives every admitted reference from the page's HTML and
/// from any CSS fetched for it; the drain loop empties it, possibly over
/// several passes as stylesheets contribute more entries.
#[derive(Debug, Clone)]
pub struct UrlGroup {
    /// The page URL this group was created for
    pub url: String,

    /// References admitted while processing this group
    pub stack: Vec<String>,
}

impl UrlGroup {
    pub fn new(url: String) -> Self {
        Self {
            url,
            stack: Vec::new(),
        }
    }
}

/// FIFO of pages waiting to be processed.
pub type GroupQueue = VecDeque<UrlGroup>;

/// Splits drained stack entries into `(resources, pages)` by path extension.
pub fn partition_stack(urls: Vec<String>) -> (Vec<String>, Vec<String>) {
    urls.into_iter().partition(|url| is_resource_url(url))
}
