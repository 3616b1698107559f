//! Crawl coordination
//!
//! [`WebsiteCrawler`] owns the traversal state: the admission scope, the
//! seen set, the FIFO group queue, the mirror writer, and the user hooks.
//! Traversal is strictly sequential — one fetch and one write in flight at
//! any moment — which keeps the ordering guarantees trivial: a page's
//! resources are always drained before the next page starts.

use std::cell::RefCell;
use std::collections::HashSet;
use std::mem;
use std::path::PathBuf;
use std::time::Duration;

use reqwest::Client;
use url::Url;

use crate::crawler::css::extract_css_urls;
use crate::crawler::fetcher::{self, RetryPolicy};
use crate::crawler::rewriter::{rewrite_html, UrlRewrite};
use crate::crawler::scheduler::{partition_stack, GroupQueue, UrlGroup};
use crate::crawler::ProcessOutcome;
use crate::hooks::{Hooks, TransformScope};
use crate::mapping::{SingleSiteMapping, UrlMapping};
use crate::mirror::{filesystem_url, MirrorCache};
use crate::output::CrawlReport;
use crate::url::{UrlScope, UrlSortTools};
use crate::{SitefoldError, UrlError};

/// Configuration for a [`WebsiteCrawler`].
///
/// File-based configuration deserializes into [`crate::config::MirrorConfig`]
/// and converts into this; hooks and URL mappings are code-only.
pub struct CrawlerOptions {
    /// Admission prefix; defaults to the output origin
    pub required_prefix: Option<String>,

    /// Enables the filesystem mirror writer rooted here
    pub output_dir: Option<PathBuf>,

    /// Rewrite references to `../`-relative form so the tree opens via `file://`
    pub require_relocatable_url: bool,

    /// Absolute prefixes folded into the output origin
    pub rewrite_this_urls: Vec<String>,

    /// Prefixes excluded from the crawl (relative entries join the origin)
    pub forbidden_urls: Vec<String>,

    /// Extra URLs injected into the initial group's stack
    pub scan_this_urls: Vec<String>,

    /// Multi-origin resolver; defaults to the source site
    pub url_mapping: Option<Box<dyn UrlMapping>>,

    /// Output site origin when it differs from the source
    pub new_website_url: Option<String>,

    /// Delay inserted before each fetch
    pub pause_duration: Duration,

    /// Disable TLS certificate verification (the default: the tool targets
    /// developer and staging sites with self-signed certificates)
    pub accept_invalid_certs: bool,

    /// User callbacks
    pub hooks: Hooks,
}

impl Default for CrawlerOptions {
    fn default() -> Self {
        Self {
            required_prefix: None,
            output_dir: None,
            require_relocatable_url: true,
            rewrite_this_urls: Vec::new(),
            forbidden_urls: Vec::new(),
            scan_this_urls: Vec::new(),
            url_mapping: None,
            new_website_url: None,
            pause_duration: Duration::ZERO,
            accept_invalid_certs: true,
            hooks: Hooks::default(),
        }
    }
}

/// Mirrors one website into a relocatable local tree.
pub struct WebsiteCrawler {
    scope: UrlScope,
    seen: HashSet<String>,
    queue: GroupQueue,
    forbidden: Vec<String>,
    mapping: Box<dyn UrlMapping>,
    writer: Option<MirrorCache>,
    hooks: Hooks,
    client: Client,
    retry_policy: RetryPolicy,
    pause_duration: Duration,
    require_relocatable_url: bool,
    scan_this_urls: Vec<String>,
    report: CrawlReport,
    started: bool,
}

impl WebsiteCrawler {
    /// Creates a crawler for the given source site.
    ///
    /// The output origin is taken from `new_website_url` when set, else from
    /// the source. A differing source origin is automatically added to the
    /// rewrite list, as are the mapping's known origins, so absolute
    /// upstream links fold into the mirror.
    ///
    /// # Errors
    ///
    /// Returns an error when the source or output URL does not parse or is
    /// not http(s); everything after construction is best-effort.
    pub fn new(source_website: &str, options: CrawlerOptions) -> Result<Self, SitefoldError> {
        let source = Url::parse(source_website)?;
        if source.scheme() != "http" && source.scheme() != "https" {
            return Err(UrlError::InvalidScheme(source.scheme().to_string()).into());
        }

        let output = match &options.new_website_url {
            Some(raw) => Url::parse(raw)?,
            None => source.clone(),
        };

        let source_origin = source.origin().ascii_serialization();
        let output_origin = output.origin().ascii_serialization();

        let mut scope = UrlScope::new(
            &output,
            options.required_prefix.as_deref(),
            options.rewrite_this_urls,
        );
        if source_origin != output_origin {
            scope.add_rewrite_prefix(source_origin.clone());
        }

        let mapping: Box<dyn UrlMapping> = match options.url_mapping {
            Some(mapping) => mapping,
            None => Box::new(SingleSiteMapping::new(source_origin)),
        };
        for origin in mapping.known_origins() {
            scope.add_rewrite_prefix(origin);
        }

        let forbidden = options
            .forbidden_urls
            .iter()
            .map(|prefix| normalize_prefix(prefix, &output_origin))
            .collect();

        let client = fetcher::build_http_client(options.accept_invalid_certs)?;

        Ok(Self {
            scope,
            seen: HashSet::new(),
            queue: GroupQueue::new(),
            forbidden,
            mapping,
            writer: options.output_dir.map(MirrorCache::new),
            hooks: options.hooks,
            client,
            retry_policy: RetryPolicy::default(),
            pause_duration: options.pause_duration,
            require_relocatable_url: options.require_relocatable_url,
            scan_this_urls: options.scan_this_urls,
            report: CrawlReport::default(),
            started: false,
        })
    }

    /// The counters accumulated so far.
    pub fn report(&self) -> &CrawlReport {
        &self.report
    }

    /// Returns whether a URL has been admitted to the crawl.
    pub fn has_seen(&self, url: &str) -> bool {
        self.seen.contains(url)
    }

    /// Adds a forbidden prefix at runtime. Relative prefixes are joined
    /// onto the output origin.
    pub fn forbid_url_from(&mut self, prefix: &str) {
        let normalized = normalize_prefix(prefix, self.scope.output_origin());
        if !self.forbidden.contains(&normalized) {
            self.forbidden.push(normalized);
        }
    }

    /// Begins traversal at `entry_point` (defaults to the output origin)
    /// and returns when the queue drains or a hook halts the loop.
    ///
    /// A second call while a crawl is underway — or after one finished —
    /// is a no-op.
    pub async fn start(&mut self, entry_point: Option<&str>) -> Result<&CrawlReport, SitefoldError> {
        if self.started {
            tracing::warn!("Crawl already started; ignoring second start");
            return Ok(&self.report);
        }
        self.started = true;

        let entry = entry_point
            .map(str::to_string)
            .unwrap_or_else(|| self.scope.output_origin().to_string());
        let Some(admitted) = self.scope.clean_up_url(&entry, None) else {
            return Err(UrlError::OutOfScope(entry).into());
        };

        tracing::info!("Starting mirror crawl at {}", admitted);
        self.seen.insert(admitted.clone());
        self.report.urls_admitted += 1;

        let mut initial = UrlGroup::new(admitted);
        let extras = mem::take(&mut self.scan_this_urls);
        for extra in &extras {
            self.push_url(extra, &mut initial);
        }
        self.queue.push_back(initial);

        while let Some(group) = self.queue.pop_front() {
            if !self.process_group(group).await {
                tracing::info!("Traversal halted by hook");
                break;
            }
        }

        tracing::info!(
            "Crawl finished: {} pages, {} resources, {} failures",
            self.report.pages_downloaded,
            self.report.resources_downloaded,
            self.report.failures
        );
        Ok(&self.report)
    }

    /// Admits a reference found on the current page.
    ///
    /// Order matters: dedup against the seen set happens before the
    /// forbidden check, so forbidden URLs are only tested once; forbidden
    /// hits are returned (for attribute rewriting) without being stacked.
    /// Returns the empty string for references the scope rejects.
    pub(crate) fn push_url(&mut self, raw: &str, group: &mut UrlGroup) -> String {
        let cleaned = self.scope.clean_up_url(raw, Some(&group.url));
        self.admit(cleaned, group)
    }

    /// Admits a reference found inside a stylesheet, resolved against the
    /// stylesheet's own URL.
    fn push_css_url(&mut self, raw: &str, stylesheet_url: &str, group: &mut UrlGroup) -> String {
        let cleaned = self.scope.clean_up_css_url(raw, stylesheet_url);
        self.admit(cleaned, group)
    }

    fn admit(&mut self, cleaned: Option<String>, group: &mut UrlGroup) -> String {
        let Some(url) = cleaned else {
            return String::new();
        };

        if self.seen.contains(&url) {
            return url;
        }
        self.seen.insert(url.clone());
        self.report.urls_admitted += 1;

        if self
            .forbidden
            .iter()
            .any(|prefix| url.starts_with(prefix.as_str()))
        {
            tracing::debug!("Forbidden, will not fetch: {}", url);
            return url;
        }

        group.stack.push(url.clone());
        url
    }

    /// The built-in attribute transform: the on-disk form of the URL as
    /// referenced from `come_from_page`, post-processed by the user's
    /// `transform_url` hook.
    fn transform_found_url(&mut self, url: &str, come_from_page: &str, relocatable: bool) -> String {
        let transformed = filesystem_url(url, come_from_page, self.scope.output_origin(), relocatable);
        match self.hooks.transform_url.as_mut() {
            Some(hook) => hook(
                transformed,
                &TransformScope {
                    come_from_page: come_from_page.to_string(),
                    require_relocatable_url: relocatable,
                },
            ),
            None => transformed,
        }
    }

    /// Processes one group: the page itself, then every resource its body
    /// (and any fetched stylesheet) references. Newly discovered pages are
    /// queued at the tail. Returns false when a hook halts the traversal.
    async fn process_group(&mut self, mut group: UrlGroup) -> bool {
        tracing::info!("Processing page {}", group.url);

        let page_url = group.url.clone();
        let page_outcome = self.process_url(&page_url, &mut group).await;
        self.record_outcome(page_outcome, true);

        // Stylesheets push further references mid-drain; loop until the
        // stack stays empty.
        loop {
            let pending = mem::take(&mut group.stack);
            if pending.is_empty() {
                break;
            }

            let (resources, pages) = partition_stack(pending);
            let resources = self.filter_downloadable(resources, true);
            let mut pages = self.filter_downloadable(pages, false);

            if pages.len() > 1 {
                if let Some(hook) = self.hooks.sort_pages_to_download.as_mut() {
                    let mut tools = UrlSortTools::new(pages);
                    hook(&mut tools);
                    pages = tools.result();
                }
            }
            for page in pages {
                self.queue.push_back(UrlGroup::new(page));
            }

            for resource in resources {
                let outcome = self.process_url(&resource, &mut group).await;
                self.record_outcome(outcome, false);
                if let Some(hook) = self.hooks.on_resource_downloaded.as_mut() {
                    hook(&resource, outcome);
                }
            }
        }

        match self.hooks.on_page_fully_downloaded.as_mut() {
            Some(hook) => hook(&group.url, page_outcome),
            None => true,
        }
    }

    /// Fetches one URL through the mapping, with retries and manual
    /// redirect handling, and persists the (possibly rewritten) body.
    async fn process_url(&mut self, url: &str, group: &mut UrlGroup) -> ProcessOutcome {
        let partial = url
            .strip_prefix(self.scope.output_origin())
            .unwrap_or(url)
            .to_string();

        let Some(target) = self.mapping.resolve(&partial) else {
            tracing::debug!("No mapping for {}, skipping", partial);
            return ProcessOutcome::Skipped;
        };

        if self.hooks.can_ignore_if_already_crawled.is_some() {
            if let Some(hit) = self.writer.as_ref().and_then(|cache| cache.lookup(url)) {
                if let Some(hook) = self.hooks.can_ignore_if_already_crawled.as_mut() {
                    if hook(&partial, &hit) {
                        tracing::debug!("Already mirrored, skipping {}", url);
                        return ProcessOutcome::Skipped;
                    }
                }
            }
        }

        if let Some(wake_up) = target.wake_up {
            wake_up.await;
        }

        if let Some(hook) = self.hooks.on_url.as_mut() {
            hook(&partial, &target.fetch_url);
        }

        if !self.pause_duration.is_zero() {
            tokio::time::sleep(self.pause_duration).await;
        }

        let mut retry_count: u32 = 0;
        let response = loop {
            match fetcher::fetch_once(&self.client, &target.fetch_url).await {
                Ok(response) if response.status == 200 => break response,
                Ok(response) if response.is_redirect() => {
                    if let Some(location) = response.location {
                        tracing::debug!("{} redirected to {}", url, location);
                        self.push_url(&location, group);
                    }
                    return ProcessOutcome::Redirected;
                }
                Ok(response) => {
                    let keep_retrying = match self.hooks.on_invalid_response_code_found.as_mut() {
                        Some(hook) => hook(url, retry_count, response.status),
                        None => {
                            if self.retry_policy.allows_retry(retry_count) {
                                tokio::time::sleep(
                                    self.retry_policy.delay_for_attempt(retry_count),
                                )
                                .await;
                                true
                            } else {
                                false
                            }
                        }
                    };
                    if !keep_retrying {
                        tracing::warn!("Giving up on {} after status {}", url, response.status);
                        return ProcessOutcome::Failed;
                    }
                    retry_count += 1;
                }
                Err(error) => {
                    if !self.retry_policy.allows_retry(retry_count) {
                        tracing::warn!("Giving up on {}: {}", url, error);
                        return ProcessOutcome::Failed;
                    }
                    tracing::debug!("Fetch error for {} (retry {}): {}", url, retry_count, error);
                    tokio::time::sleep(self.retry_policy.delay_for_attempt(retry_count)).await;
                    retry_count += 1;
                }
            }
        };

        let mut body = response.body;

        if response.content_type.starts_with("text/html") {
            let html = String::from_utf8_lossy(&body).into_owned();
            let relocatable = self.require_relocatable_url;
            let rewritten = {
                let sink = RefCell::new(PageSink {
                    crawler: &mut *self,
                    group: &mut *group,
                    relocatable,
                });
                rewrite_html(&html, &sink)
            };
            let rewritten = match self.hooks.on_html.as_mut() {
                Some(hook) => hook(rewritten, &partial, &target.fetch_url),
                None => rewritten,
            };
            body = rewritten.into_bytes();
        } else if response.content_type.starts_with("text/css") {
            let css = String::from_utf8_lossy(&body).into_owned();
            for reference in extract_css_urls(&css) {
                self.push_css_url(&reference, url, group);
            }
        }

        if let Some(writer) = self.writer.as_ref() {
            writer.store(url, response.status, &body);
            self.report.bytes_written += body.len() as u64;
        }

        ProcessOutcome::Downloaded
    }

    fn filter_downloadable(&mut self, urls: Vec<String>, is_resource: bool) -> Vec<String> {
        match self.hooks.can_download.as_mut() {
            Some(hook) => urls.into_iter().filter(|url| hook(url, is_resource)).collect(),
            None => urls,
        }
    }

    fn record_outcome(&mut self, outcome: ProcessOutcome, is_page: bool) {
        match outcome {
            ProcessOutcome::Downloaded => {
                if is_page {
                    self.report.pages_downloaded += 1;
                } else {
                    self.report.resources_downloaded += 1;
                }
            }
            ProcessOutcome::Redirected => self.report.redirects += 1,
            ProcessOutcome::Failed => self.report.failures += 1,
            ProcessOutcome::Skipped => self.report.skipped += 1,
        }
    }
}

/// Joins relative forbidden/rewrite prefixes onto the output origin so they
/// compare against full admitted URLs.
fn normalize_prefix(prefix: &str, origin: &str) -> String {
    let prefix = prefix.trim();
    if prefix.contains("://") {
        prefix.to_string()
    } else if prefix.starts_with('/') {
        format!("{}{}", origin, prefix)
    } else {
        format!("{}/{}", origin, prefix)
    }
}

/// Bridges the streaming rewriter back into the crawler: every offered URL
/// is admitted, then answered with its rewritten local form.
struct PageSink<'a> {
    crawler: &'a mut WebsiteCrawler,
    group: &'a mut UrlGroup,
    relocatable: bool,
}

impl UrlRewrite for PageSink<'_> {
    fn rewrite_url(&mut self, raw: &str) -> Option<String> {
        let pushed = self.crawler.push_url(raw, self.group);
        if pushed.is_empty() {
            return None;
        }
        let come_from_page = self.group.url.clone();
        Some(
            self.crawler
                .transform_found_url(&pushed, &come_from_page, self.relocatable),
        )
    }
}
