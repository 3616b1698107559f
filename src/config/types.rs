use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::crawler::CrawlerOptions;
use crate::hooks::Hooks;
use crate::mapping::{MultiSiteMapping, UrlMapping};

/// Main configuration structure for a mirror run
#[derive(Debug, Clone, Deserialize)]
pub struct MirrorConfig {
    pub site: SiteConfig,

    #[serde(default)]
    pub crawler: CrawlSettings,

    #[serde(default)]
    pub output: OutputConfig,

    /// Optional multi-origin mounts composing several upstreams into one mirror
    #[serde(default)]
    pub mounts: Vec<MountEntry>,
}

/// Source and output site identity
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// The site to mirror
    #[serde(rename = "source-url")]
    pub source_url: String,

    /// Output origin when it differs from the source
    #[serde(rename = "new-website-url")]
    pub new_website_url: Option<String>,

    /// Where traversal begins; defaults to the output origin
    #[serde(rename = "entry-point")]
    pub entry_point: Option<String>,
}

/// Crawl behavior settings
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlSettings {
    /// Admission prefix; defaults to the output origin
    #[serde(rename = "required-prefix")]
    pub required_prefix: Option<String>,

    /// Delay before each fetch (milliseconds)
    #[serde(rename = "pause-duration-ms", default)]
    pub pause_duration_ms: u64,

    /// Disable TLS certificate verification
    #[serde(rename = "accept-invalid-certs", default = "default_true")]
    pub accept_invalid_certs: bool,

    /// Absolute prefixes folded into the output origin
    #[serde(rename = "rewrite-urls", default)]
    pub rewrite_urls: Vec<String>,

    /// Prefixes excluded from the crawl
    #[serde(rename = "forbidden-urls", default)]
    pub forbidden_urls: Vec<String>,

    /// Extra URLs injected into the initial crawl group
    #[serde(rename = "scan-urls", default)]
    pub scan_urls: Vec<String>,
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self {
            required_prefix: None,
            pause_duration_ms: 0,
            accept_invalid_certs: true,
            rewrite_urls: Vec::new(),
            forbidden_urls: Vec::new(),
            scan_urls: Vec::new(),
        }
    }
}

/// Mirror writer settings
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Root of the mirror tree; unset disables the writer
    pub directory: Option<PathBuf>,

    /// Rewrite references to `../`-relative form
    #[serde(rename = "relocatable-urls", default = "default_true")]
    pub relocatable_urls: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: None,
            relocatable_urls: true,
        }
    }
}

/// One upstream mounted under a local path prefix
#[derive(Debug, Clone, Deserialize)]
pub struct MountEntry {
    #[serde(rename = "local-prefix")]
    pub local_prefix: String,

    #[serde(rename = "upstream-url")]
    pub upstream_url: String,
}

fn default_true() -> bool {
    true
}

impl MirrorConfig {
    /// Converts the file configuration into crawler options. Hooks stay
    /// default; they are code-only.
    pub fn crawler_options(&self) -> CrawlerOptions {
        let url_mapping: Option<Box<dyn UrlMapping>> = if self.mounts.is_empty() {
            None
        } else {
            let mut mapping = MultiSiteMapping::new();
            for mount in &self.mounts {
                mapping = mapping.mount(mount.local_prefix.clone(), mount.upstream_url.clone());
            }
            Some(Box::new(mapping))
        };

        CrawlerOptions {
            required_prefix: self.crawler.required_prefix.clone(),
            output_dir: self.output.directory.clone(),
            require_relocatable_url: self.output.relocatable_urls,
            rewrite_this_urls: self.crawler.rewrite_urls.clone(),
            forbidden_urls: self.crawler.forbidden_urls.clone(),
            scan_this_urls: self.crawler.scan_urls.clone(),
            url_mapping,
            new_website_url: self.site.new_website_url.clone(),
            pause_duration: Duration::from_millis(self.crawler.pause_duration_ms),
            accept_invalid_certs: self.crawler.accept_invalid_certs,
            hooks: Hooks::default(),
        }
    }
}
