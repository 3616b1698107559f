//! Sitefold: a website mirroring crawler
//!
//! This crate walks a live website from an entry URL, fetches every in-scope
//! page and resource, rewrites the discovered references to a relocatable
//! local form, and writes the result to a filesystem tree that opens via
//! `file://` without a web server.

pub mod config;
pub mod crawler;
pub mod hooks;
pub mod mapping;
pub mod mirror;
pub mod output;
pub mod url;

use thiserror::Error;

/// Main error type for Sitefold operations
#[derive(Debug, Error)]
pub enum SitefoldError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("URL is outside the crawl scope: {0}")]
    OutOfScope(String),
}

/// Result type alias for Sitefold operations
pub type Result<T> = std::result::Result<T, SitefoldError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::MirrorConfig;
pub use crawler::{CrawlerOptions, ProcessOutcome, WebsiteCrawler};
pub use hooks::{CacheHit, Hooks, TransformScope};
pub use mapping::{FetchTarget, MultiSiteMapping, SingleSiteMapping, UrlMapping};
pub use mirror::MirrorCache;
pub use output::CrawlReport;
pub use url::{is_resource_url, UrlScope, UrlSortTools};
