//! Crawl reporting

mod stats;

pub use stats::{print_report, CrawlReport};
