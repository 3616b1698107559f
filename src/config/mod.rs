//! Configuration loading and validation

mod parser;
mod types;
mod validation;

pub use parser::load_config;
pub use types::{CrawlSettings, MirrorConfig, MountEntry, OutputConfig, SiteConfig};
pub use validation::validate;
