//! Filesystem mirror: URL-to-path mapping and relocatable link construction

mod cache;
pub mod relocate;

pub use cache::MirrorCache;
pub use relocate::filesystem_url;
