//! URL handling for Sitefold
//!
//! This module provides the admission scope (normalization, prefix filtering,
//! foreign-origin rewriting), page-vs-resource classification, and the page
//! ordering helper exposed to the sort hook.

mod scope;
mod sort;

pub use scope::UrlScope;
pub use sort::UrlSortTools;

use url::Url;

/// Path extensions fetched inline with their parent page instead of being
/// scheduled as pages of their own.
pub const RESOURCE_EXTENSIONS: &[&str] = &[
    "css", "js", "jpg", "png", "jpeg", "gif", "woff", "woff2", "ttf", "txt", "avif",
];

/// Returns true when the URL names an in-page resource (stylesheet, script,
/// image, font) rather than a page.
///
/// Classification depends only on the extension of the URL path; query and
/// fragment are ignored.
pub fn is_resource_url(url: &str) -> bool {
    let path = match Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        // Not absolute; look at the raw string minus query and fragment.
        Err(_) => {
            let trimmed = url.split('?').next().unwrap_or(url);
            trimmed.split('#').next().unwrap_or(trimmed).to_string()
        }
    };

    let last_segment = path.rsplit('/').next().unwrap_or("");
    match last_segment.rsplit_once('.') {
        Some((_, extension)) => RESOURCE_EXTENSIONS.contains(&extension.to_lowercase().as_str()),
        None => false,
    }
}
