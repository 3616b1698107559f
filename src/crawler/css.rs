//! CSS reference extraction
//!
//! Stylesheets are persisted unmodified — their `url(...)` references are
//! relative to the stylesheet and keep working in the mirror tree — but
//! every referenced asset still has to be fetched.

use std::sync::OnceLock;

use regex::Regex;

static CSS_URL_PATTERN: OnceLock<Regex> = OnceLock::new();

/// Returns every `url(...)` target in a stylesheet, quoted or bare, in
/// document order. Targets are returned raw; admission filtering happens
/// in the URL pipeline.
pub fn extract_css_urls(css: &str) -> Vec<String> {
    let pattern = CSS_URL_PATTERN.get_or_init(|| {
        Regex::new(r#"url\(\s*['"]?([^'")\s]+)['"]?\s*\)"#).expect("css url pattern")
    });

    pattern
        .captures_iter(css)
        .map(|capture| capture[1].to_string())
        .collect()
}
