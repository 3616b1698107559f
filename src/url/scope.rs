//! URL normalization and admission scope
//!
//! Every reference discovered in HTML, CSS, or configuration passes through
//! [`UrlScope::clean_up_url`] before it can reach the scheduler. The scope
//! turns arbitrary reference strings into normalized absolute URLs under the
//! output origin, or rejects them.

use url::Url;

/// Scheme prefixes that never enter the crawl
const SKIPPED_SCHEMES: &[&str] = &["data:", "javascript:", "mailto:", "tel:", "sms:", "ftp:"];

/// Admission scope for the crawl: output origin, required prefixes, and the
/// foreign-origin rewrite list.
#[derive(Debug, Clone)]
pub struct UrlScope {
    /// Output origin, e.g. `https://mirror.local` (no trailing slash)
    output_origin: String,

    /// Scheme of the output origin, e.g. `https`
    output_scheme: String,

    /// Lowercased prefix every admitted URL must start with
    required_prefix: String,

    /// Prefix used only to filter scheme-relative (`//host/...`) references
    required_prefix_2: String,

    /// Prefixes replaced by the output origin before scope checks
    rewrite_prefixes: Vec<String>,
}

impl UrlScope {
    /// Creates a scope rooted at the given output site.
    ///
    /// # Arguments
    ///
    /// * `output` - The parsed output site URL; its origin becomes the scope root
    /// * `required_prefix` - Optional admission prefix; defaults to the output origin
    /// * `rewrite_prefixes` - Absolute prefixes to fold into the output origin
    pub fn new(output: &Url, required_prefix: Option<&str>, rewrite_prefixes: Vec<String>) -> Self {
        let output_origin = output.origin().ascii_serialization();
        let output_scheme = output.scheme().to_string();

        let required_prefix = required_prefix
            .map(|p| p.trim().to_lowercase())
            .unwrap_or_else(|| output_origin.to_lowercase());

        // For scheme-relative references: the scheme segment of a user-supplied
        // prefix (`https:` from `https://host`), else `//` + output host.
        let required_prefix_2 = match required_prefix.find(':') {
            Some(idx) if required_prefix != output_origin.to_lowercase() => {
                required_prefix[..=idx].to_string()
            }
            _ => format!("//{}", output.host_str().unwrap_or_default().to_lowercase()),
        };

        Self {
            output_origin,
            output_scheme,
            required_prefix,
            required_prefix_2,
            rewrite_prefixes,
        }
    }

    /// The output origin (`scheme://host[:port]`, no trailing slash)
    pub fn output_origin(&self) -> &str {
        &self.output_origin
    }

    /// Adds an absolute prefix to the foreign-origin rewrite list, skipping
    /// duplicates and the output origin itself.
    pub fn add_rewrite_prefix(&mut self, prefix: String) {
        if prefix != self.output_origin && !self.rewrite_prefixes.contains(&prefix) {
            self.rewrite_prefixes.push(prefix);
        }
    }

    /// Normalizes a raw reference into an absolute in-scope URL.
    ///
    /// Steps, in order:
    ///
    /// 1. Trim; empty input is rejected
    /// 2. Pure fragments (`#...`) are rejected
    /// 3. Scheme-less input is resolved:
    ///    - `?query` is appended to `current` with its own query stripped
    ///    - `data:`/`javascript:`/`mailto:`/`tel:`/`sms:`/`ftp:` are rejected
    ///    - `//host/...` must match the scheme-relative prefix, then gains
    ///      the output scheme
    ///    - `/path` resolves against the output origin
    ///    - plain relative paths resolve against `current` (the page for
    ///      HTML references, the stylesheet for CSS references), falling
    ///      back to the output origin when there is no current URL
    /// 4. Absolute input has any matching rewrite prefix replaced by the
    ///    output origin
    /// 5. The result must start (case-insensitively) with the required prefix
    ///
    /// # Returns
    ///
    /// The normalized URL, or `None` when the reference is out of scope.
    pub fn clean_up_url(&self, raw: &str, current: Option<&str>) -> Option<String> {
        let reference = raw.trim();
        if reference.is_empty() {
            return None;
        }

        if reference.starts_with('#') {
            return None;
        }

        let absolute = if !reference.contains("://") {
            let lowered = reference.to_lowercase();

            if reference.starts_with('?') {
                let base = current.unwrap_or(&self.output_origin);
                let without_query = base.split('?').next().unwrap_or(base);
                format!("{}{}", without_query, reference)
            } else if SKIPPED_SCHEMES.iter().any(|s| lowered.starts_with(s)) {
                return None;
            } else if let Some(rest) = reference.strip_prefix("//") {
                if !lowered.starts_with(&self.required_prefix_2) {
                    return None;
                }
                format!("{}://{}", self.output_scheme, rest)
            } else if reference.starts_with('/') {
                format!("{}{}", self.output_origin, reference)
            } else {
                let base = current.unwrap_or(&self.output_origin);
                let base = Url::parse(base).ok()?;
                base.join(reference).ok()?.to_string()
            }
        } else {
            self.rewrite_foreign_origin(reference)
        };

        if !absolute.to_lowercase().starts_with(&self.required_prefix) {
            return None;
        }

        Some(absolute.trim().to_string())
    }

    /// Normalizes a reference found inside a stylesheet. CSS `url(...)`
    /// targets are relative to the stylesheet, not the page that linked it.
    pub fn clean_up_css_url(&self, raw: &str, stylesheet_url: &str) -> Option<String> {
        self.clean_up_url(raw, Some(stylesheet_url))
    }

    /// Replaces the first matching rewrite prefix with the output origin.
    ///
    /// Absolute URLs on known upstream origins are folded into the mirror
    /// origin so the rest of the pipeline treats them as local.
    pub fn rewrite_foreign_origin(&self, url: &str) -> String {
        for prefix in &self.rewrite_prefixes {
            if let Some(rest) = url.strip_prefix(prefix.as_str()) {
                return format!("{}{}", self.output_origin, rest);
            }
        }
        url.to_string()
    }
}
