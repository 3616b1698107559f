//! Mirror-local path to upstream URL routing
//!
//! The scheduler never fetches an admitted URL directly: it strips the
//! output origin and asks the mapping where the content actually lives.
//! This is what lets several upstream sites compose into one mirror tree.

use std::future::Future;
use std::pin::Pin;

use url::Url;

/// A future awaited before fetching, used to bring an upstream online
/// (start a dev server, warm a tunnel) on first contact.
pub type WakeUp = Pin<Box<dyn Future<Output = ()>>>;

/// Where to fetch a mirror-local path from.
pub struct FetchTarget {
    /// The upstream URL to request
    pub fetch_url: String,

    /// Awaited before the request is sent, when present
    pub wake_up: Option<WakeUp>,
}

/// Routes mirror-local paths to upstream fetch URLs.
///
/// `resolve` receives the admitted URL with the output origin stripped
/// (e.g. `/docs/intro`). Returning `None` skips the URL entirely.
pub trait UrlMapping {
    /// Translates a mirror-local path into the upstream URL to fetch.
    fn resolve(&self, local_path: &str) -> Option<FetchTarget>;

    /// Upstream origins whose absolute URLs should be folded into the
    /// mirror origin by the URL pipeline.
    fn known_origins(&self) -> Vec<String> {
        Vec::new()
    }
}

/// The default mapping: every local path maps onto a single upstream origin.
pub struct SingleSiteMapping {
    upstream_origin: String,
}

impl SingleSiteMapping {
    /// Creates a mapping rooted at the upstream origin (`scheme://host[:port]`).
    pub fn new(upstream_origin: impl Into<String>) -> Self {
        Self {
            upstream_origin: upstream_origin.into(),
        }
    }
}

impl UrlMapping for SingleSiteMapping {
    fn resolve(&self, local_path: &str) -> Option<FetchTarget> {
        Some(FetchTarget {
            fetch_url: format!("{}{}", self.upstream_origin, local_path),
            wake_up: None,
        })
    }

    fn known_origins(&self) -> Vec<String> {
        vec![self.upstream_origin.clone()]
    }
}

/// Factory producing a wake-up future for a mount.
pub type WakeUpFn = Box<dyn Fn() -> WakeUp>;

struct SiteMount {
    local_prefix: String,
    upstream_base: String,
    wake_up: Option<WakeUpFn>,
}

/// Composes several upstream sites into one mirror.
///
/// Mounts are consulted in registration order; the first whose local prefix
/// matches on a path boundary wins. Paths matching no mount are skipped.
#[derive(Default)]
pub struct MultiSiteMapping {
    mounts: Vec<SiteMount>,
}

impl MultiSiteMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mounts an upstream base URL under a local path prefix.
    pub fn mount(mut self, local_prefix: impl Into<String>, upstream_base: impl Into<String>) -> Self {
        self.mounts.push(SiteMount {
            local_prefix: local_prefix.into(),
            upstream_base: upstream_base.into(),
            wake_up: None,
        });
        self
    }

    /// Mounts an upstream with a wake-up callback awaited before each fetch.
    pub fn mount_with_wake_up(
        mut self,
        local_prefix: impl Into<String>,
        upstream_base: impl Into<String>,
        wake_up: WakeUpFn,
    ) -> Self {
        self.mounts.push(SiteMount {
            local_prefix: local_prefix.into(),
            upstream_base: upstream_base.into(),
            wake_up: Some(wake_up),
        });
        self
    }
}

impl UrlMapping for MultiSiteMapping {
    fn resolve(&self, local_path: &str) -> Option<FetchTarget> {
        for mount in &self.mounts {
            // Match whole path segments only: "/doc" owns "/doc" and
            // "/doc/...", never "/docside/...".
            let prefix = mount.local_prefix.trim_end_matches('/');
            let Some(rest) = local_path.strip_prefix(prefix) else {
                continue;
            };
            if !rest.is_empty() && !rest.starts_with('/') {
                continue;
            }
            return Some(FetchTarget {
                fetch_url: format!("{}{}", mount.upstream_base, rest),
                wake_up: mount.wake_up.as_ref().map(|factory| factory()),
            });
        }
        None
    }

    fn known_origins(&self) -> Vec<String> {
        let mut origins = Vec::new();
        for mount in &self.mounts {
            if let Ok(parsed) = Url::parse(&mount.upstream_base) {
                let origin = parsed.origin().ascii_serialization();
                if !origins.contains(&origin) {
                    origins.push(origin);
                }
            }
        }
        origins
    }
}
