//! Filesystem-backed mirror cache
//!
//! Maps URLs onto a deterministic path under the output root and persists
//! fetched bodies there. The host is always serialized as `localhost` with
//! scheme and port dropped, so `https://site.example/a/b` and
//! `http://site.example:8080/a/b` land on the same file.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use url::Url;

use crate::hooks::CacheHit;
use crate::mirror::relocate::apply_index_convention;

/// Persists fetched bodies under a root directory keyed by URL path.
#[derive(Debug, Clone)]
pub struct MirrorCache {
    root: PathBuf,
}

impl MirrorCache {
    /// Creates a cache rooted at the given directory. The directory is
    /// created lazily on the first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The configured root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Computes the file this URL persists to: the URL path joined under
    /// `<root>/localhost/`, with the directory/index convention applied.
    ///
    /// Returns `None` for strings that do not parse as absolute URLs.
    pub fn file_path(&self, url: &str) -> Option<PathBuf> {
        let parsed = Url::parse(url).ok()?;
        let path = apply_index_convention(parsed.path());

        let mut file = self.root.join("localhost");
        for segment in path.split('/').filter(|segment| !segment.is_empty()) {
            file.push(segment);
        }
        Some(file)
    }

    /// Persists a fetched body. Only `200` responses are written; parent
    /// directories are created on demand. Write failures are logged and
    /// swallowed — a partial mirror beats an aborted one.
    pub fn store(&self, url: &str, status: u16, body: &[u8]) {
        if status != 200 {
            return;
        }

        let Some(path) = self.file_path(url) else {
            tracing::warn!("Not persisting unparseable URL: {}", url);
            return;
        };

        if let Some(parent) = path.parent() {
            if let Err(error) = std::fs::create_dir_all(parent) {
                tracing::warn!("Failed to create {}: {}", parent.display(), error);
                return;
            }
        }

        match std::fs::write(&path, body) {
            Ok(()) => tracing::debug!("Wrote {} ({} bytes)", path.display(), body.len()),
            Err(error) => tracing::warn!("Failed to write {}: {}", path.display(), error),
        }
    }

    /// Probes the cache for a previously persisted URL.
    pub fn lookup(&self, url: &str) -> Option<CacheHit> {
        let path = self.file_path(url)?;
        let metadata = std::fs::metadata(&path).ok()?;
        if !metadata.is_file() {
            return None;
        }

        let added_to_cache = metadata
            .modified()
            .map(DateTime::<Utc>::from)
            .unwrap_or_else(|_| Utc::now());

        Some(CacheHit {
            added_to_cache,
            file_path: path,
            source_url: url.to_string(),
        })
    }
}
