use url::Url;

use crate::config::types::{CrawlSettings, MirrorConfig, MountEntry, SiteConfig};
use crate::ConfigError;

/// Validates the entire configuration
pub fn validate(config: &MirrorConfig) -> Result<(), ConfigError> {
    validate_site(&config.site)?;
    validate_crawl_settings(&config.crawler)?;
    validate_mounts(&config.mounts)?;
    Ok(())
}

/// Validates source/output site URLs and the entry point
fn validate_site(site: &SiteConfig) -> Result<(), ConfigError> {
    validate_site_url(&site.source_url, "source-url")?;

    if let Some(output) = &site.new_website_url {
        validate_site_url(output, "new-website-url")?;
    }

    // Entry points may be origin-relative paths; only absolute ones need to parse.
    if let Some(entry) = &site.entry_point {
        if entry.contains("://") {
            Url::parse(entry)
                .map_err(|e| ConfigError::InvalidUrl(format!("Invalid entry-point: {}", e)))?;
        }
    }

    Ok(())
}

fn validate_site_url(raw: &str, field: &str) -> Result<(), ConfigError> {
    let url = Url::parse(raw)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {}: {}", field, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "{} must use an http(s) scheme, got '{}'",
            field,
            url.scheme()
        )));
    }

    Ok(())
}

/// Validates crawl behavior settings
fn validate_crawl_settings(settings: &CrawlSettings) -> Result<(), ConfigError> {
    if settings.pause_duration_ms > 600_000 {
        return Err(ConfigError::Validation(format!(
            "pause-duration-ms must be <= 600000, got {}",
            settings.pause_duration_ms
        )));
    }

    for (field, prefixes) in [
        ("rewrite-urls", &settings.rewrite_urls),
        ("forbidden-urls", &settings.forbidden_urls),
        ("scan-urls", &settings.scan_urls),
    ] {
        for prefix in prefixes {
            if prefix.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "{} entries cannot be empty",
                    field
                )));
            }
        }
    }

    Ok(())
}

/// Validates multi-origin mount entries
fn validate_mounts(mounts: &[MountEntry]) -> Result<(), ConfigError> {
    for mount in mounts {
        if !mount.local_prefix.starts_with('/') {
            return Err(ConfigError::Validation(format!(
                "Mount local-prefix must start with '/', got '{}'",
                mount.local_prefix
            )));
        }

        validate_site_url(&mount.upstream_url, "upstream-url")?;
    }

    Ok(())
}
