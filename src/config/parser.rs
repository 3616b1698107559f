use std::path::Path;

use crate::config::types::MirrorConfig;
use crate::config::validation::validate;
use crate::ConfigError;

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(MirrorConfig)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
pub fn load_config(path: &Path) -> Result<MirrorConfig, ConfigError> {
    // Read the configuration file
    let content = std::fs::read_to_string(path)?;

    // Parse TOML
    let config: MirrorConfig = toml::from_str(&content)?;

    // Validate the configuration
    validate(&config)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_valid_config() {
        let config_content = r#"
[site]
source-url = "https://upstream.local"
new-website-url = "https://mirror.local"
entry-point = "/"

[crawler]
pause-duration-ms = 250
forbidden-urls = ["/wp-json"]

[output]
directory = "./mirror"
relocatable-urls = true
"#;

        let file = create_temp_config(config_content);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.site.source_url, "https://upstream.local");
        assert_eq!(
            config.site.new_website_url.as_deref(),
            Some("https://mirror.local")
        );
        assert_eq!(config.crawler.pause_duration_ms, 250);
        assert_eq!(config.crawler.forbidden_urls, ["/wp-json"]);
        assert!(config.output.relocatable_urls);
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config_content = r#"
[site]
source-url = "https://upstream.local"
"#;

        let file = create_temp_config(config_content);
        let config = load_config(file.path()).unwrap();

        assert!(config.crawler.accept_invalid_certs);
        assert_eq!(config.crawler.pause_duration_ms, 0);
        assert!(config.output.directory.is_none());
        assert!(config.output.relocatable_urls);
        assert!(config.mounts.is_empty());
    }

    #[test]
    fn test_mount_entries_parse() {
        let config_content = r#"
[site]
source-url = "https://upstream.local"

[[mounts]]
local-prefix = "/docs"
upstream-url = "https://docs.upstream.local"
"#;

        let file = create_temp_config(config_content);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.mounts.len(), 1);
        assert_eq!(config.mounts[0].local_prefix, "/docs");
    }

    #[test]
    fn test_load_config_with_invalid_path() {
        let result = load_config(Path::new("/nonexistent/mirror.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_with_invalid_toml() {
        let file = create_temp_config("this is not valid TOML {{{");
        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn test_load_config_with_validation_error() {
        let config_content = r#"
[site]
source-url = "ftp://upstream.local"
"#;

        let file = create_temp_config(config_content);
        let result = load_config(file.path());

        assert!(matches!(
            result.unwrap_err(),
            crate::ConfigError::Validation(_)
        ));
    }
}
