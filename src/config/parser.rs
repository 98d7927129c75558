use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use sumi_mirror::config::load_config;
///
/// let config = load_config(Path::new("mirror.toml")).unwrap();
/// println!("Max pages: {}", config.crawler.max_pages);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses and validates configuration from TOML text
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;

    validate(&config)?;

    Ok(config)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// The hash is logged at startup so a mirror can be traced back to the exact
/// configuration that produced it.
///
/// # Returns
///
/// * `Ok(String)` - Hex-encoded SHA-256 hash of the file content
/// * `Err(ConfigError)` - Failed to read the file
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    Ok(hash_content(&content))
}

/// Loads a configuration and returns both the config and its hash
///
/// The file is read once, so the hash always describes the text that was
/// parsed.
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config = parse_config(&content)?;
    Ok((config, hash_content(&content)))
}

fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
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
origin = "https://www.example.com"

[crawler]
max-pages = 25
seeds = ["/sitemap.xml", "/sitemap_index.xml"]

[user-agent]
crawler-name = "TestMirror"
crawler-version = "1.0"

[output]
root = "./out"

[assets]
hosts = ["*.cdn.example.com"]
host-regex = ['^static\d*\.squarespace\.com$']
max-path-len = 200
max-segment-len = 120
"#;

        let file = create_temp_config(config_content);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.origin, "https://www.example.com");
        assert_eq!(config.crawler.max_pages, 25);
        assert_eq!(config.crawler.seeds.len(), 2);
        assert_eq!(config.user_agent.crawler_name, "TestMirror");
        assert_eq!(config.output.root, "./out");
        assert_eq!(config.output.index_file, "index.html");
        assert_eq!(config.assets.hosts, vec!["*.cdn.example.com".to_string()]);
        assert_eq!(config.assets.max_segment_len, 120);
    }

    #[test]
    fn test_defaults_applied() {
        let config = parse_config(r#"origin = "https://example.com""#).unwrap();

        assert_eq!(config.crawler.max_pages, 5000);
        assert_eq!(config.crawler.seeds, vec!["/sitemap.xml".to_string()]);
        assert_eq!(config.output.root, "mirror");
        assert_eq!(config.assets.bucket, "_assets");
        assert_eq!(config.assets.max_path_len, 240);
        assert_eq!(config.assets.max_segment_len, 200);
        assert!(config.assets.extensions.contains(&".woff2".to_string()));
        assert!(!config.assets.restrict_offsite_assets);
    }

    #[test]
    fn test_missing_origin_is_parse_error() {
        let result = parse_config("[crawler]\nmax-pages = 3\n");
        assert!(matches!(result.unwrap_err(), ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_config_with_invalid_path() {
        let result = load_config(Path::new("/nonexistent/mirror.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_with_invalid_toml() {
        let file = create_temp_config("this is not valid TOML {{{");
        let result = load_config(file.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_with_validation_error() {
        let config_content = r#"
origin = "https://example.com"

[crawler]
max-pages = 0
"#;

        let file = create_temp_config(config_content);
        let result = load_config(file.path());
        assert!(matches!(result.unwrap_err(), ConfigError::Validation(_)));
    }

    #[test]
    fn test_compute_config_hash() {
        let file = create_temp_config("test content");

        let hash1 = compute_config_hash(file.path()).unwrap();
        let hash2 = compute_config_hash(file.path()).unwrap();

        // Same content should produce same hash
        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64); // SHA-256 produces 64 hex characters
    }

    #[test]
    fn test_load_config_with_hash_matches_file_hash() {
        let file = create_temp_config("origin = \"https://example.com\"\n");

        let (config, hash) = load_config_with_hash(file.path()).unwrap();

        assert_eq!(config.origin, "https://example.com");
        assert_eq!(hash, compute_config_hash(file.path()).unwrap());
    }

    #[test]
    fn test_different_content_different_hash() {
        let file1 = create_temp_config("content 1");
        let file2 = create_temp_config("content 2");

        let hash1 = compute_config_hash(file1.path()).unwrap();
        let hash2 = compute_config_hash(file2.path()).unwrap();

        assert_ne!(hash1, hash2);
    }
}
