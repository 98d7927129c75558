use crate::config::types::{AssetConfig, Config, CrawlerConfig, OutputConfig, UserAgentConfig};
use crate::layout::{DIGEST_HEX_LEN, HINT_LEN, MAX_EXTENSION_LEN};
use crate::ConfigError;
use regex::Regex;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_origin(&config.origin)?;
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    validate_asset_config(&config.assets, &config.output)?;
    Ok(())
}

/// Longest file name the hashed fallback can produce: `<hint>-<digest><ext>`
pub fn hashed_name_max_len() -> usize {
    HINT_LEN + 1 + DIGEST_HEX_LEN + MAX_EXTENSION_LEN
}

/// Validates the origin URL
fn validate_origin(origin: &str) -> Result<(), ConfigError> {
    let url = Url::parse(origin)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid origin '{}': {}", origin, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "Origin '{}' must use http or https",
            origin
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "Origin '{}' has no host",
            origin
        )));
    }

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max_pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    if config.request_timeout_secs < 1 || config.connect_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "request and connect timeouts must be >= 1 second".to_string(),
        ));
    }

    for seed in &config.seeds {
        if seed.trim().is_empty() {
            return Err(ConfigError::Validation(
                "seed paths cannot be empty".to_string(),
            ));
        }
    }

    Regex::new(&config.sitemap_pattern).map_err(|e| {
        ConfigError::InvalidPattern(format!(
            "Invalid sitemap pattern '{}': {}",
            config.sitemap_pattern, e
        ))
    })?;

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters, hyphens and underscores, got '{}'",
            config.crawler_name
        )));
    }

    if config.crawler_version.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_version cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.root.is_empty() {
        return Err(ConfigError::Validation("root cannot be empty".to_string()));
    }

    validate_single_segment("index_file", &config.index_file)?;

    Ok(())
}

/// Validates asset classification and path mapping settings
fn validate_asset_config(config: &AssetConfig, output: &OutputConfig) -> Result<(), ConfigError> {
    for ext in &config.extensions {
        if !ext.starts_with('.') || ext.len() < 2 {
            return Err(ConfigError::Validation(format!(
                "Asset extension '{}' must start with '.'",
                ext
            )));
        }
    }

    for pattern in &config.hosts {
        validate_host_pattern(pattern)?;
    }

    for pattern in &config.host_regex {
        Regex::new(pattern).map_err(|e| {
            ConfigError::InvalidPattern(format!("Invalid host regex '{}': {}", pattern, e))
        })?;
    }

    validate_single_segment("bucket", &config.bucket)?;

    let name_len = hashed_name_max_len();
    if config.max_segment_len < name_len {
        return Err(ConfigError::Validation(format!(
            "max_segment_len must be >= {} to hold hashed asset names, got {}",
            name_len, config.max_segment_len
        )));
    }

    // <root>/<bucket>/ab/cd/<name>
    let root_len = output.root.trim_end_matches('/').len();
    let hashed_path_len = root_len + 1 + config.bucket.len() + 7 + name_len;
    if config.max_path_len < hashed_path_len {
        return Err(ConfigError::Validation(format!(
            "max_path_len must be >= {} to hold hashed asset paths under '{}', got {}",
            hashed_path_len, output.root, config.max_path_len
        )));
    }

    Ok(())
}

/// Validates a value that must be a single, plain path segment
fn validate_single_segment(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{} cannot be empty", field)));
    }

    if value.contains('/') || value.contains('\\') || value == "." || value == ".." {
        return Err(ConfigError::Validation(format!(
            "{} must be a single path segment, got '{}'",
            field, value
        )));
    }

    Ok(())
}

/// Validates a host pattern (supports wildcards)
fn validate_host_pattern(pattern: &str) -> Result<(), ConfigError> {
    if pattern.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "Host pattern cannot be empty".to_string(),
        ));
    }

    if let Some(domain) = pattern.strip_prefix("*.") {
        validate_domain_string(domain)
    } else {
        validate_domain_string(pattern)
    }
}

/// Validates a domain string (without wildcard prefix)
fn validate_domain_string(domain: &str) -> Result<(), ConfigError> {
    if domain.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "Domain cannot be empty".to_string(),
        ));
    }

    if !domain
        .chars()
        .all(|c| c.is_alphanumeric() || c == '.' || c == '-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' contains invalid characters",
            domain
        )));
    }

    if domain.starts_with('.')
        || domain.ends_with('.')
        || domain.starts_with('-')
        || domain.ends_with('-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' cannot start or end with '.' or '-'",
            domain
        )));
    }

    if domain.contains("..") {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' cannot contain consecutive dots",
            domain
        )));
    }

    if !domain.contains('.') {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' must contain at least one dot (e.g., 'cdn.example.com')",
            domain
        )));
    }

    Ok(())
}
