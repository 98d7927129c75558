use crate::config::{AssetConfig, Config};
use crate::url::matcher::HostPattern;
use crate::url::segments::path_extension;
use crate::ConfigError;
use std::collections::HashSet;
use url::Url;

/// Scope of a single URL, derived on demand and never stored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeDecision {
    /// Scheme and host equal the origin's
    pub is_same_origin: bool,
    /// Asset extension or allow-listed asset host
    pub is_asset_like: bool,
}

/// Decides whether URLs are same-origin and whether they are assets
///
/// Asset-like URLs are mirrored even when they live on another host; everything
/// else is only crawled when it is same-origin.
#[derive(Debug, Clone)]
pub struct Classifier {
    scheme: String,
    host: String,
    extensions: HashSet<String>,
    asset_hosts: Vec<HostPattern>,
    restrict_offsite_assets: bool,
}

impl Classifier {
    /// Creates a classifier for `origin`
    ///
    /// Extensions are compared case-insensitively and must include the leading dot.
    pub fn new(origin: &Url, extensions: &[String], asset_hosts: Vec<HostPattern>) -> Self {
        Self {
            scheme: origin.scheme().to_string(),
            host: origin.host_str().unwrap_or_default().to_lowercase(),
            extensions: extensions.iter().map(|ext| ext.to_lowercase()).collect(),
            asset_hosts,
            restrict_offsite_assets: false,
        }
    }

    /// Builds the classifier described by a validated configuration
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let origin = Url::parse(&config.origin)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid origin: {}", e)))?;
        let patterns = host_patterns(&config.assets)?;

        Ok(Self::new(&origin, &config.assets.extensions, patterns)
            .with_restricted_offsite_assets(config.assets.restrict_offsite_assets))
    }

    /// Only treat off-origin assets as in scope when their host is allow-listed
    pub fn with_restricted_offsite_assets(mut self, restrict: bool) -> Self {
        self.restrict_offsite_assets = restrict;
        self
    }

    /// True iff scheme and host exactly match the origin (no subdomains)
    pub fn is_same_origin(&self, url: &Url) -> bool {
        url.scheme() == self.scheme
            && url
                .host_str()
                .is_some_and(|host| host.eq_ignore_ascii_case(&self.host))
    }

    /// True if the path extension is an asset extension or the host is allow-listed
    pub fn is_asset_like(&self, url: &Url) -> bool {
        self.has_asset_extension(url) || self.is_asset_host(url)
    }

    /// Both scope facts for `url`
    pub fn decide(&self, url: &Url) -> ScopeDecision {
        ScopeDecision {
            is_same_origin: self.is_same_origin(url),
            is_asset_like: self.is_asset_like(url),
        }
    }

    /// Whether the mirror should fetch and keep `url`
    ///
    /// Same-origin URLs and asset-like URLs are in scope. With restricted
    /// off-site assets, an off-origin asset also needs an allow-listed host.
    pub fn is_in_scope(&self, url: &Url) -> bool {
        let decision = self.decide(url);
        if decision.is_same_origin {
            return true;
        }
        if !decision.is_asset_like {
            return false;
        }
        !self.restrict_offsite_assets || self.is_asset_host(url)
    }

    fn has_asset_extension(&self, url: &Url) -> bool {
        path_extension(url.path())
            .map(|ext| self.extensions.contains(&ext.to_lowercase()))
            .unwrap_or(false)
    }

    fn is_asset_host(&self, url: &Url) -> bool {
        match url.host_str() {
            Some(host) => self.asset_hosts.iter().any(|pattern| pattern.matches(host)),
            None => false,
        }
    }
}

/// Compiles the wildcard and regex host patterns of an asset configuration
pub fn host_patterns(config: &AssetConfig) -> Result<Vec<HostPattern>, ConfigError> {
    let mut patterns: Vec<HostPattern> = config
        .hosts
        .iter()
        .map(|pattern| HostPattern::wildcard(pattern))
        .collect();

    for pattern in &config.host_regex {
        let compiled = HostPattern::regex(pattern).map_err(|e| {
            ConfigError::InvalidPattern(format!("Invalid host regex '{}': {}", pattern, e))
        })?;
        patterns.push(compiled);
    }

    Ok(patterns)
}
