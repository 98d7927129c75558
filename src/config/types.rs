use serde::Deserialize;

/// Main configuration structure for Sumi-Mirror
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Scheme and host defining the same-origin scope (e.g., "https://example.com")
    pub origin: String,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub assets: AssetConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Hard cap on the number of fetch operations per run
    #[serde(rename = "max-pages", default = "default_max_pages")]
    pub max_pages: u32,

    /// Paths (relative to the origin) pushed after the origin root
    #[serde(default = "default_seeds")]
    pub seeds: Vec<String>,

    /// Regex matched against a URL's basename to detect sitemap documents
    #[serde(rename = "sitemap-pattern", default = "default_sitemap_pattern")]
    pub sitemap_pattern: String,

    /// Total request timeout (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Connection timeout (seconds)
    #[serde(rename = "connect-timeout-secs", default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Maximum redirect hops followed per fetch
    #[serde(rename = "max-redirects", default = "default_max_redirects")]
    pub max_redirects: usize,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name", default = "default_crawler_name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version", default = "default_crawler_version")]
    pub crawler_version: String,
}

impl UserAgentConfig {
    /// Formats the User-Agent header value: `Name/Version`
    pub fn header_value(&self) -> String {
        format!("{}/{}", self.crawler_name, self.crawler_version)
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Filesystem root under which the mirror is written
    #[serde(default = "default_root")]
    pub root: String,

    /// File name of the index document written for every page directory
    #[serde(rename = "index-file", default = "default_index_file")]
    pub index_file: String,
}

/// Asset classification and path mapping configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AssetConfig {
    /// File extensions (with leading dot) always treated as assets
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Wildcard host patterns (e.g., "*.cdn.example.com") whose URLs are always assets
    #[serde(default)]
    pub hosts: Vec<String>,

    /// Case-insensitive host regexes whose URLs are always assets
    #[serde(rename = "host-regex", default)]
    pub host_regex: Vec<String>,

    /// Directory under the output root holding hashed fallback paths
    #[serde(default = "default_bucket")]
    pub bucket: String,

    /// Maximum byte length of an asset's local path, output root included
    #[serde(rename = "max-path-len", default = "default_max_path_len")]
    pub max_path_len: usize,

    /// Maximum byte length of an asset's file name
    #[serde(rename = "max-segment-len", default = "default_max_segment_len")]
    pub max_segment_len: usize,

    /// Only mirror off-origin assets whose host is allow-listed
    #[serde(rename = "restrict-offsite-assets", default)]
    pub restrict_offsite_assets: bool,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_pages: default_max_pages(),
            seeds: default_seeds(),
            sitemap_pattern: default_sitemap_pattern(),
            request_timeout_secs: default_request_timeout(),
            connect_timeout_secs: default_connect_timeout(),
            max_redirects: default_max_redirects(),
        }
    }
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: default_crawler_name(),
            crawler_version: default_crawler_version(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            index_file: default_index_file(),
        }
    }
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            hosts: Vec::new(),
            host_regex: Vec::new(),
            bucket: default_bucket(),
            max_path_len: default_max_path_len(),
            max_segment_len: default_max_segment_len(),
            restrict_offsite_assets: false,
        }
    }
}

fn default_max_pages() -> u32 {
    5000
}

fn default_seeds() -> Vec<String> {
    vec!["/sitemap.xml".to_string()]
}

fn default_sitemap_pattern() -> String {
    r"(?i)sitemap.*\.xml$".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_max_redirects() -> usize {
    10
}

fn default_crawler_name() -> String {
    "sumi-mirror".to_string()
}

fn default_crawler_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_root() -> String {
    "mirror".to_string()
}

fn default_index_file() -> String {
    "index.html".to_string()
}

fn default_extensions() -> Vec<String> {
    [
        ".css", ".js", ".png", ".jpg", ".jpeg", ".gif", ".webp", ".avif", ".svg", ".ico",
        ".woff", ".woff2", ".ttf", ".eot", ".mp4", ".webm", ".pdf",
    ]
    .iter()
    .map(|ext| ext.to_string())
    .collect()
}

fn default_bucket() -> String {
    "_assets".to_string()
}

fn default_max_path_len() -> usize {
    240
}

fn default_max_segment_len() -> usize {
    200
}
