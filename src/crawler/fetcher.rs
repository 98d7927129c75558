//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the HTTP client with the configured user agent and timeouts
//! - Following redirects up to the configured limit
//! - Collapsing every transport failure into a synthetic status
//! - Deciding whether a response is an HTML document

use crate::config::Config;
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client};
use std::collections::HashMap;
use std::time::Duration;
use url::Url;

/// Status reported for a fetch that produced no HTTP response
pub const FETCH_FAILURE_STATUS: u16 = 599;

/// Result of a fetch operation
///
/// The fetch boundary never returns an error: transport failures are a
/// variant of their own and report [`FETCH_FAILURE_STATUS`].
#[derive(Debug, Clone)]
pub enum FetchResult {
    /// The server answered (with any status)
    Response {
        /// Final URL after redirects
        final_url: Url,
        /// HTTP status code
        status: u16,
        /// Response headers, names lowercased
        headers: HashMap<String, String>,
        /// Raw body bytes
        body: Vec<u8>,
    },

    /// Connection, TLS, timeout, redirect or body read failure
    Failed {
        /// Error description
        error: String,
    },
}

impl FetchResult {
    /// HTTP status, or [`FETCH_FAILURE_STATUS`] for a failed fetch
    pub fn status(&self) -> u16 {
        match self {
            FetchResult::Response { status, .. } => *status,
            FetchResult::Failed { .. } => FETCH_FAILURE_STATUS,
        }
    }

    /// True for a 2xx response
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status())
    }

    /// Value of a header (name matched case-insensitively)
    pub fn header(&self, name: &str) -> Option<&str> {
        match self {
            FetchResult::Response { headers, .. } => {
                headers.get(&name.to_ascii_lowercase()).map(String::as_str)
            }
            FetchResult::Failed { .. } => None,
        }
    }

    /// The body, empty for a failed fetch
    pub fn body(&self) -> &[u8] {
        match self {
            FetchResult::Response { body, .. } => body,
            FetchResult::Failed { .. } => &[],
        }
    }
}

/// Raw HTTP transport used by the crawl loop
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches `url` with GET, following redirects
    async fn fetch(&self, url: &Url) -> FetchResult;
}

/// [`Fetcher`] backed by a `reqwest` client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Wraps an already configured client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds the client described by the configuration
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        Ok(Self::new(build_http_client(config)?))
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> FetchResult {
        let response = match self.client.get(url.clone()).send().await {
            Ok(response) => response,
            Err(e) => return FetchResult::Failed { error: describe_error(&e) },
        };

        let final_url = response.url().clone();
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_ascii_lowercase(), v.to_string()))
            })
            .collect();

        match response.bytes().await {
            Ok(body) => FetchResult::Response {
                final_url,
                status,
                headers,
                body: body.to_vec(),
            },
            Err(e) => FetchResult::Failed {
                error: format!("Failed to read body: {}", describe_error(&e)),
            },
        }
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The mirror configuration (user agent, timeouts, redirects)
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &Config) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.header_value())
        .timeout(Duration::from_secs(config.crawler.request_timeout_secs))
        .connect_timeout(Duration::from_secs(config.crawler.connect_timeout_secs))
        .redirect(Policy::limited(config.crawler.max_redirects))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Short description of a transport error
fn describe_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        "Request timeout".to_string()
    } else if e.is_connect() {
        format!("Connection failed: {}", e)
    } else if e.is_redirect() {
        format!("Redirect error: {}", e)
    } else {
        e.to_string()
    }
}

/// Decides whether a response body is an HTML document
///
/// The `Content-Type` header decides when present and non-empty
/// (`text/html` or `application/xhtml+xml`). Otherwise the body is sniffed:
/// after leading whitespace and a UTF-8 byte order mark it must start with
/// `<!doctype` or `<html`, compared case-insensitively.
pub fn is_html(content_type: Option<&str>, body: &[u8]) -> bool {
    if let Some(content_type) = content_type.map(str::trim).filter(|ct| !ct.is_empty()) {
        let mime = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        return mime == "text/html" || mime == "application/xhtml+xml";
    }

    let body = body.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(body);
    let start = body
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(body.len());
    let head = &body[start..];

    starts_with_ignore_case(head, b"<!doctype") || starts_with_ignore_case(head, b"<html")
}

fn starts_with_ignore_case(haystack: &[u8], prefix: &[u8]) -> bool {
    haystack.len() >= prefix.len() && haystack[..prefix.len()].eq_ignore_ascii_case(prefix)
}
