use crate::UrlError;
use std::fmt;
use std::str::FromStr;
use url::Url;

/// A URL in canonical form
///
/// Two references to the same resource produce equal `CanonicalUrl`s, and
/// canonicalizing an already canonical URL returns it unchanged. The string
/// form is the key used by the frontier and the asset path table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CanonicalUrl(Url);

impl CanonicalUrl {
    /// The canonical string form
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// The parsed URL
    pub fn as_url(&self) -> &Url {
        &self.0
    }
}

impl fmt::Display for CanonicalUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

impl AsRef<str> for CanonicalUrl {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl FromStr for CanonicalUrl {
    type Err = UrlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        canonicalize(s)
    }
}

/// Canonicalizes a URL string
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed. Parsing lowercases the scheme and
///    host, drops default ports, resolves `.` and `..` segments and turns an
///    empty path into `/`
/// 2. Reject anything that is not http or https, or has no host
/// 3. Decode percent-encoded unreserved characters in the path and uppercase
///    the hex digits of every remaining escape
/// 4. Remove the fragment
/// 5. Remove an empty query string (trailing `?`)
///
/// Query parameter order and trailing slashes are kept: servers are free to
/// treat `?a=1&b=2` and `?b=2&a=1`, or `/docs` and `/docs/`, as different
/// resources.
///
/// # Examples
///
/// ```
/// use sumi_mirror::url::canonicalize;
///
/// let url = canonicalize("HTTP://Example.COM/a/./b/../c#top").unwrap();
/// assert_eq!(url.as_str(), "http://example.com/a/c");
/// ```
pub fn canonicalize(url_str: &str) -> Result<CanonicalUrl, UrlError> {
    // Step 1: Parse the URL
    let mut url = Url::parse(url_str).map_err(|e| UrlError::Parse(e.to_string()))?;

    // Step 2: Validate scheme and host
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingDomain);
    }

    // Step 3: Normalize percent-encoding in the path
    let normalized_path = normalize_percent_encoding(url.path());
    if normalized_path != url.path() {
        url.set_path(&normalized_path);
    }

    // Step 4: Remove fragment
    url.set_fragment(None);

    // Step 5: Remove empty query
    if url.query() == Some("") {
        url.set_query(None);
    }

    Ok(CanonicalUrl(url))
}

/// Decodes escaped unreserved characters and uppercases the remaining escapes
fn normalize_percent_encoding(path: &str) -> String {
    let bytes = path.as_bytes();
    let mut out = String::with_capacity(path.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let (Some(hi), Some(lo)) = (hex_value(bytes[i + 1]), hex_value(bytes[i + 2])) {
                let decoded = hi * 16 + lo;
                if is_unreserved(decoded) {
                    out.push(decoded as char);
                } else {
                    out.push('%');
                    out.push(bytes[i + 1].to_ascii_uppercase() as char);
                    out.push(bytes[i + 2].to_ascii_uppercase() as char);
                }
                i += 3;
                continue;
            }
        }
        out.push(bytes[i] as char);
        i += 1;
    }

    out
}

fn hex_value(byte: u8) -> Option<u8> {
    (byte as char).to_digit(16).map(|d| d as u8)
}

fn is_unreserved(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'.' | b'_' | b'~')
}
