//! Sitemap detection and `<loc>` extraction
//!
//! Both `<urlset>` and `<sitemapindex>` documents list their entries in `<loc>`
//! elements, so one pass handles both. Nested indexes are followed by the
//! crawl loop itself once their URLs are popped.

use crate::url::path_basename;
use quick_xml::events::Event;
use quick_xml::Reader;
use regex::Regex;
use thiserror::Error;
use url::Url;

/// Default pattern applied to the last path segment
pub const DEFAULT_SITEMAP_PATTERN: &str = r"(?i)sitemap.*\.xml$";

/// Errors raised while reading a sitemap
#[derive(Debug, Error)]
pub enum SitemapError {
    #[error("Malformed XML at byte {position}: {source}")]
    Xml {
        position: usize,
        source: quick_xml::Error,
    },
}

/// Recognizes sitemap URLs by the basename of their path
#[derive(Debug, Clone)]
pub struct SitemapMatcher {
    pattern: Regex,
}

impl SitemapMatcher {
    /// Compiles a basename pattern
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        let pattern = Regex::new(pattern)?;
        Ok(Self { pattern })
    }

    /// True if the URL's basename matches the pattern
    pub fn is_sitemap(&self, url: &Url) -> bool {
        self.pattern.is_match(path_basename(url.path()))
    }
}

/// Extracts the text of every `<loc>` element, in document order
///
/// Namespace prefixes are ignored. Empty entries are skipped and surrounding
/// whitespace is trimmed.
///
/// # Arguments
///
/// * `xml` - The raw sitemap body
///
/// # Returns
///
/// * `Ok(Vec<String>)` - The listed locations
/// * `Err(SitemapError)` - The body is not well-formed XML
pub fn parse_sitemap(xml: &[u8]) -> Result<Vec<String>, SitemapError> {
    let mut reader = Reader::from_reader(xml);
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut in_loc = false;
    let mut current = String::new();
    let mut locs = Vec::new();

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|source| SitemapError::Xml {
                position: reader.buffer_position(),
                source,
            })?;

        match event {
            Event::Start(e) if e.local_name().as_ref() == b"loc" => {
                in_loc = true;
                current.clear();
            }
            Event::End(e) if e.local_name().as_ref() == b"loc" => {
                in_loc = false;
                let loc = current.trim();
                if !loc.is_empty() {
                    locs.push(loc.to_string());
                }
            }
            Event::Text(t) if in_loc => {
                let text = t.unescape().map_err(|source| SitemapError::Xml {
                    position: reader.buffer_position(),
                    source,
                })?;
                current.push_str(&text);
            }
            Event::CData(c) if in_loc => {
                current.push_str(&String::from_utf8_lossy(&c.into_inner()));
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(locs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_urlset() {
        let xml = br#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <url><loc>https://example.com/</loc><lastmod>2024-01-01</lastmod></url>
  <url><loc>
    https://example.com/about?a=1&amp;b=2
  </loc></url>
  <url><loc>https://other.example/x</loc></url>
</urlset>"#;

        let locs = parse_sitemap(xml).unwrap();
        assert_eq!(
            locs,
            vec![
                "https://example.com/",
                "https://example.com/about?a=1&b=2",
                "https://other.example/x",
            ]
        );
    }

    #[test]
    fn test_parse_sitemap_index_with_prefix() {
        let xml = br#"<sm:sitemapindex xmlns:sm="http://www.sitemaps.org/schemas/sitemap/0.9">
  <sm:sitemap><sm:loc>https://example.com/sitemap-pages.xml</sm:loc></sm:sitemap>
  <sm:sitemap><sm:loc><![CDATA[https://example.com/sitemap-posts.xml]]></sm:loc></sm:sitemap>
</sm:sitemapindex>"#;

        let locs = parse_sitemap(xml).unwrap();
        assert_eq!(
            locs,
            vec![
                "https://example.com/sitemap-pages.xml",
                "https://example.com/sitemap-posts.xml",
            ]
        );
    }

    #[test]
    fn test_parse_skips_empty_loc() {
        let xml = b"<urlset><url><loc></loc></url><url><loc> </loc></url></urlset>";
        assert!(parse_sitemap(xml).unwrap().is_empty());
    }

    #[test]
    fn test_parse_mismatched_tags_fails() {
        let xml = b"<urlset><url><loc>https://example.com/</url></loc></urlset>";
        assert!(parse_sitemap(xml).is_err());
    }

    #[test]
    fn test_default_matcher() {
        let matcher = SitemapMatcher::new(DEFAULT_SITEMAP_PATTERN).unwrap();
        let url = |s: &str| Url::parse(s).unwrap();

        assert!(matcher.is_sitemap(&url("https://example.com/sitemap.xml")));
        assert!(matcher.is_sitemap(&url("https://example.com/SITEMAP_index.XML")));
        assert!(matcher.is_sitemap(&url("https://example.com/a/sitemap-pages-2.xml")));
        assert!(!matcher.is_sitemap(&url("https://example.com/sitemap.xml/")));
        assert!(!matcher.is_sitemap(&url("https://example.com/sitemap/feed.xml")));
        assert!(!matcher.is_sitemap(&url("https://example.com/feed.xml")));
    }

    #[test]
    fn test_custom_matcher() {
        let matcher = SitemapMatcher::new(r"^feed\.xml$").unwrap();
        assert!(matcher.is_sitemap(&Url::parse("https://example.com/feed.xml").unwrap()));
        assert!(SitemapMatcher::new("(").is_err());
    }
}
