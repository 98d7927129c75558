//! Link rewriting for saved pages
//!
//! Every reference attribute is resolved against the page's base URL,
//! recorded as discovered, and, when the mirror will hold its target,
//! replaced by the site-root-absolute path of that target inside the mirror.

use crate::crawler::markup::{MarkupDocument, MarkupError, ReferenceKind};
use crate::layout::{page_reference, PathMapper};
use crate::url::{canonicalize, CanonicalUrl, Classifier};
use std::collections::HashSet;
use url::Url;

/// Rewrites references in a document and collects the URLs they point to
///
/// The rewriter borrows the crawl's [`PathMapper`], so an asset referenced
/// from several pages is rewritten to the same local path everywhere and is
/// later saved under that path.
pub struct LinkRewriter<'a> {
    classifier: &'a Classifier,
    mapper: &'a mut PathMapper,
}

impl<'a> LinkRewriter<'a> {
    /// Creates a rewriter sharing the crawl's classifier and path table
    pub fn new(classifier: &'a Classifier, mapper: &'a mut PathMapper) -> Self {
        Self { classifier, mapper }
    }

    /// Rewrites `document` in place
    ///
    /// # Arguments
    ///
    /// * `document` - The parsed page
    /// * `base` - The page's final URL (after redirects)
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<CanonicalUrl>)` - Every resolvable reference, de-duplicated
    ///   in first-seen order. Out-of-scope references are included; the
    ///   caller decides what to enqueue.
    /// * `Err(MarkupError)` - The document could not be rewritten
    pub fn rewrite<D: MarkupDocument + ?Sized>(
        &mut self,
        document: &mut D,
        base: &Url,
    ) -> Result<Vec<CanonicalUrl>, MarkupError> {
        let base = effective_base(document, base);
        let mut discovered = Discovered::default();

        document.rewrite_references(&mut |kind, value| match kind {
            ReferenceKind::Single => self.rewrite_single(&base, value, &mut discovered),
            ReferenceKind::Srcset => self.rewrite_srcset(&base, value, &mut discovered),
            ReferenceKind::Base => self.rewrite_base(&base),
        })?;

        Ok(discovered.urls)
    }

    /// Rewrites one reference, recording its target
    fn rewrite_single(
        &mut self,
        base: &Url,
        value: &str,
        discovered: &mut Discovered,
    ) -> Option<String> {
        let (canonical, fragment) = resolve_reference(base, value)?;
        discovered.record(&canonical);
        self.local_reference(&canonical, fragment.as_deref())
    }

    /// Rewrites each candidate URL of a `srcset` value
    fn rewrite_srcset(
        &mut self,
        base: &Url,
        value: &str,
        discovered: &mut Discovered,
    ) -> Option<String> {
        let mut changed = false;
        let mut out = String::with_capacity(value.len());

        for token in split_srcset(value) {
            match token {
                SrcsetToken::Text(text) => out.push_str(text),
                SrcsetToken::Url(url) => match self.rewrite_single(base, url, discovered) {
                    Some(local) => {
                        changed = true;
                        out.push_str(&local);
                    }
                    None => out.push_str(url),
                },
            }
        }

        changed.then_some(out)
    }

    /// Points `<base href>` at the local copy of the base page
    fn rewrite_base(&self, base: &Url) -> Option<String> {
        if self.classifier.is_same_origin(base) {
            let canonical = canonicalize(base.as_str()).ok()?;
            Some(page_reference(canonical.as_url()))
        } else {
            None
        }
    }

    /// Local form of an in-scope URL, `None` when the mirror will not hold it
    fn local_reference(&mut self, url: &CanonicalUrl, fragment: Option<&str>) -> Option<String> {
        let target = url.as_url();
        if !self.classifier.is_in_scope(target) {
            tracing::trace!("Leaving out-of-scope reference {}", url);
            return None;
        }

        let mut local = if self.classifier.is_asset_like(target) {
            self.mapper.local_site_path(target)
        } else {
            page_reference(target)
        };

        if let Some(fragment) = fragment {
            local.push('#');
            local.push_str(fragment);
        }

        Some(local)
    }
}

/// First-seen, de-duplicated list of discovered URLs
#[derive(Default)]
struct Discovered {
    seen: HashSet<CanonicalUrl>,
    urls: Vec<CanonicalUrl>,
}

impl Discovered {
    fn record(&mut self, url: &CanonicalUrl) {
        if self.seen.insert(url.clone()) {
            self.urls.push(url.clone());
        }
    }
}

/// The page URL, overridden by a resolvable `<base href>`
fn effective_base<D: MarkupDocument + ?Sized>(document: &D, page: &Url) -> Url {
    document
        .base_href()
        .and_then(|href| page.join(href).ok())
        .filter(|url| matches!(url.scheme(), "http" | "https"))
        .unwrap_or_else(|| page.clone())
}

/// Resolves a raw attribute value to a canonical URL and its fragment
///
/// Empty values, in-page anchors, `mailto:`/`tel:` links and anything that
/// does not resolve to an http(s) URL yield `None`.
pub fn resolve_reference(base: &Url, raw: &str) -> Option<(CanonicalUrl, Option<String>)> {
    let raw = raw.trim();
    if raw.is_empty() || raw.starts_with('#') {
        return None;
    }

    let lower = raw.to_ascii_lowercase();
    if lower.starts_with("mailto:") || lower.starts_with("tel:") {
        return None;
    }

    let joined = match base.join(raw) {
        Ok(url) => url,
        Err(e) => {
            tracing::debug!("Skipping malformed reference '{}': {}", raw, e);
            return None;
        }
    };

    match canonicalize(joined.as_str()) {
        Ok(canonical) => Some((canonical, joined.fragment().map(str::to_string))),
        Err(e) => {
            tracing::trace!("Skipping reference '{}': {}", raw, e);
            None
        }
    }
}

/// A piece of a `srcset` value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SrcsetToken<'a> {
    /// Separators and descriptors, kept verbatim
    Text(&'a str),
    /// A candidate URL
    Url(&'a str),
}

/// Splits a `srcset` value into candidate URLs and everything around them
///
/// A URL is a run of non-whitespace; commas at its end separate candidates
/// and are not part of it. Descriptors run to the next comma outside
/// parentheses. Concatenating the tokens gives back the input.
pub fn split_srcset(value: &str) -> Vec<SrcsetToken<'_>> {
    let bytes = value.as_bytes();
    let len = bytes.len();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < len {
        let start = pos;
        while pos < len && (bytes[pos].is_ascii_whitespace() || bytes[pos] == b',') {
            pos += 1;
        }
        if pos > start {
            tokens.push(SrcsetToken::Text(&value[start..pos]));
        }
        if pos == len {
            break;
        }

        let url_start = pos;
        while pos < len && !bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }
        let mut url_end = pos;
        while url_end > url_start && bytes[url_end - 1] == b',' {
            url_end -= 1;
        }
        tokens.push(SrcsetToken::Url(&value[url_start..url_end]));

        if url_end < pos {
            tokens.push(SrcsetToken::Text(&value[url_end..pos]));
            continue;
        }

        let descriptor_start = pos;
        let mut depth = 0usize;
        while pos < len {
            match bytes[pos] {
                b'(' => depth += 1,
                b')' => depth = depth.saturating_sub(1),
                b',' if depth == 0 => break,
                _ => {}
            }
            pos += 1;
        }
        if pos > descriptor_start {
            tokens.push(SrcsetToken::Text(&value[descriptor_start..pos]));
        }
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::markup::HtmlDocument;
    use crate::layout::{page_site_path, MirrorLayout};
    use crate::url::HostPattern;

    fn classifier() -> Classifier {
        let origin = Url::parse("https://example.com").unwrap();
        let extensions: Vec<String> = [".css", ".js", ".png", ".jpg", ".svg", ".woff2"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        Classifier::new(
            &origin,
            &extensions,
            vec![HostPattern::wildcard("*.cdn.example")],
        )
    }

    fn mapper() -> PathMapper {
        PathMapper::new("mirror", "_assets", 240, 200)
    }

    fn page() -> Url {
        Url::parse("https://example.com/").unwrap()
    }

    fn rewrite(html: &str, base: &Url) -> (String, Vec<String>) {
        let classifier = classifier();
        let mut mapper = mapper();
        let mut doc = HtmlDocument::parse(html);
        let found = LinkRewriter::new(&classifier, &mut mapper)
            .rewrite(&mut doc, base)
            .unwrap();
        (
            String::from_utf8(doc.serialize()).unwrap(),
            found.iter().map(|u| u.as_str().to_string()).collect(),
        )
    }

    #[test]
    fn test_scenario_page_and_cdn_image() {
        let (out, found) = rewrite(
            r#"<a href="/about">About</a><img src="https://static1.cdn.example/img/x.png">"#,
            &page(),
        );

        assert!(out.contains(r#"href="/about/""#));
        assert!(out.contains(r#"src="/img/x.png""#));
        assert_eq!(
            found,
            vec![
                "https://example.com/about",
                "https://static1.cdn.example/img/x.png",
            ]
        );
    }

    #[test]
    fn test_relative_references_resolve_against_base() {
        let base = Url::parse("https://example.com/blog/post/").unwrap();
        let (out, found) = rewrite(
            r#"<a href="../other">o</a><link rel="stylesheet" href="style.css?v=3">"#,
            &base,
        );

        assert!(out.contains(r#"href="/blog/other/""#));
        assert!(out.contains(r#"href="/blog/post/style.css""#));
        assert_eq!(
            found,
            vec![
                "https://example.com/blog/other",
                "https://example.com/blog/post/style.css?v=3",
            ]
        );
    }

    #[test]
    fn test_page_link_keeps_fragment_and_drops_query() {
        let (out, _) = rewrite(
            r#"<a href="https://example.com/about?ref=nav#team">t</a>"#,
            &page(),
        );
        assert!(out.contains(r#"href="/about/#team""#));
    }

    #[test]
    fn test_skipped_references_untouched() {
        let html = r##"<a href="">e</a><a href="#top">t</a><a href="mailto:a@example.com">m</a><a href="tel:+100">p</a><a href="javascript:void(0)">j</a><img src="data:image/png;base64,AAAA">"##;
        let (out, found) = rewrite(html, &page());

        assert_eq!(out, html);
        assert!(found.is_empty());
    }

    #[test]
    fn test_off_origin_page_recorded_but_untouched() {
        let (out, found) = rewrite(r#"<a href="https://other.example/page">x</a>"#, &page());

        assert!(out.contains(r#"href="https://other.example/page""#));
        assert_eq!(found, vec!["https://other.example/page"]);
    }

    #[test]
    fn test_discovered_deduplicated_in_first_seen_order() {
        let (_, found) = rewrite(
            r#"<a href="/b">1</a><a href="/a">2</a><a href="/b#x">3</a><a href="HTTPS://EXAMPLE.COM/a">4</a>"#,
            &page(),
        );
        assert_eq!(found, vec!["https://example.com/b", "https://example.com/a"]);
    }

    #[test]
    fn test_srcset_rewritten_per_candidate() {
        let (out, found) = rewrite(
            r#"<img srcset="/img/a.png 1x, https://static1.cdn.example/b.png 2x,https://other.example/c.png 3x">"#,
            &page(),
        );

        assert!(out.contains(
            r#"srcset="/img/a.png 1x, /b.png 2x,/c.png 3x""#
        ));
        assert_eq!(found.len(), 3);
    }

    #[test]
    fn test_base_href_honoured_and_rewritten() {
        let (out, found) = rewrite(
            r#"<head><base href="https://example.com/docs/"></head><a href="guide">g</a>"#,
            &page(),
        );

        assert!(out.contains(r#"<base href="/docs/">"#));
        assert!(out.contains(r#"href="/docs/guide/""#));
        assert_eq!(found, vec!["https://example.com/docs/guide"]);
    }

    #[test]
    fn test_restricted_offsite_assets_left_alone() {
        let classifier = classifier().with_restricted_offsite_assets(true);
        let mut mapper = mapper();
        let mut doc = HtmlDocument::parse(
            r#"<img src="https://other.example/x.png"><img src="https://a.cdn.example/y.png">"#,
        );

        let found = LinkRewriter::new(&classifier, &mut mapper)
            .rewrite(&mut doc, &page())
            .unwrap();
        let out = String::from_utf8(doc.serialize()).unwrap();

        assert!(out.contains(r#"src="https://other.example/x.png""#));
        assert!(out.contains(r#"src="/y.png""#));
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn test_entity_encoded_references_resolve_to_real_urls() {
        let (out, found) = rewrite(
            r#"<a href="/search?q=1&amp;page=2#r">s</a><img src="https://static1.cdn.example/x.png?w=1&amp;h=2" srcset="/img/a.png?w=1&amp;h=2 1x, /img/b.png 2x">"#,
            &page(),
        );

        assert_eq!(
            found,
            vec![
                "https://example.com/search?q=1&page=2",
                "https://static1.cdn.example/x.png?w=1&h=2",
                "https://example.com/img/a.png?w=1&h=2",
                "https://example.com/img/b.png",
            ]
        );
        assert!(out.contains(r#"href="/search/#r""#));
        assert!(out.contains(r#"src="/x.png""#));
        assert!(out.contains(r#"srcset="/img/a.png 1x, /img/b.png 2x""#));
        assert!(!out.contains("&amp;amp;"));
    }

    #[test]
    fn test_untouched_reference_keeps_its_entities() {
        let html = r#"<a href="https://other.example/p?a=1&amp;b=2">x</a>"#;
        let (out, found) = rewrite(html, &page());

        assert_eq!(out, html);
        assert_eq!(found, vec!["https://other.example/p?a=1&b=2"]);
    }

    #[test]
    fn test_long_asset_path_uses_hashed_mapping() {
        let long = "a".repeat(300);
        let html = format!(r#"<script src="https://static1.cdn.example/{}.js"></script>"#, long);
        let (out, _) = rewrite(&html, &page());

        assert!(out.contains(r#"src="/_assets/"#));
        assert!(!out.contains(&long));
    }

    #[test]
    fn test_rewritten_references_reach_saved_files() {
        let classifier = classifier();
        let mut mapper = mapper();
        let layout = MirrorLayout::new("mirror", "index.html");
        let long = "b".repeat(260);
        let html = format!(
            r#"<a href="/about">a</a><a href="/docs/">d</a><img src="/img/logo.png"><script src="https://static1.cdn.example/{long}.js"></script><img srcset="/img/s.png 2x">"#
        );
        let mut doc = HtmlDocument::parse(html);

        let found = LinkRewriter::new(&classifier, &mut mapper)
            .rewrite(&mut doc, &page())
            .unwrap();

        let mut rewritten = Vec::new();
        let mut collect = |_: ReferenceKind, value: &str| -> Option<String> {
            rewritten.push(value.split(' ').next().unwrap_or_default().to_string());
            None
        };
        doc.rewrite_references(&mut collect).unwrap();

        assert_eq!(rewritten.len(), found.len());
        for (reference, url) in rewritten.iter().zip(&found) {
            let target = url.as_url();
            let expected = if classifier.is_asset_like(target) {
                layout.fs_path(mapper.get(url.as_str()).unwrap())
            } else {
                layout.fs_path(&page_site_path(target))
            };
            assert_eq!(layout.fs_path(reference), expected, "reference {}", reference);
        }
    }

    #[test]
    fn test_split_srcset() {
        let value = " a.png 1x,b.png,  c,d.png 480w (x, y) , e.png";
        let tokens = split_srcset(value);

        let urls: Vec<&str> = tokens
            .iter()
            .filter_map(|t| match t {
                SrcsetToken::Url(u) => Some(*u),
                _ => None,
            })
            .collect();
        assert_eq!(urls, vec!["a.png", "b.png", "c,d.png", "e.png"]);

        let joined: String = tokens
            .iter()
            .map(|t| match t {
                SrcsetToken::Text(s) | SrcsetToken::Url(s) => *s,
            })
            .collect();
        assert_eq!(joined, value);
    }

    #[test]
    fn test_resolve_reference() {
        let base = page();
        let (url, fragment) = resolve_reference(&base, " /a#b ").unwrap();
        assert_eq!(url.as_str(), "https://example.com/a");
        assert_eq!(fragment.as_deref(), Some("b"));

        assert!(resolve_reference(&base, "MAILTO:x@example.com").is_none());
        assert!(resolve_reference(&base, "ftp://example.com/f").is_none());
        assert!(resolve_reference(&base, "http://[::1").is_none());
    }
}
