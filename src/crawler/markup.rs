//! HTML documents as seen by the link rewriter
//!
//! A page is held as the bytes the server sent, in the character encoding it
//! declares. `<base href>` and `<title>` are read once with `scraper` when the
//! page is loaded; attribute rewriting is a streaming pass with `lol_html`,
//! which leaves every byte it was not asked to change exactly as it was.

use encoding_rs::{Encoding, UTF_8};
use lol_html::errors::RewritingError;
use lol_html::{element, AsciiCompatibleEncoding, HtmlRewriter, Settings};
use regex::bytes::Regex;
use scraper::{ElementRef, Html, Selector};
use std::cell::RefCell;
use std::sync::OnceLock;
use thiserror::Error;

/// Elements and attributes that carry references to other resources
///
/// `srcset` attributes hold several candidates; see [`ReferenceKind`].
pub const REFERENCE_ATTRIBUTES: &[(&str, &str)] = &[
    ("a", "href"),
    ("link", "href"),
    ("script", "src"),
    ("img", "src"),
    ("img", "srcset"),
    ("source", "src"),
    ("source", "srcset"),
    ("video", "src"),
    ("video", "poster"),
    ("audio", "src"),
    ("track", "src"),
    ("base", "href"),
];

/// Leading bytes searched for a `<meta>` charset declaration
const CHARSET_PRESCAN_LEN: usize = 1024;

/// Errors raised while rewriting markup
#[derive(Debug, Error)]
pub enum MarkupError {
    #[error("HTML rewriting failed: {0}")]
    Rewrite(#[from] RewritingError),
}

/// How an attribute value should be interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    /// One URL
    Single,
    /// A responsive image candidate list (`url [descriptor], ...`)
    Srcset,
    /// The document base URL
    Base,
}

impl ReferenceKind {
    /// Kind of the value found in `attr` on `tag`
    pub fn of(tag: &str, attr: &str) -> Self {
        if tag == "base" {
            ReferenceKind::Base
        } else if attr == "srcset" {
            ReferenceKind::Srcset
        } else {
            ReferenceKind::Single
        }
    }
}

/// Callback deciding the new value of a reference attribute
///
/// The callback sees the attribute value with character references decoded
/// (`&amp;` arrives as `&`) and returns plain text; escaping for the markup
/// is done by the document. Returning `None` leaves the attribute untouched.
pub type ReferenceRewrite<'a> = dyn FnMut(ReferenceKind, &str) -> Option<String> + 'a;

/// A parsed document whose reference attributes can be rewritten in place
pub trait MarkupDocument {
    /// Value of the first `<base href>`, if any
    fn base_href(&self) -> Option<&str>;

    /// Text of the `<title>` element
    fn title(&self) -> Option<&str>;

    /// Visits every attribute in [`REFERENCE_ATTRIBUTES`] in document order
    fn rewrite_references(&mut self, rewrite: &mut ReferenceRewrite<'_>)
        -> Result<(), MarkupError>;

    /// The document as bytes in its own character encoding
    fn serialize(&self) -> Vec<u8>;
}

/// An HTML document held as encoded source bytes
#[derive(Debug, Clone)]
pub struct HtmlDocument {
    bytes: Vec<u8>,
    encoding: AsciiCompatibleEncoding,
    base_href: Option<String>,
    title: Option<String>,
}

impl HtmlDocument {
    /// Wraps UTF-8 HTML source text
    pub fn parse(source: impl Into<String>) -> Self {
        Self::load(source.into().into_bytes(), AsciiCompatibleEncoding::utf_8())
    }

    /// Loads a response body in the encoding picked by [`detect_encoding`]
    ///
    /// Bodies in an encoding that is not ASCII-compatible (UTF-16) are
    /// transcoded to UTF-8; every other body keeps its bytes.
    pub fn from_response(body: &[u8], content_type: Option<&str>) -> Self {
        let encoding = detect_encoding(content_type, body);
        match AsciiCompatibleEncoding::new(encoding) {
            Some(ascii) => Self::load(body.to_vec(), ascii),
            None => {
                let (text, _, _) = encoding.decode(body);
                Self::parse(text.into_owned())
            }
        }
    }

    /// The character encoding the document is read and written in
    pub fn encoding(&self) -> &'static Encoding {
        self.encoding.into()
    }

    fn load(bytes: Vec<u8>, encoding: AsciiCompatibleEncoding) -> Self {
        let (base_href, title) = {
            let decoder: &'static Encoding = encoding.into();
            let (text, _, _) = decoder.decode(&bytes);
            let html = Html::parse_document(&text);

            let base_href = select_first(&html, "base[href]")
                .and_then(|element| element.value().attr("href"))
                .map(|href| href.trim().to_string())
                .filter(|href| !href.is_empty());
            let title = select_first(&html, "title")
                .map(|element| element.text().collect::<String>().trim().to_string())
                .filter(|title| !title.is_empty());
            (base_href, title)
        };

        Self {
            bytes,
            encoding,
            base_href,
            title,
        }
    }
}

impl MarkupDocument for HtmlDocument {
    fn base_href(&self) -> Option<&str> {
        self.base_href.as_deref()
    }

    fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    fn rewrite_references(
        &mut self,
        rewrite: &mut ReferenceRewrite<'_>,
    ) -> Result<(), MarkupError> {
        let rewrite = RefCell::new(rewrite);

        let handlers = REFERENCE_ATTRIBUTES
            .iter()
            .map(|&(tag, attr)| {
                let rewrite = &rewrite;
                element!(format!("{}[{}]", tag, attr), move |el| {
                    if let Some(raw) = el.get_attribute(attr) {
                        let value = html_escape::decode_html_entities(&raw);
                        let mut callback = rewrite.borrow_mut();
                        if let Some(replaced) = (*callback)(ReferenceKind::of(tag, attr), &*value) {
                            let escaped = html_escape::encode_double_quoted_attribute(&replaced);
                            el.set_attribute(attr, &*escaped)?;
                        }
                    }
                    Ok(())
                })
            })
            .collect::<Vec<_>>();

        let mut output = Vec::with_capacity(self.bytes.len());
        let mut rewriter = HtmlRewriter::new(
            Settings {
                element_content_handlers: handlers,
                encoding: self.encoding,
                ..Settings::default()
            },
            |chunk: &[u8]| output.extend_from_slice(chunk),
        );
        rewriter.write(&self.bytes)?;
        rewriter.end()?;

        self.bytes = output;
        Ok(())
    }

    fn serialize(&self) -> Vec<u8> {
        self.bytes.clone()
    }
}

/// First element matching `selector`
fn select_first<'a>(html: &'a Html, selector: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(selector).ok()?;
    let first = html.select(&selector).next();
    first
}

/// Picks the character encoding of an HTML response
///
/// In order: a byte order mark, the `charset` parameter of `Content-Type`, a
/// `<meta charset>` or `<meta http-equiv="Content-Type">` declaration in the
/// first kilobyte, then UTF-8. Unknown labels are skipped.
pub fn detect_encoding(content_type: Option<&str>, body: &[u8]) -> &'static Encoding {
    if let Some((encoding, _)) = Encoding::for_bom(body) {
        return encoding;
    }

    content_type
        .and_then(content_type_charset)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .or_else(|| meta_charset(&body[..body.len().min(CHARSET_PRESCAN_LEN)]))
        .unwrap_or(UTF_8)
}

/// Value of the `charset` parameter of a media type
fn content_type_charset(content_type: &str) -> Option<&str> {
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        name.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches(|c| c == '"' || c == '\''))
    })
}

fn meta_charset(head: &[u8]) -> Option<&'static Encoding> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    let pattern = PATTERN
        .get_or_init(|| Regex::new(r#"(?i-u)<meta\b[^>]*?charset\s*=\s*["']?\s*([-a-z0-9_:.]+)"#).ok())
        .as_ref()?;

    let label = pattern.captures(head)?.get(1)?;
    Encoding::for_label(label.as_bytes())
}
