use url::Url;

/// Site-root-absolute directory path for a page URL
///
/// The URL path is forced to end with `/`; the page itself is stored as the
/// index document inside that directory. Query and fragment are dropped.
///
/// # Examples
///
/// ```
/// use sumi_mirror::layout::page_site_path;
/// use url::Url;
///
/// let url = Url::parse("https://example.com/about?ref=nav").unwrap();
/// assert_eq!(page_site_path(&url), "/about/");
/// ```
pub fn page_site_path(url: &Url) -> String {
    let path = url.path();
    if path.is_empty() {
        "/".to_string()
    } else if path.ends_with('/') {
        path.to_string()
    } else {
        format!("{}/", path)
    }
}

/// The value written into markup for a link to a page
///
/// Same as [`page_site_path`], keeping the reference's fragment so in-page
/// anchors survive the rewrite.
pub fn page_reference(url: &Url) -> String {
    let mut reference = page_site_path(url);
    if let Some(fragment) = url.fragment() {
        reference.push('#');
        reference.push_str(fragment);
    }
    reference
}
