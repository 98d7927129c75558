/// Returns the last segment of a URL path (empty when the path ends in `/`)
///
/// # Examples
///
/// ```
/// use sumi_mirror::url::path_basename;
///
/// assert_eq!(path_basename("/img/x.png"), "x.png");
/// assert_eq!(path_basename("/img/"), "");
/// ```
pub fn path_basename(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[idx + 1..],
        None => path,
    }
}

/// Returns the extension of a URL path's last segment, leading dot included
///
/// Dot-files (`/.htaccess`) and names ending in a dot have no extension. The
/// extension is returned as written; callers lowercase it when comparing.
pub fn path_extension(path: &str) -> Option<&str> {
    let base = path_basename(path);
    let idx = base.rfind('.')?;
    if idx == 0 || idx + 1 == base.len() {
        return None;
    }
    Some(&base[idx..])
}

/// Returns the last segment with its extension removed
pub fn path_stem(path: &str) -> &str {
    let base = path_basename(path);
    match path_extension(path) {
        Some(ext) => &base[..base.len() - ext.len()],
        None => base,
    }
}
