use crate::config::Config;
use crate::url::{path_basename, path_extension, path_stem};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use url::Url;

/// Characters of the original file name kept as a hint in hashed names
pub const HINT_LEN: usize = 12;

/// Length of a hex-encoded SHA-256 digest
pub const DIGEST_HEX_LEN: usize = 64;

/// Longest extension (dot included) carried over into a hashed name
pub const MAX_EXTENSION_LEN: usize = 16;

/// Maps asset URLs to site-root-absolute paths inside the mirror
///
/// Short URL paths are kept as they are. Paths that would exceed the length
/// thresholds once placed under the output root are replaced by a sharded,
/// hashed path under the asset bucket:
///
/// ```text
/// /<bucket>/<ab>/<cd>/<hint>-<sha256 hex><ext>
/// ```
///
/// Every mapping is recorded the first time it is requested and returned
/// unchanged afterwards, so all pages referencing an asset agree on the one
/// file it is saved to.
#[derive(Debug, Clone)]
pub struct PathMapper {
    /// Output root as written in the config, without trailing separator
    root: String,
    bucket: String,
    max_path_len: usize,
    max_segment_len: usize,
    /// URL string -> site path
    records: HashMap<String, String>,
}

impl PathMapper {
    /// Creates an empty mapper
    pub fn new(root: &str, bucket: &str, max_path_len: usize, max_segment_len: usize) -> Self {
        Self {
            root: root.trim_end_matches('/').to_string(),
            bucket: bucket.to_string(),
            max_path_len,
            max_segment_len,
            records: HashMap::new(),
        }
    }

    /// Creates an empty mapper from the output and asset configuration
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            &config.output.root,
            &config.assets.bucket,
            config.assets.max_path_len,
            config.assets.max_segment_len,
        )
    }

    /// Returns the site-root-absolute path for an asset URL
    ///
    /// The first call for a URL string decides the path; later calls return the
    /// recorded value without recomputing it.
    pub fn local_site_path(&mut self, url: &Url) -> String {
        if let Some(existing) = self.records.get(url.as_str()) {
            return existing.clone();
        }

        let path = url.path();
        let site_path = if self.fits(path) {
            path.to_string()
        } else {
            let hashed = hashed_site_path(&self.bucket, url);
            tracing::debug!("Asset path too long, using {} for {}", hashed, url);
            hashed
        };

        self.records.insert(url.as_str().to_string(), site_path.clone());
        site_path
    }

    /// Looks up a recorded mapping without creating one
    pub fn get(&self, url: &str) -> Option<&str> {
        self.records.get(url).map(String::as_str)
    }

    /// Number of recorded mappings
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if nothing has been mapped yet
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Byte length of a site path once placed under the output root
    pub fn local_len(&self, site_path: &str) -> usize {
        self.root.len() + site_path.len()
    }

    /// Whether a URL path can be used as-is
    fn fits(&self, path: &str) -> bool {
        let basename = path_basename(path);
        !basename.is_empty()
            && self.local_len(path) <= self.max_path_len
            && basename.len() <= self.max_segment_len
    }
}

/// Computes the hashed fallback path for `url`
///
/// The digest covers the full URL string. Its first four hex characters give
/// two shard directories; the file name keeps up to twelve unreserved
/// characters of the original name (without extension, escapes skipped) and
/// the lowercased extension.
pub fn hashed_site_path(bucket: &str, url: &Url) -> String {
    let digest = hex::encode(Sha256::digest(url.as_str().as_bytes()));
    let path = url.path();

    let hint = name_hint(path_stem(path));
    let ext = path_extension(path)
        .filter(|ext| ext.len() <= MAX_EXTENSION_LEN)
        .map(|ext| ext.to_lowercase())
        .unwrap_or_default();

    let file_name = if hint.is_empty() {
        format!("{}{}", digest, ext)
    } else {
        format!("{}-{}{}", hint, digest, ext)
    };

    format!("/{}/{}/{}/{}", bucket, &digest[0..2], &digest[2..4], file_name)
}

/// Leading unreserved characters of a percent-encoded file stem
///
/// `%XX` escapes and characters that need quoting are skipped, so a hint can
/// never end inside an escape.
fn name_hint(stem: &str) -> String {
    let mut hint = String::with_capacity(HINT_LEN);
    let mut chars = stem.chars();

    while hint.len() < HINT_LEN {
        match chars.next() {
            Some('%') => {
                chars.next();
                chars.next();
            }
            Some(c) if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '~') => {
                hint.push(c)
            }
            Some(_) => {}
            None => break,
        }
    }

    hint
}
