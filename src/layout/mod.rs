//! Mirror layout: where things live on disk
//!
//! Pages become `<root>/<url-path>/<index-file>`. Assets keep their URL path
//! under the root, or fall back to a hashed path under the asset bucket when
//! that path is too long (see [`PathMapper`]).

mod assets;
mod pages;

pub use assets::{hashed_site_path, PathMapper, DIGEST_HEX_LEN, HINT_LEN, MAX_EXTENSION_LEN};
pub use pages::{page_reference, page_site_path};

use crate::config::OutputConfig;
use std::path::{Path, PathBuf};
use url::Url;

/// Resolves site paths against the mirror's output root
///
/// This is how a static file server would serve the mirror: a site path ending
/// in `/` names the directory's index document, anything else names a file.
#[derive(Debug, Clone)]
pub struct MirrorLayout {
    root: PathBuf,
    index_file: String,
}

impl MirrorLayout {
    /// Creates a layout rooted at `root`
    pub fn new(root: impl Into<PathBuf>, index_file: &str) -> Self {
        Self {
            root: root.into(),
            index_file: index_file.to_string(),
        }
    }

    /// Creates a layout from the output configuration
    pub fn from_config(config: &OutputConfig) -> Self {
        Self::new(&config.root, &config.index_file)
    }

    /// The output root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Filesystem path for a site-root-absolute path or rewritten reference
    ///
    /// Query and fragment are ignored.
    pub fn fs_path(&self, site_path: &str) -> PathBuf {
        let path = site_path
            .split(['#', '?'])
            .next()
            .unwrap_or_default();

        let mut fs_path = self.root.clone();
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            fs_path.push(segment);
        }

        if path.is_empty() || path.ends_with('/') {
            fs_path.push(&self.index_file);
        }

        fs_path
    }

    /// Filesystem path of the index document for a page URL
    pub fn page_fs_path(&self, url: &Url) -> PathBuf {
        self.fs_path(&page_site_path(url))
    }
}
