use crate::storage::traits::{Storage, StorageResult};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Keeps the mirror in memory
///
/// Used by the crawl-loop tests, and by callers that want a mirror without
/// touching disk. Later writes to a path replace earlier ones.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    files: BTreeMap<PathBuf, Vec<u8>>,
}

impl MemoryStorage {
    /// Creates an empty in-memory storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Contents stored at `path`
    pub fn get(&self, path: impl AsRef<Path>) -> Option<&[u8]> {
        self.files.get(path.as_ref()).map(Vec::as_slice)
    }

    /// Contents stored at `path`, decoded as UTF-8
    pub fn get_text(&self, path: impl AsRef<Path>) -> Option<String> {
        self.get(path)
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }

    /// All stored paths in sorted order
    pub fn paths(&self) -> impl Iterator<Item = &PathBuf> {
        self.files.keys()
    }

    /// Number of stored files
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns true if nothing was written
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl Storage for MemoryStorage {
    fn write_binary(&mut self, path: &Path, bytes: &[u8]) -> StorageResult<()> {
        self.files.insert(path.to_path_buf(), bytes.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_and_read_back() {
        let mut storage = MemoryStorage::new();
        storage
            .write_binary(Path::new("mirror/index.html"), b"<html></html>")
            .unwrap();
        storage
            .write_binary(Path::new("mirror/img/x.png"), &[0x89, 0x50])
            .unwrap();

        assert_eq!(storage.len(), 2);
        assert_eq!(
            storage.get_text("mirror/index.html").as_deref(),
            Some("<html></html>")
        );
        assert_eq!(storage.get("mirror/img/x.png"), Some(&[0x89, 0x50][..]));
        assert!(storage.get("mirror/missing").is_none());
    }
}
