use crate::storage::traits::{Storage, StorageError, StorageResult};
use std::fs;
use std::path::Path;

/// Writes the mirror to the local filesystem
#[derive(Debug, Clone, Default)]
pub struct FsStorage {
    bytes_written: u64,
    files_written: u64,
}

impl FsStorage {
    /// Creates a new filesystem storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Total bytes written so far
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Number of write operations so far
    pub fn files_written(&self) -> u64 {
        self.files_written
    }
}

impl Storage for FsStorage {
    fn write_binary(&mut self, path: &Path, bytes: &[u8]) -> StorageResult<()> {
        let parent = path
            .parent()
            .ok_or_else(|| StorageError::NoParent(path.to_path_buf()))?;

        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|source| StorageError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        fs::write(path, bytes).map_err(|source| StorageError::Write {
            path: path.to_path_buf(),
            source,
        })?;

        self.bytes_written += bytes.len() as u64;
        self.files_written += 1;
        tracing::trace!("Wrote {} bytes to {}", bytes.len(), path.display());

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_binary_creates_parents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a/b/c/file.bin");

        let mut storage = FsStorage::new();
        storage.write_binary(&path, &[1, 2, 3]).unwrap();

        assert_eq!(fs::read(&path).unwrap(), vec![1, 2, 3]);
        assert_eq!(storage.bytes_written(), 3);
        assert_eq!(storage.files_written(), 1);
    }

    #[test]
    fn test_write_overwrites() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("page/index.html");

        let mut storage = FsStorage::new();
        storage.write_binary(&path, b"first").unwrap();
        storage.write_binary(&path, b"second").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
    }

    #[test]
    fn test_write_into_existing_file_as_directory_fails() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, b"x").unwrap();

        let mut storage = FsStorage::new();
        let result = storage.write_binary(&blocker.join("child.txt"), b"y");
        assert!(matches!(result.unwrap_err(), StorageError::CreateDir { .. }));
    }
}
