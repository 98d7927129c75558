//! Storage traits and error types
//!
//! This module defines the trait interface for mirror output backends and
//! associated error types.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Path {0} has no parent directory")]
    NoParent(PathBuf),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for mirror output backends
///
/// Writes create any missing parent directories and replace an existing file
/// at the same path. Pages, assets and sitemaps are all written as bytes;
/// pages keep the character encoding they were served in.
pub trait Storage {
    /// Writes raw bytes to `path`
    fn write_binary(&mut self, path: &Path, bytes: &[u8]) -> StorageResult<()>;
}
