//! Storage module for persisting the mirror
//!
//! This module handles writing mirrored resources:
//! - `FsStorage` writes under the output root on the local filesystem
//! - `MemoryStorage` keeps everything in memory (crawl-loop tests)
//!
//! Both create missing parent directories implicitly.

mod fs;
mod memory;
mod traits;

pub use fs::FsStorage;
pub use memory::MemoryStorage;
pub use traits::{Storage, StorageError, StorageResult};
