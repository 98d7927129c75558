//! URL handling module for Sumi-Mirror
//!
//! This module provides URL canonicalization, host pattern matching, path
//! segment helpers and the scope classifier.

mod classify;
mod matcher;
mod normalize;
mod segments;

// Re-export main functions
pub use classify::{host_patterns, Classifier, ScopeDecision};
pub use matcher::HostPattern;
pub use normalize::{canonicalize, CanonicalUrl};
pub use segments::{path_basename, path_extension, path_stem};
