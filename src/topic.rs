//! Topic handling module
//!
//! This module provides components for working with hierarchical topic
//! names and subscription patterns: parsing, the wildcard trie and the
//! concurrent subscription matcher built on it.

// Submodules
pub mod error;
pub mod subscription_matcher;
pub mod topic_matcher;
pub mod topic_path;
pub mod topic_pattern_item;
/// Topic pattern parsing
pub mod topic_pattern_path;

#[cfg(test)]
mod subscription_matcher_tests;
#[cfg(test)]
mod topic_pattern_item_tests;
#[cfg(test)]
mod topic_pattern_path_tests;

// Re-export commonly used types for convenience
pub use error::TopicError;
// Re-export constants and validation utilities
pub use error::{limits, validation};
pub use subscription_matcher::TopicMatcher;
pub use topic_matcher::{TopicMatcherError, TopicMatcherNode};
pub use topic_path::TopicPath;
pub use topic_pattern_item::{TopicPatternError, TopicPatternItem};
pub use topic_pattern_path::TopicPatternPath;
