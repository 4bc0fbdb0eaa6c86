//! Error types and utilities for the topic module
//!
//! Holds the error for concrete topics rejected at publish time and the
//! limits and validation helpers shared by patterns and topics. Pattern and
//! trie errors stay in their own modules.

use thiserror::Error;

use super::topic_pattern_item::TopicPatternError;

/// Error for a concrete topic that cannot enter the hub
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TopicError {
	/// Concrete topic rejected for publishing
	#[error("Invalid topic '{topic}': {reason}")]
	InvalidTopic {
		/// The rejected topic
		topic: String,
		/// Why it was rejected
		reason: String,
	},
}

impl TopicError {
	/// Creates a new InvalidTopic error
	pub fn invalid_topic(
		topic: impl Into<String>,
		reason: impl Into<String>,
	) -> Self {
		Self::InvalidTopic {
			topic: topic.into(),
			reason: reason.into(),
		}
	}
}

/// Topic processing limits and constants
pub mod limits {
	/// Maximum topic nesting depth allowed
	pub const MAX_TOPIC_DEPTH: usize = 32;

	/// Maximum length of a single topic segment
	pub const MAX_SEGMENT_LENGTH: usize = 256;

	/// Maximum total topic path length
	pub const MAX_TOPIC_LENGTH: usize = 1024;
}

/// Validation utilities for topic operations
pub mod validation {
	use super::limits::*;
	use super::{TopicError, TopicPatternError};

	/// Validates a concrete topic before it enters the hub.
	///
	/// Empty segments are allowed. Wildcard characters are not.
	pub fn validate_topic_path(path: &str) -> Result<(), TopicError> {
		if path.len() > MAX_TOPIC_LENGTH {
			return Err(TopicError::invalid_topic(
				path,
				format!("too long: {} > {}", path.len(), MAX_TOPIC_LENGTH),
			));
		}

		if path.contains(['+', '#']) {
			return Err(TopicError::invalid_topic(
				path,
				"wildcards are not allowed in a published topic",
			));
		}

		if path.contains('\0') {
			return Err(TopicError::invalid_topic(path, "contains null byte"));
		}

		let mut depth = 0;
		for segment in path.split('/') {
			depth += 1;
			if depth > MAX_TOPIC_DEPTH {
				return Err(TopicError::invalid_topic(
					path,
					format!("deeper than {MAX_TOPIC_DEPTH} segments"),
				));
			}
			if segment.len() > MAX_SEGMENT_LENGTH {
				return Err(TopicError::invalid_topic(
					path,
					format!("segment '{segment}' is too long"),
				));
			}
		}

		Ok(())
	}

	/// Validates topic pattern for subscription constraints
	pub fn validate_pattern_for_subscription(
		pattern: &str,
	) -> Result<(), TopicPatternError> {
		if pattern.len() > MAX_TOPIC_LENGTH {
			return Err(TopicPatternError::limit_exceeded(format!(
				"Pattern too long: {} > {}",
				pattern.len(),
				MAX_TOPIC_LENGTH
			)));
		}

		let depth = pattern.split('/').count();
		if depth > MAX_TOPIC_DEPTH {
			return Err(TopicPatternError::limit_exceeded(format!(
				"Pattern too deep: {depth} segments > {MAX_TOPIC_DEPTH}"
			)));
		}

		Ok(())
	}
}
