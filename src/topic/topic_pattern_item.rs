//! Topic pattern segment types

use std::convert::TryFrom;

use arcstr::Substr;
use thiserror::Error;

/// Error types for topic pattern parsing
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TopicPatternError {
	/// Hash wildcard (#) used not at the end of the pattern
	#[error(
		"Invalid topic pattern '{pattern}': # wildcard can only be the last \
		 segment"
	)]
	HashPosition {
		/// The invalid pattern
		pattern: String,
	},

	/// Wildcard characters (+ or #) used incorrectly
	#[error("Invalid wildcard usage: {usage}")]
	WildcardUsage {
		/// Description of invalid usage
		usage: String,
	},

	/// Pattern exceeds the configured depth or length limits
	#[error("Topic pattern exceeds limits: {details}")]
	LimitExceeded {
		/// Which limit was exceeded
		details: String,
	},
}

impl TopicPatternError {
	/// Creates a new HashPosition error
	pub fn hash_position(pattern: impl Into<String>) -> Self {
		Self::HashPosition {
			pattern: pattern.into(),
		}
	}

	/// Creates a new WildcardUsage error
	pub fn wildcard_usage(usage: impl Into<String>) -> Self {
		Self::WildcardUsage {
			usage: usage.into(),
		}
	}

	/// Creates a new LimitExceeded error
	pub fn limit_exceeded(details: impl Into<String>) -> Self {
		Self::LimitExceeded {
			details: details.into(),
		}
	}
}

/// Topic pattern segment: literal string or wildcard
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TopicPatternItem {
	/// Literal segment, compared case-sensitively. May be empty.
	Str(Substr),
	/// Single-level wildcard `+`
	Plus,
	/// Multi-level wildcard `#`, only valid as the final segment
	Hash,
}

impl TopicPatternItem {
	/// Returns string representation of the pattern item.
	pub fn as_str(&self) -> &str {
		match self {
			| TopicPatternItem::Str(s) => s,
			| TopicPatternItem::Plus => "+",
			| TopicPatternItem::Hash => "#",
		}
	}

	/// Returns true if this item is a wildcard (+ or #).
	pub fn is_wildcard(&self) -> bool {
		matches!(self, TopicPatternItem::Plus | TopicPatternItem::Hash)
	}
}

impl std::fmt::Display for TopicPatternItem {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.as_str())
	}
}

impl TryFrom<Substr> for TopicPatternItem {
	type Error = TopicPatternError;

	fn try_from(item: Substr) -> Result<Self, Self::Error> {
		let res = match item.as_str() {
			| "+" => TopicPatternItem::Plus,
			| "#" => TopicPatternItem::Hash,
			| _ if item.contains(['+', '#']) => {
				return Err(TopicPatternError::wildcard_usage(item.as_str()));
			}
			| _ => TopicPatternItem::Str(item),
		};
		Ok(res)
	}
}
