//! Subscription pattern paths

use std::fmt::{self, Display};
use std::slice::Iter;

use arcstr::ArcStr;
use smallvec::SmallVec;

use super::error::validation;
use super::topic_pattern_item::{TopicPatternError, TopicPatternItem};

/// Parsed subscription pattern with `+` / `#` wildcard support.
///
/// Equality and hashing follow the original pattern string, so two paths
/// parsed from the same text are interchangeable.
#[derive(Debug, Clone)]
pub struct TopicPatternPath {
	pattern: ArcStr,
	segments: SmallVec<[TopicPatternItem; 8]>,
}

impl TopicPatternPath {
	/// Parses a subscription pattern.
	///
	/// Segments are separated by `/`. An empty segment (including the empty
	/// pattern itself) is a literal. `#` is only accepted as the last segment.
	pub fn new_from_string(
		pattern: impl Into<ArcStr>,
	) -> Result<Self, TopicPatternError> {
		let pattern = pattern.into();
		validation::validate_pattern_for_subscription(&pattern)?;

		let segments = pattern
			.split('/')
			.map(|s| pattern.substr_from(s))
			.map(TopicPatternItem::try_from)
			.collect::<Result<SmallVec<[_; 8]>, _>>()?;

		if let Some(hash_pos) = segments
			.iter()
			.position(|s| matches!(s, TopicPatternItem::Hash))
		{
			if hash_pos != segments.len() - 1 {
				return Err(TopicPatternError::hash_position(
					pattern.as_str(),
				));
			}
		}

		Ok(Self { pattern, segments })
	}

	/// Rebuilds a pattern from already parsed segments.
	pub fn new_from_segments(
		segments: &[TopicPatternItem],
	) -> Result<Self, TopicPatternError> {
		let pattern = segments
			.iter()
			.map(TopicPatternItem::as_str)
			.collect::<Vec<_>>()
			.join("/");
		Self::new_from_string(pattern)
	}

	/// Original pattern text.
	pub fn as_str(&self) -> &str {
		&self.pattern
	}

	/// Original pattern text as a shared string.
	pub fn pattern(&self) -> ArcStr {
		self.pattern.clone()
	}

	/// Iterates over the parsed segments.
	pub fn iter(&self) -> Iter<'_, TopicPatternItem> {
		self.segments.iter()
	}

	/// Parsed segments as a slice.
	pub fn slice(&self) -> &[TopicPatternItem] {
		&self.segments
	}

	/// Number of segments.
	pub fn len(&self) -> usize {
		self.segments.len()
	}

	/// Never true for a parsed pattern: the empty pattern has one segment.
	pub fn is_empty(&self) -> bool {
		self.segments.is_empty()
	}

	/// True when the pattern contains `+` or `#`.
	pub fn has_wildcards(&self) -> bool {
		self.segments.iter().any(TopicPatternItem::is_wildcard)
	}
}

impl PartialEq for TopicPatternPath {
	fn eq(&self, other: &Self) -> bool {
		self.pattern == other.pattern
	}
}

impl Eq for TopicPatternPath {}

impl std::hash::Hash for TopicPatternPath {
	fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
		self.pattern.hash(state)
	}
}

impl Display for TopicPatternPath {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.pattern)
	}
}

impl TryFrom<&str> for TopicPatternPath {
	type Error = TopicPatternError;

	fn try_from(pattern: &str) -> Result<Self, Self::Error> {
		Self::new_from_string(ArcStr::from(pattern))
	}
}

impl TryFrom<ArcStr> for TopicPatternPath {
	type Error = TopicPatternError;

	fn try_from(pattern: ArcStr) -> Result<Self, Self::Error> {
		Self::new_from_string(pattern)
	}
}
