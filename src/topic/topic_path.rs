//! Concrete topics as seen by the matcher

use std::fmt;

use arcstr::{ArcStr, Substr};
use smallvec::SmallVec;

/// Concrete topic split into `/` segments.
///
/// Segments are substrings of the shared topic, no per-segment allocation.
#[derive(Debug, Clone)]
pub struct TopicPath {
	/// Full topic text
	pub path: ArcStr,
	/// `/`-separated levels, empty levels included
	pub segments: SmallVec<[Substr; 8]>,
}

impl TopicPath {
	/// Splits `path` into levels.
	pub fn new(path: ArcStr) -> Self {
		let segments = path.split('/').map(|s| path.substr_from(s)).collect();
		Self { path, segments }
	}
}

impl From<&str> for TopicPath {
	fn from(path: &str) -> Self {
		Self::new(ArcStr::from(path))
	}
}

impl From<ArcStr> for TopicPath {
	fn from(path: ArcStr) -> Self {
		Self::new(path)
	}
}

impl From<&ArcStr> for TopicPath {
	fn from(path: &ArcStr) -> Self {
		Self::new(path.clone())
	}
}

impl fmt::Display for TopicPath {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.path)
	}
}
