//! Tests for TopicPatternPath functionality

use std::collections::HashSet;

use super::limits::{MAX_TOPIC_DEPTH, MAX_TOPIC_LENGTH};
use super::{TopicPatternError, TopicPatternItem, TopicPatternPath};

fn create_pattern(pattern: &str) -> TopicPatternPath {
	TopicPatternPath::try_from(pattern).expect("Pattern should be valid")
}

#[test]
fn test_parse_segments() {
	let pattern = create_pattern("sensors/+/data/#");

	let segments: Vec<&str> =
		pattern.iter().map(TopicPatternItem::as_str).collect();
	assert_eq!(segments, vec!["sensors", "+", "data", "#"]);
	assert_eq!(pattern.len(), 4);
	assert!(pattern.has_wildcards());
	assert_eq!(pattern.to_string(), "sensors/+/data/#");
}

#[test]
fn test_literal_pattern_has_no_wildcards() {
	let pattern = create_pattern("a/b/c");
	assert!(!pattern.has_wildcards());
}

#[test]
fn test_empty_pattern_is_single_empty_segment() {
	let pattern = create_pattern("");
	assert_eq!(pattern.len(), 1);
	assert_eq!(pattern.slice()[0].as_str(), "");

	let pattern = create_pattern("/a/");
	let segments: Vec<&str> =
		pattern.iter().map(TopicPatternItem::as_str).collect();
	assert_eq!(segments, vec!["", "a", ""]);
}

#[test]
fn test_hash_must_be_last() {
	let result = TopicPatternPath::try_from("a/#/b");
	assert_eq!(result.unwrap_err(), TopicPatternError::hash_position("a/#/b"));

	assert!(TopicPatternPath::try_from("#").is_ok());
	assert!(TopicPatternPath::try_from("a/+/#").is_ok());
}

#[test]
fn test_mixed_wildcard_segment_rejected() {
	assert!(matches!(
		TopicPatternPath::try_from("a/b+/c"),
		Err(TopicPatternError::WildcardUsage { .. })
	));
}

#[test]
fn test_limits() {
	let too_deep = vec!["a"; MAX_TOPIC_DEPTH + 1].join("/");
	assert!(matches!(
		TopicPatternPath::try_from(too_deep.as_str()),
		Err(TopicPatternError::LimitExceeded { .. })
	));

	let too_long = "x".repeat(MAX_TOPIC_LENGTH + 1);
	assert!(matches!(
		TopicPatternPath::try_from(too_long.as_str()),
		Err(TopicPatternError::LimitExceeded { .. })
	));
}

#[test]
fn test_round_trip_from_segments() {
	let pattern = create_pattern("home/+/temperature/#");
	let rebuilt = TopicPatternPath::new_from_segments(pattern.slice()).unwrap();
	assert_eq!(rebuilt, pattern);
}

#[test]
fn test_equality_and_hash_follow_text() {
	let set: HashSet<TopicPatternPath> =
		["a/+", "a/+", "a/#"].into_iter().map(create_pattern).collect();
	assert_eq!(set.len(), 2);
}
