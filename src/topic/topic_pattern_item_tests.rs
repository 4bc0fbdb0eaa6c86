//! Tests for TopicPatternItem functionality

use arcstr::Substr;

use super::{TopicPatternError, TopicPatternItem};

#[test]
fn test_literal_string_item() {
	let item = TopicPatternItem::try_from(Substr::from("sensors")).unwrap();

	assert_eq!(item, TopicPatternItem::Str(Substr::from("sensors")));
	assert_eq!(item.as_str(), "sensors");
	assert!(!item.is_wildcard());
}

#[test]
fn test_empty_literal_item() {
	let item = TopicPatternItem::try_from(Substr::from("")).unwrap();

	assert_eq!(item, TopicPatternItem::Str(Substr::from("")));
	assert!(!item.is_wildcard());
}

#[test]
fn test_plus_wildcard() {
	let item = TopicPatternItem::try_from(Substr::from("+")).unwrap();

	assert_eq!(item, TopicPatternItem::Plus);
	assert_eq!(item.as_str(), "+");
	assert!(item.is_wildcard());
}

#[test]
fn test_hash_wildcard() {
	let item = TopicPatternItem::try_from(Substr::from("#")).unwrap();

	assert_eq!(item, TopicPatternItem::Hash);
	assert_eq!(item.to_string(), "#");
	assert!(item.is_wildcard());
}

#[test]
fn test_invalid_wildcard_with_text() {
	for segment in ["text+more", "text#more", "+#", "##", "a+"] {
		let result = TopicPatternItem::try_from(Substr::from(segment));

		match result {
			| Err(TopicPatternError::WildcardUsage { usage }) => {
				assert_eq!(usage, segment)
			}
			| other => panic!("Expected WildcardUsage error, got {other:?}"),
		}
	}
}
