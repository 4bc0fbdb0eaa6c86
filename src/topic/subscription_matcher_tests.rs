use std::collections::HashSet;
use std::sync::Arc;

use super::TopicMatcher;
use crate::message::Message;
use crate::routing::{DeliveryTarget, Subscription};

struct Discard;

impl DeliveryTarget for Discard {
	fn deliver(&self, _subscription: &Subscription, _message: Message) {}
}

fn sub(id: &str, pattern: &str) -> Subscription {
	Subscription::new(id, pattern, Discard).unwrap()
}

fn matched_ids(matcher: &TopicMatcher, topic: &str) -> Vec<String> {
	matcher
		.match_unique(topic)
		.iter()
		.map(|s| s.subscriber_id().to_string())
		.collect()
}

fn assert_unique(ids: &[String]) {
	let unique: HashSet<&String> = ids.iter().collect();
	assert_eq!(unique.len(), ids.len(), "duplicate subscriber in {ids:?}");
}

#[test]
fn test_overlapping_patterns_match_once() {
	let matcher = TopicMatcher::new();
	assert!(matcher.add(sub("s1", "a/#")));
	assert!(matcher.add(sub("s1", "a/b")));

	let matches = matcher.match_unique("a/b");
	assert_eq!(matches.len(), 1);
	assert_eq!(matches[0].subscriber_id().as_str(), "s1");
}

#[test]
fn test_plus_and_hash_same_subscriber() {
	let matcher = TopicMatcher::new();
	matcher.add(sub("s1", "a/+/c"));
	matcher.add(sub("s1", "a/#"));

	assert_eq!(matched_ids(&matcher, "a/b/c"), vec!["s1"]);
	// only a/# covers these
	assert_eq!(matched_ids(&matcher, "a/b"), vec!["s1"]);
	assert_eq!(matched_ids(&matcher, "a"), vec!["s1"]);
	assert!(matched_ids(&matcher, "b/b/c").is_empty());
}

#[test]
fn test_wildcard_semantics() {
	let matcher = TopicMatcher::new();
	matcher.add(sub("plus_c", "a/+/c"));
	matcher.add(sub("exact", "a/b/c"));
	matcher.add(sub("hash", "a/#"));
	matcher.add(sub("plus", "a/+"));

	assert_eq!(matched_ids(&matcher, "a/b"), vec!["plus", "hash"]);
	assert_eq!(matched_ids(&matcher, "a/b/c"), vec![
		"exact", "plus_c", "hash"
	]);
	assert_eq!(matched_ids(&matcher, "a"), vec!["hash"]);
}

#[test]
fn test_match_order_is_deterministic() {
	let matcher = TopicMatcher::new();
	for id in ["zeta", "alpha", "mid"] {
		matcher.add(sub(id, "x/y"));
	}
	matcher.add(sub("wild", "x/+"));

	let first = matched_ids(&matcher, "x/y");
	assert_eq!(first, vec!["alpha", "mid", "zeta", "wild"]);
	for _ in 0 .. 10 {
		assert_eq!(matched_ids(&matcher, "x/y"), first);
	}
}

#[test]
fn test_add_is_idempotent() {
	let matcher = TopicMatcher::new();
	assert!(matcher.add(sub("s1", "a/b")));
	assert!(!matcher.add(sub("s1", "a/b")));
	assert!(matcher.add(sub("s2", "a/b")));
	assert!(matcher.add(sub("s1", "a/+")));

	assert_eq!(matcher.len(), 3);
	assert_eq!(matched_ids(&matcher, "a/b"), vec!["s1", "s2"]);
}

#[test]
fn test_remove_exact_pattern_only() {
	let matcher = TopicMatcher::new();
	matcher.add(sub("s1", "a/b"));
	matcher.add(sub("s1", "a/#"));

	assert!(matcher.remove("s1", "a/b"));
	assert_eq!(matched_ids(&matcher, "a/b"), vec!["s1"]);

	assert!(matcher.remove("s1", "a/#"));
	assert!(matched_ids(&matcher, "a/b").is_empty());
	assert!(matcher.is_empty());
}

#[test]
fn test_remove_unknown_is_noop() {
	let matcher = TopicMatcher::new();
	matcher.add(sub("s1", "a/b"));

	assert!(!matcher.remove("s2", "a/b"));
	assert!(!matcher.remove("s1", "a/c"));
	assert!(!matcher.remove("s1", "a/+"));
	assert!(!matcher.remove("s1", "a/#/b")); // unparsable
	assert_eq!(matched_ids(&matcher, "a/b"), vec!["s1"]);
	assert_eq!(matcher.len(), 1);
}

#[test]
fn test_remove_all() {
	let matcher = TopicMatcher::new();
	matcher.add(sub("s1", "a/b"));
	matcher.add(sub("s1", "a/+"));
	matcher.add(sub("s1", "#"));
	matcher.add(sub("s2", "a/b"));

	assert_eq!(matcher.remove_all("s1"), 3);
	assert_eq!(matcher.remove_all("s1"), 0);
	assert_eq!(matcher.remove_all("unknown"), 0);

	assert_eq!(matched_ids(&matcher, "a/b"), vec!["s2"]);
	assert!(matcher.patterns_of("s1").is_empty());
	assert_eq!(matcher.len(), 1);
}

#[test]
fn test_patterns_and_active_patterns() {
	let matcher = TopicMatcher::new();
	matcher.add(sub("s1", "b/#"));
	matcher.add(sub("s1", "a/+"));
	matcher.add(sub("s2", "a/+"));

	let patterns: Vec<String> = matcher
		.patterns_of("s1")
		.iter()
		.map(ToString::to_string)
		.collect();
	assert_eq!(patterns, vec!["a/+", "b/#"]);

	let active: Vec<(String, usize)> = matcher
		.active_patterns()
		.into_iter()
		.map(|(pattern, count)| (pattern.to_string(), count))
		.collect();
	assert_eq!(active, vec![("a/+".to_string(), 2), ("b/#".to_string(), 1)]);

	matcher.clear();
	assert!(matcher.is_empty());
	assert!(matcher.active_patterns().is_empty());
}

// Small deterministic generator so the operation mix is reproducible
struct Lcg(u64);

impl Lcg {
	fn below(&mut self, bound: usize) -> usize {
		self.0 = self
			.0
			.wrapping_mul(6364136223846793005)
			.wrapping_add(1442695040888963407);
		((self.0 >> 33) as usize) % bound
	}
}

#[test]
fn test_random_operations_never_duplicate() {
	let ids = ["s1", "s2", "s3", "s4"];
	let patterns = ["a/b/c", "a/+/c", "a/#", "#", "+/b/+", "a/b", "+/+/+"];
	let topics = ["a/b/c", "a/b", "a", "x/b/y", "a/x/c", ""];

	let matcher = TopicMatcher::new();
	let mut rng = Lcg(42);
	for _ in 0 .. 2_000 {
		let id = ids[rng.below(ids.len())];
		let pattern = patterns[rng.below(patterns.len())];
		match rng.below(5) {
			| 0 => {
				matcher.remove(id, pattern);
			}
			| 1 => {
				matcher.remove_all(id);
			}
			| _ => {
				matcher.add(sub(id, pattern));
			}
		}
		for topic in topics {
			assert_unique(&matched_ids(&matcher, topic));
		}
	}
}

#[test]
fn test_concurrent_match_and_mutation() {
	let matcher = Arc::new(TopicMatcher::new());
	matcher.add(sub("stable", "a/#"));

	std::thread::scope(|scope| {
		for worker in 0 .. 4 {
			let matcher = Arc::clone(&matcher);
			scope.spawn(move || {
				let id = format!("w{worker}");
				for i in 0 .. 500 {
					let pattern = if i % 2 == 0 { "a/+/c" } else { "a/b/#" };
					matcher.add(sub(&id, pattern));
					matcher.add(sub(&id, "a/b/c"));
					if i % 3 == 0 {
						matcher.remove_all(&id);
					} else {
						matcher.remove(&id, pattern);
					}
				}
			});
		}
		for _ in 0 .. 4 {
			let matcher = Arc::clone(&matcher);
			scope.spawn(move || {
				for _ in 0 .. 500 {
					let ids = matched_ids(&matcher, "a/b/c");
					assert_unique(&ids);
					assert!(ids.iter().any(|id| id == "stable"));
				}
			});
		}
	});

	// every worker ends on an add of "a/b/c" followed by removal of its
	// other pattern
	assert_eq!(matched_ids(&matcher, "a/b/c"), vec![
		"w0", "w1", "w2", "w3", "stable"
	]);
}
