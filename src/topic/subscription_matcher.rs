//! Concurrent subscription matcher built on the topic trie

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use arcstr::ArcStr;
use parking_lot::RwLock;
use tracing::{trace, warn};

use super::topic_matcher::TopicMatcherNode;
use super::topic_path::TopicPath;
use super::topic_pattern_path::TopicPatternPath;
use crate::routing::Subscription;

/// Subscriptions anchored at one trie node, keyed by subscriber id.
type SubscriptionTable = BTreeMap<ArcStr, Arc<Subscription>>;

#[derive(Default)]
struct MatcherState {
	trie: TopicMatcherNode<SubscriptionTable>,
	patterns_by_subscriber: HashMap<ArcStr, HashSet<TopicPatternPath>>,
}

/// Concurrent set of topic subscriptions.
///
/// Matching takes a read lock and returns owned handles, so delivery never
/// happens under the lock. Registration and removal take the write lock;
/// an in-flight match sees either the state before or after a mutation.
#[derive(Default)]
pub struct TopicMatcher {
	state: RwLock<MatcherState>,
}

impl TopicMatcher {
	/// Creates an empty matcher.
	pub fn new() -> Self {
		Self::default()
	}

	/// Inserts `subscription`. Returns false if the same
	/// `(subscriber_id, pattern)` is already registered; the existing entry
	/// is kept.
	pub fn add(&self, subscription: Subscription) -> bool {
		let mut state = self.state.write();
		let MatcherState {
			trie,
			patterns_by_subscriber,
		} = &mut *state;

		let table =
			trie.get_or_create_subscription_table(subscription.pattern());
		if table.contains_key(subscription.subscriber_id()) {
			return false;
		}
		patterns_by_subscriber
			.entry(subscription.subscriber_id().clone())
			.or_default()
			.insert(subscription.pattern().clone());
		table.insert(
			subscription.subscriber_id().clone(),
			Arc::new(subscription),
		);
		true
	}

	/// Removes the subscription of `subscriber_id` to exactly `pattern`.
	///
	/// Unknown ids, unknown patterns and unparsable patterns are no-ops.
	pub fn remove(&self, subscriber_id: &str, pattern: &str) -> bool {
		match TopicPatternPath::try_from(pattern) {
			| Ok(pattern) => self.remove_pattern(subscriber_id, &pattern),
			| Err(err) => {
				trace!(
					subscriber_id,
					pattern,
					error = %err,
					"Ignoring removal of unparsable pattern"
				);
				false
			}
		}
	}

	/// Same as [`remove`](Self::remove) with an already parsed pattern.
	pub fn remove_pattern(
		&self,
		subscriber_id: &str,
		pattern: &TopicPatternPath,
	) -> bool {
		let mut state = self.state.write();
		let MatcherState {
			trie,
			patterns_by_subscriber,
		} = &mut *state;

		let mut removed = false;
		if let Err(err) = trie.update_node(pattern.slice(), |table| {
			removed = table.remove(subscriber_id).is_some();
		}) {
			trace!(
				subscriber_id,
				pattern = %pattern,
				error = %err,
				"Nothing to remove"
			);
			return false;
		}

		if removed {
			if let Some(patterns) = patterns_by_subscriber.get_mut(subscriber_id)
			{
				patterns.remove(pattern);
				if patterns.is_empty() {
					patterns_by_subscriber.remove(subscriber_id);
				}
			}
		}
		removed
	}

	/// Removes every subscription held by `subscriber_id` in this instance.
	/// Returns how many were removed.
	pub fn remove_all(&self, subscriber_id: &str) -> usize {
		let mut state = self.state.write();
		let MatcherState {
			trie,
			patterns_by_subscriber,
		} = &mut *state;

		let Some(patterns) = patterns_by_subscriber.remove(subscriber_id)
		else {
			return 0;
		};

		let mut removed = 0;
		for pattern in &patterns {
			let mut found = false;
			let res = trie.update_node(pattern.slice(), |table| {
				found = table.remove(subscriber_id).is_some();
			});
			match res {
				| Ok(_) if found => removed += 1,
				| Ok(_) => {}
				| Err(err) => {
					warn!(
						subscriber_id,
						pattern = %pattern,
						error = %err,
						"Indexed pattern missing from trie"
					);
				}
			}
		}
		removed
	}

	/// Subscriptions matching `topic`, at most one per subscriber.
	///
	/// Order is the order of first encounter during the trie walk: exact
	/// child, then `+` child, then `#`. Within one node subscribers are
	/// ordered by id.
	pub fn match_unique(
		&self,
		topic: impl Into<TopicPath>,
	) -> Vec<Arc<Subscription>> {
		let topic = topic.into();
		let state = self.state.read();
		let mut seen = HashSet::new();
		state
			.trie
			.find_by_path(&topic)
			.into_iter()
			.flat_map(|table| table.values())
			.filter(|subscription| {
				seen.insert(subscription.subscriber_id().clone())
			})
			.cloned()
			.collect()
	}

	/// Number of registered `(subscriber_id, pattern)` pairs.
	pub fn len(&self) -> usize {
		self.state
			.read()
			.patterns_by_subscriber
			.values()
			.map(HashSet::len)
			.sum()
	}

	/// True when no subscription is registered.
	pub fn is_empty(&self) -> bool {
		self.state.read().patterns_by_subscriber.is_empty()
	}

	/// Patterns of `subscriber_id`, sorted.
	pub fn patterns_of(&self, subscriber_id: &str) -> Vec<TopicPatternPath> {
		let state = self.state.read();
		let mut patterns: Vec<_> = state
			.patterns_by_subscriber
			.get(subscriber_id)
			.map(|patterns| patterns.iter().cloned().collect())
			.unwrap_or_default();
		patterns.sort_by(|a, b| a.as_str().cmp(b.as_str()));
		patterns
	}

	/// Every pattern with at least one subscriber, with its subscriber
	/// count, sorted by pattern.
	pub fn active_patterns(&self) -> Vec<(TopicPatternPath, usize)> {
		let state = self.state.read();
		let mut active: Vec<_> = state
			.trie
			.active_subscriptions()
			.into_iter()
			.filter_map(|(segments, table)| {
				TopicPatternPath::new_from_segments(&segments)
					.ok()
					.map(|pattern| (pattern, table.len()))
			})
			.collect();
		active.sort_by(|(a, _), (b, _)| a.as_str().cmp(b.as_str()));
		active
	}

	/// Drops every subscription.
	pub fn clear(&self) {
		*self.state.write() = MatcherState::default();
	}
}

impl std::fmt::Debug for TopicMatcher {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("TopicMatcher")
			.field("subscriptions", &self.len())
			.finish()
	}
}
