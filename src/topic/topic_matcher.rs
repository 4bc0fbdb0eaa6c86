//! Wildcard trie over topic pattern segments

#![allow(clippy::missing_docs_in_private_items)]
#![allow(missing_docs)]
use std::collections::{BTreeMap, HashMap, HashSet};

use arcstr::Substr;
use thiserror::Error;

use super::topic_path::TopicPath;
use super::topic_pattern_item::TopicPatternItem;
use super::topic_pattern_path::TopicPatternPath;

/// Errors that can occur while walking the trie for an update
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TopicMatcherError {
	/// No node exists for the given pattern segment
	#[error("No node for segment '{segment}' at position {position}")]
	PathNotFound { segment: String, position: usize },
}

impl TopicMatcherError {
	/// Creates a new PathNotFound error
	pub fn path_not_found(segment: impl Into<String>, position: usize) -> Self {
		Self::PathNotFound {
			segment: segment.into(),
			position,
		}
	}
}

/// Node in the topic matching tree that represents a part of the topic path.
#[derive(Debug)]
pub struct TopicMatcherNode<T> {
	/// Data for subscriptions anchored exactly at this node
	exact_match_data: Option<T>,

	/// Children nodes for exact matches of next segment
	exact_children: HashMap<Substr, TopicMatcherNode<T>>,

	/// Node for '+' pattern wildcard match (single segment)
	single_level_wildcard_node: Option<Box<TopicMatcherNode<T>>>,

	/// Data for '#' pattern wildcard match (zero or more segments)
	multi_level_wildcard_data: Option<T>,
}

pub trait Len {
	fn len(&self) -> usize;

	fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

impl<T> Len for HashSet<T> {
	fn len(&self) -> usize {
		self.len()
	}
}

impl<K, V> Len for HashMap<K, V> {
	fn len(&self) -> usize {
		self.len()
	}
}

impl<K, V> Len for BTreeMap<K, V> {
	fn len(&self) -> usize {
		self.len()
	}
}

impl<T: Default + Len> Default for TopicMatcherNode<T> {
	fn default() -> Self {
		Self::new()
	}
}

impl<T: Default + Len> TopicMatcherNode<T> {
	/// Creates a new empty topic matcher node
	pub fn new() -> Self {
		Self {
			exact_match_data: None,
			exact_children: HashMap::new(),
			single_level_wildcard_node: None,
			multi_level_wildcard_data: None,
		}
	}

	pub fn is_empty(&self) -> bool {
		self.exact_match_data.as_ref().is_none_or(Len::is_empty)
			&& self.exact_children.is_empty()
			&& self.single_level_wildcard_node.is_none()
			&& self
				.multi_level_wildcard_data
				.as_ref()
				.is_none_or(Len::is_empty)
	}

	/// Finds or creates the subscription table anchored at the given pattern
	pub fn get_or_create_subscription_table(
		&mut self,
		topic_path: &TopicPatternPath,
	) -> &mut T {
		let mut current_node = self;

		for segment in topic_path.iter() {
			match segment {
				| TopicPatternItem::Str(s) => {
					current_node = current_node
						.exact_children
						.entry(s.clone())
						.or_default()
				}
				| TopicPatternItem::Plus => {
					current_node = current_node
						.single_level_wildcard_node
						.get_or_insert_with(|| Box::new(TopicMatcherNode::new()))
				}
				| TopicPatternItem::Hash => {
					// Hash wildcard must be the last segment, so we can return immediately
					return current_node
						.multi_level_wildcard_data
						.get_or_insert_with(T::default);
				}
			}
		}
		current_node.exact_match_data.get_or_insert_with(T::default)
	}

	/// Applies `f` to the table anchored at `topic_path`.
	///
	/// Tables and nodes left empty are pruned on the way back up. Returns
	/// whether this node itself became empty.
	pub fn update_node<F>(
		&mut self,
		topic_path: &[TopicPatternItem],
		f: F,
	) -> Result<bool, TopicMatcherError>
	where
		F: FnOnce(&mut T),
	{
		self.update_node_at(topic_path, 0, f)
	}

	fn update_node_at<F>(
		&mut self,
		topic_path: &[TopicPatternItem],
		position: usize,
		f: F,
	) -> Result<bool, TopicMatcherError>
	where
		F: FnOnce(&mut T),
	{
		let [current_segment, rest_segments @ ..] = topic_path else {
			let data = self.exact_match_data.as_mut().ok_or_else(|| {
				TopicMatcherError::path_not_found("", position)
			})?;
			f(data);
			if data.is_empty() {
				self.exact_match_data = None
			}
			return Ok(self.is_empty());
		};

		match current_segment {
			| TopicPatternItem::Str(s) => {
				let child_node =
					self.exact_children.get_mut(s).ok_or_else(|| {
						TopicMatcherError::path_not_found(s.as_str(), position)
					})?;
				if child_node.update_node_at(rest_segments, position + 1, f)? {
					self.exact_children.remove(s);
				}
			}
			| TopicPatternItem::Plus => {
				let child_node = self
					.single_level_wildcard_node
					.as_mut()
					.ok_or_else(|| {
						TopicMatcherError::path_not_found("+", position)
					})?;
				if child_node.update_node_at(rest_segments, position + 1, f)? {
					self.single_level_wildcard_node = None;
				}
			}
			| TopicPatternItem::Hash => {
				let hash_wildcard_data = self
					.multi_level_wildcard_data
					.as_mut()
					.ok_or_else(|| {
						TopicMatcherError::path_not_found("#", position)
					})?;
				f(hash_wildcard_data);
				if hash_wildcard_data.is_empty() {
					self.multi_level_wildcard_data = None;
				}
			}
		}
		Ok(self.is_empty())
	}

	/// Recursively collects all subscription data that matches the given topic path segments
	fn collect_matching_subscriptions<'a>(
		&'a self,
		topic: &[Substr],
		matching_data: &mut Vec<&'a T>,
	) {
		match topic {
			| [] => {
				// At end of path, collect data from this node if present
				self.exact_match_data
					.iter()
					.for_each(|data| matching_data.push(data));
				// '#' also matches zero remaining segments
				self.multi_level_wildcard_data
					.iter()
					.for_each(|data| matching_data.push(data))
			}
			| [segment, remaining_segments @ ..] => {
				// Check for exact segment match
				if let Some(child) = self.exact_children.get(segment) {
					child.collect_matching_subscriptions(
						remaining_segments,
						matching_data,
					);
				}
				// Check for + wildcard match (matches any single segment)
				self.single_level_wildcard_node
					.iter()
					.for_each(|plus_node| {
						plus_node.collect_matching_subscriptions(
							remaining_segments,
							matching_data,
						)
					});
				// # wildcard matches remainder of path
				self.multi_level_wildcard_data
					.iter()
					.for_each(|hash_data| matching_data.push(hash_data));
			}
		}
	}

	/// Finds all subscription data entries matching the given topic path,
	/// in walk order.
	pub fn find_by_path<'a>(&'a self, topic: &TopicPath) -> Vec<&'a T> {
		let mut matching_subscribers = Vec::new();
		self.collect_matching_subscriptions(
			&topic.segments,
			&mut matching_subscribers,
		);
		matching_subscribers
	}

	fn collect_active_subscriptions<'a>(
		&'a self,
		current_path: &mut Vec<TopicPatternItem>,
		result: &mut Vec<(Vec<TopicPatternItem>, &'a T)>,
	) {
		if let Some(data) = &self.exact_match_data {
			result.push((current_path.clone(), data));
		}
		if let Some(data) = &self.multi_level_wildcard_data {
			current_path.push(TopicPatternItem::Hash);
			result.push((current_path.clone(), data));
			current_path.pop();
		}
		if let Some(plus_node) = &self.single_level_wildcard_node {
			current_path.push(TopicPatternItem::Plus);
			plus_node.collect_active_subscriptions(current_path, result);
			current_path.pop();
		}
		for (exact_segment, child) in &self.exact_children {
			current_path.push(TopicPatternItem::Str(exact_segment.clone()));
			child.collect_active_subscriptions(current_path, result);
			current_path.pop();
		}
	}

	/// Every non-empty table in the trie together with the pattern segments
	/// it is anchored at.
	pub fn active_subscriptions(&self) -> Vec<(Vec<TopicPatternItem>, &T)> {
		let mut result = Vec::new();
		self.collect_active_subscriptions(&mut Vec::new(), &mut result);
		result
	}
}
