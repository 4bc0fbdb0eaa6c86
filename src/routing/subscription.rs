//! Subscriptions and the targets they deliver to

use std::fmt;
use std::sync::Arc;

use arcstr::ArcStr;
use tokio::sync::mpsc::{Sender, UnboundedSender, error::TrySendError};
use tracing::{debug, warn};

use crate::message::Message;
use crate::topic::{TopicPatternError, TopicPatternPath};

/// Receiving end of a subscription.
///
/// Delivery must not block the routing sink: a target owns its own
/// buffering and backpressure policy.
pub trait DeliveryTarget: Send + Sync + 'static {
	/// Hands one message copy to the subscriber.
	fn deliver(&self, subscription: &Subscription, message: Message);
}

impl DeliveryTarget for Sender<Message> {
	fn deliver(&self, subscription: &Subscription, message: Message) {
		match self.try_send(message) {
			| Ok(()) => {}
			| Err(TrySendError::Full(message)) => {
				warn!(
					subscriber_id = %subscription.subscriber_id(),
					topic = %message.topic,
					"Delivery queue full, message dropped",
				);
			}
			| Err(TrySendError::Closed(message)) => {
				debug!(
					subscriber_id = %subscription.subscriber_id(),
					topic = %message.topic,
					"Delivery queue closed, message dropped",
				);
			}
		}
	}
}

impl DeliveryTarget for UnboundedSender<Message> {
	fn deliver(&self, subscription: &Subscription, message: Message) {
		if let Err(err) = self.send(message) {
			debug!(
				subscriber_id = %subscription.subscriber_id(),
				topic = %err.0.topic,
				"Delivery queue closed, message dropped",
			);
		}
	}
}

/// A registered interest of one subscriber in one topic pattern.
///
/// Identity is `(subscriber_id, pattern)`. A subscriber may hold several
/// patterns, each as its own subscription.
#[derive(Clone)]
pub struct Subscription {
	subscriber_id: ArcStr,
	pattern: TopicPatternPath,
	target: Arc<dyn DeliveryTarget>,
}

impl Subscription {
	/// Parses `pattern` and binds it to `target`.
	pub fn new(
		subscriber_id: impl Into<ArcStr>,
		pattern: &str,
		target: impl DeliveryTarget,
	) -> Result<Self, TopicPatternError> {
		Ok(Self::with_pattern(
			subscriber_id,
			TopicPatternPath::try_from(pattern)?,
			Arc::new(target),
		))
	}

	/// Builds a subscription from an already parsed pattern and a shared
	/// target.
	pub fn with_pattern(
		subscriber_id: impl Into<ArcStr>,
		pattern: TopicPatternPath,
		target: Arc<dyn DeliveryTarget>,
	) -> Self {
		Self {
			subscriber_id: subscriber_id.into(),
			pattern,
			target,
		}
	}

	/// Id of the subscribing client or rule.
	pub fn subscriber_id(&self) -> &ArcStr {
		&self.subscriber_id
	}

	/// Pattern this subscription matches.
	pub fn pattern(&self) -> &TopicPatternPath {
		&self.pattern
	}

	/// Forwards `message` to this subscription's target.
	pub fn deliver(&self, message: Message) {
		self.target.deliver(self, message)
	}
}

impl PartialEq for Subscription {
	fn eq(&self, other: &Self) -> bool {
		self.subscriber_id == other.subscriber_id
			&& self.pattern == other.pattern
	}
}

impl Eq for Subscription {}

impl fmt::Debug for Subscription {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Subscription")
			.field("subscriber_id", &self.subscriber_id)
			.field("pattern", &self.pattern.as_str())
			.finish_non_exhaustive()
	}
}
