//! Per-class routing actor
//!
//! A [`Sink`] drains one delivery class and fans every message out to the
//! subscriptions its topic matches. The immediate class is pushed through
//! [`Broker::recv_immediate`] and tracks no offset. The durable class is
//! polled in batches from [`Broker::fetch_durable`] starting at the sink's
//! offset, which advances past each processed batch.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use arcstr::ArcStr;
use parking_lot::Mutex;
use tokio::sync;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use super::error::RoutingError;
use super::message_channel::MessageChannel;
use super::subscription::Subscription;
use crate::broker::Broker;
use crate::message::Message;
use crate::topic::TopicMatcher;

/// Delivery class served by a sink, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeliveryClass {
	/// Pushed messages, no offset, no replay
	Immediate,
	/// Offset-addressable stream, at-least-once with replay
	Durable,
}

impl fmt::Display for DeliveryClass {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			| DeliveryClass::Immediate => write!(f, "immediate"),
			| DeliveryClass::Durable => write!(f, "durable"),
		}
	}
}

/// Lifecycle of a sink: `Created -> Running -> Stopping -> Stopped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkState {
	/// Constructed, task not launched
	Created,
	/// Routing task launched
	Running,
	/// Cancellation signalled, task may still be running
	Stopping,
	/// Task exited and joined, or never started
	Stopped,
}

/// Point-in-time view of a sink for status reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct SinkStatus {
	pub id: ArcStr,
	pub class: DeliveryClass,
	pub state: SinkState,
	/// Next durable sequence id to read; stays 0 for immediate sinks
	pub offset: u64,
	pub immediate_subscriptions: usize,
	pub durable_subscriptions: usize,
}

type TaskHandle = JoinHandle<Result<(), RoutingError>>;

/// Join side of the routing task, shared by every waiter. The handle stays
/// in place until it has been joined, then the outcome is cached.
#[derive(Default)]
struct Completion {
	task: Option<TaskHandle>,
	outcome: Option<Result<(), RoutingError>>,
}

/// Routing actor for one delivery class.
///
/// Holds two matcher instances: the immediate one is shared with whoever
/// created the sink, the durable one is private. [`register`](Self::register)
/// and [`remove`](Self::remove) update both, while
/// [`remove_all`](Self::remove_all) and [`stop`](Self::stop) only clear the
/// immediate matcher.
pub struct Sink<B> {
	id: ArcStr,
	class: DeliveryClass,
	offset: Arc<AtomicU64>,
	broker: Arc<B>,
	channel: MessageChannel,
	immediate_matcher: Arc<TopicMatcher>,
	durable_matcher: Arc<TopicMatcher>,
	shutdown_token: CancellationToken,
	state: Mutex<SinkState>,
	completion: sync::Mutex<Completion>,
}

impl<B> Sink<B>
where B: Broker
{
	/// Creates a sink in the `Created` state. The durable matcher starts
	/// empty.
	pub fn new(
		id: impl Into<ArcStr>,
		class: DeliveryClass,
		broker: Arc<B>,
		immediate_matcher: Arc<TopicMatcher>,
		channel: MessageChannel,
	) -> Self {
		Self {
			id: id.into(),
			class,
			offset: Arc::new(AtomicU64::new(0)),
			broker,
			channel,
			immediate_matcher,
			durable_matcher: Arc::new(TopicMatcher::new()),
			shutdown_token: CancellationToken::new(),
			state: Mutex::new(SinkState::Created),
			completion: sync::Mutex::new(Completion::default()),
		}
	}

	/// Sink id, also used as the subscriber id `stop()` clears.
	pub fn id(&self) -> &ArcStr {
		&self.id
	}

	/// Delivery class fixed at construction.
	pub fn class(&self) -> DeliveryClass {
		self.class
	}

	/// Next durable sequence id this sink will read.
	pub fn offset(&self) -> u64 {
		self.offset.load(Ordering::Acquire)
	}

	/// Current lifecycle state.
	pub fn state(&self) -> SinkState {
		*self.state.lock()
	}

	/// Snapshot of state, offset and subscription counts.
	pub fn status(&self) -> SinkStatus {
		SinkStatus {
			id: self.id.clone(),
			class: self.class,
			state: self.state(),
			offset: self.offset(),
			immediate_subscriptions: self.immediate_matcher.len(),
			durable_subscriptions: self.durable_matcher.len(),
		}
	}

	/// Matcher shared with the sink's creator, routed by the immediate class.
	pub fn immediate_matcher(&self) -> &Arc<TopicMatcher> {
		&self.immediate_matcher
	}

	/// Private matcher routed by the durable class.
	pub fn durable_matcher(&self) -> &Arc<TopicMatcher> {
		&self.durable_matcher
	}

	/// Adds `subscription` to both matchers.
	pub fn register(&self, subscription: Subscription) {
		self.immediate_matcher.add(subscription.clone());
		self.durable_matcher.add(subscription);
	}

	/// Removes one subscription from both matchers.
	pub fn remove(&self, subscriber_id: &str, pattern: &str) {
		self.immediate_matcher.remove(subscriber_id, pattern);
		self.durable_matcher.remove(subscriber_id, pattern);
	}

	/// Removes every subscription of `subscriber_id` from the immediate
	/// matcher only. The durable matcher keeps them.
	pub fn remove_all(&self, subscriber_id: &str) {
		self.immediate_matcher.remove_all(subscriber_id);
	}

	/// Launches the routing task for this sink's class.
	///
	/// A durable sink first asks the broker for its starting offset. If
	/// `stop()` lands meanwhile, no task is launched and the sink ends up
	/// `Stopped`.
	pub async fn start(&self) -> Result<(), RoutingError> {
		self.broker.settings().validate()?;
		// Held until the task is in place so `wait()` cannot slip in between.
		let mut completion = self.completion.lock().await;
		{
			let mut state = self.state.lock();
			if *state != SinkState::Created {
				return Err(RoutingError::already_started(self.id.as_str()));
			}
			*state = SinkState::Running;
		}

		if self.class == DeliveryClass::Durable {
			let persistent = self.channel.is_persistent();
			match self.broker.init_offset(&self.id, persistent).await {
				| Ok(offset) => self.offset.store(offset, Ordering::Release),
				| Err(err) => {
					let mut state = self.state.lock();
					*state = match *state {
						| SinkState::Running => SinkState::Created,
						| _ => SinkState::Stopped,
					};
					return Err(RoutingError::InitOffset(err));
				}
			}
		}

		{
			let mut state = self.state.lock();
			if *state != SinkState::Running || self.shutdown_token.is_cancelled()
			{
				*state = SinkState::Stopped;
				debug!(sink_id = %self.id, "Sink stopped before task launch");
				return Err(RoutingError::stopped_during_start(self.id.as_str()));
			}
		}

		let task = self.routing_task();
		completion.task = Some(match self.class {
			| DeliveryClass::Immediate => tokio::spawn(task.route_immediate()),
			| DeliveryClass::Durable => tokio::spawn(task.route_durable()),
		});
		Ok(())
	}

	/// Clears this sink's own subscriptions from the immediate matcher and
	/// signals the routing task to exit. Does not wait.
	pub fn stop(&self) {
		debug!(sink_id = %self.id, "Sink stopping");
		self.immediate_matcher.remove_all(&self.id);
		{
			let mut state = self.state.lock();
			*state = match *state {
				| SinkState::Created | SinkState::Stopped => SinkState::Stopped,
				| SinkState::Running | SinkState::Stopping => {
					SinkState::Stopping
				}
			};
		}
		self.shutdown_token.cancel();
	}

	/// Blocks until the routing task has exited and returns its outcome.
	///
	/// Any number of callers may wait; all of them see the same outcome.
	/// `Ok` on cancellation or if no task was ever launched.
	pub async fn wait(&self) -> Result<(), RoutingError> {
		let mut completion = self.completion.lock().await;
		if let Some(outcome) = &completion.outcome {
			return outcome.clone();
		}
		let Some(handle) = completion.task.as_mut() else {
			return Ok(());
		};
		let outcome = handle.await.unwrap_or_else(|err| Err(err.into()));
		completion.task = None;
		completion.outcome = Some(outcome.clone());
		*self.state.lock() = SinkState::Stopped;
		match &outcome {
			| Ok(()) => debug!(sink_id = %self.id, "Sink stopped"),
			| Err(err) => warn!(sink_id = %self.id, error = %err, "Sink stopped"),
		}
		outcome
	}

	fn routing_task(&self) -> RoutingTask<B> {
		RoutingTask {
			sink_id: self.id.clone(),
			broker: Arc::clone(&self.broker),
			matcher: match self.class {
				| DeliveryClass::Immediate => Arc::clone(&self.immediate_matcher),
				| DeliveryClass::Durable => Arc::clone(&self.durable_matcher),
			},
			channel: self.channel.clone(),
			offset: Arc::clone(&self.offset),
			shutdown_token: self.shutdown_token.clone(),
		}
	}
}

impl<B> fmt::Debug for Sink<B> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Sink")
			.field("id", &self.id)
			.field("class", &self.class)
			.field("offset", &self.offset.load(Ordering::Relaxed))
			.finish_non_exhaustive()
	}
}

/// State moved into the spawned routing task.
struct RoutingTask<B> {
	sink_id: ArcStr,
	broker: Arc<B>,
	matcher: Arc<TopicMatcher>,
	channel: MessageChannel,
	offset: Arc<AtomicU64>,
	shutdown_token: CancellationToken,
}

impl<B> RoutingTask<B>
where B: Broker
{
	/// Delivers `message` to every matching subscriber once. Returns the
	/// number of subscribers reached.
	fn dispatch(&self, message: &Message) -> usize {
		let matches = self.matcher.match_unique(&message.topic);
		for subscription in &matches {
			subscription.deliver(message.clone());
		}
		matches.len()
	}

	async fn route_immediate(self) -> Result<(), RoutingError> {
		debug!(sink_id = %self.sink_id, "Task to route immediate messages begins");
		let result = loop {
			tokio::select! {
				biased;
				() = self.shutdown_token.cancelled() => break Ok(()),
				message = self.broker.recv_immediate() => match message {
					| Some(message) => {
						self.dispatch(&message);
					}
					| None => {
						warn!(sink_id = %self.sink_id, "Immediate message source closed");
						break Err(RoutingError::source_closed(self.sink_id.as_str()));
					}
				}
			}
		};
		debug!(sink_id = %self.sink_id, "Task to route immediate messages stopped");
		result
	}

	async fn route_durable(self) -> Result<(), RoutingError> {
		let settings = self.broker.settings().clone();
		debug!(
			sink_id = %self.sink_id,
			offset = self.offset.load(Ordering::Acquire),
			"Task to route durable messages begins"
		);
		loop {
			if self.shutdown_token.is_cancelled() {
				break;
			}
			let offset = self.offset.load(Ordering::Acquire);
			let fetched = tokio::select! {
				biased;
				() = self.shutdown_token.cancelled() => break,
				fetched = self.broker.fetch_durable(offset, settings.max_batch_size) => fetched,
			};
			let messages = match fetched {
				| Ok(messages) => messages,
				| Err(err) => {
					error!(
						sink_id = %self.sink_id,
						offset,
						error = %err,
						"Fetch message failed"
					);
					// same offset on retry
					if self.pause(settings.fetch_retry_interval).await {
						continue;
					}
					break;
				}
			};
			let Some((last, rest)) = messages.split_last() else {
				if self.pause(settings.idle_poll_interval).await {
					continue;
				}
				break;
			};
			debug!(
				sink_id = %self.sink_id,
				offset,
				count = messages.len(),
				"Fetched durable messages"
			);

			for message in rest {
				self.dispatch(message);
			}
			if self.dispatch(last) == 0 {
				// Nothing delivered: a barrier still carries the offset commit
				// through the immediate pipeline.
				tokio::select! {
					biased;
					() = self.shutdown_token.cancelled() => break,
					res = self.channel.put_immediate(last.to_barrier()) => {
						if let Err(err) = res {
							warn!(sink_id = %self.sink_id, error = %err, "Barrier dropped");
						}
					}
				}
			}
			let Some(next) = last.sequence_id.checked_add(1) else {
				self.offset.fetch_max(u64::MAX, Ordering::AcqRel);
				error!(
					sink_id = %self.sink_id,
					sequence_id = last.sequence_id,
					"Durable sequence space exhausted, no further reads"
				);
				break;
			};
			self.offset.fetch_max(next, Ordering::AcqRel);
		}
		debug!(sink_id = %self.sink_id, "Task to route durable messages stopped");
		Ok(())
	}

	/// Sleeps for `delay` unless cancelled first. False on cancellation.
	async fn pause(&self, delay: Duration) -> bool {
		tokio::select! {
			biased;
			() = self.shutdown_token.cancelled() => false,
			() = tokio::time::sleep(delay) => true,
		}
	}
}
