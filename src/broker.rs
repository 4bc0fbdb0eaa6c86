//! Broker-side collaborators of the routing sinks
//!
//! The durable message store, its offset bookkeeping and the immediate
//! publish channel live outside this crate's routing core. Sinks reach them
//! through the [`Broker`] trait.

use async_trait::async_trait;
use thiserror::Error;

use crate::config::RoutingSettings;
use crate::message::Message;
use crate::topic::TopicError;

/// Errors reported by a broker implementation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BrokerError {
	/// Durable store temporarily unavailable
	#[error("Durable store unavailable: {0}")]
	Unavailable(String),

	/// Offset could not be resolved for a sink
	#[error("Failed to resolve offset for sink '{sink_id}': {reason}")]
	Offset {
		/// Sink whose offset was requested
		sink_id: String,
		/// Underlying reason
		reason: String,
	},

	/// Published topic rejected
	#[error("Rejected topic: {0}")]
	InvalidTopic(#[from] TopicError),

	/// Broker has been shut down
	#[error("Broker closed")]
	Closed,
}

impl BrokerError {
	/// Creates a new Offset error
	pub fn offset(
		sink_id: impl Into<String>,
		reason: impl Into<String>,
	) -> Self {
		Self::Offset {
			sink_id: sink_id.into(),
			reason: reason.into(),
		}
	}
}

/// Message source feeding the routing sinks.
#[async_trait]
pub trait Broker: Send + Sync + 'static {
	/// Routing settings, `max_batch_size` in particular.
	fn settings(&self) -> &RoutingSettings;

	/// Resolves the starting read position of a durable sink. `persistent`
	/// tells whether the sink's delivery pipeline is backed by storage.
	async fn init_offset(
		&self,
		sink_id: &str,
		persistent: bool,
	) -> Result<u64, BrokerError>;

	/// Reads at most `max` durable messages starting at `offset`, ordered by
	/// increasing sequence id. An empty result means nothing new yet.
	async fn fetch_durable(
		&self,
		offset: u64,
		max: usize,
	) -> Result<Vec<Message>, BrokerError>;

	/// Next immediate-class message. `None` once the source is closed.
	///
	/// Must be cancel safe: a sink drops this future when it stops.
	async fn recv_immediate(&self) -> Option<Message>;
}
