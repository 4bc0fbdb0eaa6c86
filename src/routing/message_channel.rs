//! Outbound immediate pipeline of a delivery session

use tokio::sync::mpsc::{self, Receiver, Sender};

use super::error::RoutingError;
use crate::message::Message;

/// Outbound immediate-class pipeline of one delivery session.
///
/// Durable sinks push barrier records here so the downstream consumer can
/// commit offsets even when nothing was delivered.
#[derive(Debug, Clone)]
pub struct MessageChannel {
	immediate_tx: Sender<Message>,
	persistent: bool,
}

impl MessageChannel {
	/// Creates the channel and returns the receiving end of its immediate
	/// pipeline. `persistent` marks a session backed by durable storage.
	pub fn new(capacity: usize, persistent: bool) -> (Self, Receiver<Message>) {
		let (immediate_tx, immediate_rx) = mpsc::channel(capacity);
		(
			Self {
				immediate_tx,
				persistent,
			},
			immediate_rx,
		)
	}

	/// Whether the session behind this channel persists its state.
	pub fn is_persistent(&self) -> bool {
		self.persistent
	}

	/// Injects `message` into the immediate pipeline, waiting for capacity.
	pub async fn put_immediate(
		&self,
		message: Message,
	) -> Result<(), RoutingError> {
		self.immediate_tx.send(message).await.map_err(|err| {
			RoutingError::PipelineClosed {
				topic: err.0.topic.to_string(),
			}
		})
	}
}
