//! Messages flowing through the routing sinks

use arcstr::ArcStr;
use bytes::Bytes;

/// A message routed by topic.
///
/// Cloning is cheap: topic and payload are reference counted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
	/// Concrete topic the message was published to
	pub topic: ArcStr,
	/// Opaque payload
	pub payload: Bytes,
	/// Position in the durable log. Only meaningful for durable messages.
	pub sequence_id: u64,
	/// Synthetic record with no payload, used only to advance offset
	/// bookkeeping downstream
	pub barrier: bool,
}

impl Message {
	/// Creates an immediate-class message.
	pub fn new(topic: impl Into<ArcStr>, payload: impl Into<Bytes>) -> Self {
		Self {
			topic: topic.into(),
			payload: payload.into(),
			sequence_id: 0,
			barrier: false,
		}
	}

	/// Creates a message stored at `sequence_id` in the durable log.
	pub fn durable(
		topic: impl Into<ArcStr>,
		payload: impl Into<Bytes>,
		sequence_id: u64,
	) -> Self {
		Self {
			sequence_id,
			..Self::new(topic, payload)
		}
	}

	/// Barrier standing in for `self`: same topic and sequence id, no
	/// payload.
	pub fn to_barrier(&self) -> Self {
		Self {
			topic: self.topic.clone(),
			payload: Bytes::new(),
			sequence_id: self.sequence_id,
			barrier: true,
		}
	}

	/// True for barrier records.
	pub fn is_barrier(&self) -> bool {
		self.barrier
	}
}
