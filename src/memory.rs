//! In-memory broker
//!
//! Keeps the durable log, committed offsets and the immediate publish
//! channel in process memory. Nothing survives a restart.

use std::collections::HashMap;

use arcstr::ArcStr;
use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::{Mutex, RwLock};
use tokio::sync::{self, mpsc};
use tracing::trace;

use crate::broker::{Broker, BrokerError};
use crate::config::RoutingSettings;
use crate::message::Message;
use crate::topic::validation;

/// [`Broker`] backed by process memory.
///
/// Durable sequence ids start at 0 and equal the message's position in the
/// log.
pub struct MemoryBroker {
	settings: RoutingSettings,
	durable_log: RwLock<Vec<Message>>,
	committed_offsets: Mutex<HashMap<ArcStr, u64>>,
	immediate_tx: mpsc::Sender<Message>,
	immediate_rx: sync::Mutex<mpsc::Receiver<Message>>,
}

impl MemoryBroker {
	/// Creates an empty broker. The immediate channel is bounded by
	/// `settings.immediate_channel_capacity`.
	pub fn new(settings: RoutingSettings) -> Self {
		let (immediate_tx, immediate_rx) =
			mpsc::channel(settings.immediate_channel_capacity.max(1));
		Self {
			settings,
			durable_log: RwLock::new(Vec::new()),
			committed_offsets: Mutex::new(HashMap::new()),
			immediate_tx,
			immediate_rx: sync::Mutex::new(immediate_rx),
		}
	}

	/// Publishes on the immediate class. Waits for channel capacity.
	pub async fn publish_immediate(
		&self,
		topic: impl Into<ArcStr>,
		payload: impl Into<Bytes>,
	) -> Result<(), BrokerError> {
		let topic = topic.into();
		validation::validate_topic_path(&topic)?;
		self.immediate_tx
			.send(Message::new(topic, payload))
			.await
			.map_err(|_| BrokerError::Closed)
	}

	/// Appends to the durable log and returns the assigned sequence id.
	pub fn publish_durable(
		&self,
		topic: impl Into<ArcStr>,
		payload: impl Into<Bytes>,
	) -> Result<u64, BrokerError> {
		let topic = topic.into();
		validation::validate_topic_path(&topic)?;
		let mut log = self.durable_log.write();
		let sequence_id = log.len() as u64;
		trace!(topic = %topic, sequence_id, "Durable message stored");
		log.push(Message::durable(topic, payload, sequence_id));
		Ok(sequence_id)
	}

	/// Records that `sink_id` has consumed everything below `offset`.
	/// Offsets only move forward.
	pub fn commit_offset(&self, sink_id: &str, offset: u64) {
		let mut committed = self.committed_offsets.lock();
		let entry = committed.entry(ArcStr::from(sink_id)).or_insert(0);
		*entry = (*entry).max(offset);
	}

	/// Last committed offset of `sink_id`, if any.
	pub fn committed_offset(&self, sink_id: &str) -> Option<u64> {
		self.committed_offsets.lock().get(sink_id).copied()
	}

	/// Sequence id the next durable publish will get.
	pub fn durable_tail(&self) -> u64 {
		self.durable_log.read().len() as u64
	}
}

#[async_trait]
impl Broker for MemoryBroker {
	fn settings(&self) -> &RoutingSettings {
		&self.settings
	}

	async fn init_offset(
		&self,
		sink_id: &str,
		persistent: bool,
	) -> Result<u64, BrokerError> {
		// A non-persistent session only sees what is published from now on.
		if !persistent {
			return Ok(self.durable_tail());
		}
		Ok(self.committed_offset(sink_id).unwrap_or(0))
	}

	async fn fetch_durable(
		&self,
		offset: u64,
		max: usize,
	) -> Result<Vec<Message>, BrokerError> {
		let log = self.durable_log.read();
		let start = usize::try_from(offset).unwrap_or(usize::MAX).min(log.len());
		let end = start.saturating_add(max).min(log.len());
		Ok(log[start .. end].to_vec())
	}

	async fn recv_immediate(&self) -> Option<Message> {
		self.immediate_rx.lock().await.recv().await
	}
}

impl std::fmt::Debug for MemoryBroker {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("MemoryBroker")
			.field("settings", &self.settings)
			.field("durable_tail", &self.durable_tail())
			.finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn test_fetch_respects_offset_and_bound() {
		let broker = MemoryBroker::new(RoutingSettings::default());
		for i in 0 .. 5 {
			assert_eq!(broker.publish_durable("a/b", vec![i as u8]).unwrap(), i as u64);
		}

		let batch = broker.fetch_durable(1, 3).await.unwrap();
		let ids: Vec<u64> = batch.iter().map(|m| m.sequence_id).collect();
		assert_eq!(ids, vec![1, 2, 3]);

		assert!(broker.fetch_durable(5, 3).await.unwrap().is_empty());
		assert!(broker.fetch_durable(u64::MAX, 3).await.unwrap().is_empty());
	}

	#[tokio::test]
	async fn test_init_offset() {
		let broker = MemoryBroker::new(RoutingSettings::default());
		broker.publish_durable("a", "x").unwrap();
		broker.publish_durable("a", "y").unwrap();

		assert_eq!(broker.init_offset("s1", true).await.unwrap(), 0);
		assert_eq!(broker.init_offset("s1", false).await.unwrap(), 2);

		broker.commit_offset("s1", 1);
		broker.commit_offset("s1", 0); // never moves back
		assert_eq!(broker.init_offset("s1", true).await.unwrap(), 1);
	}

	#[tokio::test]
	async fn test_publish_rejects_wildcards() {
		let broker = MemoryBroker::new(RoutingSettings::default());
		assert!(matches!(
			broker.publish_durable("a/+", "x"),
			Err(BrokerError::InvalidTopic(_))
		));
		assert!(matches!(
			broker.publish_immediate("a/#", "x").await,
			Err(BrokerError::InvalidTopic(_))
		));
	}

	#[tokio::test]
	async fn test_immediate_round_trip() {
		let broker = MemoryBroker::new(RoutingSettings::default());
		broker.publish_immediate("a/b", "hello").await.unwrap();

		let message = broker.recv_immediate().await.unwrap();
		assert_eq!(message.topic.as_str(), "a/b");
		assert_eq!(message.payload, Bytes::from("hello"));
		assert!(!message.barrier);
	}
}
