//! Configuration for routing sinks

use std::time::Duration;

use crate::routing::RoutingError;

/// Routing behavior settings, read by sinks through their broker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingSettings {
	/// Upper bound on messages fetched per durable poll (must be > 0)
	pub max_batch_size: usize,
	/// Delay before retrying a failed durable fetch at the same offset
	pub fetch_retry_interval: Duration,
	/// Delay before polling again after an empty durable batch
	pub idle_poll_interval: Duration,
	/// Capacity of the immediate-class channels created by the in-memory
	/// broker and by [`MessageChannel::new`](crate::routing::MessageChannel::new)
	pub immediate_channel_capacity: usize,
}

impl Default for RoutingSettings {
	fn default() -> Self {
		Self {
			max_batch_size: 100,
			fetch_retry_interval: Duration::from_secs(1),
			idle_poll_interval: Duration::from_millis(10),
			immediate_channel_capacity: 1024,
		}
	}
}

impl RoutingSettings {
	/// Sets the durable batch bound.
	pub fn with_max_batch_size(mut self, max_batch_size: usize) -> Self {
		self.max_batch_size = max_batch_size;
		self
	}

	/// Checks values that would stall or break a sink.
	pub fn validate(&self) -> Result<(), RoutingError> {
		if self.max_batch_size == 0 {
			return Err(RoutingError::InvalidSettings(
				"max_batch_size must be greater than 0".to_string(),
			));
		}
		if self.immediate_channel_capacity == 0 {
			return Err(RoutingError::InvalidSettings(
				"immediate_channel_capacity must be greater than 0".to_string(),
			));
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_defaults_are_valid() {
		let settings = RoutingSettings::default();
		assert!(settings.validate().is_ok());
		assert_eq!(settings.max_batch_size, 100);
		assert_eq!(settings.fetch_retry_interval, Duration::from_secs(1));
		assert_eq!(settings.idle_poll_interval, Duration::from_millis(10));
	}

	#[test]
	fn test_zero_batch_rejected() {
		let settings = RoutingSettings::default().with_max_batch_size(0);
		assert!(matches!(
			settings.validate(),
			Err(RoutingError::InvalidSettings(_))
		));
	}
}
