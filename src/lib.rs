//! # Hub Router
//!
//! Topic-based message routing for a publish/subscribe hub: a wildcard
//! subscription matcher and per-class routing sinks that fan messages out
//! to matching subscribers.
//!
//! ## Features
//!
//! - **Wildcard Matching**: MQTT-style patterns with `+` and `#`
//! - **Deduplicated Delivery**: one copy per subscriber even when several of
//!   its patterns match
//! - **Two Delivery Classes**: immediate push and durable, offset-tracked
//!   polling with at-least-once replay
//! - **Barrier Records**: offset bookkeeping advances even when a durable
//!   batch reaches nobody
//! - **Graceful Shutdown**: cancellation reaches every blocking point of a
//!   sink
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use hub_router::prelude::*;
//! use tokio::sync::mpsc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let broker = Arc::new(MemoryBroker::new(RoutingSettings::default()));
//!     let (channel, _barriers) = MessageChannel::new(64, false);
//!
//!     let sink = Sink::new(
//!         "rule-1",
//!         DeliveryClass::Immediate,
//!         Arc::clone(&broker),
//!         Arc::new(TopicMatcher::new()),
//!         channel,
//!     );
//!
//!     let (tx, mut rx) = mpsc::channel::<Message>(16);
//!     sink.register(Subscription::new("client-1", "sensors/+/temp", tx)?);
//!     sink.start().await?;
//!
//!     broker.publish_immediate("sensors/kitchen/temp", "21.5").await?;
//!     if let Some(message) = rx.recv().await {
//!         println!("{}: {:?}", message.topic, message.payload);
//!     }
//!
//!     sink.stop();
//!     sink.wait().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Pattern Matching
//!
//! - `+` matches exactly one topic level (e.g., `sensors/+/temp`)
//! - `#` matches zero or more trailing levels and must come last
//!   (e.g., `sensors/#` also matches `sensors`)
//! - Empty levels are ordinary literals: `a//b` has three levels

#![warn(missing_docs)]

/// Broker collaborator trait and its errors
pub mod broker;
/// Routing settings
pub mod config;
/// In-memory broker implementation
pub mod memory;
pub mod message;
pub mod routing;
pub mod topic;

// === Core Public API ===
pub use broker::{Broker, BrokerError};
pub use config::RoutingSettings;
pub use memory::MemoryBroker;
pub use message::Message;
pub use routing::{
	DeliveryClass, DeliveryTarget, MessageChannel, RoutingError, Sink,
	SinkState, SinkStatus, Subscription,
};
pub use topic::{TopicMatcher, TopicPatternError, TopicPatternPath};

/// Result type alias for sink operations
pub type Result<T> = std::result::Result<T, RoutingError>;

/// Prelude module for convenient imports
///
/// ```rust
/// use hub_router::prelude::*;
/// ```
pub mod prelude {
	//! Essential types for most routing setups

	pub use crate::{
		Broker, DeliveryClass, MemoryBroker, Message, MessageChannel,
		RoutingSettings, Sink, Subscription, TopicMatcher,
	};
}

/// Error types used throughout the library
///
/// ```rust
/// use hub_router::errors::*;
/// ```
pub mod errors {
	//! All error types used in the library

	pub use crate::{BrokerError, RoutingError, TopicPatternError};

	// Topic-related errors
	pub use crate::topic::{TopicError, TopicMatcherError};
}
