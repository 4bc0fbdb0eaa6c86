//! Message routing and subscription management module
//!
//! This module provides the per-class routing sinks, the subscriptions they
//! deliver to and the immediate pipeline used for barrier records.

/// Routing error types
pub mod error;
/// Immediate-class outbound pipeline
pub mod message_channel;
pub mod sink;
/// Subscriptions and delivery targets
pub mod subscription;


// Re-export commonly used types for convenience
pub use error::RoutingError;
pub use message_channel::MessageChannel;
pub use sink::{DeliveryClass, Sink, SinkState, SinkStatus};
pub use subscription::{DeliveryTarget, Subscription};
