//! Routing error types

use std::sync::Arc;

use thiserror::Error;
use tokio::task::JoinError;

use crate::broker::BrokerError;

/// Errors from routing sink lifecycle and task execution
///
/// Cloneable so every waiter of a sink observes the same outcome.
#[derive(Debug, Error, Clone)]
pub enum RoutingError {
	/// `start()` called on a sink that is not in the Created state
	#[error("Sink '{sink_id}' already started")]
	AlreadyStarted {
		/// Sink id
		sink_id: String,
	},

	/// Routing settings rejected
	#[error("Invalid routing settings: {0}")]
	InvalidSettings(String),

	/// `stop()` arrived while `start()` was resolving the initial offset;
	/// no task was launched
	#[error("Sink '{sink_id}' stopped before its task was launched")]
	StoppedDuringStart {
		/// Sink id
		sink_id: String,
	},

	/// Initial durable offset could not be resolved
	#[error("Failed to initialize offset: {0}")]
	InitOffset(#[source] BrokerError),

	/// Immediate message source closed underneath a running sink
	#[error("Immediate message source closed for sink '{sink_id}'")]
	SourceClosed {
		/// Sink id
		sink_id: String,
	},

	/// Barrier could not be injected into the immediate pipeline
	#[error("Immediate pipeline closed, barrier for '{topic}' not injected")]
	PipelineClosed {
		/// Topic of the barrier
		topic: String,
	},

	/// Routing task panicked or was aborted
	#[error("Routing task failed: {0}")]
	TaskFailed(#[source] Arc<JoinError>),
}

impl From<JoinError> for RoutingError {
	fn from(err: JoinError) -> Self {
		Self::TaskFailed(Arc::new(err))
	}
}

impl RoutingError {
	/// Creates a new AlreadyStarted error
	pub fn already_started(sink_id: impl Into<String>) -> Self {
		Self::AlreadyStarted {
			sink_id: sink_id.into(),
		}
	}

	/// Creates a new StoppedDuringStart error
	pub fn stopped_during_start(sink_id: impl Into<String>) -> Self {
		Self::StoppedDuringStart {
			sink_id: sink_id.into(),
		}
	}

	/// Creates a new SourceClosed error
	pub fn source_closed(sink_id: impl Into<String>) -> Self {
		Self::SourceClosed {
			sink_id: sink_id.into(),
		}
	}
}
