use std::sync::Arc;
use std::time::Duration;

use hub_router::prelude::*;
use tokio::sync::mpsc;
use tokio::time;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	tracing_subscriber::fmt()
		.with_env_filter(
			EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| EnvFilter::new("info")),
		)
		.compact()
		.init();

	let broker = Arc::new(MemoryBroker::new(RoutingSettings::default()));
	let immediate_matcher = Arc::new(TopicMatcher::new());
	let (channel, mut pipeline_rx) = MessageChannel::new(64, true);

	let immediate = Sink::new(
		"rule-immediate",
		DeliveryClass::Immediate,
		Arc::clone(&broker),
		Arc::clone(&immediate_matcher),
		channel.clone(),
	);
	let durable = Sink::new(
		"rule-durable",
		DeliveryClass::Durable,
		Arc::clone(&broker),
		Arc::new(TopicMatcher::new()),
		channel,
	);

	let (tx, mut rx) = mpsc::channel::<Message>(64);
	for sink in [&immediate, &durable] {
		sink.register(Subscription::new("client-1", "sensors/+/temp", tx.clone())?);
		sink.register(Subscription::new("client-1", "sensors/#", tx.clone())?);
	}
	drop(tx);

	immediate.start().await?;
	durable.start().await?;

	broker.publish_immediate("sensors/kitchen/temp", "21.5").await?;
	broker.publish_durable("sensors/hall/temp", "19.0")?;
	broker.publish_durable("alerts/door", "open")?;

	time::sleep(Duration::from_millis(100)).await;

	while let Ok(message) = rx.try_recv() {
		info!(
			topic = %message.topic,
			sequence_id = message.sequence_id,
			payload = ?message.payload,
			"Delivered"
		);
		if message.topic.as_str() == "sensors/hall/temp" {
			broker.commit_offset(durable.id(), message.sequence_id + 1);
		}
	}
	while let Ok(barrier) = pipeline_rx.try_recv() {
		info!(topic = %barrier.topic, sequence_id = barrier.sequence_id, "Barrier");
		broker.commit_offset(durable.id(), barrier.sequence_id + 1);
	}

	for sink in [&immediate, &durable] {
		info!(status = ?sink.status(), "Sink status");
		sink.stop();
	}
	immediate.wait().await?;
	durable.wait().await?;
	info!(
		committed = ?broker.committed_offset(durable.id()),
		"Shutdown complete"
	);
	Ok(())
}
