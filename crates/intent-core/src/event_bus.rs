//! Broadcast event bus for pipeline progress.
//!
//! Every subscriber receives every event published after it subscribed.
//! Publishing never blocks; slow subscribers lose the oldest events.

use intent_types::IntentEvent;
use tokio::sync::broadcast;

/// Fan-out of [`IntentEvent`]s to any number of subscribers.
#[derive(Clone)]
pub struct EventBus {
	sender: broadcast::Sender<IntentEvent>,
}

impl EventBus {
	/// Creates a bus buffering up to `capacity` events per subscriber.
	pub fn new(capacity: usize) -> Self {
		let (sender, _) = broadcast::channel(capacity);
		Self { sender }
	}

	pub fn subscribe(&self) -> broadcast::Receiver<IntentEvent> {
		self.sender.subscribe()
	}

	/// Publishes an event. Fails only when nobody is subscribed.
	pub fn publish(
		&self,
		event: IntentEvent,
	) -> Result<usize, broadcast::error::SendError<IntentEvent>> {
		self.sender.send(event)
	}
}

impl Default for EventBus {
	fn default() -> Self {
		Self::new(1000)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn test_subscribers_receive_events() {
		let bus = EventBus::new(16);
		let mut first = bus.subscribe();
		let mut second = bus.subscribe();

		let delivered = bus
			.publish(IntentEvent::DetachedTaskFailed {
				task: "notify".into(),
				error: "boom".into(),
			})
			.unwrap();
		assert_eq!(delivered, 2);

		for receiver in [&mut first, &mut second] {
			match receiver.recv().await.unwrap() {
				IntentEvent::DetachedTaskFailed { task, .. } => assert_eq!(task, "notify"),
				other => panic!("unexpected event {:?}", other),
			}
		}
	}

	#[test]
	fn test_publish_without_subscribers_is_an_error() {
		let bus = EventBus::default();
		let result = bus.publish(IntentEvent::DetachedTaskFailed {
			task: "notify".into(),
			error: "boom".into(),
		});
		assert!(result.is_err());
	}
}
