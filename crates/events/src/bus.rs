//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the publish/subscribe hub for [`TicketEvent`]s. It is
//! designed to be shared via `Arc<EventBus>` between the intake actions
//! (publishers) and the pipeline orchestrator (subscriber).

use tokio::sync::broadcast;

use crate::event::TicketEvent;

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// Wraps a [`broadcast::Sender`] so that any number of subscribers can
/// independently receive every published [`TicketEvent`].
pub struct EventBus {
    sender: broadcast::Sender<TicketEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are dropped
    /// and slow receivers will observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// If there are no active subscribers the event is dropped; delivery is
    /// at-least-once only while a subscriber is attached.
    pub fn publish(&self, event: TicketEvent) {
        tracing::debug!(event = event.name(), ticket_id = event.ticket_id(), "Event published");
        // Ignore the SendError; it only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    /// Subscribe to all events published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<TicketEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_and_receive_single_subscriber() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        bus.publish(TicketEvent::TicketCreated { ticket_id: 42 });

        let received = rx.recv().await.expect("should receive the event");
        assert_eq!(received, TicketEvent::TicketCreated { ticket_id: 42 });
    }

    #[tokio::test]
    async fn multiple_subscribers_receive_same_event() {
        let bus = EventBus::default();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(TicketEvent::TicketCreated { ticket_id: 7 });

        assert_eq!(rx1.recv().await.unwrap().ticket_id(), 7);
        assert_eq!(rx2.recv().await.unwrap().ticket_id(), 7);
    }

    #[test]
    fn publish_with_no_subscribers_does_not_panic() {
        let bus = EventBus::default();
        // No subscribers; this must not panic.
        bus.publish(TicketEvent::TicketCreated { ticket_id: 1 });
    }
}
