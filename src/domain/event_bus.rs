//! Broadcast channel for cleaned events.
//!
//! [`EventBus`] wraps a [`tokio::sync::broadcast`] channel. The pipeline
//! publishes every cleaned station, price and combined record through it;
//! WebSocket connections and any in-process consumer subscribe.

use tokio::sync::broadcast;

use super::{CleanEvent, Topic};

/// Broadcast bus for [`CleanEvent`]s.
///
/// Backed by a `tokio::broadcast` channel with a configurable capacity
/// (default 10 000). When the ring buffer is full, the oldest events are
/// dropped for lagging receivers.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CleanEvent>,
}

impl EventBus {
    /// Creates a new `EventBus` with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of receivers that received the event.
    /// If there are no active receivers, the event is silently dropped.
    pub fn publish(&self, event: CleanEvent) -> usize {
        let topic = event.topic();
        let delivered = self.sender.send(event).unwrap_or(0);
        tracing::trace!(%topic, delivered, "published clean event");
        delivered
    }

    /// Creates a new receiver that will receive all future events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CleanEvent> {
        self.sender.subscribe()
    }

    /// Returns the current number of active receivers.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// Drains a receiver until an event on `topic` arrives.
///
/// Returns `None` once the bus is closed. Lag is skipped over.
pub async fn next_on_topic(
    rx: &mut broadcast::Receiver<CleanEvent>,
    topic: Topic,
) -> Option<CleanEvent> {
    loop {
        match rx.recv().await {
            Ok(event) if event.topic() == topic => return Some(event),
            Ok(_) => {}
            Err(broadcast::error::RecvError::Lagged(n)) => {
                tracing::warn!(lagged = n, %topic, "receiver lagged behind event bus");
            }
            Err(broadcast::error::RecvError::Closed) => return None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::station::{Location, StationRecord};

    fn make_event(code: &str) -> CleanEvent {
        CleanEvent::Station(StationRecord {
            station_id: None,
            brand_id: None,
            brand: "Metro".to_string(),
            code: code.to_string(),
            name: "Metro Petroleum".to_string(),
            address: "4 Pitt St".to_string(),
            location: Location {
                latitude: -33.87,
                longitude: 151.2,
            },
            extra: Default::default(),
        })
    }

    #[test]
    fn publish_without_receivers_returns_zero() {
        let bus = EventBus::new(100);
        let count = bus.publish(make_event("A"));
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn subscriber_receives_event() {
        let bus = EventBus::new(100);
        let mut rx = bus.subscribe();

        bus.publish(make_event("A"));

        let event = rx.recv().await;
        let Ok(CleanEvent::Station(station)) = event else {
            panic!("expected a station event");
        };
        assert_eq!(station.code, "A");
    }

    #[tokio::test]
    async fn multiple_subscribers_receive_same_event() {
        let bus = EventBus::new(100);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        let count = bus.publish(make_event("A"));
        assert_eq!(count, 2);

        let Ok(e1) = rx1.recv().await else {
            panic!("rx1 failed");
        };
        let Ok(e2) = rx2.recv().await else {
            panic!("rx2 failed");
        };
        assert_eq!(e1.topic(), e2.topic());
    }

    #[test]
    fn receiver_count_tracks_subscribers() {
        let bus = EventBus::new(100);
        assert_eq!(bus.receiver_count(), 0);

        let rx1 = bus.subscribe();
        assert_eq!(bus.receiver_count(), 1);

        let _rx2 = bus.subscribe();
        assert_eq!(bus.receiver_count(), 2);

        drop(rx1);
        assert_eq!(bus.receiver_count(), 1);
    }

    #[tokio::test]
    async fn next_on_topic_skips_other_topics() {
        let bus = EventBus::new(100);
        let mut rx = bus.subscribe();
        bus.publish(make_event("A"));
        drop(bus);

        assert!(next_on_topic(&mut rx, Topic::CleanPrice).await.is_none());
    }
}
