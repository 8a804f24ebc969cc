//! Process-wide publish/subscribe relay.
//!
//! Events published between ticks queue up on each subscriber's channel
//! and are drained by the subscriber's next tick, preserving per-publisher
//! order. Dropped subscribers are pruned on the next publish.

use crossbeam_channel::{Receiver, Sender, unbounded};

use crate::event::WorldEvent;

/// Fan-out relay for [`WorldEvent`]s. Every subscriber receives every
/// published event.
pub struct EventBus {
    subscribers: Vec<Sender<WorldEvent>>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    /// Creates a bus with no subscribers.
    pub fn new() -> Self {
        Self {
            subscribers: Vec::new(),
        }
    }

    /// Registers a new subscriber and returns its receiving end.
    pub fn subscribe(&mut self) -> Receiver<WorldEvent> {
        let (tx, rx) = unbounded();
        self.subscribers.push(tx);
        rx
    }

    /// Publishes one event to every live subscriber. Subscribers whose
    /// receiver was dropped are pruned.
    pub fn publish(&mut self, event: WorldEvent) {
        self.subscribers
            .retain(|tx| tx.send(event.clone()).is_ok());
    }

    /// Publishes a batch of events in order.
    pub fn publish_all(&mut self, events: impl IntoIterator<Item = WorldEvent>) {
        for event in events {
            self.publish(event);
        }
    }

    /// Number of live subscribers (stale entries counted until the next
    /// publish prunes them).
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::AddEntity;
    use orbis_entity::EntityId;

    fn add(id: u64) -> WorldEvent {
        WorldEvent::AddEntity(AddEntity {
            entity_id: EntityId(id),
        })
    }

    #[test]
    fn test_every_subscriber_sees_every_event() {
        let mut bus = EventBus::new();
        let a = bus.subscribe();
        let b = bus.subscribe();

        bus.publish(add(1));
        bus.publish(add(2));

        for rx in [&a, &b] {
            assert_eq!(rx.try_recv().unwrap(), add(1));
            assert_eq!(rx.try_recv().unwrap(), add(2));
            assert!(rx.try_recv().is_err());
        }
    }

    #[test]
    fn test_dropped_subscriber_is_pruned() {
        let mut bus = EventBus::new();
        let a = bus.subscribe();
        let b = bus.subscribe();
        drop(b);

        bus.publish(add(1));
        assert_eq!(bus.subscriber_count(), 1);
        assert_eq!(a.try_recv().unwrap(), add(1));
    }

    #[test]
    fn test_publish_all_preserves_order() {
        let mut bus = EventBus::new();
        let rx = bus.subscribe();
        bus.publish_all([add(1), add(2), add(3)]);
        let got: Vec<WorldEvent> = rx.try_iter().collect();
        assert_eq!(got, vec![add(1), add(2), add(3)]);
    }
}
