//! # Event bus for broadcasting tray runtime events.
//!
//! [`Bus`] is a thin wrapper around [`tokio::sync::broadcast`] that provides
//! non-blocking event publishing from multiple sources (registry, watcher,
//! balloon queue, pager).
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never blocks or awaits.
//! - **Bounded capacity**: a single ring buffer stores recent events for all
//!   receivers.
//! - **Lag handling**: slow receivers get `RecvError::Lagged(n)` and skip
//!   the `n` oldest items.
//! - **No persistence**: events are lost if there are no active subscribers
//!   at send time. The bus is observability plumbing, not a control path —
//!   every behavior in this crate is correct with zero subscribers.

use tokio::sync::broadcast;

use super::event::Event;

/// Broadcast channel for tray runtime events.
///
/// Cheap to clone (internally holds an `Arc`-backed sender); every
/// component gets its own clone at construction.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a new bus with the given channel capacity (clamped to 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, _rx) = broadcast::channel::<Event>(capacity);
        Self { tx }
    }

    /// Publishes an event to all active subscribers.
    ///
    /// If there are no receivers, the event is dropped silently.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Creates a new receiver that observes subsequent events.
    ///
    /// A receiver only gets events sent **after** it subscribes.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;
    use crate::registry::IconKey;

    #[tokio::test]
    async fn test_publish_reaches_subscriber() {
        let bus = Bus::new(8);
        let mut rx = bus.subscribe();

        bus.publish(Event::new(EventKind::IconAdded).with_key(IconKey::new(1, 1)));

        let ev = rx.recv().await.expect("event");
        assert_eq!(ev.kind, EventKind::IconAdded);
        assert_eq!(ev.key, Some(IconKey::new(1, 1)));
    }

    #[test]
    fn test_publish_without_subscribers_is_silent() {
        let bus = Bus::new(1);
        bus.publish(Event::new(EventKind::WatcherStopped));
    }
}
