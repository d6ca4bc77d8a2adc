//! # Event subscriber trait and listener task.
//!
//! [`Subscriber`] is the extension point for observing the tray runtime.
//! [`spawn_listener`] drives one subscriber from its own broadcast
//! receiver on a dedicated task.
//!
//! ## Rules
//! - A subscriber never blocks a publisher; it only ever lags its own
//!   receiver.
//! - A lagging receiver skips the oldest events and keeps going (the bus
//!   is observability plumbing, not a control path).
//! - The listener task ends when the bus is dropped.

use std::sync::Arc;

use async_trait::async_trait;
use log::warn;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use crate::events::{Bus, Event};

/// Contract for event subscribers.
///
/// Called from a subscriber-dedicated task. Implementations should avoid
/// blocking the async runtime (prefer async I/O and cooperative waits).
#[async_trait]
pub trait Subscriber: Send + Sync + 'static {
    /// Handles a single event.
    async fn handle(&self, event: &Event);

    /// Human-readable name (for logs).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Spawns a task that feeds `subscriber` every event published after
/// this call.
///
/// The task exits when the bus is dropped. Lag is logged and skipped.
pub fn spawn_listener(bus: &Bus, subscriber: Arc<dyn Subscriber>) -> JoinHandle<()> {
    let mut rx = bus.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(ev) => subscriber.handle(&ev).await,
                Err(RecvError::Lagged(skipped)) => {
                    warn!(
                        "subscriber {} lagged; skipped {skipped} events",
                        subscriber.name()
                    );
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}
