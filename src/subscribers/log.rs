//! # Simple logging subscriber for debugging and demos.
//!
//! [`LogWriter`] prints events to stdout in a human-readable format.
//!
//! ## Output format
//! ```text
//! [icon-added] key=0x2a/1 pid=4242
//! [balloon-shown] key=0x2a/1
//! [owner-exited] key=0x2a/1 pid=4242
//! [watcher-stopped]
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscriber;

/// Simple stdout logging subscriber.
///
/// Enabled via the `logging` feature. Not intended for production use;
/// implement a custom [`Subscriber`] for structured logging or metrics.
pub struct LogWriter;

#[async_trait]
impl Subscriber for LogWriter {
    async fn handle(&self, e: &Event) {
        match e.kind {
            EventKind::IconAdded => {
                if let (Some(key), Some(pid)) = (e.key, e.pid) {
                    println!("[icon-added] key={key} pid={pid}");
                }
            }
            EventKind::IconUpdated => {
                if let Some(key) = e.key {
                    println!("[icon-updated] key={key}");
                }
            }
            EventKind::IconRemoved => {
                println!("[icon-removed] key={:?} pid={:?}", e.key, e.pid);
            }
            EventKind::VisibilityChanged => {
                println!("[visibility-changed] visible={:?}", e.visible);
            }
            EventKind::WatchRebuilt => {
                println!("[watch-rebuilt] watched={:?}", e.watched);
            }
            EventKind::WatchLimitExceeded => {
                println!("[watch-limit-exceeded] watched={:?}", e.watched);
            }
            EventKind::OwnerExited => {
                println!("[owner-exited] key={:?} pid={:?}", e.key, e.pid);
            }
            EventKind::RemovalForced => {
                println!("[removal-forced] key={:?} pid={:?}", e.key, e.pid);
            }
            EventKind::WatcherFailed => {
                println!("[watcher-failed] reason={:?}", e.reason);
            }
            EventKind::WatcherStopped => {
                println!("[watcher-stopped]");
            }
            EventKind::BalloonQueued => {
                println!("[balloon-queued] key={:?}", e.key);
            }
            EventKind::BalloonShown => {
                if let Some(key) = e.key {
                    println!("[balloon-shown] key={key}");
                }
            }
            EventKind::BalloonClosed => {
                if let Some(key) = e.key {
                    println!("[balloon-closed] key={key}");
                }
            }
            EventKind::FocusRequested => {
                println!("[focus-requested] key={:?}", e.key);
            }
            EventKind::VersionChanged => {
                println!("[version-changed] key={:?}", e.key);
            }
        }
    }

    fn name(&self) -> &'static str {
        "log-writer"
    }
}
