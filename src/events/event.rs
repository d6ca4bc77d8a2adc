//! # Runtime events emitted by the tray core.
//!
//! The [`EventKind`] enum classifies event types across four categories:
//! - **Icon lifecycle**: add/update/remove and visibility changes
//! - **Watcher lifecycle**: watch-set rebuilds, owner exits, fatal failures
//! - **Balloon lifecycle**: queued/shown/closed transitions
//! - **Dispatch**: focus and protocol-version requests
//!
//! The [`Event`] struct carries optional metadata such as the icon key,
//! owner pid, visible count, and a human-readable reason.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically. Use `seq` to restore the exact order when events are
//! observed out of order across receivers.

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::SystemTime;

use crate::registry::IconKey;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of tray runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Icon lifecycle ===
    /// An icon was registered. Sets `key`, `pid`.
    IconAdded,
    /// A registered icon was updated in place. Sets `key`.
    IconUpdated,
    /// An icon was removed (explicitly or by the watcher). Sets `key`, `pid`.
    IconRemoved,
    /// The visible-icon count changed; the host was asked to relayout.
    /// Sets `visible`.
    VisibilityChanged,

    // === Watcher lifecycle ===
    /// The watch set was rebuilt after a wake. Sets `watched`.
    WatchRebuilt,
    /// More icons are registered than the watch bound allows; the excess
    /// stays registered but unmonitored. Sets `watched` (the bound).
    WatchLimitExceeded,
    /// A watched owner process exited without removing its icon.
    /// Sets `key`, `pid`.
    OwnerExited,
    /// A synthesized removal could not be delivered; the entry was dropped
    /// locally. Sets `key`, `pid`.
    RemovalForced,
    /// The wait primitive failed; the watcher tore itself down.
    /// Sets `reason`.
    WatcherFailed,
    /// The watch loop exited (shutdown or fatal failure).
    WatcherStopped,

    // === Balloon lifecycle ===
    /// A balloon request was queued behind the current one. Sets `key`.
    BalloonQueued,
    /// A balloon is now showing. Sets `key`.
    BalloonShown,
    /// The showing balloon began closing. Sets `key`.
    BalloonClosed,

    // === Dispatch ===
    /// The host was asked to focus an icon. Sets `key`.
    FocusRequested,
    /// An icon's protocol version changed. Sets `key`.
    VersionChanged,
}

/// Tray runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Icon key, if applicable.
    pub key: Option<IconKey>,
    /// Owner process id, if applicable.
    pub pid: Option<u32>,
    /// Visible-icon count after the change.
    pub visible: Option<usize>,
    /// Number of watched owners after a rebuild.
    pub watched: Option<usize>,
    /// Human-readable reason (failures, degradations).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with the current timestamp and
    /// next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            key: None,
            pid: None,
            visible: None,
            watched: None,
            reason: None,
        }
    }

    /// Attaches an icon key.
    #[inline]
    pub fn with_key(mut self, key: IconKey) -> Self {
        self.key = Some(key);
        self
    }

    /// Attaches an owner process id.
    #[inline]
    pub fn with_pid(mut self, pid: u32) -> Self {
        self.pid = Some(pid);
        self
    }

    /// Attaches the visible-icon count.
    #[inline]
    pub fn with_visible(mut self, visible: usize) -> Self {
        self.visible = Some(visible);
        self
    }

    /// Attaches the watched-owner count.
    #[inline]
    pub fn with_watched(mut self, watched: usize) -> Self {
        self.watched = Some(watched);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_is_monotonic() {
        let a = Event::new(EventKind::IconAdded);
        let b = Event::new(EventKind::IconRemoved);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn test_builder_attachments() {
        let ev = Event::new(EventKind::OwnerExited)
            .with_key(IconKey::new(10, 1))
            .with_pid(4242)
            .with_reason("exited without cleanup");

        assert_eq!(ev.kind, EventKind::OwnerExited);
        assert_eq!(ev.key, Some(IconKey::new(10, 1)));
        assert_eq!(ev.pid, Some(4242));
        assert_eq!(ev.reason.as_deref(), Some("exited without cleanup"));
    }
}
