//! # BalloonQueue: serialized popup display.
//!
//! Guarantees at most one visible balloon, FIFO ordering for the rest,
//! a clamped display time, and a settling cooldown between consecutive
//! balloons.
//!
//! ## State machine
//! ```text
//!           show()                 on_timer (display elapsed)
//!  Idle ────────────► Showing ────────────────────────────► Closing
//!   ▲                    │  ▲                                  │
//!   │                    │  └── update_info(same key):         │
//!   │                    │      in-place re-show               │
//!   │                    └── close_current(): Closing w/o hide │
//!   └──────────────── on_timer (cooldown elapsed) ◄────────────┘
//!                      └─► pop queue head, show next (if any)
//! ```
//!
//! ## Rules
//! - A key appears at most once as current and at most once in the queue;
//!   a new request for a queued key replaces the payload in place.
//! - Requests hold their source icon only by key; before showing, the key
//!   is re-validated against the registry and stale requests are dropped.
//! - The explicit `Closing` state is the re-entrancy guard: a close
//!   request arriving while already closing neither re-issues the hide
//!   command nor disturbs the cooldown timer.
//! - The queue never sleeps; all delays go through the host timer and
//!   come back via [`BalloonQueue::on_timer`]. Fires carrying a token
//!   other than the currently armed one are ignored.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use log::debug;

use crate::balloons::{BalloonInfo, BalloonRequest};
use crate::events::{Bus, Event, EventKind};
use crate::host::{ShellHost, TimerToken};
use crate::registry::{IconKey, IconRegistry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DisplayState {
    Idle,
    Showing(IconKey),
    Closing(IconKey),
}

/// FIFO scheduler for balloon popups. One instance per host, not per icon.
pub struct BalloonQueue {
    registry: Arc<IconRegistry>,
    host: Arc<dyn ShellHost>,
    bus: Bus,
    min_timeout: Duration,
    max_timeout: Duration,
    cooldown: Duration,
    queue: VecDeque<BalloonRequest>,
    state: DisplayState,
    timer: Option<TimerToken>,
}

impl BalloonQueue {
    /// Creates an idle queue.
    pub fn new(
        registry: Arc<IconRegistry>,
        host: Arc<dyn ShellHost>,
        bus: Bus,
        min_timeout: Duration,
        max_timeout: Duration,
        cooldown: Duration,
    ) -> Self {
        Self {
            registry,
            host,
            bus,
            min_timeout,
            max_timeout,
            cooldown,
            queue: VecDeque::new(),
            state: DisplayState::Idle,
            timer: None,
        }
    }

    /// Key of the balloon currently showing or closing, if any.
    pub fn current(&self) -> Option<IconKey> {
        match self.state {
            DisplayState::Idle => None,
            DisplayState::Showing(key) | DisplayState::Closing(key) => Some(key),
        }
    }

    /// Number of requests waiting behind the current balloon.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Feeds a fresh payload for `key` into the scheduler.
    ///
    /// Empty text closes any showing or queued balloon for the key.
    /// A payload for the already-current key re-shows in place, bypassing
    /// the queue; a payload for an already-queued key replaces the queued
    /// one; otherwise the request shows immediately when the scheduler is
    /// idle with an empty queue, or goes to the tail.
    pub fn update_info(&mut self, key: IconKey, info: &BalloonInfo) {
        self.reap_current();
        if info.text.is_empty() {
            self.queue.retain(|r| r.key != key);
            self.close_for(key);
            return;
        }

        let req = BalloonRequest::new(key, info.clone());
        match self.state {
            DisplayState::Showing(k) | DisplayState::Closing(k) if k == key => {
                // An icon may refresh its own visible balloon.
                self.show(req);
            }
            _ => {
                if let Some(slot) = self.queue.iter_mut().find(|r| r.key == key) {
                    *slot = req;
                } else if self.state == DisplayState::Idle && self.queue.is_empty() {
                    self.show(req);
                } else {
                    self.bus
                        .publish(Event::new(EventKind::BalloonQueued).with_key(key));
                    self.queue.push_back(req);
                }
            }
        }
    }

    /// Purges all balloon state for a removed icon.
    ///
    /// Closes the balloon if it is current and drops every queued request
    /// for the key; a removed entry must never be displayed later.
    pub fn remove_info(&mut self, key: IconKey) {
        self.reap_current();
        self.queue.retain(|r| r.key != key);
        self.close_for(key);
    }

    /// The popup UI dismissed itself (outside interaction).
    ///
    /// Transitions to `Closing` and arms the cooldown without re-issuing
    /// the hide command — the display is already gone.
    pub fn close_current(&mut self) {
        if let DisplayState::Showing(key) = self.state {
            self.state = DisplayState::Closing(key);
            self.arm(self.cooldown);
            self.bus
                .publish(Event::new(EventKind::BalloonClosed).with_key(key));
        }
    }

    /// Handles a host timer fire. Returns false (and does nothing) if the
    /// token does not match the scheduler's current timer.
    pub fn on_timer(&mut self, token: TimerToken) -> bool {
        if self.timer != Some(token) {
            return false;
        }
        self.timer = None;

        match self.state {
            DisplayState::Showing(key) => self.begin_close(key),
            DisplayState::Closing(_) | DisplayState::Idle => {
                self.state = DisplayState::Idle;
                self.show_next();
            }
        }
        true
    }

    /// Cancels any armed timer. Call on teardown.
    pub fn shutdown(&mut self) {
        if let Some(timer) = self.timer.take() {
            self.host.cancel_timer(timer);
        }
    }

    /// Closes the current balloon if its entry has vanished from the
    /// registry. A forced removal drops the entry without going through
    /// [`Self::remove_info`]; without this, the stale balloon would stay
    /// up for its full display time while new requests queue behind it.
    fn reap_current(&mut self) {
        if let DisplayState::Showing(key) = self.state {
            if !self.registry.contains(key) {
                debug!("closing balloon for removed icon {key}");
                self.begin_close(key);
            }
        }
    }

    /// Closes the balloon for `key` if it is the one showing.
    ///
    /// Already-closing and not-current keys are no-ops; the `Closing`
    /// state is what makes a second close request harmless.
    fn close_for(&mut self, key: IconKey) {
        if self.state == DisplayState::Showing(key) {
            self.begin_close(key);
        }
    }

    fn begin_close(&mut self, key: IconKey) {
        self.host.hide_balloon();
        self.state = DisplayState::Closing(key);
        self.arm(self.cooldown);
        self.bus
            .publish(Event::new(EventKind::BalloonClosed).with_key(key));
    }

    fn show(&mut self, req: BalloonRequest) {
        let timeout = req.info.timeout.clamp(self.min_timeout, self.max_timeout);
        self.host.show_balloon(req.key, &req, timeout);
        self.bus
            .publish(Event::new(EventKind::BalloonShown).with_key(req.key));
        self.state = DisplayState::Showing(req.key);
        self.arm(timeout);
    }

    /// Pops queued requests until one still backed by a registered icon
    /// is found and shown. Stale requests are dropped silently.
    fn show_next(&mut self) {
        while let Some(req) = self.queue.pop_front() {
            if self.registry.contains(req.key) {
                self.show(req);
                return;
            }
            debug!("dropping balloon for removed icon {}", req.key);
        }
    }

    fn arm(&mut self, after: Duration) {
        if let Some(old) = self.timer.take() {
            self.host.cancel_timer(old);
        }
        self.timer = Some(self.host.arm_timer(after));
    }
}
