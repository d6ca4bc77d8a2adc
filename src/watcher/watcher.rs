//! # Liveness watch loop.
//!
//! One background task waits on every registered owner process at once
//! and synthesizes a removal when an owner exits without cleaning up its
//! icon.
//!
//! ```text
//!   registry ──watch_set()──► snapshot ──► FuturesUnordered of waits
//!      ▲                                        │
//!      │ wake (add/remove)                      │ owner exit
//!      └──────── rebuild ◄──────────────────────┤
//!                                               ▼
//!                              re-validate ► synthesize removal
//! ```
//!
//! ## Rules
//! - The watch set is a copy; the loop never holds the registry lock
//!   while waiting. Any add/remove raises the wake signal and the loop
//!   rebuilds from a fresh copy.
//! - An exit result is re-validated against the registry before acting:
//!   a snapshot goes stale the moment the set changes.
//! - Synthesized removals go through the host so the owner-facing
//!   removal path runs exactly as if the owner had asked; only when the
//!   host cannot deliver is the entry dropped directly.
//! - A fatal wait failure stops the loop. Icons stay registered but
//!   their owners are no longer monitored.

use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};
use log::{debug, error, info, warn};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::WatchError;
use crate::events::{Bus, Event, EventKind};
use crate::host::ShellHost;
use crate::registry::{IconKey, IconRegistry};
use crate::watcher::ProcessMonitor;

/// Handle to the spawned watch loop.
pub struct IconWatcher {
    token: CancellationToken,
    join: JoinHandle<()>,
}

impl IconWatcher {
    /// Spawns the watch loop on the current runtime.
    ///
    /// At most `watch_limit` owners are waited on at once; entries past
    /// the limit stay registered but unmonitored until the set shrinks.
    pub fn spawn(
        registry: Arc<IconRegistry>,
        monitor: Arc<dyn ProcessMonitor>,
        host: Arc<dyn ShellHost>,
        bus: Bus,
        watch_limit: usize,
    ) -> Self {
        let token = CancellationToken::new();
        let join = tokio::spawn(watch_loop(
            registry,
            monitor,
            host,
            bus,
            watch_limit,
            token.clone(),
        ));
        Self { token, join }
    }

    /// Cancels the loop and waits for it to finish.
    pub async fn shutdown(self) {
        self.token.cancel();
        let _ = self.join.await;
    }
}

async fn watch_loop(
    registry: Arc<IconRegistry>,
    monitor: Arc<dyn ProcessMonitor>,
    host: Arc<dyn ShellHost>,
    bus: Bus,
    limit: usize,
    token: CancellationToken,
) {
    'rebuild: loop {
        let set = registry.watch_set(limit);
        if registry.len() > set.len() {
            warn!(
                "{} icons registered but only the first {} owners are watched",
                registry.len(),
                set.len()
            );
            bus.publish(Event::new(EventKind::WatchLimitExceeded).with_watched(set.len()));
        }
        debug!("watch set rebuilt: {} owners", set.len());
        bus.publish(Event::new(EventKind::WatchRebuilt).with_watched(set.len()));

        let mut exits = FuturesUnordered::new();
        for watched in set {
            let monitor = Arc::clone(&monitor);
            exits.push(async move {
                let result = monitor.wait_exit(&watched.handle).await;
                (result, watched.key, watched.pid)
            });
        }

        loop {
            tokio::select! {
                _ = token.cancelled() => break 'rebuild,
                _ = registry.woken() => continue 'rebuild,
                Some((result, key, pid)) = exits.next() => {
                    match result {
                        Ok(()) => handle_owner_exit(&registry, &host, &bus, key, pid),
                        Err(err) if err.is_fatal() => {
                            fail(&bus, pid, &err);
                            break 'rebuild;
                        }
                        Err(err) => {
                            // A non-fatal wait error means the owner cannot
                            // be observed anymore; treat it as an exit.
                            debug!("wait on owner {pid} degraded ({}): {err}", err.as_label());
                            handle_owner_exit(&registry, &host, &bus, key, pid);
                        }
                    }
                }
            }
        }
    }

    info!("liveness watcher stopped");
    bus.publish(Event::new(EventKind::WatcherStopped));
}

/// Acts on an owner exit from a possibly stale snapshot.
fn handle_owner_exit(
    registry: &IconRegistry,
    host: &Arc<dyn ShellHost>,
    bus: &Bus,
    key: IconKey,
    pid: u32,
) {
    // The snapshot predates any number of set changes; only act if the
    // pid still maps to the same entry.
    if registry.find_by_pid(pid) != Some(key) {
        debug!("stale exit for owner {pid}; entry {key} already gone");
        return;
    }

    warn!("owner {pid} of icon {key} exited without removing it");
    bus.publish(
        Event::new(EventKind::OwnerExited)
            .with_key(key)
            .with_pid(pid),
    );

    // The host applies the removal synchronously through the regular
    // removal path before returning true.
    if host.synthesize_removal(key) {
        return;
    }

    warn!("synthesized removal for {key} not delivered; dropping the entry");
    bus.publish(
        Event::new(EventKind::RemovalForced)
            .with_key(key)
            .with_pid(pid),
    );
    match registry.remove(key) {
        Ok(removed) => {
            if removed.was_visible {
                let visible = registry.visible_count();
                host.visible_count_changed(visible);
                bus.publish(Event::new(EventKind::VisibilityChanged).with_visible(visible));
            }
        }
        Err(err) => debug!("forced removal of {key} raced a real one: {err}"),
    }
}

fn fail(bus: &Bus, pid: u32, err: &WatchError) {
    error!(
        "wait on owner {pid} failed ({}); stopping the watcher: {err}",
        err.as_label()
    );
    bus.publish(
        Event::new(EventKind::WatcherFailed)
            .with_pid(pid)
            .with_reason(err.to_string()),
    );
}
