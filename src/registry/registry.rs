//! # Insertion-ordered icon registry with visible counter and wake signal.
//!
//! [`IconRegistry`] is the shared data store of the tray core:
//! - `add` / `update` / `remove` mutate entries under one exclusive lock,
//!   applying partial field masks;
//! - `watch_set` copies the watcher's working view under the same lock;
//! - the wake signal is raised after every add/remove so the watcher's
//!   view stays current without ever blocking the mutator.
//!
//! ## Rules
//! - Display order is insertion order (entries are kept in a `Vec`).
//! - The visible-icon count is maintained incrementally (O(1) reads).
//! - The lock is a `std::sync::Mutex` and is never held across an
//!   `.await`; the watcher blocks only after releasing it.

use std::sync::{Mutex, MutexGuard, PoisonError};

use log::warn;
use tokio::sync::Notify;

use crate::balloons::BalloonInfo;
use crate::error::TrayError;
use crate::events::{Bus, Event, EventKind};
use crate::registry::entry::IconEntry;
use crate::registry::{IconFields, IconKey, IconPool, IconView};
use crate::watcher::ProcessHandle;

#[derive(Debug, Default)]
struct RegistryState {
    entries: Vec<IconEntry>,
    pool: IconPool,
    visible: usize,
}

/// Result of a successful update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateOutcome {
    /// True if the hidden flag flipped, so the caller can relayout.
    pub visibility_changed: bool,
}

/// Result of a successful removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemovedIcon {
    /// Key of the removed entry.
    pub key: IconKey,
    /// Owner pid of the removed entry.
    pub pid: u32,
    /// True if the entry was visible, so the caller can relayout.
    pub was_visible: bool,
}

/// One element of the watcher's working view.
#[derive(Debug, Clone)]
pub struct WatchedIcon {
    /// Handle to wait on.
    pub handle: ProcessHandle,
    /// Entry owning the handle.
    pub key: IconKey,
    /// Owner pid (for logs and re-validation).
    pub pid: u32,
}

/// Shared, lock-protected store of registered icons.
pub struct IconRegistry {
    state: Mutex<RegistryState>,
    wake: Notify,
    bus: Bus,
}

impl IconRegistry {
    /// Creates an empty registry publishing lifecycle events to `bus`.
    pub fn new(bus: Bus) -> Self {
        Self {
            state: Mutex::new(RegistryState::default()),
            wake: Notify::new(),
            bus,
        }
    }

    /// A poisoned lock only means a holder panicked mid-operation; the
    /// state itself is a plain collection, so recover the guard.
    fn state(&self) -> MutexGuard<'_, RegistryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers a new icon.
    ///
    /// Fails with [`TrayError::DuplicateIcon`] if the key is present.
    /// The opened `handle` is owned by the entry until removal. Raises
    /// the watcher wake signal after the mutation completes.
    pub fn add(
        &self,
        key: IconKey,
        pid: u32,
        handle: ProcessHandle,
        fields: IconFields,
    ) -> Result<(), TrayError> {
        {
            let mut s = self.state();
            if s.entries.iter().any(|e| e.key == key) {
                return Err(TrayError::DuplicateIcon { key });
            }

            let mut entry = IconEntry::new(key, pid, handle);

            // State mask first: shared-ness decides how the image is bound.
            if let Some(state) = fields.state {
                entry.shared = state.shared.unwrap_or(false);
                entry.hidden = state.hidden.unwrap_or(false);
            }
            if let Some(cb) = fields.callback {
                entry.callback = Some(cb);
            }
            if let Some(image) = fields.icon {
                if entry.shared {
                    match s.pool.find(image) {
                        Some(slot) => {
                            s.pool.retain(slot);
                            entry.slot = Some(slot);
                        }
                        None => {
                            // Accepted without an image; the sharer pointed
                            // at an identity nobody owns yet.
                            warn!("shared image for icon {key} not found in the pool; leaving it unset");
                        }
                    }
                } else {
                    entry.slot = Some(s.pool.alloc(image));
                }
            }
            if let Some(tip) = fields.tooltip {
                entry.tooltip = tip;
            }
            entry.info = fields.info.filter(|i| !i.text.is_empty());

            if !entry.hidden {
                s.visible += 1;
            }
            s.entries.push(entry);
        }

        self.bus
            .publish(Event::new(EventKind::IconAdded).with_key(key).with_pid(pid));
        self.wake.notify_one();
        Ok(())
    }

    /// Applies a partial update to an existing icon.
    ///
    /// Fails with [`TrayError::IconNotFound`] if the key is absent; no
    /// state changes in that case. Only `Some` fields are applied.
    pub fn update(&self, key: IconKey, fields: IconFields) -> Result<UpdateOutcome, TrayError> {
        let mut visibility_changed = false;
        {
            let mut s = self.state();
            let idx = s
                .entries
                .iter()
                .position(|e| e.key == key)
                .ok_or(TrayError::IconNotFound { key })?;

            let RegistryState {
                entries,
                pool,
                visible,
            } = &mut *s;
            let entry = &mut entries[idx];

            if let Some(state) = fields.state {
                if let Some(hidden) = state.hidden {
                    if hidden != entry.hidden {
                        entry.hidden = hidden;
                        if hidden {
                            *visible -= 1;
                        } else {
                            *visible += 1;
                        }
                        visibility_changed = true;
                    }
                }
                if let Some(shared) = state.shared {
                    entry.shared = shared;
                }
            }
            if let Some(cb) = fields.callback {
                entry.callback = Some(cb);
            }
            if let Some(image) = fields.icon {
                if entry.shared {
                    match pool.find(image) {
                        // Retain before release: when the entry re-sends
                        // the identity it already holds and is the last
                        // reference, releasing first would free the slot
                        // out from under it.
                        Some(slot) if entry.slot != Some(slot) => {
                            pool.retain(slot);
                            if let Some(old) = entry.slot.replace(slot) {
                                pool.release(old);
                            }
                        }
                        Some(_) => {}
                        None => {
                            // Update accepted, image left as-is.
                            warn!("shared image for icon {key} not found in the pool; ignoring the replacement");
                        }
                    }
                } else {
                    if let Some(old) = entry.slot.take() {
                        pool.release(old);
                    }
                    entry.slot = Some(pool.alloc(image));
                }
            }
            if let Some(tip) = fields.tooltip {
                entry.tooltip = tip;
            }
            if let Some(info) = fields.info {
                entry.info = Some(info).filter(|i| !i.text.is_empty());
            }
        }

        self.bus
            .publish(Event::new(EventKind::IconUpdated).with_key(key));
        Ok(UpdateOutcome { visibility_changed })
    }

    /// Removes an icon, releasing its pool slot and process handle.
    ///
    /// Fails with [`TrayError::IconNotFound`] if the key is absent.
    /// Raises the watcher wake signal after the mutation completes. The
    /// caller is responsible for purging any balloon state for the key.
    pub fn remove(&self, key: IconKey) -> Result<RemovedIcon, TrayError> {
        let removed = {
            let mut s = self.state();
            let idx = s
                .entries
                .iter()
                .position(|e| e.key == key)
                .ok_or(TrayError::IconNotFound { key })?;

            let entry = s.entries.remove(idx);
            if let Some(slot) = entry.slot {
                s.pool.release(slot);
            }
            if !entry.hidden {
                s.visible -= 1;
            }
            RemovedIcon {
                key,
                pid: entry.pid,
                was_visible: !entry.hidden,
            }
            // The ProcessHandle drops with the entry here.
        };

        self.bus.publish(
            Event::new(EventKind::IconRemoved)
                .with_key(key)
                .with_pid(removed.pid),
        );
        self.wake.notify_one();
        Ok(removed)
    }

    /// Read-only snapshot of an entry.
    pub fn find(&self, key: IconKey) -> Option<IconView> {
        let s = self.state();
        s.entries.iter().find(|e| e.key == key).map(|e| IconView {
            key: e.key,
            pid: e.pid,
            hidden: e.hidden,
            shared: e.shared,
            tooltip: e.tooltip.clone(),
            callback: e.callback,
            version: e.version,
            image: e.slot.and_then(|slot| s.pool.image(slot)),
        })
    }

    /// Key of the first entry owned by `pid`, in insertion order.
    ///
    /// Used by the watcher to map a signaled process handle back to its
    /// entry and to re-validate stale exits after a rebuild.
    pub fn find_by_pid(&self, pid: u32) -> Option<IconKey> {
        self.state()
            .entries
            .iter()
            .find(|e| e.pid == pid)
            .map(|e| e.key)
    }

    /// True if the key is registered.
    pub fn contains(&self, key: IconKey) -> bool {
        self.state().entries.iter().any(|e| e.key == key)
    }

    /// Tooltip text for an entry.
    pub fn tooltip(&self, key: IconKey) -> Option<String> {
        self.state()
            .entries
            .iter()
            .find(|e| e.key == key)
            .map(|e| e.tooltip.clone())
    }

    /// Pending balloon payload for an entry, if any.
    pub fn balloon_info(&self, key: IconKey) -> Option<BalloonInfo> {
        self.state()
            .entries
            .iter()
            .find(|e| e.key == key)
            .and_then(|e| e.info.clone())
    }

    /// Stores the negotiated protocol version on an entry.
    pub fn set_version(&self, key: IconKey, version: u32) -> Result<(), TrayError> {
        let mut s = self.state();
        let entry = s
            .entries
            .iter_mut()
            .find(|e| e.key == key)
            .ok_or(TrayError::IconNotFound { key })?;
        entry.version = version;
        Ok(())
    }

    /// Number of visible entries. O(1), maintained incrementally.
    pub fn visible_count(&self) -> usize {
        self.state().visible
    }

    /// Number of registered entries.
    pub fn len(&self) -> usize {
        self.state().entries.len()
    }

    /// True if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.state().entries.is_empty()
    }

    /// Number of distinct live image slots in the pool.
    pub fn image_count(&self) -> usize {
        self.state().pool.len()
    }

    /// Copies the watcher's working view: the first `limit` entries in
    /// insertion order, with their process handles.
    ///
    /// Entries past `limit` remain registered but unwatched. The lock is
    /// held only for the copy.
    pub fn watch_set(&self, limit: usize) -> Vec<WatchedIcon> {
        self.state()
            .entries
            .iter()
            .take(limit)
            .map(|e| WatchedIcon {
                handle: e.handle.clone(),
                key: e.key,
                pid: e.pid,
            })
            .collect()
    }

    /// Resolves once the wake signal has been raised.
    ///
    /// A signal raised while nobody waits is latched, so a wake issued
    /// between two waits is never lost.
    pub(crate) async fn woken(&self) {
        self.wake.notified().await;
    }
}
