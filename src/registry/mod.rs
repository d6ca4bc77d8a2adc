//! Icon registry: the shared data store of the tray core.
//!
//! This module contains the registry's data model and the registry itself:
//! - [`IconKey`], [`IconImage`] — identities
//! - [`IconFields`], [`StateFields`] — partial-update carriers (the field mask)
//! - [`IconPool`] — refcounted image slots for shared-icon semantics
//! - [`IconRegistry`] — insertion-ordered store with an O(1) visible counter
//!   and the watcher's wake signal
//!
//! ## Lock discipline
//! All mutation and lookup go through one exclusive lock, held only for the
//! duration of the operation (never across an `.await`). The watcher copies
//! its watch set under the same lock and blocks only after releasing it.

mod entry;
mod pool;
#[allow(clippy::module_inception)]
mod registry;

pub use entry::{IconFields, IconImage, IconKey, IconView, StateFields};
pub use pool::IconPool;
pub use registry::{IconRegistry, RemovedIcon, UpdateOutcome, WatchedIcon};
