//! Runtime events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to events emitted by the registry, the liveness
//! watcher, the balloon scheduler, and the pager facade.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] — event classification and payload metadata
//! - [`Bus`] — thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `IconRegistry` (icon lifecycle), `IconWatcher`
//!   (watch-set rebuilds, owner exits, fatal failures), `BalloonQueue`
//!   (balloon lifecycle), `SysPager` (visibility, focus, version).
//! - **Consumers**: anything holding a `Bus` clone; the built-in
//!   `LogWriter` when the `logging` feature is on.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
