//! Liveness watcher: one background task waiting on every owner process.
//!
//! This module contains the monitoring trait and the watch loop:
//! - [`ProcessMonitor`], [`ProcessHandle`] — open/wait abstraction over
//!   process liveness
//! - [`SystemMonitor`] — polling implementation over the system process
//!   table
//! - [`IconWatcher`] — the spawned loop that rebuilds its watch set on
//!   wake and synthesizes removals for exited owners

mod monitor;
mod watcher;

pub use monitor::{ProcessHandle, ProcessMonitor, SystemMonitor};
pub use watcher::IconWatcher;
