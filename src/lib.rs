//! # syspager
//!
//! **Syspager** is the core of a notification-area ("system tray") pager:
//! an icon registry with partial updates and shared images, a liveness
//! watchdog that reaps icons whose owner process died, and a balloon
//! scheduler that serializes popup notifications.
//!
//! The crate is UI-free. Rendering, layout, and input live behind the
//! [`ShellHost`] trait; the core only decides *what* the shell should do
//! and *when*.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   owner processes (pid per icon)
//!        │ add / update / remove / focus / version
//!        ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  SysPager (inbound dispatcher)                              │
//! │                                                             │
//! │  ┌───────────────┐  wake   ┌─────────────────────────────┐  │
//! │  │ IconRegistry  │────────►│ IconWatcher (background)    │  │
//! │  │ - entries     │◄────────│ - multi-wait on owner exits │  │
//! │  │ - IconPool    │ rebuild │ - synthesizes removals      │  │
//! │  │ - visible cnt │         └─────────────────────────────┘  │
//! │  └───────────────┘                                          │
//! │  ┌─────────────────────────────┐                            │
//! │  │ BalloonQueue                │                            │
//! │  │ - FIFO, one visible popup   │                            │
//! │  │ - Idle / Showing / Closing  │                            │
//! │  └─────────────────────────────┘                            │
//! └──────┬──────────────────────────────────────────┬───────────┘
//!        │ visible_count_changed / show_balloon /   │ publish(Event)
//!        │ hide_balloon / focus_icon / timers /     ▼
//!        │ synthesize_removal              ┌────────────────┐
//!        ▼                                 │ Bus (broadcast)│
//!   ShellHost (the embedding shell)        └───────┬────────┘
//!                                                  ▼
//!                                        Subscriber::handle(&Event)
//! ```
//!
//! ### Owner death lifecycle
//! ```text
//! IconWatcher
//!   ├─► snapshot registry.watch_set(limit)   (copy, lock released)
//!   ├─► wait on all owner processes at once
//!   │     ├─ wake signal  ─► rebuild the snapshot
//!   │     ├─ owner exit   ─► re-validate key/pid against the registry
//!   │     │                  ├─ delivered: host applies the removal
//!   │     │                  └─ undeliverable: entry dropped locally
//!   │     └─ fatal wait error ─► watcher tears itself down
//!   └─► on exit: publish WatcherStopped
//! ```
//!
//! ## Features
//! | Area            | Description                                             | Key types / traits                    |
//! |-----------------|---------------------------------------------------------|---------------------------------------|
//! | **Dispatch**    | Inbound surface for icon add/update/remove/focus/version| [`SysPager`], [`AddIcon`]             |
//! | **Registry**    | Keyed entries, partial field masks, shared image pool   | [`IconRegistry`], [`IconFields`]      |
//! | **Liveness**    | Owner-process watchdog with synthesized removals        | [`IconWatcher`], [`ProcessMonitor`]   |
//! | **Balloons**    | FIFO popup scheduling with timeout clamp and cooldown   | [`BalloonQueue`], [`BalloonInfo`]     |
//! | **Host seam**   | Everything the embedding shell must provide             | [`ShellHost`], [`TimerToken`]         |
//! | **Errors**      | Typed rejections for the dispatch surface               | [`TrayError`], [`WatchError`]         |
//! | **Observability**| Broadcast events for every lifecycle transition        | [`Bus`], [`Event`], [`Subscriber`]    |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use syspager::{
//!     AddIcon, BalloonRequest, IconFields, IconKey, PagerConfig, ShellHost, SysPager,
//!     TimerToken,
//! };
//!
//! struct Headless;
//!
//! impl ShellHost for Headless {
//!     fn visible_count_changed(&self, visible: usize) {
//!         println!("relayout for {visible} icons");
//!     }
//!     fn show_balloon(&self, anchor: IconKey, request: &BalloonRequest, timeout: Duration) {
//!         println!("balloon at {anchor}: {} ({timeout:?})", request.info.text);
//!     }
//!     fn hide_balloon(&self) {}
//!     fn focus_icon(&self, _key: IconKey) {}
//!     fn arm_timer(&self, _after: Duration) -> TimerToken {
//!         TimerToken(0)
//!     }
//!     fn cancel_timer(&self, _timer: TimerToken) {}
//!     fn synthesize_removal(&self, _key: IconKey) -> bool {
//!         false
//!     }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let pager = SysPager::new(PagerConfig::default(), Arc::new(Headless));
//!     pager.add_icon(AddIcon {
//!         key: IconKey::new(0x2a, 1),
//!         pid: std::process::id(),
//!         fields: IconFields {
//!             tooltip: Some("hello".into()),
//!             ..IconFields::default()
//!         },
//!     })?;
//!     pager.shutdown().await;
//!     Ok(())
//! }
//! ```

mod balloons;
mod config;
mod error;
mod events;
mod host;
mod pager;
mod registry;
mod subscribers;
mod watcher;

#[cfg(test)]
pub(crate) mod testing;

// ---- Public re-exports ----

pub use balloons::{BalloonIcon, BalloonInfo, BalloonQueue, BalloonRequest};
pub use config::PagerConfig;
pub use error::{TrayError, WatchError};
pub use events::{Bus, Event, EventKind};
pub use host::{ShellHost, TimerToken};
pub use pager::{AddIcon, SysPager, PROTOCOL_VERSION};
pub use registry::{
    IconFields, IconImage, IconKey, IconRegistry, IconView, RemovedIcon, StateFields,
    UpdateOutcome, WatchedIcon,
};
pub use subscribers::{spawn_listener, Subscriber};
pub use watcher::{IconWatcher, ProcessHandle, ProcessMonitor, SystemMonitor};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
