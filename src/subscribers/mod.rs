//! # Event subscribers for the tray runtime.
//!
//! This module provides the [`Subscriber`] trait, the listener task that
//! drives one, and a built-in stdout writer for demos.
//!
//! ```text
//! Event flow:
//!   registry / watcher / balloons ── publish(Event) ──► Bus
//!                                                        │
//!                                     spawn_listener ────┤
//!                                                        ▼
//!                                        Subscriber::handle(&Event)
//!                                          (LogWriter, metrics, ...)
//! ```

mod subscriber;

#[cfg(feature = "logging")]
mod log;

#[cfg(feature = "logging")]
pub use self::log::LogWriter;
pub use subscriber::{spawn_listener, Subscriber};
