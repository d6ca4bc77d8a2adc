//! Balloon scheduler: serialized popup notifications.
//!
//! This module contains the popup data model and the scheduler:
//! - [`BalloonInfo`], [`BalloonIcon`] — the notification payload
//! - [`BalloonRequest`] — a queued popup bound to its source icon by key
//! - [`BalloonQueue`] — FIFO scheduler guaranteeing at most one visible
//!   balloon, with a timeout clamp and an inter-balloon cooldown
//!
//! The queue has no thread of its own; it runs entirely inside the
//! caller's update and timer callbacks.

mod queue;
mod request;

pub use queue::BalloonQueue;
pub use request::{BalloonIcon, BalloonInfo, BalloonRequest};
