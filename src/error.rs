//! Error types used by the tray core and the liveness watcher.
//!
//! This module defines two main error enums:
//!
//! - [`TrayError`] — contract violations and failures reported to the
//!   inbound dispatcher (duplicate add, unknown key, unwatchable owner).
//! - [`WatchError`] — failures raised by a [`ProcessMonitor`](crate::ProcessMonitor)
//!   implementation while opening or waiting on an owner process.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for logging,
//! and [`WatchError::is_fatal`] tells the watcher whether a failure should
//! tear the watch loop down.
//!
//! No error crosses a task boundary as a panic; the watcher communicates
//! owner death exclusively through the synthesized-removal callback path.

use thiserror::Error;

use crate::registry::IconKey;

/// # Errors reported to callers of the tray surface.
///
/// These map one-to-one onto the boolean failures of the original wire
/// protocol: the operation is rejected and no state changes.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum TrayError {
    /// An icon with the same `(window, id)` key is already registered.
    #[error("icon {key} is already registered")]
    DuplicateIcon {
        /// The conflicting key.
        key: IconKey,
    },

    /// The requested key does not exist in the registry.
    #[error("icon {key} is not registered")]
    IconNotFound {
        /// The missing key.
        key: IconKey,
    },

    /// The owner process could not be opened for liveness monitoring.
    ///
    /// No entry exists without a live handle, so the add itself fails.
    #[error("cannot watch owner process {pid}: {source}")]
    OwnerUnavailable {
        /// Process id of the would-be owner.
        pid: u32,
        /// The underlying monitor failure.
        source: WatchError,
    },

    /// A `set_version` request carried a version this shell does not speak.
    #[error("unsupported notify protocol version {version}")]
    UnknownVersion {
        /// The rejected version value.
        version: u32,
    },
}

impl TrayError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            TrayError::DuplicateIcon { .. } => "tray_duplicate_icon",
            TrayError::IconNotFound { .. } => "tray_icon_not_found",
            TrayError::OwnerUnavailable { .. } => "tray_owner_unavailable",
            TrayError::UnknownVersion { .. } => "tray_unknown_version",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            TrayError::DuplicateIcon { key } => format!("duplicate icon: {key}"),
            TrayError::IconNotFound { key } => format!("icon not found: {key}"),
            TrayError::OwnerUnavailable { pid, source } => {
                format!("owner {pid} unavailable: {source}")
            }
            TrayError::UnknownVersion { version } => format!("unknown version: {version}"),
        }
    }
}

/// # Errors produced by process-liveness monitoring.
///
/// Raised by [`ProcessMonitor`](crate::ProcessMonitor) implementations.
/// [`WatchError::WaitFailed`] is fatal for the watch loop; the remaining
/// variants describe a single owner and leave the loop running.
#[non_exhaustive]
#[derive(Error, Debug, Clone)]
pub enum WatchError {
    /// The process does not exist (already exited, or never did).
    #[error("process {pid} does not exist")]
    ProcessGone {
        /// The missing process id.
        pid: u32,
    },

    /// The process exists but cannot be opened for waiting.
    #[error("access to process {pid} denied")]
    AccessDenied {
        /// The protected process id.
        pid: u32,
    },

    /// The wait primitive itself failed.
    ///
    /// This usually indicates a corrupted handle, so the watcher tears
    /// itself down instead of retrying indefinitely.
    #[error("wait on process {pid} failed: {reason}")]
    WaitFailed {
        /// Process id whose wait broke.
        pid: u32,
        /// Monitor-specific failure description.
        reason: String,
    },
}

impl WatchError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            WatchError::ProcessGone { .. } => "watch_process_gone",
            WatchError::AccessDenied { .. } => "watch_access_denied",
            WatchError::WaitFailed { .. } => "watch_wait_failed",
        }
    }

    /// True if this failure should stop the watch loop entirely.
    pub fn is_fatal(&self) -> bool {
        matches!(self, WatchError::WaitFailed { .. })
    }
}
