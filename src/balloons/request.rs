//! # Balloon payload and queued request types.

use std::time::Duration;

use crate::registry::IconKey;

/// Severity glyph displayed next to the balloon title.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BalloonIcon {
    /// No glyph.
    #[default]
    None,
    /// Informational.
    Info,
    /// Warning.
    Warning,
    /// Error.
    Error,
}

/// Notification payload carried by an icon entry.
///
/// An empty `text` is the protocol's way of requesting that any pending
/// or showing balloon for the icon be closed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BalloonInfo {
    /// Balloon title line.
    pub title: String,
    /// Balloon body text. Empty means "close".
    pub text: String,
    /// Severity glyph.
    pub icon: BalloonIcon,
    /// Caller-requested display time; clamped by the scheduler.
    pub timeout: Duration,
}

impl BalloonInfo {
    /// Creates a payload with the default glyph.
    pub fn new(title: impl Into<String>, text: impl Into<String>, timeout: Duration) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
            icon: BalloonIcon::None,
            timeout,
        }
    }

    /// Sets the severity glyph.
    pub fn with_icon(mut self, icon: BalloonIcon) -> Self {
        self.icon = icon;
        self
    }
}

/// A popup request waiting in (or at the head of) the balloon queue.
///
/// Holds the source icon only by key — never ownership — so a removed
/// entry can be detected by a registry lookup before the request is shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalloonRequest {
    /// Source icon.
    pub key: IconKey,
    /// Snapshot of the payload at request time.
    pub info: BalloonInfo,
}

impl BalloonRequest {
    /// Snapshots a payload for the given icon.
    pub fn new(key: IconKey, info: BalloonInfo) -> Self {
        Self { key, info }
    }
}
