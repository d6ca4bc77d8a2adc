//! # Icon identities and the partial-update field mask.
//!
//! [`IconKey`] is the `(window, id)` pair that uniquely identifies a
//! registered icon. [`IconImage`] is an opaque image identity — the core
//! never touches pixels, it only compares identities for shared-icon
//! lookup. [`IconFields`] carries a partial update: every field is an
//! `Option`, and only `Some` fields are applied, which is the typed
//! rendition of the original per-request field mask.

use std::fmt;
use std::time::Duration;

use crate::balloons::BalloonInfo;
use crate::watcher::ProcessHandle;

/// Unique identity of a registered icon: owner window plus local id.
///
/// Immutable for the lifetime of the entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IconKey {
    /// Opaque handle of the owning window.
    pub window: u64,
    /// Identifier local to that window.
    pub id: u32,
}

impl IconKey {
    /// Creates a key from an owner window handle and a local id.
    pub fn new(window: u64, id: u32) -> Self {
        Self { window, id }
    }
}

impl fmt::Display for IconKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}/{}", self.window, self.id)
    }
}

/// Opaque identity of an icon image resource.
///
/// Compared only for equality; shared icons are resolved by looking this
/// identity up across the pool instead of duplicating ownership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IconImage(pub u64);

/// State-mask sub-update: visibility and shared-image ownership.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StateFields {
    /// Hide or show the icon.
    pub hidden: Option<bool>,
    /// Mark the image reference as shared (pool-resolved) or exclusive.
    pub shared: Option<bool>,
}

/// Partial-update carrier for add and update requests.
///
/// Only `Some` fields are applied; everything else keeps its current
/// value. On add, unset fields take their defaults (visible, exclusive,
/// empty tooltip, no callback, no balloon).
#[derive(Debug, Clone, Default)]
pub struct IconFields {
    /// Callback message forwarded to the owner on icon interaction.
    pub callback: Option<u32>,
    /// Icon image identity.
    pub icon: Option<IconImage>,
    /// Tooltip text.
    pub tooltip: Option<String>,
    /// State-mask sub-update.
    pub state: Option<StateFields>,
    /// Balloon payload. Empty text means "close any balloon for this icon".
    pub info: Option<BalloonInfo>,
}

impl IconFields {
    /// Convenience: fields carrying only a balloon payload.
    pub fn info(title: impl Into<String>, text: impl Into<String>, timeout: Duration) -> Self {
        Self {
            info: Some(BalloonInfo::new(title, text, timeout)),
            ..Self::default()
        }
    }
}

/// One registered icon. Internal storage; external code sees [`IconView`].
#[derive(Debug)]
pub(crate) struct IconEntry {
    pub key: IconKey,
    pub pid: u32,
    /// Opened handle to the owner process; released when the entry drops.
    pub handle: ProcessHandle,
    /// Pool slot backing the image reference, if any.
    pub slot: Option<usize>,
    pub shared: bool,
    pub hidden: bool,
    pub tooltip: String,
    pub callback: Option<u32>,
    pub version: u32,
    /// Present only while a balloon is pending or showing for this entry.
    pub info: Option<BalloonInfo>,
}

impl IconEntry {
    pub(crate) fn new(key: IconKey, pid: u32, handle: ProcessHandle) -> Self {
        Self {
            key,
            pid,
            handle,
            slot: None,
            shared: false,
            hidden: false,
            tooltip: String::new(),
            callback: None,
            version: 0,
            info: None,
        }
    }
}

/// Read-only snapshot of a registered icon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconView {
    pub key: IconKey,
    pub pid: u32,
    pub hidden: bool,
    pub shared: bool,
    pub tooltip: String,
    pub callback: Option<u32>,
    pub version: u32,
    /// Resolved image identity, if the entry has one.
    pub image: Option<IconImage>,
}
