//! # Outbound seam to the owning shell.
//!
//! [`ShellHost`] is the contract the tray core calls back into: relayout on
//! visibility changes, balloon display, focus, timers, and synthesized
//! removals. The shell (window, toolbar, tooltip control) lives entirely
//! behind this trait — the core never renders or positions anything.
//!
//! ## Threading contract
//! All methods are called either from the caller's own context (registry
//! mutations, timer callbacks) or from the watcher task (`synthesize_removal`
//! only). Implementations must be `Send + Sync` and must not block for long.
//!
//! ## Timer protocol
//! The balloon scheduler never sleeps on its own; it asks the host to arm a
//! one-shot timer and expects the host to call
//! [`SysPager::on_timer`](crate::SysPager::on_timer) with the returned token
//! when it fires. Tokens that no longer match the scheduler's current timer
//! are ignored, so late or duplicate fires are harmless.

use std::time::Duration;

use crate::balloons::BalloonRequest;
use crate::registry::IconKey;

/// Identity of a host-armed one-shot timer.
///
/// Opaque to the core; compared only for equality when a fire is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerToken(pub u64);

/// Contract for the shell hosting this tray core.
pub trait ShellHost: Send + Sync + 'static {
    /// The visible-icon count changed; the shell should relayout the tray.
    fn visible_count_changed(&self, visible: usize);

    /// Display a balloon anchored at the given icon.
    ///
    /// `timeout` is already clamped to the configured bounds. The shell
    /// resolves the anchor position itself (layout is out of scope here).
    fn show_balloon(&self, anchor: IconKey, request: &BalloonRequest, timeout: Duration);

    /// Deactivate the currently displayed balloon.
    fn hide_balloon(&self);

    /// Give input focus to the given icon.
    fn focus_icon(&self, key: IconKey);

    /// Arm a one-shot timer; the shell must report the fire via
    /// [`SysPager::on_timer`](crate::SysPager::on_timer) with this token.
    fn arm_timer(&self, after: Duration) -> TimerToken;

    /// Cancel a previously armed timer. Cancelling an already-fired timer
    /// is a no-op.
    fn cancel_timer(&self, timer: TimerToken);

    /// Deliver a removal request for an icon whose owner died, using the
    /// same shape an explicit removal would take through the dispatcher.
    ///
    /// Must apply the removal synchronously (or route it so that it has
    /// been applied by the time this returns `true`); returning `false`
    /// makes the watcher force-remove the entry locally instead.
    fn synthesize_removal(&self, key: IconKey) -> bool;
}
