//! # Global configuration for the tray pager runtime.
//!
//! Provides [`PagerConfig`] — centralized settings for the registry,
//! watcher, and balloon scheduler.
//!
//! The config is consumed once by [`SysPager::new`](crate::SysPager::new)
//! (or `with_monitor`); the pager hands the relevant knobs to each
//! component at construction.
//!
//! ## Sentinel values
//! - `watch_limit = 0` → no owner is liveness-monitored (icons still register)
//! - `bus_capacity` below 1 is clamped to 1 by the bus

use std::time::Duration;

/// Global configuration for the tray pager.
///
/// Defines:
/// - **Watch bound**: how many owner processes the watcher monitors
/// - **Balloon timing**: display clamp and inter-balloon cooldown
/// - **Monitor cadence**: poll interval for the sysinfo-backed monitor
/// - **Event system**: bus capacity for observability events
///
/// ## Field semantics
/// - `watch_limit`: entries past this bound stay registered and visible but
///   are not liveness-monitored (documented degradation, not an error)
/// - `min_timeout` / `max_timeout`: every balloon's display duration is
///   clamped into this range regardless of the caller-supplied value
/// - `cooldown`: minimum gap between consecutive balloons
/// - `poll_interval`: how often [`SystemMonitor`](crate::SystemMonitor)
///   re-checks a watched process
/// - `bus_capacity`: event bus ring buffer size (min 1; clamped by Bus)
#[derive(Clone, Debug)]
pub struct PagerConfig {
    /// Maximum number of owner processes watched concurrently.
    ///
    /// The default of 63 preserves the classic 64-object multi-wait bound
    /// with one slot reserved for the wake signal.
    pub watch_limit: usize,

    /// Lower bound for balloon display time.
    pub min_timeout: Duration,

    /// Upper bound for balloon display time.
    pub max_timeout: Duration,

    /// Settling gap enforced between consecutive balloons.
    pub cooldown: Duration,

    /// Poll cadence for the sysinfo-backed process monitor.
    pub poll_interval: Duration,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Slow subscribers that lag behind more than `bus_capacity` events
    /// receive `Lagged` and skip older items.
    pub bus_capacity: usize,
}

impl PagerConfig {
    /// Clamps a caller-supplied balloon timeout into `[min_timeout, max_timeout]`.
    #[inline]
    pub fn clamp_timeout(&self, requested: Duration) -> Duration {
        requested.clamp(self.min_timeout, self.max_timeout)
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for PagerConfig {
    /// Default configuration:
    ///
    /// - `watch_limit = 63` (64-object wait bound minus the wake slot)
    /// - `min_timeout = 10s`, `max_timeout = 30s` (classic balloon clamp)
    /// - `cooldown = 2s` (anti-flicker gap between balloons)
    /// - `poll_interval = 250ms`
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            watch_limit: 63,
            min_timeout: Duration::from_secs(10),
            max_timeout: Duration::from_secs(30),
            cooldown: Duration::from_secs(2),
            poll_interval: Duration::from_millis(250),
            bus_capacity: 1024,
        }
    }
}
