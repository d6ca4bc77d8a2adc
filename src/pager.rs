//! # SysPager: the inbound dispatch surface.
//!
//! [`SysPager`] owns the three cooperating parts and routes every
//! inbound request to the right one:
//!
//! ```text
//!                    ┌──────────────────────────────┐
//!   add / update /   │           SysPager           │
//!   remove / focus ─►│  ┌────────────┐ ┌──────────┐ │
//!   / version        │  │ IconRegistry│ │ Balloon  │ │──► ShellHost
//!                    │  └─────▲──────┘ │  Queue   │ │    (relayout,
//!   timer fires ────►│        │ wake   └──────────┘ │     popups,
//!                    │  ┌─────┴──────┐              │     timers)
//!                    │  │ IconWatcher │ (background) │
//!                    │  └────────────┘              │
//!                    └──────────────────────────────┘
//! ```
//!
//! ## Rules
//! - Every mutation validates against the registry first; a failed
//!   request changes nothing and is reported as a [`TrayError`].
//! - An icon is only accepted if its owner process can be opened for
//!   liveness monitoring.
//! - Relayout callbacks fire only when the visible count actually
//!   changed.
//! - Focus and version requests are independent operations; neither
//!   implies the other.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::balloons::BalloonQueue;
use crate::config::PagerConfig;
use crate::error::TrayError;
use crate::events::{Bus, Event, EventKind};
use crate::host::{ShellHost, TimerToken};
use crate::registry::{IconFields, IconKey, IconRegistry};
use crate::watcher::{IconWatcher, ProcessMonitor, SystemMonitor};

/// Highest notify-protocol version this dispatcher speaks.
///
/// `set_version` accepts `0` (the legacy default) or this value and
/// rejects everything else.
pub const PROTOCOL_VERSION: u32 = 3;

/// An icon registration request.
#[derive(Debug, Clone)]
pub struct AddIcon {
    /// Identity of the new icon.
    pub key: IconKey,
    /// Pid of the owning process, to be liveness-monitored.
    pub pid: u32,
    /// Initial field values; unset fields take their defaults.
    pub fields: IconFields,
}

/// Tray core facade: registry, liveness watcher, and balloon scheduler
/// behind one dispatch surface.
pub struct SysPager {
    registry: Arc<IconRegistry>,
    balloons: Mutex<BalloonQueue>,
    watcher: IconWatcher,
    monitor: Arc<dyn ProcessMonitor>,
    host: Arc<dyn ShellHost>,
    bus: Bus,
}

impl SysPager {
    /// Creates a pager backed by the polling system monitor and spawns
    /// the liveness watcher on the current runtime.
    pub fn new(cfg: PagerConfig, host: Arc<dyn ShellHost>) -> Self {
        let monitor = Arc::new(SystemMonitor::new(cfg.poll_interval));
        Self::with_monitor(cfg, host, monitor)
    }

    /// Creates a pager over a caller-supplied monitor.
    pub fn with_monitor(
        cfg: PagerConfig,
        host: Arc<dyn ShellHost>,
        monitor: Arc<dyn ProcessMonitor>,
    ) -> Self {
        let bus = Bus::new(cfg.bus_capacity_clamped());
        let registry = Arc::new(IconRegistry::new(bus.clone()));
        let balloons = Mutex::new(BalloonQueue::new(
            Arc::clone(&registry),
            Arc::clone(&host),
            bus.clone(),
            cfg.min_timeout,
            cfg.max_timeout,
            cfg.cooldown,
        ));
        let watcher = IconWatcher::spawn(
            Arc::clone(&registry),
            Arc::clone(&monitor),
            Arc::clone(&host),
            bus.clone(),
            cfg.watch_limit,
        );
        Self {
            registry,
            balloons,
            watcher,
            monitor,
            host,
            bus,
        }
    }

    /// Registers a new icon.
    ///
    /// The owner process is opened for monitoring before anything is
    /// stored; an unopenable owner rejects the add outright.
    pub fn add_icon(&self, req: AddIcon) -> Result<(), TrayError> {
        let AddIcon { key, pid, fields } = req;
        let handle = self
            .monitor
            .open(pid)
            .map_err(|source| TrayError::OwnerUnavailable { pid, source })?;

        let hidden = fields
            .state
            .and_then(|s| s.hidden)
            .unwrap_or(false);
        let info = fields.info.clone();

        self.registry.add(key, pid, handle, fields)?;
        if !hidden {
            self.report_visibility();
        }
        if let Some(info) = info {
            self.balloons().update_info(key, &info);
        }
        Ok(())
    }

    /// Applies a partial update to a registered icon.
    ///
    /// Unknown keys are an error; an update never creates an entry.
    pub fn update_icon(&self, key: IconKey, fields: IconFields) -> Result<(), TrayError> {
        let info = fields.info.clone();
        let outcome = self.registry.update(key, fields)?;
        if outcome.visibility_changed {
            self.report_visibility();
        }
        if let Some(info) = info {
            self.balloons().update_info(key, &info);
        }
        Ok(())
    }

    /// Removes an icon and purges any balloon state for it.
    pub fn remove_icon(&self, key: IconKey) -> Result<(), TrayError> {
        let removed = self.registry.remove(key)?;
        self.balloons().remove_info(key);
        if removed.was_visible {
            self.report_visibility();
        }
        Ok(())
    }

    /// Asks the host to focus an icon.
    pub fn set_focus(&self, key: IconKey) -> Result<(), TrayError> {
        if !self.registry.contains(key) {
            return Err(TrayError::IconNotFound { key });
        }
        self.host.focus_icon(key);
        self.bus
            .publish(Event::new(EventKind::FocusRequested).with_key(key));
        Ok(())
    }

    /// Negotiates the notify-protocol version for an icon.
    pub fn set_version(&self, key: IconKey, version: u32) -> Result<(), TrayError> {
        if version != 0 && version != PROTOCOL_VERSION {
            return Err(TrayError::UnknownVersion { version });
        }
        self.registry.set_version(key, version)?;
        self.bus
            .publish(Event::new(EventKind::VersionChanged).with_key(key));
        Ok(())
    }

    /// Reports a host timer fire to the balloon scheduler. Returns false
    /// if the token matched nothing (late or duplicate fire).
    pub fn on_timer(&self, token: TimerToken) -> bool {
        self.balloons().on_timer(token)
    }

    /// Reports that the balloon popup dismissed itself.
    pub fn balloon_dismissed(&self) {
        self.balloons().close_current();
    }

    /// Current number of visible icons. O(1).
    pub fn visible_count(&self) -> usize {
        self.registry.visible_count()
    }

    /// Tooltip text for an icon, if registered.
    pub fn tooltip(&self, key: IconKey) -> Option<String> {
        self.registry.tooltip(key)
    }

    /// The shared registry, for read-only inspection.
    pub fn registry(&self) -> &Arc<IconRegistry> {
        &self.registry
    }

    /// The event bus; subscribe for observability.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Stops the balloon timer and tears the watcher down.
    pub async fn shutdown(self) {
        self.balloons().shutdown();
        self.watcher.shutdown().await;
    }

    fn balloons(&self) -> MutexGuard<'_, BalloonQueue> {
        self.balloons.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn report_visibility(&self) {
        let visible = self.registry.visible_count();
        self.host.visible_count_changed(visible);
        self.bus
            .publish(Event::new(EventKind::VisibilityChanged).with_visible(visible));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::StateFields;
    use crate::testing::{settle, FakeMonitor, HostCall, RecordingHost};
    use std::time::Duration;

    struct Fixture {
        pager: SysPager,
        monitor: Arc<FakeMonitor>,
        host: Arc<RecordingHost>,
    }

    fn fixture() -> Fixture {
        let monitor = FakeMonitor::new();
        let host = RecordingHost::new();
        let pager = SysPager::with_monitor(
            PagerConfig::default(),
            host.clone() as Arc<dyn ShellHost>,
            monitor.clone() as Arc<dyn ProcessMonitor>,
        );
        Fixture {
            pager,
            monitor,
            host,
        }
    }

    fn key(n: u32) -> IconKey {
        IconKey::new(0x300, n)
    }

    impl Fixture {
        fn add(&self, n: u32, pid: u32, fields: IconFields) -> Result<(), TrayError> {
            self.monitor.launch(pid);
            self.pager.add_icon(AddIcon {
                key: key(n),
                pid,
                fields,
            })
        }
    }

    #[tokio::test]
    async fn test_add_requires_openable_owner() {
        let f = fixture();
        // Pid 999 was never launched.
        let err = f
            .pager
            .add_icon(AddIcon {
                key: key(1),
                pid: 999,
                fields: IconFields::default(),
            })
            .unwrap_err();
        assert!(matches!(err, TrayError::OwnerUnavailable { pid: 999, .. }));
        assert_eq!(f.pager.visible_count(), 0);
        assert!(f.host.relayouts().is_empty());
    }

    #[tokio::test]
    async fn test_add_and_remove_report_relayout() {
        let f = fixture();
        f.add(1, 100, IconFields::default()).unwrap();
        f.add(2, 200, IconFields::default()).unwrap();
        assert_eq!(f.host.relayouts(), vec![1, 2]);

        f.pager.remove_icon(key(1)).unwrap();
        assert_eq!(f.host.relayouts(), vec![1, 2, 1]);
        assert_eq!(f.pager.visible_count(), 1);
    }

    #[tokio::test]
    async fn test_hidden_add_skips_relayout() {
        let f = fixture();
        f.add(
            1,
            100,
            IconFields {
                state: Some(StateFields {
                    hidden: Some(true),
                    shared: None,
                }),
                ..IconFields::default()
            },
        )
        .unwrap();
        assert!(f.host.relayouts().is_empty());

        // Unhiding is the visibility change.
        f.pager
            .update_icon(
                key(1),
                IconFields {
                    state: Some(StateFields {
                        hidden: Some(false),
                        shared: None,
                    }),
                    ..IconFields::default()
                },
            )
            .unwrap();
        assert_eq!(f.host.relayouts(), vec![1]);
    }

    #[tokio::test]
    async fn test_update_with_balloon_reaches_scheduler() {
        let f = fixture();
        f.add(1, 100, IconFields::default()).unwrap();
        f.pager
            .update_icon(
                key(1),
                IconFields::info("Update", "ready", Duration::from_secs(10)),
            )
            .unwrap();

        assert_eq!(f.host.shown_keys(), vec![key(1)]);
        assert_eq!(f.host.shown_texts(), vec!["ready"]);
    }

    #[tokio::test]
    async fn test_add_with_balloon_shows_immediately() {
        let f = fixture();
        f.add(
            1,
            100,
            IconFields::info("Hello", "world", Duration::from_secs(10)),
        )
        .unwrap();
        assert_eq!(f.host.shown_keys(), vec![key(1)]);
    }

    #[tokio::test]
    async fn test_remove_purges_showing_balloon() {
        let f = fixture();
        f.add(
            1,
            100,
            IconFields::info("Bye", "closing soon", Duration::from_secs(10)),
        )
        .unwrap();

        f.pager.remove_icon(key(1)).unwrap();
        assert_eq!(f.host.hide_count(), 1);
    }

    #[tokio::test]
    async fn test_timer_fire_drives_the_scheduler() {
        let f = fixture();
        f.add(
            1,
            100,
            IconFields::info("Tick", "tock", Duration::from_secs(10)),
        )
        .unwrap();

        let (token, _) = f.host.last_armed().unwrap();
        assert!(f.pager.on_timer(token));
        assert_eq!(f.host.hide_count(), 1);

        assert!(!f.pager.on_timer(token), "token was consumed");
    }

    #[tokio::test]
    async fn test_balloon_dismissed_skips_hide() {
        let f = fixture();
        f.add(
            1,
            100,
            IconFields::info("Pop", "goes the balloon", Duration::from_secs(10)),
        )
        .unwrap();

        f.pager.balloon_dismissed();
        assert_eq!(f.host.hide_count(), 0);
    }

    #[tokio::test]
    async fn test_focus_requires_registered_key() {
        let f = fixture();
        assert!(matches!(
            f.pager.set_focus(key(1)),
            Err(TrayError::IconNotFound { .. })
        ));

        f.add(1, 100, IconFields::default()).unwrap();
        f.pager.set_focus(key(1)).unwrap();
        assert!(f.host.calls().contains(&HostCall::Focus(key(1))));
    }

    #[tokio::test]
    async fn test_version_validation() {
        let f = fixture();
        f.add(1, 100, IconFields::default()).unwrap();

        assert!(matches!(
            f.pager.set_version(key(1), 2),
            Err(TrayError::UnknownVersion { version: 2 })
        ));
        f.pager.set_version(key(1), 0).unwrap();
        f.pager.set_version(key(1), PROTOCOL_VERSION).unwrap();
        assert_eq!(
            f.pager.registry().find(key(1)).unwrap().version,
            PROTOCOL_VERSION
        );
    }

    #[tokio::test]
    async fn test_tooltip_round_trips() {
        let f = fixture();
        f.add(
            1,
            100,
            IconFields {
                tooltip: Some("volume: 40%".into()),
                ..IconFields::default()
            },
        )
        .unwrap();
        assert_eq!(f.pager.tooltip(key(1)).as_deref(), Some("volume: 40%"));
        assert_eq!(f.pager.tooltip(key(2)), None);
    }

    #[tokio::test]
    async fn test_owner_death_flows_through_synthesized_removal() {
        let monitor = FakeMonitor::new();
        let host = RecordingHost::new();
        let pager = Arc::new(SysPager::with_monitor(
            PagerConfig::default(),
            host.clone() as Arc<dyn ShellHost>,
            monitor.clone() as Arc<dyn ProcessMonitor>,
        ));
        // A real shell routes synthesized removals back through the
        // dispatcher; mirror that wiring here.
        let dispatcher = Arc::clone(&pager);
        host.set_on_removal(move |key| dispatcher.remove_icon(key).is_ok());

        monitor.launch(100);
        pager
            .add_icon(AddIcon {
                key: key(1),
                pid: 100,
                fields: IconFields::default(),
            })
            .unwrap();
        settle().await;

        monitor.terminate(100);
        settle().await;

        assert_eq!(host.removals(), vec![key(1)]);
        assert!(!pager.registry().contains(key(1)));
        assert_eq!(pager.visible_count(), 0);
        assert_eq!(host.relayouts(), vec![1, 0]);
    }

    #[tokio::test]
    async fn test_shutdown_joins_the_watcher() {
        let f = fixture();
        f.add(1, 100, IconFields::default()).unwrap();
        f.pager.shutdown().await;
    }
}
