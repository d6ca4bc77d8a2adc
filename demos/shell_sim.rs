//! Headless shell simulation.
//!
//! Registers a few icons owned by this very process, pushes balloon
//! notifications through the scheduler, and drives the host timers by
//! hand so the whole balloon lifecycle plays out in the terminal.
//!
//! Run with:
//! ```text
//! cargo run --example shell_sim --features logging
//! ```

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use log::info;

use syspager::{
    spawn_listener, AddIcon, BalloonIcon, BalloonRequest, IconFields, IconKey, LogWriter,
    PagerConfig, ShellHost, SysPager, TimerToken, PROTOCOL_VERSION,
};

/// Host that renders to the log and queues timer fires for manual driving.
struct SimHost {
    next_timer: AtomicU64,
    pending: Mutex<VecDeque<(TimerToken, Duration)>>,
}

impl SimHost {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            next_timer: AtomicU64::new(1),
            pending: Mutex::new(VecDeque::new()),
        })
    }

    /// Takes the next timer due to fire, if any.
    fn pop_timer(&self) -> Option<(TimerToken, Duration)> {
        self.pending.lock().unwrap().pop_front()
    }
}

impl ShellHost for SimHost {
    fn visible_count_changed(&self, visible: usize) {
        info!("shell: relayout for {visible} visible icons");
    }

    fn show_balloon(&self, anchor: IconKey, request: &BalloonRequest, timeout: Duration) {
        info!(
            "shell: balloon at {anchor} for {timeout:?}: \"{}: {}\"",
            request.info.title, request.info.text
        );
    }

    fn hide_balloon(&self) {
        info!("shell: balloon hidden");
    }

    fn focus_icon(&self, key: IconKey) {
        info!("shell: focus moved to {key}");
    }

    fn arm_timer(&self, after: Duration) -> TimerToken {
        let token = TimerToken(self.next_timer.fetch_add(1, Ordering::SeqCst));
        self.pending.lock().unwrap().push_back((token, after));
        token
    }

    fn cancel_timer(&self, timer: TimerToken) {
        self.pending.lock().unwrap().retain(|(t, _)| *t != timer);
    }

    fn synthesize_removal(&self, key: IconKey) -> bool {
        info!("shell: owner of {key} died; removal request synthesized");
        false
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let host = SimHost::new();
    let pager = SysPager::new(PagerConfig::default(), host.clone() as Arc<dyn ShellHost>);
    let listener = spawn_listener(pager.bus(), Arc::new(LogWriter));

    // This process owns every icon, so the watcher has live owners to watch.
    let pid = std::process::id();
    let volume = IconKey::new(0x10, 1);
    let network = IconKey::new(0x10, 2);
    let updates = IconKey::new(0x20, 1);

    pager.add_icon(AddIcon {
        key: volume,
        pid,
        fields: IconFields {
            tooltip: Some("Volume: 40%".into()),
            ..IconFields::default()
        },
    })?;
    pager.add_icon(AddIcon {
        key: network,
        pid,
        fields: IconFields {
            tooltip: Some("Connected".into()),
            ..IconFields::default()
        },
    })?;
    pager.add_icon(AddIcon {
        key: updates,
        pid,
        fields: IconFields::default(),
    })?;
    pager.set_version(volume, PROTOCOL_VERSION)?;
    info!("tooltip for {volume}: {:?}", pager.tooltip(volume));

    // Three balloons arrive back to back; only the first shows, the rest
    // queue behind it.
    pager.update_icon(
        volume,
        IconFields::info("Volume", "Muted by keyboard shortcut", Duration::from_secs(10)),
    )?;
    pager.update_icon(
        network,
        IconFields::info("Network", "Wi-Fi signal is weak", Duration::from_secs(5)),
    )?;
    let mut updates_info =
        IconFields::info("Updates", "3 updates ready to install", Duration::from_secs(60));
    if let Some(info) = updates_info.info.as_mut() {
        info.icon = BalloonIcon::Info;
    }
    pager.update_icon(updates, updates_info)?;

    // Drain the timer queue: every fire either closes the current balloon
    // or, after the cooldown, promotes the next one.
    while let Some((token, after)) = host.pop_timer() {
        info!("sim: timer {token:?} fires (was armed for {after:?})");
        pager.on_timer(token);
    }

    pager.set_focus(network)?;
    pager.remove_icon(updates)?;
    pager.remove_icon(network)?;
    pager.remove_icon(volume)?;

    pager.shutdown().await;
    drop(listener);
    Ok(())
}
