//! Test doubles shared across the crate's unit tests.
//!
//! - [`RecordingHost`] — a [`ShellHost`] that records every call and hands
//!   out sequential timer tokens, with knobs for the synthesized-removal
//!   outcome.
//! - [`FakeMonitor`] — a scripted [`ProcessMonitor`] whose processes are
//!   launched, terminated, or broken explicitly from the test body.
//! - [`settle`] — yields the current task enough times for spawned loops
//!   to observe pending signals.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;

use crate::balloons::BalloonRequest;
use crate::error::WatchError;
use crate::host::{ShellHost, TimerToken};
use crate::registry::IconKey;
use crate::watcher::{ProcessHandle, ProcessMonitor};

/// One recorded host interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum HostCall {
    Relayout(usize),
    Show {
        key: IconKey,
        text: String,
        timeout: Duration,
    },
    Hide,
    Focus(IconKey),
    Armed(TimerToken, Duration),
    Cancelled(TimerToken),
    Removal(IconKey),
}

type RemovalHook = Box<dyn Fn(IconKey) -> bool + Send + Sync>;

/// Shell host double that records calls instead of rendering.
pub(crate) struct RecordingHost {
    calls: Mutex<Vec<HostCall>>,
    next_timer: AtomicU64,
    deliverable: AtomicBool,
    on_removal: Mutex<Option<RemovalHook>>,
}

impl RecordingHost {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            next_timer: AtomicU64::new(1),
            deliverable: AtomicBool::new(true),
            on_removal: Mutex::new(None),
        })
    }

    /// Fixes the outcome of every synthesized removal.
    pub(crate) fn set_deliverable(&self, deliverable: bool) {
        self.deliverable.store(deliverable, Ordering::SeqCst);
    }

    /// Runs `hook` for every synthesized removal; its return value is the
    /// delivery outcome. Takes precedence over [`Self::set_deliverable`].
    pub(crate) fn set_on_removal(&self, hook: impl Fn(IconKey) -> bool + Send + Sync + 'static) {
        *lock(&self.on_removal) = Some(Box::new(hook));
    }

    pub(crate) fn calls(&self) -> Vec<HostCall> {
        lock(&self.calls).clone()
    }

    pub(crate) fn shown_keys(&self) -> Vec<IconKey> {
        lock(&self.calls)
            .iter()
            .filter_map(|c| match c {
                HostCall::Show { key, .. } => Some(*key),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn shown_texts(&self) -> Vec<String> {
        lock(&self.calls)
            .iter()
            .filter_map(|c| match c {
                HostCall::Show { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn hide_count(&self) -> usize {
        lock(&self.calls)
            .iter()
            .filter(|c| matches!(c, HostCall::Hide))
            .count()
    }

    /// The most recently armed timer, if any.
    pub(crate) fn last_armed(&self) -> Option<(TimerToken, Duration)> {
        lock(&self.calls).iter().rev().find_map(|c| match c {
            HostCall::Armed(token, after) => Some((*token, *after)),
            _ => None,
        })
    }

    pub(crate) fn removals(&self) -> Vec<IconKey> {
        lock(&self.calls)
            .iter()
            .filter_map(|c| match c {
                HostCall::Removal(key) => Some(*key),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn relayouts(&self) -> Vec<usize> {
        lock(&self.calls)
            .iter()
            .filter_map(|c| match c {
                HostCall::Relayout(n) => Some(*n),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: HostCall) {
        lock(&self.calls).push(call);
    }
}

impl ShellHost for RecordingHost {
    fn visible_count_changed(&self, visible: usize) {
        self.record(HostCall::Relayout(visible));
    }

    fn show_balloon(&self, anchor: IconKey, request: &BalloonRequest, timeout: Duration) {
        self.record(HostCall::Show {
            key: anchor,
            text: request.info.text.clone(),
            timeout,
        });
    }

    fn hide_balloon(&self) {
        self.record(HostCall::Hide);
    }

    fn focus_icon(&self, key: IconKey) {
        self.record(HostCall::Focus(key));
    }

    fn arm_timer(&self, after: Duration) -> TimerToken {
        let token = TimerToken(self.next_timer.fetch_add(1, Ordering::SeqCst));
        self.record(HostCall::Armed(token, after));
        token
    }

    fn cancel_timer(&self, timer: TimerToken) {
        self.record(HostCall::Cancelled(timer));
    }

    fn synthesize_removal(&self, key: IconKey) -> bool {
        self.record(HostCall::Removal(key));
        if let Some(hook) = lock(&self.on_removal).as_ref() {
            return hook(key);
        }
        self.deliverable.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProcState {
    Alive,
    Exited,
    Broken,
}

/// Scripted process monitor. Processes change state only when the test
/// says so, through watch channels, so no polling interval is involved.
pub(crate) struct FakeMonitor {
    procs: Mutex<HashMap<u32, watch::Sender<ProcState>>>,
}

impl FakeMonitor {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            procs: Mutex::new(HashMap::new()),
        })
    }

    /// Brings a pid to life. Until this is called, `open` rejects it.
    pub(crate) fn launch(&self, pid: u32) {
        let (tx, _) = watch::channel(ProcState::Alive);
        lock(&self.procs).insert(pid, tx);
    }

    /// Exits the process; pending and future waits resolve `Ok`.
    ///
    /// `send_replace` stores the state even with no receiver subscribed,
    /// so an exit while the pid is unwatched is seen by a later wait.
    pub(crate) fn terminate(&self, pid: u32) {
        if let Some(tx) = lock(&self.procs).get(&pid) {
            tx.send_replace(ProcState::Exited);
        }
    }

    /// Corrupts the wait; pending and future waits resolve with a fatal
    /// error.
    pub(crate) fn break_wait(&self, pid: u32) {
        if let Some(tx) = lock(&self.procs).get(&pid) {
            tx.send_replace(ProcState::Broken);
        }
    }
}

#[async_trait]
impl ProcessMonitor for FakeMonitor {
    fn open(&self, pid: u32) -> Result<ProcessHandle, WatchError> {
        match lock(&self.procs).get(&pid) {
            Some(tx) if *tx.borrow() == ProcState::Alive => Ok(ProcessHandle::new(pid)),
            _ => Err(WatchError::ProcessGone { pid }),
        }
    }

    async fn wait_exit(&self, handle: &ProcessHandle) -> Result<(), WatchError> {
        let pid = handle.pid();
        let mut rx = match lock(&self.procs).get(&pid) {
            Some(tx) => tx.subscribe(),
            // Never launched: an unknown process is a dead process.
            None => return Ok(()),
        };
        loop {
            let state = *rx.borrow_and_update();
            match state {
                ProcState::Exited => return Ok(()),
                ProcState::Broken => {
                    return Err(WatchError::WaitFailed {
                        pid,
                        reason: "simulated wait failure".into(),
                    })
                }
                ProcState::Alive => {}
            }
            if rx.changed().await.is_err() {
                return Ok(());
            }
        }
    }
}

/// Yields until spawned loops have had a chance to run.
pub(crate) async fn settle() {
    for _ in 0..32 {
        tokio::task::yield_now().await;
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_exit_without_a_waiter_is_not_lost() {
        let monitor = FakeMonitor::new();
        monitor.launch(7);
        let handle = monitor.open(7).unwrap();

        // Nobody is waiting yet; the exit must still be recorded.
        monitor.terminate(7);
        monitor.wait_exit(&handle).await.unwrap();
    }

    #[tokio::test]
    async fn test_broken_wait_is_sticky() {
        let monitor = FakeMonitor::new();
        monitor.launch(9);
        let handle = monitor.open(9).unwrap();

        monitor.break_wait(9);
        let err = monitor.wait_exit(&handle).await.unwrap_err();
        assert!(err.is_fatal());
    }
}
