//! # Process liveness monitoring.
//!
//! [`ProcessMonitor`] abstracts "open a process for watching" and "wait
//! until it exits" behind a trait, so the watch loop can run against the
//! real system in production and against a scripted monitor in tests.
//!
//! [`SystemMonitor`] is the production implementation. It has no OS wait
//! primitive to lean on, so it polls the process table at a fixed
//! interval; a poll miss is the exit signal.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use sysinfo::{Pid, System};

use crate::error::WatchError;

/// Opened reference to a watched owner process.
///
/// Holding a handle does not keep the process alive; it only records
/// which pid an entry is bound to. Handles are obtained from
/// [`ProcessMonitor::open`] and dropped with their registry entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessHandle {
    pid: u32,
}

impl ProcessHandle {
    /// Wraps a pid. Normally called by a [`ProcessMonitor`] after it has
    /// verified the process exists.
    pub fn new(pid: u32) -> Self {
        Self { pid }
    }

    /// The wrapped process id.
    pub fn pid(&self) -> u32 {
        self.pid
    }
}

/// Source of process liveness information.
#[async_trait]
pub trait ProcessMonitor: Send + Sync + 'static {
    /// Opens `pid` for watching.
    ///
    /// Fails if the process does not exist or cannot be observed; an
    /// icon whose owner cannot be opened is rejected outright.
    fn open(&self, pid: u32) -> Result<ProcessHandle, WatchError>;

    /// Resolves when the process behind `handle` has exited.
    ///
    /// Resolving `Ok` for an already-dead process is expected (exits may
    /// race the open). An `Err` whose [`WatchError::is_fatal`] is true
    /// tears the whole watch loop down.
    async fn wait_exit(&self, handle: &ProcessHandle) -> Result<(), WatchError>;
}

/// Polling monitor backed by the system process table.
pub struct SystemMonitor {
    system: Mutex<System>,
    poll_interval: Duration,
}

impl SystemMonitor {
    /// Creates a monitor polling at the given interval.
    pub fn new(poll_interval: Duration) -> Self {
        Self {
            system: Mutex::new(System::new()),
            poll_interval,
        }
    }

    /// Refreshes one process entry; false means the process is gone.
    ///
    /// The lock is scoped to the refresh so it is never held across an
    /// `.await` in [`Self::wait_exit`].
    fn refresh(&self, pid: Pid) -> bool {
        self.system
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .refresh_process(pid)
    }
}

#[async_trait]
impl ProcessMonitor for SystemMonitor {
    fn open(&self, pid: u32) -> Result<ProcessHandle, WatchError> {
        if self.refresh(Pid::from_u32(pid)) {
            Ok(ProcessHandle::new(pid))
        } else {
            Err(WatchError::ProcessGone { pid })
        }
    }

    async fn wait_exit(&self, handle: &ProcessHandle) -> Result<(), WatchError> {
        let pid = Pid::from_u32(handle.pid());
        while self.refresh(pid) {
            tokio::time::sleep(self.poll_interval).await;
        }
        Ok(())
    }
}
