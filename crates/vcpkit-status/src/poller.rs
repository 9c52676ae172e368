//! The poll driver.
//!
//! A tokio interval task calling [`StatusSync::cycle`] on a fixed cadence.
//! The engine sits behind a mutex the task holds for the whole cycle, so
//! cycles never overlap. The first poll failure stops the task; restarting
//! is an explicit [`StatusPoller::start`] call, never an internal retry.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::sync::StatusSync;

/// Configuration for the poll driver
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Cycle period in milliseconds.
    pub cycle_time_ms: u64,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self { cycle_time_ms: 75 }
    }
}

/// Interval task driving the synchronization engine
pub struct StatusPoller {
    sync: Arc<Mutex<StatusSync>>,
    config: PollerConfig,
    shutdown: Option<mpsc::Sender<()>>,
    handle: Option<JoinHandle<()>>,
    running: Arc<AtomicBool>,
}

impl StatusPoller {
    /// Wrap an engine in a poll driver
    pub fn new(sync: StatusSync, config: PollerConfig) -> Self {
        Self {
            sync: Arc::new(Mutex::new(sync)),
            config,
            shutdown: None,
            handle: None,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Shared handle to the engine
    pub fn sync(&self) -> Arc<Mutex<StatusSync>> {
        self.sync.clone()
    }

    /// Whether the poll task is currently running
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Start (or restart) periodic polling
    ///
    /// Clears the engine's halt latch, so the first cycle after a restart
    /// diffs against the last published baseline. A no-op if already
    /// running.
    pub fn start(&mut self) {
        if self.running.swap(true, Ordering::SeqCst) {
            return;
        }

        self.sync.lock().resume();

        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);
        self.shutdown = Some(shutdown_tx);

        let sync = self.sync.clone();
        let running = self.running.clone();
        let cycle_time = Duration::from_millis(self.config.cycle_time_ms.max(1));

        self.handle = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(cycle_time);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => break,
                    _ = ticker.tick() => {
                        // The lock is held for the whole cycle: no overlap.
                        let result = sync.lock().cycle();
                        if let Err(err) = result {
                            tracing::warn!("Status cycle failed, stopping poller: {}", err);
                            break;
                        }
                    }
                }
            }

            running.store(false, Ordering::SeqCst);
            tracing::debug!("Status poller stopped");
        }));

        tracing::info!("Status poller started ({}ms cycle)", cycle_time.as_millis());
    }

    /// Stop polling and wait for the task to finish
    ///
    /// An in-flight cycle always runs to completion first.
    pub async fn stop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(()).await;
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
        self.running.store(false, Ordering::SeqCst);
    }
}

impl std::fmt::Debug for StatusPoller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusPoller")
            .field("cycle_time_ms", &self.config.cycle_time_ms)
            .field("running", &self.is_running())
            .finish()
    }
}
