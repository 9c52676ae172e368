//! The synchronization engine.
//!
//! [`StatusSync`] owns the provider, the comparison baseline, and the
//! shared latest-snapshot cell. One [`StatusSync::cycle`] call is one
//! poll → diff → dispatch → message-drain pass; the poll driver calls it
//! on a fixed cadence and never overlaps cycles.

use parking_lot::RwLock;
use std::sync::Arc;

use vcpkit_core::{PollError, StatusEvent, StatusRecord};

use crate::diff::{diff_joints, diff_records};
use crate::dispatch::StatusDispatcher;
use crate::messages::{classify, MessageSeverity, UNKNOWN_ERROR_TEXT};
use crate::provider::StatusProvider;

/// Default number of error-channel entries drained per cycle.
///
/// One-per-cycle (the naive approach) starves under bursts; unbounded
/// draining lets a chattering controller stall the cycle. The cap bounds
/// both.
pub const DEFAULT_ERROR_DRAIN_LIMIT: usize = 8;

/// Shared handle to the latest successfully published snapshot.
///
/// Written once per successful cycle before dispatch begins, so handlers
/// invoked during that cycle always read the values being published.
#[derive(Debug, Clone, Default)]
pub struct SnapshotCell {
    inner: Arc<RwLock<StatusRecord>>,
}

impl SnapshotCell {
    /// Create a cell holding the given record.
    pub fn new(record: StatusRecord) -> Self {
        Self {
            inner: Arc::new(RwLock::new(record)),
        }
    }

    /// Clone out the latest snapshot.
    pub fn latest(&self) -> StatusRecord {
        self.inner.read().clone()
    }

    /// Read the latest snapshot without cloning.
    pub fn with<R>(&self, f: impl FnOnce(&StatusRecord) -> R) -> R {
        f(&self.inner.read())
    }

    pub(crate) fn store(&self, record: StatusRecord) {
        *self.inner.write() = record;
    }
}

/// Counters from one completed cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Top-level field changes dispatched.
    pub field_changes: usize,
    /// Per-joint attribute changes dispatched.
    pub joint_changes: usize,
    /// Error-channel entries drained.
    pub messages: usize,
}

/// The poll-diff-dispatch engine.
///
/// Constructed once in the composition root and handed to the poll driver;
/// consumers get the [`StatusDispatcher`] and [`SnapshotCell`] handles.
pub struct StatusSync {
    provider: Box<dyn StatusProvider>,
    dispatcher: Arc<StatusDispatcher>,
    snapshot: SnapshotCell,
    previous: StatusRecord,
    halted: bool,
    error_drain_limit: usize,
}

impl StatusSync {
    /// Create an engine around a provider and dispatcher.
    ///
    /// Performs one best-effort poll to seed the comparison baseline, so
    /// the first driven cycle reports real changes rather than the whole
    /// record. A failed seed poll is logged, not fatal.
    pub fn new(provider: impl StatusProvider + 'static, dispatcher: Arc<StatusDispatcher>) -> Self {
        let mut provider = Box::new(provider);
        let previous = match provider.poll() {
            Ok(record) => record,
            Err(err) => {
                tracing::warn!("Initial status poll failed, starting from defaults: {}", err);
                StatusRecord::default()
            }
        };

        Self {
            snapshot: SnapshotCell::new(previous.clone()),
            provider,
            dispatcher,
            previous,
            halted: false,
            error_drain_limit: DEFAULT_ERROR_DRAIN_LIMIT,
        }
    }

    /// Cap the number of error-channel entries drained per cycle.
    pub fn with_error_drain_limit(mut self, limit: usize) -> Self {
        self.error_drain_limit = limit.max(1);
        self
    }

    /// The dispatcher events flow through.
    pub fn dispatcher(&self) -> Arc<StatusDispatcher> {
        self.dispatcher.clone()
    }

    /// Handle to the latest published snapshot.
    pub fn snapshot(&self) -> SnapshotCell {
        self.snapshot.clone()
    }

    /// Whether a poll failure has latched the engine halted.
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Clear the halt latch so cycles may run again.
    ///
    /// The existing baseline is kept: the first cycle after resuming diffs
    /// against the last published snapshot, so there is no event replay
    /// and no gap events.
    pub fn resume(&mut self) {
        self.halted = false;
    }

    /// Run one poll → diff → dispatch → drain pass.
    ///
    /// On a poll failure the halt latch is set and every subsequent call
    /// returns [`PollError::Halted`] until [`StatusSync::resume`]; the
    /// baseline and snapshot keep their last published values, so no
    /// spurious changes fire on resume.
    pub fn cycle(&mut self) -> Result<CycleReport, PollError> {
        if self.halted {
            return Err(PollError::Halted);
        }

        let current = match self.provider.poll() {
            Ok(record) => record,
            Err(err) => {
                tracing::warn!("Status polling failed, is the controller running? {}", err);
                self.halted = true;
                return Err(err);
            }
        };

        let field_changes = diff_records(&self.previous, &current);
        let joint_changes = diff_joints(&self.previous.joints, &current.joints);

        // Publish the snapshot before dispatching so handlers reading the
        // cell see the values the events describe.
        self.snapshot.store(current.clone());
        self.previous = current;

        for change in field_changes.iter().cloned() {
            self.dispatcher.publish(&change.into());
        }
        for change in joint_changes.iter().cloned() {
            self.dispatcher.publish(&change.into());
        }

        let messages = self.drain_messages();

        Ok(CycleReport {
            field_changes: field_changes.len(),
            joint_changes: joint_changes.len(),
            messages,
        })
    }

    /// Force-republish every field's current value for late subscribers.
    pub fn publish_all(&self) {
        self.dispatcher.publish_all(&self.snapshot.latest());
    }

    fn drain_messages(&mut self) -> usize {
        let mut drained = 0;
        while drained < self.error_drain_limit {
            let event = match self.provider.poll_message() {
                Ok(None) => break,
                Ok(Some(message)) => match classify(message) {
                    (MessageSeverity::Error, text) => {
                        tracing::error!("{}", text);
                        StatusEvent::MachineError(text)
                    }
                    (MessageSeverity::Message, text) => {
                        tracing::info!("{}", text);
                        StatusEvent::MachineMessage(text)
                    }
                },
                Err(err) => {
                    tracing::warn!("Dropping malformed error-channel entry: {}", err);
                    StatusEvent::MachineError(UNKNOWN_ERROR_TEXT.to_string())
                }
            };
            self.dispatcher.publish(&event);
            drained += 1;
        }
        drained
    }
}

impl std::fmt::Debug for StatusSync {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusSync")
            .field("halted", &self.halted)
            .field("error_drain_limit", &self.error_drain_limit)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::ChannelFilter;
    use crate::messages::{MessageClass, RawMessage};
    use crate::provider::SimStatusProvider;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use vcpkit_core::{StatusChannel, StatusField};

    fn engine(provider: &SimStatusProvider) -> StatusSync {
        StatusSync::new(provider.clone(), Arc::new(StatusDispatcher::new()))
    }

    #[test]
    fn test_quiet_cycle_publishes_nothing() {
        let provider = SimStatusProvider::new();
        let mut sync = engine(&provider);

        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        sync.dispatcher().subscribe(ChannelFilter::All, move |_| {
            c.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        let report = sync.cycle().expect("cycle");
        assert_eq!(report, CycleReport::default());
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_change_flows_to_subscriber_once() {
        let provider = SimStatusProvider::new();
        let mut sync = engine(&provider);

        let seen: Arc<Mutex<Vec<StatusEvent>>> = Arc::default();
        let s = seen.clone();
        sync.dispatcher()
            .subscribe_channel(StatusChannel::Field(StatusField::Paused), move |event| {
                s.lock().push(event.clone());
                Ok(())
            });

        provider.update(|record| record.paused = true);
        let report = sync.cycle().expect("cycle");
        assert_eq!(report.field_changes, 1);
        assert_eq!(seen.lock().len(), 1);

        // Unchanged next cycle: nothing more.
        sync.cycle().expect("cycle");
        assert_eq!(seen.lock().len(), 1);
    }

    #[test]
    fn test_poll_failure_halts_until_resume() {
        let provider = SimStatusProvider::new();
        let mut sync = engine(&provider);

        provider.set_unreachable(true);
        assert!(matches!(
            sync.cycle(),
            Err(PollError::Unreachable { .. })
        ));
        assert!(sync.is_halted());

        // Subsequent cycles fail fast without touching the provider.
        let polls_before = provider.poll_count();
        assert_eq!(sync.cycle(), Err(PollError::Halted));
        assert_eq!(sync.cycle(), Err(PollError::Halted));
        assert_eq!(provider.poll_count(), polls_before);

        provider.set_unreachable(false);
        sync.resume();
        assert!(sync.cycle().is_ok());
    }

    #[test]
    fn test_failed_poll_keeps_baseline() {
        let provider = SimStatusProvider::new();
        let mut sync = engine(&provider);

        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        sync.dispatcher()
            .subscribe_channel(StatusChannel::Field(StatusField::Flood), move |_| {
                c.fetch_add(1, Ordering::SeqCst);
                Ok(())
            });

        // Change lands while the provider is down.
        provider.update(|record| record.flood = true);
        provider.set_unreachable(true);
        assert!(sync.cycle().is_err());
        assert_eq!(count.load(Ordering::SeqCst), 0);

        // After resume the change is still detected exactly once.
        provider.set_unreachable(false);
        sync.resume();
        sync.cycle().expect("cycle");
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_message_drain_respects_limit() {
        let provider = SimStatusProvider::new();
        let mut sync =
            StatusSync::new(provider.clone(), Arc::new(StatusDispatcher::new()))
                .with_error_drain_limit(2);

        for i in 0..5 {
            provider.push_message(RawMessage {
                class: MessageClass::OperatorText,
                text: format!("note {}", i),
            });
        }

        assert_eq!(sync.cycle().expect("cycle").messages, 2);
        assert_eq!(sync.cycle().expect("cycle").messages, 2);
        assert_eq!(sync.cycle().expect("cycle").messages, 1);
    }

    #[test]
    fn test_malformed_entry_becomes_placeholder_error() {
        let provider = SimStatusProvider::new();
        let mut sync = engine(&provider);

        let seen: Arc<Mutex<Vec<String>>> = Arc::default();
        let s = seen.clone();
        sync.dispatcher()
            .subscribe_channel(StatusChannel::MachineError, move |event| {
                if let StatusEvent::MachineError(text) = event {
                    s.lock().push(text.clone());
                }
                Ok(())
            });

        provider.push_malformed("truncated frame");
        sync.cycle().expect("cycle");
        assert_eq!(seen.lock().as_slice(), [UNKNOWN_ERROR_TEXT]);
    }

    #[test]
    fn test_snapshot_cell_tracks_published_values() {
        let provider = SimStatusProvider::new();
        let mut sync = engine(&provider);
        let cell = sync.snapshot();

        provider.update(|record| record.current_line = 42);
        sync.cycle().expect("cycle");
        assert_eq!(cell.latest().current_line, 42);
        assert_eq!(cell.with(|record| record.current_line), 42);
    }
}
