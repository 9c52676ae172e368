//! Status provider seam.
//!
//! [`StatusProvider`] is the trait the engine polls against; a concrete
//! implementation wraps the real controller's status channel. The crate
//! ships [`SimStatusProvider`], a scriptable in-memory provider used by
//! tests and the demo binary.

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

use vcpkit_core::{PollError, QueueDrainError, StatusRecord};

use crate::messages::RawMessage;

/// Read access to a machine controller's published state.
///
/// `poll` must not mutate machine state; it re-reads the remote status
/// record and returns one consistent copy. A failed poll must fail
/// cleanly: the engine halts further cycles and retry is the caller's
/// decision, never the provider's.
pub trait StatusProvider: Send {
    /// Acquire one consistent snapshot of the controller's status.
    fn poll(&mut self) -> Result<StatusRecord, PollError>;

    /// Pop one pending entry from the controller's error channel, if any.
    fn poll_message(&mut self) -> Result<Option<RawMessage>, QueueDrainError>;
}

#[derive(Debug, Default)]
struct SimState {
    record: StatusRecord,
    messages: VecDeque<Result<RawMessage, QueueDrainError>>,
    unreachable: bool,
    polls: usize,
}

/// Scriptable in-memory status provider.
///
/// Cloning shares the underlying state, so a test or demo driver can keep
/// one handle to mutate the "machine" while the engine polls another.
#[derive(Debug, Clone, Default)]
pub struct SimStatusProvider {
    state: Arc<Mutex<SimState>>,
}

impl SimStatusProvider {
    /// Create a provider publishing the default status record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a provider publishing the given initial record.
    pub fn with_record(record: StatusRecord) -> Self {
        let provider = Self::new();
        provider.state.lock().record = record;
        provider
    }

    /// Mutate the published status record in place.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut StatusRecord),
    {
        f(&mut self.state.lock().record);
    }

    /// Current published record.
    pub fn record(&self) -> StatusRecord {
        self.state.lock().record.clone()
    }

    /// Queue a message on the simulated error channel.
    pub fn push_message(&self, message: RawMessage) {
        self.state.lock().messages.push_back(Ok(message));
    }

    /// Queue a malformed entry on the simulated error channel.
    pub fn push_malformed(&self, reason: impl Into<String>) {
        self.state
            .lock()
            .messages
            .push_back(Err(QueueDrainError::Malformed {
                reason: reason.into(),
            }));
    }

    /// Make subsequent polls fail (or succeed again).
    pub fn set_unreachable(&self, unreachable: bool) {
        self.state.lock().unreachable = unreachable;
    }

    /// Number of successful polls served so far.
    pub fn poll_count(&self) -> usize {
        self.state.lock().polls
    }
}

impl StatusProvider for SimStatusProvider {
    fn poll(&mut self) -> Result<StatusRecord, PollError> {
        let mut state = self.state.lock();
        if state.unreachable {
            return Err(PollError::Unreachable {
                reason: "simulated controller not running".into(),
            });
        }
        state.polls += 1;
        Ok(state.record.clone())
    }

    fn poll_message(&mut self) -> Result<Option<RawMessage>, QueueDrainError> {
        match self.state.lock().messages.pop_front() {
            Some(Ok(message)) => Ok(Some(message)),
            Some(Err(err)) => Err(err),
            None => Ok(None),
        }
    }
}
