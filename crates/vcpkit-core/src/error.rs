//! Error handling for VCPKit
//!
//! Provides the error taxonomy for the status-synchronization engine:
//! - Poll errors (status provider unreachable or inconsistent)
//! - Subscriber errors (a notification callback failed)
//! - Queue drain errors (malformed error-channel entry)
//!
//! All error types use `thiserror` for ergonomic error handling. Poll
//! errors are fatal to the current cycle and halt the driver; subscriber
//! and queue-drain errors are contained where they occur.

use thiserror::Error;

/// Status poll error type
///
/// A failed poll aborts the cycle and halts automatic polling; resuming
/// is an explicit external action.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PollError {
    /// The status provider could not be reached
    #[error("Status provider unreachable: {reason}")]
    Unreachable {
        /// Why the provider could not be reached.
        reason: String,
    },

    /// The provider returned data the snapshot could not be built from
    #[error("Status provider returned inconsistent data: {reason}")]
    Inconsistent {
        /// What was inconsistent about the data.
        reason: String,
    },

    /// The engine is halted after an earlier poll failure
    #[error("Polling halted after earlier failure; resume explicitly")]
    Halted,
}

/// A notification callback failed
///
/// Isolated per subscriber: logged, never aborts the cycle or affects
/// delivery to other subscribers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Subscriber failed: {reason}")]
pub struct SubscriberError {
    /// Why the subscriber rejected the event.
    pub reason: String,
}

impl SubscriberError {
    /// Create a subscriber error from a message
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Error-channel drain error type
///
/// Downgraded to a placeholder-text machine error event, never a crash.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueueDrainError {
    /// The error channel returned an entry that could not be decoded
    #[error("Malformed error-channel entry: {reason}")]
    Malformed {
        /// Why the entry could not be decoded.
        reason: String,
    },
}

/// Top-level error type aggregating all VCPKit error domains
#[derive(Error, Debug)]
pub enum Error {
    /// Status poll error
    #[error(transparent)]
    Poll(#[from] PollError),

    /// Subscriber callback error
    #[error(transparent)]
    Subscriber(#[from] SubscriberError),

    /// Error-channel drain error
    #[error(transparent)]
    QueueDrain(#[from] QueueDrainError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a poll error
    pub fn is_poll_error(&self) -> bool {
        matches!(self, Error::Poll(_))
    }

    /// Check if this is a subscriber error
    pub fn is_subscriber_error(&self) -> bool {
        matches!(self, Error::Subscriber(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poll_error_display() {
        let err = PollError::Unreachable {
            reason: "controller not running".into(),
        };
        assert_eq!(
            err.to_string(),
            "Status provider unreachable: controller not running"
        );
    }

    #[test]
    fn test_umbrella_conversion() {
        let err: Error = PollError::Halted.into();
        assert!(err.is_poll_error());
        assert!(!err.is_subscriber_error());

        let err: Error = SubscriberError::new("widget gone").into();
        assert!(err.is_subscriber_error());
    }

    #[test]
    fn test_other_error() {
        let err = Error::other("something odd");
        assert_eq!(err.to_string(), "something odd");
    }
}
