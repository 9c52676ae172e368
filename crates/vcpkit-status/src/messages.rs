//! Error/message channel classification.
//!
//! The controller publishes operator-facing messages on a channel separate
//! from the status record. Each entry carries a class tag; error classes
//! surface as `MachineError` events and text/display classes as
//! `MachineMessage` events. Unknown classes are treated as errors so
//! nothing silently disappears.

use serde::{Deserialize, Serialize};

/// Class tag of one error-channel entry, as reported by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageClass {
    /// Hard error raised by the controller core.
    NmlError,
    /// Error raised by operator-facing task code.
    OperatorError,
    /// Plain text message from the controller core.
    NmlText,
    /// Plain text message from operator-facing task code.
    OperatorText,
    /// Display request from the controller core.
    NmlDisplay,
    /// Display request from operator-facing task code.
    OperatorDisplay,
    /// Unrecognized class tag.
    Other(i32),
}

/// Severity a classified entry is republished with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageSeverity {
    /// Operator must see this as an error.
    Error,
    /// Informational message.
    Message,
}

/// One undecoded entry popped from the controller's error channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawMessage {
    /// The entry's class tag.
    pub class: MessageClass,
    /// The entry's message text, possibly empty.
    pub text: String,
}

/// Placeholder shown when an entry arrives without usable text.
pub const UNKNOWN_ERROR_TEXT: &str = "Unknown error!";

/// Classify a raw entry into a severity and display text.
///
/// Empty or whitespace-only text is replaced with the fixed placeholder.
/// Unknown classes are logged and treated as errors, failing safe toward
/// visibility.
pub fn classify(message: RawMessage) -> (MessageSeverity, String) {
    let text = if message.text.trim().is_empty() {
        UNKNOWN_ERROR_TEXT.to_string()
    } else {
        message.text
    };

    let severity = match message.class {
        MessageClass::NmlError | MessageClass::OperatorError => MessageSeverity::Error,
        MessageClass::NmlText
        | MessageClass::OperatorText
        | MessageClass::NmlDisplay
        | MessageClass::OperatorDisplay => MessageSeverity::Message,
        MessageClass::Other(tag) => {
            tracing::warn!("Unknown error-channel class {}, treating as error", tag);
            MessageSeverity::Error
        }
    };

    (severity, text)
}
