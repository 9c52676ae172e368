//! Event type definitions for the status dispatcher.
//!
//! Events are designed to be cloneable and serializable for logging/replay.
//! Every event maps to exactly one [`StatusChannel`], the key subscribers
//! register against.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::fields::{FieldValue, JointAttr, StatusField};
use crate::record::AxisVector;

/// One top-level field change produced by the diff pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldChange {
    /// The field that changed.
    pub field: StatusField,
    /// The field's new value.
    pub value: FieldValue,
}

/// One per-joint attribute change produced by the joint diff pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JointChange {
    /// Index of the joint the change belongs to.
    pub joint: usize,
    /// The attribute that changed.
    pub attr: JointAttr,
    /// The attribute's new value.
    pub value: FieldValue,
}

/// Consistent triple of derived axis positions, published as one event so
/// subscribers never see a torn absolute/relative/dtg combination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisPositionUpdate {
    /// Selected raw position vector (commanded or actual).
    pub absolute: AxisVector,
    /// Work-relative position after offset and rotation application.
    pub relative: AxisVector,
    /// Distance-to-go, passed through from the trajectory planner.
    pub dtg: AxisVector,
}

/// Subscription key: what a subscriber wants to be notified about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusChannel {
    /// One top-level status field.
    Field(StatusField),
    /// One per-joint attribute (any joint index).
    Joint(JointAttr),
    /// Derived axis position triple.
    AxisPositions,
    /// Derived joint position vector.
    JointPositions,
    /// Formatted active G-code list.
    FormattedGcodes,
    /// Formatted active M-code list.
    FormattedMcodes,
    /// Program file finished loading.
    FileLoaded,
    /// Error-severity controller message.
    MachineError,
    /// Informational controller message.
    MachineMessage,
    /// Recent-files list changed.
    RecentFilesChanged,
}

impl std::fmt::Display for StatusChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatusChannel::Field(field) => write!(f, "field:{}", field),
            StatusChannel::Joint(attr) => write!(f, "joint:{}", attr),
            StatusChannel::AxisPositions => write!(f, "axis_positions"),
            StatusChannel::JointPositions => write!(f, "joint_positions"),
            StatusChannel::FormattedGcodes => write!(f, "formatted_gcodes"),
            StatusChannel::FormattedMcodes => write!(f, "formatted_mcodes"),
            StatusChannel::FileLoaded => write!(f, "file_loaded"),
            StatusChannel::MachineError => write!(f, "machine_error"),
            StatusChannel::MachineMessage => write!(f, "machine_message"),
            StatusChannel::RecentFilesChanged => write!(f, "recent_files_changed"),
        }
    }
}

/// An event published through the status dispatcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StatusEvent {
    /// A top-level field took a new value.
    Field {
        /// The field that changed.
        field: StatusField,
        /// The new value.
        value: FieldValue,
    },
    /// A per-joint attribute took a new value.
    Joint {
        /// Joint index the change belongs to.
        joint: usize,
        /// The attribute that changed.
        attr: JointAttr,
        /// The new value.
        value: FieldValue,
    },
    /// Derived absolute/relative/dtg axis positions were recomputed.
    AxisPositions(AxisPositionUpdate),
    /// Derived joint positions were recomputed.
    JointPositions(AxisVector),
    /// The active G-code list was reformatted.
    FormattedGcodes(Vec<String>),
    /// The active M-code list was reformatted.
    FormattedMcodes(Vec<String>),
    /// A program file finished loading.
    FileLoaded(String),
    /// The controller reported an error.
    MachineError(String),
    /// The controller reported an informational message.
    MachineMessage(String),
    /// The recent-files list changed.
    RecentFilesChanged(Vec<PathBuf>),
}

impl StatusEvent {
    /// The channel this event is delivered on.
    pub fn channel(&self) -> StatusChannel {
        match self {
            StatusEvent::Field { field, .. } => StatusChannel::Field(*field),
            StatusEvent::Joint { attr, .. } => StatusChannel::Joint(*attr),
            StatusEvent::AxisPositions(_) => StatusChannel::AxisPositions,
            StatusEvent::JointPositions(_) => StatusChannel::JointPositions,
            StatusEvent::FormattedGcodes(_) => StatusChannel::FormattedGcodes,
            StatusEvent::FormattedMcodes(_) => StatusChannel::FormattedMcodes,
            StatusEvent::FileLoaded(_) => StatusChannel::FileLoaded,
            StatusEvent::MachineError(_) => StatusChannel::MachineError,
            StatusEvent::MachineMessage(_) => StatusChannel::MachineMessage,
            StatusEvent::RecentFilesChanged(_) => StatusChannel::RecentFilesChanged,
        }
    }

    /// Short description of this event for logging.
    pub fn description(&self) -> String {
        match self {
            StatusEvent::Field { field, value } => format!("{} -> {:?}", field, value),
            StatusEvent::Joint { joint, attr, value } => {
                format!("joint {} {} -> {:?}", joint, attr, value)
            }
            StatusEvent::AxisPositions(update) => {
                format!(
                    "axis positions abs {:?} rel {:?}",
                    &update.absolute.as_slice()[..3],
                    &update.relative.as_slice()[..3]
                )
            }
            StatusEvent::JointPositions(pos) => {
                format!("joint positions {:?}", &pos.as_slice()[..3])
            }
            StatusEvent::FormattedGcodes(codes) => format!("active gcodes {}", codes.join(" ")),
            StatusEvent::FormattedMcodes(codes) => format!("active mcodes {}", codes.join(" ")),
            StatusEvent::FileLoaded(path) => format!("file loaded: {}", path),
            StatusEvent::MachineError(text) => format!("machine error: {}", text),
            StatusEvent::MachineMessage(text) => format!("machine message: {}", text),
            StatusEvent::RecentFilesChanged(files) => {
                format!("recent files changed ({} entries)", files.len())
            }
        }
    }
}

impl From<FieldChange> for StatusEvent {
    fn from(change: FieldChange) -> Self {
        StatusEvent::Field {
            field: change.field,
            value: change.value,
        }
    }
}

impl From<JointChange> for StatusEvent {
    fn from(change: JointChange) -> Self {
        StatusEvent::Joint {
            joint: change.joint,
            attr: change.attr,
            value: change.value,
        }
    }
}
