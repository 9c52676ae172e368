//! # VCPKit Core
//!
//! Core types for the VCPKit status-synchronization engine:
//! the machine status snapshot model, the statically declared field
//! table used for diffing, typed machine-state enums, event payloads,
//! and the error taxonomy shared by all VCPKit crates.

pub mod enums;
pub mod error;
pub mod event;
pub mod fields;
pub mod record;

pub use enums::{
    ExecState, InterpState, MotionType, ProgramUnits, RcsState, TaskMode, TaskState, TrajMode,
};
pub use error::{Error, PollError, QueueDrainError, Result, SubscriberError};
pub use event::{
    AxisPositionUpdate, FieldChange, JointChange, StatusChannel, StatusEvent,
};
pub use fields::{FieldValue, JointAttr, StatusField};
pub use record::{axis_letter, axis_number, AxisVector, JointRecord, StatusRecord, ToolEntry};
