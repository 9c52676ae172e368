//! # VCPKit
//!
//! A machine-status synchronization kit for CNC front ends. VCPKit polls
//! a machine controller's status channel on a fixed cadence, diffs each
//! snapshot field by field against the previous one, and fans the changes
//! out as typed events that UI widgets and logic bindings subscribe to.
//!
//! ## Architecture
//!
//! VCPKit is organized as a workspace with multiple crates:
//!
//! 1. **vcpkit-core** - Snapshot data model, field table, events, errors
//! 2. **vcpkit-status** - Polling engine, diff, dispatcher, derived positions
//! 3. **vcpkit-settings** - Configuration persistence
//! 4. **vcpkit** - Facade and demo binary wiring the pieces together
//!
//! ## Usage
//!
//! The composition root builds one [`StatusSync`] around a
//! [`StatusProvider`], attaches the built-in bridges, and hands the
//! [`StatusDispatcher`] and snapshot handles to consumers:
//!
//! ```no_run
//! use std::sync::Arc;
//! use vcpkit::{
//!     PollerConfig, PositionTracker, SimStatusProvider, StatusDispatcher, StatusPoller,
//!     StatusSync,
//! };
//!
//! let dispatcher = Arc::new(StatusDispatcher::new());
//! let sync = StatusSync::new(SimStatusProvider::new(), dispatcher.clone());
//! let tracker = PositionTracker::attach(dispatcher.clone(), sync.snapshot());
//! let mut poller = StatusPoller::new(sync, PollerConfig::default());
//! poller.start();
//! # drop((tracker, poller));
//! ```

pub use vcpkit_core::{
    axis_letter, axis_number, AxisPositionUpdate, AxisVector, Error, ExecState, FieldChange,
    FieldValue, InterpState, JointAttr, JointChange, JointRecord, MotionType, PollError,
    ProgramUnits, QueueDrainError, RcsState, Result, StatusChannel, StatusEvent, StatusField,
    StatusRecord, SubscriberError, TaskMode, TaskState, ToolEntry, TrajMode,
};

pub use vcpkit_status::{
    classify, diff_joints, diff_records, format_gcodes, format_mcodes, ActionGuard, ChannelFilter,
    CodeFormatter, CycleReport, FileLoadedBridge, GuardVerdict, MessageClass, MessageSeverity,
    PollerConfig, PositionTracker, RawMessage, RecentFiles, SimStatusProvider, SnapshotCell,
    StatusDispatcher, StatusPoller, StatusProvider, StatusSync, SubscriptionId,
};

pub use vcpkit_settings::{Config, PollingSettings, RecentFilesSettings};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Console output with compact formatting
/// - RUST_LOG environment variable support
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    let fmt_layer = fmt::layer().with_target(true).with_level(true).compact();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    Ok(())
}
