//! # VCPKit Status
//!
//! The status-synchronization engine: polls a machine status provider on a
//! fixed cadence, diffs each snapshot field-by-field against the previous
//! one, and fans the changes out as typed events.
//!
//! Pipeline: [`provider::StatusProvider`] → [`diff`] → [`StatusDispatcher`]
//! → subscribers. The built-in bridges ([`PositionTracker`],
//! [`CodeFormatter`], [`FileLoadedBridge`]) are themselves dispatcher
//! subscribers that republish derived events through the same dispatcher.
//! [`StatusPoller`] is the external timer driving one cycle at a time.

pub mod actions;
pub mod codes;
pub mod diff;
pub mod dispatch;
pub mod files;
pub mod messages;
pub mod poller;
pub mod positions;
pub mod provider;
pub mod sync;

pub use actions::{ActionGuard, GuardVerdict};
pub use codes::{format_gcodes, format_mcodes, CodeFormatter};
pub use diff::{diff_joints, diff_records};
pub use dispatch::{ChannelFilter, StatusDispatcher, SubscriptionId};
pub use files::{FileLoadedBridge, RecentFiles};
pub use messages::{classify, MessageClass, MessageSeverity, RawMessage};
pub use poller::{PollerConfig, StatusPoller};
pub use positions::PositionTracker;
pub use provider::{SimStatusProvider, StatusProvider};
pub use sync::{CycleReport, SnapshotCell, StatusSync};
