//! Derived position calculation.
//!
//! [`PositionTracker`] subscribes to the raw position-related fields and
//! republishes one composite `AxisPositions` event (absolute, relative,
//! dtg) plus one `JointPositions` event, so subscribers always see a
//! consistent set. The relative vector applies offsets in the controller's
//! order: g5x and tool offsets first, then the XY rotation, then g92.

use parking_lot::Mutex;
use std::sync::Arc;

use vcpkit_core::{
    AxisPositionUpdate, AxisVector, StatusChannel, StatusEvent, StatusField, StatusRecord,
};

use crate::dispatch::{ChannelFilter, StatusDispatcher, SubscriptionId};
use crate::sync::SnapshotCell;

/// Compute the absolute/relative/dtg triple from a snapshot.
///
/// `report_actual` selects the actual position vector over the commanded
/// one. Rotation is only applied when the angle is nonzero, and the g92
/// offset is subtracted after rotation, matching the controller's order
/// of application.
pub fn compute_axis_positions(record: &StatusRecord, report_actual: bool) -> AxisPositionUpdate {
    let absolute = if report_actual {
        record.actual_position
    } else {
        record.position
    };

    let mut relative = AxisVector::zeros();
    for axis in record.active_axes() {
        relative[axis] = absolute[axis] - record.g5x_offset[axis] - record.tool_offset[axis];
    }

    if record.rotation_xy != 0.0 {
        let t = (-record.rotation_xy).to_radians();
        let xr = relative[0] * t.cos() - relative[1] * t.sin();
        let yr = relative[0] * t.sin() + relative[1] * t.cos();
        relative[0] = xr;
        relative[1] = yr;
    }

    for axis in record.active_axes() {
        relative[axis] -= record.g92_offset[axis];
    }

    AxisPositionUpdate {
        absolute,
        relative,
        dtg: record.dtg,
    }
}

struct TrackerState {
    report_actual: bool,
    axis_sub: Option<SubscriptionId>,
    joint_sub: Option<SubscriptionId>,
}

/// Built-in subscriber recomputing derived positions.
///
/// Keep the returned tracker alive for as long as derived position events
/// should flow; [`PositionTracker::set_report_actual`] switches between
/// commanded and actual positions, swapping the axis and joint trigger
/// subscriptions together.
pub struct PositionTracker {
    dispatcher: Arc<StatusDispatcher>,
    snapshot: SnapshotCell,
    state: Arc<Mutex<TrackerState>>,
}

fn axis_trigger_channels(report_actual: bool) -> Vec<StatusChannel> {
    let position = if report_actual {
        StatusField::ActualPosition
    } else {
        StatusField::Position
    };
    vec![
        StatusChannel::Field(position),
        StatusChannel::Field(StatusField::G5xOffset),
        StatusChannel::Field(StatusField::G92Offset),
        StatusChannel::Field(StatusField::ToolOffset),
        StatusChannel::Field(StatusField::RotationXy),
    ]
}

fn joint_trigger_channel(report_actual: bool) -> StatusChannel {
    StatusChannel::Field(if report_actual {
        StatusField::JointActualPosition
    } else {
        StatusField::JointPosition
    })
}

impl PositionTracker {
    /// Attach a tracker to a dispatcher, reporting commanded positions.
    pub fn attach(dispatcher: Arc<StatusDispatcher>, snapshot: SnapshotCell) -> Self {
        let tracker = Self {
            dispatcher,
            snapshot,
            state: Arc::new(Mutex::new(TrackerState {
                report_actual: false,
                axis_sub: None,
                joint_sub: None,
            })),
        };
        let mut state = tracker.state.lock();
        tracker.subscribe_triggers(&mut state, false);
        drop(state);
        tracker
    }

    /// Whether actual (vs commanded) positions are being reported.
    pub fn report_actual(&self) -> bool {
        self.state.lock().report_actual
    }

    /// Switch between commanded and actual position reporting.
    ///
    /// Swaps the axis and joint trigger subscriptions inside one critical
    /// section, so the two paths can never observe different modes.
    pub fn set_report_actual(&self, report_actual: bool) {
        let mut state = self.state.lock();
        if state.report_actual == report_actual {
            return;
        }

        if let Some(id) = state.axis_sub.take() {
            self.dispatcher.unsubscribe(id);
        }
        if let Some(id) = state.joint_sub.take() {
            self.dispatcher.unsubscribe(id);
        }
        self.subscribe_triggers(&mut state, report_actual);
        state.report_actual = report_actual;
    }

    fn subscribe_triggers(&self, state: &mut TrackerState, report_actual: bool) {
        let dispatcher = self.dispatcher.clone();
        let snapshot = self.snapshot.clone();
        state.axis_sub = Some(self.dispatcher.subscribe(
            ChannelFilter::Channels(axis_trigger_channels(report_actual)),
            move |_| {
                let update = snapshot.with(|record| compute_axis_positions(record, report_actual));
                dispatcher.publish(&StatusEvent::AxisPositions(update));
                Ok(())
            },
        ));

        let dispatcher = self.dispatcher.clone();
        let snapshot = self.snapshot.clone();
        state.joint_sub = Some(self.dispatcher.subscribe_channel(
            joint_trigger_channel(report_actual),
            move |_| {
                let positions = snapshot.with(|record| {
                    if report_actual {
                        record.joint_actual_position
                    } else {
                        record.joint_position
                    }
                });
                dispatcher.publish(&StatusEvent::JointPositions(positions));
                Ok(())
            },
        ));
    }
}

impl Drop for PositionTracker {
    fn drop(&mut self) {
        let mut state = self.state.lock();
        if let Some(id) = state.axis_sub.take() {
            self.dispatcher.unsubscribe(id);
        }
        if let Some(id) = state.joint_sub.take() {
            self.dispatcher.unsubscribe(id);
        }
    }
}
