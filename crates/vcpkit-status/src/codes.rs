//! Active-code formatting.
//!
//! The controller publishes active G-codes as tenths-scaled integers
//! (G1 = 10, G1.1 = 11, G64 = 640) with sequence metadata in the first
//! slot and -1 marking empty modal groups. These helpers render the
//! canonical display strings; [`CodeFormatter`] republishes them whenever
//! the raw lists change.

use std::sync::Arc;

use vcpkit_core::{FieldValue, StatusChannel, StatusEvent, StatusField};

use crate::dispatch::{StatusDispatcher, SubscriptionId};

/// Format a raw active G-code list for display.
///
/// The first slot and -1 sentinels are excluded; output is in ascending
/// numeric order. Whole codes render as `G1`, tenths as `G1.1`.
pub fn format_gcodes(gcodes: &[i32]) -> Vec<String> {
    let mut active: Vec<i32> = gcodes
        .iter()
        .skip(1)
        .copied()
        .filter(|&code| code != -1)
        .collect();
    active.sort_unstable();
    active
        .into_iter()
        .map(|code| {
            if code % 10 == 0 {
                format!("G{}", code / 10)
            } else {
                format!("G{}.{}", code / 10, code % 10)
            }
        })
        .collect()
}

/// Format a raw active M-code list for display.
///
/// Same first-slot and sentinel exclusion as G-codes, but M-codes are not
/// tenths-scaled and render as plain `M{code}`.
pub fn format_mcodes(mcodes: &[i32]) -> Vec<String> {
    let mut active: Vec<i32> = mcodes
        .iter()
        .skip(1)
        .copied()
        .filter(|&code| code != -1)
        .collect();
    active.sort_unstable();
    active.into_iter().map(|code| format!("M{}", code)).collect()
}

/// Built-in subscriber republishing formatted code lists.
pub struct CodeFormatter {
    dispatcher: Arc<StatusDispatcher>,
    gcode_sub: SubscriptionId,
    mcode_sub: SubscriptionId,
}

impl CodeFormatter {
    /// Attach the formatter to a dispatcher.
    pub fn attach(dispatcher: Arc<StatusDispatcher>) -> Self {
        let d = dispatcher.clone();
        let gcode_sub = dispatcher.subscribe_channel(
            StatusChannel::Field(StatusField::Gcodes),
            move |event| {
                if let StatusEvent::Field {
                    value: FieldValue::IntSeq(codes),
                    ..
                } = event
                {
                    d.publish(&StatusEvent::FormattedGcodes(format_gcodes(codes)));
                }
                Ok(())
            },
        );

        let d = dispatcher.clone();
        let mcode_sub = dispatcher.subscribe_channel(
            StatusChannel::Field(StatusField::Mcodes),
            move |event| {
                if let StatusEvent::Field {
                    value: FieldValue::IntSeq(codes),
                    ..
                } = event
                {
                    d.publish(&StatusEvent::FormattedMcodes(format_mcodes(codes)));
                }
                Ok(())
            },
        );

        Self {
            dispatcher,
            gcode_sub,
            mcode_sub,
        }
    }
}

impl Drop for CodeFormatter {
    fn drop(&mut self) {
        self.dispatcher.unsubscribe(self.gcode_sub);
        self.dispatcher.unsubscribe(self.mcode_sub);
    }
}
