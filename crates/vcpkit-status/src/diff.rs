//! Pure snapshot diffing.
//!
//! Both functions take two immutable snapshots and return the changes;
//! nothing here mutates shared state. Output order follows the field
//! table's declaration order, so a given pair of snapshots always yields
//! the same change sequence.

use vcpkit_core::{FieldChange, JointAttr, JointChange, JointRecord, StatusField, StatusRecord};

/// Compare two snapshots field by field and return every changed field
/// with its new value, in declaration order.
pub fn diff_records(previous: &StatusRecord, current: &StatusRecord) -> Vec<FieldChange> {
    StatusField::ALL
        .iter()
        .filter_map(|&field| {
            let new_value = field.read(current);
            if field.read(previous) != new_value {
                Some(FieldChange {
                    field,
                    value: new_value,
                })
            } else {
                None
            }
        })
        .collect()
}

/// Compare two joint collections attribute by attribute.
///
/// A grown or shrunk joint collection (machine reconfigured between
/// cycles) is tolerated by clamping to the shorter length; joints beyond
/// it report nothing that cycle.
pub fn diff_joints(previous: &[JointRecord], current: &[JointRecord]) -> Vec<JointChange> {
    let count = previous.len().min(current.len());
    let mut changes = Vec::new();

    for joint in 0..count {
        let (old, new) = (&previous[joint], &current[joint]);
        if old == new {
            continue;
        }
        for &attr in JointAttr::ALL {
            let new_value = attr.read(new);
            if attr.read(old) != new_value {
                changes.push(JointChange {
                    joint,
                    attr,
                    value: new_value,
                });
            }
        }
    }

    changes
}

#[cfg(test)]
mod tests {
    use super::*;
    use vcpkit_core::FieldValue;

    #[test]
    fn test_identical_records_diff_empty() {
        let record = StatusRecord::default();
        assert!(diff_records(&record, &record.clone()).is_empty());
    }

    #[test]
    fn test_single_field_change_yields_single_diff() {
        let previous = StatusRecord::default();
        let mut current = previous.clone();
        current.spindle_speed = 1500.0;

        let changes = diff_records(&previous, &current);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].field, StatusField::SpindleSpeed);
        assert_eq!(changes[0].value, FieldValue::Float(1500.0));
    }

    #[test]
    fn test_sequence_change_is_structural() {
        let mut previous = StatusRecord::default();
        previous.gcodes = vec![0, 10, -1];
        let mut current = previous.clone();

        // A fresh but equal vector must not diff.
        current.gcodes = vec![0, 10, -1];
        assert!(diff_records(&previous, &current).is_empty());

        current.gcodes = vec![0, 10, 20];
        let changes = diff_records(&previous, &current);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].field, StatusField::Gcodes);
    }

    #[test]
    fn test_changes_report_in_declaration_order() {
        let previous = StatusRecord::default();
        let mut current = previous.clone();
        // Mutate in reverse declaration order.
        current.tool_in_spindle = 4;
        current.rotation_xy = 45.0;
        current.position[0] = 10.0;

        let fields: Vec<StatusField> = diff_records(&previous, &current)
            .into_iter()
            .map(|c| c.field)
            .collect();
        assert_eq!(
            fields,
            vec![
                StatusField::Position,
                StatusField::RotationXy,
                StatusField::ToolInSpindle,
            ]
        );
    }

    #[test]
    fn test_joint_diff_carries_index() {
        let previous = vec![JointRecord::default(); 3];
        let mut current = previous.clone();
        current[1].homed = true;
        current[2].velocity = 3.0;

        let changes = diff_joints(&previous, &current);
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].joint, 1);
        assert_eq!(changes[0].attr, JointAttr::Homed);
        assert_eq!(changes[0].value, FieldValue::Bool(true));
        assert_eq!(changes[1].joint, 2);
        assert_eq!(changes[1].attr, JointAttr::Velocity);
    }

    #[test]
    fn test_joint_count_shrink_is_tolerated() {
        let mut previous = vec![JointRecord::default(); 4];
        previous[3].homed = true;
        let mut current = vec![JointRecord::default(); 2];
        current[0].fault = true;

        // Joints 2 and 3 disappeared; only joints 0..2 are compared.
        let changes = diff_joints(&previous, &current);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].joint, 0);
        assert_eq!(changes[0].attr, JointAttr::Fault);
    }

    #[test]
    fn test_joint_count_growth_is_tolerated() {
        let previous = vec![JointRecord::default(); 2];
        let mut current = vec![JointRecord::default(); 4];
        current[3].enabled = true;

        // The new joints have no baseline yet and report nothing.
        assert!(diff_joints(&previous, &current).is_empty());
    }
}
