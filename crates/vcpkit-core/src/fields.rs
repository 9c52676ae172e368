//! Statically declared field table.
//!
//! Instead of reflecting over a live status object, every diffable field is
//! a variant of [`StatusField`] with an accessor in [`StatusField::read`].
//! The `ALL` slices are in declaration order, which is also the order
//! changes are reported in, so derived computations always observe their
//! upstream fields first within a cycle. Fields missing from the table
//! (bulk joint containers, static machine geometry, serial counters, debug
//! flags) cannot be diffed or subscribed to at all.

use serde::{Deserialize, Serialize};

use crate::record::{AxisVector, JointRecord, StatusRecord, ToolEntry};

/// The value carried by one field of a [`StatusRecord`].
///
/// Equality is full structural equality, including for the sequence
/// variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    /// Boolean flag.
    Bool(bool),
    /// Integer scalar (includes typed state enums, carried as their NML value).
    Int(i32),
    /// Floating-point scalar.
    Float(f64),
    /// Text value (program file path).
    Text(String),
    /// Nine-slot axis vector.
    Axes(AxisVector),
    /// Integer sequence (pin states, active codes).
    IntSeq(Vec<i32>),
    /// Float sequence (analog pin values).
    FloatSeq(Vec<f64>),
    /// Tool table entries.
    Tools(Vec<ToolEntry>),
}

macro_rules! status_fields {
    ( $( $(#[$meta:meta])* $variant:ident => $name:literal : $kind:ident ( $field:ident ) ),+ $(,)? ) => {
        /// Identifier of one diffable top-level status field.
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
        )]
        pub enum StatusField {
            $( $(#[$meta])* $variant, )+
        }

        impl StatusField {
            /// Every diffable field, in declaration (= report) order.
            pub const ALL: &'static [StatusField] = &[
                $( StatusField::$variant, )+
            ];

            /// The field's wire name, as the controller publishes it.
            pub fn name(self) -> &'static str {
                match self {
                    $( StatusField::$variant => $name, )+
                }
            }

            /// Read this field's current value out of a snapshot.
            pub fn read(self, record: &StatusRecord) -> FieldValue {
                match self {
                    $( StatusField::$variant => status_fields!(@read $kind, record.$field), )+
                }
            }
        }
    };

    (@read bool, $e:expr) => { FieldValue::Bool($e) };
    (@read int, $e:expr) => { FieldValue::Int($e) };
    (@read float, $e:expr) => { FieldValue::Float($e) };
    (@read text, $e:expr) => { FieldValue::Text($e.clone()) };
    (@read axes, $e:expr) => { FieldValue::Axes($e) };
    (@read int_seq, $e:expr) => { FieldValue::IntSeq($e.clone()) };
    (@read float_seq, $e:expr) => { FieldValue::FloatSeq($e.clone()) };
    (@read tools, $e:expr) => { FieldValue::Tools($e.clone()) };
    (@read state, $e:expr) => { FieldValue::Int($e.value()) };
}

status_fields! {
    /// Number of motions blending.
    ActiveQueue => "active_queue": int(active_queue),
    /// Trajectory planner queue size.
    Queue => "queue": int(queue),
    /// Trajectory planner queue full flag.
    QueueFull => "queue_full": bool(queue_full),
    /// Number of queued MDI commands.
    QueuedMdiCommands => "queued_mdi_commands": int(queued_mdi_commands),
    /// Trajectory (commanded) position.
    Position => "position": axes(position),
    /// Actual position in machine units.
    ActualPosition => "actual_position": axes(actual_position),
    /// Joint commanded positions.
    JointPosition => "joint_position": axes(joint_position),
    /// Joint actual positions.
    JointActualPosition => "joint_actual_position": axes(joint_actual_position),
    /// Distance-to-go per axis.
    Dtg => "dtg": axes(dtg),
    /// Vector distance-to-go.
    DistanceToGo => "distance_to_go": float(distance_to_go),
    /// Current velocity.
    CurrentVel => "current_vel": float(current_vel),
    /// Trajectory velocity.
    Velocity => "velocity": float(velocity),
    /// Active coordinate system index.
    G5xIndex => "g5x_index": int(g5x_index),
    /// Active coordinate system offset.
    G5xOffset => "g5x_offset": axes(g5x_offset),
    /// Current G92 offset.
    G92Offset => "g92_offset": axes(g92_offset),
    /// Current tool offset.
    ToolOffset => "tool_offset": axes(tool_offset),
    /// XY rotation angle, degrees.
    RotationXy => "rotation_xy": float(rotation_xy),
    /// Analog input pins.
    Ain => "ain": float_seq(ain),
    /// Analog output pins.
    Aout => "aout": float_seq(aout),
    /// Digital input pins.
    Din => "din": int_seq(din),
    /// Digital output pins.
    Dout => "dout": int_seq(dout),
    /// Mist coolant state.
    Mist => "mist": int(mist),
    /// Flood coolant state.
    Flood => "flood": bool(flood),
    /// Active M-codes.
    Mcodes => "mcodes": int_seq(mcodes),
    /// Active G-codes per modal group.
    Gcodes => "gcodes": int_seq(gcodes),
    /// Homed state per joint.
    Homed => "homed": int_seq(homed),
    /// Machine-in-position flag.
    Inpos => "inpos": bool(inpos),
    /// Axis limit status masks.
    Limit => "limit": int_seq(limit),
    /// Remaining dwell time, seconds.
    DelayLeft => "delay_left": float(delay_left),
    /// M66 timer in progress flag.
    InputTimeout => "input_timeout": bool(input_timeout),
    /// Lube on flag.
    Lube => "lube": bool(lube),
    /// Lube level.
    LubeLevel => "lube_level": int(lube_level),
    /// Optional stop enable flag.
    OptionalStop => "optional_stop": bool(optional_stop),
    /// Block delete status.
    BlockDelete => "block_delete": bool(block_delete),
    /// Motion paused flag.
    Paused => "paused": bool(paused),
    /// Feed hold enable flag.
    FeedHoldEnabled => "feed_hold_enabled": bool(feed_hold_enabled),
    /// Probe tripped flag.
    ProbeTripped => "probe_tripped": bool(probe_tripped),
    /// Probe input pin value.
    ProbeVal => "probe_val": bool(probe_val),
    /// Position where the probe tripped.
    ProbedPosition => "probed_position": axes(probed_position),
    /// Probing in progress flag.
    Probing => "probing": bool(probing),
    /// Loaded program file path.
    File => "file": text(file),
    /// Active program units.
    ProgramUnits => "program_units": state(program_units),
    /// Source line motion is executing.
    MotionLine => "motion_line": int(motion_line),
    /// Currently executing line.
    CurrentLine => "current_line": int(current_line),
    /// Line the interpreter is reading.
    ReadLine => "read_line": int(read_line),
    /// Subroutine call level.
    CallLevel => "call_level": int(call_level),
    /// Spindle brake flag.
    SpindleBrake => "spindle_brake": bool(spindle_brake),
    /// Spindle rotation direction.
    SpindleDirection => "spindle_direction": int(spindle_direction),
    /// Spindle enabled flag.
    SpindleEnabled => "spindle_enabled": bool(spindle_enabled),
    /// Spindle override enabled flag.
    SpindleOverrideEnabled => "spindle_override_enabled": bool(spindle_override_enabled),
    /// Spindle speed.
    SpindleSpeed => "spindle_speed": float(spindle_speed),
    /// Spindle speed increasing flag.
    SpindleIncreasing => "spindle_increasing": bool(spindle_increasing),
    /// Feed-rate override.
    Feedrate => "feedrate": float(feedrate),
    /// Rapid-rate override.
    Rapidrate => "rapidrate": float(rapidrate),
    /// Spindle-rate override.
    Spindlerate => "spindlerate": float(spindlerate),
    /// Feed override enable flag.
    FeedOverrideEnabled => "feed_override_enabled": bool(feed_override_enabled),
    /// Adaptive feed override status.
    AdaptiveFeedEnabled => "adaptive_feed_enabled": bool(adaptive_feed_enabled),
    /// Trajectory planner enabled flag.
    Enabled => "enabled": bool(enabled),
    /// E-stop state.
    Estop => "estop": int(estop),
    /// Last command execution status.
    State => "state": state(state),
    /// Task execution state.
    ExecState => "exec_state": state(exec_state),
    /// Current task mode.
    TaskMode => "task_mode": state(task_mode),
    /// Task paused flag.
    TaskPaused => "task_paused": bool(task_paused),
    /// Current task state.
    TaskState => "task_state": state(task_state),
    /// Motion controller mode.
    MotionMode => "motion_mode": state(motion_mode),
    /// Currently executing motion type.
    MotionType => "motion_type": state(motion_type),
    /// Interpreter state.
    InterpState => "interp_state": state(interp_state),
    /// Interpreter return code.
    InterpreterErrcode => "interpreter_errcode": int(interpreter_errcode),
    /// Current tool number.
    ToolInSpindle => "tool_in_spindle": int(tool_in_spindle),
    /// Prepared tool pocket.
    PocketPrepped => "pocket_prepped": int(pocket_prepped),
    /// Tool table entries.
    ToolTable => "tool_table": tools(tool_table),
}

impl std::fmt::Display for StatusField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

macro_rules! joint_attrs {
    ( $( $(#[$meta:meta])* $variant:ident => $name:literal : $kind:ident ( $field:ident ) ),+ $(,)? ) => {
        /// Identifier of one per-joint status attribute.
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
        )]
        pub enum JointAttr {
            $( $(#[$meta])* $variant, )+
        }

        impl JointAttr {
            /// Every joint attribute, in declaration (= report) order.
            pub const ALL: &'static [JointAttr] = &[
                $( JointAttr::$variant, )+
            ];

            /// The attribute's wire name.
            pub fn name(self) -> &'static str {
                match self {
                    $( JointAttr::$variant => $name, )+
                }
            }

            /// Read this attribute's current value out of a joint record.
            pub fn read(self, joint: &JointRecord) -> FieldValue {
                match self {
                    $( JointAttr::$variant => status_fields!(@read $kind, joint.$field), )+
                }
            }
        }
    };
}

joint_attrs! {
    /// Joint type (linear/angular).
    Jointtype => "jointtype": int(jointtype),
    /// Backlash in machine units.
    Backlash => "backlash": float(backlash),
    /// Enabled flag.
    Enabled => "enabled": bool(enabled),
    /// Active fault flag.
    Fault => "fault": bool(fault),
    /// Current following error.
    FerrorCurrent => "ferror_current": float(ferror_current),
    /// Max following error high-water mark.
    FerrorHighmark => "ferror_highmark": float(ferror_highmark),
    /// Homed flag.
    Homed => "homed": bool(homed),
    /// Homing in progress flag.
    Homing => "homing": bool(homing),
    /// In-position flag.
    Inpos => "inpos": bool(inpos),
    /// Current input position.
    Input => "input": float(input),
    /// Configured max following error.
    MaxFerror => "max_ferror": float(max_ferror),
    /// Max hard limit exceeded flag.
    MaxHardLimit => "max_hard_limit": bool(max_hard_limit),
    /// Max soft limit exceeded flag.
    MaxSoftLimit => "max_soft_limit": bool(max_soft_limit),
    /// Min hard limit exceeded flag.
    MinHardLimit => "min_hard_limit": bool(min_hard_limit),
    /// Min soft limit exceeded flag.
    MinSoftLimit => "min_soft_limit": bool(min_soft_limit),
    /// Commanded output position.
    Output => "output": float(output),
    /// Override limits flag.
    OverrideLimits => "override_limits": bool(override_limits),
    /// Current joint velocity.
    Velocity => "velocity": float(velocity),
}

impl std::fmt::Display for JointAttr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
