//! Machine status snapshot model.
//!
//! A [`StatusRecord`] is one complete read of the controller's published
//! state at a point in time. Records are plain values: the engine keeps the
//! previously published record as the comparison baseline and replaces it
//! wholesale after each successful cycle, so nothing here is ever mutated
//! in place across cycles.

use serde::{Deserialize, Serialize};

use crate::enums::{
    ExecState, InterpState, MotionType, ProgramUnits, RcsState, TaskMode, TaskState, TrajMode,
};

/// Letters of the nine possible machine axes, in axis-number order.
pub const AXIS_LETTERS: [char; 9] = ['x', 'y', 'z', 'a', 'b', 'c', 'u', 'v', 'w'];

/// Convert an axis number (0..9) to its letter.
pub fn axis_letter(number: usize) -> Option<char> {
    AXIS_LETTERS.get(number).copied()
}

/// Convert an axis letter (case-insensitive) to its number.
pub fn axis_number(letter: char) -> Option<usize> {
    let lower = letter.to_ascii_lowercase();
    AXIS_LETTERS.iter().position(|&c| c == lower)
}

/// One value per possible axis (X Y Z A B C U V W).
///
/// Used for positions, offsets, and distance-to-go vectors. Equality is
/// full structural equality over all nine slots.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AxisVector(pub [f64; 9]);

impl AxisVector {
    /// Number of axis slots.
    pub const LEN: usize = 9;

    /// All-zero vector.
    pub fn zeros() -> Self {
        Self([0.0; 9])
    }

    /// Build from per-axis values.
    pub fn new(values: [f64; 9]) -> Self {
        Self(values)
    }

    /// Borrow the underlying slots.
    pub fn as_slice(&self) -> &[f64; 9] {
        &self.0
    }

    /// Iterate over (axis number, value) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.0.iter().copied().enumerate()
    }
}

impl std::ops::Index<usize> for AxisVector {
    type Output = f64;

    fn index(&self, axis: usize) -> &f64 {
        &self.0[axis]
    }
}

impl std::ops::IndexMut<usize> for AxisVector {
    fn index_mut(&mut self, axis: usize) -> &mut f64 {
        &mut self.0[axis]
    }
}

impl From<[f64; 9]> for AxisVector {
    fn from(values: [f64; 9]) -> Self {
        Self(values)
    }
}

/// Per-joint sub-status.
///
/// Owned by, and only meaningful within, one [`StatusRecord`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct JointRecord {
    /// Joint type (linear = 1, angular = 2).
    pub jointtype: i32,
    /// Backlash in machine units.
    pub backlash: f64,
    /// Joint enabled flag.
    pub enabled: bool,
    /// Active fault flag.
    pub fault: bool,
    /// Current following error.
    pub ferror_current: f64,
    /// Magnitude of max following error.
    pub ferror_highmark: f64,
    /// Homed flag.
    pub homed: bool,
    /// Currently homing flag.
    pub homing: bool,
    /// In-position flag.
    pub inpos: bool,
    /// Current input position.
    pub input: f64,
    /// Configured maximum following error.
    pub max_ferror: f64,
    /// Max hard limit exceeded flag.
    pub max_hard_limit: bool,
    /// Max soft limit exceeded flag.
    pub max_soft_limit: bool,
    /// Min hard limit exceeded flag.
    pub min_hard_limit: bool,
    /// Min soft limit exceeded flag.
    pub min_soft_limit: bool,
    /// Commanded output position.
    pub output: f64,
    /// Override limits flag.
    pub override_limits: bool,
    /// Current joint velocity.
    pub velocity: f64,
}

/// One entry of the controller's tool table.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ToolEntry {
    /// Tool number.
    pub id: i32,
    /// Tool length offsets per axis.
    pub offset: AxisVector,
    /// Tool diameter.
    pub diameter: f64,
    /// Front angle (lathe tools).
    pub frontangle: f64,
    /// Back angle (lathe tools).
    pub backangle: f64,
    /// Tool orientation (lathe tools).
    pub orientation: i32,
}

/// One complete snapshot of the machine controller's published status.
///
/// The diffable fields are enumerated by [`crate::fields::StatusField`];
/// the machine-geometry fields at the bottom of the struct are static
/// configuration and are deliberately absent from that table, so they can
/// never be diffed or subscribed to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusRecord {
    // Queues
    /// Number of motions blending.
    pub active_queue: i32,
    /// Current size of the trajectory planner queue.
    pub queue: i32,
    /// Trajectory planner queue full flag.
    pub queue_full: bool,
    /// Number of MDI commands queued.
    pub queued_mdi_commands: i32,

    // Positions
    /// Trajectory (commanded) position.
    pub position: AxisVector,
    /// Current position, in machine units.
    pub actual_position: AxisVector,
    /// Joint commanded positions.
    pub joint_position: AxisVector,
    /// Joint actual positions.
    pub joint_actual_position: AxisVector,
    /// Distance-to-go per axis, as reported by the trajectory planner.
    pub dtg: AxisVector,
    /// Vector distance-to-go.
    pub distance_to_go: f64,

    // Velocities
    /// Current velocity in user units per second.
    pub current_vel: f64,
    /// Trajectory velocity.
    pub velocity: f64,

    // Offsets
    /// Active coordinate system index, G54 = 1, G55 = 2, etc.
    pub g5x_index: i32,
    /// Offset of the currently active coordinate system.
    pub g5x_offset: AxisVector,
    /// Current G92 offset.
    pub g92_offset: AxisVector,
    /// Offset values of the current tool.
    pub tool_offset: AxisVector,
    /// Current XY rotation angle around the Z axis, in degrees.
    pub rotation_xy: f64,

    // I/O
    /// Analog input pin values.
    pub ain: Vec<f64>,
    /// Analog output pin values.
    pub aout: Vec<f64>,
    /// Digital input pin values.
    pub din: Vec<i32>,
    /// Digital output pin values.
    pub dout: Vec<i32>,

    // Cooling
    /// Mist coolant state.
    pub mist: i32,
    /// Flood coolant state.
    pub flood: bool,

    // Active codes
    /// Currently active M-codes (first slot is sequence metadata).
    pub mcodes: Vec<i32>,
    /// Active G-codes for each modal group (first slot is sequence metadata).
    pub gcodes: Vec<i32>,

    // Home and limits
    /// Homed state per joint.
    pub homed: Vec<i32>,
    /// Machine-in-position flag.
    pub inpos: bool,
    /// Axis limit status masks.
    pub limit: Vec<i32>,

    // Delays
    /// Remaining time on dwell (G4) command, seconds.
    pub delay_left: f64,
    /// M66 timer in progress flag.
    pub input_timeout: bool,

    // Lube
    /// Lube on flag.
    pub lube: bool,
    /// Lube level.
    pub lube_level: i32,

    // Program control
    /// Optional stop enable flag.
    pub optional_stop: bool,
    /// Block delete current status.
    pub block_delete: bool,
    /// Motion paused flag.
    pub paused: bool,
    /// Feed hold enable flag.
    pub feed_hold_enabled: bool,

    // Probe
    /// Probe tripped flag (latched).
    pub probe_tripped: bool,
    /// Value of the probe input pin.
    pub probe_val: bool,
    /// Position where the probe tripped.
    pub probed_position: AxisVector,
    /// Probing in progress flag.
    pub probing: bool,

    // Program file
    /// Path of the currently loaded program file.
    pub file: String,
    /// Active program units.
    pub program_units: ProgramUnits,
    /// Source line motion is currently executing.
    pub motion_line: i32,
    /// Currently executing line.
    pub current_line: i32,
    /// Line the interpreter is currently reading.
    pub read_line: i32,
    /// Current subroutine call level.
    pub call_level: i32,

    // Spindle
    /// Spindle brake flag.
    pub spindle_brake: bool,
    /// Spindle rotation direction, forward = 1, reverse = -1.
    pub spindle_direction: i32,
    /// Spindle enabled flag.
    pub spindle_enabled: bool,
    /// Spindle override enabled flag.
    pub spindle_override_enabled: bool,
    /// Spindle speed.
    pub spindle_speed: f64,
    /// Spindle speed increasing flag.
    pub spindle_increasing: bool,

    // Overrides
    /// Feed-rate override, 0-1.
    pub feedrate: f64,
    /// Rapid-rate override, 0-1.
    pub rapidrate: f64,
    /// Spindle-rate override, 0-1.
    pub spindlerate: f64,
    /// Feed override enable flag.
    pub feed_override_enabled: bool,
    /// Adaptive feed override status.
    pub adaptive_feed_enabled: bool,

    // State
    /// Trajectory planner enabled flag.
    pub enabled: bool,
    /// E-stop state, nonzero when active.
    pub estop: i32,
    /// Current command execution status.
    pub state: RcsState,
    /// Task execution state.
    pub exec_state: ExecState,
    /// Current task mode.
    pub task_mode: TaskMode,
    /// Task paused flag.
    pub task_paused: bool,
    /// Current task state.
    pub task_state: TaskState,
    /// Mode of the motion controller.
    pub motion_mode: TrajMode,
    /// Type of the currently executing motion.
    pub motion_type: MotionType,
    /// Current interpreter state.
    pub interp_state: InterpState,
    /// Current interpreter return code.
    pub interpreter_errcode: i32,

    // Tool
    /// Current tool number.
    pub tool_in_spindle: i32,
    /// Pocket prepared by the last Tx command.
    pub pocket_prepped: i32,
    /// Tool table entries.
    pub tool_table: Vec<ToolEntry>,

    // Per-joint sub-records (diffed through the dedicated joint path,
    // never as a whole-record change).
    /// Per-joint status records.
    pub joints: Vec<JointRecord>,

    // Static machine geometry and counters. Not part of the diffable field
    // set: these describe the machine configuration, not its live state.
    /// Bitmask of configured axes (bit n = axis n).
    pub axis_mask: u32,
    /// Number of configured joints.
    pub num_joints: usize,
    /// Controller cycle time in seconds.
    pub cycle_time: f64,
    /// Machine linear units, units per mm.
    pub linear_units: f64,
    /// Machine angular units, units per degree.
    pub angular_units: f64,
    /// Maximum trajectory velocity.
    pub max_velocity: f64,
    /// Maximum trajectory acceleration.
    pub max_acceleration: f64,
    /// Kinematics type identifier.
    pub kinematics_type: i32,
    /// Serial number of the last echoed command.
    pub echo_serial_number: i32,
    /// Controller debug flags.
    pub debug: i32,
}

impl Default for StatusRecord {
    fn default() -> Self {
        Self {
            active_queue: 0,
            queue: 0,
            queue_full: false,
            queued_mdi_commands: 0,
            position: AxisVector::zeros(),
            actual_position: AxisVector::zeros(),
            joint_position: AxisVector::zeros(),
            joint_actual_position: AxisVector::zeros(),
            dtg: AxisVector::zeros(),
            distance_to_go: 0.0,
            current_vel: 0.0,
            velocity: 0.0,
            g5x_index: 1,
            g5x_offset: AxisVector::zeros(),
            g92_offset: AxisVector::zeros(),
            tool_offset: AxisVector::zeros(),
            rotation_xy: 0.0,
            ain: Vec::new(),
            aout: Vec::new(),
            din: Vec::new(),
            dout: Vec::new(),
            mist: 0,
            flood: false,
            mcodes: Vec::new(),
            gcodes: Vec::new(),
            homed: Vec::new(),
            inpos: true,
            limit: Vec::new(),
            delay_left: 0.0,
            input_timeout: false,
            lube: false,
            lube_level: 0,
            optional_stop: false,
            block_delete: false,
            paused: false,
            feed_hold_enabled: false,
            probe_tripped: false,
            probe_val: false,
            probed_position: AxisVector::zeros(),
            probing: false,
            file: String::new(),
            program_units: ProgramUnits::Mm,
            motion_line: 0,
            current_line: 0,
            read_line: 0,
            call_level: 0,
            spindle_brake: false,
            spindle_direction: 0,
            spindle_enabled: false,
            spindle_override_enabled: false,
            spindle_speed: 0.0,
            spindle_increasing: false,
            feedrate: 1.0,
            rapidrate: 1.0,
            spindlerate: 1.0,
            feed_override_enabled: true,
            adaptive_feed_enabled: false,
            enabled: false,
            estop: 1,
            state: RcsState::Done,
            exec_state: ExecState::Done,
            task_mode: TaskMode::Manual,
            task_paused: false,
            task_state: TaskState::Estop,
            motion_mode: TrajMode::Free,
            motion_type: MotionType::None,
            interp_state: InterpState::Idle,
            interpreter_errcode: 0,
            tool_in_spindle: 0,
            pocket_prepped: -1,
            tool_table: Vec::new(),
            joints: vec![JointRecord::default(); 3],
            axis_mask: 0b111,
            num_joints: 3,
            cycle_time: 0.001,
            linear_units: 1.0,
            angular_units: 1.0,
            max_velocity: 0.0,
            max_acceleration: 0.0,
            kinematics_type: 1,
            echo_serial_number: 0,
            debug: 0,
        }
    }
}

impl StatusRecord {
    /// Axis numbers configured on this machine, from the axis mask.
    pub fn active_axes(&self) -> impl Iterator<Item = usize> + '_ {
        (0..AxisVector::LEN).filter(|axis| self.axis_mask & (1 << axis) != 0)
    }
}
