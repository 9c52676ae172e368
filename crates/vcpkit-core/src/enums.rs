//! Typed machine-state enums.
//!
//! Each enum carries the NML integer value the controller reports, so the
//! status provider can convert raw integers with `TryFrom<i32>` and the
//! rest of the system works with checked, typed state.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An integer from the controller did not map to a known state value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid {kind} value: {value}")]
pub struct InvalidStateValue {
    /// Name of the enum the value was intended for.
    pub kind: &'static str,
    /// The unmapped integer.
    pub value: i32,
}

macro_rules! nml_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $( $(#[$vmeta:meta])* $variant:ident = $value:expr ),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
        )]
        #[repr(i32)]
        pub enum $name {
            $( $(#[$vmeta])* $variant = $value, )+
        }

        impl $name {
            /// The NML integer value of this state.
            pub fn value(self) -> i32 {
                self as i32
            }
        }

        impl TryFrom<i32> for $name {
            type Error = InvalidStateValue;

            fn try_from(value: i32) -> Result<Self, InvalidStateValue> {
                match value {
                    $( $value => Ok($name::$variant), )+
                    _ => Err(InvalidStateValue {
                        kind: stringify!($name),
                        value,
                    }),
                }
            }
        }
    };
}

nml_enum! {
    /// Task state (machine power / e-stop).
    TaskState {
        /// E-stop is active.
        Estop = 1,
        /// E-stop released, machine still off.
        EstopReset = 2,
        /// Machine power off.
        Off = 3,
        /// Machine power on.
        On = 4,
    }
}

impl Default for TaskState {
    fn default() -> Self {
        Self::Estop
    }
}

nml_enum! {
    /// Task mode.
    TaskMode {
        /// Manual (jog) mode.
        Manual = 1,
        /// Automatic program execution.
        Auto = 2,
        /// Manual data input.
        Mdi = 3,
    }
}

impl Default for TaskMode {
    fn default() -> Self {
        Self::Manual
    }
}

nml_enum! {
    /// Interpreter state.
    InterpState {
        /// Interpreter idle.
        Idle = 1,
        /// Reading a program.
        Reading = 2,
        /// Execution paused.
        Paused = 3,
        /// Waiting on motion to complete.
        Waiting = 4,
    }
}

impl Default for InterpState {
    fn default() -> Self {
        Self::Idle
    }
}

nml_enum! {
    /// Trajectory (motion controller) mode.
    TrajMode {
        /// Free (joint) mode.
        Free = 1,
        /// Coordinated mode.
        Coord = 2,
        /// Teleop mode.
        Teleop = 3,
    }
}

impl Default for TrajMode {
    fn default() -> Self {
        Self::Free
    }
}

nml_enum! {
    /// Type of the currently executing motion.
    MotionType {
        /// No motion.
        None = 0,
        /// Rapid traverse.
        Traverse = 1,
        /// Linear feed.
        Feed = 2,
        /// Arc feed.
        Arc = 3,
        /// Tool change.
        ToolChange = 4,
        /// Probing move.
        Probing = 5,
        /// Rotary axis indexing.
        IndexRotary = 6,
    }
}

impl Default for MotionType {
    fn default() -> Self {
        Self::None
    }
}

nml_enum! {
    /// Active program units.
    ProgramUnits {
        /// Inches (G20).
        Inches = 1,
        /// Millimeters (G21).
        Mm = 2,
        /// Centimeters.
        Cm = 3,
    }
}

impl Default for ProgramUnits {
    fn default() -> Self {
        Self::Mm
    }
}

nml_enum! {
    /// Task execution state.
    ExecState {
        /// Execution error.
        Error = 1,
        /// Done.
        Done = 2,
        /// Waiting for motion.
        WaitingForMotion = 3,
        /// Waiting for motion queue.
        WaitingForMotionQueue = 4,
        /// Waiting for I/O.
        WaitingForIo = 5,
        /// Waiting for motion and I/O.
        WaitingForMotionAndIo = 7,
        /// Waiting for a dwell.
        WaitingForDelay = 8,
        /// Waiting for a system command.
        WaitingForSystemCmd = 9,
        /// Waiting for the spindle to orient.
        WaitingForSpindleOriented = 10,
    }
}

impl Default for ExecState {
    fn default() -> Self {
        Self::Done
    }
}

nml_enum! {
    /// Status of the last command sent to the controller.
    RcsState {
        /// Command complete.
        Done = 1,
        /// Command executing.
        Exec = 2,
        /// Command errored.
        Error = 3,
    }
}

impl Default for RcsState {
    fn default() -> Self {
        Self::Done
    }
}
