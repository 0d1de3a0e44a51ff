//! Camera control: key bindings, window input tracking and time-delta
//! driven fly motion.
//!
//! # Invariants
//! - Without window focus the camera is never moved and nothing is sent.
//! - At most one position notification is sent per tick.
//! - Altitude-only moves never request terrain re-evaluation.
//! - Tick and wheel notifications share one ordered channel.

pub mod action;
pub mod bindings;
pub mod clock;
pub mod control;
pub mod source;

pub use action::{CameraAction, MoveAxis};
pub use bindings::{CameraBindings, ConfigError, KeyBindings};
pub use clock::{Clock, ManualClock, SystemClock};
pub use control::{CameraControl, CameraControlConfig, SPEED_FACTOR, SPEED_FACTOR_WHEEL};
pub use source::{
    InputSource, KeyboardSnapshot, ManualInput, WHEEL_DELTA_PER_LINE, WindowInput, wheel_delta,
};

pub fn crate_info() -> &'static str {
    "terrastream-input v0.1.0"
}
