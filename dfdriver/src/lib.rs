//! Driver for the DF-Driver / Motor:bit expansion board.
//!
//! One PCA9685 PWM expander drives eight servo headers, four brushed DC motor
//! ports and, by taking over pairs of motor ports, up to two stepper motors.
//! The crate is generic over any `embedded-hal` 1.0 I2C bus and delay.
//!
//! ```ignore
//! let mut board = MotorBoard::open(i2c, delay, BoardConfig::df_driver())?;
//! board.set_servo_angle(1, 90)?;
//! board.run_motor(2, Direction::Forward, 200)?;
//! board.dual_stepper_move_degrees(StepperFamily::Bipolar42, Direction::Forward, 90.0, Direction::Reverse, 180.0)?;
//! ```
#![cfg_attr(not(test), no_std)]

// must come first so the log macros are visible to the other modules
mod fmt;

/// modules
pub mod board;
pub mod err;
pub mod motion;
pub mod motor;
pub mod pwm;

pub use board::MotorBoard;
pub use dfdriver_common::{
    BoardConfig, Direction, InvalidRequestPolicy, StepperFamily, StepperSlot,
};
pub use err::Error;
