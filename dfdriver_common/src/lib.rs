#![cfg_attr(all(feature = "no_std", not(test)), no_std)]

pub mod board;
pub mod commutation;
pub mod motion;

pub use board::{BoardConfig, ConfigError, InvalidRequestPolicy, StepperTiming};

#[cfg(feature = "std")]
use serde::{Deserialize, Serialize};

/// Number of hobby servo headers on the board.
pub const SERVO_COUNT: usize = 8;
/// Number of brushed DC motor ports on the board.
pub const MOTOR_COUNT: u8 = 4;

/// Rotation sense. `Forward` is clockwise on the board silkscreen.
#[cfg_attr(feature = "no_std", derive(defmt::Format))]
#[cfg_attr(feature = "std", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Reverse,
}

impl Direction {
    pub fn sign(&self) -> i8 {
        match self {
            Direction::Forward => 1,
            Direction::Reverse => -1,
        }
    }
}

impl TryFrom<i8> for Direction {
    type Error = SelectorError;

    fn try_from(raw: i8) -> Result<Self, Self::Error> {
        match raw {
            1 => Ok(Direction::Forward),
            -1 => Ok(Direction::Reverse),
            other => Err(SelectorError::Direction(other)),
        }
    }
}

/// One of the two stepper mounting positions. Each one takes over the
/// channels of two DC motor ports.
#[cfg_attr(feature = "no_std", derive(defmt::Format))]
#[cfg_attr(feature = "std", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepperSlot {
    M1M2,
    M3M4,
}

impl StepperSlot {
    pub fn index(&self) -> usize {
        match self {
            StepperSlot::M1M2 => 0,
            StepperSlot::M3M4 => 1,
        }
    }
}

impl TryFrom<u8> for StepperSlot {
    type Error = SelectorError;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        match raw {
            1 => Ok(StepperSlot::M1M2),
            2 => Ok(StepperSlot::M3M4),
            other => Err(SelectorError::Slot(other)),
        }
    }
}

/// Supported stepper motors. Raw selectors are the frame size of the motor,
/// `28` for the 28BYJ-48 and `42` for the 42BYGH1861A-C.
#[cfg_attr(feature = "no_std", derive(defmt::Format))]
#[cfg_attr(feature = "std", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepperFamily {
    Unipolar28,
    Bipolar42,
}

impl TryFrom<u8> for StepperFamily {
    type Error = SelectorError;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        match raw {
            28 => Ok(StepperFamily::Unipolar28),
            42 => Ok(StepperFamily::Bipolar42),
            other => Err(SelectorError::Family(other)),
        }
    }
}

/// A raw selector that does not name any slot, family or direction.
#[cfg_attr(feature = "no_std", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorError {
    Slot(u8),
    Family(u8),
    Direction(i8),
}

impl core::fmt::Display for SelectorError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            SelectorError::Slot(raw) => write!(f, "no stepper slot {}", raw),
            SelectorError::Family(raw) => write!(f, "unknown stepper family {}", raw),
            SelectorError::Direction(raw) => write!(f, "direction must be 1 or -1, got {}", raw),
        }
    }
}

impl core::error::Error for SelectorError {}
