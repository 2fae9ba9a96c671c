//! Brushed DC motor ports.
//!
//! Each port is an H-bridge fed by two adjacent expander channels. Direction
//! is chosen by which of the two leads carries the PWM; the other one is held
//! at zero.

use dfdriver_common::{Direction, MOTOR_COUNT};

use crate::pwm::pca9685::MAX_TICK;

/// Duty ticks per unit of speed, maps 0..=255 onto the 12-bit range.
const TICKS_PER_SPEED: u32 = 16;

#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotorChannels {
    pub positive: u8,
    pub negative: u8,
}

impl MotorChannels {
    /// Lead channels of motor `motor` (1-based). M1 sits on channels 6/7,
    /// M4 on 0/1.
    pub fn for_motor(motor: u8) -> Option<Self> {
        if !(1..=MOTOR_COUNT).contains(&motor) {
            return None;
        }
        let negative = (MOTOR_COUNT - motor) * 2;
        Some(Self {
            positive: negative + 1,
            negative,
        })
    }
}

/// Signed duty for `speed` in `direction`, saturating at ±4095.
pub fn motor_duty(speed: u16, direction: Direction) -> i16 {
    let magnitude = (speed as u32 * TICKS_PER_SPEED).min(MAX_TICK as u32) as i16;
    magnitude * direction.sign() as i16
}

/// Off ticks for the `(positive, negative)` leads. At most one is non-zero.
pub fn lead_duties(duty: i16) -> (u16, u16) {
    if duty >= 0 {
        (duty as u16, 0)
    } else {
        (0, duty.unsigned_abs())
    }
}
