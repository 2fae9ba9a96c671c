use super::pca9685::{period_us, MAX_TICK};

/// Hobby servo pulse-width model: a fixed pulse at 0 degrees plus a fixed
/// number of microseconds per degree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Servo {
    min_pulse_us: u16,
    us_per_degree: u16,
    max_angle: u16,
}

#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServoPwmOut {
    pub on: u16,
    pub off: u16,
}

/// The 0.6 ms to 2.4 ms servos the board headers are specified for.
pub const STANDARD: Servo = Servo::new(600, 10, 180);

impl Servo {
    /// Creates a new `Servo` instance.
    ///
    /// # Parameters
    /// - `min_pulse_us`: Pulse width at 0 degrees.
    /// - `us_per_degree`: Pulse width added per degree.
    /// - `max_angle`: Requests above this are clamped to it.
    pub const fn new(min_pulse_us: u16, us_per_degree: u16, max_angle: u16) -> Self {
        Servo {
            min_pulse_us,
            us_per_degree,
            max_angle,
        }
    }

    /// Pulse width in microseconds for `angle` degrees.
    pub fn pulse_us(&self, angle: u16) -> u16 {
        let angle = angle.min(self.max_angle);
        self.min_pulse_us + angle * self.us_per_degree
    }

    /// Converts an angle to on and off counts.
    ///
    /// # Parameters
    /// - `angle`: Desired angle in degrees, clamped to `max_angle`.
    /// - `frequency_hz`: PWM frequency the expander is running at right now.
    ///   The count depends on the period length, so a stale frequency gives a
    ///   wrong pulse.
    pub fn angle_to_counts(&self, angle: u16, frequency_hz: u16) -> ServoPwmOut {
        let pulse_us = self.pulse_us(angle) as u32;
        let off = pulse_us * MAX_TICK as u32 / period_us(frequency_hz);
        ServoPwmOut {
            on: 0,
            off: off.min(MAX_TICK as u32) as u16,
        }
    }
}
