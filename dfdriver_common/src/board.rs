//! Per-revision board wiring and timing.
//!
//! The board revisions only differ in the expander address, the order the
//! servo headers are routed to the expander, and how long a stepper has to be
//! held energized per revolution. Everything else is shared.

#[cfg(feature = "std")]
use serde::{Deserialize, Serialize};

use crate::{StepperFamily, SERVO_COUNT};

/// Servo and idle frequency.
pub const IDLE_FREQUENCY_HZ: u16 = 50;
/// Steppers are timed against this frequency.
pub const STEPPER_FREQUENCY_HZ: u16 = 100;
/// Lowest frequency the 8-bit prescaler can produce from the 25 MHz oscillator.
pub const MIN_FREQUENCY_HZ: u16 = 24;
/// Highest frequency the prescaler can produce (prescale = 3).
pub const MAX_FREQUENCY_HZ: u16 = 1526;

const CHANNEL_COUNT: u8 = 16;

/// What to do with a request that addresses a channel, servo, motor or slot
/// that does not exist, or asks for a duty past 4095 ticks.
#[cfg_attr(feature = "no_std", derive(defmt::Format))]
#[cfg_attr(feature = "std", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "std", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InvalidRequestPolicy {
    /// Return an error to the caller.
    #[default]
    Report,
    /// Drop the request without touching the bus, as the stock board firmware does.
    Ignore,
}

/// Hold budget per revolution, in milliseconds, at [`STEPPER_FREQUENCY_HZ`].
#[cfg_attr(feature = "no_std", derive(defmt::Format))]
#[cfg_attr(feature = "std", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepperTiming {
    pub unipolar_ms_per_rev: u32,
    pub bipolar_ms_per_rev: u32,
}

impl StepperTiming {
    pub fn ms_per_rev(&self, family: StepperFamily) -> u32 {
        match family {
            StepperFamily::Unipolar28 => self.unipolar_ms_per_rev,
            StepperFamily::Bipolar42 => self.bipolar_ms_per_rev,
        }
    }
}

#[cfg_attr(feature = "no_std", derive(defmt::Format))]
#[cfg_attr(feature = "std", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "std", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardConfig {
    /// 7-bit I2C address of the PWM expander.
    pub address: u8,
    /// Expander channel of servo 1 through 8.
    pub servo_channels: [u8; SERVO_COUNT],
    pub timing: StepperTiming,
    pub idle_frequency_hz: u16,
    pub stepper_frequency_hz: u16,
    pub invalid_request: InvalidRequestPolicy,
}

impl BoardConfig {
    /// DF-Driver revision: expander at 0x67, S1 routed to channel 15 down to
    /// S8 on channel 8.
    pub const fn df_driver() -> Self {
        Self {
            address: 0x67,
            servo_channels: [15, 14, 13, 12, 11, 10, 9, 8],
            timing: StepperTiming {
                unipolar_ms_per_rev: 5120,
                bipolar_ms_per_rev: 500,
            },
            idle_frequency_hz: IDLE_FREQUENCY_HZ,
            stepper_frequency_hz: STEPPER_FREQUENCY_HZ,
            invalid_request: InvalidRequestPolicy::Report,
        }
    }

    /// Motor:bit revision: expander at 0x40, servo `n` on channel `n + 6`.
    pub const fn motor_bit() -> Self {
        Self {
            address: 0x40,
            servo_channels: [7, 8, 9, 10, 11, 12, 13, 14],
            timing: StepperTiming {
                unipolar_ms_per_rev: 1000,
                bipolar_ms_per_rev: 500,
            },
            idle_frequency_hz: IDLE_FREQUENCY_HZ,
            stepper_frequency_hz: STEPPER_FREQUENCY_HZ,
            invalid_request: InvalidRequestPolicy::Report,
        }
    }

    pub fn with_policy(mut self, policy: InvalidRequestPolicy) -> Self {
        self.invalid_request = policy;
        self
    }

    /// Channel driving servo `servo` (1-based), if that servo exists.
    pub fn servo_channel(&self, servo: u8) -> Option<u8> {
        let index = usize::from(servo).checked_sub(1)?;
        self.servo_channels.get(index).copied()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        // general call and reserved range, the expander's all-call address
        // and anything wider than 7 bits
        if self.address <= 0x07 || self.address == 0x70 || self.address > 0x7F {
            return Err(ConfigError::Address(self.address));
        }
        for (i, &channel) in self.servo_channels.iter().enumerate() {
            let servo = i as u8 + 1;
            if channel >= CHANNEL_COUNT {
                return Err(ConfigError::ServoChannel { servo, channel });
            }
            if self.servo_channels[..i].contains(&channel) {
                return Err(ConfigError::DuplicateServoChannel(channel));
            }
        }
        if self.timing.unipolar_ms_per_rev == 0 || self.timing.bipolar_ms_per_rev == 0 {
            return Err(ConfigError::ZeroTiming);
        }
        for hz in [self.idle_frequency_hz, self.stepper_frequency_hz] {
            if !(MIN_FREQUENCY_HZ..=MAX_FREQUENCY_HZ).contains(&hz) {
                return Err(ConfigError::Frequency(hz));
            }
        }
        Ok(())
    }

    /// Parse a JSON board description. Missing fields fall back to
    /// [`BoardConfig::df_driver`].
    #[cfg(feature = "std")]
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|e| ConfigError::Parse {
            line: e.line(),
            column: e.column(),
        })?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self::df_driver()
    }
}

#[cfg_attr(feature = "no_std", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    Address(u8),
    ServoChannel { servo: u8, channel: u8 },
    DuplicateServoChannel(u8),
    ZeroTiming,
    Frequency(u16),
    Parse { line: usize, column: usize },
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ConfigError::Address(addr) => {
                write!(f, "address 0x{:02x} is not a usable device address", addr)
            }
            ConfigError::ServoChannel { servo, channel } => {
                write!(f, "servo {} routed to channel {}, expander has 16", servo, channel)
            }
            ConfigError::DuplicateServoChannel(channel) => {
                write!(f, "channel {} assigned to more than one servo", channel)
            }
            ConfigError::ZeroTiming => write!(f, "stepper hold budget must be non-zero"),
            ConfigError::Frequency(hz) => write!(
                f,
                "{} Hz outside {}..={} Hz",
                hz, MIN_FREQUENCY_HZ, MAX_FREQUENCY_HZ
            ),
            ConfigError::Parse { line, column } => {
                write!(f, "malformed board config at {}:{}", line, column)
            }
        }
    }
}

impl core::error::Error for ConfigError {}
