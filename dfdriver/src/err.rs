pub mod log;

use dfdriver_common::{ConfigError, SelectorError};

/// Everything a board operation can fail with. `E` is the I2C bus error.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error<E> {
    /// The bus transaction failed. Nothing is retried.
    Bus(E),
    InvalidChannel(u8),
    /// On/off ticks past the 12-bit range.
    InvalidDuty { on: u16, off: u16 },
    InvalidServo(u8),
    InvalidMotor(u8),
    InvalidSlot(u8),
    UnknownFamily(u8),
    InvalidDirection(i8),
    InvalidFrequency(u16),
    Config(ConfigError),
}

impl<E> From<E> for Error<E> {
    fn from(e: E) -> Self {
        Self::Bus(e)
    }
}

impl<E> Error<E> {
    /// Convert a rejected raw selector. Not a `From` impl because that would
    /// overlap with the bus error conversion.
    pub fn selector(err: SelectorError) -> Self {
        match err {
            SelectorError::Slot(raw) => Self::InvalidSlot(raw),
            SelectorError::Family(raw) => Self::UnknownFamily(raw),
            SelectorError::Direction(raw) => Self::InvalidDirection(raw),
        }
    }

    /// True for requests addressing hardware that does not exist or asking for
    /// ticks the chip cannot count to, the class
    /// [`InvalidRequestPolicy::Ignore`](dfdriver_common::InvalidRequestPolicy)
    /// drops silently.
    pub fn is_addressing(&self) -> bool {
        matches!(
            self,
            Self::InvalidChannel(_)
                | Self::InvalidDuty { .. }
                | Self::InvalidServo(_)
                | Self::InvalidMotor(_)
        )
    }
}

impl<E: core::fmt::Debug> core::fmt::Display for Error<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Bus(e) => write!(f, "i2c bus error: {:?}", e),
            Error::InvalidChannel(c) => write!(f, "channel {} out of range 0..=15", c),
            Error::InvalidDuty { on, off } => {
                write!(f, "duty on {} off {} exceeds 4095 ticks", on, off)
            }
            Error::InvalidServo(s) => write!(f, "servo {} out of range 1..=8", s),
            Error::InvalidMotor(m) => write!(f, "motor {} out of range 1..=4", m),
            Error::InvalidSlot(s) => write!(f, "stepper slot {} out of range 1..=2", s),
            Error::UnknownFamily(raw) => write!(f, "unknown stepper family {}", raw),
            Error::InvalidDirection(raw) => write!(f, "direction must be 1 or -1, got {}", raw),
            Error::InvalidFrequency(hz) => write!(f, "{} Hz is outside the prescaler range", hz),
            Error::Config(e) => write!(f, "bad board config: {}", e),
        }
    }
}

impl<E: core::fmt::Debug> core::error::Error for Error<E> {}
