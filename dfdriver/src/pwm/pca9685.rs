//! PCA9685 16-channel, 12-bit PWM expander.
//!
//! Register access goes through `pwm_pca9685`. This layer adds what the board
//! needs on top: frequencies in Hz, the oscillator settle time after a
//! prescaler change, microsecond-accurate holds and tracking of the frequency
//! the chip is running at.

use embedded_hal::{delay::DelayNs, i2c::I2c};
use pwm_pca9685::Channel;

use crate::err::Error;
use dfdriver_common::board::{MAX_FREQUENCY_HZ, MIN_FREQUENCY_HZ};
use dfdriver_common::ConfigError;

pub const OSCILLATOR_HZ: u32 = 25_000_000;
/// Ticks per PWM period.
pub const PERIOD_TICKS: u32 = 4096;
pub const MAX_TICK: u16 = 4095;

// datasheet minimum after wake is 500us
const OSCILLATOR_SETTLE_US: u32 = 5000;

/// `round(25 MHz / 4096 / hz) - 1`, or `None` outside the prescaler range.
fn prescale_for(frequency_hz: u16) -> Option<u8> {
    if !(MIN_FREQUENCY_HZ..=MAX_FREQUENCY_HZ).contains(&frequency_hz) {
        return None;
    }
    let divisor = PERIOD_TICKS * frequency_hz as u32;
    let rounded = (OSCILLATOR_HZ + divisor / 2) / divisor;
    Some((rounded - 1) as u8)
}

/// Length of one PWM period in microseconds. Frequencies the chip cannot
/// produce are clamped to its range first.
pub fn period_us(frequency_hz: u16) -> u32 {
    1_000_000 / frequency_hz.clamp(MIN_FREQUENCY_HZ, MAX_FREQUENCY_HZ) as u32
}

// bus errors pass through, `InvalidInputData` becomes the caller's rejection
fn lift<E>(err: pwm_pca9685::Error<E>, rejected: Error<E>) -> Error<E> {
    match err {
        pwm_pca9685::Error::I2C(e) => Error::Bus(e),
        pwm_pca9685::Error::InvalidInputData => rejected,
    }
}

pub struct Pca9685<I2C, D> {
    dev: pwm_pca9685::Pca9685<I2C>,
    delay: D,
    frequency_hz: u16,
}

impl<I2C, D> Pca9685<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    /// Wrap the bus. Nothing is written until [`Pca9685::initialize`].
    pub fn new(i2c: I2C, delay: D, address: u8) -> Result<Self, Error<I2C::Error>> {
        let dev = pwm_pca9685::Pca9685::new(i2c, address)
            .map_err(|e| lift(e, Error::Config(ConfigError::Address(address))))?;
        Ok(Self {
            dev,
            delay,
            frequency_hz: 0,
        })
    }

    /// Put the chip to sleep, program `frequency_hz`, wake it and switch every
    /// output off.
    pub fn initialize(&mut self, frequency_hz: u16) -> Result<(), Error<I2C::Error>> {
        let prescale = prescale_for(frequency_hz).ok_or(Error::InvalidFrequency(frequency_hz))?;
        let rejected =
            |e: pwm_pca9685::Error<I2C::Error>| lift(e, Error::InvalidFrequency(frequency_hz));

        // asleep the prescaler takes the write without another sleep cycle
        self.dev.disable().map_err(rejected)?;
        self.dev.set_prescale(prescale).map_err(rejected)?;
        self.frequency_hz = frequency_hz;
        self.dev.enable().map_err(rejected)?;
        self.delay.delay_us(OSCILLATOR_SETTLE_US);
        debug!("pwm {} Hz (prescale {})", frequency_hz, prescale);

        self.set_all_off()
    }

    /// Reprogram the prescaler. Affects every channel.
    ///
    /// The chip is put to sleep with the other MODE1 bits unchanged, the
    /// prescaler written and the chip woken. After the oscillator has settled
    /// the outputs that were running are restarted. [`Pca9685::frequency`]
    /// reports the new rate once the prescaler write went through, even if
    /// the restart then fails.
    pub fn set_frequency(&mut self, frequency_hz: u16) -> Result<(), Error<I2C::Error>> {
        let prescale = prescale_for(frequency_hz).ok_or(Error::InvalidFrequency(frequency_hz))?;
        let rejected =
            |e: pwm_pca9685::Error<I2C::Error>| lift(e, Error::InvalidFrequency(frequency_hz));
        debug!("pwm {} Hz (prescale {})", frequency_hz, prescale);

        self.dev.set_prescale(prescale).map_err(rejected)?;
        // the chip runs at the new rate from here on, even if the restart fails
        self.frequency_hz = frequency_hz;
        self.delay.delay_us(OSCILLATOR_SETTLE_US);
        self.dev.restart(&mut self.delay).map_err(rejected)
    }

    /// Frequency last programmed, 0 before [`Pca9685::initialize`].
    pub fn frequency(&self) -> u16 {
        self.frequency_hz
    }

    /// Program one channel's on/off ticks in a single bus write. Channels
    /// past 15 and ticks past 4095 are rejected before anything goes on the
    /// bus.
    pub fn set_channel(&mut self, channel: u8, on: u16, off: u16) -> Result<(), Error<I2C::Error>> {
        let target = Channel::try_from(channel).map_err(|_| Error::InvalidChannel(channel))?;
        trace!("ch{} on {} off {}", channel, on, off);
        self.dev
            .set_channel_on_off(target, on, off)
            .map_err(|e| lift(e, Error::InvalidDuty { on, off }))
    }

    /// Turn every output off in one transaction.
    pub fn set_all_off(&mut self) -> Result<(), Error<I2C::Error>> {
        self.dev
            .set_channel_on_off(Channel::All, 0, 0)
            .map_err(|e| lift(e, Error::InvalidDuty { on: 0, off: 0 }))
    }

    /// Block for `us` microseconds on the board's delay source, in pieces the
    /// delay's `u32` arguments can carry.
    pub fn hold_us(&mut self, us: u64) {
        let mut ms = us / 1000;
        while ms > 0 {
            let chunk = ms.min(u32::MAX as u64) as u32;
            self.delay.delay_ms(chunk);
            ms -= chunk as u64;
        }
        let rest = (us % 1000) as u32;
        if rest > 0 {
            self.delay.delay_us(rest);
        }
    }

    pub fn release(self) -> (I2C, D) {
        (self.dev.destroy(), self.delay)
    }
}
