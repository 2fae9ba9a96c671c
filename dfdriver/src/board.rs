//! The motor board as a whole: eight servo headers, four DC motor ports and
//! two stepper slots behind one PWM expander.

use embedded_hal::{delay::DelayNs, i2c::I2c};

use dfdriver_common::motion::turns_to_degrees;
use dfdriver_common::{BoardConfig, Direction, InvalidRequestPolicy, StepperFamily, StepperSlot};

use crate::err::Error;
use crate::motion::{self, SlotMove};
use crate::motor::{self, MotorChannels};
use crate::pwm::{servo, Pca9685};

/// An initialized board. Opening it programs the expander once; every
/// operation after that assumes the chip is awake at the idle frequency.
pub struct MotorBoard<I2C, D> {
    pwm: Pca9685<I2C, D>,
    config: BoardConfig,
}

impl<I2C, D> MotorBoard<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    /// Validate `config`, reset the expander and set the idle frequency.
    pub fn open(i2c: I2C, delay: D, config: BoardConfig) -> Result<Self, Error<I2C::Error>> {
        config.validate().map_err(Error::Config)?;
        let mut pwm = Pca9685::new(i2c, delay, config.address)?;
        pwm.initialize(config.idle_frequency_hz)?;
        info!(
            "motor board at {:#x}, {} Hz",
            config.address, config.idle_frequency_hz
        );
        Ok(Self { pwm, config })
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    /// PWM frequency the expander is running at.
    pub fn frequency(&self) -> u16 {
        self.pwm.frequency()
    }

    /// Program a raw channel.
    pub fn set_channel(&mut self, channel: u8, on: u16, off: u16) -> Result<(), Error<I2C::Error>> {
        match self.pwm.set_channel(channel, on, off) {
            Err(e) if e.is_addressing() => self.reject(e),
            other => other,
        }
    }

    /// Point servo `servo` (1..=8) at `degrees` (0..=180, larger values are
    /// clamped to 180).
    pub fn set_servo_angle(&mut self, servo: u8, degrees: u16) -> Result<(), Error<I2C::Error>> {
        let Some(channel) = self.config.servo_channel(servo) else {
            return self.reject(Error::InvalidServo(servo));
        };
        let counts = servo::STANDARD.angle_to_counts(degrees, self.pwm.frequency());
        debug!("servo {} -> {} deg ({} ticks)", servo, degrees, counts.off);
        self.pwm.set_channel(channel, counts.on, counts.off)
    }

    /// Drive motor `motor` (1..=4) at `speed` (0..=255; anything from 256 up
    /// is full duty).
    pub fn run_motor(
        &mut self,
        motor: u8,
        direction: Direction,
        speed: u16,
    ) -> Result<(), Error<I2C::Error>> {
        let Some(leads) = MotorChannels::for_motor(motor) else {
            return self.reject(Error::InvalidMotor(motor));
        };
        let duty = motor::motor_duty(speed, direction);
        let (positive, negative) = motor::lead_duties(duty);
        debug!("motor {} duty {}", motor, duty);
        self.pwm.set_channel(leads.positive, 0, positive)?;
        self.pwm.set_channel(leads.negative, 0, negative)
    }

    pub fn stop_motor(&mut self, motor: u8) -> Result<(), Error<I2C::Error>> {
        let Some(leads) = MotorChannels::for_motor(motor) else {
            return self.reject(Error::InvalidMotor(motor));
        };
        self.pwm.set_channel(leads.negative, 0, 0)?;
        self.pwm.set_channel(leads.positive, 0, 0)
    }

    /// Stop the four DC motor ports, which also de-energizes both stepper
    /// slots. Servos are left alone.
    pub fn stop_all_motors(&mut self) -> Result<(), Error<I2C::Error>> {
        for motor in 1..=dfdriver_common::MOTOR_COUNT {
            self.stop_motor(motor)?;
        }
        Ok(())
    }

    /// Every output off, servos included, in one bus write.
    pub fn stop_all(&mut self) -> Result<(), Error<I2C::Error>> {
        self.pwm.set_all_off()
    }

    /// Turn one stepper by `degrees`. Blocks for the whole move.
    pub fn stepper_move_degrees(
        &mut self,
        slot: StepperSlot,
        family: StepperFamily,
        direction: Direction,
        degrees: f32,
    ) -> Result<(), Error<I2C::Error>> {
        motion::run_single(
            &mut self.pwm,
            &self.config,
            family,
            slot,
            SlotMove::new(direction, degrees),
        )
    }

    pub fn stepper_move_turns(
        &mut self,
        slot: StepperSlot,
        family: StepperFamily,
        direction: Direction,
        turns: f32,
    ) -> Result<(), Error<I2C::Error>> {
        self.stepper_move_degrees(slot, family, direction, turns_to_degrees(turns))
    }

    /// Turn both steppers at once, each by its own angle. A slot asked for
    /// zero degrees stays energized and holding.
    pub fn dual_stepper_move_degrees(
        &mut self,
        family: StepperFamily,
        direction1: Direction,
        degrees1: f32,
        direction2: Direction,
        degrees2: f32,
    ) -> Result<(), Error<I2C::Error>> {
        motion::run_dual(
            &mut self.pwm,
            &self.config,
            family,
            SlotMove::new(direction1, degrees1),
            SlotMove::new(direction2, degrees2),
        )
    }

    pub fn dual_stepper_move_turns(
        &mut self,
        family: StepperFamily,
        direction1: Direction,
        turns1: f32,
        direction2: Direction,
        turns2: f32,
    ) -> Result<(), Error<I2C::Error>> {
        self.dual_stepper_move_degrees(
            family,
            direction1,
            turns_to_degrees(turns1),
            direction2,
            turns_to_degrees(turns2),
        )
    }

    /// Give back the bus and delay.
    pub fn release(self) -> (I2C, D) {
        self.pwm.release()
    }

    fn reject(&self, err: Error<I2C::Error>) -> Result<(), Error<I2C::Error>> {
        match self.config.invalid_request {
            InvalidRequestPolicy::Report => Err(err),
            InvalidRequestPolicy::Ignore => {
                warn!("ignored invalid request");
                Ok(())
            }
        }
    }
}
