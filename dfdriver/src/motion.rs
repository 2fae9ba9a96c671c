//! Stepper motion sequencing.
//!
//! Every move runs the same cycle: switch the expander to the stepping
//! frequency, energize the commutation pattern, block for the hold time,
//! de-energize, and switch back to the idle frequency. The frequency change
//! is global, so nothing else may program the expander while a move is in
//! flight.

use embedded_hal::{delay::DelayNs, i2c::I2c};

use dfdriver_common::commutation::{self, Pattern};
use dfdriver_common::motion::{dual_plan, hold_duration_us, is_forward, PlanStep};
use dfdriver_common::{BoardConfig, Direction, StepperFamily, StepperSlot};

use crate::err::Error;
use crate::pwm::Pca9685;

/// One slot's share of a dual move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlotMove {
    pub direction: Direction,
    pub degrees: f32,
}

impl SlotMove {
    pub fn new(direction: Direction, degrees: f32) -> Self {
        Self { direction, degrees }
    }
}

fn apply<I2C: I2c, D: DelayNs>(
    pwm: &mut Pca9685<I2C, D>,
    pattern: &Pattern,
) -> Result<(), Error<I2C::Error>> {
    for drive in pattern {
        pwm.set_channel(drive.channel, drive.duty.on, drive.duty.off)?;
    }
    Ok(())
}

fn release<I2C: I2c, D: DelayNs>(
    pwm: &mut Pca9685<I2C, D>,
    family: StepperFamily,
    slot: StepperSlot,
) -> Result<(), Error<I2C::Error>> {
    trace!("release {}", slot.index());
    for channel in commutation::slot_channels(family, slot) {
        pwm.set_channel(channel, 0, 0)?;
    }
    Ok(())
}

fn energize<I2C: I2c, D: DelayNs>(
    pwm: &mut Pca9685<I2C, D>,
    family: StepperFamily,
    slot: StepperSlot,
    step: SlotMove,
) -> Result<(), Error<I2C::Error>> {
    let forward = is_forward(step.direction, step.degrees);
    apply(pwm, commutation::pattern(family, slot, forward))
}

/// Turn one slot by `step.degrees` and release it.
///
/// A bus error ends the move on the spot. The slot may then be left
/// energized with the expander still at the stepping frequency.
pub fn run_single<I2C: I2c, D: DelayNs>(
    pwm: &mut Pca9685<I2C, D>,
    config: &BoardConfig,
    family: StepperFamily,
    slot: StepperSlot,
    step: SlotMove,
) -> Result<(), Error<I2C::Error>> {
    let hold = hold_duration_us(config.timing.ms_per_rev(family), step.degrees);
    debug!("stepper slot {} hold {} us", slot.index(), hold);

    pwm.set_frequency(config.stepper_frequency_hz)?;
    energize(pwm, family, slot, step)?;
    pwm.hold_us(hold);
    release(pwm, family, slot)?;
    pwm.set_frequency(config.idle_frequency_hz)
}

/// Start both slots at the same instant and release each one once its own
/// hold time has elapsed.
///
/// As with [`run_single`], a bus error part way through leaves whatever was
/// energized holding at the stepping frequency.
pub fn run_dual<I2C: I2c, D: DelayNs>(
    pwm: &mut Pca9685<I2C, D>,
    config: &BoardConfig,
    family: StepperFamily,
    first: SlotMove,
    second: SlotMove,
) -> Result<(), Error<I2C::Error>> {
    let plan = dual_plan(
        config.timing.ms_per_rev(family),
        first.degrees,
        second.degrees,
    );

    pwm.set_frequency(config.stepper_frequency_hz)?;
    energize(pwm, family, StepperSlot::M1M2, first)?;
    energize(pwm, family, StepperSlot::M3M4, second)?;

    for step in plan.steps() {
        match *step {
            PlanStep::Hold(us) => pwm.hold_us(us),
            PlanStep::Release(slot) => release(pwm, family, slot)?,
            PlanStep::ReleaseBoth => {
                release(pwm, family, StepperSlot::M1M2)?;
                release(pwm, family, StepperSlot::M3M4)?;
            }
        }
    }
    if plan.steps().is_empty() {
        warn!("dual stepper move of zero degrees, coils left holding");
    }

    pwm.set_frequency(config.idle_frequency_hz)
}
