//! Hold timing for stepper moves.
//!
//! A move energizes a commutation pattern, waits a time proportional to the
//! requested angle and releases the coils. For two slots started together the
//! releases are staggered so each slot is held for exactly its own duration.

use crate::{Direction, StepperSlot};

pub const DEGREES_PER_TURN: f32 = 360.0;

/// Hold time in microseconds for `degrees` of rotation, given the family's
/// budget per revolution. The sign of `degrees` is ignored. Saturates at
/// `u64::MAX`.
pub fn hold_duration_us(ms_per_rev: u32, degrees: f32) -> u64 {
    let degrees = libm::fabs(degrees as f64);
    let us = libm::round(ms_per_rev as f64 * 1000.0 * degrees / DEGREES_PER_TURN as f64);
    // NaN and out-of-range values saturate
    us as u64
}

/// A move turns forward when the requested angle and the direction agree,
/// so `Reverse` with a negative angle is a forward move.
pub fn is_forward(direction: Direction, degrees: f32) -> bool {
    degrees * direction.sign() as f32 > 0.0
}

pub fn turns_to_degrees(turns: f32) -> f32 {
    turns * DEGREES_PER_TURN
}

#[cfg_attr(feature = "no_std", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanStep {
    /// Keep everything as it is for this many microseconds.
    Hold(u64),
    /// De-energize one slot.
    Release(StepperSlot),
    /// De-energize both slots at once.
    ReleaseBoth,
}

/// Ordered release schedule for a dual-stepper move.
#[cfg_attr(feature = "no_std", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DualPlan {
    steps: [PlanStep; 4],
    len: usize,
}

impl DualPlan {
    fn new() -> Self {
        Self {
            steps: [PlanStep::Hold(0); 4],
            len: 0,
        }
    }

    fn push(&mut self, step: PlanStep) {
        self.steps[self.len] = step;
        self.len += 1;
    }

    pub fn steps(&self) -> &[PlanStep] {
        &self.steps[..self.len]
    }
}

/// Schedule for both slots energized at the same instant.
///
/// - both zero: nothing is released, the coils keep holding
/// - one zero: wait for the other one, release only the slot that moved
/// - equal: one wait, both released together
/// - otherwise: release the shorter move first, then wait out the remainder
///   of the longer one
///
/// The remainder is the difference of the two rounded holds so the longer
/// slot's total is exactly its own hold time.
pub fn dual_plan(ms_per_rev: u32, degrees1: f32, degrees2: f32) -> DualPlan {
    let mut plan = DualPlan::new();
    let zero1 = degrees1 == 0.0;
    let zero2 = degrees2 == 0.0;
    let hold1 = hold_duration_us(ms_per_rev, degrees1);
    let hold2 = hold_duration_us(ms_per_rev, degrees2);

    match (zero1, zero2) {
        (true, true) => {}
        (true, false) => {
            plan.push(PlanStep::Hold(hold2));
            plan.push(PlanStep::Release(StepperSlot::M3M4));
        }
        (false, true) => {
            plan.push(PlanStep::Hold(hold1));
            plan.push(PlanStep::Release(StepperSlot::M1M2));
        }
        (false, false) if hold1 == hold2 => {
            plan.push(PlanStep::Hold(hold1));
            plan.push(PlanStep::ReleaseBoth);
        }
        (false, false) => {
            let (first, second, short, long) = if hold1 < hold2 {
                (StepperSlot::M1M2, StepperSlot::M3M4, hold1, hold2)
            } else {
                (StepperSlot::M3M4, StepperSlot::M1M2, hold2, hold1)
            };
            plan.push(PlanStep::Hold(short));
            plan.push(PlanStep::Release(first));
            plan.push(PlanStep::Hold(long - short));
            plan.push(PlanStep::Release(second));
        }
    }
    plan
}
