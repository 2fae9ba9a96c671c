//! Fixed phase-energization snapshots for the two stepper families.
//!
//! A stepper is not pulsed step by step. The four coils are driven with
//! phase-shifted PWM windows and held for a computed time, so each family and
//! direction reduces to one pattern of four `(channel, on, off)` programs.

use static_assertions::const_assert;

use crate::{StepperFamily, StepperSlot};

/// On/off tick pair within the 4096-tick PWM period.
#[cfg_attr(feature = "no_std", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseDuty {
    pub on: u16,
    pub off: u16,
}

#[cfg_attr(feature = "no_std", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelDuty {
    pub channel: u8,
    pub duty: PhaseDuty,
}

pub type Pattern = [ChannelDuty; 4];

const fn phase(on: u16, off: u16) -> PhaseDuty {
    PhaseDuty { on, off }
}

const fn drive(channel: u8, duty: PhaseDuty) -> ChannelDuty {
    ChannelDuty { channel, duty }
}

// 28BYJ-48
const UNI_A: PhaseDuty = phase(2047, 4095);
const UNI_B: PhaseDuty = phase(1, 2047);
const UNI_C: PhaseDuty = phase(1023, 3071);
const UNI_D: PhaseDuty = phase(3071, 1023);

// 42BYGH1861A-C
const BI_A: PhaseDuty = phase(3071, 1023);
const BI_B: PhaseDuty = phase(1023, 3071);
const BI_C: PhaseDuty = phase(4095, 2047);
const BI_D: PhaseDuty = phase(2047, 4095);

/// Indexed `[slot][forward, reverse]`.
const UNIPOLAR: [[Pattern; 2]; 2] = [
    [
        [drive(0, UNI_A), drive(2, UNI_B), drive(1, UNI_C), drive(3, UNI_D)],
        [drive(3, UNI_A), drive(1, UNI_B), drive(2, UNI_C), drive(0, UNI_D)],
    ],
    [
        [drive(4, UNI_A), drive(6, UNI_B), drive(5, UNI_C), drive(7, UNI_D)],
        [drive(7, UNI_A), drive(5, UNI_B), drive(6, UNI_C), drive(4, UNI_D)],
    ],
];

const BIPOLAR: [[Pattern; 2]; 2] = [
    [
        [drive(7, BI_A), drive(6, BI_B), drive(5, BI_C), drive(4, BI_D)],
        [drive(7, BI_C), drive(6, BI_D), drive(5, BI_A), drive(4, BI_B)],
    ],
    [
        [drive(3, BI_A), drive(2, BI_B), drive(1, BI_C), drive(0, BI_D)],
        [drive(3, BI_C), drive(2, BI_D), drive(1, BI_A), drive(0, BI_B)],
    ],
];

/// Every pattern stays on the eight motor-driver channels and both directions
/// of a slot energize the same four channels.
const fn well_formed(table: &[[Pattern; 2]; 2]) -> bool {
    let mut slot = 0;
    while slot < 2 {
        let mut i = 0;
        while i < 4 {
            let fwd = table[slot][0][i].channel;
            if fwd >= 8 {
                return false;
            }
            let mut found = false;
            let mut j = 0;
            while j < 4 {
                if table[slot][1][j].channel == fwd {
                    found = true;
                }
                j += 1;
            }
            if !found {
                return false;
            }
            i += 1;
        }
        slot += 1;
    }
    true
}

const_assert!(well_formed(&UNIPOLAR));
const_assert!(well_formed(&BIPOLAR));

/// The pattern to hold for `slot` turning `forward` or in reverse.
pub fn pattern(family: StepperFamily, slot: StepperSlot, forward: bool) -> &'static Pattern {
    let table = match family {
        StepperFamily::Unipolar28 => &UNIPOLAR,
        StepperFamily::Bipolar42 => &BIPOLAR,
    };
    &table[slot.index()][if forward { 0 } else { 1 }]
}

/// Channels energized by `slot`, in forward-pattern order.
pub fn slot_channels(family: StepperFamily, slot: StepperSlot) -> [u8; 4] {
    pattern(family, slot, true).map(|drive| drive.channel)
}
