#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use dfdriver::{BoardConfig, MotorBoard};
use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, NoAcknowledgeSource, Operation};

pub const MODE1: u8 = 0x00;
pub const PRESCALE: u8 = 0xFE;

const RESTART: u8 = 0x80;
const SLEEP: u8 = 0x10;

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Register write: pointer byte followed by data.
    Write(Vec<u8>),
    /// Single-register read.
    Read(u8),
    DelayUs(u64),
}

/// Register file of a fake PCA9685 plus a timeline of everything the bus and
/// the delay saw, in order.
pub struct Chip {
    pub address: u8,
    pub registers: [u8; 256],
    pub events: Vec<Event>,
    pub fail: bool,
    /// Refuse reads only, writes still land.
    pub fail_reads: bool,
}

pub type SharedChip = Rc<RefCell<Chip>>;

impl Chip {
    pub fn new(address: u8) -> SharedChip {
        Rc::new(RefCell::new(Chip {
            address,
            registers: [0; 256],
            events: Vec::new(),
            fail: false,
            fail_reads: false,
        }))
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn write_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, Event::Write(_)))
            .count()
    }

    pub fn bus_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| !matches!(e, Event::DelayUs(_)))
            .count()
    }

    /// Values written to `register` with a single-byte write.
    pub fn register_writes(&self, register: u8) -> Vec<u8> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::Write(b) if b.len() == 2 && b[0] == register => Some(b[1]),
                _ => None,
            })
            .collect()
    }

    /// `(channel, on, off)` for every per-channel program, in order.
    pub fn channel_programs(&self) -> Vec<(u8, u16, u16)> {
        self.events.iter().filter_map(decode_program).collect()
    }

    pub fn delays(&self) -> Vec<u64> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::DelayUs(us) => Some(*us),
                _ => None,
            })
            .collect()
    }

    // RESTART reads back set once the chip has been put to sleep and is
    // cleared by writing a one to it
    fn write_mode1(&mut self, value: u8) {
        let old = self.registers[MODE1 as usize];
        self.registers[MODE1 as usize] = if value & RESTART != 0 {
            value & !RESTART
        } else if value & SLEEP != 0 {
            value | RESTART
        } else {
            value | (old & RESTART)
        };
    }

    pub fn channel(&self, channel: u8) -> (u16, u16) {
        let base = 0x06 + 4 * channel as usize;
        let r = &self.registers;
        (
            u16::from_le_bytes([r[base], r[base + 1]]),
            u16::from_le_bytes([r[base + 2], r[base + 3]]),
        )
    }
}

pub fn decode_program(event: &Event) -> Option<(u8, u16, u16)> {
    match event {
        Event::Write(b) if b.len() == 5 && (0x06..=0x45).contains(&b[0]) => Some((
            (b[0] - 0x06) / 4,
            u16::from_le_bytes([b[1], b[2]]),
            u16::from_le_bytes([b[3], b[4]]),
        )),
        _ => None,
    }
}

pub struct Bus {
    chip: SharedChip,
}

impl ErrorType for Bus {
    type Error = ErrorKind;
}

impl I2c for Bus {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        let mut chip = self.chip.borrow_mut();
        if chip.fail {
            return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
        }
        assert_eq!(address, chip.address, "wrong device address");

        let mut pointer = 0usize;
        for op in operations.iter_mut() {
            match op {
                Operation::Write(bytes) => {
                    pointer = bytes[0] as usize;
                    if bytes.len() == 1 {
                        continue;
                    }
                    if pointer == MODE1 as usize && bytes.len() == 2 {
                        chip.write_mode1(bytes[1]);
                    } else {
                        for (i, b) in bytes[1..].iter().enumerate() {
                            chip.registers[(pointer + i) % 256] = *b;
                        }
                    }
                    chip.events.push(Event::Write(bytes.to_vec()));
                }
                Operation::Read(buf) => {
                    if chip.fail_reads {
                        return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Data));
                    }
                    for (i, b) in buf.iter_mut().enumerate() {
                        *b = chip.registers[(pointer + i) % 256];
                    }
                    chip.events.push(Event::Read(pointer as u8));
                }
            }
        }
        Ok(())
    }
}

pub struct Delay {
    chip: SharedChip,
}

impl DelayNs for Delay {
    fn delay_ns(&mut self, ns: u32) {
        self.chip.borrow_mut().events.push(Event::DelayUs(ns as u64 / 1000));
    }

    fn delay_us(&mut self, us: u32) {
        self.chip.borrow_mut().events.push(Event::DelayUs(us as u64));
    }

    fn delay_ms(&mut self, ms: u32) {
        self.chip.borrow_mut().events.push(Event::DelayUs(ms as u64 * 1000));
    }
}

pub fn parts(address: u8) -> (Bus, Delay, SharedChip) {
    let chip = Chip::new(address);
    (
        Bus { chip: chip.clone() },
        Delay { chip: chip.clone() },
        chip,
    )
}

/// Open a board on a fresh fake chip and forget the initialization traffic.
pub fn open(config: BoardConfig) -> (MotorBoard<Bus, Delay>, SharedChip) {
    let (bus, delay, chip) = parts(config.address);
    let board = MotorBoard::open(bus, delay, config).unwrap();
    chip.borrow_mut().clear();
    (board, chip)
}

/// Time from the first non-zero program of any of `channels` to the point
/// where all of them have been programmed back to zero, summed over delays.
pub fn energized_us(events: &[Event], channels: &[u8]) -> Option<u64> {
    let mut elapsed = 0u64;
    let mut start = None;
    let mut zeroed = Vec::new();
    for event in events {
        if let Event::DelayUs(us) = event {
            elapsed += us;
            continue;
        }
        let Some((ch, on, off)) = decode_program(event) else {
            continue;
        };
        if !channels.contains(&ch) {
            continue;
        }
        if (on, off) == (0, 0) {
            if start.is_some() && !zeroed.contains(&ch) {
                zeroed.push(ch);
                if zeroed.len() == channels.len() {
                    return Some(elapsed - start.unwrap());
                }
            }
        } else if start.is_none() {
            start = Some(elapsed);
        }
    }
    None
}

/// Index in `events` of the first zero program of any of `channels`.
pub fn first_release(events: &[Event], channels: &[u8]) -> Option<usize> {
    events.iter().position(|e| {
        matches!(decode_program(e), Some((ch, 0, 0)) if channels.contains(&ch))
    })
}
