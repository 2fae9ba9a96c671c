use embedded_hal::i2c::{self, ErrorKind, NoAcknowledgeSource};

use super::Error;

// compact code for an i2c failure, same numbering on every board revision
pub fn i2c_code(kind: ErrorKind) -> u8 {
    match kind {
        ErrorKind::Overrun => 0x01,
        ErrorKind::Bus => 0x03,
        ErrorKind::ArbitrationLoss => 0x04,
        ErrorKind::NoAcknowledge(source) => match source {
            NoAcknowledgeSource::Address => 0x05,
            NoAcknowledgeSource::Unknown => 0x06,
            NoAcknowledgeSource::Data => 0x07,
        },
        _ => 0x09,
    }
}

// For now, just print to the RTT console.
pub fn log_err<E: i2c::Error>(err: &Error<E>) {
    match err {
        Error::Bus(e) => error!("I2C {:x}", i2c_code(e.kind())),
        Error::InvalidChannel(c) => error!("channel {} out of range", c),
        Error::InvalidDuty { on, off } => error!("duty {}/{} out of range", on, off),
        Error::InvalidServo(s) => error!("servo {} out of range", s),
        Error::InvalidMotor(m) => error!("motor {} out of range", m),
        Error::InvalidSlot(s) => error!("stepper slot {} out of range", s),
        Error::UnknownFamily(f) => error!("stepper family {} unknown", f),
        Error::InvalidDirection(d) => error!("direction {} invalid", d),
        Error::InvalidFrequency(hz) => error!("frequency {} Hz out of range", hz),
        Error::Config(e) => error!("config {}", e),
    }
}
