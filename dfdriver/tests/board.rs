mod common;

use common::{open, parts, Event, MODE1, PRESCALE};
use dfdriver::pwm::Pca9685;
use dfdriver::{BoardConfig, Direction, Error, InvalidRequestPolicy, MotorBoard};
use dfdriver_common::ConfigError;
use embedded_hal::i2c::{ErrorKind, NoAcknowledgeSource};

#[test]
fn open_programs_the_expander_once() {
    let (bus, delay, chip) = parts(0x67);
    let mut board = MotorBoard::open(bus, delay, BoardConfig::df_driver()).unwrap();

    assert_eq!(
        chip.borrow().events,
        vec![
            Event::Write(vec![MODE1, 0x11]),
            Event::Write(vec![PRESCALE, 121]),
            Event::Write(vec![MODE1, 0x01]),
            Event::DelayUs(5000),
            Event::Write(vec![MODE1, 0x21]),
            Event::Write(vec![0xFA, 0, 0, 0, 0]),
        ]
    );
    assert_eq!(board.frequency(), 50);

    chip.borrow_mut().clear();
    board.set_servo_angle(1, 45).unwrap();
    board.run_motor(2, Direction::Forward, 10).unwrap();

    let chip = chip.borrow();
    assert!(chip.register_writes(MODE1).is_empty());
    assert!(chip.register_writes(PRESCALE).is_empty());
    assert_eq!(chip.write_count(), 3);
}

#[test]
fn open_rejects_bad_config_before_touching_the_bus() {
    let mut config = BoardConfig::df_driver();
    config.servo_channels[3] = config.servo_channels[0];
    let (bus, delay, chip) = parts(config.address);

    let err = MotorBoard::open(bus, delay, config).err().unwrap();
    assert!(matches!(err, Error::Config(_)));
    assert_eq!(chip.borrow().bus_count(), 0);
}

#[test]
fn servo_one_centered() {
    let (mut board, chip) = open(BoardConfig::df_driver());
    board.set_servo_angle(1, 90).unwrap();

    // S1 is wired to channel 15, 90 degrees is 1.5 ms = 307 ticks at 50 Hz
    assert_eq!(
        chip.borrow().events,
        vec![Event::Write(vec![0x42, 0, 0, 0x33, 0x01])]
    );
}

#[test]
fn servo_angle_is_clamped() {
    let (mut board, chip) = open(BoardConfig::df_driver());
    board.set_servo_angle(8, 180).unwrap();
    board.set_servo_angle(8, 500).unwrap();

    let programs = chip.borrow().channel_programs();
    assert_eq!(programs, vec![(8, 0, 491), (8, 0, 491)]);
}

#[test]
fn motor_bit_servo_wiring() {
    let (mut board, chip) = open(BoardConfig::motor_bit());
    board.set_servo_angle(1, 0).unwrap();
    board.set_servo_angle(8, 0).unwrap();

    let programs = chip.borrow().channel_programs();
    assert_eq!(programs, vec![(7, 0, 122), (14, 0, 122)]);
}

#[test]
fn invalid_addressing_is_reported() {
    let (mut board, chip) = open(BoardConfig::df_driver());

    assert_eq!(board.set_servo_angle(0, 90), Err(Error::InvalidServo(0)));
    assert_eq!(board.set_servo_angle(9, 90), Err(Error::InvalidServo(9)));
    assert_eq!(
        board.run_motor(5, Direction::Forward, 100),
        Err(Error::InvalidMotor(5))
    );
    assert_eq!(board.stop_motor(0), Err(Error::InvalidMotor(0)));
    assert_eq!(board.set_channel(16, 0, 100), Err(Error::InvalidChannel(16)));

    assert_eq!(chip.borrow().bus_count(), 0);
}

#[test]
fn invalid_addressing_can_be_ignored() {
    let config = BoardConfig::df_driver().with_policy(InvalidRequestPolicy::Ignore);
    let (mut board, chip) = open(config);

    assert_eq!(board.set_servo_angle(9, 90), Ok(()));
    assert_eq!(board.run_motor(0, Direction::Reverse, 100), Ok(()));
    assert_eq!(board.stop_motor(5), Ok(()));
    assert_eq!(board.set_channel(16, 0, 100), Ok(()));

    assert_eq!(chip.borrow().bus_count(), 0);
}

#[test]
fn duty_past_twelve_bits_is_reported() {
    let (mut board, chip) = open(BoardConfig::df_driver());

    assert_eq!(
        board.set_channel(0, 0, 5000),
        Err(Error::InvalidDuty { on: 0, off: 5000 })
    );
    assert_eq!(
        board.set_channel(3, 4096, 0),
        Err(Error::InvalidDuty { on: 4096, off: 0 })
    );
    assert_eq!(chip.borrow().bus_count(), 0);
    assert_eq!(chip.borrow().channel(0), (0, 0));
}

#[test]
fn duty_past_twelve_bits_can_be_ignored() {
    let config = BoardConfig::df_driver().with_policy(InvalidRequestPolicy::Ignore);
    let (mut board, chip) = open(config);

    assert_eq!(board.set_channel(0, 0, 5000), Ok(()));
    assert_eq!(chip.borrow().bus_count(), 0);
}

#[test]
fn open_refuses_reserved_addresses() {
    for address in [0x00, 0x03, 0x70] {
        let mut config = BoardConfig::df_driver();
        config.address = address;
        let (bus, delay, chip) = parts(address);

        let err = MotorBoard::open(bus, delay, config).err();
        assert_eq!(err, Some(Error::Config(ConfigError::Address(address))));
        assert_eq!(chip.borrow().bus_count(), 0);
    }
}

#[test]
fn raw_channel_write() {
    let (mut board, chip) = open(BoardConfig::df_driver());
    board.set_channel(0, 100, 2000).unwrap();
    board.set_channel(15, 0, 4095).unwrap();

    let chip = chip.borrow();
    assert_eq!(chip.channel(0), (100, 2000));
    assert_eq!(chip.channel(15), (0, 4095));
    assert_eq!(chip.write_count(), 2);
}

#[test]
fn motor_direction_picks_the_lead() {
    let (mut board, chip) = open(BoardConfig::df_driver());

    board.run_motor(1, Direction::Forward, 255).unwrap();
    assert_eq!(chip.borrow().channel_programs(), vec![(7, 0, 4080), (6, 0, 0)]);

    chip.borrow_mut().clear();
    board.run_motor(1, Direction::Reverse, 255).unwrap();
    assert_eq!(chip.borrow().channel_programs(), vec![(7, 0, 0), (6, 0, 4080)]);

    chip.borrow_mut().clear();
    board.run_motor(4, Direction::Forward, 256).unwrap();
    assert_eq!(chip.borrow().channel_programs(), vec![(1, 0, 4095), (0, 0, 0)]);
}

#[test]
fn stopping_motors() {
    let (mut board, chip) = open(BoardConfig::df_driver());

    board.stop_motor(2).unwrap();
    assert_eq!(chip.borrow().channel_programs(), vec![(4, 0, 0), (5, 0, 0)]);

    chip.borrow_mut().clear();
    board.stop_all_motors().unwrap();
    let channels: Vec<u8> = chip
        .borrow()
        .channel_programs()
        .iter()
        .map(|(ch, _, _)| *ch)
        .collect();
    assert_eq!(channels, vec![6, 7, 4, 5, 2, 3, 0, 1]);
}

#[test]
fn stop_all_is_one_write() {
    let (mut board, chip) = open(BoardConfig::df_driver());
    board.stop_all().unwrap();
    assert_eq!(
        chip.borrow().events,
        vec![Event::Write(vec![0xFA, 0, 0, 0, 0])]
    );
}

#[test]
fn bus_failure_surfaces() {
    let (mut board, chip) = open(BoardConfig::df_driver());
    chip.borrow_mut().fail = true;

    assert_eq!(
        board.run_motor(1, Direction::Forward, 100),
        Err(Error::Bus(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)))
    );
}

#[test]
fn open_on_dead_bus() {
    let (bus, delay, chip) = parts(0x67);
    chip.borrow_mut().fail = true;
    let err = MotorBoard::open(bus, delay, BoardConfig::df_driver()).err();
    assert!(matches!(err, Some(Error::Bus(_))));
}

#[test]
fn long_hold_is_split_into_delay_calls() {
    let (bus, delay, chip) = parts(0x67);
    let mut pwm = Pca9685::new(bus, delay, 0x67).unwrap();

    pwm.hold_us(u32::MAX as u64 * 1000 + 1500);
    assert_eq!(
        chip.borrow().delays(),
        vec![u32::MAX as u64 * 1000, 1000, 500]
    );
    assert_eq!(chip.borrow().bus_count(), 0);
}

#[test]
fn release_hands_back_the_bus() {
    let (board, chip) = open(BoardConfig::df_driver());
    let (bus, delay) = board.release();
    let mut board = MotorBoard::open(bus, delay, BoardConfig::df_driver()).unwrap();
    board.stop_all().unwrap();
    assert_eq!(chip.borrow().register_writes(PRESCALE), vec![121]);
}
