#![deny(unsafe_code)]
#![no_main]
#![no_std]

use defmt::info;
use defmt_rtt as _;
use dfdriver::err::log::log_err;
use dfdriver::{BoardConfig, Direction, MotorBoard, StepperFamily, StepperSlot};
use panic_probe as _;
use rtic_monotonics::systick_monotonic;
use rtic_monotonics::Monotonic;
systick_monotonic!(Mono, 1000);
use stm32f4xx_hal::{i2c::I2c1, pac::TIM2, prelude::*, timer::Delay};

type Board = MotorBoard<I2c1, Delay<TIM2, 1_000_000>>;

#[rtic::app(device = stm32f4xx_hal::pac, peripherals = true)]
mod app {

    use super::*;

    #[shared]
    struct Shared {}

    #[local]
    struct Local {
        board: Board,
    }

    #[init]
    fn init(cx: init::Context) -> (Shared, Local) {
        let dp = cx.device;
        let rcc = dp.RCC.constrain();
        let hse = 12.MHz();
        let sysclk = 64.MHz();
        let clocks = rcc.cfgr.use_hse(hse).sysclk(sysclk).freeze();

        Mono::start(cx.core.SYST, sysclk.to_Hz());

        // microsecond delay for the stepper holds
        let delay = dp.TIM2.delay_us(&clocks);

        info!("motor board demo");
        let gpiob = dp.GPIOB.split();
        let gpioc = dp.GPIOC.split();

        let i2c1_scl = gpiob.pb8.into_alternate_open_drain();
        let i2c1_sda = gpiob.pb9.into_alternate_open_drain();
        let i2c1 = I2c1::new(dp.I2C1, (i2c1_scl, i2c1_sda), 400.kHz(), &clocks);

        let board = MotorBoard::open(i2c1, delay, BoardConfig::df_driver()).unwrap();

        info!("pwm enable pin");
        let mut output_en = gpioc.pc3.into_push_pull_output();
        output_en.set_low();

        demo_task::spawn().unwrap();

        (Shared {}, Local { board })
    }

    #[task(local=[board])]
    async fn demo_task(cx: demo_task::Context) {
        let board = cx.local.board;

        loop {
            // sweep servo 1
            for angle in (0..=180).step_by(10) {
                let now = Mono::now();
                if let Err(e) = board.set_servo_angle(1, angle) {
                    log_err(&e);
                }
                Mono::delay_until(now + 50u32.millis()).await;
            }

            // ramp motor 1 both ways
            for direction in [Direction::Forward, Direction::Reverse] {
                for speed in (0..=255).step_by(15) {
                    let now = Mono::now();
                    if let Err(e) = board.run_motor(1, direction, speed) {
                        log_err(&e);
                    }
                    Mono::delay_until(now + 100u32.millis()).await;
                }
            }
            if let Err(e) = board.stop_all_motors() {
                log_err(&e);
            }

            // steppers block for the whole move
            let now = Mono::now();
            if let Err(e) = board.stepper_move_turns(
                StepperSlot::M1M2,
                StepperFamily::Bipolar42,
                Direction::Forward,
                1.0,
            ) {
                log_err(&e);
            }
            if let Err(e) = board.dual_stepper_move_degrees(
                StepperFamily::Bipolar42,
                Direction::Forward,
                90.0,
                Direction::Reverse,
                180.0,
            ) {
                log_err(&e);
            }
            Mono::delay_until(now + 2000u32.millis()).await;
        }
    }
}
