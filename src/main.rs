#![deny(unsafe_code)]
#![no_std]
#![no_main]

use {defmt_rtt as _, panic_probe as _};

use ThermoLink_rs::max31855::{GpioLink, Max31855};
use ThermoLink_rs::{POLL_INTERVAL_MS, Unit, log_frame};

use defmt::{info, warn};

use embassy_executor::Spawner;
use embassy_stm32::Config;
use embassy_stm32::gpio::{Input, Level, Output, Pull, Speed};
use embassy_stm32::rcc::{
    AHBPrescaler, APBPrescaler, Hse, HseMode, Pll, PllDiv, PllMul, PllPreDiv, PllSource, Sysclk,
    VoltageScale,
};
use embassy_stm32::time::Hertz;
use embassy_time::{Delay, Timer};

#[embassy_executor::main]
async fn main(_spawner: Spawner) -> ! {
    let mut config = Config::default();
    config.rcc.hsi = None;
    config.rcc.hse = Some(Hse {
        freq: Hertz(25_000_000),
        mode: HseMode::Oscillator,
    });
    config.rcc.pll1 = Some(Pll {
        source: PllSource::HSE,
        prediv: PllPreDiv::DIV5,
        mul: PllMul::MUL100,
        divp: Some(PllDiv::DIV2),
        divq: None,
        divr: None,
    });
    config.rcc.apb3_pre = APBPrescaler::DIV2; // 125 MHz
    config.rcc.ahb_pre = AHBPrescaler::DIV1;
    config.rcc.apb1_pre = APBPrescaler::DIV2; // 125 MHz
    config.rcc.apb2_pre = APBPrescaler::DIV2; // 125 MHz
    config.rcc.sys = Sysclk::PLL1_P;
    config.rcc.voltage_scale = VoltageScale::Scale0;
    let p = embassy_stm32::init(config);
    info!("Hello World!");

    // Pull-up on SO so a missing board reads as all ones
    let so = Input::new(p.PB4, Pull::Up);
    let cs = Output::new(p.PA15, Level::High, Speed::VeryHigh);
    let sck = Output::new(p.PB3, Level::Low, Speed::VeryHigh);

    // 250 MHz core toggles GPIOs faster than the 100 ns minimum SCK pulse
    let link = GpioLink::with_delay(so, cs, sck, Delay);
    let mut sensor = Max31855::new(link).expect("Failed to idle MAX31855 lines");

    let mut sample = 0u32;
    loop {
        match sensor.read_frame() {
            Ok(frame) => {
                log_frame(1, frame);
                if sample % 10 == 0 {
                    if let Ok(readings) = sensor.read_all(Unit::Fahrenheit) {
                        info!(
                            "Fahrenheit: TC={} CJ={}",
                            readings.thermocouple, readings.junction
                        );
                    }
                }
            }
            Err(e) => warn!("MAX31855 link error: {:?}", e),
        }

        sample = sample.wrapping_add(1);
        Timer::after_millis(POLL_INTERVAL_MS).await;
    }
}
