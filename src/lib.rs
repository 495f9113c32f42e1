#![cfg_attr(not(test), no_std)]
#![allow(non_snake_case)] // Allow non-snake-case crate name (ThermoLink-rs)

// This mod MUST go first, so that the others see its macros.
mod fmt;

pub mod max31855;

pub use max31855::{Fault, Frame, Max31855, Readings, Unit};

/// The MAX31855 finishes a conversion roughly every 100 ms. Polling faster
/// just returns the previous frame again.
pub const POLL_INTERVAL_MS: u64 = 100;

/// Log a decoded fault for a sensor
pub fn log_fault(sensor_num: u8, fault: Fault) {
    match fault {
        Fault::NoDevice => warn!("Sensor {} - No MAX31855 responding", sensor_num),
        Fault::OpenCircuit => warn!("Sensor {} - Open circuit fault", sensor_num),
        Fault::ShortToGround => warn!("Sensor {} - Short to GND fault", sensor_num),
        Fault::ShortToVcc => warn!("Sensor {} - Short to VCC fault", sensor_num),
        Fault::Unknown(bits) => {
            warn!("Sensor {} - Unrecognised fault bits {:b}", sensor_num, bits)
        }
    }
}

/// Log both channels of a frame for a sensor
pub fn log_frame(sensor_num: u8, frame: Frame) {
    match frame.thermocouple() {
        Ok(celsius) => info!("Sensor {} - Thermocouple {} C", sensor_num, celsius),
        Err(fault) => log_fault(sensor_num, fault),
    }

    // A missing device was already reported above
    if let Ok(celsius) = frame.junction() {
        info!("Sensor {} - Cold junction {} C", sensor_num, celsius);
    }
}
