#![allow(dead_code)]
// MAX31855 frame layout. 32 bits, shifted in MSB first.
pub const FRAME_BITS: u32 = 32;

// Thermocouple temperature (bits 31:18), signed 14-bit
pub const TC_SHIFT: u32 = 18;
pub const TC_WIDTH: u32 = 14;
pub const TC_RESOLUTION: f32 = 0.25; // °C per LSB

pub const RESERVED_HIGH: u32 = 1 << 17; // Reserved, always reads 0
pub const FAULT: u32 = 1 << 16; // Set when any fault is active

// Cold-junction temperature (bits 15:4), signed 12-bit
pub const CJ_SHIFT: u32 = 4;
pub const CJ_WIDTH: u32 = 12;
pub const CJ_RESOLUTION: f32 = 0.0625; // °C per LSB

pub const RESERVED_LOW: u32 = 1 << 3; // Reserved, always reads 0

// Fault type bits, only meaningful when FAULT is set
pub const FAULT_SCV: u32 = 1 << 2; // Thermocouple shorted to VCC
pub const FAULT_SCG: u32 = 1 << 1; // Thermocouple shorted to GND
pub const FAULT_OC: u32 = 1 << 0; // Thermocouple open circuit
pub const FAULT_TYPE_MASK: u32 = FAULT_SCV | FAULT_SCG | FAULT_OC;

// Either reserved bit set means there is no MAX31855 on the other end.
// A floating data line pulled up reads all ones and trips this.
pub const RESERVED_MASK: u32 = RESERVED_HIGH | RESERVED_LOW;

// Minimum SCK high/low time from the datasheet
pub const CLOCK_PULSE_NS: u32 = 100;
