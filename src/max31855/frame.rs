use crate::max31855::bits::*;

/// Returned by `read_thermocouple` when the thermocouple is disconnected
pub const FAULT_OPEN: f32 = 10000.0;
/// Returned by `read_thermocouple` when the thermocouple is shorted to ground
pub const FAULT_SHORT_GND: f32 = 10001.0;
/// Returned by `read_thermocouple` when the thermocouple is shorted to VCC
pub const FAULT_SHORT_VCC: f32 = 10002.0;
/// Returned by either read when no MAX31855 is answering
pub const NO_DEVICE: f32 = 10003.0;
/// Returned by `read_thermocouple` when the fault flag is set but the fault
/// type bits don't name exactly one fault
pub const FAULT_UNKNOWN: f32 = 10004.0;

/// A signed two's complement field inside a frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedPoint {
    pub shift: u32,
    pub width: u32,
    /// Degrees Celsius per LSB
    pub resolution: f32,
}

/// Hot junction: bits 31:18, 0.25°C per LSB
pub const THERMOCOUPLE: FixedPoint = FixedPoint {
    shift: TC_SHIFT,
    width: TC_WIDTH,
    resolution: TC_RESOLUTION,
};

/// Cold junction: bits 15:4, 0.0625°C per LSB
pub const JUNCTION: FixedPoint = FixedPoint {
    shift: CJ_SHIFT,
    width: CJ_WIDTH,
    resolution: CJ_RESOLUTION,
};

impl FixedPoint {
    const fn mask(&self) -> u32 {
        (1 << self.width) - 1
    }

    /// The unsigned field, right aligned
    pub const fn field(&self, raw: u32) -> u32 {
        (raw >> self.shift) & self.mask()
    }

    /// The field as signed ADC counts
    pub const fn counts(&self, raw: u32) -> i16 {
        let field = self.field(raw);
        let sign = 1 << (self.width - 1);
        let magnitude = sign - 1;

        if field & sign != 0 {
            -(((!field & magnitude) + 1) as i16)
        } else {
            (field & magnitude) as i16
        }
    }

    /// The field in degrees Celsius
    pub fn celsius(&self, raw: u32) -> f32 {
        self.counts(raw) as f32 * self.resolution
    }

    /// Places a Celsius value on this field's grid, in frame position.
    /// Values off the grid are truncated toward zero.
    pub fn encode(&self, celsius: f32) -> u32 {
        let counts = (celsius / self.resolution) as i32;
        ((counts as u32) & self.mask()) << self.shift
    }
}

/// Device-level conditions that replace a temperature
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Fault {
    /// Reserved bits set, nothing (or not a MAX31855) on the data line
    NoDevice,
    OpenCircuit,
    ShortToGround,
    ShortToVcc,
    /// Fault flag set with none or several of the type bits
    Unknown(u8),
}

impl Fault {
    pub const fn from_type_bits(bits: u8) -> Self {
        match bits & FAULT_TYPE_MASK as u8 {
            0b001 => Fault::OpenCircuit,
            0b010 => Fault::ShortToGround,
            0b100 => Fault::ShortToVcc,
            other => Fault::Unknown(other),
        }
    }

    /// The out-of-range value reported in place of a temperature
    pub const fn sentinel(self) -> f32 {
        match self {
            Fault::OpenCircuit => FAULT_OPEN,
            Fault::ShortToGround => FAULT_SHORT_GND,
            Fault::ShortToVcc => FAULT_SHORT_VCC,
            Fault::NoDevice => NO_DEVICE,
            Fault::Unknown(_) => FAULT_UNKNOWN,
        }
    }
}

/// One 32-bit transfer from the MAX31855
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Frame(u32);

impl Frame {
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }

    pub const fn is_device_present(self) -> bool {
        self.0 & RESERVED_MASK == 0
    }

    pub const fn has_fault(self) -> bool {
        self.0 & FAULT != 0
    }

    /// Whatever keeps this frame from carrying a thermocouple temperature
    pub const fn fault(self) -> Option<Fault> {
        if !self.is_device_present() {
            Some(Fault::NoDevice)
        } else if self.has_fault() {
            Some(Fault::from_type_bits((self.0 & FAULT_TYPE_MASK) as u8))
        } else {
            None
        }
    }

    pub const fn thermocouple_counts(self) -> i16 {
        THERMOCOUPLE.counts(self.0)
    }

    pub const fn junction_counts(self) -> i16 {
        JUNCTION.counts(self.0)
    }

    /// Hot-junction temperature in °C
    pub fn thermocouple(self) -> Result<f32, Fault> {
        match self.fault() {
            Some(fault) => Err(fault),
            None => Ok(THERMOCOUPLE.celsius(self.0)),
        }
    }

    /// Cold-junction temperature in °C. Thermocouple faults don't affect
    /// the reference sensor, so only a missing device is reported.
    pub fn junction(self) -> Result<f32, Fault> {
        if self.is_device_present() {
            Ok(JUNCTION.celsius(self.0))
        } else {
            Err(Fault::NoDevice)
        }
    }
}

impl From<u32> for Frame {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}
