//! MAX31855 cold-junction compensated thermocouple converter, read over a
//! bit-banged three wire link.
//!
//! The chip converts continuously (about every 100 ms) and latches the last
//! result while chip select is low. Reading faster than that returns the same
//! frame again.

pub mod bits;
pub mod frame;
pub mod link;

use bits::FRAME_BITS;
pub use frame::{
    FAULT_OPEN, FAULT_SHORT_GND, FAULT_SHORT_VCC, FAULT_UNKNOWN, Fault, FixedPoint, Frame,
    JUNCTION, NO_DEVICE, THERMOCOUPLE,
};
pub use link::{BitSerialLink, GpioError, GpioLink, NoDelay};

/// Temperature unit for the float readings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Unit {
    #[default]
    Celsius,
    Fahrenheit,
    Kelvin,
}

impl Unit {
    /// Converts degrees Celsius into this unit
    pub fn convert(self, celsius: f32) -> f32 {
        match self {
            Unit::Celsius => celsius,
            Unit::Fahrenheit => celsius * 9.0 / 5.0 + 32.0,
            Unit::Kelvin => celsius + 273.15,
        }
    }
}

/// Both channels decoded from a single frame
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Readings {
    /// Thermocouple temperature, or one of the fault sentinels
    pub thermocouple: f32,
    /// Reference junction temperature, or `NO_DEVICE`
    pub junction: f32,
    pub unit: Unit,
}

pub struct Max31855<L> {
    link: L,
}

impl<L: BitSerialLink> Max31855<L> {
    /// Takes ownership of the link and puts the lines in their idle state
    pub fn new(mut link: L) -> Result<Self, L::Error> {
        link.idle()?;
        Ok(Self { link })
    }

    pub fn release(self) -> L {
        self.link
    }

    /// Shift in one 32-bit frame, MSB first
    pub fn read_frame(&mut self) -> Result<Frame, L::Error> {
        self.link.select()?;

        let raw = match self.shift_in() {
            Ok(raw) => raw,
            Err(err) => {
                // Best effort, keep the first error
                self.link.idle().ok();
                return Err(err);
            }
        };

        self.link.deselect()?;
        trace!("MAX31855 frame {:08X}", raw);

        Ok(Frame::new(raw))
    }

    fn shift_in(&mut self) -> Result<u32, L::Error> {
        let mut raw = 0u32;

        for bit in (0..FRAME_BITS).rev() {
            self.link.clock_high()?;
            if self.link.read_bit()? {
                raw |= 1 << bit;
            }
            self.link.clock_low()?;
        }

        Ok(raw)
    }

    /// Thermocouple temperature in `unit`, or `FAULT_OPEN`, `FAULT_SHORT_GND`,
    /// `FAULT_SHORT_VCC`, `FAULT_UNKNOWN` or `NO_DEVICE`
    pub fn read_thermocouple(&mut self, unit: Unit) -> Result<f32, L::Error> {
        let frame = self.read_frame()?;
        Ok(reading(frame.thermocouple(), unit))
    }

    /// Reference junction temperature in `unit`, or `NO_DEVICE`
    pub fn read_junction(&mut self, unit: Unit) -> Result<f32, L::Error> {
        let frame = self.read_frame()?;
        Ok(reading(frame.junction(), unit))
    }

    pub fn read_all(&mut self, unit: Unit) -> Result<Readings, L::Error> {
        let frame = self.read_frame()?;
        Ok(Readings {
            thermocouple: reading(frame.thermocouple(), unit),
            junction: reading(frame.junction(), unit),
            unit,
        })
    }
}

fn reading(decoded: Result<f32, Fault>, unit: Unit) -> f32 {
    match decoded {
        Ok(celsius) => unit.convert(celsius),
        Err(fault) => {
            debug!("MAX31855 fault: {:?}", fault);
            fault.sentinel()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::bits::{
        CJ_SHIFT, CLOCK_PULSE_NS, FAULT, FAULT_OC, FAULT_SCG, FAULT_SCV, RESERVED_HIGH,
        RESERVED_LOW, TC_SHIFT,
    };
    use embedded_hal::delay::DelayNs;
    use embedded_hal_mock::eh1::MockError;
    use embedded_hal_mock::eh1::digital::{
        Mock as PinMock, State as PinState, Transaction as PinTransaction,
    };
    use std::io;

    fn idle() -> (Vec<PinTransaction>, Vec<PinTransaction>) {
        (
            vec![PinTransaction::set(PinState::High)],
            vec![PinTransaction::set(PinState::Low)],
        )
    }

    /// Expectations for one frame read returning `raw`
    fn frame_expectations(
        raw: u32,
        miso: &mut Vec<PinTransaction>,
        cs: &mut Vec<PinTransaction>,
        sck: &mut Vec<PinTransaction>,
    ) {
        cs.push(PinTransaction::set(PinState::Low));
        for bit in (0..32).rev() {
            sck.push(PinTransaction::set(PinState::High));
            let state = if raw & (1 << bit) != 0 {
                PinState::High
            } else {
                PinState::Low
            };
            miso.push(PinTransaction::get(state));
            sck.push(PinTransaction::set(PinState::Low));
        }
        cs.push(PinTransaction::set(PinState::High));
    }

    fn sensor_reading(frames: &[u32]) -> Max31855<GpioLink<PinMock, PinMock, PinMock>> {
        let (mut cs, mut sck) = idle();
        let mut miso = Vec::new();
        for &raw in frames {
            frame_expectations(raw, &mut miso, &mut cs, &mut sck);
        }

        let link = GpioLink::new(PinMock::new(&miso), PinMock::new(&cs), PinMock::new(&sck));
        Max31855::new(link).unwrap()
    }

    fn done(sensor: Max31855<GpioLink<PinMock, PinMock, PinMock>>) {
        let (mut miso, mut cs, mut sck, _) = sensor.release().release();
        miso.done();
        cs.done();
        sck.done();
    }

    #[test]
    fn new_idles_the_lines() {
        let sensor = sensor_reading(&[]);
        done(sensor);
    }

    #[test]
    fn read_frame_shifts_msb_first() {
        let mut sensor = sensor_reading(&[0x8000_0001, 0x1234_5670]);
        assert_eq!(sensor.read_frame().unwrap().raw(), 0x8000_0001);
        assert_eq!(sensor.read_frame().unwrap().raw(), 0x1234_5670);
        done(sensor);
    }

    #[test]
    fn thermocouple_readings() {
        let mut sensor = sensor_reading(&[
            0,
            0x3F60 << TC_SHIFT,
            100 << TC_SHIFT,
            100 << TC_SHIFT,
            100 << TC_SHIFT,
        ]);
        assert_eq!(sensor.read_thermocouple(Unit::Celsius).unwrap(), 0.0);
        assert_eq!(sensor.read_thermocouple(Unit::Celsius).unwrap(), -40.0);
        assert_eq!(sensor.read_thermocouple(Unit::Celsius).unwrap(), 25.0);
        assert_eq!(sensor.read_thermocouple(Unit::Fahrenheit).unwrap(), 77.0);
        assert_eq!(sensor.read_thermocouple(Unit::Kelvin).unwrap(), 298.15);
        done(sensor);
    }

    #[test]
    fn thermocouple_faults() {
        let mut sensor = sensor_reading(&[
            FAULT | FAULT_OC,
            FAULT | FAULT_SCG,
            FAULT | FAULT_SCV,
            FAULT,
            RESERVED_HIGH,
            RESERVED_LOW,
            u32::MAX,
        ]);
        let expected = [
            FAULT_OPEN,
            FAULT_SHORT_GND,
            FAULT_SHORT_VCC,
            FAULT_UNKNOWN,
            NO_DEVICE,
            NO_DEVICE,
            NO_DEVICE,
        ];
        for sentinel in expected {
            // Sentinels are never unit converted
            assert_eq!(sensor.read_thermocouple(Unit::Fahrenheit).unwrap(), sentinel);
        }
        done(sensor);
    }

    #[test]
    fn junction_readings() {
        let mut sensor = sensor_reading(&[
            0x190 << CJ_SHIFT,
            (0x190 << CJ_SHIFT) | FAULT | FAULT_SCG,
            0xEC0 << CJ_SHIFT,
            u32::MAX,
        ]);
        assert_eq!(sensor.read_junction(Unit::Celsius).unwrap(), 25.0);
        assert_eq!(sensor.read_junction(Unit::Celsius).unwrap(), 25.0);
        assert_eq!(sensor.read_junction(Unit::Fahrenheit).unwrap(), -4.0);
        assert_eq!(sensor.read_junction(Unit::Celsius).unwrap(), NO_DEVICE);
        done(sensor);
    }

    #[test]
    fn read_all_uses_one_frame() {
        let mut sensor = sensor_reading(&[(100 << TC_SHIFT) | (0x190 << CJ_SHIFT)]);
        assert_eq!(
            sensor.read_all(Unit::Celsius).unwrap(),
            Readings {
                thermocouple: 25.0,
                junction: 25.0,
                unit: Unit::Celsius,
            }
        );
        done(sensor);
    }

    #[test]
    fn pin_error_returns_lines_to_idle() {
        let err = MockError::Io(io::ErrorKind::NotConnected);
        let miso = vec![
            PinTransaction::get(PinState::High),
            PinTransaction::get(PinState::High).with_error(err.clone()),
        ];
        let cs = vec![
            PinTransaction::set(PinState::High),
            PinTransaction::set(PinState::Low),
            PinTransaction::set(PinState::High),
        ];
        let sck = vec![
            PinTransaction::set(PinState::Low),
            PinTransaction::set(PinState::High),
            PinTransaction::set(PinState::Low),
            PinTransaction::set(PinState::High),
            PinTransaction::set(PinState::Low),
        ];

        let link = GpioLink::new(PinMock::new(&miso), PinMock::new(&cs), PinMock::new(&sck));
        let mut sensor = Max31855::new(link).unwrap();

        assert_eq!(sensor.read_frame(), Err(GpioError::Data(err)));
        done(sensor);
    }

    #[derive(Default)]
    struct CountingDelay {
        calls: u32,
        total_ns: u32,
    }

    impl DelayNs for CountingDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.calls += 1;
            self.total_ns += ns;
        }
    }

    #[test]
    fn delay_stretches_every_clock_edge() {
        let (mut cs, mut sck) = idle();
        let mut miso = Vec::new();
        frame_expectations(0, &mut miso, &mut cs, &mut sck);

        let link = GpioLink::with_delay(
            PinMock::new(&miso),
            PinMock::new(&cs),
            PinMock::new(&sck),
            CountingDelay::default(),
        );
        let mut sensor = Max31855::new(link).unwrap();
        sensor.read_frame().unwrap();

        let (mut miso, mut cs, mut sck, delay) = sensor.release().release();
        // One for the idle clock low, then two per bit
        assert_eq!(delay.calls, 1 + 2 * 32);
        assert_eq!(delay.total_ns, (1 + 2 * 32) * CLOCK_PULSE_NS);
        miso.done();
        cs.done();
        sck.done();
    }
}
