use crate::max31855::bits::CLOCK_PULSE_NS;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

/// The three wires of the MAX31855 read-only serial interface.
///
/// Chip select is active low, data is sampled while the clock is high.
pub trait BitSerialLink {
    type Error;

    /// Drive chip select low
    fn select(&mut self) -> Result<(), Self::Error>;
    /// Drive chip select high, which also starts a new conversion
    fn deselect(&mut self) -> Result<(), Self::Error>;
    fn clock_high(&mut self) -> Result<(), Self::Error>;
    fn clock_low(&mut self) -> Result<(), Self::Error>;
    fn read_bit(&mut self) -> Result<bool, Self::Error>;

    /// Chip deselected, clock low
    fn idle(&mut self) -> Result<(), Self::Error> {
        self.deselect()?;
        self.clock_low()
    }
}

impl<L: BitSerialLink + ?Sized> BitSerialLink for &mut L {
    type Error = L::Error;

    fn select(&mut self) -> Result<(), Self::Error> {
        L::select(self)
    }

    fn deselect(&mut self) -> Result<(), Self::Error> {
        L::deselect(self)
    }

    fn clock_high(&mut self) -> Result<(), Self::Error> {
        L::clock_high(self)
    }

    fn clock_low(&mut self) -> Result<(), Self::Error> {
        L::clock_low(self)
    }

    fn read_bit(&mut self) -> Result<bool, Self::Error> {
        L::read_bit(self)
    }

    fn idle(&mut self) -> Result<(), Self::Error> {
        L::idle(self)
    }
}

/// Pin errors, tagged with the line that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GpioError<DataE, SelectE, ClockE> {
    Data(DataE),
    Select(SelectE),
    Clock(ClockE),
}

/// Used when the host is slow enough that a GPIO write already exceeds
/// the minimum clock pulse width
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

impl DelayNs for NoDelay {
    #[inline(always)]
    fn delay_ns(&mut self, _ns: u32) {}
}

/// Bit-banged link over three GPIOs.
///
/// The data pin should be created with its pull-up enabled so an absent
/// device reads as all ones rather than floating.
pub struct GpioLink<MISO, CS, SCK, D = NoDelay> {
    miso: MISO,
    cs: CS,
    sck: SCK,
    delay: D,
}

impl<MISO, CS, SCK> GpioLink<MISO, CS, SCK, NoDelay>
where
    MISO: InputPin,
    CS: OutputPin,
    SCK: OutputPin,
{
    pub fn new(miso: MISO, cs: CS, sck: SCK) -> Self {
        Self::with_delay(miso, cs, sck, NoDelay)
    }
}

impl<MISO, CS, SCK, D> GpioLink<MISO, CS, SCK, D>
where
    MISO: InputPin,
    CS: OutputPin,
    SCK: OutputPin,
    D: DelayNs,
{
    /// Holds each clock level for at least `CLOCK_PULSE_NS` using `delay`
    pub fn with_delay(miso: MISO, cs: CS, sck: SCK, delay: D) -> Self {
        Self {
            miso,
            cs,
            sck,
            delay,
        }
    }

    pub fn release(self) -> (MISO, CS, SCK, D) {
        (self.miso, self.cs, self.sck, self.delay)
    }
}

impl<MISO, CS, SCK, D> BitSerialLink for GpioLink<MISO, CS, SCK, D>
where
    MISO: InputPin,
    CS: OutputPin,
    SCK: OutputPin,
    D: DelayNs,
{
    type Error = GpioError<MISO::Error, CS::Error, SCK::Error>;

    fn select(&mut self) -> Result<(), Self::Error> {
        self.cs.set_low().map_err(GpioError::Select)
    }

    fn deselect(&mut self) -> Result<(), Self::Error> {
        self.cs.set_high().map_err(GpioError::Select)
    }

    fn clock_high(&mut self) -> Result<(), Self::Error> {
        self.sck.set_high().map_err(GpioError::Clock)?;
        self.delay.delay_ns(CLOCK_PULSE_NS);
        Ok(())
    }

    fn clock_low(&mut self) -> Result<(), Self::Error> {
        self.sck.set_low().map_err(GpioError::Clock)?;
        self.delay.delay_ns(CLOCK_PULSE_NS);
        Ok(())
    }

    fn read_bit(&mut self) -> Result<bool, Self::Error> {
        self.miso.is_high().map_err(GpioError::Data)
    }
}
