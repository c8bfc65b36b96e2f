use super::{shift_in, BitOrder};
use crate::bits::{BitIndex, PortState};
use embedded_hal::digital::v2::{InputPin, OutputPin, PinState};

/// Level the clock line is driven to before the first bit is sampled.
///
/// The 74HC165 presents its first bit (H) on the serial output as soon as
/// the parallel inputs are loaded, and shifts on the rising clock edge.
/// [`shift_in`] raises the clock before every sample, so the clock has to
/// already be high when the transaction starts; otherwise the first rising
/// edge shifts bit 7 out before it is read and every value comes back one
/// bit short. Getting this wrong produces no error, only wrong data.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockPreset {
    /// Clock starts high, the first sample happens before any edge.
    #[default]
    High,
    /// Clock starts low, every sample follows a rising edge.
    Low,
}

/// Parallel-in serial-out input register (74HC165 and alike).
///
/// While the latch (SH/LD) line is low the chip keeps sampling its parallel
/// inputs. A read drives it high to freeze the inputs, clocks the eight bits
/// in and drives it low again.
pub struct Piso<DATA, LATCH, CLOCK> {
    data: DATA,
    latch: LATCH,
    clock: CLOCK,
    preset: ClockPreset,
    order: BitOrder,
}

impl<DATA, LATCH, CLOCK, E> Piso<DATA, LATCH, CLOCK>
where
    DATA: InputPin<Error = E>,
    LATCH: OutputPin<Error = E>,
    CLOCK: OutputPin<Error = E>,
{
    /// Take ownership of the three lines and put the chip into continuous
    /// sampling.
    pub fn new(data: DATA, mut latch: LATCH, clock: CLOCK) -> Result<Self, E> {
        latch.set_low()?;
        Ok(Self {
            data,
            latch,
            clock,
            preset: ClockPreset::default(),
            order: BitOrder::default(),
        })
    }

    /// Change the clock level used at the start of a read.
    pub fn with_clock_preset(mut self, preset: ClockPreset) -> Self {
        self.preset = preset;
        self
    }

    /// Change the order bits are assembled in.
    pub fn with_bit_order(mut self, order: BitOrder) -> Self {
        self.order = order;
        self
    }

    /// Read all eight inputs as a raw byte, input 7 in bit 7.
    pub fn read_register(&mut self) -> Result<u8, E> {
        // The preset has to happen while the chip is still loading so the
        // edge is ignored.
        match self.preset {
            ClockPreset::High => self.clock.set_high()?,
            ClockPreset::Low => self.clock.set_low()?,
        }
        self.latch.set_high()?;
        let value = shift_in(&self.data, &mut self.clock, self.order);
        // Restore continuous sampling even if shifting failed halfway.
        self.latch.set_low()?;
        let value = value?;
        trace!("piso read {=u8:#x}", value);
        Ok(value)
    }

    /// Read all eight inputs.
    pub fn read_state(&mut self) -> Result<PortState, E> {
        self.read_register().map(PortState::new)
    }

    /// Read a single input. This still clocks the whole register.
    pub fn read_pin(&mut self, index: BitIndex) -> Result<PinState, E> {
        Ok(self.read_state()?.level(index))
    }

    /// Give the lines back.
    pub fn release(self) -> (DATA, LATCH, CLOCK) {
        (self.data, self.latch, self.clock)
    }
}
