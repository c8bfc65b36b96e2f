use super::{shift_out, BitOrder};
use crate::bits::{level_of, BitIndex, PortState};
use embedded_hal::digital::v2::{OutputPin, PinState};

/// Serial-in parallel-out output register (74HC595 and alike).
///
/// Bits are shifted into the chip with the latch (ST_CP) line low and only
/// appear on the outputs when it rises, so the outputs switch from the old
/// byte to the new one in a single step.
///
/// The chip cannot be read back, so the last committed byte is kept here.
/// This shadow is what makes the per-pin operations possible. It starts out
/// as all-low, which matches the chip only after the first write.
pub struct Sipo<DATA, LATCH, CLOCK> {
    data: DATA,
    latch: LATCH,
    clock: CLOCK,
    order: BitOrder,
    state: PortState,
}

impl<DATA, LATCH, CLOCK, E> Sipo<DATA, LATCH, CLOCK>
where
    DATA: OutputPin<Error = E>,
    LATCH: OutputPin<Error = E>,
    CLOCK: OutputPin<Error = E>,
{
    /// Take ownership of the three lines. Nothing is written.
    pub fn new(data: DATA, latch: LATCH, clock: CLOCK) -> Self {
        Self {
            data,
            latch,
            clock,
            order: BitOrder::default(),
            state: PortState::LOW,
        }
    }

    /// Change the order bits are sent in.
    pub fn with_bit_order(mut self, order: BitOrder) -> Self {
        self.order = order;
        self
    }

    /// Last committed output byte
    pub fn state(&self) -> PortState {
        self.state
    }

    /// Shift `value` out and commit it to the outputs.
    pub fn write_register(&mut self, value: u8) -> Result<(), E> {
        self.latch.set_low()?;
        shift_out(&mut self.data, &mut self.clock, self.order, value)?;
        self.latch.set_high()?;
        self.state = PortState::new(value);
        trace!("sipo commit {=u8:#x}", value);
        Ok(())
    }

    /// Commit all eight outputs.
    pub fn write_state(&mut self, state: PortState) -> Result<(), E> {
        self.write_register(state.bits())
    }

    /// Change a single output, keeping the others as last committed.
    pub fn write_pin(&mut self, index: BitIndex, level: PinState) -> Result<(), E> {
        let mut state = self.state;
        state.set_level(index, level);
        self.write_state(state)
    }

    /// Invert a single output.
    pub fn toggle_pin(&mut self, index: BitIndex) -> Result<(), E> {
        let level = level_of(!self.state.is_high(index));
        self.write_pin(index, level)
    }

    /// Drive every output low.
    pub fn clear(&mut self) -> Result<(), E> {
        self.write_register(0)
    }

    /// Give the lines back.
    pub fn release(self) -> (DATA, LATCH, CLOCK) {
        (self.data, self.latch, self.clock)
    }
}
