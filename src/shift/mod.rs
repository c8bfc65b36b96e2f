//! Bit-banged 8-bit shift registers
//!
//! Both chips are driven over three dedicated lines: serial data, a latch
//! and a shift clock. A transaction always moves exactly eight bits.
//!
//! - [`Piso`] reads a parallel-in serial-out register such as the 74HC165.
//! - [`Sipo`] writes a serial-in parallel-out register such as the 74HC595.
//!
//! Several registers of the same kind can be daisy-chained by wiring the
//! serial output of one chip into the serial input of the next; this crate
//! only drives a single chip per set of lines.

mod piso;
mod sipo;
#[cfg(test)]
mod sim;

pub use piso::{ClockPreset, Piso};
pub use sipo::Sipo;

use embedded_hal::digital::v2::{InputPin, OutputPin};

/// Order in which the bits of a byte travel over the data line.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BitOrder {
    /// Bit 7 first. This is what both the 74HC165 and the 74HC595 expect
    /// when pin 7 is wired as the most significant output.
    #[default]
    MsbFirst,
    /// Bit 0 first
    LsbFirst,
}

impl BitOrder {
    /// Position within the byte of the `n`th bit on the wire.
    const fn bit(self, n: u8) -> u8 {
        match self {
            BitOrder::MsbFirst => 7 - n,
            BitOrder::LsbFirst => n,
        }
    }
}

/// Clock eight bits in from `data`.
///
/// Each bit is sampled while the clock is high; the clock is driven low
/// again after every sample. Whether the first sample happens before or
/// after a rising edge depends on the level the clock had before the call.
pub fn shift_in<DATA, CLOCK, E>(data: &DATA, clock: &mut CLOCK, order: BitOrder) -> Result<u8, E>
where
    DATA: InputPin<Error = E>,
    CLOCK: OutputPin<Error = E>,
{
    let mut value = 0_u8;
    for n in 0..8 {
        clock.set_high()?;
        if data.is_high()? {
            value |= 1 << order.bit(n);
        }
        clock.set_low()?;
    }
    Ok(value)
}

/// Clock the eight bits of `value` out on `data`.
///
/// The data line is set up while the clock is low and the receiving chip
/// samples it on the rising edge.
pub fn shift_out<DATA, CLOCK, E>(
    data: &mut DATA,
    clock: &mut CLOCK,
    order: BitOrder,
    value: u8,
) -> Result<(), E>
where
    DATA: OutputPin<Error = E>,
    CLOCK: OutputPin<Error = E>,
{
    for n in 0..8 {
        if value & (1 << order.bit(n)) != 0 {
            data.set_high()?;
        } else {
            data.set_low()?;
        }
        clock.set_high()?;
        clock.set_low()?;
    }
    Ok(())
}
