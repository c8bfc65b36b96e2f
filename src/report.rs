//! Human-readable status lines
//!
//! Any [`core::fmt::Write`] sink works: a serial port wrapper, a display
//! driver or a fixed-capacity string.

use crate::bits::PortState;
use crate::change::PinChange;
use core::fmt::{self, Write};
use embedded_hal::digital::v2::PinState;

fn level_name(level: PinState) -> &'static str {
    match level {
        PinState::High => "HIGH",
        PinState::Low => "LOW",
    }
}

/// Write one `pin N: HIGH|LOW` line per pin, pin 0 first.
pub fn write_levels<W: Write>(w: &mut W, state: PortState) -> fmt::Result {
    for (index, level) in state.levels() {
        writeln!(w, "pin {}: {}", index.get(), level_name(level))?;
    }
    Ok(())
}

/// Write a single `pin N changed to HIGH|LOW` line.
pub fn write_change<W: Write>(w: &mut W, change: &PinChange) -> fmt::Result {
    writeln!(
        w,
        "pin {} changed to {}",
        change.pin.get(),
        level_name(change.level)
    )
}
