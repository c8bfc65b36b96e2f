#![no_std]
#![warn(missing_docs)]
//! # ioextend
//!
//! ## Overview
//! This crate extends the digital I/O of a microcontroller with cheap
//! external chips, on top of the `embedded-hal` 0.2 traits.
//!
//! It provides:
//!
//! - [`Piso`]: reading eight inputs through a parallel-in serial-out shift
//!   register such as the 74HC165
//! - [`Sipo`]: driving eight outputs through a serial-in parallel-out shift
//!   register such as the 74HC595
//! - [`Mcp23017`]: the 16-bit I2C GPIO expander, including pull-ups,
//!   polarity inversion and interrupt-on-change
//! - [`ChangeSignal`] and [`ChangeMonitor`]: interrupt-driven port change
//!   detection where the interrupt handler only sets a flag and the main
//!   loop does all the bus traffic
//!
//! Most operations come in several flavours doing the same thing, so the one
//! that reads best at the call site can be picked:
//!
//! - per pin: [`Piso::read_pin`], [`Sipo::write_pin`],
//!   [`Mcp23017::read_pin`], [`Mcp23017::write_pin`]
//! - raw byte: [`Piso::read_register`], [`Sipo::write_register`],
//!   [`Mcp23017::read_register`], [`Mcp23017::write_register`]
//! - bit helpers on a byte: [`bits::read_bit`], [`bits::write_bit`] and the
//!   [`PortState`] accessors
//!
//! Nothing in this crate retries or detects wiring problems. Pin and bus
//! errors reported by the HAL are passed through unchanged; a miswired chip
//! just produces wrong bits.
//!
//! ## Shift registers
//!
//! ```no_run
//! # fn example<P, E>(data: P, latch: P, clock: P, sdata: P, slatch: P, sclock: P) -> Result<(), E>
//! # where P: embedded_hal::digital::v2::InputPin<Error = E>
//! #     + embedded_hal::digital::v2::OutputPin<Error = E>,
//! # {
//! use ioextend::shift::{Piso, Sipo};
//!
//! let mut inputs = Piso::new(data, latch, clock)?;
//! let mut outputs = Sipo::new(sdata, slatch, sclock);
//!
//! // Mirror the eight switches on the eight LEDs
//! let switches = inputs.read_register()?;
//! outputs.write_register(switches)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Interrupt-driven change detection
//!
//! The expander pulls its INT line low when a watched pin changes. Wire that
//! line to a host pin with a falling-edge interrupt whose handler calls
//! [`ChangeSignal::signal`] and nothing else, then poll a [`ChangeMonitor`]
//! from the main loop. See the [`change`] module for the full sequence.
//!
//! ## Features
//!
//! - `defmt`: log register traffic and detected changes through `defmt` and
//!   implement `defmt::Format` for the public types.
//!
//! [`Piso`]: crate::shift::Piso
//! [`Piso::read_pin`]: crate::shift::Piso::read_pin
//! [`Piso::read_register`]: crate::shift::Piso::read_register
//! [`Sipo`]: crate::shift::Sipo
//! [`Sipo::write_pin`]: crate::shift::Sipo::write_pin
//! [`Sipo::write_register`]: crate::shift::Sipo::write_register
//! [`Mcp23017`]: crate::mcp23017::Mcp23017
//! [`Mcp23017::read_pin`]: crate::mcp23017::Mcp23017::read_pin
//! [`Mcp23017::write_pin`]: crate::mcp23017::Mcp23017::write_pin
//! [`Mcp23017::read_register`]: crate::mcp23017::Mcp23017::read_register
//! [`Mcp23017::write_register`]: crate::mcp23017::Mcp23017::write_register
//! [`ChangeSignal`]: crate::signal::ChangeSignal
//! [`ChangeSignal::signal`]: crate::signal::ChangeSignal::signal
//! [`ChangeMonitor`]: crate::change::ChangeMonitor
//! [`PortState`]: crate::bits::PortState

#[cfg(test)]
extern crate std;

// Must come first so the macros are visible in the other modules.
mod fmt;

pub mod bits;
pub mod change;
pub mod mcp23017;
pub mod report;
pub mod shift;
pub mod signal;

pub use embedded_hal;
pub use fugit;
