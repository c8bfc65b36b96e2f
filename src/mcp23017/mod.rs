//! MCP23017 16-bit I2C GPIO expander
//!
//! The expander is represented by a single [`Mcp23017`] value that owns the
//! I2C bus handle and knows the device address. Build it once at startup and
//! pass it by `&mut` to whatever needs it.
//!
//! Pins are grouped in two 8-bit [`Port`]s. Every operation is a register
//! read or write on the bus; there is no caching, so every read reflects the
//! device at that moment. Errors reported by the bus are returned unchanged,
//! but a device that is miswired or absent at a responding address simply
//! yields wrong values.
//!
//! ```no_run
//! # fn example<I2C, E>(i2c: I2C) -> Result<(), E>
//! # where I2C: embedded_hal::blocking::i2c::Write<Error = E>
//! #     + embedded_hal::blocking::i2c::WriteRead<Error = E>
//! # {
//! use embedded_hal::digital::v2::PinState;
//! use ioextend::bits::PortState;
//! use ioextend::mcp23017::{Address, Mcp23017, Pin, PinMode, Port};
//!
//! let mut expander = Mcp23017::new(i2c, Address::from_pins(false, false, false));
//! expander.init()?;
//!
//! // Port B drives outputs, GPA0 is a button to ground
//! expander.set_direction(Port::B, PortState::LOW)?;
//! let button = Pin::new(0).unwrap();
//! expander.pin_mode(button, PinMode::InputPullUp)?;
//!
//! let pressed = expander.read_pin(button)? == PinState::Low;
//! expander.write_port(Port::B, PortState::new(pressed as u8))?;
//! # Ok(())
//! # }
//! ```

mod reg;

pub use reg::{IoCon, Port, Register};

use crate::bits::{BitIndex, OutOfRange, PortState};
use embedded_hal::blocking::i2c::{Write, WriteRead};
use embedded_hal::digital::v2::PinState;

/// 7-bit bus address of an MCP23017.
///
/// The upper four bits are fixed to `0100`, the lower three follow the A2..A0
/// pins.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Address(u8);

impl Address {
    /// Address with A2..A0 all tied low
    pub const BASE: u8 = 0x20;

    /// Address for the given levels of the A0, A1 and A2 pins.
    pub const fn from_pins(a0: bool, a1: bool, a2: bool) -> Self {
        Self(Self::BASE | (a2 as u8) << 2 | (a1 as u8) << 1 | a0 as u8)
    }

    /// Raw 7-bit address
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl Default for Address {
    fn default() -> Self {
        Self(Self::BASE)
    }
}

/// A single expander pin.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Pin {
    /// Port the pin belongs to
    pub port: Port,
    /// Position within the port
    pub index: BitIndex,
}

impl Pin {
    /// Pin `index` of `port`.
    pub const fn on(port: Port, index: BitIndex) -> Self {
        Self { port, index }
    }

    /// Pin by flat number: 0..=7 are GPA0..GPA7, 8..=15 are GPB0..GPB7.
    pub fn new(number: u8) -> Result<Self, OutOfRange> {
        let port = match number {
            0..=7 => Port::A,
            8..=15 => Port::B,
            _ => return Err(OutOfRange),
        };
        Ok(Self::on(port, BitIndex::new(number % 8)?))
    }

    /// Flat pin number, the inverse of [`Pin::new`].
    pub fn number(&self) -> u8 {
        self.port as u8 * 8 + self.index.get()
    }
}

/// Electrical configuration of a pin.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinMode {
    /// Floating input
    Input,
    /// Input with the internal 100k pull-up
    InputPullUp,
    /// Push-pull output
    Output,
}

/// Condition that raises an interrupt for a pin.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InterruptMode {
    /// Any change from the previous pin value
    OnChange,
    /// Pin differs from the given default value (DEFVAL)
    Compare(PortState),
}

/// Behaviour of the INTA/INTB output pins.
///
/// The default matches a host interrupt on the falling edge: separate lines,
/// push-pull, active low.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InterruptOutput {
    /// Either port raises both INTA and INTB
    pub mirror: bool,
    /// Open-drain output; overrides `active_high`
    pub open_drain: bool,
    /// Active-high output
    pub active_high: bool,
}

/// Driver for one MCP23017 on an I2C bus.
pub struct Mcp23017<I2C> {
    i2c: I2C,
    address: Address,
}

impl<I2C, E> Mcp23017<I2C>
where
    I2C: Write<Error = E> + WriteRead<Error = E>,
{
    /// Create a driver. Nothing is sent on the bus.
    pub fn new(i2c: I2C, address: Address) -> Self {
        Self { i2c, address }
    }

    /// Bus address of the device
    pub fn address(&self) -> Address {
        self.address
    }

    /// Give the bus back.
    pub fn release(self) -> I2C {
        self.i2c
    }

    /// Put the device into the configuration this driver expects: BANK = 0,
    /// sequential addressing on, interrupt output per
    /// [`InterruptOutput::default`], all pins inputs.
    pub fn init(&mut self) -> Result<(), E> {
        self.set_configuration(IoCon::RESET)?;
        self.set_direction(Port::A, PortState::HIGH)?;
        self.set_direction(Port::B, PortState::HIGH)
    }

    /// Read one register.
    pub fn read_register(&mut self, register: Register, port: Port) -> Result<u8, E> {
        let mut buffer = [0_u8];
        self.i2c.write_read(
            self.address.get(),
            &[register.address(port)],
            &mut buffer,
        )?;
        Ok(buffer[0])
    }

    /// Write one register.
    pub fn write_register(&mut self, register: Register, port: Port, value: u8) -> Result<(), E> {
        let address = register.address(port);
        trace!("mcp23017 {=u8:#x} <- {=u8:#x}", address, value);
        self.i2c.write(self.address.get(), &[address, value])
    }

    /// Read, modify and write back one register.
    pub fn modify_register<F>(&mut self, register: Register, port: Port, f: F) -> Result<(), E>
    where
        F: FnOnce(u8) -> u8,
    {
        let value = self.read_register(register, port)?;
        self.write_register(register, port, f(value))
    }

    /// Replace the bits selected by `mask` with those of `value`.
    fn update_masked(
        &mut self,
        register: Register,
        port: Port,
        mask: PortState,
        value: PortState,
    ) -> Result<(), E> {
        self.modify_register(register, port, |old| {
            (old & !mask.bits()) | (value.bits() & mask.bits())
        })
    }

    /// Read IOCON.
    pub fn configuration(&mut self) -> Result<IoCon, E> {
        self.read_register(Register::Iocon, Port::A).map(IoCon::new)
    }

    /// Write IOCON.
    ///
    /// The rest of this driver assumes BANK = 0; [`read_all`] and
    /// [`write_all`] additionally need SEQOP = 0.
    ///
    /// [`read_all`]: Self::read_all
    /// [`write_all`]: Self::write_all
    pub fn set_configuration(&mut self, iocon: IoCon) -> Result<(), E> {
        self.write_register(Register::Iocon, Port::A, iocon.bits())
    }

    /// Set the direction of every pin of `port`; pins in `inputs` become
    /// inputs, the rest outputs.
    pub fn set_direction(&mut self, port: Port, inputs: PortState) -> Result<(), E> {
        self.write_register(Register::Iodir, port, inputs.bits())
    }

    /// Enable the internal pull-ups of the pins in `enabled`, disable the rest.
    pub fn set_pull_ups(&mut self, port: Port, enabled: PortState) -> Result<(), E> {
        self.write_register(Register::Gppu, port, enabled.bits())
    }

    /// Invert the value read from the pins in `inverted`.
    pub fn set_polarity(&mut self, port: Port, inverted: PortState) -> Result<(), E> {
        self.write_register(Register::Ipol, port, inverted.bits())
    }

    /// Configure a single pin, leaving the rest of its port untouched.
    pub fn pin_mode(&mut self, pin: Pin, mode: PinMode) -> Result<(), E> {
        let mask = PortState::new(pin.index.mask());
        let (input, pull_up) = match mode {
            PinMode::Input => (true, Some(false)),
            PinMode::InputPullUp => (true, Some(true)),
            PinMode::Output => (false, None),
        };
        let select = |on: bool| if on { mask } else { PortState::LOW };
        self.update_masked(Register::Iodir, pin.port, mask, select(input))?;
        if let Some(pull_up) = pull_up {
            self.update_masked(Register::Gppu, pin.port, mask, select(pull_up))?;
        }
        Ok(())
    }

    /// Read the current level of every pin of `port`.
    pub fn read_port(&mut self, port: Port) -> Result<PortState, E> {
        self.read_register(Register::Gpio, port).map(PortState::new)
    }

    /// Drive the output pins of `port`. Bits of input pins are latched but
    /// have no effect until the pin becomes an output.
    pub fn write_port(&mut self, port: Port, state: PortState) -> Result<(), E> {
        self.write_register(Register::Gpio, port, state.bits())
    }

    /// Read the current level of a single pin.
    pub fn read_pin(&mut self, pin: Pin) -> Result<PinState, E> {
        Ok(self.read_port(pin.port)?.level(pin.index))
    }

    /// Drive a single output pin, keeping the other latched outputs of its
    /// port.
    pub fn write_pin(&mut self, pin: Pin, level: PinState) -> Result<(), E> {
        let mut state = PortState::new(self.read_register(Register::Olat, pin.port)?);
        state.set_level(pin.index, level);
        self.write_register(Register::Olat, pin.port, state.bits())
    }

    /// Read both ports in one transaction, port A in the low byte.
    pub fn read_all(&mut self) -> Result<u16, E> {
        let mut buffer = [0_u8; 2];
        self.i2c.write_read(
            self.address.get(),
            &[Register::Gpio.address(Port::A)],
            &mut buffer,
        )?;
        Ok(u16::from_le_bytes(buffer))
    }

    /// Write the output latches of both ports in one transaction, port A in
    /// the low byte.
    pub fn write_all(&mut self, value: u16) -> Result<(), E> {
        let [a, b] = value.to_le_bytes();
        self.i2c.write(
            self.address.get(),
            &[Register::Olat.address(Port::A), a, b],
        )
    }

    /// Enable interrupt-on-change for the pins in `enabled`, disable it for
    /// the rest of `port`.
    pub fn enable_interrupts(&mut self, port: Port, enabled: PortState) -> Result<(), E> {
        self.write_register(Register::Gpinten, port, enabled.bits())
    }

    /// Choose the interrupt condition for the pins in `pins`.
    pub fn set_interrupt_mode(
        &mut self,
        port: Port,
        pins: PortState,
        mode: InterruptMode,
    ) -> Result<(), E> {
        match mode {
            InterruptMode::OnChange => {
                self.update_masked(Register::Intcon, port, pins, PortState::LOW)
            }
            InterruptMode::Compare(defaults) => {
                self.update_masked(Register::Defval, port, pins, defaults)?;
                self.update_masked(Register::Intcon, port, pins, PortState::HIGH)
            }
        }
    }

    /// Configure the INTA/INTB output pins.
    pub fn configure_interrupt_output(&mut self, output: InterruptOutput) -> Result<(), E> {
        let mut iocon = self.configuration()?;
        iocon.set_mirror(output.mirror);
        iocon.set_odr(output.open_drain);
        iocon.set_intpol(output.active_high);
        self.set_configuration(iocon)
    }

    /// Pins of `port` that caused the pending interrupt (INTF).
    pub fn interrupt_flags(&mut self, port: Port) -> Result<PortState, E> {
        self.read_register(Register::Intf, port).map(PortState::new)
    }

    /// Levels of `port` captured when the interrupt occurred (INTCAP).
    ///
    /// Reading this register clears the pending interrupt and releases the
    /// interrupt line.
    pub fn interrupt_capture(&mut self, port: Port) -> Result<PortState, E> {
        self.read_register(Register::Intcap, port).map(PortState::new)
    }

    /// Clear the pending interrupt of `port`, discarding the capture.
    pub fn clear_interrupts(&mut self, port: Port) -> Result<(), E> {
        self.interrupt_capture(port).map(|_| ())
    }
}
