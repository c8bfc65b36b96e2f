//! MCP23017 register map
//!
//! Addresses assume IOCON.BANK = 0, the reset default, where the A and B
//! registers of each kind sit next to each other.

use bitfield::bitfield;

/// One of the two 8-bit ports
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Port {
    /// GPA0..GPA7
    A = 0,
    /// GPB0..GPB7
    B = 1,
}

/// Register kinds. Each exists once per [`Port`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Register {
    /// I/O direction, 1 = input
    Iodir = 0x00,
    /// Input polarity, 1 = GPIO reads the inverted pin level
    Ipol = 0x02,
    /// Interrupt-on-change enable
    Gpinten = 0x04,
    /// Default compare value for interrupt-on-change
    Defval = 0x06,
    /// Interrupt control, 1 = compare against DEFVAL, 0 = previous value
    Intcon = 0x08,
    /// Device configuration. Both addresses map to the same register.
    Iocon = 0x0a,
    /// Pull-up enable
    Gppu = 0x0c,
    /// Interrupt flags, which pins caused the pending interrupt (read-only)
    Intf = 0x0e,
    /// Interrupt capture, port value when the interrupt occurred
    /// (read-only, reading it clears the interrupt)
    Intcap = 0x10,
    /// Port value. Writing it writes OLAT.
    Gpio = 0x12,
    /// Output latch
    Olat = 0x14,
}

impl Register {
    /// Address of this register for `port`.
    pub const fn address(self, port: Port) -> u8 {
        self as u8 + port as u8
    }
}

bitfield! {
    /// IOCON, the device configuration register
    #[derive(Copy, Clone, PartialEq, Eq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub struct IoCon(u8);
    impl Debug;

    /// Registers of one port are grouped together (changes the address map)
    pub bank, set_bank: 7;
    /// INTA and INTB are internally connected
    pub mirror, set_mirror: 6;
    /// Sequential operation disabled, the address pointer does not increment
    pub seqop, set_seqop: 5;
    /// Slew rate control disabled on SDA
    pub disslw, set_disslw: 4;
    /// Hardware address enable (MCP23S17 only)
    pub haen, set_haen: 3;
    /// INT pins are open-drain outputs
    pub odr, set_odr: 2;
    /// INT pins are active-high (ignored when ODR is set)
    pub intpol, set_intpol: 1;
}

impl IoCon {
    /// Reset value
    pub const RESET: Self = Self(0x00);

    /// Wrap a raw register value.
    pub const fn new(bits: u8) -> Self {
        Self(bits)
    }

    /// Raw register value
    pub const fn bits(&self) -> u8 {
        self.0
    }
}
