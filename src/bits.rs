//! Bit-level helpers and the 8-bit port state
//!
//! Every register in this crate is one byte wide and pin `n` of a port lives
//! in bit `n`. The free functions below are the "bit macro" way of working
//! with such bytes; [`PortState`] is the typed way.

use bitfield::bitfield;
use core::fmt;
use embedded_hal::digital::v2::PinState;

/// Pin index was outside of the valid range.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OutOfRange;

/// Index of a bit (and pin) within one byte.
///
/// Valid values are `0..=7`. Indices are checked once, on construction, so
/// none of the functions taking a `BitIndex` can be handed a bit that does
/// not exist.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BitIndex(u8);

impl BitIndex {
    /// Highest valid index
    pub const MAX: u8 = 7;

    /// Create an index, failing with [`OutOfRange`] if `index > 7`.
    pub const fn new(index: u8) -> Result<Self, OutOfRange> {
        if index > Self::MAX {
            Err(OutOfRange)
        } else {
            Ok(Self(index))
        }
    }

    /// Value of the index
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Single-bit mask selecting this index
    pub const fn mask(self) -> u8 {
        1 << self.0
    }

    /// All indices from 0 to 7, in ascending order.
    pub fn all() -> impl Iterator<Item = BitIndex> {
        (0..=Self::MAX).map(BitIndex)
    }
}

impl TryFrom<u8> for BitIndex {
    type Error = OutOfRange;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<BitIndex> for u8 {
    fn from(index: BitIndex) -> Self {
        index.0
    }
}

/// Pin level for a bit value
pub const fn level_of(high: bool) -> PinState {
    if high {
        PinState::High
    } else {
        PinState::Low
    }
}

/// Returns the bit at `index`.
pub const fn read_bit(byte: u8, index: BitIndex) -> bool {
    byte & index.mask() != 0
}

/// Returns `byte` with the bit at `index` set to `value`.
pub const fn write_bit(byte: u8, index: BitIndex, value: bool) -> u8 {
    if value {
        set_bit(byte, index)
    } else {
        clear_bit(byte, index)
    }
}

/// Returns `byte` with the bit at `index` set.
pub const fn set_bit(byte: u8, index: BitIndex) -> u8 {
    byte | index.mask()
}

/// Returns `byte` with the bit at `index` cleared.
pub const fn clear_bit(byte: u8, index: BitIndex) -> u8 {
    byte & !index.mask()
}

bitfield! {
    /// Levels of the eight pins of a port, pin `n` in bit `n`.
    ///
    /// The same type is used for masks (which pins are inputs, which pins
    /// have interrupts enabled, ...) and for snapshots of the interrupt-flag
    /// and interrupt-capture registers.
    #[derive(Copy, Clone, PartialEq, Eq, Default)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub struct PortState(u8);

    /// Pin 7
    pub pin7, set_pin7: 7;
    /// Pin 6
    pub pin6, set_pin6: 6;
    /// Pin 5
    pub pin5, set_pin5: 5;
    /// Pin 4
    pub pin4, set_pin4: 4;
    /// Pin 3
    pub pin3, set_pin3: 3;
    /// Pin 2
    pub pin2, set_pin2: 2;
    /// Pin 1
    pub pin1, set_pin1: 1;
    /// Pin 0
    pub pin0, set_pin0: 0;
}

impl PortState {
    /// All pins low
    pub const LOW: Self = Self(0x00);
    /// All pins high
    pub const HIGH: Self = Self(0xff);

    /// Wrap a raw register value.
    pub const fn new(bits: u8) -> Self {
        Self(bits)
    }

    /// Raw register value
    pub const fn bits(&self) -> u8 {
        self.0
    }

    /// Returns `true` if no pin is high.
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if the pin at `index` is high.
    pub const fn is_high(&self, index: BitIndex) -> bool {
        read_bit(self.0, index)
    }

    /// Level of the pin at `index`
    pub fn level(&self, index: BitIndex) -> PinState {
        level_of(self.is_high(index))
    }

    /// Set the level of the pin at `index`.
    pub fn set_level(&mut self, index: BitIndex, level: PinState) {
        self.0 = write_bit(self.0, index, level == PinState::High);
    }

    /// Lowest-indexed high pin, if any.
    pub fn lowest(&self) -> Option<BitIndex> {
        // `trailing_zeros` is 8 for an empty byte, which `new` rejects.
        BitIndex::new(self.0.trailing_zeros() as u8).ok()
    }

    /// An iterator visiting the high pins in ascending order.
    pub fn iter(&self) -> Iter {
        Iter {
            state: *self,
            index: 0,
        }
    }

    /// An iterator over `(index, level)` of every pin, pin 0 first.
    pub fn levels(&self) -> impl Iterator<Item = (BitIndex, PinState)> {
        let state = *self;
        BitIndex::all().map(move |index| (index, state.level(index)))
    }
}

impl From<u8> for PortState {
    fn from(bits: u8) -> Self {
        Self(bits)
    }
}

impl From<PortState> for u8 {
    fn from(state: PortState) -> Self {
        state.0
    }
}

impl FromIterator<BitIndex> for PortState {
    fn from_iter<T: IntoIterator<Item = BitIndex>>(iter: T) -> Self {
        let mut bits = 0_u8;
        for index in iter {
            bits |= index.mask();
        }
        PortState(bits)
    }
}

impl core::ops::BitAnd for PortState {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl core::ops::BitOr for PortState {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl core::ops::Not for PortState {
    type Output = Self;

    fn not(self) -> Self {
        Self(!self.0)
    }
}

impl fmt::Debug for PortState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PortState {{ ")?;
        for index in self.iter() {
            write!(f, "{} ", index.get())?;
        }
        write!(f, "}}")
    }
}

/// Formats as an 8-digit binary literal, e.g. `0b00000010`.
impl fmt::Display for PortState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010b}", self.0)
    }
}

/// An iterator over the high pins of a [`PortState`].
///
/// This `struct` is created by [`PortState::iter`].
pub struct Iter {
    state: PortState,
    index: u8,
}

impl Iterator for Iter {
    type Item = BitIndex;

    fn next(&mut self) -> Option<Self::Item> {
        let index = BitIndex::new(self.index).ok()?;
        self.index += 1;
        if self.state.is_high(index) {
            Some(index)
        } else {
            self.next()
        }
    }
}
