//! Simulated 74HC165 and 74HC595 wired to the same bench.
//!
//! Only the behaviour the drivers rely on is modelled: parallel load while
//! the 165's latch is low, shifting on rising clock edges and the 595's
//! storage register updating on a rising latch edge.

use core::cell::RefCell;
use core::convert::Infallible;
use embedded_hal::digital::v2::{InputPin, OutputPin};
use std::rc::Rc;
use std::vec::Vec;

#[derive(Default)]
struct Chip165 {
    inputs: u8,
    register: u8,
    shifting: bool,
    clock: bool,
}

impl Chip165 {
    fn latch(&mut self, high: bool) {
        self.shifting = high;
        if !high {
            self.register = self.inputs;
        }
    }

    fn clock(&mut self, high: bool) {
        if high && !self.clock && self.shifting {
            // Serial input tied low
            self.register <<= 1;
        }
        self.clock = high;
    }

    fn q7(&self) -> bool {
        self.register & 0x80 != 0
    }
}

#[derive(Default)]
struct Chip595 {
    shift: u8,
    data: bool,
    clock: bool,
    latch: bool,
    history: Vec<u8>,
}

impl Chip595 {
    fn clock(&mut self, high: bool) {
        if high && !self.clock {
            self.shift = (self.shift << 1) | self.data as u8;
        }
        self.clock = high;
    }

    fn latch(&mut self, high: bool) {
        if high && !self.latch {
            self.history.push(self.shift);
        }
        self.latch = high;
    }

    fn outputs(&self) -> u8 {
        self.history.last().copied().unwrap_or(0)
    }
}

#[derive(Default)]
struct Chips {
    input: Chip165,
    output: Chip595,
}

#[derive(Copy, Clone)]
enum Role {
    InputData,
    InputLatch,
    InputClock,
    OutputData,
    OutputLatch,
    OutputClock,
}

#[derive(Clone, Default)]
pub struct Bench(Rc<RefCell<Chips>>);

impl Bench {
    pub fn new() -> Self {
        Self::default()
    }

    /// Levels on the 165's parallel inputs
    pub fn set_inputs(&self, value: u8) {
        let mut chips = self.0.borrow_mut();
        chips.input.inputs = value;
        if !chips.input.shifting {
            chips.input.register = value;
        }
    }

    /// Levels on the 595's parallel outputs
    pub fn outputs(&self) -> u8 {
        self.0.borrow().output.outputs()
    }

    /// Every value the 595's outputs have taken, in order.
    pub fn output_history(&self) -> Vec<u8> {
        self.0.borrow().output.history.clone()
    }

    fn line(&self, role: Role) -> Line {
        Line {
            bench: self.clone(),
            role,
        }
    }

    pub fn input_lines(&self) -> (Line, Line, Line) {
        (
            self.line(Role::InputData),
            self.line(Role::InputLatch),
            self.line(Role::InputClock),
        )
    }

    pub fn output_lines(&self) -> (Line, Line, Line) {
        (
            self.line(Role::OutputData),
            self.line(Role::OutputLatch),
            self.line(Role::OutputClock),
        )
    }
}

pub struct Line {
    bench: Bench,
    role: Role,
}

impl Line {
    fn drive(&mut self, high: bool) {
        let mut chips = self.bench.0.borrow_mut();
        match self.role {
            Role::InputLatch => chips.input.latch(high),
            Role::InputClock => chips.input.clock(high),
            Role::OutputData => chips.output.data = high,
            Role::OutputLatch => chips.output.latch(high),
            Role::OutputClock => chips.output.clock(high),
            Role::InputData => unreachable!("the 165's serial output is not driven by the host"),
        }
    }
}

impl OutputPin for Line {
    type Error = Infallible;

    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.drive(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.drive(true);
        Ok(())
    }
}

impl InputPin for Line {
    type Error = Infallible;

    fn is_high(&self) -> Result<bool, Self::Error> {
        match self.role {
            Role::InputData => Ok(self.bench.0.borrow().input.q7()),
            _ => unreachable!("only the 165's serial output is sampled"),
        }
    }

    fn is_low(&self) -> Result<bool, Self::Error> {
        self.is_high().map(|high| !high)
    }
}
