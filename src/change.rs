//! Port-change detection on the MCP23017
//!
//! The interrupt handler only sets a [`ChangeSignal`]. The main loop polls a
//! [`ChangeMonitor`], which does the rest once the signal is pending:
//!
//! 1. waits a fixed settle time,
//! 2. reads the interrupt-flag register (INTF) of the port,
//! 3. clears the signal,
//! 4. reads the interrupt-capture register (INTCAP), which clears the
//!    device's interrupt and releases its INT line,
//! 5. [`resolve`]s the two snapshots into a single [`PinChange`].
//!
//! The signal is cleared before step 4 because step 4 re-arms the device: an
//! edge produced after it must find the signal idle and leave it pending for
//! the next poll, otherwise the device would sit with its INT line asserted
//! and no edge would ever arrive again. Until step 4 the INT line stays
//! asserted, so no edge can be lost between steps 3 and 4.
//!
//! ```no_run
//! # fn example<I2C, E, D>(mut expander: ioextend::mcp23017::Mcp23017<I2C>, mut delay: D) -> Result<(), E>
//! # where I2C: embedded_hal::blocking::i2c::Write<Error = E>
//! #     + embedded_hal::blocking::i2c::WriteRead<Error = E>,
//! #     D: embedded_hal::blocking::delay::DelayUs<u32>,
//! # {
//! use ioextend::bits::PortState;
//! use ioextend::change::ChangeMonitor;
//! use ioextend::mcp23017::{InterruptMode, InterruptOutput, Port};
//! use ioextend::signal::ChangeSignal;
//!
//! static INTA: ChangeSignal = ChangeSignal::new();
//! // The host's falling-edge handler for the INTA line calls `INTA.signal()`.
//!
//! expander.set_pull_ups(Port::A, PortState::HIGH)?;
//! expander.set_interrupt_mode(Port::A, PortState::HIGH, InterruptMode::OnChange)?;
//! expander.configure_interrupt_output(InterruptOutput::default())?;
//! expander.enable_interrupts(Port::A, PortState::HIGH)?;
//! expander.set_direction(Port::B, PortState::LOW)?;
//! expander.clear_interrupts(Port::A)?;
//!
//! let mut monitor = ChangeMonitor::new(&INTA, Port::A);
//! loop {
//!     match monitor.mirror_to(&mut expander, &mut delay, Port::B) {
//!         Ok(_) | Err(nb::Error::WouldBlock) => {}
//!         Err(nb::Error::Other(e)) => return Err(e),
//!     }
//! }
//! # }
//! ```

use crate::bits::{BitIndex, PortState};
use crate::mcp23017::{Mcp23017, Pin, Port};
use crate::signal::ChangeSignal;
use embedded_hal::blocking::delay::DelayUs;
use embedded_hal::blocking::i2c::{Write, WriteRead};
use embedded_hal::digital::v2::PinState;
use fugit::MicrosDurationU32;

/// A pin and the level it changed to.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PinChange {
    /// Pin within the monitored port
    pub pin: BitIndex,
    /// Level captured when the interrupt occurred
    pub level: PinState,
}

#[cfg(feature = "defmt")]
impl defmt::Format for PinChange {
    fn format(&self, f: defmt::Formatter) {
        let level = match self.level {
            PinState::High => "HIGH",
            PinState::Low => "LOW",
        };
        defmt::write!(f, "PinChange {{ pin: {}, level: {=str} }}", self.pin, level)
    }
}

/// Find the pin that caused an interrupt.
///
/// `flags` is the interrupt-flag snapshot, `capture` the interrupt-capture
/// snapshot of the same port. When several flags are set the lowest pin
/// wins; only one pin is reported per interrupt. Returns `None` when no flag
/// is set, i.e. the wake-up was spurious.
pub fn resolve(flags: PortState, capture: PortState) -> Option<PinChange> {
    let pin = flags.lowest()?;
    Some(PinChange {
        pin,
        level: capture.level(pin),
    })
}

/// Main-loop side of interrupt-driven change detection for one port.
pub struct ChangeMonitor<'a> {
    signal: &'a ChangeSignal,
    port: Port,
    settle: MicrosDurationU32,
}

impl<'a> ChangeMonitor<'a> {
    /// Settle time used unless [`with_settle_time`] says otherwise
    ///
    /// [`with_settle_time`]: Self::with_settle_time
    pub const DEFAULT_SETTLE: MicrosDurationU32 = MicrosDurationU32::millis(100);

    /// Watch `port`, woken by `signal`.
    pub fn new(signal: &'a ChangeSignal, port: Port) -> Self {
        Self {
            signal,
            port,
            settle: Self::DEFAULT_SETTLE,
        }
    }

    /// Change the delay between noticing the signal and reading the
    /// snapshot registers.
    pub fn with_settle_time(mut self, settle: MicrosDurationU32) -> Self {
        self.settle = settle;
        self
    }

    /// Monitored port
    pub fn port(&self) -> Port {
        self.port
    }

    /// Handle a pending change, if any.
    ///
    /// Fails with [`nb::Error::WouldBlock`] without touching the bus if the
    /// signal is idle. Returns `Ok(None)` if the signal was pending but no
    /// interrupt flag was set.
    pub fn poll<I2C, E, D>(
        &mut self,
        expander: &mut Mcp23017<I2C>,
        delay: &mut D,
    ) -> nb::Result<Option<PinChange>, E>
    where
        I2C: Write<Error = E> + WriteRead<Error = E>,
        D: DelayUs<u32>,
    {
        if !self.signal.is_pending() {
            return Err(nb::Error::WouldBlock);
        }
        delay.delay_us(self.settle.to_micros());

        let flags = expander.interrupt_flags(self.port)?;
        self.signal.acknowledge();
        let capture = expander.interrupt_capture(self.port).map_err(|e| {
            // The device is still armed with nothing to wake us up again.
            self.signal.signal();
            e
        })?;
        debug!("{} flags {} capture {}", self.port, flags, capture);

        let change = resolve(flags, capture);
        if change.is_none() {
            debug!("spurious wake on {}", self.port);
        }
        Ok(change)
    }

    /// [`poll`], then drive the same pin index of `output` to the new level.
    ///
    /// [`poll`]: Self::poll
    pub fn mirror_to<I2C, E, D>(
        &mut self,
        expander: &mut Mcp23017<I2C>,
        delay: &mut D,
        output: Port,
    ) -> nb::Result<Option<PinChange>, E>
    where
        I2C: Write<Error = E> + WriteRead<Error = E>,
        D: DelayUs<u32>,
    {
        let change = self.poll(expander, delay)?;
        if let Some(change) = change {
            expander.write_pin(Pin::on(output, change.pin), change.level)?;
        }
        Ok(change)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::mcp23017::{Address, Register};
    use embedded_hal_mock::i2c::{Mock, Transaction};
    use std::vec;
    use std::vec::Vec;

    const ADDR: u8 = 0x20;

    #[derive(Default)]
    struct RecordingDelay(Vec<u32>);

    impl DelayUs<u32> for RecordingDelay {
        fn delay_us(&mut self, us: u32) {
            self.0.push(us);
        }
    }

    /// Serves fixed INTF/INTCAP values and can raise an edge when the
    /// capture register is read.
    struct Device<'a> {
        intf: u8,
        intcap: Result<u8, ()>,
        edge_on_capture: Option<&'a ChangeSignal>,
    }

    impl Write for Device<'_> {
        type Error = ();

        fn write(&mut self, _address: u8, _bytes: &[u8]) -> Result<(), ()> {
            Ok(())
        }
    }

    impl WriteRead for Device<'_> {
        type Error = ();

        fn write_read(&mut self, _address: u8, bytes: &[u8], buffer: &mut [u8]) -> Result<(), ()> {
            if bytes[0] == Register::Intf.address(Port::A) {
                buffer[0] = self.intf;
            } else if bytes[0] == Register::Intcap.address(Port::A) {
                buffer[0] = self.intcap?;
                if let Some(signal) = self.edge_on_capture {
                    signal.signal();
                }
            }
            Ok(())
        }
    }

    fn pin(i: u8) -> BitIndex {
        BitIndex::new(i).unwrap()
    }

    #[test]
    fn resolve_single_flag() {
        let change = resolve(PortState::new(0b0001_0000), PortState::new(0b0001_0000));
        assert_eq!(
            change,
            Some(PinChange {
                pin: pin(4),
                level: PinState::High
            })
        );
    }

    #[test]
    fn resolve_reports_captured_low() {
        let change = resolve(PortState::new(0b1000_0000), PortState::new(0b0111_1111));
        assert_eq!(change.map(|c| (c.pin, c.level)), Some((pin(7), PinState::Low)));
    }

    #[test]
    fn resolve_without_flags_is_no_change() {
        assert_eq!(resolve(PortState::LOW, PortState::LOW), None);
        assert_eq!(resolve(PortState::LOW, PortState::HIGH), None);
    }

    #[test]
    fn resolve_lowest_pin_wins() {
        let change = resolve(PortState::new(0b0000_0101), PortState::new(0b0000_0100));
        assert_eq!(change.map(|c| (c.pin, c.level)), Some((pin(0), PinState::Low)));
    }

    #[test]
    fn idle_poll_does_not_touch_the_bus() {
        let signal = ChangeSignal::new();
        let expectations: [Transaction; 0] = [];
        let mut mock = Mock::new(&expectations);
        let mut expander = Mcp23017::new(mock.clone(), Address::default());
        let mut delay = RecordingDelay::default();
        let mut monitor = ChangeMonitor::new(&signal, Port::A);

        for _ in 0..3 {
            assert!(matches!(
                monitor.poll(&mut expander, &mut delay),
                Err(nb::Error::WouldBlock)
            ));
        }
        assert!(delay.0.is_empty());
        mock.done();
    }

    #[test]
    fn pending_poll_settles_snapshots_and_clears() {
        let signal = ChangeSignal::new();
        let mut mock = Mock::new(&[
            Transaction::write_read(ADDR, vec![0x0e], vec![0b0000_0101]),
            Transaction::write_read(ADDR, vec![0x10], vec![0b0000_0001]),
        ]);
        let mut expander = Mcp23017::new(mock.clone(), Address::default());
        let mut delay = RecordingDelay::default();
        let mut monitor = ChangeMonitor::new(&signal, Port::A);

        signal.signal();
        let change = monitor.poll(&mut expander, &mut delay).unwrap();
        assert_eq!(
            change,
            Some(PinChange {
                pin: pin(0),
                level: PinState::High
            })
        );
        assert_eq!(delay.0, [100_000]);
        assert!(!signal.is_pending());
        mock.done();
    }

    #[test]
    fn spurious_wake_is_reported_and_cleared() {
        let signal = ChangeSignal::new();
        let mut mock = Mock::new(&[
            Transaction::write_read(ADDR, vec![0x0f], vec![0x00]),
            Transaction::write_read(ADDR, vec![0x11], vec![0xff]),
        ]);
        let mut expander = Mcp23017::new(mock.clone(), Address::default());
        let mut delay = RecordingDelay::default();
        let mut monitor = ChangeMonitor::new(&signal, Port::B)
            .with_settle_time(MicrosDurationU32::micros(50));

        signal.signal();
        assert!(matches!(monitor.poll(&mut expander, &mut delay), Ok(None)));
        assert_eq!(delay.0, [50]);
        assert!(!signal.is_pending());
        mock.done();
    }

    #[test]
    fn mirror_copies_level_to_output_port() {
        let signal = ChangeSignal::new();
        let mut mock = Mock::new(&[
            Transaction::write_read(ADDR, vec![0x0e], vec![0b0001_0000]),
            Transaction::write_read(ADDR, vec![0x10], vec![0b0001_0000]),
            Transaction::write_read(ADDR, vec![0x15], vec![0b0000_0001]),
            Transaction::write(ADDR, vec![0x15, 0b0001_0001]),
        ]);
        let mut expander = Mcp23017::new(mock.clone(), Address::default());
        let mut delay = RecordingDelay::default();
        let mut monitor = ChangeMonitor::new(&signal, Port::A);

        signal.signal();
        let change = monitor
            .mirror_to(&mut expander, &mut delay, Port::B)
            .unwrap();
        assert_eq!(change.map(|c| c.pin), Some(pin(4)));
        mock.done();
    }

    #[test]
    fn edge_after_rearm_stays_pending() {
        let signal = ChangeSignal::new();
        let device = Device {
            intf: 0b0000_0010,
            intcap: Ok(0b0000_0000),
            edge_on_capture: Some(&signal),
        };
        let mut expander = Mcp23017::new(device, Address::default());
        let mut delay = RecordingDelay::default();
        let mut monitor = ChangeMonitor::new(&signal, Port::A);

        signal.signal();
        let change = monitor.poll(&mut expander, &mut delay).unwrap();
        assert_eq!(change.map(|c| (c.pin, c.level)), Some((pin(1), PinState::Low)));
        assert!(signal.is_pending());
        // The next iteration picks the second edge up.
        assert!(monitor.poll(&mut expander, &mut delay).is_ok());
    }

    #[test]
    fn failed_capture_read_keeps_change_pending() {
        let signal = ChangeSignal::new();
        let device = Device {
            intf: 0b0000_0001,
            intcap: Err(()),
            edge_on_capture: None,
        };
        let mut expander = Mcp23017::new(device, Address::default());
        let mut delay = RecordingDelay::default();
        let mut monitor = ChangeMonitor::new(&signal, Port::A);

        signal.signal();
        assert_eq!(
            monitor.poll(&mut expander, &mut delay),
            Err(nb::Error::Other(()))
        );
        assert!(signal.is_pending());
    }

    #[test]
    fn pending_survives_unrelated_iterations() {
        let signal = ChangeSignal::new();
        let other = ChangeSignal::new();
        let mut mock = Mock::new(&[
            Transaction::write_read(ADDR, vec![0x0e], vec![0b1000_0000]),
            Transaction::write_read(ADDR, vec![0x10], vec![0b1000_0000]),
        ]);
        let mut expander = Mcp23017::new(mock.clone(), Address::default());
        let mut delay = RecordingDelay::default();
        let mut monitor = ChangeMonitor::new(&signal, Port::A);
        let mut unrelated = ChangeMonitor::new(&other, Port::B);

        signal.signal();
        for _ in 0..100 {
            assert!(unrelated.poll(&mut expander, &mut delay).is_err());
            assert!(signal.is_pending());
        }
        let change = monitor.poll(&mut expander, &mut delay).unwrap();
        assert_eq!(change.map(|c| c.pin), Some(pin(7)));
        mock.done();
    }
}
