//! Interrupt-to-main-loop signalling
//!
//! A [`ChangeSignal`] is the only state shared between the interrupt handler
//! wired to the expander's INT line and the main loop. The handler calls
//! [`signal`] and nothing else; all bus traffic happens in the main loop,
//! which observes the signal and clears it once the change is handled.
//!
//! ```
//! use ioextend::signal::ChangeSignal;
//!
//! static PORT_A_CHANGED: ChangeSignal = ChangeSignal::new();
//!
//! // In the falling-edge handler of the host pin wired to INTA
//! fn on_int_a() {
//!     PORT_A_CHANGED.signal();
//! }
//!
//! on_int_a();
//! assert!(PORT_A_CHANGED.consume());
//! assert!(!PORT_A_CHANGED.consume());
//! ```
//!
//! The signal carries "at least one change happened" and nothing more. Edges
//! arriving while it is already pending are merged into the pending one.
//!
//! Only atomic loads and stores are used, so the type also works on cores
//! without compare-and-swap (e.g. Cortex-M0). That is sound because there is
//! exactly one setter and one clearer.
//!
//! [`signal`]: ChangeSignal::signal

use core::sync::atomic::{AtomicBool, Ordering};

/// A single pending/idle flag set from interrupt context.
#[derive(Debug, Default)]
pub struct ChangeSignal {
    pending: AtomicBool,
}

impl ChangeSignal {
    /// Create an idle signal. Usable in a `static`.
    pub const fn new() -> Self {
        Self {
            pending: AtomicBool::new(false),
        }
    }

    /// Mark a change as pending. Call only from the interrupt handler.
    #[inline]
    pub fn signal(&self) {
        self.pending.store(true, Ordering::Release);
    }

    /// Returns `true` if a change is pending. The signal stays pending.
    #[inline]
    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }

    /// Mark the pending change as handled. Call only from the main loop.
    #[inline]
    pub fn acknowledge(&self) {
        self.pending.store(false, Ordering::Release);
    }

    /// Returns whether a change was pending and clears it.
    ///
    /// An edge that lands between the check and the clear is merged into the
    /// change being returned.
    pub fn consume(&self) -> bool {
        let pending = self.is_pending();
        if pending {
            self.acknowledge();
        }
        pending
    }
}
