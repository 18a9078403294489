//! Host control-line state.
//!
//! The CDC class request `SET_CONTROL_LINE_STATE` arrives on the control
//! endpoint, often in interrupt context. The integration forwards the DTR and
//! RTS bits here; the application reads them back from task context.

use core::sync::atomic::{AtomicBool, Ordering};

/// DTR bit of the `SET_CONTROL_LINE_STATE` wValue
const DTR_BIT: u16 = 0x0001;
/// RTS bit of the `SET_CONTROL_LINE_STATE` wValue
const RTS_BIT: u16 = 0x0002;

/// Last control-line state reported by the host
#[derive(Debug)]
pub struct LinkState {
    dtr: AtomicBool,
    rts: AtomicBool,
}

impl LinkState {
    /// Both lines deasserted
    pub const fn new() -> Self {
        Self {
            dtr: AtomicBool::new(false),
            rts: AtomicBool::new(false),
        }
    }

    /// Record new line states
    pub fn set_control_lines(&self, dtr: bool, rts: bool) {
        let was_connected = self.dtr.swap(dtr, Ordering::AcqRel);
        self.rts.store(rts, Ordering::Release);
        if was_connected != dtr {
            debug!("host {}", if dtr { "connected" } else { "disconnected" });
        }
    }

    /// Record line states straight from the request's wValue
    pub fn set_from_request(&self, value: u16) {
        self.set_control_lines(value & DTR_BIT != 0, value & RTS_BIT != 0);
    }

    /// Host reset or bus suspend: both lines drop
    pub fn reset(&self) {
        self.set_control_lines(false, false);
    }

    /// Data terminal ready
    pub fn dtr(&self) -> bool {
        self.dtr.load(Ordering::Acquire)
    }

    /// Request to send
    pub fn rts(&self) -> bool {
        self.rts.load(Ordering::Acquire)
    }

    /// A terminal has the port open
    pub fn is_connected(&self) -> bool {
        self.dtr()
    }

    /// Both DTR and RTS are asserted
    pub fn is_open(&self) -> bool {
        self.dtr() && self.rts()
    }
}

impl Default for LinkState {
    fn default() -> Self {
        Self::new()
    }
}
