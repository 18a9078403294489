//! # Line Buffer & Transport Abstractions
//!
//! The VCOM core never talks to a USB stack directly. The integration
//! implements these traits on top of whatever CDC class driver it uses:
//!
//! - [`CdcTransport`]: the IN endpoint (transmit, busy, connected)
//! - [`CdcReceiver`]: the OUT endpoint, for stacks that are polled rather
//!   than interrupt driven
//!
//! [`LineBuffer`] is the single capability interface over the receive
//! buffer, so application code and tests can depend on it rather than on a
//! concrete sink.

use crate::sink::IngestOutcome;

/// Outcome of handing one transfer to the USB stack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransmitStatus {
    /// Transfer queued on the endpoint
    Ok,
    /// A previous transfer has not completed yet
    Busy,
    /// The stack refused the transfer
    Fail,
}

/// Receive buffer with line framing
///
/// One canonical behaviour: a line ends at the first byte below `0x20`, the
/// returned length never counts the end marker, and a full buffer without a
/// terminator is flagged rather than silently completed.
pub trait LineBuffer {
    /// Hand newly arrived bytes to the buffer
    fn ingest(&mut self, data: &[u8]) -> IngestOutcome;

    /// Raw buffered byte count
    fn bytes_available(&self) -> usize;

    /// Whether a complete line is waiting
    fn is_line_ready(&self) -> bool;

    /// Copy out the pending line, end-marker terminated; 0 if none
    fn get_line(&mut self, dest: &mut [u8]) -> usize;

    /// Copy out whatever is buffered and reset
    fn get_raw(&mut self, dest: &mut [u8]) -> usize;

    /// Reset without copying
    fn discard(&mut self);
}

/// CDC IN endpoint, as seen by the transmit gate
///
/// # Example
///
/// ```ignore
/// impl CdcTransport for UsbCdc {
///     fn transmit(&mut self, data: &[u8]) -> TransmitStatus {
///         match self.class.write_packet(data) {
///             Ok(_) => TransmitStatus::Ok,
///             Err(UsbError::WouldBlock) => TransmitStatus::Busy,
///             Err(_) => TransmitStatus::Fail,
///         }
///     }
///     // ...
/// }
/// ```
pub trait CdcTransport {
    /// Queue `data` as one transfer. Must not block.
    fn transmit(&mut self, data: &[u8]) -> TransmitStatus;

    /// Whether a previously queued transfer is still in flight
    fn is_tx_busy(&self) -> bool;

    /// Whether the host has opened the port (DTR asserted)
    fn is_connected(&self) -> bool;

    /// Drive the USB stack once.
    ///
    /// Called by flush between busy checks. Interrupt-driven stacks leave
    /// the default no-op; polled stacks run their device task here.
    fn service(&mut self) {}
}

/// CDC OUT endpoint for polled stacks
pub trait CdcReceiver {
    /// Copy the next received packet into `buf`, if one is waiting.
    ///
    /// Returns the packet length. Must not block.
    fn read_packet(&mut self, buf: &mut [u8]) -> Option<usize>;

    /// Re-arm the endpoint for the next packet once the last one was
    /// consumed (or dropped)
    fn release(&mut self) {}
}

impl<T: CdcTransport + ?Sized> CdcTransport for &mut T {
    fn transmit(&mut self, data: &[u8]) -> TransmitStatus {
        (**self).transmit(data)
    }

    fn is_tx_busy(&self) -> bool {
        (**self).is_tx_busy()
    }

    fn is_connected(&self) -> bool {
        (**self).is_connected()
    }

    fn service(&mut self) {
        (**self).service();
    }
}
