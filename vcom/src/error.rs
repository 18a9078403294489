//! Error kinds surfaced by the VCOM core.
//!
//! None of these are fatal. "Nothing to read" is not an error at all: the
//! extraction calls return zero or `None`.

use thiserror::Error;

/// Errors that can occur on the VCOM receive and transmit paths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum VcomError {
    /// A line filled the receive buffer before its terminator arrived
    #[error("line exceeded receive buffer capacity")]
    Overflow,
    /// A previous transmission is still in flight
    #[error("transmit endpoint busy")]
    Busy,
    /// The host has not asserted DTR
    #[error("host not connected")]
    Disconnected,
    /// Write larger than the transport accepts in one transfer
    #[error("payload of {len} bytes exceeds {max} byte transfer limit")]
    PayloadTooLarge {
        /// Requested length
        len: usize,
        /// Transport limit
        max: usize,
    },
    /// The USB stack rejected the transfer
    #[error("transport failure")]
    Transport,
    /// In-flight transmission did not complete within the poll budget
    #[error("flush timed out")]
    FlushTimeout,
}

/// Result type alias for VCOM operations
pub type VcomResult<T> = Result<T, VcomError>;

impl embedded_io::Error for VcomError {
    fn kind(&self) -> embedded_io::ErrorKind {
        use embedded_io::ErrorKind;

        match self {
            VcomError::Overflow => ErrorKind::OutOfMemory,
            VcomError::Busy | VcomError::FlushTimeout => ErrorKind::TimedOut,
            VcomError::Disconnected => ErrorKind::NotConnected,
            VcomError::PayloadTooLarge { .. } => ErrorKind::InvalidInput,
            VcomError::Transport => ErrorKind::Other,
        }
    }
}
