//! # VCOM Line-Framing Core
//!
//! Receive-side line framing and transmit gating for a USB CDC virtual COM
//! port:
//!
//! - **Line Sink**: fixed, statically allocated receive buffer fed by the USB
//!   receive path and drained by the application, one line at a time
//! - **Line Framer**: a line ends at the first control byte (`< 0x20`)
//! - **Transmit Gate**: refuses a write while the previous one is in flight
//!   instead of blocking
//!
//! ## Architecture
//!
//! ```text
//! CDC OUT ISR ──► Producer ──► LineSink<C> ──► Consumer ──► application
//!                    (lock-free, one atomic state word)
//!
//! application ──► TxGate ──► CdcTransport ──► CDC IN endpoint
//!                   (Busy, never blocks)
//! ```
//!
//! ## Backpressure
//!
//! The sink holds one line. Once a line is framed, new input is dropped until
//! the consumer takes it, so a pending line is never overwritten. A line that
//! fills the buffer without a terminator is flagged as an overflow and also
//! refuses input until drained.

#![cfg_attr(not(feature = "std"), no_std)]

#[macro_use]
mod fmt;

pub mod config;
pub mod error;
pub mod frame;
pub mod gate;
pub mod link;
pub mod pump;
pub mod sink;
pub mod stats;
pub mod traits;

// Re-export main types for convenience
pub use config::VcomConfig;
pub use error::{VcomError, VcomResult};
pub use frame::{is_terminator, END_MARKER};
pub use gate::TxGate;
pub use link::LinkState;
pub use pump::RxPump;
pub use sink::{Consumer, IngestOutcome, LineSink, Producer, SinkState};
pub use stats::{GateStats, SinkStats, StatsReport};
pub use traits::{CdcReceiver, CdcTransport, LineBuffer, TransmitStatus};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default receive buffer capacity
pub const RX_BUF_SIZE: usize = 128;
