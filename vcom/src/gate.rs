//! # Transmit Gate
//!
//! Sits in front of the CDC IN endpoint and makes sure a second transfer is
//! never queued while the first is still in flight. Writes never block and
//! never queue: a busy endpoint is reported as [`VcomError::Busy`] and the
//! caller decides whether to retry, drop, or [`flush`](TxGate::flush).
//!
//! `flush` is the only bounded wait on either path.

use core::ffi::CStr;

use crate::config::VcomConfig;
use crate::error::{VcomError, VcomResult};
use crate::stats::{GateStats, SinkStats, StatsReport};
use crate::traits::{CdcTransport, TransmitStatus};

/// Non-blocking writer over a [`CdcTransport`]
#[derive(Debug)]
pub struct TxGate<T> {
    transport: T,
    config: VcomConfig,
    stats: GateStats,
}

impl<T: CdcTransport> TxGate<T> {
    /// Wrap a transport with the default configuration
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, VcomConfig::default())
    }

    /// Wrap a transport with an explicit configuration
    pub fn with_config(transport: T, config: VcomConfig) -> Self {
        Self {
            transport,
            config,
            stats: GateStats::default(),
        }
    }

    /// Active configuration
    pub fn config(&self) -> &VcomConfig {
        &self.config
    }

    /// Borrow the transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Mutably borrow the transport
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Unwrap the transport
    pub fn into_inner(self) -> T {
        self.transport
    }

    /// Whether the host has the port open
    pub fn is_connected(&self) -> bool {
        self.transport.is_connected()
    }

    /// Whether a transfer is in flight
    pub fn is_busy(&self) -> bool {
        self.transport.is_tx_busy()
    }

    /// Queue `data` as one transfer.
    ///
    /// Returns [`VcomError::Busy`] immediately if the previous transfer has
    /// not completed. An empty slice is a no-op. The length is only checked
    /// when `max_transfer_size` is set; otherwise the transport decides.
    pub fn send_bytes(&mut self, data: &[u8]) -> VcomResult<()> {
        if data.is_empty() {
            return Ok(());
        }
        if self.config.require_connection && !self.transport.is_connected() {
            return Err(VcomError::Disconnected);
        }
        if let Some(max) = self.config.max_transfer_size {
            if data.len() > max {
                return Err(VcomError::PayloadTooLarge {
                    len: data.len(),
                    max,
                });
            }
        }
        if self.transport.is_tx_busy() {
            self.stats.busy = self.stats.busy.wrapping_add(1);
            return Err(VcomError::Busy);
        }

        match self.transport.transmit(data) {
            TransmitStatus::Ok => {
                self.stats.writes = self.stats.writes.wrapping_add(1);
                self.stats.bytes_sent = self
                    .stats
                    .bytes_sent
                    .wrapping_add(u32::try_from(data.len()).unwrap_or(u32::MAX));
                trace!("queued {} bytes", data.len());
                Ok(())
            }
            TransmitStatus::Busy => {
                self.stats.busy = self.stats.busy.wrapping_add(1);
                Err(VcomError::Busy)
            }
            TransmitStatus::Fail => {
                self.stats.failures = self.stats.failures.wrapping_add(1);
                warn!("transport rejected {} byte transfer", data.len());
                Err(VcomError::Transport)
            }
        }
    }

    /// Send a single byte
    pub fn put_char(&mut self, c: u8) -> VcomResult<()> {
        self.send_bytes(&[c])
    }

    /// Send a string, up to (not including) an embedded NUL if it has one
    pub fn put_str(&mut self, s: &str) -> VcomResult<()> {
        let bytes = s.as_bytes();
        let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
        self.send_bytes(&bytes[..end])
    }

    /// Send a C string without its terminator
    pub fn put_cstr(&mut self, s: &CStr) -> VcomResult<()> {
        self.send_bytes(s.to_bytes())
    }

    /// Wait for the in-flight transfer to complete.
    ///
    /// Polls the transport at most `flush_poll_limit` times, calling
    /// [`CdcTransport::service`] between checks.
    pub fn flush(&mut self) -> VcomResult<()> {
        for _ in 0..self.config.flush_poll_limit {
            if !self.transport.is_tx_busy() {
                return Ok(());
            }
            self.transport.service();
        }

        if self.transport.is_tx_busy() {
            warn!(
                "flush gave up after {} polls",
                self.config.flush_poll_limit
            );
            Err(VcomError::FlushTimeout)
        } else {
            Ok(())
        }
    }

    /// Transmit-side counters
    pub fn stats(&self) -> GateStats {
        self.stats
    }

    /// Combine with receive-side counters into a status report
    pub fn report(&self, sink: SinkStats) -> StatsReport {
        StatsReport {
            sink,
            gate: self.stats,
            connected: self.transport.is_connected(),
        }
    }
}

impl<T> embedded_io::ErrorType for TxGate<T> {
    type Error = VcomError;
}

/// Blocking adapter: each write first flushes (bounded), then queues at most
/// one packet of `max_packet_size` bytes. A zero packet size is refused with
/// `InvalidInput`.
impl<T: CdcTransport> embedded_io::Write for TxGate<T> {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        if buf.is_empty() {
            return Ok(0);
        }
        if self.config.max_packet_size == 0 {
            return Err(VcomError::PayloadTooLarge {
                len: buf.len(),
                max: 0,
            });
        }
        TxGate::flush(self)?;
        let len = buf.len().min(self.config.max_packet_size);
        self.send_bytes(&buf[..len])?;
        Ok(len)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        TxGate::flush(self)
    }
}
