//! # Link Statistics
//!
//! The sink keeps its counters in atomics so the interrupt-side producer can
//! bump them without touching the consumer. Snapshots are plain values and
//! serialize with `postcard`, so firmware can answer a status query on the
//! same CDC link.

use core::sync::atomic::{AtomicU32, Ordering};

use serde::{Deserialize, Serialize};

/// Receive-side counters
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SinkStats {
    /// Lines terminated and made available to the consumer
    pub lines_framed: u32,
    /// Chunks dropped whole or in part (line pending, overflow, or a
    /// consumer reset racing the producer)
    pub chunks_dropped: u32,
    /// Bytes lost to the drops above
    pub bytes_dropped: u32,
    /// Lines that filled the buffer without a terminator
    pub overflows: u32,
    /// Buffered bytes thrown away by an explicit consumer discard
    pub bytes_discarded: u32,
}

/// Transmit-side counters
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GateStats {
    /// Writes accepted by the transport
    pub writes: u32,
    /// Payload bytes accepted by the transport
    pub bytes_sent: u32,
    /// Writes refused because a transmission was in flight
    pub busy: u32,
    /// Writes the transport rejected
    pub failures: u32,
}

/// Combined snapshot for a status reply
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StatsReport {
    /// Receive side
    pub sink: SinkStats,
    /// Transmit side
    pub gate: GateStats,
    /// Host has asserted DTR
    pub connected: bool,
}

impl StatsReport {
    /// Serialize the report into `buffer` using postcard
    pub fn encode<'a>(&self, buffer: &'a mut [u8]) -> Result<&'a [u8], postcard::Error> {
        postcard::to_slice(self, buffer).map(|used| &*used)
    }

    /// Deserialize a report from bytes
    pub fn decode(data: &[u8]) -> Result<Self, postcard::Error> {
        postcard::from_bytes(data)
    }
}

/// Atomic backing store for [`SinkStats`]
#[derive(Debug)]
pub(crate) struct SinkCounters {
    lines_framed: AtomicU32,
    chunks_dropped: AtomicU32,
    bytes_dropped: AtomicU32,
    overflows: AtomicU32,
    bytes_discarded: AtomicU32,
}

impl SinkCounters {
    pub(crate) const fn new() -> Self {
        Self {
            lines_framed: AtomicU32::new(0),
            chunks_dropped: AtomicU32::new(0),
            bytes_dropped: AtomicU32::new(0),
            overflows: AtomicU32::new(0),
            bytes_discarded: AtomicU32::new(0),
        }
    }

    #[inline]
    pub(crate) fn line_framed(&self) {
        self.lines_framed.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn dropped(&self, bytes: usize) {
        if bytes == 0 {
            return;
        }
        self.chunks_dropped.fetch_add(1, Ordering::Relaxed);
        self.bytes_dropped
            .fetch_add(u32::try_from(bytes).unwrap_or(u32::MAX), Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn overflowed(&self) {
        self.overflows.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn discarded(&self, bytes: usize) {
        self.bytes_discarded
            .fetch_add(u32::try_from(bytes).unwrap_or(u32::MAX), Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> SinkStats {
        SinkStats {
            lines_framed: self.lines_framed.load(Ordering::Relaxed),
            chunks_dropped: self.chunks_dropped.load(Ordering::Relaxed),
            bytes_dropped: self.bytes_dropped.load(Ordering::Relaxed),
            overflows: self.overflows.load(Ordering::Relaxed),
            bytes_discarded: self.bytes_discarded.load(Ordering::Relaxed),
        }
    }
}
