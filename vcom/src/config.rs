//! Transmit-side configuration.

use serde::{Deserialize, Serialize};

/// Full-speed CDC bulk IN packet size
pub const DEFAULT_MAX_PACKET_SIZE: usize = 64;

/// Default number of transport polls a flush may spend waiting
pub const DEFAULT_FLUSH_POLL_LIMIT: u32 = 10_000;

/// Configuration for the [`TxGate`](crate::gate::TxGate)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct VcomConfig {
    /// Chunk size used by the `embedded_io::Write` adapter
    pub max_packet_size: usize,
    /// Optional cap on a single [`send_bytes`](crate::gate::TxGate::send_bytes).
    ///
    /// `None` leaves the limit to the transport, which splits a transfer
    /// into packets itself.
    pub max_transfer_size: Option<usize>,
    /// Upper bound on transport polls performed by one flush
    pub flush_poll_limit: u32,
    /// Refuse writes while the host has not asserted DTR
    pub require_connection: bool,
}

impl VcomConfig {
    /// Create the default configuration
    pub const fn new() -> Self {
        Self {
            max_packet_size: DEFAULT_MAX_PACKET_SIZE,
            max_transfer_size: None,
            flush_poll_limit: DEFAULT_FLUSH_POLL_LIMIT,
            require_connection: true,
        }
    }

    /// Set the chunk size used by the `embedded_io::Write` adapter
    pub const fn with_max_packet_size(mut self, size: usize) -> Self {
        self.max_packet_size = size;
        self
    }

    /// Refuse single writes longer than `size`
    pub const fn with_max_transfer_size(mut self, size: usize) -> Self {
        self.max_transfer_size = Some(size);
        self
    }

    /// Set the flush poll budget
    pub const fn with_flush_poll_limit(mut self, polls: u32) -> Self {
        self.flush_poll_limit = polls;
        self
    }

    /// Allow or refuse writes while disconnected
    pub const fn with_require_connection(mut self, require: bool) -> Self {
        self.require_connection = require;
        self
    }
}

impl Default for VcomConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = VcomConfig::default();
        assert_eq!(config.max_packet_size, 64);
        assert_eq!(config.max_transfer_size, None);
        assert_eq!(config.flush_poll_limit, 10_000);
        assert!(config.require_connection);
    }

    #[test]
    fn test_config_builders() {
        let config = VcomConfig::new()
            .with_max_packet_size(512)
            .with_max_transfer_size(4096)
            .with_flush_poll_limit(3)
            .with_require_connection(false);
        assert_eq!(config.max_packet_size, 512);
        assert_eq!(config.max_transfer_size, Some(4096));
        assert_eq!(config.flush_poll_limit, 3);
        assert!(!config.require_connection);
    }
}
