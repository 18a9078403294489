//! Polled receive path.
//!
//! For USB stacks without a receive callback, the application calls
//! [`RxPump::poll`] from its main loop. Each call moves at most one packet
//! from the OUT endpoint into the sink, then re-arms the endpoint whatever
//! the sink did with it.

use crate::config::DEFAULT_MAX_PACKET_SIZE;
use crate::sink::{IngestOutcome, Producer};
use crate::traits::CdcReceiver;

/// Moves packets from a [`CdcReceiver`] into a [`Producer`]
///
/// `P` is the scratch packet size and must be at least the endpoint's max
/// packet size.
#[derive(Debug)]
pub struct RxPump<const P: usize = DEFAULT_MAX_PACKET_SIZE> {
    scratch: [u8; P],
}

impl<const P: usize> RxPump<P> {
    /// Create a pump with a zeroed scratch buffer
    pub const fn new() -> Self {
        Self { scratch: [0u8; P] }
    }

    /// Service the OUT endpoint once.
    ///
    /// Returns `None` when no packet was waiting.
    pub fn poll<R, const C: usize>(
        &mut self,
        rx: &mut R,
        producer: &mut Producer<'_, C>,
    ) -> Option<IngestOutcome>
    where
        R: CdcReceiver + ?Sized,
    {
        let len = rx.read_packet(&mut self.scratch)?.min(P);
        let outcome = producer.ingest(&self.scratch[..len]);
        rx.release();
        Some(outcome)
    }
}

impl<const P: usize> Default for RxPump<P> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::LineSink;

    /// Hands out a fixed list of packets
    struct ScriptedEndpoint<'a> {
        packets: &'a [&'a [u8]],
        next: usize,
        released: usize,
    }

    impl CdcReceiver for ScriptedEndpoint<'_> {
        fn read_packet(&mut self, buf: &mut [u8]) -> Option<usize> {
            let packet = self.packets.get(self.next)?;
            self.next += 1;
            buf[..packet.len()].copy_from_slice(packet);
            Some(packet.len())
        }

        fn release(&mut self) {
            self.released += 1;
        }
    }

    #[test]
    fn test_pump_frames_line() {
        let mut sink: LineSink<32> = LineSink::new();
        let (mut producer, mut consumer) = sink.split();
        let mut rx = ScriptedEndpoint {
            packets: &[&b"GET "[..], &b"temp\r\n"[..], &b"late\n"[..]],
            next: 0,
            released: 0,
        };
        let mut pump: RxPump<8> = RxPump::new();

        assert_eq!(pump.poll(&mut rx, &mut producer), Some(IngestOutcome::Accepted(4)));
        assert_eq!(
            pump.poll(&mut rx, &mut producer),
            Some(IngestOutcome::LineReady { len: 8 })
        );
        // Line still pending: the next packet is dropped but the endpoint is re-armed
        assert_eq!(pump.poll(&mut rx, &mut producer), Some(IngestOutcome::Dropped));
        assert_eq!(pump.poll(&mut rx, &mut producer), None);
        assert_eq!(rx.released, 3);

        let mut line = [0u8; 32];
        let len = consumer.get_line(&mut line);
        assert_eq!(&line[..len], b"GET temp");
    }
}
