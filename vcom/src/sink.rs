//! # Line Sink
//!
//! Fixed-capacity receive buffer shared between the USB receive path
//! (producer, usually the CDC OUT interrupt) and the application task
//! (consumer). There is no lock: the buffer length and the line/overflow
//! flags live together in one atomic state word, so the consumer always sees
//! a consistent `(length, flags)` pair.
//!
//! ## State Word
//!
//! ```text
//!  31            19   18       17        16        15            0
//! ┌────────────────┬─────────┬──────────┬─────────┬───────────────┐
//! │     epoch      │ CLAIMED │ OVERFLOW │  READY  │    length     │
//! └────────────────┴─────────┴──────────┴─────────┴───────────────┘
//! ```
//!
//! ## Access Rules
//!
//! - The producer writes only at indices `>= length` and publishes them with a
//!   compare-exchange of the whole word. While `READY`, `OVERFLOW` or
//!   `CLAIMED` is set it writes nothing.
//! - The consumer reads a framed line only after observing `READY`, a state
//!   in which the producer never writes.
//! - Raw reads and discards set `CLAIMED` first so no producer commit can
//!   land, copy `[0, length)`, then reset the word with the next epoch. A
//!   producer that loaded the old word fails its compare-exchange and the
//!   chunk is counted as dropped.

use core::cell::UnsafeCell;
use core::fmt;
use core::ptr;
use core::sync::atomic::{AtomicU32, Ordering};

use heapless::Vec;

use crate::error::{VcomError, VcomResult};
use crate::frame::{self, END_MARKER};
use crate::stats::{SinkCounters, SinkStats};
use crate::traits::LineBuffer;
use crate::RX_BUF_SIZE;

const LEN_MASK: u32 = 0xFFFF;
const LINE_READY: u32 = 1 << 16;
const OVERFLOW: u32 = 1 << 17;
const CLAIMED: u32 = 1 << 18;
const EPOCH_SHIFT: u32 = 19;

/// Packed `(length, flags, epoch)` word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct State(u32);

impl State {
    #[inline]
    const fn len(self) -> usize {
        (self.0 & LEN_MASK) as usize
    }

    #[inline]
    const fn has(self, flag: u32) -> bool {
        self.0 & flag != 0
    }

    #[inline]
    const fn with(self, flag: u32) -> Self {
        Self(self.0 | flag)
    }

    #[inline]
    const fn with_len(self, len: usize) -> Self {
        Self((self.0 & !LEN_MASK) | (len as u32 & LEN_MASK))
    }

    /// Empty state for the next epoch
    #[inline]
    const fn reset(self) -> Self {
        Self((self.0 >> EPOCH_SHIFT).wrapping_add(1) << EPOCH_SHIFT)
    }

    const fn phase(self) -> SinkState {
        if self.has(LINE_READY) {
            SinkState::LineReady
        } else if self.has(OVERFLOW) {
            SinkState::Overflowed
        } else if self.len() == 0 {
            SinkState::Empty
        } else {
            SinkState::Accumulating
        }
    }
}

/// Observable phase of the sink
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SinkState {
    /// Nothing buffered
    Empty,
    /// Partial line buffered, no terminator yet
    Accumulating,
    /// Buffer filled without a terminator; input refused until drained
    Overflowed,
    /// Complete line waiting for the consumer; input refused until drained
    LineReady,
}

/// What one ingestion call did with its chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IngestOutcome {
    /// Bytes appended to a partial line
    Accepted(usize),
    /// A terminator completed a line of `len` payload bytes. Bytes after the
    /// terminator in the same chunk were not processed.
    LineReady {
        /// Payload length, end marker excluded
        len: usize,
    },
    /// The buffer is full without a terminator. Returned both when this
    /// chunk filled it and when the chunk arrived at an already full sink.
    Overflow,
    /// The whole chunk was discarded because a line is pending or the
    /// consumer reset the sink mid-ingest
    Dropped,
}

/// Fixed-capacity line sink
///
/// `C` is the receive buffer capacity. A framed line holds at most `C - 1`
/// payload bytes because the end marker occupies the terminator's slot.
///
/// `split` borrows the sink mutably, so it is split once, by whoever owns
/// it:
///
/// ```rust
/// use vcom::sink::{IngestOutcome, LineSink};
///
/// let mut sink: LineSink<32> = LineSink::new();
/// let (mut producer, mut consumer) = sink.split();
///
/// // USB receive callback
/// assert_eq!(producer.ingest(b"AT\r\n"), IngestOutcome::LineReady { len: 2 });
///
/// // Application task
/// let mut line = [0u8; 32];
/// let len = consumer.get_line(&mut line);
/// assert_eq!(&line[..len], b"AT");
/// ```
///
/// Handles that must outlive the caller, such as a producer moved into an
/// interrupt handler or another thread, need a `&'static mut LineSink`. On
/// firmware that comes from a `static` cell taken once at startup; hosted
/// code can leak a box:
///
/// ```rust
/// use vcom::sink::LineSink;
///
/// let sink: &'static mut LineSink<32> = Box::leak(Box::new(LineSink::new()));
/// let (mut producer, mut consumer) = sink.split();
///
/// std::thread::spawn(move || {
///     producer.ingest(b"ping\n");
/// })
/// .join()
/// .unwrap();
///
/// assert_eq!(consumer.take_line_vec::<8>().as_deref(), Some(&b"ping"[..]));
/// ```
pub struct LineSink<const C: usize = RX_BUF_SIZE> {
    buf: UnsafeCell<[u8; C]>,
    state: AtomicU32,
    counters: SinkCounters,
}

// SAFETY: buffer bytes are only touched under the access rules in the module
// docs. Producer and consumer handles are unique because `split` borrows the
// sink mutably.
unsafe impl<const C: usize> Sync for LineSink<C> {}

impl<const C: usize> LineSink<C> {
    const CAPACITY_CHECK: () = assert!(
        C > 0 && C <= LEN_MASK as usize,
        "LineSink capacity must be in 1..=65535"
    );

    /// Create an empty sink
    pub const fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::CAPACITY_CHECK;
        Self {
            buf: UnsafeCell::new([0u8; C]),
            state: AtomicU32::new(0),
            counters: SinkCounters::new(),
        }
    }

    /// Receive buffer capacity
    #[inline]
    pub const fn capacity(&self) -> usize {
        C
    }

    /// Split into the producer (USB side) and consumer (application side)
    pub fn split(&mut self) -> (Producer<'_, C>, Consumer<'_, C>) {
        let sink: &Self = self;
        (Producer { sink }, Consumer { sink })
    }

    /// Current phase
    pub fn state(&self) -> SinkState {
        self.load().phase()
    }

    /// Receive-side counters
    pub fn stats(&self) -> SinkStats {
        self.counters.snapshot()
    }

    #[inline]
    fn load(&self) -> State {
        State(self.state.load(Ordering::Acquire))
    }

    #[inline]
    fn base(&self) -> *mut u8 {
        self.buf.get().cast::<u8>()
    }

    fn drop_chunk(&self, len: usize, why: &'static str) {
        self.counters.dropped(len);
        trace!("dropped {} bytes: {}", len, why);
    }

    /// Append a chunk and frame it.
    ///
    /// # Safety
    ///
    /// At most one context may be inside `ingest_shared` at any time.
    unsafe fn ingest_shared(&self, data: &[u8]) -> IngestOutcome {
        if data.is_empty() {
            return IngestOutcome::Accepted(0);
        }

        let current = self.load();
        if current.has(LINE_READY) || current.has(CLAIMED) {
            self.drop_chunk(data.len(), "line pending");
            return IngestOutcome::Dropped;
        }
        if current.has(OVERFLOW) {
            self.drop_chunk(data.len(), "overflowed");
            return IngestOutcome::Overflow;
        }

        let len = current.len();
        let window = &data[..data.len().min(C - len)];
        let scan = frame::scan(window);

        // SAFETY: `len + scan.consumed <= C`. Indices at or past `len` are
        // never read by the consumer until published below, and we are the
        // only writer.
        unsafe {
            let tail = self.base().add(len);
            ptr::copy_nonoverlapping(window.as_ptr(), tail, scan.consumed);
            if scan.terminated {
                tail.add(scan.consumed - 1).write(END_MARKER);
            }
        }

        let new_len = len + scan.consumed;
        let (next, outcome) = if scan.terminated {
            (
                current.with_len(new_len).with(LINE_READY),
                IngestOutcome::LineReady { len: new_len - 1 },
            )
        } else if new_len == C {
            (
                current.with_len(new_len).with(OVERFLOW),
                IngestOutcome::Overflow,
            )
        } else {
            (current.with_len(new_len), IngestOutcome::Accepted(scan.consumed))
        };

        if self
            .state
            .compare_exchange(current.0, next.0, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            self.drop_chunk(data.len(), "reset by consumer");
            return IngestOutcome::Dropped;
        }

        let leftover = data.len() - scan.consumed;
        match outcome {
            IngestOutcome::LineReady { len } => {
                self.counters.line_framed();
                trace!("line ready, {} bytes", len);
                if leftover > 0 {
                    self.drop_chunk(leftover, "after terminator");
                }
            }
            IngestOutcome::Overflow => {
                self.counters.overflowed();
                debug!("receive buffer full without terminator ({} bytes)", C);
                if leftover > 0 {
                    self.drop_chunk(leftover, "past capacity");
                }
            }
            _ => {}
        }
        outcome
    }

    /// Run `f` over the pending line's payload, then reset.
    ///
    /// Must only be called from the single consumer context.
    fn with_line<R>(&self, f: impl FnOnce(&[u8]) -> R) -> Option<R> {
        let current = self.load();
        if !current.has(LINE_READY) {
            return None;
        }

        // SAFETY: while READY is set the producer writes nothing, and a ready
        // line always holds at least the end marker.
        let line = unsafe { core::slice::from_raw_parts(self.base(), current.len() - 1) };
        let result = f(line);

        // Only the consumer clears READY, so no producer commit can have
        // raced this load.
        self.state.store(current.reset().0, Ordering::Release);
        Some(result)
    }

    /// Copy out whatever is buffered and reset.
    ///
    /// Must only be called from the single consumer context.
    fn take_raw_shared(&self, dest: &mut [u8]) -> usize {
        let claimed = State(self.state.fetch_or(CLAIMED, Ordering::AcqRel));
        let count = claimed.len().min(dest.len());

        // SAFETY: the producer only writes at indices >= `claimed.len()` and
        // can no longer publish.
        unsafe {
            ptr::copy_nonoverlapping(self.base(), dest.as_mut_ptr(), count);
        }

        self.state.store(claimed.reset().0, Ordering::Release);
        count
    }

    /// Reset without copying.
    ///
    /// Must only be called from the single consumer context.
    fn discard_shared(&self) {
        let claimed = State(self.state.fetch_or(CLAIMED, Ordering::AcqRel));
        if claimed.len() > 0 {
            debug!("discarding {} buffered bytes", claimed.len());
            self.counters.discarded(claimed.len());
        }
        self.state.store(claimed.reset().0, Ordering::Release);
    }
}

impl<const C: usize> Default for LineSink<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const C: usize> fmt::Debug for LineSink<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.load();
        f.debug_struct("LineSink")
            .field("capacity", &C)
            .field("length", &state.len())
            .field("state", &state.phase())
            .finish()
    }
}

impl<const C: usize> LineBuffer for LineSink<C> {
    fn ingest(&mut self, data: &[u8]) -> IngestOutcome {
        // SAFETY: `&mut self` excludes every other context.
        unsafe { self.ingest_shared(data) }
    }

    fn bytes_available(&self) -> usize {
        self.load().len()
    }

    fn is_line_ready(&self) -> bool {
        self.load().has(LINE_READY)
    }

    fn get_line(&mut self, dest: &mut [u8]) -> usize {
        take_line_into(self, dest).unwrap_or(0)
    }

    fn get_raw(&mut self, dest: &mut [u8]) -> usize {
        self.take_raw_shared(dest)
    }

    fn discard(&mut self) {
        self.discard_shared();
    }
}

fn take_line_into<const C: usize>(sink: &LineSink<C>, dest: &mut [u8]) -> Option<usize> {
    sink.with_line(|line| {
        let Some(room) = dest.len().checked_sub(1) else {
            return 0;
        };
        let count = line.len().min(room);
        dest[..count].copy_from_slice(&line[..count]);
        dest[count] = END_MARKER;
        count
    })
}

/// Producer half, owned by the USB receive path
///
/// `ingest` never blocks and never fails, so it is safe to call from the
/// CDC OUT interrupt.
#[derive(Debug)]
pub struct Producer<'a, const C: usize = RX_BUF_SIZE> {
    sink: &'a LineSink<C>,
}

impl<const C: usize> Producer<'_, C> {
    /// Hand a freshly received chunk to the sink.
    ///
    /// Scans at most `min(data.len(), C - length)` bytes. The transport may
    /// release its receive resource as soon as this returns, whatever the
    /// outcome.
    pub fn ingest(&mut self, data: &[u8]) -> IngestOutcome {
        // SAFETY: `Producer` is unique and `ingest` takes `&mut self`.
        unsafe { self.sink.ingest_shared(data) }
    }

    /// Whether the next chunk would be accepted at all
    pub fn is_accepting(&self) -> bool {
        let state = self.sink.load();
        !(state.has(LINE_READY) || state.has(OVERFLOW) || state.has(CLAIMED))
    }

    /// Receive buffer capacity
    pub const fn capacity(&self) -> usize {
        C
    }
}

/// Consumer half, owned by the application task
#[derive(Debug)]
pub struct Consumer<'a, const C: usize = RX_BUF_SIZE> {
    sink: &'a LineSink<C>,
}

impl<const C: usize> Consumer<'_, C> {
    /// Raw buffered byte count, framed or not.
    ///
    /// For a framed line this includes the end-marker slot. The value is a
    /// snapshot: the producer may append right after it is read.
    pub fn bytes_available(&self) -> usize {
        self.sink.load().len()
    }

    /// Whether a complete line is waiting
    pub fn is_line_available(&self) -> bool {
        self.sink.load().has(LINE_READY)
    }

    /// Whether the buffer filled up without a terminator
    pub fn is_overflowed(&self) -> bool {
        self.sink.load().has(OVERFLOW)
    }

    /// Report a pending overflow as an error
    pub fn check_overflow(&self) -> VcomResult<()> {
        if self.is_overflowed() {
            Err(VcomError::Overflow)
        } else {
            Ok(())
        }
    }

    /// Current phase
    pub fn state(&self) -> SinkState {
        self.sink.state()
    }

    /// Copy out up to `dest.len()` buffered bytes and reset the sink.
    ///
    /// Works whether or not a line has been framed and always invalidates a
    /// pending line. Returns the number of bytes copied.
    pub fn get_raw_data(&mut self, dest: &mut [u8]) -> usize {
        self.sink.take_raw_shared(dest)
    }

    /// Copy the pending line into `dest`, end-marker terminated.
    ///
    /// Returns the payload length, or 0 when no line is pending. A payload
    /// longer than `dest.len() - 1` is truncated. See [`take_line`] to tell an
    /// empty line apart from no line.
    ///
    /// [`take_line`]: Consumer::take_line
    pub fn get_line(&mut self, dest: &mut [u8]) -> usize {
        self.take_line(dest).unwrap_or(0)
    }

    /// Like [`get_line`](Consumer::get_line) but `None` when no line is pending
    pub fn take_line(&mut self, dest: &mut [u8]) -> Option<usize> {
        take_line_into(self.sink, dest)
    }

    /// Take the pending line into a `heapless::Vec`, truncating to `N` bytes
    pub fn take_line_vec<const N: usize>(&mut self) -> Option<Vec<u8, N>> {
        self.sink
            .with_line(|line| Vec::from_slice(&line[..line.len().min(N)]).ok())
            .flatten()
    }

    /// Borrow the pending line's payload in place, then release it
    pub fn read_line<R>(&mut self, f: impl FnOnce(&[u8]) -> R) -> Option<R> {
        self.sink.with_line(f)
    }

    /// Drop everything buffered, including a pending line or overflow
    pub fn discard(&mut self) {
        self.sink.discard_shared();
    }

    /// Receive-side counters
    pub fn stats(&self) -> SinkStats {
        self.sink.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_sink_is_empty() {
        let sink: LineSink<16> = LineSink::new();
        assert_eq!(sink.state(), SinkState::Empty);
        assert_eq!(sink.bytes_available(), 0);
        assert!(!sink.is_line_ready());
        assert_eq!(sink.capacity(), 16);
    }

    #[test]
    fn test_line_across_chunks() {
        let mut sink: LineSink<16> = LineSink::new();
        let (mut producer, mut consumer) = sink.split();

        assert_eq!(producer.ingest(b"HE"), IngestOutcome::Accepted(2));
        assert_eq!(producer.ingest(b"LL"), IngestOutcome::Accepted(2));
        assert_eq!(consumer.state(), SinkState::Accumulating);
        assert_eq!(producer.ingest(b"O\n"), IngestOutcome::LineReady { len: 5 });
        assert!(consumer.is_line_available());

        let mut line = [0xAAu8; 16];
        assert_eq!(consumer.get_line(&mut line), 5);
        assert_eq!(&line[..6], b"HELLO\0");
        assert_eq!(consumer.state(), SinkState::Empty);
        assert_eq!(consumer.bytes_available(), 0);
    }

    #[test]
    fn test_get_line_twice() {
        let mut sink: LineSink<16> = LineSink::new();
        let (mut producer, mut consumer) = sink.split();
        producer.ingest(b"ping\r");

        let mut line = [0u8; 16];
        assert_eq!(consumer.get_line(&mut line), 4);
        assert_eq!(consumer.get_line(&mut line), 0);
        assert_eq!(consumer.take_line(&mut line), None);
    }

    #[test]
    fn test_pending_line_blocks_new_input() {
        let mut sink: LineSink<16> = LineSink::new();
        let (mut producer, mut consumer) = sink.split();

        producer.ingest(b"AB\n");
        assert!(!producer.is_accepting());
        assert_eq!(producer.ingest(b"CD\n"), IngestOutcome::Dropped);

        let mut line = [0u8; 16];
        let len = consumer.get_line(&mut line);
        assert_eq!(&line[..len], b"AB");
        assert_eq!(consumer.stats().chunks_dropped, 1);
        assert_eq!(consumer.stats().bytes_dropped, 3);

        assert!(producer.is_accepting());
        producer.ingest(b"CD\n");
        let len = consumer.get_line(&mut line);
        assert_eq!(&line[..len], b"CD");
    }

    #[test]
    fn test_crlf_frames_on_cr() {
        let mut sink: LineSink<16> = LineSink::new();
        let (mut producer, mut consumer) = sink.split();

        assert_eq!(producer.ingest(b"AB\r\n"), IngestOutcome::LineReady { len: 2 });
        assert_eq!(consumer.bytes_available(), 3);

        let mut line = [0u8; 16];
        assert_eq!(consumer.get_line(&mut line), 2);
        assert_eq!(&line[..3], b"AB\0");
        // The LF shared the chunk with the CR and was not processed
        assert_eq!(consumer.bytes_available(), 0);
        assert_eq!(consumer.stats().bytes_dropped, 1);
    }

    #[test]
    fn test_empty_line() {
        let mut sink: LineSink<16> = LineSink::new();
        let (mut producer, mut consumer) = sink.split();

        assert_eq!(producer.ingest(b"\n"), IngestOutcome::LineReady { len: 0 });
        let mut line = [0xFFu8; 4];
        assert_eq!(consumer.take_line(&mut line), Some(0));
        assert_eq!(line[0], END_MARKER);
    }

    #[test]
    fn test_overflow_without_terminator() {
        let mut sink: LineSink<8> = LineSink::new();
        let (mut producer, mut consumer) = sink.split();

        assert_eq!(producer.ingest(b"12345678"), IngestOutcome::Overflow);
        assert!(!consumer.is_line_available());
        assert!(consumer.is_overflowed());
        assert_eq!(consumer.check_overflow(), Err(VcomError::Overflow));
        assert_eq!(consumer.bytes_available(), 8);

        // Further input is refused, even a terminator
        assert_eq!(producer.ingest(b"\n"), IngestOutcome::Overflow);
        assert_eq!(consumer.bytes_available(), 8);
        assert_eq!(consumer.state(), SinkState::Overflowed);

        let mut line = [0u8; 8];
        assert_eq!(consumer.get_line(&mut line), 0);

        consumer.discard();
        assert_eq!(consumer.state(), SinkState::Empty);
        assert_eq!(consumer.check_overflow(), Ok(()));
        assert_eq!(consumer.stats().overflows, 1);
        assert_eq!(consumer.stats().bytes_discarded, 8);

        // Discarding an empty sink counts nothing
        consumer.discard();
        assert_eq!(consumer.stats().bytes_discarded, 8);

        producer.ingest(b"ok\n");
        assert_eq!(consumer.get_line(&mut line), 2);
    }

    #[test]
    fn test_overflow_clips_long_chunk() {
        let mut sink: LineSink<4> = LineSink::new();
        let (mut producer, mut consumer) = sink.split();

        assert_eq!(producer.ingest(b"ABCDEF\n"), IngestOutcome::Overflow);
        assert_eq!(consumer.bytes_available(), 4);
        assert_eq!(consumer.stats().bytes_dropped, 3);

        let mut raw = [0u8; 8];
        assert_eq!(consumer.get_raw_data(&mut raw), 4);
        assert_eq!(&raw[..4], b"ABCD");
    }

    #[test]
    fn test_longest_line_fits() {
        let mut sink: LineSink<4> = LineSink::new();
        let (mut producer, mut consumer) = sink.split();

        assert_eq!(producer.ingest(b"ABC\n"), IngestOutcome::LineReady { len: 3 });
        let mut line = [0u8; 4];
        assert_eq!(consumer.get_line(&mut line), 3);
        assert_eq!(&line, b"ABC\0");
    }

    #[test]
    fn test_get_raw_partial_line() {
        let mut sink: LineSink<16> = LineSink::new();
        let (mut producer, mut consumer) = sink.split();

        producer.ingest(b"part");
        let mut raw = [0u8; 16];
        assert_eq!(consumer.get_raw_data(&mut raw), 4);
        assert_eq!(&raw[..4], b"part");
        assert_eq!(consumer.bytes_available(), 0);
        assert_eq!(consumer.state(), SinkState::Empty);
    }

    #[test]
    fn test_get_raw_invalidates_line() {
        let mut sink: LineSink<16> = LineSink::new();
        let (mut producer, mut consumer) = sink.split();

        producer.ingest(b"AB\n");
        let mut raw = [0u8; 2];
        assert_eq!(consumer.get_raw_data(&mut raw), 2);
        assert_eq!(&raw, b"AB");
        assert!(!consumer.is_line_available());
        assert_eq!(consumer.bytes_available(), 0);
    }

    #[test]
    fn test_get_line_truncates_to_destination() {
        let mut sink: LineSink<16> = LineSink::new();
        let (mut producer, mut consumer) = sink.split();

        producer.ingest(b"abcdef\n");
        let mut line = [0u8; 4];
        assert_eq!(consumer.get_line(&mut line), 3);
        assert_eq!(&line, b"abc\0");
        assert_eq!(consumer.state(), SinkState::Empty);
    }

    #[test]
    fn test_get_line_empty_destination_consumes() {
        let mut sink: LineSink<16> = LineSink::new();
        let (mut producer, mut consumer) = sink.split();

        producer.ingest(b"abc\n");
        assert_eq!(consumer.take_line(&mut []), Some(0));
        assert!(!consumer.is_line_available());
    }

    #[test]
    fn test_take_line_vec() {
        let mut sink: LineSink<16> = LineSink::new();
        let (mut producer, mut consumer) = sink.split();

        producer.ingest(b"status\n");
        let line = consumer.take_line_vec::<4>().unwrap();
        assert_eq!(line.as_slice(), b"stat");
        assert!(consumer.take_line_vec::<4>().is_none());

        producer.ingest(b"ok\n");
        let line = consumer.take_line_vec::<16>().unwrap();
        assert_eq!(line.as_slice(), b"ok");
    }

    #[test]
    fn test_read_line_in_place() {
        let mut sink: LineSink<16> = LineSink::new();
        let (mut producer, mut consumer) = sink.split();

        producer.ingest(b"42\n");
        let parsed = consumer.read_line(|line| core::str::from_utf8(line).ok()?.parse::<u32>().ok());
        assert_eq!(parsed, Some(Some(42)));
        assert_eq!(consumer.state(), SinkState::Empty);
    }

    #[test]
    fn test_zero_length_ingest_is_noop() {
        let mut sink: LineSink<16> = LineSink::new();
        assert_eq!(sink.ingest(&[]), IngestOutcome::Accepted(0));
        assert_eq!(sink.state(), SinkState::Empty);
        assert_eq!(sink.stats(), SinkStats::default());
    }

    #[test]
    fn test_line_buffer_interface() {
        let mut sink: LineSink<16> = LineSink::new();

        sink.ingest(b"partial");
        assert_eq!(sink.bytes_available(), 7);
        assert!(!sink.is_line_ready());

        sink.discard();
        assert_eq!(sink.bytes_available(), 0);

        sink.ingest(b"done\n");
        assert!(sink.is_line_ready());
        let mut line = [0u8; 8];
        assert_eq!(sink.get_line(&mut line), 4);
        assert_eq!(sink.get_raw(&mut line), 0);
    }

    #[test]
    fn test_epoch_wraps() {
        let state = State(((1 << (32 - EPOCH_SHIFT)) - 1) << EPOCH_SHIFT | LINE_READY | 3);
        assert_eq!(state.reset(), State(0));
        assert_eq!(State(LINE_READY | 3).reset(), State(1 << EPOCH_SHIFT));
    }

    #[test]
    fn test_claimed_producer_drops() {
        let mut sink: LineSink<16> = LineSink::new();
        sink.ingest(b"ab");
        sink.state.fetch_or(CLAIMED, Ordering::AcqRel);
        assert_eq!(sink.ingest(b"cd"), IngestOutcome::Dropped);
        assert_eq!(sink.bytes_available(), 2);
    }
}
