//! # Line Framer
//!
//! The terminator policy applied by the sink's ingestion path. A line ends at
//! the first control byte (`< 0x20`), which covers CR, LF, NUL and friends.
//! The terminator never reaches the consumer: its slot in the receive buffer
//! is overwritten with [`END_MARKER`].

/// Logical end-of-line marker stored in place of the terminator
pub const END_MARKER: u8 = 0x00;

/// First byte value that is *not* a terminator (ASCII space)
const FIRST_PRINTABLE: u8 = 0x20;

/// Check whether `byte` ends a line
#[inline]
pub const fn is_terminator(byte: u8) -> bool {
    byte < FIRST_PRINTABLE
}

/// Result of scanning one window of incoming bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Scan {
    /// Bytes taken from the window, including the terminator if one was found
    pub consumed: usize,
    /// Whether the last consumed byte was a terminator
    pub terminated: bool,
}

/// Scan `window` up to and including the first terminator.
///
/// The caller is expected to have already clipped `window` to the free
/// space left in the receive buffer, so `consumed` always fits.
#[inline]
pub fn scan(window: &[u8]) -> Scan {
    match window.iter().position(|&b| is_terminator(b)) {
        Some(idx) => Scan {
            consumed: idx + 1,
            terminated: true,
        },
        None => Scan {
            consumed: window.len(),
            terminated: false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminator_range() {
        assert!(is_terminator(b'\n'));
        assert!(is_terminator(b'\r'));
        assert!(is_terminator(0x00));
        assert!(is_terminator(0x1F));
        assert!(!is_terminator(b' '));
        assert!(!is_terminator(b'A'));
        assert!(!is_terminator(0x7F));
        assert!(!is_terminator(0xFF));
    }

    #[test]
    fn test_scan_stops_at_first_terminator() {
        let scan = scan(b"AB\r\nCD");
        assert_eq!(scan.consumed, 3);
        assert!(scan.terminated);
    }

    #[test]
    fn test_scan_without_terminator_takes_window() {
        let scan = scan(b"hello");
        assert_eq!(scan.consumed, 5);
        assert!(!scan.terminated);
    }

    #[test]
    fn test_scan_leading_terminator() {
        let scan = scan(b"\nrest");
        assert_eq!(scan, Scan { consumed: 1, terminated: true });
    }

    #[test]
    fn test_scan_empty_window() {
        assert_eq!(scan(&[]), Scan { consumed: 0, terminated: false });
    }
}
