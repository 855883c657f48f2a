//! Command reader
//!
//! Polls a serial receiver once per control-loop pass and extracts at most
//! one [`MoveCommand`].
//!
//! Integer fields use integer-scan semantics:
//! - characters that are neither a digit nor `-` are skipped
//! - a leading `-` negates the value
//! - digits accumulate until the first non-digit, which is left unread
//! - a field with no digits before the per-byte timeout reads as 0
//!
//! After one command (or one noise byte) the rest of the receive buffer is
//! dropped, so a burst of several commands in one buffer keeps only the
//! first. Malformed fields are not reported; the sender gets no feedback.

use scara_hal::SerialRx;

use crate::command::{MoveCommand, MOVE_MARKER};

/// Per-byte wait while scanning an integer field
pub const DEFAULT_PARSE_TIMEOUT_MS: u32 = 1000;

/// Counters for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ReaderStats {
    /// Move commands parsed
    pub accepted: u32,
    /// Leading bytes discarded as noise
    pub ignored: u32,
    /// Bytes dropped while draining after a poll
    pub drained: u32,
}

/// Serial move-command reader
#[derive(Debug, Clone)]
pub struct CommandReader {
    timeout_ms: u32,
    stats: ReaderStats,
}

impl Default for CommandReader {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandReader {
    /// Create a reader with the default field timeout
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_PARSE_TIMEOUT_MS)
    }

    /// Create a reader with a custom per-byte field timeout
    pub fn with_timeout(timeout_ms: u32) -> Self {
        Self {
            timeout_ms,
            stats: ReaderStats::default(),
        }
    }

    /// Per-byte field timeout in milliseconds
    pub fn timeout_ms(&self) -> u32 {
        self.timeout_ms
    }

    /// Diagnostic counters
    pub fn stats(&self) -> ReaderStats {
        self.stats
    }

    /// Check the receiver for a move command
    ///
    /// Returns immediately with `None` when nothing is buffered. Otherwise
    /// consumes one leading byte; if it is `M` the two integer fields are
    /// scanned (waiting up to the field timeout per byte). The remaining
    /// buffered bytes are then discarded.
    pub fn poll<R: SerialRx + ?Sized>(&mut self, rx: &mut R) -> Option<MoveCommand> {
        if !rx.bytes_available() {
            return None;
        }

        let lead = rx.try_read()?;

        let command = if lead == MOVE_MARKER {
            let mut scanner = Scanner::new(rx, self.timeout_ms);
            let shoulder = scanner.next_int();
            let elbow = scanner.next_int();
            self.stats.accepted = self.stats.accepted.wrapping_add(1);
            Some(MoveCommand::new(shoulder, elbow))
        } else {
            self.stats.ignored = self.stats.ignored.wrapping_add(1);
            None
        };

        let dropped = rx.drain();
        self.stats.drained = self.stats.drained.wrapping_add(dropped as u32);

        command
    }
}

/// Integer scanner with one byte of lookahead
///
/// The byte that terminates a field is peeked, not consumed, so it can
/// start the next field (`M 5-3` reads 5 then -3).
struct Scanner<'a, R: SerialRx + ?Sized> {
    rx: &'a mut R,
    timeout_ms: u32,
    peeked: Option<u8>,
}

impl<'a, R: SerialRx + ?Sized> Scanner<'a, R> {
    fn new(rx: &'a mut R, timeout_ms: u32) -> Self {
        Self {
            rx,
            timeout_ms,
            peeked: None,
        }
    }

    fn peek(&mut self) -> Option<u8> {
        if self.peeked.is_none() {
            self.peeked = self.rx.read_timeout(self.timeout_ms);
        }
        self.peeked
    }

    fn consume(&mut self) {
        self.peeked = None;
    }

    /// Scan the next signed integer, 0 if none arrives
    fn next_int(&mut self) -> i64 {
        // Skip up to the first sign or digit
        let first = loop {
            match self.peek() {
                None => return 0,
                Some(b) if b == b'-' || b.is_ascii_digit() => break b,
                Some(_) => self.consume(),
            }
        };

        let negative = first == b'-';
        if negative {
            self.consume();
        }

        // Accumulate toward the sign so i64::MIN is reachable; saturate past the bounds
        let mut value: i64 = 0;
        while let Some(b) = self.peek() {
            if !b.is_ascii_digit() {
                break;
            }
            let digit = i64::from(b - b'0');
            value = if negative {
                value.saturating_mul(10).saturating_sub(digit)
            } else {
                value.saturating_mul(10).saturating_add(digit)
            };
            self.consume();
        }

        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::VecDeque;

    /// Receive buffer that behaves as if everything already arrived
    struct MockSerial {
        buffer: VecDeque<u8>,
        timed_reads: usize,
    }

    impl MockSerial {
        fn new(bytes: &[u8]) -> Self {
            Self {
                buffer: bytes.iter().copied().collect(),
                timed_reads: 0,
            }
        }

        fn push(&mut self, bytes: &[u8]) {
            self.buffer.extend(bytes.iter().copied());
        }
    }

    impl SerialRx for MockSerial {
        fn bytes_available(&mut self) -> bool {
            !self.buffer.is_empty()
        }

        fn try_read(&mut self) -> Option<u8> {
            self.buffer.pop_front()
        }

        fn read_timeout(&mut self, _timeout_ms: u32) -> Option<u8> {
            self.timed_reads += 1;
            self.buffer.pop_front()
        }
    }

    fn parse(bytes: &[u8]) -> Option<MoveCommand> {
        let mut rx = MockSerial::new(bytes);
        CommandReader::new().poll(&mut rx)
    }

    #[test]
    fn test_empty_buffer_returns_none_without_waiting() {
        let mut rx = MockSerial::new(b"");
        let mut reader = CommandReader::new();
        assert_eq!(reader.poll(&mut rx), None);
        assert_eq!(rx.timed_reads, 0);
        assert_eq!(reader.stats(), ReaderStats::default());
    }

    #[test]
    fn test_basic_command() {
        assert_eq!(parse(b"M 500 -300\n"), Some(MoveCommand::new(500, -300)));
    }

    #[test]
    fn test_host_comma_format() {
        assert_eq!(parse(b"M,1200,-800\n"), Some(MoveCommand::new(1200, -800)));
    }

    #[test]
    fn test_noise_byte_is_discarded_with_rest_of_buffer() {
        let mut rx = MockSerial::new(b"xM 1 2\n");
        let mut reader = CommandReader::new();
        assert_eq!(reader.poll(&mut rx), None);
        assert!(rx.buffer.is_empty());
        assert_eq!(reader.stats().ignored, 1);
        assert_eq!(reader.stats().drained, 6);
    }

    #[test]
    fn test_lowercase_marker_is_noise() {
        assert_eq!(parse(b"m 10 20\n"), None);
    }

    #[test]
    fn test_burst_keeps_first_command_only() {
        let mut rx = MockSerial::new(b"M 1 2\nM 3 4\n");
        let mut reader = CommandReader::new();
        assert_eq!(reader.poll(&mut rx), Some(MoveCommand::new(1, 2)));
        assert!(rx.buffer.is_empty());
        assert_eq!(reader.poll(&mut rx), None);
        assert_eq!(reader.stats().accepted, 1);
    }

    #[test]
    fn test_terminator_starts_next_field() {
        assert_eq!(parse(b"M 5-3"), Some(MoveCommand::new(5, -3)));
    }

    #[test]
    fn test_non_numeric_fields_read_as_zero() {
        assert_eq!(parse(b"M abc def\n"), Some(MoveCommand::new(0, 0)));
        assert_eq!(parse(b"M"), Some(MoveCommand::new(0, 0)));
    }

    #[test]
    fn test_missing_second_field_reads_as_zero() {
        assert_eq!(parse(b"M 42"), Some(MoveCommand::new(42, 0)));
    }

    #[test]
    fn test_lone_minus_reads_as_zero() {
        assert_eq!(parse(b"M - 7\n"), Some(MoveCommand::new(0, 7)));
    }

    #[test]
    fn test_values_saturate() {
        assert_eq!(
            parse(b"M 99999999999999999999 -99999999999999999999\n"),
            Some(MoveCommand::new(i64::MAX, i64::MIN))
        );
    }

    #[test]
    fn test_extreme_values_exact() {
        assert_eq!(
            parse(b"M 9223372036854775807 -9223372036854775808\n"),
            Some(MoveCommand::new(i64::MAX, i64::MIN))
        );
    }

    #[test]
    fn test_repeated_command_is_idempotent() {
        let mut rx = MockSerial::new(b"M 250 -125\n");
        let mut reader = CommandReader::new();
        let first = reader.poll(&mut rx);
        rx.push(b"M 250 -125\n");
        let second = reader.poll(&mut rx);
        assert_eq!(first, second);
        assert_eq!(reader.stats().accepted, 2);
    }

    #[test]
    fn test_encoded_command_parses_back() {
        let cmd = MoveCommand::new(-1600, 4800);
        let line = cmd.encode().unwrap();
        assert_eq!(parse(line.as_bytes()), Some(cmd));
    }

    #[test]
    fn test_custom_timeout_is_kept() {
        let reader = CommandReader::with_timeout(25);
        assert_eq!(reader.timeout_ms(), 25);
        assert_eq!(CommandReader::default().timeout_ms(), DEFAULT_PARSE_TIMEOUT_MS);
    }

    proptest! {
        #[test]
        fn prop_valid_commands_set_exact_targets(
            a in any::<i64>(),
            b in any::<i64>(),
            sep1 in "[ ,;:]{1,3}",
            sep2 in "[ ,;:]{1,3}",
        ) {
            let line = std::format!("M{}{}{}{}\n", sep1, a, sep2, b);
            prop_assert_eq!(parse(line.as_bytes()), Some(MoveCommand::new(a, b)));
        }

        #[test]
        fn prop_other_leading_bytes_never_produce_commands(
            bytes in prop::collection::vec(any::<u8>(), 1..64)
                .prop_filter("must not start with the move marker", |v| v[0] != MOVE_MARKER)
        ) {
            let mut rx = MockSerial::new(&bytes);
            let mut reader = CommandReader::new();
            prop_assert_eq!(reader.poll(&mut rx), None);
            prop_assert!(rx.buffer.is_empty());
        }

        #[test]
        fn prop_poll_always_empties_buffer(bytes in prop::collection::vec(any::<u8>(), 0..64)) {
            let mut rx = MockSerial::new(&bytes);
            let _ = CommandReader::new().poll(&mut rx);
            prop_assert!(rx.buffer.is_empty());
        }
    }
}
