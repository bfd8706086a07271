//! C2: the line-counting input filter (spec §4.1).
//!
//! Normalises newline conventions, strips a leading UTF-8 BOM, counts
//! lines, and offers exactly one byte of caller-visible pushback. Styled
//! after `ori_lexer_core::Cursor`'s small `#[inline]` stateful methods, but
//! genuinely streaming (one byte at a time, no slab of source held in
//! memory) per spec.md's Non-goals.
//!
//! Two internal lookahead slots exist, and they are not the same thing:
//!
//! - `raw_lookahead`: a byte already pulled from the source while resolving
//!   a CR/LF pair, but not yet delivered to the caller. When later
//!   delivered it is still newline-normalised and line-counted like any
//!   fresh byte.
//! - `replay_pending` (+ `last`): the caller-visible pushback slot. This
//!   byte *was* already delivered and counted; replaying it must not
//!   double-count the line (the invariant in spec.md §3: "never advances
//!   on `pushback` reads").

use crate::source::{ByteSource, SourceByte};

const LF: u8 = b'\n';
const CR: u8 = b'\r';

/// One filtered byte, or a terminal sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilteredByte {
    /// A normalised byte (newlines already collapsed to LF).
    Byte(u8),
    /// End of input.
    Eof,
    /// The byte source reported an I/O error.
    IoErr,
    /// A partial or invalid UTF-8 BOM was found at the start of the stream.
    BadSignature,
}

/// Terminal states the filter can latch into. Once set, every later
/// [`FilterState::read`] call returns the same sentinel without touching
/// the byte source again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sentinel {
    Eof,
    IoErr,
    BadSignature,
}

impl From<Sentinel> for FilteredByte {
    fn from(s: Sentinel) -> Self {
        match s {
            Sentinel::Eof => FilteredByte::Eof,
            Sentinel::IoErr => FilteredByte::IoErr,
            Sentinel::BadSignature => FilteredByte::BadSignature,
        }
    }
}

/// Result of pulling one raw (pre-normalisation) byte from the source,
/// transparently consuming `raw_lookahead` first if one is buffered.
enum RawPull {
    Byte(u8),
    Eof,
    IoErr,
}

/// Line-counting, BOM-stripping, newline-normalising input filter.
#[derive(Debug, Clone)]
pub struct FilterState {
    line: u64,
    last_line: u64,
    last: Option<u8>,
    started: bool,
    bom_present: bool,
    sentinel: Option<Sentinel>,
    /// A sentinel observed one byte "ahead" while resolving a CR/LF pair;
    /// surfaced on the *next* call to [`FilterState::read`] since the
    /// current call must still emit the LF it was coalescing.
    pending_sentinel: Option<Sentinel>,
    raw_lookahead: Option<u8>,
    replay_pending: bool,
}

impl Default for FilterState {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterState {
    /// A fresh filter: no bytes read yet, line counter at 1, no BOM seen.
    #[must_use]
    pub fn new() -> Self {
        Self {
            line: 1,
            last_line: 1,
            last: None,
            started: false,
            bom_present: false,
            sentinel: None,
            pending_sentinel: None,
            raw_lookahead: None,
            replay_pending: false,
        }
    }

    /// Resets the filter to its freshly constructed state.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// `true` iff the first three bytes of the stream were exactly the
    /// UTF-8 BOM `EF BB BF`.
    #[must_use]
    pub fn bom_flag(&self) -> bool {
        self.bom_present
    }

    /// The line number of the most recently emitted byte.
    ///
    /// Saturates at `u64::MAX` rather than wrapping. Meaningless (but
    /// harmless) before the first byte is read.
    #[must_use]
    pub fn line(&self) -> u64 {
        self.last_line
    }

    fn pull_raw(&mut self, source: &mut impl ByteSource) -> RawPull {
        if let Some(b) = self.raw_lookahead.take() {
            return RawPull::Byte(b);
        }
        match source.next_byte() {
            SourceByte::Byte(b) => RawPull::Byte(b),
            SourceByte::Eof => RawPull::Eof,
            SourceByte::IoErr => RawPull::IoErr,
        }
    }

    fn latch(&mut self, sentinel: Sentinel) -> FilteredByte {
        self.sentinel = Some(sentinel);
        sentinel.into()
    }

    /// First-byte BOM detection protocol (spec §4.1).
    ///
    /// Returns `Ok(Some(byte))` with the first content byte still to be
    /// newline-normalised, `Ok(None)` if the stream is empty, or `Err` with
    /// a terminal sentinel (I/O error or an invalid/partial BOM).
    fn detect_bom(&mut self, source: &mut impl ByteSource) -> Result<Option<u8>, Sentinel> {
        let first = match self.pull_raw(source) {
            RawPull::Byte(b) => b,
            RawPull::Eof => return Ok(None),
            RawPull::IoErr => return Err(Sentinel::IoErr),
        };
        if first != 0xEF {
            self.raw_lookahead = Some(first);
            return Ok(self.raw_lookahead.take());
        }
        let second = match self.pull_raw(source) {
            RawPull::Byte(b) => b,
            RawPull::Eof => return Err(Sentinel::BadSignature),
            RawPull::IoErr => return Err(Sentinel::IoErr),
        };
        if second != 0xBB {
            return Err(Sentinel::BadSignature);
        }
        let third = match self.pull_raw(source) {
            RawPull::Byte(b) => b,
            RawPull::Eof => return Err(Sentinel::BadSignature),
            RawPull::IoErr => return Err(Sentinel::IoErr),
        };
        if third != 0xBF {
            return Err(Sentinel::BadSignature);
        }
        self.bom_present = true;
        match self.pull_raw(source) {
            RawPull::Byte(b) => Ok(Some(b)),
            RawPull::Eof => Ok(None),
            RawPull::IoErr => Err(Sentinel::IoErr),
        }
    }

    /// Reads one filtered, newline-normalised byte, or a terminal sentinel.
    ///
    /// CR, LF, CRLF, and LFCR are all normalised to a single LF. Once any
    /// sentinel is observed, every later call returns that same sentinel
    /// without touching `source` again.
    pub fn read(&mut self, source: &mut impl ByteSource) -> FilteredByte {
        if let Some(s) = self.sentinel {
            return s.into();
        }
        if self.replay_pending {
            self.replay_pending = false;
            // Safe: replay is only armed after a real byte was delivered.
            return FilteredByte::Byte(self.last.unwrap_or(0));
        }
        if let Some(pending) = self.pending_sentinel.take() {
            return self.latch(pending);
        }

        let raw = if self.started {
            match self.pull_raw(source) {
                RawPull::Byte(b) => b,
                RawPull::Eof => return self.latch(Sentinel::Eof),
                RawPull::IoErr => return self.latch(Sentinel::IoErr),
            }
        } else {
            self.started = true;
            match self.detect_bom(source) {
                Ok(Some(b)) => b,
                Ok(None) => return self.latch(Sentinel::Eof),
                Err(sentinel) => return self.latch(sentinel),
            }
        };

        let emitted = if raw == LF || raw == CR {
            match self.pull_raw(source) {
                RawPull::Byte(peeked) => {
                    let pairs = (raw == LF && peeked == CR) || (raw == CR && peeked == LF);
                    if !pairs {
                        self.raw_lookahead = Some(peeked);
                    }
                    LF
                }
                RawPull::Eof => {
                    self.pending_sentinel = Some(Sentinel::Eof);
                    LF
                }
                RawPull::IoErr => {
                    self.pending_sentinel = Some(Sentinel::IoErr);
                    LF
                }
            }
        } else {
            raw
        };

        self.last_line = self.line;
        if emitted == LF {
            self.line = self.line.saturating_add(1);
        }
        self.last = Some(emitted);
        FilteredByte::Byte(emitted)
    }

    /// Pushes the most recently read byte back for the next [`read`](Self::read) call.
    ///
    /// # Panics
    ///
    /// Panics if no byte has yet been read, if a byte is already pending
    /// replay, or if the filter is in a terminal sentinel state: per
    /// spec.md §5, attempting a second pushback without an intervening
    /// read is a caller programming fault and must be rejected loudly
    /// rather than silently ignored.
    pub fn pushback(&mut self) {
        assert!(
            self.sentinel.is_none(),
            "pushback is illegal once the filter has latched a sentinel"
        );
        assert!(
            self.last.is_some(),
            "pushback before any byte has been read"
        );
        assert!(!self.replay_pending, "pushback already pending");
        self.replay_pending = true;
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]
mod tests {
    use super::*;
    use crate::source::SliceSource;
    use pretty_assertions::assert_eq;

    fn read_all(input: &[u8]) -> (Vec<u8>, FilteredByte, bool) {
        let mut src = SliceSource::new(input);
        let mut filt = FilterState::new();
        let mut out = Vec::new();
        loop {
            match filt.read(&mut src) {
                FilteredByte::Byte(b) => out.push(b),
                other => return (out, other, filt.bom_flag()),
            }
        }
    }

    #[test]
    fn plain_ascii_passes_through() {
        let (bytes, end, bom) = read_all(b"abc");
        assert_eq!(bytes, b"abc");
        assert_eq!(end, FilteredByte::Eof);
        assert!(!bom);
    }

    #[test]
    fn crlf_and_lfcr_normalise_to_lf() {
        let (bytes, _, _) = read_all(b"a\r\nb\n\rc");
        assert_eq!(bytes, b"a\nb\nc");
    }

    #[test]
    fn bare_cr_and_lf_normalise_to_lf() {
        assert_eq!(read_all(b"a\rb").0, b"a\nb");
        assert_eq!(read_all(b"a\nb").0, b"a\nb");
    }

    #[test]
    fn bom_is_stripped_and_flagged() {
        let (bytes, _, bom) = read_all(b"\xEF\xBB\xBFhi");
        assert_eq!(bytes, b"hi");
        assert!(bom);
    }

    #[test]
    fn partial_bom_is_bad_signature() {
        let (_, end, _) = read_all(b"\xEF\xBBx");
        assert_eq!(end, FilteredByte::BadSignature);
    }

    #[test]
    fn bom_prefix_truncated_by_eof_is_bad_signature() {
        let (_, end, _) = read_all(b"\xEF");
        assert_eq!(end, FilteredByte::BadSignature);
    }

    #[test]
    fn non_ef_first_byte_is_not_mistaken_for_bom() {
        let (bytes, _, bom) = read_all(b"xyz");
        assert_eq!(bytes, b"xyz");
        assert!(!bom);
    }

    #[test]
    fn sentinel_latches() {
        let mut src = SliceSource::new(b"a");
        let mut filt = FilterState::new();
        assert_eq!(filt.read(&mut src), FilteredByte::Byte(b'a'));
        assert_eq!(filt.read(&mut src), FilteredByte::Eof);
        assert_eq!(filt.read(&mut src), FilteredByte::Eof);
        assert_eq!(filt.read(&mut src), FilteredByte::Eof);
    }

    #[test]
    fn pushback_replays_same_byte_without_advancing_line() {
        let mut src = SliceSource::new(b"a\nb");
        let mut filt = FilterState::new();
        assert_eq!(filt.read(&mut src), FilteredByte::Byte(b'a'));
        assert_eq!(filt.read(&mut src), FilteredByte::Byte(b'\n'));
        let line_at_lf = filt.line();
        filt.pushback();
        assert_eq!(filt.read(&mut src), FilteredByte::Byte(b'\n'));
        assert_eq!(filt.line(), line_at_lf);
        assert_eq!(filt.read(&mut src), FilteredByte::Byte(b'b'));
        assert_eq!(filt.line(), line_at_lf + 1);
    }

    #[test]
    #[should_panic(expected = "pushback already pending")]
    fn double_pushback_panics() {
        let mut src = SliceSource::new(b"ab");
        let mut filt = FilterState::new();
        filt.read(&mut src);
        filt.pushback();
        filt.pushback();
    }

    #[test]
    #[should_panic(expected = "before any byte has been read")]
    fn pushback_before_any_read_panics() {
        let mut filt = FilterState::new();
        filt.pushback();
    }

    #[test]
    fn line_counts_lfs_strictly_before_each_byte() {
        let mut src = SliceSource::new(b"a\nb\nc");
        let mut filt = FilterState::new();
        assert_eq!(filt.read(&mut src), FilteredByte::Byte(b'a'));
        assert_eq!(filt.line(), 1);
        assert_eq!(filt.read(&mut src), FilteredByte::Byte(b'\n'));
        assert_eq!(filt.line(), 1);
        assert_eq!(filt.read(&mut src), FilteredByte::Byte(b'b'));
        assert_eq!(filt.line(), 2);
        assert_eq!(filt.read(&mut src), FilteredByte::Byte(b'\n'));
        assert_eq!(filt.line(), 2);
        assert_eq!(filt.read(&mut src), FilteredByte::Byte(b'c'));
        assert_eq!(filt.line(), 3);
    }

    #[test]
    fn cr_at_eof_emits_lf_then_eof() {
        let (bytes, end, _) = read_all(b"a\r");
        assert_eq!(bytes, b"a\n");
        assert_eq!(end, FilteredByte::Eof);
    }

    #[test]
    fn io_err_latches() {
        let mut calls = [SourceByte::Byte(b'a'), SourceByte::IoErr].into_iter();
        let mut src = move || calls.next().unwrap_or(SourceByte::IoErr);
        let mut filt = FilterState::new();
        assert_eq!(filt.read(&mut src), FilteredByte::Byte(b'a'));
        assert_eq!(filt.read(&mut src), FilteredByte::IoErr);
        assert_eq!(filt.read(&mut src), FilteredByte::IoErr);
    }
}
