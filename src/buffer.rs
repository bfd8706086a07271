//! Bounded growable byte buffer with null-terminator discipline (spec §3).
//!
//! Modelled on `ori_lexer_core::source_buffer`'s growth/size discipline and
//! on `AaronFriel-jsonmodem`'s small accumulator idiom (`Result`-returning
//! `push`, a scratch container owned by the caller rather than the source).
//! Unlike the teacher's sentinel-padded slurp buffer, this one grows one
//! byte at a time from a live reader and must reject overflow instead of
//! relying on a fixed upper bound computed up front.

use std::ffi::CString;

/// Error returned by [`Buffer::push`] when appending would exceed the
/// buffer's configured maximum capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Overflow;

/// A bounded, amortised-doubling growable byte buffer.
///
/// `data.len()` is always `< maxcap`: one byte of headroom is reserved so
/// [`Buffer::as_cstr`] can always append a trailing NUL without a second
/// overflow check. Interior NUL bytes are tracked separately (`has_nul`)
/// so [`Buffer::as_cstr`] can refuse to lie about C-string safety instead
/// of silently truncating at the first embedded zero.
#[derive(Debug, Clone)]
pub struct Buffer {
    data: Vec<u8>,
    initcap: usize,
    maxcap: usize,
    has_nul: bool,
}

impl Buffer {
    /// The initial capacity used when no explicit initial capacity is
    /// wanted by the caller; doubling starts from here.
    pub const DEFAULT_INITCAP: usize = 8;

    /// Creates an empty buffer that will not grow past `maxcap` bytes of
    /// content (the cap excludes the reserved terminator byte).
    ///
    /// `initcap` is clamped to be at least 1 and at most `maxcap`.
    #[must_use]
    pub fn new(initcap: usize, maxcap: usize) -> Self {
        let initcap = initcap.max(1).min(maxcap.max(1));
        Self {
            data: Vec::with_capacity(initcap),
            initcap,
            maxcap,
            has_nul: false,
        }
    }

    /// Clears the buffer back to empty, keeping its configured capacities.
    pub fn clear(&mut self) {
        self.data.clear();
        self.has_nul = false;
    }

    /// Current content length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// `true` iff the buffer holds no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The configured maximum content length.
    #[must_use]
    pub fn maxcap(&self) -> usize {
        self.maxcap
    }

    /// The buffer's content as a byte slice.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// `true` iff a literal NUL byte was ever appended to the current
    /// content (cleared by [`Buffer::clear`]).
    #[must_use]
    pub fn has_embedded_nul(&self) -> bool {
        self.has_nul
    }

    /// Appends one byte, growing the backing storage by amortised doubling.
    ///
    /// Fails with [`Overflow`] if the content would reach `maxcap` bytes
    /// (one byte short of `maxcap` is always kept free for the terminator
    /// view in [`Buffer::as_cstr`]).
    pub fn push(&mut self, byte: u8) -> Result<(), Overflow> {
        if self.data.len() + 1 >= self.maxcap {
            return Err(Overflow);
        }
        if self.data.len() == self.data.capacity() {
            let grown = (self.data.capacity() * 2)
                .max(self.initcap)
                .min(self.maxcap);
            self.data.reserve(grown - self.data.len());
        }
        if byte == 0 {
            self.has_nul = true;
        }
        self.data.push(byte);
        Ok(())
    }

    /// Appends every byte of `bytes`, stopping at the first [`Overflow`].
    pub fn push_slice(&mut self, bytes: &[u8]) -> Result<(), Overflow> {
        for &b in bytes {
            self.push(b)?;
        }
        Ok(())
    }

    /// Returns a NUL-terminated view of the buffer's content, or `None` if
    /// the content itself contains an embedded NUL (naive terminator
    /// scanning would silently truncate such data, so this refuses rather
    /// than lying about it).
    #[must_use]
    pub fn as_cstr(&self) -> Option<CString> {
        if self.has_nul {
            return None;
        }
        // `data` has no interior NUL by the check above, so this cannot fail.
        CString::new(self.data.clone()).ok()
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
    use pretty_assertions::assert_eq;

    #[test]
    fn push_accumulates_bytes() {
        let mut buf = Buffer::new(Buffer::DEFAULT_INITCAP, 64);
        buf.push_slice(b"hello").unwrap();
        assert_eq!(buf.as_bytes(), b"hello");
        assert_eq!(buf.len(), 5);
    }

    #[test]
    fn push_rejects_overflow_leaving_room_for_terminator() {
        let mut buf = Buffer::new(1, 4);
        buf.push_slice(b"abc").unwrap();
        assert_eq!(buf.push(b'd'), Err(Overflow));
        assert_eq!(buf.as_bytes(), b"abc");
    }

    #[test]
    fn clear_resets_content_and_nul_flag() {
        let mut buf = Buffer::new(4, 16);
        buf.push(0).unwrap();
        assert!(buf.has_embedded_nul());
        buf.clear();
        assert!(buf.is_empty());
        assert!(!buf.has_embedded_nul());
    }

    #[test]
    fn as_cstr_rejects_embedded_nul() {
        let mut buf = Buffer::new(4, 16);
        buf.push_slice(b"a\0b").unwrap();
        assert_eq!(buf.as_cstr(), None);
    }

    #[test]
    fn as_cstr_succeeds_without_embedded_nul() {
        let mut buf = Buffer::new(4, 16);
        buf.push_slice(b"abc").unwrap();
        assert_eq!(buf.as_cstr().unwrap().as_bytes(), b"abc");
    }
}
