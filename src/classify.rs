//! Byte classification helpers used by C3 and C4 (spec §4.2).
//!
//! Grounded on `ori_lexer_core::raw_scanner`'s per-byte dispatch tables and
//! doc-comment style; the predicates here are plain `match`es rather than
//! lookup tables since the classes are small and the hot path already goes
//! through [`crate::filter::FilterState`] one byte at a time.

/// `true` for bytes legal outside string/embed literals and comments:
/// visible printing ASCII (`0x21`-`0x7E`) plus space, tab, and line feed.
#[inline]
#[must_use]
pub fn is_legal(byte: u8) -> bool {
    matches!(byte, 0x21..=0x7E | b' ' | b'\t' | b'\n')
}

/// `true` for the atomic bytes that are always a complete one-byte token:
/// `( ) [ ] , % ; " ' { } ``.
#[inline]
#[must_use]
pub fn is_atomic(byte: u8) -> bool {
    matches!(
        byte,
        b'(' | b')' | b'[' | b']' | b',' | b'%' | b';' | b'"' | b'\'' | b'{' | b'}' | b'`'
    )
}

/// `true` for inclusive terminators: bytes that end a multi-byte token and
/// are kept as its last byte (`" ' { ``).
#[inline]
#[must_use]
pub fn is_inclusive_terminator(byte: u8) -> bool {
    matches!(byte, b'"' | b'\'' | b'{' | b'`')
}

/// `true` for exclusive terminators: bytes that end a multi-byte token and
/// are pushed back rather than kept (whitespace, `( ) [ ] , % ; # } &`).
#[inline]
#[must_use]
pub fn is_exclusive_terminator(byte: u8) -> bool {
    matches!(
        byte,
        b'\t' | b' '
            | b'\n'
            | b'('
            | b')'
            | b'['
            | b']'
            | b','
            | b'%'
            | b';'
            | b'#'
            | b'}'
            | b'&'
    )
}

/// `true` for horizontal/vertical whitespace skipped between tokens
/// (tab, space, line feed).
#[inline]
#[must_use]
pub fn is_whitespace(byte: u8) -> bool {
    matches!(byte, b'\t' | b' ' | b'\n')
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
    fn terminator_classes_are_disjoint() {
        for byte in 0u8..=255 {
            let inclusive = is_inclusive_terminator(byte);
            let exclusive = is_exclusive_terminator(byte);
            assert!(!(inclusive && exclusive), "byte {byte:#04x} is both");
        }
    }

    #[test]
    fn atomic_bytes_are_legal() {
        for byte in 0u8..=255 {
            if is_atomic(byte) {
                assert!(is_legal(byte), "atomic byte {byte:#04x} should be legal");
            }
        }
    }

    #[test]
    fn hash_is_exclusive_terminator_not_atomic() {
        assert!(is_exclusive_terminator(b'#'));
        assert!(!is_atomic(b'#'));
    }

    #[test]
    fn sample_classes() {
        assert_eq!(is_legal(0x20), true);
        assert_eq!(is_legal(0x00), false);
        assert_eq!(is_legal(0x7F), false);
        assert!(is_atomic(b'('));
        assert!(is_inclusive_terminator(b'"'));
        assert!(is_exclusive_terminator(b' '));
    }
}
