//! C4: the literal-string payload reader (spec §4.4).
//!
//! Reads the raw payload bytes immediately following the delimiter that a
//! [`crate::recognizer::read_token`] call already classified as opening a
//! string. Entity decoding (turning escapes into final bytes) is a
//! separate pass in [`crate::decode`]; this module only produces the raw
//! bytes between the delimiters, per spec.md §4.4's "Both readers emit the
//! raw payload bytes; entity decoding is a separate pass."

use crate::buffer::Buffer;
use crate::error::ErrorCode;
use crate::filter::{FilterState, FilteredByte};
use crate::source::ByteSource;

const BACKSLASH: u8 = b'\\';

/// Reads a quoted or apostrophe-quoted payload up to (but not including)
/// the closing `terminator` byte (`"` or `'`), honouring backslash
/// escaping exactly as spec.md §4.4 describes it: the escape flag is set
/// whenever the *current* byte is a backslash, not toggled, so a run of
/// backslashes only protects the delimiter that immediately follows an
/// odd position in that run. This is spec.md's literal behaviour, not an
/// approximation of a smarter escaping scheme.
pub fn read_quoted_payload<S: ByteSource>(
    filter: &mut FilterState,
    source: &mut S,
    buf: &mut Buffer,
    terminator: u8,
) -> Result<(), ErrorCode> {
    let mut escaped = false;
    loop {
        let byte = match filter.read(source) {
            FilteredByte::Byte(b) => b,
            FilteredByte::Eof => return Err(ErrorCode::OpenString),
            FilteredByte::IoErr => return Err(ErrorCode::Io),
            FilteredByte::BadSignature => return Err(ErrorCode::BadSignature),
        };
        if byte == terminator && !escaped {
            return Ok(());
        }
        if byte == 0 {
            return Err(ErrorCode::NullChar);
        }
        escaped = byte == BACKSLASH;
        buf.push(byte).map_err(|_| ErrorCode::LongString)?;
    }
}

/// Reads a curly-bracketed payload with balanced nesting, up to (but not
/// including) the `}` that brings the nesting counter back to zero.
/// Escaping works the same as [`read_quoted_payload`]; inner `{`/`}` pairs
/// are appended to the payload like any other byte.
pub fn read_curly_payload<S: ByteSource>(
    filter: &mut FilterState,
    source: &mut S,
    buf: &mut Buffer,
) -> Result<(), ErrorCode> {
    let mut depth: u64 = 1;
    let mut escaped = false;
    loop {
        let byte = match filter.read(source) {
            FilteredByte::Byte(b) => b,
            FilteredByte::Eof => return Err(ErrorCode::OpenString),
            FilteredByte::IoErr => return Err(ErrorCode::Io),
            FilteredByte::BadSignature => return Err(ErrorCode::BadSignature),
        };

        let mut closed = false;
        if byte == b'{' && !escaped {
            depth = depth.checked_add(1).ok_or(ErrorCode::DeepCurly)?;
        } else if byte == b'}' && !escaped {
            depth -= 1;
            closed = depth == 0;
        }

        if closed {
            return Ok(());
        }
        if byte == 0 {
            return Err(ErrorCode::NullChar);
        }
        escaped = byte == BACKSLASH;
        buf.push(byte).map_err(|_| ErrorCode::LongString)?;
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

    fn run_quoted(payload_and_rest: &[u8], terminator: u8, cap: usize) -> Result<Vec<u8>, ErrorCode> {
        let mut src = SliceSource::new(payload_and_rest);
        let mut filter = FilterState::new();
        let mut buf = Buffer::new(8, cap);
        read_quoted_payload(&mut filter, &mut src, &mut buf, terminator)?;
        Ok(buf.as_bytes().to_vec())
    }

    fn run_curly(payload_and_rest: &[u8], cap: usize) -> Result<Vec<u8>, ErrorCode> {
        let mut src = SliceSource::new(payload_and_rest);
        let mut filter = FilterState::new();
        let mut buf = Buffer::new(8, cap);
        read_curly_payload(&mut filter, &mut src, &mut buf)?;
        Ok(buf.as_bytes().to_vec())
    }

    #[test]
    fn quoted_stops_at_unescaped_quote() {
        assert_eq!(run_quoted(br#"abc" rest"#, b'"', 64).unwrap(), b"abc");
    }

    #[test]
    fn quoted_preserves_escape_bytes_raw() {
        // scenario 7: "a\"b" decodes (raw payload) to a\"b.
        assert_eq!(run_quoted(br#"a\"b""#, b'"', 64).unwrap(), b"a\\\"b");
    }

    #[test]
    fn quoted_eof_is_open_string() {
        assert_eq!(run_quoted(b"oops", b'"', 64), Err(ErrorCode::OpenString));
    }

    #[test]
    fn quoted_rejects_embedded_nul() {
        assert_eq!(run_quoted(b"a\0b\"", b'"', 64), Err(ErrorCode::NullChar));
    }

    #[test]
    fn quoted_overflow_is_long_string() {
        assert_eq!(run_quoted(b"abcdef\"", b'"', 4), Err(ErrorCode::LongString));
    }

    #[test]
    fn apostrophe_terminator_works() {
        assert_eq!(run_quoted(b"abc' rest", b'\'', 64).unwrap(), b"abc");
    }

    #[test]
    fn curly_balances_nested_braces() {
        // scenario 5: x{foo {bar} baz}y -> body "foo {bar} baz"
        assert_eq!(
            run_curly(b"foo {bar} baz}y", 64).unwrap(),
            b"foo {bar} baz"
        );
    }

    #[test]
    fn curly_eof_is_open_string() {
        assert_eq!(run_curly(b"oops", 64), Err(ErrorCode::OpenString));
    }

    #[test]
    fn curly_escaped_brace_does_not_change_depth() {
        assert_eq!(run_curly(br"a\{b}", 64).unwrap(), b"a\\{b");
    }

    #[test]
    fn curly_deep_nesting_round_trips_for_reasonable_depth() {
        let mut payload = Vec::new();
        for _ in 0..50 {
            payload.push(b'{');
        }
        payload.push(b'x');
        for _ in 0..50 {
            payload.push(b'}');
        }
        payload.push(b'}');
        let got = run_curly(&payload, 4096).unwrap();
        assert_eq!(got.len(), 101); // 50 '{' + 'x' + 50 '}'
    }
}
