//! C3: the token recognizer (spec §4.3).
//!
//! Grounded on `ori_lexer_core::raw_scanner::next_token`'s overall dispatch
//! shape (skip trivia, read one token, classify); the substance is
//! spec.md §4.3. Per the Design Notes' explicit bug callout, `|;` detection
//! uses an explicit boolean/match on the *next filtered byte* rather than
//! indexing into a one-byte token buffer — there is no out-of-bounds probe
//! to reproduce here.

use crate::buffer::Buffer;
use crate::classify;
use crate::error::ErrorCode;
use crate::filter::{FilterState, FilteredByte};
use crate::source::ByteSource;
use crate::token::{StringKind, TokenKind};

/// Reads one token into `buf` (cleared first), returning its classification
/// and the line number of its first byte.
///
/// On success, `buf` holds:
/// - the full token text, for [`TokenKind::Simple`] and [`TokenKind::Final`];
/// - the prefix bytes before the opening delimiter (often empty), for
///   [`TokenKind::StringPrefix`] and [`TokenKind::EmbedPrefix`] — the
///   delimiter itself is stripped.
pub fn read_token<S: ByteSource>(
    filter: &mut FilterState,
    source: &mut S,
    buf: &mut Buffer,
) -> Result<(TokenKind, u64), ErrorCode> {
    buf.clear();
    skip_trivia(filter, source)?;

    let token_line = filter.line();
    let first = read_content_byte(filter, source)?;
    if !classify::is_legal(first) {
        return Err(ErrorCode::BadChar);
    }
    buf.push(first).map_err(|_| ErrorCode::LongToken)?;

    if first == b'|' {
        if let Some(kind) = try_final(filter, source, buf)? {
            return Ok((kind, token_line));
        }
    }

    if !classify::is_atomic(first) {
        read_body(filter, source, buf)?;
    }

    Ok((post_classify(buf), token_line))
}

/// Skips whitespace and `#`-comments until the next content byte, which is
/// pushed back for the caller to re-read.
fn skip_trivia<S: ByteSource>(filter: &mut FilterState, source: &mut S) -> Result<(), ErrorCode> {
    loop {
        match filter.read(source) {
            FilteredByte::Byte(b) if classify::is_whitespace(b) => {}
            FilteredByte::Byte(b'#') => skip_comment(filter, source)?,
            FilteredByte::Byte(_) => {
                filter.pushback();
                return Ok(());
            }
            FilteredByte::Eof => return Err(ErrorCode::Eof),
            FilteredByte::IoErr => return Err(ErrorCode::Io),
            FilteredByte::BadSignature => return Err(ErrorCode::BadSignature),
        }
    }
}

/// Consumes a `#` comment body through (and including) the next LF, or
/// until EOF/error.
fn skip_comment<S: ByteSource>(filter: &mut FilterState, source: &mut S) -> Result<(), ErrorCode> {
    loop {
        match filter.read(source) {
            FilteredByte::Byte(b'\n') => return Ok(()),
            FilteredByte::Byte(_) => {}
            FilteredByte::Eof => return Err(ErrorCode::Eof),
            FilteredByte::IoErr => return Err(ErrorCode::Io),
            FilteredByte::BadSignature => return Err(ErrorCode::BadSignature),
        }
    }
}

/// Reads the byte that skip_trivia just pushed back.
fn read_content_byte<S: ByteSource>(
    filter: &mut FilterState,
    source: &mut S,
) -> Result<u8, ErrorCode> {
    match filter.read(source) {
        FilteredByte::Byte(b) => Ok(b),
        FilteredByte::Eof => Err(ErrorCode::Eof),
        FilteredByte::IoErr => Err(ErrorCode::Io),
        FilteredByte::BadSignature => Err(ErrorCode::BadSignature),
    }
}

/// After a leading `|`, checks whether the next byte is `;` (completing the
/// `|;` final token). On a match, validates that only whitespace/comments
/// follow before EOF and returns `Ok(Some(TokenKind::Final))`. On a
/// mismatch, pushes the lookahead byte back (when one was actually
/// consumed) and returns `Ok(None)` so the caller continues as an ordinary
/// token body.
fn try_final<S: ByteSource>(
    filter: &mut FilterState,
    source: &mut S,
    buf: &mut Buffer,
) -> Result<Option<TokenKind>, ErrorCode> {
    match filter.read(source) {
        FilteredByte::Byte(b';') => {
            buf.push(b';').map_err(|_| ErrorCode::LongToken)?;
            require_only_trivia_to_eof(filter, source)?;
            Ok(Some(TokenKind::Final))
        }
        FilteredByte::Byte(_) => {
            filter.pushback();
            Ok(None)
        }
        FilteredByte::Eof => Ok(None),
        FilteredByte::IoErr => Err(ErrorCode::Io),
        FilteredByte::BadSignature => Err(ErrorCode::BadSignature),
    }
}

/// After `|;`, requires that only whitespace/comments remain before EOF.
fn require_only_trivia_to_eof<S: ByteSource>(
    filter: &mut FilterState,
    source: &mut S,
) -> Result<(), ErrorCode> {
    loop {
        match filter.read(source) {
            FilteredByte::Byte(b) if classify::is_whitespace(b) => {}
            FilteredByte::Byte(b'#') => skip_comment(filter, source)?,
            FilteredByte::Byte(_) => return Err(ErrorCode::Trailer),
            FilteredByte::Eof => return Ok(()),
            FilteredByte::IoErr => return Err(ErrorCode::Io),
            FilteredByte::BadSignature => return Err(ErrorCode::BadSignature),
        }
    }
}

/// Reads the remaining bytes of a non-atomic token's body.
fn read_body<S: ByteSource>(
    filter: &mut FilterState,
    source: &mut S,
    buf: &mut Buffer,
) -> Result<(), ErrorCode> {
    loop {
        match filter.read(source) {
            FilteredByte::Byte(b) => {
                if !classify::is_legal(b) {
                    return Err(ErrorCode::BadChar);
                }
                if classify::is_inclusive_terminator(b) {
                    buf.push(b).map_err(|_| ErrorCode::LongToken)?;
                    return Ok(());
                }
                if classify::is_exclusive_terminator(b) {
                    filter.pushback();
                    return Ok(());
                }
                buf.push(b).map_err(|_| ErrorCode::LongToken)?;
            }
            FilteredByte::Eof => return Ok(()),
            FilteredByte::IoErr => return Err(ErrorCode::Io),
            FilteredByte::BadSignature => return Err(ErrorCode::BadSignature),
        }
    }
}

/// Inspects the buffer's last byte to classify the token, stripping the
/// delimiter byte for string/embed variants.
fn post_classify(buf: &mut Buffer) -> TokenKind {
    match buf.as_bytes().last().copied() {
        Some(b'"') => {
            strip_last(buf);
            TokenKind::StringPrefix(StringKind::Quoted)
        }
        Some(b'{') => {
            strip_last(buf);
            TokenKind::StringPrefix(StringKind::Curly)
        }
        Some(b'`') => {
            strip_last(buf);
            TokenKind::EmbedPrefix
        }
        _ => TokenKind::Simple,
    }
}

fn strip_last(buf: &mut Buffer) {
    let kept = buf.as_bytes().len().saturating_sub(1);
    let bytes = buf.as_bytes()[..kept].to_vec();
    buf.clear();
    // `bytes` is already within cap (it is a prefix of what fit before),
    // so this cannot overflow.
    let _ = buf.push_slice(&bytes);
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

    fn tokenize_all(input: &[u8]) -> Vec<Result<(TokenKind, Vec<u8>), ErrorCode>> {
        let mut src = SliceSource::new(input);
        let mut filter = FilterState::new();
        let mut buf = Buffer::new(Buffer::DEFAULT_INITCAP, 1024);
        let mut out = Vec::new();
        loop {
            match read_token(&mut filter, &mut src, &mut buf) {
                Ok((kind, _line)) => {
                    let bytes = buf.as_bytes().to_vec();
                    let done = kind == TokenKind::Final;
                    out.push(Ok((kind, bytes)));
                    if done {
                        return out;
                    }
                }
                Err(e) => {
                    out.push(Err(e));
                    return out;
                }
            }
        }
    }

    #[test]
    fn scenario_simple_tokens_then_final() {
        let got = tokenize_all(b"hello |;");
        assert_eq!(
            got,
            vec![
                Ok((TokenKind::Simple, b"hello".to_vec())),
                Ok((TokenKind::Final, b"|;".to_vec())),
            ]
        );
    }

    #[test]
    fn scenario_bom_then_simple_tokens() {
        let got = tokenize_all(b"\xEF\xBB\xBFfoo bar |;");
        assert_eq!(
            got,
            vec![
                Ok((TokenKind::Simple, b"foo".to_vec())),
                Ok((TokenKind::Simple, b"bar".to_vec())),
                Ok((TokenKind::Final, b"|;".to_vec())),
            ]
        );
    }

    #[test]
    fn scenario_comment_is_skipped() {
        let got = tokenize_all(b"a#comment\nb |;");
        assert_eq!(
            got,
            vec![
                Ok((TokenKind::Simple, b"a".to_vec())),
                Ok((TokenKind::Simple, b"b".to_vec())),
                Ok((TokenKind::Final, b"|;".to_vec())),
            ]
        );
    }

    #[test]
    fn scenario_quoted_string_prefix() {
        let got = tokenize_all(br#"("abc") |;"#);
        assert_eq!(
            got,
            vec![
                Ok((TokenKind::Simple, b"(".to_vec())),
                Ok((TokenKind::StringPrefix(StringKind::Quoted), b"".to_vec())),
                Ok((TokenKind::Simple, b")".to_vec())),
                Ok((TokenKind::Final, b"|;".to_vec())),
            ]
        );
    }

    #[test]
    fn scenario_curly_string_prefix() {
        let got = tokenize_all(b"x{foo bar}y |;");
        assert_eq!(
            got,
            vec![
                Ok((TokenKind::Simple, b"x".to_vec())),
                Ok((TokenKind::StringPrefix(StringKind::Curly), b"".to_vec())),
                Ok((TokenKind::Simple, b"y".to_vec())),
                Ok((TokenKind::Final, b"|;".to_vec())),
            ]
        );
    }

    #[test]
    fn lone_apostrophe_is_simple_not_string_prefix() {
        let got = tokenize_all(b"' |;");
        assert_eq!(
            got,
            vec![
                Ok((TokenKind::Simple, b"'".to_vec())),
                Ok((TokenKind::Final, b"|;".to_vec())),
            ]
        );
    }

    #[test]
    fn embed_prefix_detected() {
        let got = tokenize_all(b"name` |;");
        assert_eq!(got[0], Ok((TokenKind::EmbedPrefix, b"name".to_vec())));
    }

    #[test]
    fn trailer_after_final_is_error() {
        let got = tokenize_all(b"a |; b");
        assert_eq!(
            got,
            vec![
                Ok((TokenKind::Simple, b"a".to_vec())),
                Err(ErrorCode::Trailer),
            ]
        );
    }

    #[test]
    fn whitespace_and_comment_after_final_are_fine() {
        let got = tokenize_all(b"a |;  # trailing comment\n");
        assert_eq!(
            got,
            vec![
                Ok((TokenKind::Simple, b"a".to_vec())),
                Ok((TokenKind::Final, b"|;".to_vec())),
            ]
        );
    }

    #[test]
    fn bad_char_outside_literal() {
        let got = tokenize_all(b"\x01 |;");
        assert_eq!(got, vec![Err(ErrorCode::BadChar)]);
    }

    #[test]
    fn long_token_overflows() {
        let mut src = SliceSource::new(b"aaaaaaaaaa |;");
        let mut filter = FilterState::new();
        let mut buf = Buffer::new(2, 4);
        assert_eq!(
            read_token(&mut filter, &mut src, &mut buf),
            Err(ErrorCode::LongToken)
        );
    }

    #[test]
    fn unterminated_stream_is_eof() {
        let got = tokenize_all(b"a b");
        assert_eq!(
            got,
            vec![
                Ok((TokenKind::Simple, b"a".to_vec())),
                Ok((TokenKind::Simple, b"b".to_vec())),
                Err(ErrorCode::Eof),
            ]
        );
    }
}
