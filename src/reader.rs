//! The public `Reader` operations (spec §6).
//!
//! Grounded on `ori_lexer_core::raw_scanner::tokenize` as the "top-level
//! entry point gluing the pieces together" idiom, and on
//! `ori_diagnostic::ErrorCode`'s status-query pattern: every operation
//! returns an idiomatic `Result<T, ErrorCode>` for `?`-propagation, while
//! also latching the code and the frozen line number into the reader so
//! later [`Reader::status`] queries see the same state spec.md §7
//! describes ("every subsequent operation returns the same error until
//! the reader is destroyed").

use crate::buffer::Buffer;
use crate::decode::{self, InputOverride};
use crate::encode::{self, Encoder, OutputOverride};
use crate::error::ErrorCode;
use crate::filter::FilterState;
use crate::literal;
use crate::recognizer;
use crate::source::ByteSource;
use crate::token::{StringKind, TokenKind};
use crate::trie::{DecodingMap, NumericEscapeTable};
use std::fmt;

/// Default maximum token length: 1023 content bytes (spec §6 "Limits").
pub const DEFAULT_TOKEN_MAXCAP: usize = 1024;
/// Default maximum string-body buffer: 32766 content bytes (spec §6
/// "Limits").
pub const DEFAULT_STRING_MAXCAP: usize = 32_767;

/// Caller-configurable buffer caps (spec §6 "Limits").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Maximum token content length, in bytes.
    pub token_maxcap: usize,
    /// Maximum decoded string-body length, in bytes.
    pub string_maxcap: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            token_maxcap: DEFAULT_TOKEN_MAXCAP,
            string_maxcap: DEFAULT_STRING_MAXCAP,
        }
    }
}

/// `(error code, line)` as returned by [`Reader::status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Status {
    /// `None` while the reader is healthy; `Some(code)` once it has
    /// latched its first error.
    pub error: Option<ErrorCode>,
    /// The line of the last completed token (if healthy) or the line at
    /// which the error was observed (if not).
    pub line: u64,
}

/// Returned by [`Reader::bytes`] when `null_term` was requested but the
/// buffered content contains an embedded NUL byte, making a naive
/// C-string view unsafe (it would silently truncate the data).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotCStringSafe;

impl fmt::Display for NotCStringSafe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("buffered content contains an embedded NUL byte; not safe as a C string")
    }
}

impl std::error::Error for NotCStringSafe {}

/// Caller-supplied configuration for one [`Reader::string`] call (spec §3
/// "String parameters"). Every knob the reader needs comes from here
/// rather than ambient state, mirroring how `ori_lexer_core::RawScanner`
/// takes its configuration through constructor/method arguments.
pub struct StringParams<'a, M, N, E>
where
    M: DecodingMap,
    N: NumericEscapeTable,
    E: Encoder,
{
    /// Which string syntax is being read (selects the closing delimiter).
    pub kind: StringKind,
    /// The prefix-trie (or other) decoding map driving entity extraction.
    pub decoder: &'a M,
    /// The numeric-escape descriptor table for entities the decoder opens
    /// a numeric escape with.
    pub numeric: &'a N,
    /// The entity-to-bytes encoder table.
    pub encoder: &'a mut E,
    /// Which fixed UTF scheme, if any, overrides the encoder table for
    /// Unicode-range entities.
    pub output_override: OutputOverride,
    /// Within an output override, whether surrogate-range entities route
    /// to the encoder table instead of the UTF path.
    pub strict: bool,
    /// Whether payload bytes are pre-decoded from a UTF scheme into
    /// codepoints (bypassing the decoding map) before encoding.
    pub input_override: InputOverride,
}

/// Which of the reader's two buffers currently holds the content exposed
/// by [`Reader::bytes`]/[`Reader::count`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Current {
    Token,
    Body,
}

/// A Shastina lexical reader: owns its filter state and buffers, and
/// latches the first error it observes (spec §5, §7).
#[derive(Debug)]
pub struct Reader {
    filter: FilterState,
    token_buf: Buffer,
    body_buf: Buffer,
    limits: Limits,
    current: Current,
    error: Option<ErrorCode>,
    error_line: u64,
    last_token_line: u64,
}

impl Default for Reader {
    fn default() -> Self {
        Self::new()
    }
}

impl Reader {
    /// A fresh reader with [`Limits::default`], empty buffers, line 1
    /// (spec §6 `alloc()`). `free(r)` has no Rust counterpart beyond
    /// ordinary `Drop`.
    #[must_use]
    pub fn new() -> Self {
        Self::with_limits(Limits::default())
    }

    /// A fresh reader with caller-supplied buffer caps.
    #[must_use]
    pub fn with_limits(limits: Limits) -> Self {
        Self {
            filter: FilterState::new(),
            token_buf: Buffer::new(Buffer::DEFAULT_INITCAP, limits.token_maxcap),
            body_buf: Buffer::new(Buffer::DEFAULT_INITCAP, limits.string_maxcap),
            limits,
            current: Current::Token,
            error: None,
            error_line: 1,
            last_token_line: 1,
        }
    }

    /// The reader's current `(error, line)` pair (spec §6 `status(r)`).
    #[must_use]
    pub fn status(&self) -> Status {
        Status {
            error: self.error,
            line: if self.error.is_some() {
                self.error_line
            } else {
                self.last_token_line
            },
        }
    }

    /// Byte count of the last token/body (spec §6 `count(r)`); zero once
    /// the reader has latched an error.
    #[must_use]
    pub fn count(&self) -> usize {
        if self.error.is_some() {
            0
        } else {
            self.current_buf().len()
        }
    }

    /// Line of the last completed token, or the saturation value if the
    /// underlying counter has saturated (spec §6 `line(r)`).
    #[must_use]
    pub fn line(&self) -> u64 {
        self.status().line
    }

    /// `true` iff the first three bytes of the stream were the UTF-8 BOM.
    #[must_use]
    pub fn bom_flag(&self) -> bool {
        self.filter.bom_flag()
    }

    /// A view of the current buffer's bytes (spec §6 `bytes(r, null_term)`).
    ///
    /// # Errors
    ///
    /// Returns [`NotCStringSafe`] if `null_term` is set and the buffer
    /// contains an embedded NUL byte.
    pub fn bytes(&self, null_term: bool) -> Result<&[u8], NotCStringSafe> {
        let buf = self.current_buf();
        if null_term && buf.has_embedded_nul() {
            return Err(NotCStringSafe);
        }
        Ok(buf.as_bytes())
    }

    fn current_buf(&self) -> &Buffer {
        match self.current {
            Current::Token => &self.token_buf,
            Current::Body => &self.body_buf,
        }
    }

    fn freeze(&mut self, code: ErrorCode) -> ErrorCode {
        self.error = Some(code);
        self.error_line = self.filter.line();
        self.token_buf.clear();
        self.body_buf.clear();
        code
    }

    /// Reads one token (spec §6 `token(r, source)`).
    ///
    /// On success, [`Reader::bytes`] exposes the token's text (for
    /// [`TokenKind::Simple`]/[`TokenKind::Final`]) or prefix (for
    /// [`TokenKind::StringPrefix`]/[`TokenKind::EmbedPrefix`]).
    ///
    /// # Errors
    ///
    /// Returns the reader's already-latched error if one was previously
    /// observed, or a fresh [`ErrorCode`] per spec.md §7's taxonomy.
    pub fn token<S: ByteSource>(&mut self, source: &mut S) -> Result<TokenKind, ErrorCode> {
        if let Some(code) = self.error {
            return Err(code);
        }
        match recognizer::read_token(&mut self.filter, source, &mut self.token_buf) {
            Ok((kind, token_line)) => {
                self.current = Current::Token;
                self.last_token_line = token_line;
                Ok(kind)
            }
            Err(code) => Err(self.freeze(code)),
        }
    }

    /// Reads a string/embed payload following a prefix token already
    /// produced by [`Reader::token`], decoding entities and encoding the
    /// result (spec §6 `string(r, source, params)`, §4.4, §4.5).
    ///
    /// On success, [`Reader::bytes`] exposes the decoded+encoded body.
    ///
    /// # Errors
    ///
    /// Returns the reader's already-latched error if one was previously
    /// observed, or a fresh [`ErrorCode`] per spec.md §7's taxonomy.
    pub fn string<S, M, N, E>(
        &mut self,
        source: &mut S,
        params: &mut StringParams<'_, M, N, E>,
    ) -> Result<(), ErrorCode>
    where
        S: ByteSource,
        M: DecodingMap,
        N: NumericEscapeTable,
        E: Encoder,
    {
        if let Some(code) = self.error {
            return Err(code);
        }
        match self.read_string_inner(source, params) {
            Ok(()) => {
                self.current = Current::Body;
                Ok(())
            }
            Err(code) => Err(self.freeze(code)),
        }
    }

    fn read_string_inner<S, M, N, E>(
        &mut self,
        source: &mut S,
        params: &mut StringParams<'_, M, N, E>,
    ) -> Result<(), ErrorCode>
    where
        S: ByteSource,
        M: DecodingMap,
        N: NumericEscapeTable,
        E: Encoder,
    {
        let mut payload = Buffer::new(Buffer::DEFAULT_INITCAP, self.limits.string_maxcap);
        match params.kind {
            StringKind::Quoted => {
                literal::read_quoted_payload(&mut self.filter, source, &mut payload, b'"')?;
            }
            StringKind::Apostrophe => {
                literal::read_quoted_payload(&mut self.filter, source, &mut payload, b'\'')?;
            }
            StringKind::Curly => {
                literal::read_curly_payload(&mut self.filter, source, &mut payload)?;
            }
        }

        let entities = if params.input_override == InputOverride::None {
            decode::decode_entities(payload.as_bytes(), params.decoder, params.numeric)?
        } else {
            decode::decode_input_override(payload.as_bytes(), params.input_override)?
        };

        let output = encode::encode_entities(
            &entities,
            params.encoder,
            params.output_override,
            params.strict,
            self.limits.string_maxcap,
        )?;

        self.body_buf.clear();
        self.body_buf
            .push_slice(&output)
            .map_err(|_| ErrorCode::HugeBlock)?;
        Ok(())
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
    use crate::encode::EmptyEncoder;
    use crate::entities::StandardEntities;
    use crate::source::SliceSource;
    use pretty_assertions::assert_eq;

    fn quoted_params<'a>(
        decoder: &'a StandardEntities,
        numeric: &'a StandardEntities,
        encoder: &'a mut EmptyEncoder,
    ) -> StringParams<'a, StandardEntities, StandardEntities, EmptyEncoder> {
        StringParams {
            kind: StringKind::Quoted,
            decoder,
            numeric,
            encoder,
            output_override: OutputOverride::Utf8,
            strict: true,
            input_override: InputOverride::None,
        }
    }

    #[test]
    fn scenario_simple_then_final() {
        let mut reader = Reader::new();
        let mut src = SliceSource::new(b"hello |;");
        assert_eq!(reader.token(&mut src), Ok(TokenKind::Simple));
        assert_eq!(reader.bytes(false).unwrap(), b"hello");
        assert_eq!(reader.token(&mut src), Ok(TokenKind::Final));
        assert_eq!(reader.bytes(false).unwrap(), b"|;");
    }

    #[test]
    fn scenario_bom_flagged() {
        let mut reader = Reader::new();
        let mut src = SliceSource::new(b"\xEF\xBB\xBFfoo bar |;");
        assert_eq!(reader.token(&mut src), Ok(TokenKind::Simple));
        assert!(reader.bom_flag());
    }

    #[test]
    fn scenario_quoted_string_round_trip() {
        let mut reader = Reader::new();
        let mut src = SliceSource::new(br#"("abc") |;"#);
        assert_eq!(reader.token(&mut src), Ok(TokenKind::Simple)); // "("
        assert_eq!(
            reader.token(&mut src),
            Ok(TokenKind::StringPrefix(StringKind::Quoted))
        );
        assert_eq!(reader.bytes(false).unwrap(), b"");

        let map = StandardEntities::new();
        let mut enc = EmptyEncoder;
        let mut params = quoted_params(&map, &map, &mut enc);
        assert_eq!(reader.string(&mut src, &mut params), Ok(()));
        assert_eq!(reader.bytes(false).unwrap(), b"abc");

        assert_eq!(reader.token(&mut src), Ok(TokenKind::Simple)); // ")"
        assert_eq!(reader.token(&mut src), Ok(TokenKind::Final));
    }

    #[test]
    fn scenario_open_string_freezes_reader() {
        let mut reader = Reader::new();
        let mut src = SliceSource::new(b"\"oops");
        assert_eq!(
            reader.token(&mut src),
            Ok(TokenKind::StringPrefix(StringKind::Quoted))
        );

        let map = StandardEntities::new();
        let mut enc = EmptyEncoder;
        let mut params = quoted_params(&map, &map, &mut enc);
        assert_eq!(
            reader.string(&mut src, &mut params),
            Err(ErrorCode::OpenString)
        );
        assert_eq!(reader.status().error, Some(ErrorCode::OpenString));
        assert_eq!(reader.count(), 0);

        // Every later operation returns the same latched error.
        assert_eq!(reader.token(&mut src), Err(ErrorCode::OpenString));
        let mut params2 = quoted_params(&map, &map, &mut enc);
        assert_eq!(
            reader.string(&mut src, &mut params2),
            Err(ErrorCode::OpenString)
        );
    }

    #[test]
    fn bytes_null_term_accepts_nul_free_token() {
        let mut reader = Reader::new();
        let mut src = SliceSource::new(b"abc |;");
        reader.token(&mut src).unwrap();
        assert_eq!(reader.bytes(true).unwrap(), b"abc");
    }

    #[test]
    fn bytes_null_term_rejects_decoded_nul_entity() {
        // The `\0` escape decodes to entity 0, which the UTF-8 override
        // then encodes as a literal NUL byte in the body buffer.
        let mut reader = Reader::new();
        let mut src = SliceSource::new(br#""\0""#);
        reader.token(&mut src).unwrap();

        let map = StandardEntities::new();
        let mut enc = EmptyEncoder;
        let mut params = quoted_params(&map, &map, &mut enc);
        reader.string(&mut src, &mut params).unwrap();

        assert_eq!(reader.bytes(false).unwrap(), b"\0");
        assert_eq!(reader.bytes(true), Err(NotCStringSafe));
    }

    #[test]
    fn trailer_after_final_is_error() {
        let mut reader = Reader::new();
        let mut src = SliceSource::new(b"a |; b");
        reader.token(&mut src).unwrap();
        assert_eq!(reader.token(&mut src), Err(ErrorCode::Trailer));
        assert_eq!(reader.status().error, Some(ErrorCode::Trailer));
    }

    #[test]
    fn long_token_reports_overflow_and_freezes() {
        let mut reader = Reader::with_limits(Limits {
            token_maxcap: 4,
            string_maxcap: DEFAULT_STRING_MAXCAP,
        });
        let mut src = SliceSource::new(b"aaaaaaaa |;");
        assert_eq!(reader.token(&mut src), Err(ErrorCode::LongToken));
        assert_eq!(reader.status().error, Some(ErrorCode::LongToken));
    }
}
