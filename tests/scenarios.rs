//! Scenario tests for the seven worked examples in spec.md §8.

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "test assertions use unwrap/expect for clarity")]

use shastina_reader::{
    EmptyEncoder, ErrorCode, InputOverride, OutputOverride, Reader, SliceSource, StringKind,
    StringParams, TokenKind,
};
use shastina_reader::entities::StandardEntities;

fn decode_quoted_body(reader: &mut Reader, src: &mut SliceSource<'_>) -> Vec<u8> {
    let map = StandardEntities::new();
    let mut enc = EmptyEncoder;
    let mut params = StringParams {
        kind: StringKind::Quoted,
        decoder: &map,
        numeric: &map,
        encoder: &mut enc,
        output_override: OutputOverride::Utf8,
        strict: true,
        input_override: InputOverride::None,
    };
    reader.string(src, &mut params).unwrap();
    reader.bytes(false).unwrap().to_vec()
}

#[test]
fn scenario_1_simple_tokens_then_final() {
    let mut reader = Reader::new();
    let mut src = SliceSource::new(b"hello |;");
    assert_eq!(reader.token(&mut src), Ok(TokenKind::Simple));
    assert_eq!(reader.bytes(false).unwrap(), b"hello");
    assert_eq!(reader.token(&mut src), Ok(TokenKind::Final));
    assert_eq!(reader.bytes(false).unwrap(), b"|;");
}

#[test]
fn scenario_2_bom_flagged_and_stripped() {
    let mut reader = Reader::new();
    let mut src = SliceSource::new(b"\xEF\xBB\xBFfoo bar |;");
    assert_eq!(reader.token(&mut src), Ok(TokenKind::Simple));
    assert_eq!(reader.bytes(false).unwrap(), b"foo");
    assert!(reader.bom_flag());
    assert_eq!(reader.token(&mut src), Ok(TokenKind::Simple));
    assert_eq!(reader.bytes(false).unwrap(), b"bar");
    assert_eq!(reader.token(&mut src), Ok(TokenKind::Final));
}

#[test]
fn scenario_3_comment_does_not_tokenise() {
    let mut reader = Reader::new();
    let mut src = SliceSource::new(b"a#comment\nb |;");
    assert_eq!(reader.token(&mut src), Ok(TokenKind::Simple));
    assert_eq!(reader.bytes(false).unwrap(), b"a");
    assert_eq!(reader.token(&mut src), Ok(TokenKind::Simple));
    assert_eq!(reader.bytes(false).unwrap(), b"b");
    assert_eq!(reader.token(&mut src), Ok(TokenKind::Final));
}

#[test]
fn scenario_4_quoted_string_prefix_and_body() {
    let mut reader = Reader::new();
    let mut src = SliceSource::new(br#"("abc") |;"#);
    assert_eq!(reader.token(&mut src), Ok(TokenKind::Simple));
    assert_eq!(reader.bytes(false).unwrap(), b"(");
    assert_eq!(
        reader.token(&mut src),
        Ok(TokenKind::StringPrefix(StringKind::Quoted))
    );
    assert_eq!(reader.bytes(false).unwrap(), b"");
    assert_eq!(decode_quoted_body(&mut reader, &mut src), b"abc");
    assert_eq!(reader.token(&mut src), Ok(TokenKind::Simple));
    assert_eq!(reader.bytes(false).unwrap(), b")");
    assert_eq!(reader.token(&mut src), Ok(TokenKind::Final));
}

#[test]
fn scenario_5_curly_nested_body_round_trips_raw() {
    let mut reader = Reader::new();
    let mut src = SliceSource::new(b"x{foo {bar} baz}y |;");
    assert_eq!(reader.token(&mut src), Ok(TokenKind::Simple));
    assert_eq!(reader.bytes(false).unwrap(), b"x");
    assert_eq!(
        reader.token(&mut src),
        Ok(TokenKind::StringPrefix(StringKind::Curly))
    );

    let map = StandardEntities::new();
    let mut enc = EmptyEncoder;
    let mut params = StringParams {
        kind: StringKind::Curly,
        decoder: &map,
        numeric: &map,
        encoder: &mut enc,
        output_override: OutputOverride::Utf8,
        strict: true,
        input_override: InputOverride::None,
    };
    reader.string(&mut src, &mut params).unwrap();
    assert_eq!(reader.bytes(false).unwrap(), b"foo {bar} baz");

    assert_eq!(reader.token(&mut src), Ok(TokenKind::Simple));
    assert_eq!(reader.bytes(false).unwrap(), b"y");
    assert_eq!(reader.token(&mut src), Ok(TokenKind::Final));
}

#[test]
fn scenario_6_unterminated_quote_is_open_string_error() {
    let mut reader = Reader::new();
    let mut src = SliceSource::new(b"\"oops");
    assert_eq!(
        reader.token(&mut src),
        Ok(TokenKind::StringPrefix(StringKind::Quoted))
    );

    let map = StandardEntities::new();
    let mut enc = EmptyEncoder;
    let mut params = StringParams {
        kind: StringKind::Quoted,
        decoder: &map,
        numeric: &map,
        encoder: &mut enc,
        output_override: OutputOverride::Utf8,
        strict: true,
        input_override: InputOverride::None,
    };
    assert_eq!(
        reader.string(&mut src, &mut params),
        Err(ErrorCode::OpenString)
    );
    assert_eq!(reader.status().error, Some(ErrorCode::OpenString));
    assert_eq!(reader.status().line, 1);
}

#[test]
fn scenario_7_escaped_quote_preserved_raw_then_decoded() {
    // The raw payload keeps the backslash; entity decoding is the separate
    // pass that turns `\"` into `"`.
    let mut reader = Reader::new();
    let mut src = SliceSource::new(b"\"a\\\"b\"");
    assert_eq!(
        reader.token(&mut src),
        Ok(TokenKind::StringPrefix(StringKind::Quoted))
    );
    assert_eq!(decode_quoted_body(&mut reader, &mut src), b"a\"b");
}
