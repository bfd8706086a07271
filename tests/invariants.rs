//! Property-based tests for the nine testable invariants in spec.md §8.

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "test assertions use unwrap/expect for clarity")]

use proptest::prelude::*;
use shastina_reader::{
    encode_entities, decode_input_override, read_curly_payload, read_token, Buffer, EmptyEncoder,
    FilterState, FilteredByte, InputOverride, OutputOverride, SliceSource, TokenKind,
};

/// Strategy for a "word": one or more legal, non-whitespace, non-atomic,
/// non-`#`/`|` bytes, so it always tokenises as a single [`TokenKind::Simple`].
fn arb_word() -> impl Strategy<Value = String> {
    "[A-Za-z0-9]{1,8}".prop_map(|s| s)
}

/// Invariant 1 + property 2 (combined): a well-formed source of simple
/// words separated by single spaces, ending in ` |;`, tokenises into
/// exactly those words (in order) followed by one `Final`, and every
/// source byte is accounted for (no trailing/duplicated tokens).
proptest! {
    #[test]
    fn well_formed_source_ends_in_exactly_one_final(words in proptest::collection::vec(arb_word(), 0..12)) {
        let mut source_text = String::new();
        for w in &words {
            source_text.push_str(w);
            source_text.push(' ');
        }
        source_text.push_str("|;");

        let mut src = SliceSource::new(source_text.as_bytes());
        let mut filter = FilterState::new();
        let mut buf = Buffer::new(Buffer::DEFAULT_INITCAP, 4096);

        let mut seen = Vec::new();
        loop {
            let (kind, _line) = read_token(&mut filter, &mut src, &mut buf).unwrap();
            let is_final = kind == TokenKind::Final;
            seen.push((kind, buf.as_bytes().to_vec()));
            if is_final {
                break;
            }
        }

        prop_assert_eq!(seen.len(), words.len() + 1);
        for (word, (kind, bytes)) in words.iter().zip(seen.iter()) {
            prop_assert_eq!(*kind, TokenKind::Simple);
            prop_assert_eq!(bytes, word.as_bytes());
        }
        prop_assert_eq!(seen.last().unwrap().0, TokenKind::Final);

        // No further productive calls: reading again just hits a clean EOF,
        // not another Final or a fabricated token.
        let mut after = FilterState::new();
        let mut after_src = SliceSource::new(b"");
        let mut after_buf = Buffer::new(Buffer::DEFAULT_INITCAP, 16);
        prop_assert!(read_token(&mut after, &mut after_src, &mut after_buf).is_err());
    }
}

/// Invariant 3: the line counter after reading byte `b` equals 1 + the
/// number of LFs (post-normalisation) strictly preceding `b`.
proptest! {
    #[test]
    fn line_counter_matches_preceding_lf_count(
        bytes in proptest::collection::vec(
            prop_oneof![Just(b'a'), Just(b'\n')],
            0..64,
        )
    ) {
        let mut src = SliceSource::new(&bytes);
        let mut filter = FilterState::new();
        let mut lfs_before = 0u64;
        loop {
            match filter.read(&mut src) {
                FilteredByte::Byte(b) => {
                    prop_assert_eq!(filter.line(), 1 + lfs_before);
                    if b == b'\n' {
                        lfs_before += 1;
                    }
                }
                _ => break,
            }
        }
    }
}

/// Invariant 4: newline normalisation is transparent to the token
/// sequence and per-token line numbers, regardless of which convention
/// (LF, CR, CRLF, LFCR) separates lines.
proptest! {
    #[test]
    fn newline_convention_does_not_affect_tokens_or_lines(
        words in proptest::collection::vec(arb_word(), 1..6),
        style in 0..4usize,
    ) {
        let sep: &[u8] = match style {
            0 => b"\n",
            1 => b"\r",
            2 => b"\r\n",
            _ => b"\n\r",
        };
        let mut source_bytes = Vec::new();
        for w in &words {
            source_bytes.extend_from_slice(w.as_bytes());
            source_bytes.extend_from_slice(sep);
        }
        source_bytes.extend_from_slice(b"|;");

        let mut src = SliceSource::new(&source_bytes);
        let mut filter = FilterState::new();
        let mut buf = Buffer::new(Buffer::DEFAULT_INITCAP, 4096);

        let mut lines = Vec::new();
        loop {
            let (kind, line) = read_token(&mut filter, &mut src, &mut buf).unwrap();
            lines.push(line);
            if kind == TokenKind::Final {
                break;
            }
        }

        // One token per word, each on its own successive line, then Final
        // one line past the last word.
        let expected: Vec<u64> = (1..=words.len() as u64 + 1).collect();
        prop_assert_eq!(lines, expected);
    }
}

/// Invariant 5: the UTF-8 override's output inverts through
/// [`InputOverride::Utf8`] for every codepoint in `0..=0x10FFFF` (skipping
/// the reserved surrogate range, which has no UTF-8 encoding to invert).
proptest! {
    #[test]
    fn utf8_override_round_trips(cp in (0u32..=0x10_FFFF).prop_filter(
        "surrogate range is unencodable",
        |cp| !(0xD800..=0xDFFF).contains(cp),
    )) {
        let mut encoder = EmptyEncoder;
        let bytes = encode_entities(&[cp], &mut encoder, OutputOverride::Utf8, false, 64).unwrap();
        let decoded = decode_input_override(&bytes, InputOverride::Utf8).unwrap();
        prop_assert_eq!(decoded, vec![cp]);
    }
}

/// Invariant 6: CESU-8 output for a supplemental codepoint is exactly the
/// concatenation of the UTF-8 encodings of its surrogate pair halves.
proptest! {
    #[test]
    fn cesu8_equals_utf8_of_surrogate_pair(cp in 0x1_0000u32..=0x10_FFFF) {
        let hi = 0xD800 + ((cp - 0x1_0000) >> 10);
        let lo = 0xDC00 + ((cp - 0x1_0000) & 0x3FF);

        let mut encoder = EmptyEncoder;
        let cesu8 = encode_entities(&[cp], &mut encoder, OutputOverride::Cesu8, false, 64).unwrap();

        let mut expected = Vec::new();
        expected.extend(encode_entities(&[hi], &mut encoder, OutputOverride::Utf8, false, 64).unwrap());
        expected.extend(encode_entities(&[lo], &mut encoder, OutputOverride::Utf8, false, 64).unwrap());

        prop_assert_eq!(cesu8, expected);
    }
}

/// Invariant 7: UTF-16 output is a surrogate pair (in the chosen byte
/// order) for supplemental codepoints, and a single code unit for BMP
/// codepoints; either way it round-trips through the matching
/// [`InputOverride`].
proptest! {
    #[test]
    fn utf16_round_trips_with_correct_unit_count(
        cp in (0u32..=0x10_FFFF).prop_filter(
            "surrogate range is unencodable",
            |cp| !(0xD800..=0xDFFF).contains(cp),
        ),
        little_endian in any::<bool>(),
    ) {
        let mut encoder = EmptyEncoder;
        let (out_mode, in_mode) = if little_endian {
            (OutputOverride::U16Le, InputOverride::U16Le)
        } else {
            (OutputOverride::U16Be, InputOverride::U16Be)
        };
        let bytes = encode_entities(&[cp], &mut encoder, out_mode, false, 64).unwrap();

        let expected_units = if cp >= 0x1_0000 { 2 } else { 1 };
        prop_assert_eq!(bytes.len(), expected_units * 2);

        let decoded = decode_input_override(&bytes, in_mode).unwrap();
        prop_assert_eq!(decoded, vec![cp]);
    }
}

/// Invariant 8: a curly payload's body reappears verbatim (minus the
/// outermost delimiters) regardless of how many balanced `{...}` pairs it
/// contains at the outer level.
proptest! {
    #[test]
    fn curly_nesting_preserves_body_verbatim(depth in 0usize..20, inner in "[A-Za-z]{0,6}") {
        let mut payload_and_rest = Vec::new();
        for _ in 0..depth {
            payload_and_rest.push(b'{');
        }
        payload_and_rest.extend_from_slice(inner.as_bytes());
        for _ in 0..depth {
            payload_and_rest.push(b'}');
        }
        payload_and_rest.push(b'}'); // closes the prefix-opened outer brace
        payload_and_rest.extend_from_slice(b" rest");

        let mut src = SliceSource::new(&payload_and_rest);
        let mut filter = FilterState::new();
        let mut buf = Buffer::new(Buffer::DEFAULT_INITCAP, 4096);
        read_curly_payload(&mut filter, &mut src, &mut buf).unwrap();

        let mut expected = Vec::new();
        for _ in 0..depth {
            expected.push(b'{');
        }
        expected.extend_from_slice(inner.as_bytes());
        for _ in 0..depth {
            expected.push(b'}');
        }
        prop_assert_eq!(buf.as_bytes(), expected.as_slice());
    }
}

/// Invariant 9: `read; pushback; read` yields the same byte and does not
/// advance the line count.
proptest! {
    #[test]
    fn pushback_is_idempotent(bytes in proptest::collection::vec(any::<u8>().prop_filter(
        "legal, non-newline bytes only",
        |b| matches!(b, 0x21..=0x7E),
    ), 1..32)) {
        let mut src = SliceSource::new(&bytes);
        let mut filter = FilterState::new();

        let first = filter.read(&mut src);
        let line_before = filter.line();
        filter.pushback();
        let replayed = filter.read(&mut src);
        let line_after = filter.line();

        prop_assert_eq!(first, replayed);
        prop_assert_eq!(line_before, line_after);
    }
}
