//! C5, encode pass: output with overrides (spec §4.5.2).
//!
//! No direct teacher analogue exists — `ori_lexer_core` only tokenizes,
//! it never encodes text — so this module is written from spec.md's
//! byte-count table directly, in the teacher's `#[inline]`-per-arm,
//! doc-headed method style.

use crate::error::ErrorCode;

/// Caller-supplied entity-to-bytes table (spec §3 "Encoder callback").
///
/// `encode` writes `entity`'s encoding into `out` if it fits and returns
/// how many bytes the encoding occupies. A returned length greater than
/// `out.len()` means "retry with a larger buffer" and must not have
/// written anything into `out`. Unknown entity codes return 0.
pub trait Encoder {
    /// Encodes `entity` into `out`, per the contract above.
    fn encode(&mut self, entity: u32, out: &mut [u8]) -> usize;
}

impl<F> Encoder for F
where
    F: FnMut(u32, &mut [u8]) -> usize,
{
    fn encode(&mut self, entity: u32, out: &mut [u8]) -> usize {
        self(entity, out)
    }
}

/// An [`Encoder`] that knows no entities; every entity yields length 0.
/// Useful as a base encoder when every entity of interest is expected to
/// be handled by an [`OutputOverride`].
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyEncoder;

impl Encoder for EmptyEncoder {
    fn encode(&mut self, _entity: u32, _out: &mut [u8]) -> usize {
        0
    }
}

/// Which fixed Unicode transformation scheme, if any, bypasses the
/// [`Encoder`] table for Unicode-range entities (spec §3 "output override
/// mode").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputOverride {
    /// No override: every entity goes through the [`Encoder`] table.
    None,
    /// Classical UTF-8, 1-4 bytes per codepoint.
    Utf8,
    /// CESU-8: supplemental codepoints as a surrogate pair, each half
    /// encoded as 3-byte UTF-8.
    Cesu8,
    /// UTF-16, little-endian code units.
    U16Le,
    /// UTF-16, big-endian code units.
    U16Be,
    /// UTF-32, little-endian.
    U32Le,
    /// UTF-32, big-endian.
    U32Be,
}

const UNICODE_MAX: u32 = 0x10_FFFF;
const SURROGATE_LOW: u32 = 0xD800;
const SURROGATE_HIGH: u32 = 0xDFFF;
const SUPPLEMENTAL_START: u32 = 0x1_0000;

/// Initial scratch-buffer size for the table-encoder retry loop.
const SCRATCH_INITIAL: usize = 8;

#[inline]
#[must_use]
fn is_surrogate(entity: u32) -> bool {
    (SURROGATE_LOW..=SURROGATE_HIGH).contains(&entity)
}

#[inline]
#[must_use]
fn surrogate_pair(supplemental: u32) -> (u32, u32) {
    let offset = supplemental - SUPPLEMENTAL_START;
    (
        SURROGATE_LOW + (offset >> 10),
        0xDC00 + (offset & 0x3FF),
    )
}

/// Classical UTF-8 byte count/layout table from spec.md §4.5.2.
#[inline]
fn push_utf8(buf: &mut Vec<u8>, cp: u32) {
    match cp {
        0x0000..=0x007F => buf.push(cp as u8),
        0x0080..=0x07FF => {
            buf.push(0xC0 | (cp >> 6) as u8);
            buf.push(0x80 | (cp & 0x3F) as u8);
        }
        0x0800..=0xFFFF => {
            buf.push(0xE0 | (cp >> 12) as u8);
            buf.push(0x80 | ((cp >> 6) & 0x3F) as u8);
            buf.push(0x80 | (cp & 0x3F) as u8);
        }
        _ => {
            buf.push(0xF0 | (cp >> 18) as u8);
            buf.push(0x80 | ((cp >> 12) & 0x3F) as u8);
            buf.push(0x80 | ((cp >> 6) & 0x3F) as u8);
            buf.push(0x80 | (cp & 0x3F) as u8);
        }
    }
}

#[inline]
fn push_cesu8(buf: &mut Vec<u8>, cp: u32) {
    if cp >= SUPPLEMENTAL_START {
        let (hi, lo) = surrogate_pair(cp);
        push_utf8(buf, hi);
        push_utf8(buf, lo);
    } else {
        push_utf8(buf, cp);
    }
}

#[inline]
fn push_u16_unit(buf: &mut Vec<u8>, unit: u32, little_endian: bool) {
    let unit = unit as u16;
    let bytes = if little_endian {
        unit.to_le_bytes()
    } else {
        unit.to_be_bytes()
    };
    buf.extend_from_slice(&bytes);
}

#[inline]
fn push_u16(buf: &mut Vec<u8>, cp: u32, little_endian: bool) {
    if cp >= SUPPLEMENTAL_START {
        let (hi, lo) = surrogate_pair(cp);
        push_u16_unit(buf, hi, little_endian);
        push_u16_unit(buf, lo, little_endian);
    } else {
        push_u16_unit(buf, cp, little_endian);
    }
}

#[inline]
fn push_u32(buf: &mut Vec<u8>, cp: u32, little_endian: bool) {
    let bytes = if little_endian {
        cp.to_le_bytes()
    } else {
        cp.to_be_bytes()
    };
    buf.extend_from_slice(&bytes);
}

fn push_checked(out: &mut Vec<u8>, maxcap: usize, extra: &[u8]) -> Result<(), ErrorCode> {
    if out.len() + extra.len() > maxcap {
        return Err(ErrorCode::HugeBlock);
    }
    out.extend_from_slice(extra);
    Ok(())
}

/// Routes `entity` through the [`Encoder`] table, retrying with a doubled
/// scratch buffer (capped at `maxcap`) when the encoder reports it needs
/// more room.
fn encode_via_table<E: Encoder>(
    entity: u32,
    encoder: &mut E,
    maxcap: usize,
    out: &mut Vec<u8>,
) -> Result<(), ErrorCode> {
    let mut scratch_len = SCRATCH_INITIAL.min(maxcap.max(1));
    loop {
        let mut scratch = vec![0u8; scratch_len];
        let needed = encoder.encode(entity, &mut scratch);
        if needed <= scratch_len {
            return push_checked(out, maxcap, &scratch[..needed]);
        }
        if scratch_len >= maxcap {
            return Err(ErrorCode::HugeBlock);
        }
        scratch_len = (scratch_len * 2).min(maxcap);
    }
}

/// Encodes one entity per spec.md §4.5.2: entities outside the Unicode
/// range always go through the table (regardless of override); within
/// range, `strict` routes surrogates to the table instead of the UTF path.
fn encode_one<E: Encoder>(
    entity: u32,
    encoder: &mut E,
    override_mode: OutputOverride,
    strict: bool,
    maxcap: usize,
    out: &mut Vec<u8>,
) -> Result<(), ErrorCode> {
    let in_unicode_range = entity <= UNICODE_MAX;
    let use_override = override_mode != OutputOverride::None
        && in_unicode_range
        && !(strict && is_surrogate(entity));

    if !use_override {
        return encode_via_table(entity, encoder, maxcap, out);
    }

    let mut local = Vec::new();
    match override_mode {
        OutputOverride::None => unreachable!("use_override implies a non-None mode"),
        OutputOverride::Utf8 => push_utf8(&mut local, entity),
        OutputOverride::Cesu8 => push_cesu8(&mut local, entity),
        OutputOverride::U16Le => push_u16(&mut local, entity, true),
        OutputOverride::U16Be => push_u16(&mut local, entity, false),
        OutputOverride::U32Le => push_u32(&mut local, entity, true),
        OutputOverride::U32Be => push_u32(&mut local, entity, false),
    }
    push_checked(out, maxcap, &local)
}

/// Encodes a full sequence of entities (as produced by
/// [`crate::decode::decode_entities`]) into output bytes.
///
/// # Errors
///
/// Returns [`ErrorCode::HugeBlock`] if the accumulated output would
/// exceed `maxcap` bytes.
pub fn encode_entities<E: Encoder>(
    entities: &[u32],
    encoder: &mut E,
    override_mode: OutputOverride,
    strict: bool,
    maxcap: usize,
) -> Result<Vec<u8>, ErrorCode> {
    let mut out = Vec::new();
    for &entity in entities {
        encode_one(entity, encoder, override_mode, strict, maxcap, &mut out)?;
    }
    Ok(out)
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
    fn utf8_round_trips_every_codepoint_byte_count() {
        let cases: &[(u32, usize)] = &[
            (0x00, 1),
            (0x7F, 1),
            (0x80, 2),
            (0x7FF, 2),
            (0x800, 3),
            (0xFFFF, 3),
            (0x1_0000, 4),
            (0x10_FFFF, 4),
        ];
        for &(cp, len) in cases {
            let mut buf = Vec::new();
            push_utf8(&mut buf, cp);
            assert_eq!(buf.len(), len, "codepoint {cp:#x}");
            let decoded = std::str::from_utf8(&buf)
                .unwrap()
                .chars()
                .next()
                .unwrap();
            assert_eq!(u32::from(decoded), cp);
        }
    }

    #[test]
    fn cesu8_splits_supplemental_into_two_three_byte_sequences() {
        let cp = 0x1_F600; // outside BMP
        let mut buf = Vec::new();
        push_cesu8(&mut buf, cp);
        assert_eq!(buf.len(), 6);
        let (hi, lo) = surrogate_pair(cp);
        let mut expected = Vec::new();
        push_utf8(&mut expected, hi);
        push_utf8(&mut expected, lo);
        assert_eq!(buf, expected);
    }

    #[test]
    fn u16le_bmp_is_one_unit() {
        let mut buf = Vec::new();
        push_u16(&mut buf, 0x4E2D, true);
        assert_eq!(buf, vec![0x2D, 0x4E]);
    }

    #[test]
    fn u16be_supplemental_is_surrogate_pair() {
        let cp = 0x1_0437;
        let mut buf = Vec::new();
        push_u16(&mut buf, cp, false);
        assert_eq!(buf, vec![0xD8, 0x01, 0xDC, 0x37]);
    }

    #[test]
    fn u32le_and_u32be_byte_orders() {
        let mut le = Vec::new();
        push_u32(&mut le, 0x0001_F600, true);
        assert_eq!(le, vec![0x00, 0xF6, 0x01, 0x00]);
        let mut be = Vec::new();
        push_u32(&mut be, 0x0001_F600, false);
        assert_eq!(be, vec![0x00, 0x01, 0xF6, 0x00]);
    }

    #[test]
    fn strict_routes_surrogates_to_table_not_utf_path() {
        let mut calls = Vec::new();
        let mut encoder = |entity: u32, out: &mut [u8]| -> usize {
            calls.push(entity);
            out[0] = 0xAA;
            1
        };
        let out = encode_entities(&[0xD800], &mut encoder, OutputOverride::Utf8, true, 64).unwrap();
        assert_eq!(calls, vec![0xD800]);
        assert_eq!(out, vec![0xAA]);
    }

    #[test]
    fn non_strict_passes_surrogates_through_utf_path() {
        let mut encoder = EmptyEncoder;
        let out = encode_entities(&[0xD800], &mut encoder, OutputOverride::Cesu8, false, 64).unwrap();
        let mut expected = Vec::new();
        push_utf8(&mut expected, 0xD800);
        assert_eq!(out, expected);
    }

    #[test]
    fn entities_above_unicode_range_always_use_table() {
        let mut calls = Vec::new();
        let mut encoder = |entity: u32, out: &mut [u8]| -> usize {
            calls.push(entity);
            out[0] = 0x01;
            1
        };
        let out = encode_entities(&[0x20_0000], &mut encoder, OutputOverride::Utf8, false, 64).unwrap();
        assert_eq!(calls, vec![0x20_0000]);
        assert_eq!(out, vec![0x01]);
    }

    #[test]
    fn table_encoder_retries_with_larger_scratch() {
        let mut encoder = |_entity: u32, out: &mut [u8]| -> usize {
            // Always reports it needs 10 bytes, regardless of what's offered.
            if out.len() >= 10 {
                for (i, b) in out.iter_mut().take(10).enumerate() {
                    *b = i as u8;
                }
            }
            10
        };
        let out = encode_entities(&[1], &mut encoder, OutputOverride::None, false, 64).unwrap();
        assert_eq!(out, (0u8..10).collect::<Vec<_>>());
    }

    #[test]
    fn huge_block_when_output_exceeds_cap() {
        let mut encoder = EmptyEncoder;
        let result = encode_entities(&[0x41, 0x42, 0x43], &mut encoder, OutputOverride::Utf8, false, 2);
        assert_eq!(result, Err(ErrorCode::HugeBlock));
    }

    #[test]
    fn unknown_entity_yields_zero_length() {
        let mut encoder = EmptyEncoder;
        let out = encode_entities(&[42], &mut encoder, OutputOverride::None, false, 64).unwrap();
        assert_eq!(out, Vec::<u8>::new());
    }
}
