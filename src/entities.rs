//! A concrete, documented default [`DecodingMap`] (SPEC_FULL.md §C.4).
//!
//! spec.md leaves the entity set abstract ("implementation can be explicit
//! or inferred from string prefixes"); this module supplies one concrete
//! default usable out of the box, grounded on
//! `AaronFriel-jsonmodem::escape_buffer::UnicodeEscapeBuffer`'s four-hex-
//! digit accumulation idiom (adapted here to the [`NumericEscape`]
//! descriptor contract rather than a bespoke buffer).
//!
//! Every printable-ASCII, space, tab, and LF byte decodes to itself,
//! except backslash: it is registered only as an escape introducer, never
//! as a self-decoding entity, so an unregistered escape (e.g. `\q`) fails
//! with `BadEscape` instead of silently falling back to `\` + the next
//! byte decoded on its own. `\\`, `\"`, `\'`, `\n`, `\t`, `\r`, and `\0`
//! are backslash escapes for backslash, the two quote characters, newline,
//! tab, carriage return, and NUL respectively. `\u` followed by exactly
//! four hex digits is a numeric escape producing the resulting codepoint.

use crate::trie::{DecodingMap, NumericEscape, NumericEscapeTable, PrefixTrie, PrefixTrieBuilder};

/// The entity code `\u` opens a numeric escape under, registered with
/// [`NumericEscapeTable::numeric_escape`]. Chosen past the Unicode range
/// so it can never collide with a literal codepoint entity.
const UNICODE_ESCAPE_OPENER: u32 = 0x0011_0000;

/// A ready-to-use default [`DecodingMap`] + [`NumericEscapeTable`] pair.
#[derive(Debug, Clone)]
pub struct StandardEntities {
    trie: PrefixTrie,
}

impl Default for StandardEntities {
    fn default() -> Self {
        Self::new()
    }
}

impl StandardEntities {
    /// Builds the default decoding map described in the module docs.
    #[must_use]
    pub fn new() -> Self {
        let mut b = PrefixTrieBuilder::new();
        for byte in 0x20u8..=0x7E {
            if byte == b'\\' {
                continue;
            }
            b.insert(&[byte], u32::from(byte));
        }
        b.insert(b"\t", u32::from(b'\t'));
        b.insert(b"\n", u32::from(b'\n'));

        b.insert(b"\\\\", u32::from(b'\\'));
        b.insert(b"\\\"", u32::from(b'"'));
        b.insert(b"\\'", u32::from(b'\''));
        b.insert(b"\\n", u32::from(b'\n'));
        b.insert(b"\\t", u32::from(b'\t'));
        b.insert(b"\\r", u32::from(b'\r'));
        b.insert(b"\\0", 0);
        b.insert(b"\\u", UNICODE_ESCAPE_OPENER);

        Self { trie: b.build() }
    }
}

impl DecodingMap for StandardEntities {
    type Node = usize;

    fn root(&self) -> usize {
        self.trie.root()
    }

    fn branch(&self, node: usize, byte: u8) -> Option<usize> {
        self.trie.branch(node, byte)
    }

    fn entity(&self, node: usize) -> Option<u32> {
        self.trie.entity(node)
    }
}

impl NumericEscapeTable for StandardEntities {
    fn numeric_escape(&self, entity: u32) -> Option<NumericEscape> {
        (entity == UNICODE_ESCAPE_OPENER).then_some(NumericEscape {
            base: 16,
            min_digits: 4,
            max_digits: 4,
            terminator: None,
            min_value: 0,
            max_value: 0x10_FFFF,
        })
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
    fn ascii_byte_decodes_to_itself() {
        let e = StandardEntities::new();
        let node = e.branch(e.root(), b'Q').unwrap();
        assert_eq!(e.entity(node), Some(u32::from(b'Q')));
    }

    #[test]
    fn backslash_n_decodes_to_newline() {
        let e = StandardEntities::new();
        let after_bs = e.branch(e.root(), b'\\').unwrap();
        let node = e.branch(after_bs, b'n').unwrap();
        assert_eq!(e.entity(node), Some(u32::from(b'\n')));
    }

    #[test]
    fn backslash_u_is_a_numeric_escape_opener() {
        let e = StandardEntities::new();
        let after_bs = e.branch(e.root(), b'\\').unwrap();
        let node = e.branch(after_bs, b'u').unwrap();
        let entity = e.entity(node).unwrap();
        let descriptor = e.numeric_escape(entity).unwrap();
        assert_eq!(descriptor.base, 16);
        assert_eq!(descriptor.min_digits, 4);
        assert_eq!(descriptor.max_digits, 4);
    }

    #[test]
    fn plain_entity_is_not_a_numeric_escape_opener() {
        let e = StandardEntities::new();
        assert_eq!(e.numeric_escape(u32::from(b'a')), None);
    }
}
