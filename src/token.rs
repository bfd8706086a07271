//! Token model produced by C3 (spec §3, §4.3).
//!
//! Grounded on `ori_lexer_core::tag::RawTag`'s small `#[non_exhaustive]` tag
//! enum idiom: the kind is a thin discriminant, and the actual bytes stay
//! in the reader's [`crate::buffer::Buffer`] rather than being duplicated
//! into the token itself (mirrors spec.md §6's `token(r, source)` contract:
//! "on success, buffer contains the token").

/// Which string syntax a literal payload uses.
///
/// `Quoted` and `Curly` are the two syntaxes [`crate::recognizer::read_token`]
/// can detect automatically from a token's trailing delimiter (`"` or `{`).
/// `Apostrophe` is never produced by the recognizer (`'` is an atomic,
/// one-byte token per spec.md §4.2) but is a valid [`crate::literal`] /
/// [`crate::reader::Reader::string`] parameter for callers that want to
/// treat an atomic `'` token as a string-opening prefix themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StringKind {
    /// `"..."`, backslash-escaped, terminated by an unescaped `"`.
    Quoted,
    /// `'...'`, backslash-escaped, terminated by an unescaped `'`.
    Apostrophe,
    /// `{...}`, backslash-escaped, balanced nesting.
    Curly,
}

/// The classification of one token read by [`crate::recognizer::read_token`].
///
/// The token's bytes (simple-token text, or the prefix before an opening
/// delimiter) live in the caller-supplied [`crate::buffer::Buffer`], not in
/// this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum TokenKind {
    /// An ordinary token: buffer holds its full bytes.
    Simple,
    /// The fixed `|;` final token. No further productive reads follow.
    Final,
    /// A string-opening prefix; buffer holds the bytes before the
    /// delimiter (often empty). The payload follows and is read
    /// separately via [`crate::reader::Reader::string`].
    StringPrefix(StringKind),
    /// An embedded-data-opening prefix (before a backtick). The payload
    /// is read separately; this crate exposes the raw bytes but does not
    /// interpret embedded-data framing beyond spec.md's scope.
    EmbedPrefix,
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
    fn string_kinds_are_distinct() {
        assert_ne!(StringKind::Quoted, StringKind::Apostrophe);
        assert_ne!(StringKind::Quoted, StringKind::Curly);
        assert_ne!(StringKind::Apostrophe, StringKind::Curly);
    }

    #[test]
    fn token_kind_carries_string_kind() {
        let tk = TokenKind::StringPrefix(StringKind::Curly);
        assert_eq!(tk, TokenKind::StringPrefix(StringKind::Curly));
        assert_ne!(tk, TokenKind::StringPrefix(StringKind::Quoted));
    }
}
