//! Streaming byte-oriented reader for the Shastina metalanguage lexical
//! layer.
//!
//! Five components compose, leaf-first, mirroring spec.md §2:
//!
//! - [`source`] (C1): the byte-source boundary.
//! - [`filter`] (C2): newline normalisation, BOM stripping, line counting,
//!   single-byte pushback.
//! - [`classify`], [`token`], [`recognizer`] (C3): byte classification and
//!   the token recognizer.
//! - [`literal`] (C4): quoted/curly string payload reading.
//! - [`trie`], [`entities`], [`decode`], [`encode`] (C5): the decoding-map
//!   contract, a concrete prefix-trie implementation and default entity
//!   set, entity extraction, and UTF-override-aware output encoding.
//! - [`buffer`]: the bounded growable byte buffer shared throughout.
//! - [`error`]: the reader's error taxonomy.
//! - [`reader`]: the public [`Reader`] gluing the pipeline together.
//!
//! Out of scope, per spec.md §1: higher-level Shastina semantics
//! (operators, groups, arrays, interpreter state), a driver binary, and
//! character-set conversion beyond the enumerated UTF encodings.

pub mod buffer;
pub mod classify;
pub mod decode;
pub mod encode;
pub mod entities;
pub mod error;
pub mod filter;
pub mod literal;
pub mod reader;
pub mod recognizer;
pub mod source;
pub mod token;
pub mod trie;

pub use buffer::{Buffer, Overflow};
pub use decode::{decode_entities, decode_input_override, InputOverride};
pub use encode::{encode_entities, EmptyEncoder, Encoder, OutputOverride};
pub use entities::StandardEntities;
pub use error::ErrorCode;
pub use filter::{FilterState, FilteredByte};
pub use literal::{read_curly_payload, read_quoted_payload};
pub use reader::{Limits, NotCStringSafe, Reader, Status, StringParams};
pub use recognizer::read_token;
pub use source::{ByteSource, SliceSource, SourceByte};
pub use token::{StringKind, TokenKind};
pub use trie::{DecodingMap, NumericEscape, NumericEscapeTable, PrefixTrie, PrefixTrieBuilder};
