//! RouterOS binary API framing.
//!
//! The API talks in *sentences*: ordered lists of UTF-8 *words*, each
//! preceded by a variable-length length prefix, terminated by an empty
//! word. The encoders here are pure and never touch a socket; the async
//! helpers write a whole sentence in one `write_all`.
//!
//! # Wire format
//!
//! See [`wire`] module for the length prefix encoding.

pub mod error;
pub mod sentence;
pub mod wire;

pub use error::WireError;
pub use sentence::Sentence;
pub use wire::{
    decode_length, decode_sentence, encode_length, encode_sentence, read_sentence, write_sentence,
};

/// Largest word length this codec will frame (exclusive).
pub const MAX_WORD_LEN: usize = 0x20_0000;
