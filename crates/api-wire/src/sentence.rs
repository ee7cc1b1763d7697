//! Sentence builder for API commands.

use crate::error::WireError;
use crate::wire::encode_sentence;

/// An API sentence: a command word followed by `=key=value` attribute words.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sentence {
    words: Vec<String>,
}

impl Sentence {
    /// Starts a sentence with its command word (`!login`, `/system/resource/print`, ...).
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            words: vec![command.into()],
        }
    }

    /// Wraps words received from the wire.
    pub fn from_words(words: Vec<String>) -> Self {
        Self { words }
    }

    /// Appends an `=key=value` attribute word.
    pub fn attribute(mut self, key: &str, value: &str) -> Self {
        self.words.push(format!("={key}={value}"));
        self
    }

    /// Appends a raw word.
    pub fn word(mut self, word: impl Into<String>) -> Self {
        self.words.push(word.into());
        self
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// The first word, if any.
    pub fn command(&self) -> Option<&str> {
        self.words.first().map(String::as_str)
    }

    /// Looks up the value of an `=key=value` word.
    ///
    /// Values may themselves contain `=`; only the first two separate the key.
    pub fn attribute_value(&self, key: &str) -> Option<&str> {
        self.words.iter().skip(1).find_map(|w| {
            let rest = w.strip_prefix('=')?;
            let (k, v) = rest.split_once('=')?;
            (k == key).then_some(v)
        })
    }

    /// Frames the sentence for the wire.
    pub fn encode(&self) -> Result<Vec<u8>, WireError> {
        encode_sentence(&self.words)
    }
}
