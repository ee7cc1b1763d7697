//! Error types for the API codec.

/// Errors produced while framing or parsing API sentences.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("negative word length: {0}")]
    NegativeLength(i64),

    #[error("word too long: {0} bytes (max {max})", max = crate::MAX_WORD_LEN - 1)]
    WordTooLong(i64),

    #[error("unsupported length prefix control byte 0x{0:02x}")]
    UnsupportedPrefix(u8),

    #[error("truncated input")]
    Truncated,

    #[error("protocol error: {0}")]
    Protocol(String),
}
