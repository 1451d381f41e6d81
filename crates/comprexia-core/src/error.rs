//! Comprexia error types

use thiserror::Error;

/// Comprexia error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Malformed stream: match at offset {offset} has distance {distance} but only {available} bytes were decoded")]
    MalformedStream {
        offset: usize,
        distance: usize,
        available: usize,
    },

    #[error("Invalid match length {length} at offset {offset}")]
    InvalidMatchLength { offset: usize, length: usize },

    #[error("Truncated stream: block at offset {offset} needs {needed} bytes, {remaining} remain")]
    TruncatedStream {
        offset: usize,
        needed: usize,
        remaining: usize,
    },

    #[error("Invalid token 0x{byte:02x} at offset {offset}")]
    InvalidToken { offset: usize, byte: u8 },

    #[error("Escape token at offset {offset} has no following byte")]
    TruncatedEscape { offset: usize },

    #[error("Stream encoder already finished")]
    EncoderFinished,
}

/// Comprexia result type
pub type Result<T> = std::result::Result<T, Error>;
