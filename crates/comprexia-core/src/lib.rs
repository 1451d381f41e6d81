//! Comprexia - fast LZ77-family compression for text and JSON payloads
//!
//! The compressed format is a bare sequence of literal and back-reference
//! blocks (see [`block`]). Two optional, reversible transforms run in front
//! of the encoder to make JSON and non-ASCII text more repetitive.
//!
//! ## Variants
//!
//! - **compress / decompress**: thorough match finder, no preprocessing
//! - **compress_fast**: cheaper match finder, same format
//! - **compress_json**: JSON structural tokenization first
//! - **compress_utf8**: UTF-8 continuation delta coding first
//! - **compress_advanced**: JSON tokenization, then UTF-8 delta coding
//! - **StreamEncoder**: bounded-memory encoder fed in chunks
//!
//! # Example
//!
//! ```rust
//! use comprexia_core::{compress_json, decompress_json};
//!
//! let json = br#"{"id": 1, "tags": ["a", "b"], "ok": true}"#;
//! let compressed = compress_json(json);
//! let restored = decompress_json(&compressed)?;
//! assert_eq!(restored, br#"{"id":1,"tags":["a","b"],"ok":true}"#);
//! # Ok::<(), comprexia_core::Error>(())
//! ```

pub mod block;
mod compress;
mod decompress;
pub mod error;
pub mod match_finder;
pub mod preprocess;
pub mod stream;

use serde::{Deserialize, Serialize};

pub use compress::{
    compress, compress_advanced, compress_fast, compress_json, compress_utf8, compress_with,
    Compressor,
};
pub use decompress::{
    decompress, decompress_advanced, decompress_json, decompress_utf8, decompress_with,
    Decompressor,
};
pub use error::{Error, Result};
pub use stream::{init, EncoderState, StreamEncoder, StreamWriter};

/// Match finder tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// Single word compare, matches up to 64 bytes, Short blocks only
    Fast,
    /// Verified matches up to 258 bytes, Extended blocks for long ones (default)
    #[default]
    Thorough,
}

/// Transform applied before block encoding and undone after decoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preprocess {
    /// Raw bytes (default)
    #[default]
    None,
    /// JSON structural tokenization; drops whitespace outside strings
    Json,
    /// UTF-8 continuation delta coding
    Utf8,
    /// JSON tokenization followed by UTF-8 delta coding
    Advanced,
}

/// Compression options
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Match finder tier
    pub level: Level,
    /// Preprocessing pipeline
    pub preprocess: Preprocess,
}

impl Options {
    /// Thorough level with the given preprocessing
    pub fn with_preprocess(preprocess: Preprocess) -> Self {
        Self {
            preprocess,
            ..Self::default()
        }
    }
}
