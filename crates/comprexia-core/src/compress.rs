//! Whole-buffer compression
//!
//! Algorithm overview:
//! 1. Query the match finder at every position the scan visits
//! 2. Emit accepted matches (4 bytes or more) as match blocks
//! 3. Buffer everything else as literals, 127 bytes per block at most
//!
//! The match finder is greedy: a match found at a position is taken as is,
//! without checking whether the next position offers a longer one.

use tracing::debug;

use crate::block::{write_match, LiteralBuffer, MatchEncoding};
use crate::match_finder::{Fast, HashTable, MatchFinder, Thorough, HASH_INPUT};
use crate::preprocess::{json, utf8};
use crate::{Level, Options, Preprocess};

/// Shortest match the whole-buffer encoders accept
const MIN_ACCEPTED_MATCH: usize = HASH_INPUT;

/// Compress with the thorough match finder and no preprocessing
pub fn compress(input: &[u8]) -> Vec<u8> {
    compress_with(input, &Options::default())
}

/// Compress with the fast match finder. Output decodes with [`crate::decompress`].
pub fn compress_fast(input: &[u8]) -> Vec<u8> {
    compress_with(
        input,
        &Options {
            level: Level::Fast,
            ..Options::default()
        },
    )
}

/// JSON tokenization, then compression
pub fn compress_json(input: &[u8]) -> Vec<u8> {
    compress_with(input, &Options::with_preprocess(Preprocess::Json))
}

/// UTF-8 continuation delta coding, then compression
pub fn compress_utf8(input: &[u8]) -> Vec<u8> {
    compress_with(input, &Options::with_preprocess(Preprocess::Utf8))
}

/// JSON tokenization, then UTF-8 delta coding, then compression
pub fn compress_advanced(input: &[u8]) -> Vec<u8> {
    compress_with(input, &Options::with_preprocess(Preprocess::Advanced))
}

/// Compress data with options
pub fn compress_with(input: &[u8], opts: &Options) -> Vec<u8> {
    let transformed = match opts.preprocess {
        Preprocess::None => None,
        Preprocess::Json => Some(json::preprocess(input)),
        Preprocess::Utf8 => Some(utf8::delta_encode(input)),
        Preprocess::Advanced => Some(utf8::delta_encode(&json::preprocess(input))),
    };
    let data = transformed.as_deref().unwrap_or(input);

    let mut compressor = Compressor::new(opts.level);
    let output = compressor.compress_block(data);

    debug!(
        level = ?opts.level,
        preprocess = ?opts.preprocess,
        input_len = input.len(),
        preprocessed_len = data.len(),
        output_len = output.len(),
        "compressed buffer"
    );
    output
}

/// Reusable whole-buffer compressor
///
/// Holds the hash table so repeated calls reuse its allocation. The table is
/// cleared at the start of every call; nothing carries over between buffers.
pub struct Compressor {
    level: Level,
    table: HashTable,
}

impl Compressor {
    pub fn new(level: Level) -> Self {
        Self {
            level,
            table: HashTable::new(),
        }
    }

    pub fn level(&self) -> Level {
        self.level
    }

    /// Compress one buffer into a complete block stream
    pub fn compress_block(&mut self, input: &[u8]) -> Vec<u8> {
        if input.is_empty() {
            return Vec::new();
        }

        self.table.reset();

        match self.level {
            Level::Thorough => encode(Thorough, &mut self.table, input, MatchEncoding::Extended),
            Level::Fast => encode(Fast, &mut self.table, input, MatchEncoding::ShortOnly),
        }
    }
}

fn encode<F: MatchFinder>(
    finder: F,
    table: &mut HashTable,
    input: &[u8],
    encoding: MatchEncoding,
) -> Vec<u8> {
    let mut output = Vec::with_capacity(input.len() + input.len() / 8);
    let mut literals = LiteralBuffer::new();
    let mut pos = 0;

    while pos < input.len() {
        match finder.find(table, input, pos) {
            Some(found) if found.length >= MIN_ACCEPTED_MATCH => {
                literals.flush(&mut output);
                write_match(&mut output, found.length, found.distance, encoding);
                pos += found.length;
            }
            _ => {
                literals.push(input[pos], &mut output);
                pos += 1;
            }
        }
    }

    literals.flush(&mut output);
    output
}
