//! Block stream decompression

use tracing::{debug, warn};

use crate::block::{Block, BlockReader};
use crate::preprocess::{json, utf8};
use crate::{Error, Options, Preprocess, Result};

/// Decompress a block stream produced by any encoder in this crate
pub fn decompress(input: &[u8]) -> Result<Vec<u8>> {
    decompress_with(input, &Options::default())
}

/// Decompress, then expand JSON tokens
pub fn decompress_json(input: &[u8]) -> Result<Vec<u8>> {
    decompress_with(input, &Options::with_preprocess(Preprocess::Json))
}

/// Decompress, then undo UTF-8 delta coding
pub fn decompress_utf8(input: &[u8]) -> Result<Vec<u8>> {
    decompress_with(input, &Options::with_preprocess(Preprocess::Utf8))
}

/// Decompress, undo UTF-8 delta coding, then expand JSON tokens
pub fn decompress_advanced(input: &[u8]) -> Result<Vec<u8>> {
    decompress_with(input, &Options::with_preprocess(Preprocess::Advanced))
}

/// Decompress data with options. Only `opts.preprocess` matters here; every
/// level produces the same block format.
pub fn decompress_with(input: &[u8], opts: &Options) -> Result<Vec<u8>> {
    let decoded = Decompressor::new().decompress_block(input).inspect_err(|e| {
        warn!(error = %e, input_len = input.len(), "rejected block stream");
    })?;

    let output = match opts.preprocess {
        Preprocess::None => decoded,
        Preprocess::Json => json::postprocess(&decoded)?,
        Preprocess::Utf8 => utf8::delta_decode(&decoded),
        Preprocess::Advanced => json::postprocess(&utf8::delta_decode(&decoded))?,
    };

    debug!(
        preprocess = ?opts.preprocess,
        input_len = input.len(),
        output_len = output.len(),
        "decompressed buffer"
    );
    Ok(output)
}

/// Block stream decoder
///
/// Stateless: every call decodes one complete stream.
#[derive(Debug, Clone, Copy, Default)]
pub struct Decompressor;

impl Decompressor {
    pub fn new() -> Self {
        Self
    }

    /// Decode a whole block stream
    pub fn decompress_block(&self, input: &[u8]) -> Result<Vec<u8>> {
        let mut output = Vec::with_capacity(input.len() * 2);
        self.decompress_to(input, &mut output)?;
        Ok(output)
    }

    /// Decode a whole block stream, appending to `output`. Match distances may
    /// reach back into bytes `output` already held.
    pub fn decompress_to(&self, input: &[u8], output: &mut Vec<u8>) -> Result<()> {
        let mut reader = BlockReader::new(input);

        loop {
            let offset = reader.position();
            let block = match reader.next() {
                Some(block) => block?,
                None => break,
            };

            match block {
                Block::Literal(bytes) => output.extend_from_slice(bytes),
                Block::Short { length, distance } | Block::Extended { length, distance } => {
                    copy_match(output, offset, length, distance)?;
                }
            }
        }

        Ok(())
    }
}

/// Append `length` bytes starting `distance` bytes back.
///
/// Copies one byte at a time in increasing order so a distance shorter than
/// the length repeats the pattern instead of reading unwritten bytes.
fn copy_match(output: &mut Vec<u8>, offset: usize, length: usize, distance: usize) -> Result<()> {
    if distance == 0 || distance > output.len() {
        return Err(Error::MalformedStream {
            offset,
            distance,
            available: output.len(),
        });
    }

    let start = output.len() - distance;
    output.reserve(length);
    for i in 0..length {
        let byte = output[start + i];
        output.push(byte);
    }
    Ok(())
}
