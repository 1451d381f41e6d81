//! Chunked streaming encoder
//!
//! Produces the ordinary block format from input that arrives in pieces.
//! Each chunk is searched on its own: a linear scan of the previous 4096
//! bytes of the same chunk, no hash table, no history from earlier chunks.
//! Candidates start at least [`MIN_MATCH`] bytes back, so a run needs three
//! literals before it can repeat.
//! Only literals that have not filled a block yet carry over, so where the
//! input is split changes the compressed bytes but never the decoded ones.

use std::io::{self, Write};

use tracing::{debug, trace};

use crate::block::{write_match, LiteralBuffer, MatchEncoding, MAX_SHORT_MATCH, MIN_MATCH};
use crate::match_finder::{extend, Match};
use crate::{Error, Result};

/// Bytes of the current chunk searched behind each position
pub const WINDOW_SIZE: usize = 4096;

/// Lifecycle of a [`StreamEncoder`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncoderState {
    /// Created, nothing fed yet
    Idle,
    /// At least one chunk fed
    Accumulating,
    /// `finish` was called; the encoder accepts nothing more
    Finished,
}

/// Create a streaming encoder
pub fn init() -> StreamEncoder {
    StreamEncoder::new()
}

/// Streaming encoder
///
/// Call [`feed_chunk`](Self::feed_chunk) any number of times, then
/// [`finish`](Self::finish) once. Concatenating every returned buffer gives a
/// stream that [`crate::decompress`] turns back into the concatenated input.
#[derive(Debug)]
pub struct StreamEncoder {
    literals: LiteralBuffer,
    state: EncoderState,
    bytes_in: u64,
    bytes_out: u64,
}

impl StreamEncoder {
    pub fn new() -> Self {
        Self {
            literals: LiteralBuffer::new(),
            state: EncoderState::Idle,
            bytes_in: 0,
            bytes_out: 0,
        }
    }

    pub fn state(&self) -> EncoderState {
        self.state
    }

    /// Literal bytes waiting for a match or a full block
    pub fn pending_len(&self) -> usize {
        self.literals.len()
    }

    pub fn bytes_in(&self) -> u64 {
        self.bytes_in
    }

    pub fn bytes_out(&self) -> u64 {
        self.bytes_out
    }

    /// Encode one chunk. The result may be empty when every byte is still
    /// pending as a literal.
    pub fn feed_chunk(&mut self, chunk: &[u8]) -> Result<Vec<u8>> {
        if self.state == EncoderState::Finished {
            return Err(Error::EncoderFinished);
        }
        if self.state == EncoderState::Idle {
            debug!("stream encoder started");
            self.state = EncoderState::Accumulating;
        }

        let mut output = Vec::with_capacity(chunk.len() + chunk.len() / 8);
        let mut pos = 0;

        while pos < chunk.len() {
            match find_local_match(chunk, pos) {
                Some(found) => {
                    self.literals.flush(&mut output);
                    write_match(&mut output, found.length, found.distance, MatchEncoding::ShortOnly);
                    pos += found.length;
                }
                None => {
                    self.literals.push(chunk[pos], &mut output);
                    pos += 1;
                }
            }
        }

        self.bytes_in += chunk.len() as u64;
        self.bytes_out += output.len() as u64;
        trace!(
            chunk_len = chunk.len(),
            output_len = output.len(),
            pending = self.literals.len(),
            "encoded chunk"
        );
        Ok(output)
    }

    /// Flush pending literals and close the encoder
    pub fn finish(&mut self) -> Result<Vec<u8>> {
        if self.state == EncoderState::Finished {
            return Err(Error::EncoderFinished);
        }

        let mut output = Vec::new();
        self.literals.flush(&mut output);
        self.state = EncoderState::Finished;
        self.bytes_out += output.len() as u64;

        debug!(
            bytes_in = self.bytes_in,
            bytes_out = self.bytes_out,
            "stream encoder finished"
        );
        Ok(output)
    }
}

impl Default for StreamEncoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Longest match for `pos` within the window of this chunk, nearest first
/// so equal lengths keep the shortest distance.
fn find_local_match(chunk: &[u8], pos: usize) -> Option<Match> {
    let max_len = (chunk.len() - pos).min(MAX_SHORT_MATCH);
    if max_len < MIN_MATCH || pos < MIN_MATCH {
        return None;
    }

    let window_start = pos.saturating_sub(WINDOW_SIZE);
    let mut best: Option<Match> = None;

    for candidate in (window_start..=pos - MIN_MATCH).rev() {
        let length = extend(chunk, candidate, pos, 0, max_len);
        if length >= MIN_MATCH && best.map_or(true, |b| length > b.length) {
            best = Some(Match {
                length,
                distance: pos - candidate,
            });
            if length == max_len {
                break;
            }
        }
    }

    best
}

/// Writer that compresses everything written to it
///
/// Each `write` call is fed to the encoder as one chunk and the resulting
/// blocks go straight to the inner writer. Call [`finish`](Self::finish) to
/// flush the last literals; dropping the writer without it loses them.
pub struct StreamWriter<W: Write> {
    inner: W,
    encoder: StreamEncoder,
}

impl<W: Write> StreamWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            encoder: StreamEncoder::new(),
        }
    }

    /// Get a reference to the inner writer.
    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    pub fn encoder(&self) -> &StreamEncoder {
        &self.encoder
    }

    /// Finish compression and return the inner writer
    pub fn finish(mut self) -> io::Result<W> {
        let tail = self.encoder.finish().map_err(io::Error::other)?;
        self.inner.write_all(&tail)?;
        self.inner.flush()?;
        Ok(self.inner)
    }
}

impl<W: Write> Write for StreamWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let blocks = self.encoder.feed_chunk(buf).map_err(io::Error::other)?;
        self.inner.write_all(&blocks)?;
        Ok(buf.len())
    }

    /// Flushes the inner writer. Pending literals stay pending until more
    /// input or `finish`.
    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
