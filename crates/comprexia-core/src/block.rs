//! Block format for Comprexia
//!
//! A compressed stream is a bare sequence of blocks. There is no outer
//! header, length field or checksum: the stream ends where the buffer ends.
//!
//! ```text
//! Literal:
//! ┌──────────┬──────────────┐
//! │ 0ccccccc │ count bytes  │      count = 1..=127
//! └──────────┴──────────────┘
//!
//! Short match:
//! ┌──────────┬──────────────┐
//! │ 1lllllll │ distance     │      length = l + 3 (header != 0xFF)
//! │ 1 byte   │ 2 bytes LE   │
//! └──────────┴──────────────┘
//!
//! Extended match:
//! ┌──────────┬──────────────┬──────────────┐
//! │ 0xFF     │ length       │ distance     │
//! │ 1 byte   │ 2 bytes LE   │ 2 bytes LE   │
//! └──────────┴──────────────┴──────────────┘
//! ```

use crate::{Error, Result};

/// Longest literal run a single block can carry
pub const MAX_LITERAL_RUN: usize = 127;

/// Shortest match any block can describe
pub const MIN_MATCH: usize = 3;

/// Longest match a Short block carries. `0x80 | 127` is the Extended header,
/// so the last short length slot is never used.
pub const MAX_SHORT_MATCH: usize = 129;

/// Longest match an Extended block carries
pub const MAX_EXTENDED_MATCH: usize = u16::MAX as usize;

/// Largest back-reference distance (2-byte field)
pub const MAX_DISTANCE: usize = u16::MAX as usize;

/// Header byte of an Extended match block
pub const EXTENDED_HEADER: u8 = 0xFF;

const MATCH_FLAG: u8 = 0x80;

/// A single block of the compressed stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Block<'a> {
    /// Raw bytes copied to the output
    Literal(&'a [u8]),
    /// Back-reference with a length packed into the header
    Short { length: usize, distance: usize },
    /// Back-reference with a 2-byte length field
    Extended { length: usize, distance: usize },
}

impl Block<'_> {
    /// Append the encoded block to `output`
    pub fn write_to(&self, output: &mut Vec<u8>) {
        match *self {
            Block::Literal(bytes) => {
                debug_assert!(bytes.len() <= MAX_LITERAL_RUN);
                output.push(bytes.len() as u8);
                output.extend_from_slice(bytes);
            }
            Block::Short { length, distance } => {
                debug_assert!((MIN_MATCH..=MAX_SHORT_MATCH).contains(&length));
                debug_assert!((1..=MAX_DISTANCE).contains(&distance));
                output.push(MATCH_FLAG | (length - MIN_MATCH) as u8);
                output.extend_from_slice(&(distance as u16).to_le_bytes());
            }
            Block::Extended { length, distance } => {
                debug_assert!((MIN_MATCH..=MAX_EXTENDED_MATCH).contains(&length));
                debug_assert!((1..=MAX_DISTANCE).contains(&distance));
                output.push(EXTENDED_HEADER);
                output.extend_from_slice(&(length as u16).to_le_bytes());
                output.extend_from_slice(&(distance as u16).to_le_bytes());
            }
        }
    }

    /// Number of bytes the block expands to when decoded
    pub fn decoded_len(&self) -> usize {
        match *self {
            Block::Literal(bytes) => bytes.len(),
            Block::Short { length, .. } | Block::Extended { length, .. } => length,
        }
    }
}

/// Iterator over the blocks of an encoded stream
///
/// Yields an error and then stops when a header declares more bytes than
/// remain in the input.
pub struct BlockReader<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> BlockReader<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        Self { input, pos: 0 }
    }

    /// Offset of the next header byte
    pub fn position(&self) -> usize {
        self.pos
    }

    fn take(&mut self, offset: usize, needed: usize) -> Result<&'a [u8]> {
        let remaining = self.input.len() - self.pos;
        if needed > remaining {
            return Err(Error::TruncatedStream {
                offset,
                needed,
                remaining,
            });
        }
        let bytes = &self.input[self.pos..self.pos + needed];
        self.pos += needed;
        Ok(bytes)
    }

    fn read_block(&mut self) -> Result<Block<'a>> {
        let offset = self.pos;
        let header = self.input[self.pos];
        self.pos += 1;

        if header & MATCH_FLAG == 0 {
            return Ok(Block::Literal(self.take(offset, header as usize)?));
        }

        if header == EXTENDED_HEADER {
            let fields = self.take(offset, 4)?;
            let length = u16::from_le_bytes([fields[0], fields[1]]) as usize;
            let distance = u16::from_le_bytes([fields[2], fields[3]]) as usize;
            if length < MIN_MATCH {
                return Err(Error::InvalidMatchLength { offset, length });
            }
            return Ok(Block::Extended { length, distance });
        }

        let fields = self.take(offset, 2)?;
        Ok(Block::Short {
            length: (header & !MATCH_FLAG) as usize + MIN_MATCH,
            distance: u16::from_le_bytes([fields[0], fields[1]]) as usize,
        })
    }
}

impl<'a> Iterator for BlockReader<'a> {
    type Item = Result<Block<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.input.len() {
            return None;
        }
        let result = self.read_block();
        if result.is_err() {
            self.pos = self.input.len();
        }
        Some(result)
    }
}

/// Pending literal run
///
/// Flushed as a Literal block when it reaches [`MAX_LITERAL_RUN`] bytes or
/// when the caller accepts a match.
#[derive(Debug, Clone)]
pub struct LiteralBuffer {
    bytes: Vec<u8>,
}

impl LiteralBuffer {
    pub fn new() -> Self {
        Self {
            bytes: Vec::with_capacity(MAX_LITERAL_RUN),
        }
    }

    /// Buffer one literal byte, flushing into `output` once the run is full
    #[inline]
    pub fn push(&mut self, byte: u8, output: &mut Vec<u8>) {
        self.bytes.push(byte);
        if self.bytes.len() == MAX_LITERAL_RUN {
            self.flush(output);
        }
    }

    /// Emit the pending run, if any
    pub fn flush(&mut self, output: &mut Vec<u8>) {
        if !self.bytes.is_empty() {
            Block::Literal(&self.bytes).write_to(output);
            self.bytes.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl Default for LiteralBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Which match headers an encoder may emit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchEncoding {
    /// Matches longer than [`MAX_SHORT_MATCH`] use one Extended block
    Extended,
    /// Every match is split into Short blocks
    ShortOnly,
}

/// Emit a match, splitting it into as many blocks as the encoding needs.
/// Every segment restates the same distance.
pub fn write_match(output: &mut Vec<u8>, length: usize, distance: usize, encoding: MatchEncoding) {
    debug_assert!(length >= MIN_MATCH);
    let cap = match encoding {
        MatchEncoding::Extended => MAX_EXTENDED_MATCH,
        MatchEncoding::ShortOnly => MAX_SHORT_MATCH,
    };

    let mut remaining = length;
    while remaining > 0 {
        let take = segment_len(remaining, cap);
        let block = if take > MAX_SHORT_MATCH {
            Block::Extended {
                length: take,
                distance,
            }
        } else {
            Block::Short {
                length: take,
                distance,
            }
        };
        block.write_to(output);
        remaining -= take;
    }
}

/// Length of the next segment. Never leaves a tail shorter than a match.
#[inline]
fn segment_len(remaining: usize, cap: usize) -> usize {
    if remaining <= cap {
        remaining
    } else if remaining - cap < MIN_MATCH {
        remaining - MIN_MATCH
    } else {
        cap
    }
}
