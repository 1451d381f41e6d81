//! Hash-indexed match finding
//!
//! One slot per distinct 4-byte sequence holding the most recent position it
//! was seen at. Slots are overwritten on every query, match or not, so a
//! repeat is always measured against its latest earlier occurrence. There is
//! no chaining.

use std::collections::HashMap;

use crate::block::MAX_DISTANCE;

/// Bytes hashed per position
pub const HASH_INPUT: usize = 4;

/// The four bytes at `pos`, packed little-endian
#[inline]
fn key4(data: &[u8], pos: usize) -> u32 {
    u32::from_le_bytes([data[pos], data[pos + 1], data[pos + 2], data[pos + 3]])
}

/// Back-reference candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match {
    pub length: usize,
    pub distance: usize,
}

/// Single-slot table keyed by the exact 4-byte sequence
pub struct HashTable {
    slots: HashMap<u32, usize>,
}

impl HashTable {
    pub fn new() -> Self {
        Self {
            slots: HashMap::new(),
        }
    }

    /// Forget every recorded position
    pub fn reset(&mut self) {
        self.slots.clear();
    }

    /// Record `pos` for the sequence starting there and return the previous
    /// position of the same sequence, if it is close enough.
    #[inline]
    fn replace(&mut self, input: &[u8], pos: usize) -> Option<usize> {
        let candidate = self.slots.insert(key4(input, pos), pos)?;
        match pos.checked_sub(candidate) {
            Some(distance) if distance > 0 && distance <= MAX_DISTANCE => Some(candidate),
            _ => None,
        }
    }
}

impl Default for HashTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Proposes a back-reference for a position in a buffer
pub trait MatchFinder {
    /// Longest match the finder will report
    const MAX_MATCH: usize;

    /// Query `pos`, updating `table` with it regardless of the outcome
    fn find(&self, table: &mut HashTable, input: &[u8], pos: usize) -> Option<Match>;
}

/// Verifies each candidate byte by byte and extends up to 258 bytes
#[derive(Debug, Clone, Copy, Default)]
pub struct Thorough;

impl MatchFinder for Thorough {
    const MAX_MATCH: usize = 258;

    fn find(&self, table: &mut HashTable, input: &[u8], pos: usize) -> Option<Match> {
        if pos + HASH_INPUT > input.len() {
            return None;
        }
        let candidate = table.replace(input, pos)?;

        if input[candidate..candidate + HASH_INPUT] != input[pos..pos + HASH_INPUT] {
            return None;
        }

        let max_len = (input.len() - pos).min(Self::MAX_MATCH);
        let length = extend(input, candidate, pos, HASH_INPUT, max_len);
        Some(Match {
            length,
            distance: pos - candidate,
        })
    }
}

/// Single word comparison and a 64-byte extension cap
#[derive(Debug, Clone, Copy, Default)]
pub struct Fast;

impl MatchFinder for Fast {
    const MAX_MATCH: usize = 64;

    fn find(&self, table: &mut HashTable, input: &[u8], pos: usize) -> Option<Match> {
        if pos + HASH_INPUT > input.len() {
            return None;
        }
        let candidate = table.replace(input, pos)?;

        if key4(input, candidate) != key4(input, pos) {
            return None;
        }

        let max_len = (input.len() - pos).min(Self::MAX_MATCH);
        let length = extend(input, candidate, pos, HASH_INPUT, max_len);
        Some(Match {
            length,
            distance: pos - candidate,
        })
    }
}

/// Grow a verified match of `length` bytes up to `max_len`.
/// The source may run into the bytes being matched.
#[inline]
pub(crate) fn extend(input: &[u8], source: usize, pos: usize, mut length: usize, max_len: usize) -> usize {
    while length < max_len && input[source + length] == input[pos + length] {
        length += 1;
    }
    length
}
