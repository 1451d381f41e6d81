//! UTF-8 continuation-byte delta coding
//!
//! Runs of continuation bytes (`10xxxxxx`) inside multi-byte code points from
//! the same script tend to differ by small amounts. Replacing each byte after
//! the first of a run with its difference from the previous byte turns those
//! runs into a handful of repeated values the match finder can pick up.
//!
//! The difference is taken modulo 64 and stored back in the continuation
//! range, so a coded byte is always a continuation byte and a byte that was
//! copied after a continuation byte never is. That keeps the transform
//! invertible.

/// `10xxxxxx`
#[inline]
pub fn is_continuation(byte: u8) -> bool {
    byte & 0xC0 == 0x80
}

/// Code a continuation byte relative to the continuation byte before it
#[inline]
pub fn delta_code(previous: u8, byte: u8) -> u8 {
    0x80 | (byte.wrapping_sub(previous) & 0x3F)
}

/// Inverse of [`delta_code`]
#[inline]
pub fn delta_restore(previous: u8, code: u8) -> u8 {
    0x80 | (previous.wrapping_add(code) & 0x3F)
}

/// Delta-code every continuation byte that follows another continuation byte.
/// The first byte is always copied.
pub fn delta_encode(input: &[u8]) -> Vec<u8> {
    let mut output = Vec::with_capacity(input.len());
    let Some(&first) = input.first() else {
        return output;
    };
    output.push(first);

    for pair in input.windows(2) {
        let (previous, byte) = (pair[0], pair[1]);
        if is_continuation(byte) && is_continuation(previous) {
            output.push(delta_code(previous, byte));
        } else {
            output.push(byte);
        }
    }

    output
}

/// Inverse of [`delta_encode`]
pub fn delta_decode(input: &[u8]) -> Vec<u8> {
    let mut output: Vec<u8> = Vec::with_capacity(input.len());

    for &code in input {
        let byte = match output.last() {
            Some(&previous) if is_continuation(previous) && is_continuation(code) => {
                delta_restore(previous, code)
            }
            _ => code,
        };
        output.push(byte);
    }

    output
}

/// ASCII uppercase to lowercase. Lossy; not part of any pipeline.
pub fn case_fold(input: &[u8]) -> Vec<u8> {
    input.to_ascii_lowercase()
}
