//! JSON structural tokenization
//!
//! Structural characters and the `true`/`false`/`null` literals become single
//! control bytes in `0xF0..=0xF9`, insignificant whitespace is dropped, and
//! UTF-8 continuation runs are delta-coded. The inverse needs no string
//! tracking: control bytes live at `0xF0` and above, coded continuation bytes
//! in `0x80..0xC0`, and the two ranges never overlap.
//!
//! Raw payload bytes `0xF0` and above (4-byte UTF-8 lead bytes, mostly) are
//! written behind [`Token::Escape`] so they cannot be read back as tokens.

use super::utf8::{delta_code, delta_restore, is_continuation};
use crate::{Error, Result};

/// Lowest control byte
pub const TOKEN_BASE: u8 = 0xF0;

/// Control bytes of the token stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Token {
    /// Object start `{`
    ObjectStart = 0xF0,
    /// Object end `}`
    ObjectEnd = 0xF1,
    /// Array start `[`
    ArrayStart = 0xF2,
    /// Array end `]`
    ArrayEnd = 0xF3,
    /// Colon `:`
    Colon = 0xF4,
    /// Comma `,`
    Comma = 0xF5,
    /// Quote `"`, opening or closing
    Quote = 0xF6,
    /// Boolean true
    True = 0xF7,
    /// Boolean false
    False = 0xF8,
    /// Null
    Null = 0xF9,
    /// The next byte is a raw payload byte
    Escape = 0xFA,
}

const KEYWORDS: [Token; 3] = [Token::True, Token::False, Token::Null];

impl Token {
    pub const fn byte(self) -> u8 {
        self as u8
    }

    pub fn from_byte(byte: u8) -> Option<Self> {
        let token = match byte {
            0xF0 => Token::ObjectStart,
            0xF1 => Token::ObjectEnd,
            0xF2 => Token::ArrayStart,
            0xF3 => Token::ArrayEnd,
            0xF4 => Token::Colon,
            0xF5 => Token::Comma,
            0xF6 => Token::Quote,
            0xF7 => Token::True,
            0xF8 => Token::False,
            0xF9 => Token::Null,
            0xFA => Token::Escape,
            _ => return None,
        };
        Some(token)
    }

    /// JSON text the token stands for
    pub fn spelling(self) -> &'static [u8] {
        match self {
            Token::ObjectStart => b"{",
            Token::ObjectEnd => b"}",
            Token::ArrayStart => b"[",
            Token::ArrayEnd => b"]",
            Token::Colon => b":",
            Token::Comma => b",",
            Token::Quote => b"\"",
            Token::True => b"true",
            Token::False => b"false",
            Token::Null => b"null",
            Token::Escape => b"",
        }
    }
}

/// Tokenize JSON text. Whitespace outside strings is dropped.
///
/// Any input is accepted; bytes that are not JSON structure pass through as
/// payload, so `postprocess(preprocess(x))` is `x` without that whitespace.
pub fn preprocess(input: &[u8]) -> Vec<u8> {
    Preprocessor::new(input).run()
}

struct Preprocessor<'a> {
    input: &'a [u8],
    pos: usize,
    in_string: bool,
    /// Last byte the inverse will have written when it reaches this point
    previous: Option<u8>,
    output: Vec<u8>,
}

impl<'a> Preprocessor<'a> {
    fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            pos: 0,
            in_string: false,
            previous: None,
            output: Vec::with_capacity(input.len()),
        }
    }

    fn run(mut self) -> Vec<u8> {
        while self.pos < self.input.len() {
            if self.in_string {
                self.step_string();
            } else {
                self.step_structure();
            }
        }
        self.output
    }

    fn step_string(&mut self) {
        let byte = self.input[self.pos];
        match byte {
            b'"' => {
                self.in_string = false;
                self.emit_token(Token::Quote);
                self.pos += 1;
            }
            b'\\' => {
                // The escaped byte never closes the string, `\"` included
                self.emit_payload(byte);
                match self.input.get(self.pos + 1) {
                    Some(&escaped) => {
                        self.emit_payload(escaped);
                        self.pos += 2;
                    }
                    None => self.pos += 1,
                }
            }
            _ => {
                self.emit_payload(byte);
                self.pos += 1;
            }
        }
    }

    fn step_structure(&mut self) {
        let byte = self.input[self.pos];
        let token = match byte {
            b'{' => Token::ObjectStart,
            b'}' => Token::ObjectEnd,
            b'[' => Token::ArrayStart,
            b']' => Token::ArrayEnd,
            b':' => Token::Colon,
            b',' => Token::Comma,
            b'"' => {
                self.in_string = true;
                Token::Quote
            }
            b' ' | b'\t' | b'\n' | b'\r' => {
                self.pos += 1;
                return;
            }
            _ => match self.keyword() {
                Some(keyword) => keyword,
                None => {
                    self.emit_payload(byte);
                    self.pos += 1;
                    return;
                }
            },
        };

        self.emit_token(token);
        self.pos += token.spelling().len();
    }

    fn keyword(&self) -> Option<Token> {
        let rest = &self.input[self.pos..];
        KEYWORDS
            .into_iter()
            .find(|keyword| rest.starts_with(keyword.spelling()))
    }

    fn emit_token(&mut self, token: Token) {
        self.output.push(token.byte());
        self.previous = token.spelling().last().copied();
    }

    fn emit_payload(&mut self, byte: u8) {
        if byte >= TOKEN_BASE {
            self.output.push(Token::Escape.byte());
            self.output.push(byte);
        } else {
            match self.previous {
                Some(previous) if is_continuation(previous) && is_continuation(byte) => {
                    self.output.push(delta_code(previous, byte));
                }
                _ => self.output.push(byte),
            }
        }
        self.previous = Some(byte);
    }
}

/// Expand a token stream back into JSON text
pub fn postprocess(input: &[u8]) -> Result<Vec<u8>> {
    let mut output: Vec<u8> = Vec::with_capacity(input.len() + input.len() / 2);
    let mut pos = 0;

    while pos < input.len() {
        let byte = input[pos];

        if byte >= TOKEN_BASE {
            match Token::from_byte(byte) {
                Some(Token::Escape) => {
                    let raw = *input
                        .get(pos + 1)
                        .ok_or(Error::TruncatedEscape { offset: pos })?;
                    output.push(raw);
                    pos += 2;
                    continue;
                }
                Some(token) => output.extend_from_slice(token.spelling()),
                None => return Err(Error::InvalidToken { offset: pos, byte }),
            }
        } else {
            let restored = match output.last() {
                Some(&previous) if is_continuation(previous) && is_continuation(byte) => {
                    delta_restore(previous, byte)
                }
                _ => byte,
            };
            output.push(restored);
        }

        pos += 1;
    }

    Ok(output)
}
