//! Morse transcoding: character ⇄ dot/dash code, plus a streaming decoder.
//!
//! Pure logic, no hardware dependencies. Fully testable on host.
//!
//! # Code representation
//!
//! A [`SymbolCode`] packs up to 5 symbols into one byte with a sentinel bit
//! above the most significant symbol:
//!
//! ```text
//! 'a' = .-   → 0b0000_0101   (sentinel 1, then dot=0, dash=1)
//! '0' = ----- → 0b0011_1111
//! ```
//!
//! The whole table is built at compile time from the literal dot/dash
//! strings. A malformed or duplicated entry fails the build.

use core::fmt;

use crate::error::MorseError;

/// Longest supported code (digits use 5 symbols).
pub const MAX_SYMBOLS: usize = 5;

/// Character produced for codes not in the table.
pub const UNKNOWN_CHAR: char = '?';

/// Number of encodable characters (`a-z`, `0-9`).
pub const ALPHABET_LEN: usize = 36;

/// Wire byte for a dot.
pub const DOT_BYTE: u8 = b'.';
/// Wire byte for a dash.
pub const DASH_BYTE: u8 = b'-';
/// Wire byte terminating a character (a run of two or more ends a word).
pub const TERMINATOR_BYTE: u8 = b' ';

/// Index `i` holds the code of `ALPHABET[i]`.
const ALPHABET: &[u8; ALPHABET_LEN] = b"abcdefghijklmnopqrstuvwxyz0123456789";

const CODES: [&str; ALPHABET_LEN] = [
    ".-", "-...", "-.-.", "-..", ".", "..-.", "--.", "....", "..", ".---", "-.-", ".-..", "--",
    "-.", "---", ".--.", "--.-", ".-.", "...", "-", "..-", "...-", ".--", "-..-", "-.--", "--..",
    "-----", ".----", "..---", "...--", "....-", ".....", "-....", "--...", "---..", "----.",
];

/// One keying element.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Symbol {
    Dot,
    Dash,
}

impl Symbol {
    /// ASCII form used on the serial link.
    #[inline]
    pub fn as_byte(self) -> u8 {
        match self {
            Symbol::Dot => DOT_BYTE,
            Symbol::Dash => DASH_BYTE,
        }
    }

    #[inline]
    fn bit(self) -> u8 {
        match self {
            Symbol::Dot => 0,
            Symbol::Dash => 1,
        }
    }
}

/// Compact dot/dash sequence for one character.
///
/// Invariant: length is in `1..=MAX_SYMBOLS`, enforced by every constructor.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SymbolCode(u8);

impl SymbolCode {
    /// Build a code from a slice of symbols.
    ///
    /// Returns `None` for an empty slice or more than [`MAX_SYMBOLS`] symbols.
    pub fn from_symbols(symbols: &[Symbol]) -> Option<Self> {
        if symbols.is_empty() || symbols.len() > MAX_SYMBOLS {
            return None;
        }
        let mut raw = 1u8;
        for s in symbols {
            raw = (raw << 1) | s.bit();
        }
        Some(Self(raw))
    }

    /// Parse `.`/`-` text. Usable in const context.
    const fn parse(text: &str) -> Option<Self> {
        let bytes = text.as_bytes();
        if bytes.is_empty() || bytes.len() > MAX_SYMBOLS {
            return None;
        }
        let mut raw = 1u8;
        let mut i = 0;
        while i < bytes.len() {
            let bit = match bytes[i] {
                DOT_BYTE => 0,
                DASH_BYTE => 1,
                _ => return None,
            };
            raw = (raw << 1) | bit;
            i += 1;
        }
        Some(Self(raw))
    }

    /// Raw sentinel-encoded byte.
    #[inline]
    pub const fn raw(self) -> u8 {
        self.0
    }

    /// Number of symbols.
    #[inline]
    #[allow(clippy::len_without_is_empty)]
    pub const fn len(self) -> usize {
        // Position of the sentinel bit.
        (7 - self.0.leading_zeros()) as usize
    }

    /// Symbols in transmission order (most significant first).
    pub fn symbols(self) -> impl Iterator<Item = Symbol> {
        let len = self.len();
        (0..len).rev().map(move |shift| {
            if (self.0 >> shift) & 1 == 1 {
                Symbol::Dash
            } else {
                Symbol::Dot
            }
        })
    }
}

impl fmt::Display for SymbolCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for s in self.symbols() {
            let c = match s {
                Symbol::Dot => '.',
                Symbol::Dash => '-',
            };
            fmt::Write::write_char(f, c)?;
        }
        Ok(())
    }
}

impl fmt::Debug for SymbolCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SymbolCode({})", self)
    }
}

/// Immutable bidirectional code table.
///
/// `by_index[i]` is the code of the i-th alphabet character; `by_code` is
/// indexed by the raw sentinel byte (max 0b11_1111) and holds the ASCII
/// character or 0.
pub struct CodeTable {
    by_index: [SymbolCode; ALPHABET_LEN],
    by_code: [u8; 64],
}

impl CodeTable {
    /// Build and validate the table. Panics (at compile time when used in a
    /// const) on malformed or duplicate codes.
    const fn build() -> Self {
        let mut by_index = [SymbolCode(0); ALPHABET_LEN];
        let mut by_code = [0u8; 64];
        let mut i = 0;
        while i < ALPHABET_LEN {
            let code = match SymbolCode::parse(CODES[i]) {
                Some(code) => code,
                None => panic!("malformed morse code in table"),
            };
            let slot = code.0 as usize;
            if by_code[slot] != 0 {
                panic!("duplicate morse code in table");
            }
            by_code[slot] = ALPHABET[i];
            by_index[i] = code;
            i += 1;
        }
        Self { by_index, by_code }
    }

    /// Code for a supported character.
    pub fn encode(&self, c: char) -> Result<SymbolCode, MorseError> {
        let lower = c.to_ascii_lowercase();
        let index = match lower {
            'a'..='z' => lower as usize - 'a' as usize,
            '0'..='9' => 26 + (lower as usize - '0' as usize),
            _ => return Err(MorseError::UnsupportedCharacter(c)),
        };
        Ok(self.by_index[index])
    }

    /// Character for a code, if the code is in the table.
    pub fn decode(&self, code: SymbolCode) -> Option<char> {
        match self.by_code.get(code.0 as usize) {
            Some(&0) | None => None,
            Some(&c) => Some(c as char),
        }
    }

    /// All `(character, code)` pairs in alphabet order.
    pub fn entries(&self) -> impl Iterator<Item = (char, SymbolCode)> + '_ {
        ALPHABET
            .iter()
            .zip(self.by_index.iter())
            .map(|(&c, &code)| (c as char, code))
    }
}

/// The process-wide code table. Read-only, no synchronization needed.
pub static CODE_TABLE: CodeTable = CodeTable::build();

/// Encode one character.
#[inline]
pub fn encode(c: char) -> Result<SymbolCode, MorseError> {
    CODE_TABLE.encode(c)
}

/// Decode one complete code.
#[inline]
pub fn decode(code: SymbolCode) -> Option<char> {
    CODE_TABLE.decode(code)
}

/// Input to the streaming decoder.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StreamSymbol {
    Dot,
    Dash,
    /// End of character; a run of two or more marks a word boundary.
    Terminator,
}

impl From<Symbol> for StreamSymbol {
    fn from(s: Symbol) -> Self {
        match s {
            Symbol::Dot => StreamSymbol::Dot,
            Symbol::Dash => StreamSymbol::Dash,
        }
    }
}

/// Result of feeding one symbol or byte to the decoder.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecodeOutcome {
    /// Still accumulating (or framing byte consumed).
    Pending,
    /// A terminator closed a character. Unknown codes yield [`UNKNOWN_CHAR`].
    CharacterComplete(char),
    /// Terminator with nothing accumulated: the gap between words.
    WordBoundary,
    /// Byte that is neither a symbol, a terminator nor framing. Ignored.
    Noise(u8),
}

/// Streaming decoder state for one symbol stream.
///
/// Owned by exactly one consumer; resets itself after each character.
#[derive(Clone, Debug)]
pub struct MorseDecoder {
    code: u8,
    len: usize,
    overflowed: bool,
    terminator_run: u8,
}

impl MorseDecoder {
    pub const fn new() -> Self {
        Self {
            code: 1,
            len: 0,
            overflowed: false,
            terminator_run: 0,
        }
    }

    /// Feed one symbol.
    pub fn feed(&mut self, symbol: StreamSymbol) -> DecodeOutcome {
        match symbol {
            StreamSymbol::Dot => self.push(Symbol::Dot),
            StreamSymbol::Dash => self.push(Symbol::Dash),
            StreamSymbol::Terminator => self.terminate(),
        }
    }

    /// Feed one byte from the serial link.
    ///
    /// `\r`, `\n` and NUL are link framing and never affect decoding.
    pub fn feed_byte(&mut self, byte: u8) -> DecodeOutcome {
        match byte {
            DOT_BYTE => self.feed(StreamSymbol::Dot),
            DASH_BYTE => self.feed(StreamSymbol::Dash),
            TERMINATOR_BYTE => self.feed(StreamSymbol::Terminator),
            b'\r' | b'\n' | 0 => DecodeOutcome::Pending,
            other => DecodeOutcome::Noise(other),
        }
    }

    /// Symbols accumulated for the current character.
    #[inline]
    pub fn pending_len(&self) -> usize {
        self.len
    }

    /// True once more than [`MAX_SYMBOLS`] arrived for the current character.
    #[inline]
    pub fn is_overflowed(&self) -> bool {
        self.overflowed
    }

    /// Discard the partial character.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    fn push(&mut self, symbol: Symbol) -> DecodeOutcome {
        self.terminator_run = 0;
        if self.len >= MAX_SYMBOLS {
            // TooLong: swallow the rest, resolve as unknown at the terminator.
            self.overflowed = true;
            return DecodeOutcome::Pending;
        }
        self.code = (self.code << 1) | symbol.bit();
        self.len += 1;
        DecodeOutcome::Pending
    }

    fn terminate(&mut self) -> DecodeOutcome {
        self.terminator_run = self.terminator_run.saturating_add(1);

        if self.len == 0 {
            return if self.terminator_run > 1 {
                DecodeOutcome::WordBoundary
            } else {
                DecodeOutcome::Pending
            };
        }

        let c = if self.overflowed {
            UNKNOWN_CHAR
        } else {
            decode(SymbolCode(self.code)).unwrap_or(UNKNOWN_CHAR)
        };

        self.code = 1;
        self.len = 0;
        self.overflowed = false;
        DecodeOutcome::CharacterComplete(c)
    }
}

impl Default for MorseDecoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel_layout() {
        let a = encode('a').unwrap();
        assert_eq!(a.raw(), 0b101);
        assert_eq!(a.len(), 2);

        let zero = encode('0').unwrap();
        assert_eq!(zero.raw(), 0b11_1111);
        assert_eq!(zero.len(), 5);
    }

    #[test]
    fn test_symbols_order() {
        let b = encode('b').unwrap();
        let symbols: std::vec::Vec<Symbol> = b.symbols().collect();
        assert_eq!(
            symbols,
            [Symbol::Dash, Symbol::Dot, Symbol::Dot, Symbol::Dot]
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(std::format!("{}", encode('q').unwrap()), "--.-");
        assert_eq!(std::format!("{}", encode('5').unwrap()), ".....");
    }

    #[test]
    fn test_uppercase_folds() {
        assert_eq!(encode('K').unwrap(), encode('k').unwrap());
    }

    #[test]
    fn test_unsupported_character() {
        assert_eq!(encode('!'), Err(MorseError::UnsupportedCharacter('!')));
        assert_eq!(encode(' '), Err(MorseError::UnsupportedCharacter(' ')));
        assert_eq!(encode('é'), Err(MorseError::UnsupportedCharacter('é')));
    }

    #[test]
    fn test_from_symbols_bounds() {
        assert!(SymbolCode::from_symbols(&[]).is_none());
        assert!(SymbolCode::from_symbols(&[Symbol::Dot; 6]).is_none());
        assert_eq!(
            SymbolCode::from_symbols(&[Symbol::Dot, Symbol::Dash]),
            Some(encode('a').unwrap())
        );
    }

    #[test]
    fn test_decode_unknown_code() {
        // ..-- is not assigned
        let code = SymbolCode::from_symbols(&[Symbol::Dot, Symbol::Dot, Symbol::Dash, Symbol::Dash])
            .unwrap();
        assert_eq!(decode(code), None);
    }

    #[test]
    fn test_decoder_single_character() {
        let mut dec = MorseDecoder::new();
        assert_eq!(dec.feed(StreamSymbol::Dot), DecodeOutcome::Pending);
        assert_eq!(dec.feed(StreamSymbol::Dash), DecodeOutcome::Pending);
        assert_eq!(
            dec.feed(StreamSymbol::Terminator),
            DecodeOutcome::CharacterComplete('a')
        );
        assert_eq!(dec.pending_len(), 0);
    }

    #[test]
    fn test_decoder_too_long_resolves_unknown() {
        let mut dec = MorseDecoder::new();
        for _ in 0..7 {
            dec.feed(StreamSymbol::Dot);
        }
        assert!(dec.is_overflowed());
        assert_eq!(
            dec.feed(StreamSymbol::Terminator),
            DecodeOutcome::CharacterComplete(UNKNOWN_CHAR)
        );

        // Next character decodes normally
        dec.feed(StreamSymbol::Dash);
        assert_eq!(
            dec.feed(StreamSymbol::Terminator),
            DecodeOutcome::CharacterComplete('t')
        );
    }

    #[test]
    fn test_decoder_word_boundary() {
        let mut dec = MorseDecoder::new();
        dec.feed(StreamSymbol::Dot);
        assert_eq!(
            dec.feed(StreamSymbol::Terminator),
            DecodeOutcome::CharacterComplete('e')
        );
        assert_eq!(dec.feed(StreamSymbol::Terminator), DecodeOutcome::WordBoundary);
        assert_eq!(dec.feed(StreamSymbol::Terminator), DecodeOutcome::WordBoundary);
    }

    #[test]
    fn test_leading_terminator_is_pending() {
        let mut dec = MorseDecoder::new();
        assert_eq!(dec.feed(StreamSymbol::Terminator), DecodeOutcome::Pending);
    }

    #[test]
    fn test_feed_byte_framing() {
        let mut dec = MorseDecoder::new();
        for &b in b"-\r\n.\r\n\0" {
            assert_eq!(dec.feed_byte(b), DecodeOutcome::Pending);
        }
        assert_eq!(dec.feed_byte(b'x'), DecodeOutcome::Noise(b'x'));
        assert_eq!(dec.feed_byte(b' '), DecodeOutcome::CharacterComplete('n'));
    }
}
