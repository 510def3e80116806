//! Morse codec tests: table, encoder and streaming decoder

use std::collections::HashSet;

use tilt_morse_keyer::morse::{
    self, DecodeOutcome, MorseDecoder, StreamSymbol, Symbol, ALPHABET_LEN, CODE_TABLE,
};
use tilt_morse_keyer::MorseError;

fn feed_code(decoder: &mut MorseDecoder, c: char) -> DecodeOutcome {
    let code = morse::encode(c).unwrap();
    for symbol in code.symbols() {
        assert_eq!(decoder.feed(StreamSymbol::from(symbol)), DecodeOutcome::Pending);
    }
    decoder.feed(StreamSymbol::Terminator)
}

#[test]
fn test_every_character_survives_streaming_decoder() {
    let mut decoder = MorseDecoder::new();
    let alphabet = ('a'..='z').chain('0'..='9');
    let mut count = 0;

    for c in alphabet {
        assert_eq!(feed_code(&mut decoder, c), DecodeOutcome::CharacterComplete(c));
        count += 1;
    }
    assert_eq!(count, ALPHABET_LEN);
}

#[test]
fn test_encode_is_injective() {
    let codes: HashSet<u8> = CODE_TABLE.entries().map(|(_, code)| code.raw()).collect();
    assert_eq!(codes.len(), ALPHABET_LEN);
}

#[test]
fn test_encode_folds_case() {
    assert_eq!(morse::encode('Q').unwrap(), morse::encode('q').unwrap());
    assert_eq!(morse::encode('Q').unwrap().to_string(), "--.-");
}

#[test]
fn test_encode_rejects_unsupported() {
    assert_eq!(morse::encode('!'), Err(MorseError::UnsupportedCharacter('!')));
    assert_eq!(morse::encode(' '), Err(MorseError::UnsupportedCharacter(' ')));
}

#[test]
fn test_known_codes() {
    assert_eq!(morse::encode('e').unwrap().to_string(), ".");
    assert_eq!(morse::encode('t').unwrap().to_string(), "-");
    assert_eq!(morse::encode('s').unwrap().to_string(), "...");
    assert_eq!(morse::encode('0').unwrap().to_string(), "-----");
    assert_eq!(morse::encode('5').unwrap().to_string(), ".....");
}

#[test]
fn test_decode_scenario_dot_dash_space_space() {
    let mut decoder = MorseDecoder::new();

    assert_eq!(decoder.feed_byte(b'.'), DecodeOutcome::Pending);
    assert_eq!(decoder.feed_byte(b'-'), DecodeOutcome::Pending);
    assert_eq!(decoder.feed_byte(b' '), DecodeOutcome::CharacterComplete('a'));
    assert_eq!(decoder.feed_byte(b' '), DecodeOutcome::WordBoundary);
}

#[test]
fn test_unknown_code_decodes_as_question_mark() {
    // ..-- is not in the table
    let mut decoder = MorseDecoder::new();
    for &b in b"..-- " {
        let outcome = decoder.feed_byte(b);
        if b == b' ' {
            assert_eq!(outcome, DecodeOutcome::CharacterComplete('?'));
        }
    }
}

#[test]
fn test_too_long_resolves_at_terminator() {
    let mut decoder = MorseDecoder::new();
    for _ in 0..7 {
        assert_eq!(decoder.feed(StreamSymbol::Dot), DecodeOutcome::Pending);
    }
    assert!(decoder.is_overflowed());
    assert_eq!(decoder.feed(StreamSymbol::Terminator), DecodeOutcome::CharacterComplete('?'));

    // Decoder is clean afterwards
    assert!(!decoder.is_overflowed());
    assert_eq!(feed_code(&mut decoder, 'k'), DecodeOutcome::CharacterComplete('k'));
}

#[test]
fn test_framing_bytes_ignored() {
    let mut decoder = MorseDecoder::new();
    let mut out = Vec::new();
    for &b in b"-\r\n\0.\r\n\0-\r\n\0.\r\n\0 \r\n\0" {
        match decoder.feed_byte(b) {
            DecodeOutcome::Pending => {}
            other => out.push(other),
        }
    }
    assert_eq!(out, [DecodeOutcome::CharacterComplete('c')]);
}

#[test]
fn test_noise_reported_without_disturbing_character() {
    let mut decoder = MorseDecoder::new();
    assert_eq!(decoder.feed_byte(b'.'), DecodeOutcome::Pending);
    assert_eq!(decoder.feed_byte(b'x'), DecodeOutcome::Noise(b'x'));
    assert_eq!(decoder.feed_byte(b'.'), DecodeOutcome::Pending);
    assert_eq!(decoder.feed_byte(b' '), DecodeOutcome::CharacterComplete('i'));
}

#[test]
fn test_symbol_bytes() {
    assert_eq!(Symbol::Dot.as_byte(), b'.');
    assert_eq!(Symbol::Dash.as_byte(), b'-');
}
