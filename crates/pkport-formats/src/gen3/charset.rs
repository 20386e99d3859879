//! The Western Gen 3 character set.

use pkport::tag::TextCodec;

/// Byte that ends a string and pads the rest of its field.
pub const TERMINATOR: u8 = 0xFF;

const PUNCTUATION: [(u8, char); 16] = [
    (0x00, ' '),
    (0xAB, '!'),
    (0xAC, '?'),
    (0xAD, '.'),
    (0xAE, '-'),
    (0xB0, '…'),
    (0xB1, '“'),
    (0xB2, '”'),
    (0xB3, '‘'),
    (0xB4, '’'),
    (0xB5, '♂'),
    (0xB6, '♀'),
    (0xB8, ','),
    (0xB9, '×'),
    (0xBA, '/'),
    (0xF0, ':'),
];

/// Encodes text for English, French, Italian, German and Spanish games.
#[derive(Debug, Clone, Copy, Default)]
pub struct Gen3Charset;

impl TextCodec for Gen3Charset {
    fn encode(&self, c: char) -> Option<u8> {
        let offset = |base: char, first: u8| u8::try_from(u32::from(c) - u32::from(base)).ok().map(|d| first + d);
        match c {
            '0'..='9' => offset('0', 0xA1),
            'A'..='Z' => offset('A', 0xBB),
            'a'..='z' => offset('a', 0xD5),
            _ => PUNCTUATION.iter().find(|&&(_, p)| p == c).map(|&(b, _)| b),
        }
    }

    fn decode(&self, byte: u8) -> Option<char> {
        let shift = |base: char, first: u8| char::from_u32(u32::from(base) + u32::from(byte - first));
        match byte {
            0xA1..=0xAA => shift('0', 0xA1),
            0xBB..=0xD4 => shift('A', 0xBB),
            0xD5..=0xEE => shift('a', 0xD5),
            _ => PUNCTUATION.iter().find(|&&(b, _)| b == byte).map(|&(_, c)| c),
        }
    }

    fn terminator(&self) -> u8 {
        TERMINATOR
    }
}
