//! Text encoding for the G0 set (§2.3.5.1.2)
//!
//! Accented letters are sent as SS2, the diacritic, then the base letter.
//! A few symbols have their own SS2 code. Everything else outside ASCII
//! has no representation and is replaced.

use super::codes::SS2;

const GRAVE: u8 = 0x41;
const ACUTE: u8 = 0x42;
const CIRCUMFLEX: u8 = 0x43;
const UMLAUT: u8 = 0x48;
const CEDILLA: u8 = 0x4B;

const POUND_STERLING: u8 = 0x23;
const DOLLAR: u8 = 0x24;
const DEGREE: u8 = 0x30;
const OE_UPPER: u8 = 0x6A;
const OE_LOWER: u8 = 0x7A;
const ESZETT: u8 = 0x7B;

/// Written in place of characters the terminal cannot display
pub const REPLACEMENT: u8 = b'?';

fn accent(c: char) -> Option<(u8, char)> {
    let (diacritic, base) = match c {
        'À' => (GRAVE, 'A'),
        'È' => (GRAVE, 'E'),
        'Ì' => (GRAVE, 'I'),
        'Ò' => (GRAVE, 'O'),
        'Ù' => (GRAVE, 'U'),
        'à' => (GRAVE, 'a'),
        'è' => (GRAVE, 'e'),
        'ì' => (GRAVE, 'i'),
        'ò' => (GRAVE, 'o'),
        'ù' => (GRAVE, 'u'),
        'Á' => (ACUTE, 'A'),
        'É' => (ACUTE, 'E'),
        'Í' => (ACUTE, 'I'),
        'Ó' => (ACUTE, 'O'),
        'Ú' => (ACUTE, 'U'),
        'á' => (ACUTE, 'a'),
        'é' => (ACUTE, 'e'),
        'í' => (ACUTE, 'i'),
        'ó' => (ACUTE, 'o'),
        'ú' => (ACUTE, 'u'),
        'Â' => (CIRCUMFLEX, 'A'),
        'Ê' => (CIRCUMFLEX, 'E'),
        'Î' => (CIRCUMFLEX, 'I'),
        'Ô' => (CIRCUMFLEX, 'O'),
        'Û' => (CIRCUMFLEX, 'U'),
        'â' => (CIRCUMFLEX, 'a'),
        'ê' => (CIRCUMFLEX, 'e'),
        'î' => (CIRCUMFLEX, 'i'),
        'ô' => (CIRCUMFLEX, 'o'),
        'û' => (CIRCUMFLEX, 'u'),
        'Ä' => (UMLAUT, 'A'),
        'Ë' => (UMLAUT, 'E'),
        'Ï' => (UMLAUT, 'I'),
        'Ö' => (UMLAUT, 'O'),
        'Ü' => (UMLAUT, 'U'),
        'ä' => (UMLAUT, 'a'),
        'ë' => (UMLAUT, 'e'),
        'ï' => (UMLAUT, 'i'),
        'ö' => (UMLAUT, 'o'),
        'ü' => (UMLAUT, 'u'),
        'Ç' => (CEDILLA, 'C'),
        'ç' => (CEDILLA, 'c'),
        _ => return None,
    };
    Some((diacritic, base))
}

fn special(c: char) -> Option<u8> {
    match c {
        '£' => Some(POUND_STERLING),
        '$' => Some(DOLLAR),
        '°' | 'º' => Some(DEGREE),
        'Œ' => Some(OE_UPPER),
        'œ' => Some(OE_LOWER),
        'ß' => Some(ESZETT),
        _ => None,
    }
}

/// Appends the terminal encoding of `c` to `out`.
pub fn encode_char(c: char, out: &mut Vec<u8>) {
    if let Some((diacritic, base)) = accent(c) {
        out.extend_from_slice(&[SS2, diacritic, base as u8]);
    } else if let Some(code) = special(c) {
        out.extend_from_slice(&[SS2, code]);
    } else if c.is_ascii() {
        out.push(c as u8);
    } else {
        match c {
            '’' | '‘' => out.push(b'\''),
            '“' | '”' => out.push(b'"'),
            '…' => out.extend_from_slice(b"..."),
            '€' => out.push(b'e'),
            _ => out.push(REPLACEMENT),
        }
    }
}

/// Terminal encoding of `text`.
pub fn encode(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    for c in text.chars() {
        encode_char(c, &mut out);
    }
    out
}
