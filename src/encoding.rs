use thiserror::Error;

/// Punches of one card column.
///
/// A card has 12 rows: 12, 11 and 0..9. Bits are numbered from the bottom
/// row upwards, so the mask reads top to bottom as written:
/// bit 11 = row 12, bit 10 = row 11, bit 9 = row 0, bit 8 = row 1, ...,
/// bit 0 = row 9. Bits 12..16 are never punched; they only appear in
/// [`INVALID_PUNCH`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PunchMask(pub u16);

/// Mask given to characters that cannot be punched (ASCII control codes,
/// DEL, non-ASCII). It has no character.
pub const INVALID_PUNCH: PunchMask = PunchMask(0xF000);

const ROWS_MASK: u16 = 0x0FFF;
const ZONE_ROWS: u16 = 0x0E00;
const DIGIT_ROWS: u16 = 0x01FF;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error("unsupported character: '{0}' (U+{1:04X})")]
    Unsupported(char, u32),
    #[error("invalid punch pattern")]
    InvalidPunch,
    #[error("punch pattern {0:#05x} has no character")]
    Unmapped(u16),
}

impl std::ops::BitOr for PunchMask {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self::Output {
        PunchMask(self.0 | rhs.0)
    }
}

impl PunchMask {
    pub const BLANK: PunchMask = PunchMask(0);

    /// Whether the row at `position` (0 = row 12 at the top, 11 = row 9 at
    /// the bottom) is punched.
    pub fn punched_at(self, position: usize) -> bool {
        position < 12 && (self.0 >> (11 - position)) & 1 == 1
    }

    pub fn is_valid(self) -> bool {
        self.0 & !ROWS_MASK == 0
    }
}

pub trait PunchEncoding {
    fn name(&self) -> &'static str;
    fn encode_char(&self, ch: char) -> Result<PunchMask, EncodeError>;
    fn decode_punch(&self, mask: PunchMask) -> Result<char, EncodeError>;
    fn is_supported(&self, ch: char) -> bool {
        self.encode_char(ch).is_ok()
    }
}

/// Hollerith code used by the IBM 650 card reader and punch.
///
/// - Digits 0–9: punch the corresponding row
/// - A–I: 12 + 1–9; J–R: 11 + 1–9; S–Z: 0 + 2–9
/// - a–i: 12 + 0 + 1–9; j–r: 12 + 11 + 1–9; s–z: 11 + 0 + 2–9
/// - Space: no punches
/// - Symbols: multi-punch combinations, see [`char_to_punch`]
#[derive(Debug, Default, Clone, Copy)]
pub struct Ibm650Encoding;

impl PunchEncoding for Ibm650Encoding {
    fn name(&self) -> &'static str {
        "IBM650"
    }

    fn encode_char(&self, ch: char) -> Result<PunchMask, EncodeError> {
        match char_to_punch(ch) {
            INVALID_PUNCH => Err(EncodeError::Unsupported(ch, ch as u32)),
            mask => Ok(mask),
        }
    }

    fn decode_punch(&self, mask: PunchMask) -> Result<char, EncodeError> {
        punch_to_char(mask)
    }
}

/// Punch pattern of a character. Total: every character maps either to a
/// printable pattern or to [`INVALID_PUNCH`].
pub fn char_to_punch(ch: char) -> PunchMask {
    match ch {
        '0' => row(0),
        '1'..='9' => row(digit_of(ch, '0')),
        'A'..='I' => zone12() | row(digit_of(ch, 'A') + 1),
        'J'..='R' => zone11() | row(digit_of(ch, 'J') + 1),
        'S'..='Z' => row(0) | row(digit_of(ch, 'S') + 2),
        'a'..='i' => zone12() | row(0) | row(digit_of(ch, 'a') + 1),
        'j'..='r' => zone12() | zone11() | row(digit_of(ch, 'j') + 1),
        's'..='z' => zone11() | row(0) | row(digit_of(ch, 's') + 2),
        ' '..='~' => symbol_to_punch(ch),
        _ => INVALID_PUNCH,
    }
}

/// Character of a punch pattern.
pub fn punch_to_char(mask: PunchMask) -> Result<char, EncodeError> {
    if !mask.is_valid() {
        return Err(EncodeError::InvalidPunch);
    }
    if let Some(ch) = punch_to_symbol(mask) {
        return Ok(ch);
    }
    if mask == row(0) {
        return Ok('0');
    }
    let zones = mask.0 & ZONE_ROWS;
    let digits = mask.0 & DIGIT_ROWS;
    let Some(digit) = single_digit_row(digits) else {
        return Err(EncodeError::Unmapped(mask.0));
    };
    // Z(0) and z(11-0) start at row 2; row 1 under those zones is a symbol.
    let ch = match (zones, digit) {
        (0x000, d) => char::from(b'0' + d),
        (0x800, d) => char::from(b'A' + d - 1),
        (0x400, d) => char::from(b'J' + d - 1),
        (0x200, d) if d >= 2 => char::from(b'S' + d - 2),
        (0xA00, d) => char::from(b'a' + d - 1),
        (0xC00, d) => char::from(b'j' + d - 1),
        (0x600, d) if d >= 2 => char::from(b's' + d - 2),
        _ => return Err(EncodeError::Unmapped(mask.0)),
    };
    Ok(ch)
}

fn symbol_to_punch(ch: char) -> PunchMask {
    let bits = match ch {
        ' ' => 0x000,
        '!' => 0x600,
        '"' => 0x006,
        '#' => 0x282,
        '$' => 0x442,
        '%' => 0x0A2,
        '&' => 0xA00,
        '\'' => 0x022,
        '(' => 0x222,
        ')' => 0x822,
        '*' => 0x422,
        '+' => 0x800,
        ',' => 0x242,
        '-' => 0x400,
        '.' => 0x842,
        '/' => 0x300,
        ':' => 0x012,
        ';' => 0x40A,
        '<' => 0x80A,
        '=' => 0x042,
        '>' => 0x00A,
        '?' => 0x882,
        '@' => 0x092,
        '[' => 0x812,
        '\\' => 0x20A,
        ']' => 0x412,
        '^' => 0x206,
        '_' => 0x082,
        '`' => 0x212,
        '{' => 0x406,
        '|' => 0x806,
        '}' => 0x482,
        '~' => 0x005,
        _ => return INVALID_PUNCH,
    };
    PunchMask(bits)
}

fn punch_to_symbol(mask: PunchMask) -> Option<char> {
    let ch = match mask.0 {
        0x000 => ' ',
        0x600 => '!',
        0x006 => '"',
        0x282 => '#',
        0x442 => '$',
        0x0A2 => '%',
        0xA00 => '&',
        0x022 => '\'',
        0x222 => '(',
        0x822 => ')',
        0x422 => '*',
        0x800 => '+',
        0x242 => ',',
        0x400 => '-',
        0x842 => '.',
        0x300 => '/',
        0x012 => ':',
        0x40A => ';',
        0x80A => '<',
        0x042 => '=',
        0x00A => '>',
        0x882 => '?',
        0x092 => '@',
        0x812 => '[',
        0x20A => '\\',
        0x412 => ']',
        0x206 => '^',
        0x082 => '_',
        0x212 => '`',
        0x406 => '{',
        0x806 => '|',
        0x482 => '}',
        0x005 => '~',
        _ => return None,
    };
    Some(ch)
}

fn digit_of(ch: char, base: char) -> u8 {
    ch as u8 - base as u8
}

/// Digit 1..9 when exactly one of rows 1..9 is punched.
fn single_digit_row(digits: u16) -> Option<u8> {
    if digits.count_ones() != 1 {
        return None;
    }
    Some(9 - digits.trailing_zeros() as u8)
}

/// Bit utilities: row 0..9
fn row(digit: u8) -> PunchMask {
    PunchMask(1u16 << (9 - digit))
}
fn zone11() -> PunchMask {
    PunchMask(1u16 << 10)
}
fn zone12() -> PunchMask {
    PunchMask(1u16 << 11)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn printable() -> impl Iterator<Item = char> {
        (0x20u8..0x7F).map(char::from)
    }

    #[test]
    fn printable_characters_round_trip() {
        for ch in printable() {
            let mask = char_to_punch(ch);
            assert_ne!(mask, INVALID_PUNCH, "{ch:?}");
            assert_eq!(punch_to_char(mask), Ok(ch), "{ch:?} -> {mask:?}");
        }
    }

    #[test]
    fn printable_masks_are_unique() {
        let mut seen = HashMap::new();
        for ch in printable() {
            if let Some(other) = seen.insert(char_to_punch(ch), ch) {
                panic!("{ch:?} and {other:?} share a punch pattern");
            }
        }
    }

    #[test]
    fn control_codes_are_invalid() {
        for code in (0u8..0x20).chain([0x7F]) {
            assert_eq!(char_to_punch(char::from(code)), INVALID_PUNCH);
        }
        assert_eq!(char_to_punch('é'), INVALID_PUNCH);
        assert_eq!(punch_to_char(INVALID_PUNCH), Err(EncodeError::InvalidPunch));
    }

    #[test]
    fn hollerith_rows() {
        assert_eq!(char_to_punch('A'), PunchMask(0x900));
        assert_eq!(char_to_punch('J'), PunchMask(0x500));
        assert_eq!(char_to_punch('Z'), PunchMask(0x201));
        assert_eq!(char_to_punch('0'), PunchMask(0x200));
        assert_eq!(char_to_punch('9'), PunchMask(0x001));
        assert_eq!(char_to_punch('z'), PunchMask(0x601));
        assert!(char_to_punch('A').punched_at(0));
        assert!(char_to_punch('A').punched_at(3));
        assert!(!char_to_punch('A').punched_at(1));
    }

    #[test]
    fn unknown_multi_punch_is_unmapped() {
        assert_eq!(punch_to_char(PunchMask(0xFFF)), Err(EncodeError::Unmapped(0xFFF)));
        assert_eq!(punch_to_char(PunchMask(0x700)), Err(EncodeError::Unmapped(0x700)));
    }

    #[test]
    fn encoder_trait_rejects_controls() {
        let enc = Ibm650Encoding;
        assert_eq!(enc.name(), "IBM650");
        assert!(enc.is_supported('q'));
        assert!(matches!(
            enc.encode_char('\t'),
            Err(EncodeError::Unsupported('\t', 9))
        ));
    }
}
