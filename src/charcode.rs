//! Two-digit character codes of the IBM 650 and zone-punched digits.
//!
//! Memory holds characters as codes 00..99, five to a word. Only a few of
//! the hundred codes have a glyph; the rest decode to [`PLACEHOLDER`].
//!
//! Code layout (tens digit → row):
//! - 00 blank, 18 `.`, 19 `)`, 20 `+`, 28 `$`, 29 `*`, 30 `-`, 31 `/`,
//!   38 `,`, 39 `(`, 48 `=`, 49 `-` (second minus)
//! - 61..69 `A`..`I`, 71..79 `J`..`R`, 82..89 `S`..`Z`
//! - 90..99 `0`..`9`

/// Glyph for codes without a printable character.
pub const PLACEHOLDER: char = '~';
/// Zero digit overpunched with the plus zone (row 12).
pub const PLUS_ZERO: char = '?';
/// Zero digit overpunched with the minus zone (row 11).
pub const MINUS_ZERO: char = '!';

/// Character for a two-digit code. Codes without a glyph give [`PLACEHOLDER`].
pub fn code_to_char(code: u8) -> char {
    match code {
        0 => ' ',
        18 => '.',
        19 => ')',
        20 => '+',
        28 => '$',
        29 => '*',
        30 | 49 => '-',
        31 => '/',
        38 => ',',
        39 => '(',
        48 => '=',
        61..=69 => char::from(b'A' + (code - 61)),
        71..=79 => char::from(b'J' + (code - 71)),
        82..=89 => char::from(b'S' + (code - 82)),
        90..=99 => char::from(b'0' + (code - 90)),
        _ => PLACEHOLDER,
    }
}

/// Two-digit code for a character. Lowercase letters fold to uppercase;
/// anything outside the repertoire, [`PLACEHOLDER`] included, reads as blank.
pub fn char_to_code(ch: char) -> u8 {
    code_of(ch.to_ascii_uppercase()).unwrap_or(0)
}

fn code_of(ch: char) -> Option<u8> {
    let code = match ch {
        ' ' => 0,
        '.' => 18,
        ')' => 19,
        '+' => 20,
        '$' => 28,
        '*' => 29,
        '-' => 30,
        '/' => 31,
        ',' => 38,
        '(' => 39,
        '=' => 48,
        'A'..='I' => 61 + (ch as u8 - b'A'),
        'J'..='R' => 71 + (ch as u8 - b'J'),
        'S'..='Z' => 82 + (ch as u8 - b'S'),
        '0'..='9' => 90 + (ch as u8 - b'0'),
        _ => return None,
    };
    Some(code)
}

/// The characters the machine can store and the printer can print.
pub struct Repertoire;

impl Repertoire {
    /// Exact membership; lowercase letters are not members.
    pub fn contains(ch: char) -> bool {
        code_of(ch).is_some()
    }

    pub fn chars() -> impl Iterator<Item = char> {
        (0..=99u8)
            .map(code_to_char)
            .filter(|&ch| ch != PLACEHOLDER)
    }
}

/// Zone punch layered over a digit column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Zone {
    Unzoned,
    /// Row 12 (Y) punch.
    Plus,
    /// Row 11 (X) punch.
    Minus,
}

/// Card glyph of a digit with an optional zone overpunch.
///
/// # Panics
/// When `digit > 9`.
pub fn digit_with_zone(digit: u8, zone: Zone) -> char {
    assert!(digit <= 9, "digit {digit} outside 0..=9");
    match (zone, digit) {
        (Zone::Unzoned, d) => char::from(b'0' + d),
        (Zone::Plus, 0) => PLUS_ZERO,
        (Zone::Plus, d) => char::from(b'A' + d - 1),
        (Zone::Minus, 0) => MINUS_ZERO,
        (Zone::Minus, d) => char::from(b'J' + d - 1),
    }
}

/// Inverse of [`digit_with_zone`].
pub fn zone_digit(ch: char) -> Option<(u8, Zone)> {
    match ch {
        '0'..='9' => Some((ch as u8 - b'0', Zone::Unzoned)),
        PLUS_ZERO => Some((0, Zone::Plus)),
        'A'..='I' => Some((ch as u8 - b'A' + 1, Zone::Plus)),
        MINUS_ZERO => Some((0, Zone::Minus)),
        'J'..='R' => Some((ch as u8 - b'J' + 1, Zone::Minus)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repertoire_round_trips() {
        for ch in Repertoire::chars() {
            assert_eq!(code_to_char(char_to_code(ch)), ch, "char {ch:?}");
            let lower = ch.to_ascii_lowercase();
            assert_eq!(code_to_char(char_to_code(lower)), ch);
        }
    }

    #[test]
    fn known_codes() {
        assert_eq!(char_to_code('A'), 61);
        assert_eq!(char_to_code('r'), 79);
        assert_eq!(char_to_code('S'), 82);
        assert_eq!(char_to_code('0'), 90);
        assert_eq!(char_to_code('-'), 30);
        assert_eq!(code_to_char(49), '-');
        assert_eq!(char_to_code('#'), 0);
    }

    #[test]
    fn placeholder_is_lossy() {
        assert_eq!(code_to_char(1), PLACEHOLDER);
        assert_ne!(char_to_code(PLACEHOLDER), 1);
        assert_eq!(char_to_code(PLACEHOLDER), 0);
        assert!(!Repertoire::contains(PLACEHOLDER));
        assert_eq!(code_to_char(150), PLACEHOLDER);
    }

    #[test]
    fn zoned_digits() {
        assert_eq!(digit_with_zone(7, Zone::Unzoned), '7');
        assert_eq!(digit_with_zone(0, Zone::Plus), '?');
        assert_eq!(digit_with_zone(1, Zone::Plus), 'A');
        assert_eq!(digit_with_zone(9, Zone::Minus), 'R');
        assert_eq!(digit_with_zone(0, Zone::Minus), '!');
        for zone in [Zone::Unzoned, Zone::Plus, Zone::Minus] {
            for d in 0..=9 {
                assert_eq!(zone_digit(digit_with_zone(d, zone)), Some((d, zone)));
            }
        }
    }

    #[test]
    #[should_panic(expected = "outside 0..=9")]
    fn zoned_digit_out_of_range() {
        digit_with_zone(10, Zone::Plus);
    }
}
