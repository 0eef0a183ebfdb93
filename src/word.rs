//! Ten-digit signed decimal machine words.
//!
//! A [`Word`] keeps its magnitude and its sign apart, so the machine's
//! negative zero is an ordinary value (`magnitude == 0`, [`Sign::Minus`])
//! instead of a reserved constant. Equality includes the sign: `-0 != +0`.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::charcode::{char_to_code, code_to_char};

/// Decimal digits held by one word.
pub const WORD_DIGITS: u32 = 10;
/// Exclusive upper bound of a word magnitude (10^10).
pub const WORD_MODULUS: u64 = 10_000_000_000;
/// Characters packed into one word, two digits each.
pub const CHARS_PER_WORD: usize = 5;

const TOP_DIGIT: u64 = WORD_MODULUS / 10;
const OPCODE_SCALE: u64 = 100_000_000;
const ADDRESS_SCALE: u64 = 10_000;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WordError {
    #[error("magnitude {0} exceeds ten decimal digits")]
    Overflow(u64),
    #[error("field '{text}' does not fit in {width} digits")]
    FieldOverflow { text: String, width: u32 },
    #[error("unexpected input '{0}' after word")]
    TrailingInput(String),
}

/// Sign of a word. Zero magnitude may carry either sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Sign {
    #[default]
    Plus,
    Minus,
}

impl Sign {
    pub fn is_negative(self) -> bool {
        matches!(self, Sign::Minus)
    }

    /// Trailing glyph used by listings.
    pub fn glyph(self) -> char {
        match self {
            Sign::Plus => '+',
            Sign::Minus => '-',
        }
    }
}

/// How numeric fields wider than their digit budget are treated while parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldPolicy {
    /// Reject the field with [`WordError::FieldOverflow`].
    #[default]
    Strict,
    /// Keep the last `width` digits, dropping the excess leading ones.
    Lenient,
}

/// Opcode and address groups of a word read as an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstructionFields {
    pub opcode: u8,
    pub data_addr: u16,
    pub instr_addr: u16,
}

/// A signed machine word with a magnitude below 10^10.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Word {
    magnitude: u64,
    sign: Sign,
}

impl Word {
    pub const ZERO: Word = Word {
        magnitude: 0,
        sign: Sign::Plus,
    };
    pub const NEGATIVE_ZERO: Word = Word {
        magnitude: 0,
        sign: Sign::Minus,
    };

    pub fn new(magnitude: u64, sign: Sign) -> Result<Self, WordError> {
        if magnitude >= WORD_MODULUS {
            return Err(WordError::Overflow(magnitude));
        }
        Ok(Self { magnitude, sign })
    }

    /// Build a word from an ordinary integer; zero always comes out positive.
    pub fn from_i64(value: i64) -> Result<Self, WordError> {
        let sign = if value < 0 { Sign::Minus } else { Sign::Plus };
        Self::new(value.unsigned_abs(), sign)
    }

    /// Pack up to five characters left to right, two digits each.
    /// Missing characters are blanks (code 00).
    pub fn from_text(text: &str) -> Self {
        let mut chars = text.chars();
        let mut magnitude = 0u64;
        for _ in 0..CHARS_PER_WORD {
            let code = chars.next().map(char_to_code).unwrap_or(0);
            magnitude = magnitude * 100 + u64::from(code);
        }
        Self {
            magnitude,
            sign: Sign::Plus,
        }
    }

    pub fn magnitude(self) -> u64 {
        self.magnitude
    }

    pub fn sign(self) -> Sign {
        self.sign
    }

    pub fn with_sign(self, sign: Sign) -> Self {
        Self { sign, ..self }
    }

    pub fn abs(self) -> Self {
        self.with_sign(Sign::Plus)
    }

    pub fn is_zero(self) -> bool {
        self.magnitude == 0
    }

    pub fn is_negative_zero(self) -> bool {
        self.magnitude == 0 && self.sign.is_negative()
    }

    /// Arithmetic value; negative zero collapses to 0.
    pub fn to_i64(self) -> i64 {
        let value = self.magnitude as i64;
        if self.sign.is_negative() { -value } else { value }
    }

    /// Leftmost (tenth) digit of the magnitude.
    pub fn high_digit(self) -> u8 {
        (self.magnitude / TOP_DIGIT) as u8
    }

    /// Peel the leading `n` digits off the magnitude, shifting the remainder
    /// left by `n` places. The sign stays on the remainder.
    pub fn take_leading_digits(&mut self, n: u32) -> u32 {
        assert!((1..=9).contains(&n), "digit count {n} outside 1..=9");
        let mut group = 0u32;
        for _ in 0..n {
            group = group * 10 + (self.magnitude / TOP_DIGIT) as u32;
            self.magnitude = (self.magnitude % TOP_DIGIT) * 10;
        }
        group
    }

    /// Peel the trailing `n` digits off the magnitude, shifting the remainder
    /// right by `n` places. The sign stays on the remainder.
    pub fn take_trailing_digits(&mut self, n: u32) -> u32 {
        assert!((1..=9).contains(&n), "digit count {n} outside 1..=9");
        let modulus = 10u64.pow(n);
        let group = (self.magnitude % modulus) as u32;
        self.magnitude /= modulus;
        group
    }

    pub fn instruction_fields(self) -> InstructionFields {
        let mut rest = self;
        let opcode = rest.take_leading_digits(2) as u8;
        let data_addr = rest.take_leading_digits(4) as u16;
        let instr_addr = rest.take_leading_digits(4) as u16;
        InstructionFields {
            opcode,
            data_addr,
            instr_addr,
        }
    }

    /// Decode the five 2-digit character codes of the magnitude.
    pub fn to_text(self) -> String {
        let mut rest = self;
        (0..CHARS_PER_WORD)
            .map(|_| code_to_char(rest.take_leading_digits(2) as u8))
            .collect()
    }

    /// Canonical listing form: ten zero-padded digits and a trailing sign.
    pub fn format_signed(self) -> String {
        format!("{:010}{}", self.magnitude, self.sign.glyph())
    }

    /// Parse the numeric form `[+|-] digits [+|-]`. Blanks may separate
    /// digits; the last sign marker wins.
    pub fn parse_numeric(text: &str, policy: FieldPolicy) -> Result<Self, WordError> {
        let (leading, rest) = take_sign(text);
        let (magnitude, rest) = scan_field(rest, WORD_DIGITS, policy)?;
        let (trailing, rest) = take_sign(rest);
        if policy == FieldPolicy::Strict && !rest.trim().is_empty() {
            return Err(WordError::TrailingInput(rest.trim().to_string()));
        }
        let sign = trailing.or(leading).unwrap_or_default();
        Self::new(magnitude, sign)
    }
}

/// Build an instruction word opcode(2) data(4) instruction(4).
/// Out-of-range fields wrap modulo their field width.
pub fn pack_instruction(opcode: u32, data_addr: u32, instr_addr: u32, sign: Sign) -> Word {
    let magnitude = u64::from(opcode % 100) * OPCODE_SCALE
        + u64::from(data_addr % 10_000) * ADDRESS_SCALE
        + u64::from(instr_addr % 10_000);
    Word { magnitude, sign }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:010}{}", self.magnitude, self.sign.glyph())
    }
}

impl FromStr for Word {
    type Err = WordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_numeric(s, FieldPolicy::Strict)
    }
}

/// Skip blanks and consume one optional `+`/`-`.
pub(crate) fn take_sign(input: &str) -> (Option<Sign>, &str) {
    let input = input.trim_start();
    if let Some(rest) = input.strip_prefix('+') {
        (Some(Sign::Plus), rest)
    } else if let Some(rest) = input.strip_prefix('-') {
        (Some(Sign::Minus), rest)
    } else {
        (None, input)
    }
}

/// Scan a decimal field of `width` digits from the start of `input`.
///
/// Scanning stops at the first non-digit. Full-word fields also accept
/// blanks between digits. An empty field reads as zero.
pub(crate) fn scan_field(
    input: &str,
    width: u32,
    policy: FieldPolicy,
) -> Result<(u64, &str), WordError> {
    let input = input.trim_start();
    let modulus = 10u64.pow(width);
    let mut value = 0u64;
    let mut end = input.len();
    for (idx, ch) in input.char_indices() {
        if let Some(digit) = ch.to_digit(10) {
            let next = value * 10 + u64::from(digit);
            if next >= modulus && policy == FieldPolicy::Strict {
                let text: String = input
                    .chars()
                    .take_while(|c| c.is_ascii_digit() || (width == WORD_DIGITS && *c == ' '))
                    .collect();
                return Err(WordError::FieldOverflow {
                    text: text.trim_end().to_string(),
                    width,
                });
            }
            value = next % modulus;
        } else if width == WORD_DIGITS && ch == ' ' {
            continue;
        } else {
            end = idx;
            break;
        }
    }
    Ok((value, &input[end..]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn negative_zero_is_distinct_from_zero() {
        assert_ne!(Word::ZERO, Word::NEGATIVE_ZERO);
        assert!(Word::NEGATIVE_ZERO.is_negative_zero());
        assert!(!Word::ZERO.is_negative_zero());
        assert_eq!(Word::NEGATIVE_ZERO.to_i64(), 0);
        assert_ne!(
            Word::ZERO.format_signed(),
            Word::NEGATIVE_ZERO.format_signed()
        );
    }

    #[test]
    fn format_is_fixed_width() {
        let w = Word::from_i64(-1234).unwrap();
        assert_eq!(w.format_signed(), "0000001234-");
        assert_eq!(Word::ZERO.format_signed(), "0000000000+");
        assert_eq!(Word::NEGATIVE_ZERO.to_string(), "0000000000-");
    }

    #[test]
    fn parse_format_round_trip_keeps_negative_zero() {
        for word in [
            Word::ZERO,
            Word::NEGATIVE_ZERO,
            Word::from_i64(9_999_999_999).unwrap(),
            Word::from_i64(-42).unwrap(),
        ] {
            let parsed: Word = word.format_signed().parse().unwrap();
            assert_eq!(parsed, word);
        }
    }

    #[test]
    fn parse_numeric_sign_positions() {
        assert_eq!("-0".parse::<Word>().unwrap(), Word::NEGATIVE_ZERO);
        assert_eq!("0-".parse::<Word>().unwrap(), Word::NEGATIVE_ZERO);
        assert_eq!("-".parse::<Word>().unwrap(), Word::NEGATIVE_ZERO);
        assert_eq!("-12+".parse::<Word>().unwrap(), Word::from_i64(12).unwrap());
        assert_eq!(
            "+12-".parse::<Word>().unwrap(),
            Word::from_i64(-12).unwrap()
        );
        assert_eq!(
            "12 3456 7890".parse::<Word>().unwrap().magnitude(),
            1_234_567_890
        );
    }

    #[test]
    fn parse_numeric_field_policies() {
        let err = "12345678901".parse::<Word>().unwrap_err();
        assert!(matches!(err, WordError::FieldOverflow { width: 10, .. }));
        let lenient = Word::parse_numeric("12345678901", FieldPolicy::Lenient).unwrap();
        assert_eq!(lenient.magnitude(), 2_345_678_901);
        assert!(matches!(
            "12x".parse::<Word>(),
            Err(WordError::TrailingInput(_))
        ));
    }

    #[test]
    fn new_rejects_eleven_digits() {
        assert_eq!(
            Word::new(WORD_MODULUS, Sign::Plus),
            Err(WordError::Overflow(WORD_MODULUS))
        );
    }

    #[test]
    fn leading_digits_peel_from_the_left() {
        let mut w = Word::new(1_234_567_890, Sign::Minus).unwrap();
        assert_eq!(w.take_leading_digits(2), 12);
        assert_eq!(w.magnitude(), 3_456_789_000);
        assert_eq!(w.take_leading_digits(4), 3456);
        assert_eq!(w.take_leading_digits(4), 7890);
        assert_eq!(w.magnitude(), 0);
        assert_eq!(w.sign(), Sign::Minus);
    }

    #[test]
    fn trailing_digits_peel_from_the_right() {
        let mut w = Word::new(1_234_567_890, Sign::Plus).unwrap();
        assert_eq!(w.take_trailing_digits(4), 7890);
        assert_eq!(w.magnitude(), 123_456);
        assert_eq!(w.take_trailing_digits(1), 6);
    }

    #[test]
    #[should_panic]
    fn zero_digit_peel_is_rejected() {
        let mut w = Word::ZERO;
        w.take_leading_digits(0);
    }

    #[test]
    fn pack_instruction_truncates_fields() {
        let w = pack_instruction(65, 1000, 2001, Sign::Plus);
        assert_eq!(w.magnitude(), 6_510_002_001);
        let fields = w.instruction_fields();
        assert_eq!(
            fields,
            InstructionFields {
                opcode: 65,
                data_addr: 1000,
                instr_addr: 2001
            }
        );
        let wrapped = pack_instruction(165, 12_345, 99_999, Sign::Minus);
        assert_eq!(wrapped.format_signed(), "6523459999-");
    }

    #[test]
    fn text_round_trip_and_high_digit() {
        let w = Word::from_text("AB");
        assert_eq!(w.magnitude(), 6_162_000_000);
        assert_eq!(w.to_text(), "AB   ");
        assert_eq!(w.high_digit(), 6);
        assert_eq!(Word::from_text("HELLO WORLD").to_text(), "HELLO");
    }
}
