use crate::charcode::PLACEHOLDER;
use crate::encoding::{EncodeError, PunchEncoding, PunchMask};
use std::fmt::{self, Write};
use thiserror::Error;

/// Columns on one card.
pub const COLS: usize = 80;
const ROW_LABELS: [&str; 12] = [
    "12", "11", " 0", " 1", " 2", " 3", " 4", " 5", " 6", " 7", " 8", " 9",
];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("column {column}: {source}")]
pub struct ColumnError {
    /// 1-based column number.
    pub column: usize,
    #[source]
    pub source: EncodeError,
}

/// Raw punches of a single card, column by column.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CardImage {
    columns: [PunchMask; COLS],
}

impl Default for CardImage {
    fn default() -> Self {
        Self::blank()
    }
}

impl CardImage {
    pub fn blank() -> Self {
        Self {
            columns: [PunchMask::BLANK; COLS],
        }
    }

    pub fn from_columns(columns: [PunchMask; COLS]) -> Self {
        Self { columns }
    }

    /// Punch the first 80 characters of `s`; shorter text leaves the
    /// remaining columns blank.
    pub fn from_text<E: PunchEncoding + ?Sized>(enc: &E, s: &str) -> Result<Self, ColumnError> {
        let mut columns = [PunchMask::BLANK; COLS];
        for (idx, ch) in s.chars().take(COLS).enumerate() {
            columns[idx] = enc
                .encode_char(ch)
                .map_err(|source| ColumnError {
                    column: idx + 1,
                    source,
                })?;
        }
        Ok(Self { columns })
    }

    pub fn columns(&self) -> &[PunchMask; COLS] {
        &self.columns
    }

    /// Decode every column; fails on the first column without a character.
    pub fn to_text<E: PunchEncoding + ?Sized>(&self, enc: &E) -> Result<String, ColumnError> {
        self.columns
            .iter()
            .enumerate()
            .map(|(idx, &mask)| {
                enc.decode_punch(mask).map_err(|source| ColumnError {
                    column: idx + 1,
                    source,
                })
            })
            .collect()
    }

    /// Decode every column, showing undecodable punches as the placeholder glyph.
    pub fn interpret<E: PunchEncoding + ?Sized>(&self, enc: &E) -> String {
        self.columns
            .iter()
            .map(|&mask| enc.decode_punch(mask).unwrap_or(PLACEHOLDER))
            .collect()
    }

    pub fn render<E: PunchEncoding + ?Sized>(&self, enc: &E, style: RenderStyle) -> String {
        match style {
            RenderStyle::AsciiX => self.render_ascii(enc, 'X', ' '),
            RenderStyle::Ascii01 => self.render_ascii(enc, '1', '0'),
        }
    }

    fn render_ascii<E: PunchEncoding + ?Sized>(&self, enc: &E, mark: char, blank: char) -> String {
        let mut out = String::with_capacity(16 * COLS);
        let _ = writeln!(&mut out, "IBM 650 card (80 cols) [{}]", enc.name());
        let _ = writeln!(&mut out, "     {}", ruler_line());
        let _ = writeln!(&mut out, "     {}", self.interpret(enc));
        let separator = "-".repeat(COLS);
        let _ = writeln!(&mut out, "     {}", separator);
        for (position, label) in ROW_LABELS.iter().enumerate() {
            let _ = write!(&mut out, "{:>3} |", label);
            for cell in &self.columns {
                out.push(if cell.punched_at(position) { mark } else { blank });
            }
            let _ = writeln!(&mut out, "|");
        }
        let _ = writeln!(&mut out, "     {}", separator);
        out
    }
}

fn ruler_line() -> String {
    let mut ruler = String::with_capacity(COLS);
    for col in 1..=COLS {
        if col % 10 == 0 {
            let digit = ((col / 10) % 10) as u8;
            ruler.push(char::from(b'0' + digit));
        } else {
            ruler.push('.');
        }
    }
    ruler
}

/// ASCII rendering styles.
#[derive(Debug, Clone, Copy)]
pub enum RenderStyle {
    AsciiX,
    Ascii01,
}

impl fmt::Display for RenderStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderStyle::AsciiX => write!(f, "ascii-x"),
            RenderStyle::Ascii01 => write!(f, "ascii-01"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::{INVALID_PUNCH, Ibm650Encoding};

    #[test]
    fn short_text_pads_with_blanks() {
        let card = CardImage::from_text(&Ibm650Encoding, "HELLO").unwrap();
        let text = card.to_text(&Ibm650Encoding).unwrap();
        assert_eq!(text.len(), COLS);
        assert_eq!(text.trim_end(), "HELLO");
    }

    #[test]
    fn long_text_is_cut_at_column_80() {
        let line = "X".repeat(100);
        let card = CardImage::from_text(&Ibm650Encoding, &line).unwrap();
        assert_eq!(card.to_text(&Ibm650Encoding).unwrap(), "X".repeat(80));
    }

    #[test]
    fn control_character_reports_column() {
        let err = CardImage::from_text(&Ibm650Encoding, "AB\tC").unwrap_err();
        assert_eq!(err.column, 3);
    }

    #[test]
    fn undecodable_column_is_reported_or_replaced() {
        let mut columns = [PunchMask::BLANK; COLS];
        columns[4] = INVALID_PUNCH;
        let card = CardImage::from_columns(columns);
        assert_eq!(card.to_text(&Ibm650Encoding).unwrap_err().column, 5);
        assert_eq!(card.interpret(&Ibm650Encoding).chars().nth(4), Some('~'));
    }

    #[test]
    fn render_marks_rows() {
        let card = CardImage::from_text(&Ibm650Encoding, "A").unwrap();
        let out = card.render(&Ibm650Encoding, RenderStyle::AsciiX);
        let row12 = out.lines().find(|l| l.starts_with(" 12 |")).unwrap();
        let row1 = out.lines().find(|l| l.starts_with("  1 |")).unwrap();
        assert_eq!(row12.chars().nth(5), Some('X'));
        assert_eq!(row1.chars().nth(5), Some('X'));
        assert!(out.contains("[IBM650]"));
    }
}
