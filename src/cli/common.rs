//! Shared clap helper types for CLI commands.

use carddeck::{CardFormat, ParseMode, RenderStyle};
use clap::ValueEnum;

/// Deck file layouts accepted by `--format`.
#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum CardFormatArg {
    Text,
    Binary,
}

impl From<CardFormatArg> for CardFormat {
    fn from(value: CardFormatArg) -> CardFormat {
        match value {
            CardFormatArg::Text => CardFormat::Text,
            CardFormatArg::Binary => CardFormat::Binary,
        }
    }
}

/// Textual word forms accepted by `word --mode`.
#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum ParseModeArg {
    Numeric,
    Mnemonic,
    #[value(name = "char")]
    Character,
}

impl From<ParseModeArg> for ParseMode {
    fn from(value: ParseModeArg) -> ParseMode {
        match value {
            ParseModeArg::Numeric => ParseMode::Numeric,
            ParseModeArg::Mnemonic => ParseMode::Mnemonic,
            ParseModeArg::Character => ParseMode::Character,
        }
    }
}

/// Render styles available for ASCII punch views.
#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum RenderStyleArg {
    #[value(name = "ascii-x")]
    AsciiX,
    #[value(name = "ascii-01")]
    Ascii01,
}

impl From<RenderStyleArg> for RenderStyle {
    fn from(value: RenderStyleArg) -> Self {
        match value {
            RenderStyleArg::AsciiX => RenderStyle::AsciiX,
            RenderStyleArg::Ascii01 => RenderStyle::Ascii01,
        }
    }
}
