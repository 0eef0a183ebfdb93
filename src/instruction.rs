//! Symbolic translation between words and IBM 650 instructions.
//!
//! An instruction word is `OO DDDD IIII`: a 2-digit opcode, the data
//! address and the address of the next instruction.

use std::fmt;

use thiserror::Error;

use crate::word::{
    CHARS_PER_WORD, FieldPolicy, Sign, Word, WordError, pack_instruction, scan_field, take_sign,
};

const ADDRESS_DIGITS: u32 = 4;

/// One row of the opcode table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpcodeEntry {
    pub code: u8,
    pub name: &'static str,
    /// The instruction fetches its operand from the data address.
    pub reads_data: bool,
}

macro_rules! op {
    ($code:expr, $name:expr, $reads:expr) => {
        OpcodeEntry {
            code: $code,
            name: $name,
            reads_data: $reads,
        }
    };
}

/// Basic IBM 650 instruction set.
pub static OPCODES: &[OpcodeEntry] = &[
    op!(17, "AABL", true),
    op!(15, "AL", true),
    op!(10, "AU", true),
    op!(45, "BRNZ", false),
    op!(46, "BRMIN", false),
    op!(44, "BRNZU", false),
    op!(47, "BROV", false),
    op!(91, "BRD1", false),
    op!(92, "BRD2", false),
    op!(93, "BRD3", false),
    op!(94, "BRD4", false),
    op!(95, "BRD5", false),
    op!(96, "BRD6", false),
    op!(97, "BRD7", false),
    op!(98, "BRD8", false),
    op!(99, "BRD9", false),
    op!(90, "BRD10", false),
    op!(14, "DIV", true),
    op!(64, "DIVRU", true),
    op!(69, "LD", true),
    op!(19, "MULT", true),
    op!(0, "NOOP", false),
    op!(71, "PCH", false),
    op!(70, "RD", false),
    op!(67, "RAABL", true),
    op!(65, "RAL", true),
    op!(60, "RAU", true),
    op!(68, "RSABL", true),
    op!(66, "RSL", true),
    op!(61, "RSU", true),
    op!(35, "SLT", false),
    op!(36, "SCT", false),
    op!(30, "SRT", false),
    op!(31, "SRD", false),
    op!(1, "STOP", false),
    op!(24, "STD", false),
    op!(22, "STDA", false),
    op!(23, "STIA", false),
    op!(20, "STL", false),
    op!(21, "STU", false),
    op!(18, "SABL", true),
    op!(16, "SL", true),
    op!(11, "SU", true),
    op!(84, "TLU", false),
];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AssembleError {
    #[error("unknown mnemonic '{0}'")]
    UnknownMnemonic(String),
    #[error(transparent)]
    Word(#[from] WordError),
}

/// Look up a mnemonic; case-sensitive.
pub fn find_mnemonic(name: &str) -> Option<&'static OpcodeEntry> {
    OPCODES.iter().find(|entry| entry.name == name)
}

pub fn find_opcode(code: u8) -> Option<&'static OpcodeEntry> {
    OPCODES.iter().find(|entry| entry.code == code)
}

/// Mnemonic and reads-data flag of an opcode.
pub fn opcode_info(code: u8) -> Option<(&'static str, bool)> {
    find_opcode(code).map(|entry| (entry.name, entry.reads_data))
}

/// Opcode of a decoded instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mnemonic {
    Known(&'static OpcodeEntry),
    Unknown(u8),
}

impl Mnemonic {
    pub fn code(self) -> u8 {
        match self {
            Mnemonic::Known(entry) => entry.code,
            Mnemonic::Unknown(code) => code,
        }
    }

    pub fn name(self) -> Option<&'static str> {
        match self {
            Mnemonic::Known(entry) => Some(entry.name),
            Mnemonic::Unknown(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Disassembly {
    pub sign: Sign,
    pub mnemonic: Mnemonic,
    pub data_addr: u16,
    pub instr_addr: u16,
}

impl fmt::Display for Disassembly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mnemonic {
            Mnemonic::Known(entry) => write!(
                f,
                "{:<6}{:04}  {:04}",
                entry.name, self.data_addr, self.instr_addr
            ),
            Mnemonic::Unknown(code) => write!(f, "unknown opcode {code}"),
        }
    }
}

pub fn disassemble(word: Word) -> Disassembly {
    let fields = word.instruction_fields();
    let mnemonic = match find_opcode(fields.opcode) {
        Some(entry) => Mnemonic::Known(entry),
        None => Mnemonic::Unknown(fields.opcode),
    };
    Disassembly {
        sign: word.sign(),
        mnemonic,
        data_addr: fields.data_addr,
        instr_addr: fields.instr_addr,
    }
}

/// Build an instruction word. Address fields wrap modulo 10^4.
pub fn assemble(
    mnemonic: &str,
    data_addr: u32,
    instr_addr: u32,
    sign: Sign,
) -> Result<Word, AssembleError> {
    let entry =
        find_mnemonic(mnemonic).ok_or_else(|| AssembleError::UnknownMnemonic(mnemonic.into()))?;
    Ok(pack_instruction(
        u32::from(entry.code),
        data_addr,
        instr_addr,
        sign,
    ))
}

/// Textual form accepted by [`parse_word`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseMode {
    /// `[+|-] dddddddddd [+|-]`
    #[default]
    Numeric,
    /// `[+|-] MNEMONIC dddd iiii [+|-]`
    Mnemonic,
    /// Up to five characters, then an optional sign.
    Character,
}

/// Parse a word in any of its three textual forms. The last sign marker
/// wins; a minus sign over a zero magnitude yields negative zero.
pub fn parse_word(text: &str, mode: ParseMode, policy: FieldPolicy) -> Result<Word, AssembleError> {
    match mode {
        ParseMode::Numeric => Ok(Word::parse_numeric(text, policy)?),
        ParseMode::Mnemonic => parse_mnemonic(text, policy),
        ParseMode::Character => parse_characters(text, policy),
    }
}

fn parse_mnemonic(text: &str, policy: FieldPolicy) -> Result<Word, AssembleError> {
    let (leading, rest) = take_sign(text);
    let rest = rest.trim_start();
    let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
    let (name, rest) = rest.split_at(end);
    let (data_addr, rest) = scan_field(rest, ADDRESS_DIGITS, policy)?;
    let (instr_addr, rest) = scan_field(rest, ADDRESS_DIGITS, policy)?;
    let (trailing, rest) = take_sign(rest);
    check_consumed(rest, policy)?;
    let sign = trailing.or(leading).unwrap_or_default();
    assemble(name, data_addr as u32, instr_addr as u32, sign)
}

fn parse_characters(text: &str, policy: FieldPolicy) -> Result<Word, AssembleError> {
    let text = text.trim_start();
    let split = text
        .char_indices()
        .nth(CHARS_PER_WORD)
        .map_or(text.len(), |(idx, _)| idx);
    let (chars, rest) = text.split_at(split);
    let (trailing, rest) = take_sign(rest);
    check_consumed(rest, policy)?;
    Ok(Word::from_text(chars).with_sign(trailing.unwrap_or_default()))
}

fn check_consumed(rest: &str, policy: FieldPolicy) -> Result<(), WordError> {
    if policy == FieldPolicy::Strict && !rest.trim().is_empty() {
        return Err(WordError::TrailingInput(rest.trim().to_string()));
    }
    Ok(())
}

/// Examine-style rendering of a word: the signed digits, then optionally
/// the five characters and the disassembly.
pub fn listing(word: Word, characters: bool, mnemonic: bool) -> String {
    let mut out = word.format_signed();
    if characters {
        out.push_str(&format!("   '{}'", word.to_text()));
    }
    if mnemonic {
        out.push_str(&format!("   {}", disassemble(word.abs())));
    }
    out
}
