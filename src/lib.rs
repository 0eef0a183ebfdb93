//! IBM 650 card and word codec with deck split/join/print utilities.
//!
//! The codec half converts between machine words, two-digit character codes,
//! Hollerith punch masks and symbolic instructions. The deck half moves whole
//! card decks between files through the [`DeckFiles`] capability.

pub mod cardio;
pub mod charcode;
pub mod deck;
pub mod encoding;
pub mod instruction;
pub mod punchcards;
pub mod units;
pub mod word;

pub use cardio::{
    CardFormat, CardIoError, CardReader, CardWriter, DeckFiles, DiskFiles, MemoryFiles,
};
pub use charcode::{Repertoire, Zone, char_to_code, code_to_char, digit_with_zone, zone_digit};
pub use deck::{
    DeckError, DeckSource, DeckStore, JoinReport, LoadMode, MAX_CARDS_IN_DECK, PrintReport,
    SplitCount, SplitReport, Status, join, parse_join_args, print, split,
};
pub use encoding::{
    EncodeError, INVALID_PUNCH, Ibm650Encoding, PunchEncoding, PunchMask, char_to_punch,
    punch_to_char,
};
pub use instruction::{
    AssembleError, Disassembly, Mnemonic, ParseMode, assemble, disassemble, listing, parse_word,
};
pub use punchcards::{COLS, CardImage, ColumnError, RenderStyle};
pub use units::{NoUnits, UnitError, UnitTable, Units};
pub use word::{FieldPolicy, InstructionFields, Sign, Word, WordError, pack_instruction};
