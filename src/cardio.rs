//! Card reader/punch collaborators: card file formats and deck file access.
//!
//! Deck operations never touch files directly. They ask a [`DeckFiles`]
//! capability for a [`CardReader`] or a [`CardWriter`] by name and drop the
//! handle before returning, which closes it on every path.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::Path;
use std::rc::Rc;

use thiserror::Error;
use tracing::debug;

use crate::encoding::{Ibm650Encoding, PunchMask};
use crate::punchcards::{COLS, CardImage, ColumnError};

/// Bytes per card in the column-binary format.
pub const BINARY_CARD_BYTES: usize = 2 * COLS;

#[derive(Debug, Error)]
pub enum CardIoError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("card {card}: {source}")]
    BadCharacter { card: usize, source: ColumnError },
    #[error("card {card} cannot be written as text: {source}")]
    Unrepresentable { card: usize, source: ColumnError },
    #[error("card {card} is truncated ({bytes} of 160 bytes)")]
    Truncated { card: usize, bytes: usize },
}

impl CardIoError {
    /// 1-based card number the error refers to, when known.
    pub fn card(&self) -> Option<usize> {
        match self {
            CardIoError::Io(_) => None,
            CardIoError::BadCharacter { card, .. }
            | CardIoError::Unrepresentable { card, .. }
            | CardIoError::Truncated { card, .. } => Some(*card),
        }
    }
}

/// Layout of a card file on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CardFormat {
    /// One card per line, characters in Hollerith code.
    #[default]
    Text,
    /// 160 bytes per card, one little-endian punch mask per column.
    Binary,
}

impl fmt::Display for CardFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CardFormat::Text => write!(f, "text"),
            CardFormat::Binary => write!(f, "binary"),
        }
    }
}

pub trait CardReader {
    /// Next card, or `None` at the end of the source.
    fn read_card(&mut self) -> Result<Option<CardImage>, CardIoError>;
}

pub trait CardWriter {
    fn punch_card(&mut self, card: &CardImage) -> Result<(), CardIoError>;

    /// Push buffered cards out. Called once after the last card.
    fn finish(&mut self) -> Result<(), CardIoError> {
        Ok(())
    }
}

/// Named access to deck files.
pub trait DeckFiles {
    fn open_reader(&mut self, name: &str) -> Result<Box<dyn CardReader>, CardIoError>;
    /// Create (or truncate) the named deck for writing.
    fn create_writer(&mut self, name: &str) -> Result<Box<dyn CardWriter>, CardIoError>;
}

pub struct TextCardReader<R> {
    inner: R,
    line: String,
    card: usize,
}

impl<R: BufRead> TextCardReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            line: String::new(),
            card: 0,
        }
    }
}

impl<R: BufRead> CardReader for TextCardReader<R> {
    fn read_card(&mut self) -> Result<Option<CardImage>, CardIoError> {
        self.line.clear();
        if self.inner.read_line(&mut self.line)? == 0 {
            return Ok(None);
        }
        self.card += 1;
        let text = self.line.trim_end_matches(['\n', '\r']);
        CardImage::from_text(&Ibm650Encoding, text)
            .map(Some)
            .map_err(|source| CardIoError::BadCharacter {
                card: self.card,
                source,
            })
    }
}

pub struct TextCardWriter<W> {
    inner: W,
    card: usize,
}

impl<W: Write> TextCardWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, card: 0 }
    }
}

impl<W: Write> CardWriter for TextCardWriter<W> {
    fn punch_card(&mut self, card: &CardImage) -> Result<(), CardIoError> {
        self.card += 1;
        let text = card
            .to_text(&Ibm650Encoding)
            .map_err(|source| CardIoError::Unrepresentable {
                card: self.card,
                source,
            })?;
        self.inner.write_all(text.trim_end_matches(' ').as_bytes())?;
        self.inner.write_all(b"\n")?;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), CardIoError> {
        self.inner.flush()?;
        Ok(())
    }
}

pub struct BinaryCardReader<R> {
    inner: R,
    card: usize,
}

impl<R: Read> BinaryCardReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, card: 0 }
    }
}

impl<R: Read> CardReader for BinaryCardReader<R> {
    fn read_card(&mut self) -> Result<Option<CardImage>, CardIoError> {
        let mut buf = [0u8; BINARY_CARD_BYTES];
        let mut filled = 0;
        while filled < buf.len() {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(err.into()),
            }
        }
        if filled == 0 {
            return Ok(None);
        }
        self.card += 1;
        if filled < buf.len() {
            return Err(CardIoError::Truncated {
                card: self.card,
                bytes: filled,
            });
        }
        let mut columns = [PunchMask::BLANK; COLS];
        for (column, pair) in columns.iter_mut().zip(buf.chunks_exact(2)) {
            *column = PunchMask(u16::from_le_bytes([pair[0], pair[1]]));
        }
        Ok(Some(CardImage::from_columns(columns)))
    }
}

pub struct BinaryCardWriter<W> {
    inner: W,
}

impl<W: Write> BinaryCardWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }
}

impl<W: Write> CardWriter for BinaryCardWriter<W> {
    fn punch_card(&mut self, card: &CardImage) -> Result<(), CardIoError> {
        let mut buf = [0u8; BINARY_CARD_BYTES];
        for (pair, column) in buf.chunks_exact_mut(2).zip(card.columns()) {
            pair.copy_from_slice(&column.0.to_le_bytes());
        }
        self.inner.write_all(&buf)?;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), CardIoError> {
        self.inner.flush()?;
        Ok(())
    }
}

/// Deck files on the local filesystem, all in one card format.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiskFiles {
    format: CardFormat,
}

impl DiskFiles {
    pub fn new(format: CardFormat) -> Self {
        Self { format }
    }

    pub fn format(&self) -> CardFormat {
        self.format
    }
}

impl DeckFiles for DiskFiles {
    fn open_reader(&mut self, name: &str) -> Result<Box<dyn CardReader>, CardIoError> {
        let file = File::open(Path::new(name))?;
        debug!(file = name, format = %self.format, "opened deck for reading");
        let reader = BufReader::new(file);
        let cards: Box<dyn CardReader> = match self.format {
            CardFormat::Text => Box::new(TextCardReader::new(reader)),
            CardFormat::Binary => Box::new(BinaryCardReader::new(reader)),
        };
        Ok(cards)
    }

    fn create_writer(&mut self, name: &str) -> Result<Box<dyn CardWriter>, CardIoError> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(Path::new(name))?;
        debug!(file = name, format = %self.format, "created deck for writing");
        let writer = BufWriter::new(file);
        let cards: Box<dyn CardWriter> = match self.format {
            CardFormat::Text => Box::new(TextCardWriter::new(writer)),
            CardFormat::Binary => Box::new(BinaryCardWriter::new(writer)),
        };
        Ok(cards)
    }
}

/// In-memory deck files keyed by name.
///
/// Clones share the same storage, so a caller can keep a handle to inspect
/// what an operation wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryFiles {
    decks: Rc<RefCell<HashMap<String, Vec<CardImage>>>>,
}

impl MemoryFiles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, name: &str, cards: Vec<CardImage>) {
        self.decks.borrow_mut().insert(name.to_string(), cards);
    }

    pub fn get(&self, name: &str) -> Option<Vec<CardImage>> {
        self.decks.borrow().get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.decks.borrow().contains_key(name)
    }
}

struct MemoryReader {
    cards: std::vec::IntoIter<CardImage>,
}

impl CardReader for MemoryReader {
    fn read_card(&mut self) -> Result<Option<CardImage>, CardIoError> {
        Ok(self.cards.next())
    }
}

struct MemoryWriter {
    decks: Rc<RefCell<HashMap<String, Vec<CardImage>>>>,
    name: String,
}

impl CardWriter for MemoryWriter {
    fn punch_card(&mut self, card: &CardImage) -> Result<(), CardIoError> {
        self.decks
            .borrow_mut()
            .entry(self.name.clone())
            .or_default()
            .push(card.clone());
        Ok(())
    }
}

impl DeckFiles for MemoryFiles {
    fn open_reader(&mut self, name: &str) -> Result<Box<dyn CardReader>, CardIoError> {
        let cards = self.get(name).ok_or_else(|| {
            io::Error::new(ErrorKind::NotFound, format!("no deck named {name}"))
        })?;
        Ok(Box::new(MemoryReader {
            cards: cards.into_iter(),
        }))
    }

    fn create_writer(&mut self, name: &str) -> Result<Box<dyn CardWriter>, CardIoError> {
        self.insert(name, Vec::new());
        Ok(Box::new(MemoryWriter {
            decks: Rc::clone(&self.decks),
            name: name.to_string(),
        }))
    }
}
