//! Card deck buffer and the split, join and print operations.
//!
//! Each operation owns one [`DeckStore`] for its whole run: every source is
//! read completely into memory before any destination is created, so a
//! destination may share its name with a source.

use std::io::{self, Write};
use std::str::FromStr;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::cardio::{CardIoError, CardReader, CardWriter, DeckFiles};
use crate::charcode::{MINUS_ZERO, PLUS_ZERO, Repertoire};
use crate::encoding::Ibm650Encoding;
use crate::punchcards::CardImage;
use crate::units::{UnitError, Units, source_unit};

/// Capacity of the deck buffer.
pub const MAX_CARDS_IN_DECK: usize = 10_000;

/// Outcome class of a deck command, mirroring the simulator status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    /// Malformed arguments or missing filename.
    Arg,
    /// Referenced device does not exist.
    NxDev,
    /// Referenced unit does not exist.
    NxUn,
    /// Unit exists but has no file attached.
    NotAtt,
    /// Internal bound exceeded.
    IErr,
    /// Error from the card reader/punch layer.
    Io,
}

impl Status {
    pub fn exit_code(self) -> u8 {
        match self {
            Status::Ok => 0,
            Status::Arg => 1,
            Status::NxDev => 2,
            Status::NxUn => 3,
            Status::NotAtt => 4,
            Status::IErr => 5,
            Status::Io => 6,
        }
    }
}

#[derive(Debug, Error)]
pub enum DeckError {
    #[error("{0}")]
    MalformedArgument(String),
    #[error(transparent)]
    Unit(#[from] UnitError),
    #[error("too many cards in {file}: a deck holds at most {limit}")]
    DeckTooLarge { file: String, limit: usize },
    #[error("cards {start}..{end} are outside of the deck ({len} cards)")]
    OutOfRange { start: usize, end: usize, len: usize },
    #[error("cannot read deck {file}")]
    Read {
        file: String,
        #[source]
        source: CardIoError,
    },
    #[error("cannot write deck {file}")]
    Write {
        file: String,
        #[source]
        source: CardIoError,
    },
    #[error("cannot print to {sink}")]
    Print {
        sink: String,
        #[source]
        source: io::Error,
    },
}

impl DeckError {
    pub fn status(&self) -> Status {
        match self {
            DeckError::MalformedArgument(_) => Status::Arg,
            DeckError::Unit(UnitError::NoDevice(_)) => Status::NxDev,
            DeckError::Unit(UnitError::NoUnit(_)) => Status::NxUn,
            DeckError::Unit(UnitError::NotAttached(_)) => Status::NotAtt,
            DeckError::Unit(_) => Status::Io,
            DeckError::DeckTooLarge { .. } | DeckError::OutOfRange { .. } => Status::IErr,
            DeckError::Read { .. } | DeckError::Write { .. } | DeckError::Print { .. } => {
                Status::Io
            }
        }
    }

    /// 1-based card number involved in a read or write failure.
    pub fn card(&self) -> Option<usize> {
        match self {
            DeckError::Read { source, .. } | DeckError::Write { source, .. } => source.card(),
            _ => None,
        }
    }
}

/// How cards are kept once loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadMode {
    /// Raw punches; saving them back is bit-exact.
    #[default]
    Raw,
    /// Translated to characters, for printing.
    Text,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardRow {
    Punched(CardImage),
    Text(String),
}

impl CardRow {
    fn to_card(&self) -> Result<CardImage, crate::punchcards::ColumnError> {
        match self {
            CardRow::Punched(card) => Ok(card.clone()),
            CardRow::Text(text) => CardImage::from_text(&Ibm650Encoding, text),
        }
    }
}

/// Bounded in-memory deck.
#[derive(Debug, Default)]
pub struct DeckStore {
    mode: LoadMode,
    rows: Vec<CardRow>,
}

impl DeckStore {
    pub fn new(mode: LoadMode) -> Self {
        Self {
            mode,
            rows: Vec::new(),
        }
    }

    /// Empty store with room reserved for about `count_hint` cards.
    pub fn with_capacity(mode: LoadMode, count_hint: usize) -> Self {
        Self {
            mode,
            rows: Vec::with_capacity(count_hint.min(MAX_CARDS_IN_DECK)),
        }
    }

    pub fn mode(&self) -> LoadMode {
        self.mode
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[CardRow] {
        &self.rows
    }

    /// Append every card of `reader` and return how many were added.
    /// A card beyond [`MAX_CARDS_IN_DECK`] fails the load.
    pub fn load(&mut self, reader: &mut dyn CardReader, file: &str) -> Result<usize, DeckError> {
        let start = self.rows.len();
        while let Some(card) = reader.read_card().map_err(|source| DeckError::Read {
            file: file.to_string(),
            source,
        })? {
            if self.rows.len() >= MAX_CARDS_IN_DECK {
                return Err(DeckError::DeckTooLarge {
                    file: file.to_string(),
                    limit: MAX_CARDS_IN_DECK,
                });
            }
            let row = match self.mode {
                LoadMode::Raw => CardRow::Punched(card),
                LoadMode::Text => CardRow::Text(card.interpret(&Ibm650Encoding)),
            };
            self.rows.push(row);
        }
        let loaded = self.rows.len() - start;
        debug!(file, cards = loaded, "loaded deck");
        Ok(loaded)
    }

    /// End of the run of `count` cards starting at `start`.
    pub fn check_range(&self, start: usize, count: usize) -> Result<usize, DeckError> {
        start
            .checked_add(count)
            .filter(|&end| end <= self.rows.len())
            .ok_or(DeckError::OutOfRange {
                start,
                end: start.saturating_add(count),
                len: self.rows.len(),
            })
    }

    /// Punch `count` cards starting at `start` to `writer`.
    pub fn save(
        &self,
        writer: &mut dyn CardWriter,
        file: &str,
        start: usize,
        count: usize,
    ) -> Result<usize, DeckError> {
        let end = self.check_range(start, count)?;
        let write_err = |source| DeckError::Write {
            file: file.to_string(),
            source,
        };
        for (idx, row) in self.rows[start..end].iter().enumerate() {
            let card = row.to_card().map_err(|source| {
                write_err(CardIoError::BadCharacter {
                    card: start + idx + 1,
                    source,
                })
            })?;
            writer.punch_card(&card).map_err(write_err)?;
        }
        writer.finish().map_err(write_err)?;
        debug!(file, cards = count, "saved deck");
        Ok(count)
    }
}

/// Card count of a split: `N` puts N cards in the first deck, `-N` puts
/// the last N cards in the second deck.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitCount {
    Head(usize),
    Tail(usize),
}

impl SplitCount {
    /// Cards going to the first deck out of `total`, clamped to the deck.
    pub fn first_run(self, total: usize) -> usize {
        match self {
            SplitCount::Head(n) => n.min(total),
            SplitCount::Tail(n) => total.saturating_sub(n),
        }
    }

    fn requested(self) -> usize {
        match self {
            SplitCount::Head(n) | SplitCount::Tail(n) => n,
        }
    }
}

impl FromStr for SplitCount {
    type Err = DeckError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (tail, digits) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let count = digits
            .parse::<usize>()
            .ok()
            .filter(|&n| n <= MAX_CARDS_IN_DECK)
            .ok_or_else(|| DeckError::MalformedArgument(format!("invalid count value '{s}'")))?;
        Ok(if tail {
            SplitCount::Tail(count)
        } else {
            SplitCount::Head(count)
        })
    }
}

/// Where a split reads its deck from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeckSource {
    /// Card punch unit `CDP1`..`CDP3`; its file is detached first.
    Unit(u8),
    File(String),
}

impl DeckSource {
    pub fn parse(token: &str) -> Self {
        match source_unit(token) {
            Some(unit) => DeckSource::Unit(unit),
            None => DeckSource::File(token.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitReport {
    pub first: usize,
    pub second: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinReport {
    /// Each source with the number of cards it contributed, in order.
    pub sources: Vec<(String, usize)>,
    pub total: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrintReport {
    pub cards: usize,
}

/// Split one deck into two contiguous decks.
pub fn split(
    files: &mut dyn DeckFiles,
    units: &mut dyn Units,
    count: SplitCount,
    source: &DeckSource,
    dest1: &str,
    dest2: &str,
) -> Result<SplitReport, DeckError> {
    require_name(dest1, "missing first filename")?;
    require_name(dest2, "missing second filename")?;
    let source_file = match source {
        DeckSource::Unit(unit) => units.detach(*unit)?.to_string_lossy().into_owned(),
        DeckSource::File(name) => {
            require_name(name, "missing source filename")?;
            name.clone()
        }
    };

    let mut store = DeckStore::new(LoadMode::Raw);
    load_file(files, &mut store, &source_file)?;

    let total = store.len();
    let first = count.first_run(total);
    if count.requested() > total {
        warn!(
            requested = count.requested(),
            total, "split count larger than the deck"
        );
    }
    save_file(files, &store, dest1, 0, first)?;
    save_file(files, &store, dest2, first, total - first)?;
    info!(source = %source_file, first, second = total - first, "deck split");
    Ok(SplitReport {
        first,
        second: total - first,
    })
}

/// Concatenate `sources`, in order, into `dest`.
pub fn join(
    files: &mut dyn DeckFiles,
    sources: &[String],
    dest: &str,
) -> Result<JoinReport, DeckError> {
    if sources.is_empty() {
        return Err(DeckError::MalformedArgument(
            "missing source filename".to_string(),
        ));
    }
    require_name(dest, "missing destination filename")?;

    let mut store = DeckStore::new(LoadMode::Raw);
    let mut report = Vec::with_capacity(sources.len());
    for source in sources {
        require_name(source, "missing source filename")?;
        let loaded = load_file(files, &mut store, source)?;
        report.push((source.clone(), loaded));
    }
    let total = store.len();
    save_file(files, &store, dest, 0, total)?;
    info!(dest, decks = sources.len(), total, "decks joined");
    Ok(JoinReport {
        sources: report,
        total,
    })
}

/// Print a deck on `console`, and on `printer` when one is attached.
///
/// Each card is uppercased, zone-punched zeros lose their zone, characters
/// the printer lacks become blanks and trailing blanks are dropped.
pub fn print(
    files: &mut dyn DeckFiles,
    source: &str,
    console: &mut dyn Write,
    mut printer: Option<&mut dyn Write>,
) -> Result<PrintReport, DeckError> {
    require_name(source, "missing filename")?;
    let mut store = DeckStore::new(LoadMode::Text);
    load_file(files, &mut store, source)?;

    let mut blanked = 0;
    for row in store.rows() {
        let CardRow::Text(text) = row else {
            continue;
        };
        let (line, replaced) = sanitize_line(text);
        blanked += replaced;
        writeln!(console, "{line}").map_err(|source| DeckError::Print {
            sink: "console".to_string(),
            source,
        })?;
        if let Some(out) = printer.as_deref_mut() {
            write!(out, "{line}\r\n").map_err(|source| DeckError::Print {
                sink: "printer".to_string(),
                source,
            })?;
        }
    }
    if let Some(out) = printer {
        out.flush().map_err(|source| DeckError::Print {
            sink: "printer".to_string(),
            source,
        })?;
    }
    if blanked > 0 {
        warn!(
            file = source,
            columns = blanked,
            "characters outside the printer set printed as blanks"
        );
    }
    info!(file = source, cards = store.len(), "deck printed");
    Ok(PrintReport { cards: store.len() })
}

/// Printer rendering of one card's characters.
pub fn printable_line(text: &str) -> String {
    sanitize_line(text).0
}

fn sanitize_line(text: &str) -> (String, usize) {
    let mut replaced = 0;
    let line: String = text
        .chars()
        .map(|ch| match ch.to_ascii_uppercase() {
            PLUS_ZERO | MINUS_ZERO => '0',
            up if Repertoire::contains(up) => up,
            _ => {
                replaced += 1;
                ' '
            }
        })
        .collect();
    (line.trim_end_matches(' ').to_string(), replaced)
}

/// Split `JOIN` arguments `<src>... AS <dest>` into sources and destination.
pub fn parse_join_args<S: AsRef<str>>(args: &[S]) -> Result<(Vec<String>, String), DeckError> {
    let position = args
        .iter()
        .position(|arg| arg.as_ref().eq_ignore_ascii_case("AS"))
        .ok_or_else(|| DeckError::MalformedArgument("AS <file> not found".to_string()))?;
    let sources = args[..position]
        .iter()
        .map(|arg| arg.as_ref().to_string())
        .collect();
    match &args[position + 1..] {
        [] => Err(DeckError::MalformedArgument(
            "missing destination filename".to_string(),
        )),
        [dest] => Ok((sources, dest.as_ref().to_string())),
        _ => Err(DeckError::MalformedArgument(
            "extra unknown parameters after destination filename".to_string(),
        )),
    }
}

fn require_name(name: &str, message: &str) -> Result<(), DeckError> {
    if name.trim().is_empty() {
        return Err(DeckError::MalformedArgument(message.to_string()));
    }
    Ok(())
}

fn load_file(
    files: &mut dyn DeckFiles,
    store: &mut DeckStore,
    name: &str,
) -> Result<usize, DeckError> {
    let mut reader = files.open_reader(name).map_err(|source| DeckError::Read {
        file: name.to_string(),
        source,
    })?;
    store.load(reader.as_mut(), name)
}

fn save_file(
    files: &mut dyn DeckFiles,
    store: &DeckStore,
    name: &str,
    start: usize,
    count: usize,
) -> Result<usize, DeckError> {
    store.check_range(start, count)?;
    let mut writer = files.create_writer(name).map_err(|source| DeckError::Write {
        file: name.to_string(),
        source,
    })?;
    store.save(writer.as_mut(), name, start, count)
}
