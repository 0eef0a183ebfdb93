//! Card inspection (`carddeck card ...`).

use anyhow::{Context, Result};
use carddeck::deck::CardRow;
use carddeck::{DeckError, DeckFiles, DeckStore, Ibm650Encoding, LoadMode};
use clap::Args;

use crate::cli::Settings;
use crate::cli::common::RenderStyleArg;
use crate::cli::utils::deck_files;

/// Arguments for `carddeck card`.
#[derive(Args, Debug)]
pub struct CardArgs {
    /// Deck file to inspect.
    pub deck: String,
    /// 1-based card to show (defaults to every card).
    #[arg(short, long)]
    pub index: Option<usize>,
    /// Punch rendering style.
    #[arg(long, default_value_t = RenderStyleArg::AsciiX, value_enum)]
    pub style: RenderStyleArg,
}

pub fn handle(settings: &Settings, args: CardArgs) -> Result<()> {
    let mut files = deck_files(settings);
    let mut store = DeckStore::new(LoadMode::Raw);
    let mut reader = files
        .open_reader(&args.deck)
        .map_err(|source| DeckError::Read {
            file: args.deck.clone(),
            source,
        })
        .with_context(|| format!("failed to read {}", args.deck))?;
    store
        .load(reader.as_mut(), &args.deck)
        .with_context(|| format!("failed to read {}", args.deck))?;

    let range = match args.index {
        Some(index) if index >= 1 && index <= store.len() => index - 1..index,
        Some(index) => {
            return Err(DeckError::OutOfRange {
                start: index.saturating_sub(1),
                end: index,
                len: store.len(),
            })
            .with_context(|| format!("no card {index} in {}", args.deck));
        }
        None => 0..store.len(),
    };
    for (offset, row) in store.rows()[range.clone()].iter().enumerate() {
        let CardRow::Punched(card) = row else {
            continue;
        };
        println!("card {}", range.start + offset + 1);
        print!("{}", card.render(&Ibm650Encoding, args.style.into()));
    }
    Ok(())
}
