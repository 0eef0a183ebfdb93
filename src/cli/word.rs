//! Word inspection (`carddeck word ...`).

use anyhow::{Context, Result};
use carddeck::{FieldPolicy, listing, parse_word};
use clap::Args;

use crate::cli::common::ParseModeArg;

/// Arguments for `carddeck word`.
#[derive(Args, Debug)]
pub struct WordArgs {
    /// Words to parse, e.g. `6510002001+`, `'RAL 1000 2001'` or `'HELLO'`.
    #[arg(required = true, allow_hyphen_values = true)]
    pub words: Vec<String>,
    /// How to read each word.
    #[arg(short, long, value_enum, default_value_t = ParseModeArg::Numeric)]
    pub mode: ParseModeArg,
    /// Truncate oversized fields to their last digits instead of failing.
    #[arg(long)]
    pub lenient: bool,
}

pub fn handle(args: WordArgs) -> Result<()> {
    let policy = if args.lenient {
        FieldPolicy::Lenient
    } else {
        FieldPolicy::Strict
    };
    for text in &args.words {
        let word = parse_word(text, args.mode.into(), policy)
            .with_context(|| format!("cannot parse word '{text}'"))?;
        println!("{}", listing(word, true, true));
    }
    Ok(())
}
