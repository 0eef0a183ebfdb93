//! Command-line interface wiring for the `carddeck` binary.
//!
//! This module owns the clap definitions and delegates execution to the
//! submodule handling each command family.

use std::path::PathBuf;

use anyhow::Result;
use carddeck::{DeckError, Status};
use clap::{Parser, Subcommand};

pub mod card;
pub mod common;
pub mod deck;
pub mod unit;
pub mod utils;
pub mod word;

use common::CardFormatArg;

/// Parsed CLI entrypoint for the `carddeck` binary.
#[derive(Parser, Debug)]
#[command(
    name = "carddeck",
    version,
    about = "IBM 650 card deck utility: split, join and print decks, inspect words and cards"
)]
pub struct Cli {
    /// Do not report card counts.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Log every deck file opened, loaded and saved.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Layout of deck files.
    #[arg(
        long,
        global = true,
        value_enum,
        default_value_t = CardFormatArg::Text,
        env = "CARDDECK_FORMAT"
    )]
    pub format: CardFormatArg,

    /// JSON table of card punch unit attachments.
    #[arg(long, global = true, env = "CARDDECK_UNITS")]
    pub units: Option<PathBuf>,

    /// Command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Options every command handler may consult.
#[derive(Debug, Clone)]
pub struct Settings {
    pub quiet: bool,
    pub format: CardFormatArg,
    pub units: Option<PathBuf>,
}

/// Command families made available to end users.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Split a deck in two: `split <count> <source> <dest1> <dest2>`.
    Split(deck::SplitArgs),
    /// Concatenate decks: `join <src>... as <dest>`.
    Join(deck::JoinArgs),
    /// Print a deck on the console and the attached printer file.
    Print(deck::PrintArgs),
    /// Parse words and show them as digits, characters and instructions.
    Word(word::WordArgs),
    /// Show the punches of a card.
    Card(card::CardArgs),
    /// Inspect or change card punch unit attachments.
    #[command(subcommand)]
    Unit(unit::UnitCommand),
}

/// Execute the requested command.
pub fn run(cli: Cli) -> Result<()> {
    let settings = Settings {
        quiet: cli.quiet,
        format: cli.format,
        units: cli.units,
    };
    match cli.command {
        Command::Split(args) => deck::split(&settings, args),
        Command::Join(args) => deck::join(&settings, args),
        Command::Print(args) => deck::print(&settings, args),
        Command::Word(args) => word::handle(args),
        Command::Card(args) => card::handle(&settings, args),
        Command::Unit(cmd) => unit::handle(&settings, cmd),
    }
}

/// Deck failures keep their historical status; anything else is a bad argument.
pub fn exit_status(err: &anyhow::Error) -> Status {
    err.downcast_ref::<DeckError>()
        .map_or(Status::Arg, DeckError::status)
}
