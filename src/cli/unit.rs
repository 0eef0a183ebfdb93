//! Card punch unit table commands (`carddeck unit ...`).

use std::path::PathBuf;

use anyhow::{Context, Result};
use carddeck::units::{PUNCH_UNITS, unit_name};
use carddeck::{DeckError, Units};
use clap::{Args, Subcommand};

use crate::cli::Settings;
use crate::cli::utils::edit_units;

/// Supported `carddeck unit` subcommands.
#[derive(Subcommand, Debug)]
pub enum UnitCommand {
    /// Show every unit and its attached file.
    List,
    /// Attach a deck file to a unit.
    Attach(UnitAttachArgs),
    /// Detach the file of a unit.
    Detach(UnitDetachArgs),
}

/// Arguments for `carddeck unit attach`.
#[derive(Args, Debug)]
pub struct UnitAttachArgs {
    /// Unit name, CDP0..CDP3.
    #[arg(value_parser = parse_unit)]
    pub unit: u8,
    /// File to attach.
    pub file: PathBuf,
}

/// Arguments for `carddeck unit detach`.
#[derive(Args, Debug)]
pub struct UnitDetachArgs {
    /// Unit name, CDP0..CDP3.
    #[arg(value_parser = parse_unit)]
    pub unit: u8,
}

pub fn handle(settings: &Settings, command: UnitCommand) -> Result<()> {
    let mut table = edit_units(settings).context("unit")?;
    match command {
        UnitCommand::List => {
            for (name, file) in table.entries() {
                match file {
                    Some(path) => println!("{:<5} {}", name.to_uppercase(), path.display()),
                    None => println!("{:<5} (not attached)", name.to_uppercase()),
                }
            }
        }
        UnitCommand::Attach(args) => {
            table
                .attach(args.unit, args.file.clone())
                .map_err(DeckError::from)
                .with_context(|| format!("cannot attach {}", unit_name(args.unit)))?;
            if !settings.quiet {
                println!("{} attached to {}", unit_name(args.unit), args.file.display());
            }
        }
        UnitCommand::Detach(args) => {
            let file = table
                .detach(args.unit)
                .map_err(DeckError::from)
                .with_context(|| format!("cannot detach {}", unit_name(args.unit)))?;
            if !settings.quiet {
                println!("{} detached from {}", unit_name(args.unit), file.display());
            }
        }
    }
    Ok(())
}

/// Clap parser for unit names such as `CDP1` or `cdp0`.
pub fn parse_unit(input: &str) -> Result<u8, String> {
    let digits = input
        .get(..3)
        .filter(|prefix| prefix.eq_ignore_ascii_case("CDP"))
        .map(|_| &input[3..])
        .ok_or_else(|| format!("unit name must look like CDP0..CDP{}", PUNCH_UNITS - 1))?;
    digits
        .parse::<u8>()
        .map_err(|_| format!("'{input}' has no unit number"))
}
