//! Convenience helpers shared across command handlers.

use std::fs::{File, OpenOptions};
use std::path::Path;

use carddeck::units::PRINTER_UNIT;
use carddeck::{DeckError, DiskFiles, NoUnits, UnitError, UnitTable, Units};

use crate::cli::Settings;

/// Deck files on disk in the configured card format.
pub fn deck_files(settings: &Settings) -> DiskFiles {
    DiskFiles::new(settings.format.into())
}

/// Unit table named by `--units`; without one no card punch is configured.
pub fn load_units(settings: &Settings) -> Result<Box<dyn Units>, DeckError> {
    match &settings.units {
        Some(path) => Ok(Box::new(UnitTable::load(path)?)),
        None => Ok(Box::new(NoUnits)),
    }
}

/// Unit table for editing, created empty when the file does not exist yet.
pub fn edit_units(settings: &Settings) -> Result<UnitTable, DeckError> {
    let path = settings.units.as_deref().ok_or_else(|| {
        DeckError::MalformedArgument("no unit table given (--units or CARDDECK_UNITS)".into())
    })?;
    Ok(UnitTable::load_or_default(path)?)
}

/// File attached to the printer unit, opened for appending.
pub fn open_printer(units: &dyn Units) -> Result<Option<File>, DeckError> {
    let path = match units.attached(PRINTER_UNIT) {
        Ok(Some(path)) => path,
        Ok(None) | Err(UnitError::NoDevice(_) | UnitError::NoUnit(_)) => return Ok(None),
        Err(err) => return Err(err.into()),
    };
    open_append(&path).map(Some)
}

fn open_append(path: &Path) -> Result<File, DeckError> {
    OpenOptions::new()
        .append(true)
        .create(true)
        .open(path)
        .map_err(|source| DeckError::Print {
            sink: path.display().to_string(),
            source,
        })
}
