//! Attach state of the card punch units `CDP0`..`CDP3`.
//!
//! The table lives in a small JSON file:
//!
//! ```json
//! { "units": { "cdp0": "printer.txt", "cdp1": "punched.crd", "cdp2": null } }
//! ```
//!
//! A unit listed with `null` exists but is detached. `CDP0` doubles as the
//! printer sink of `print`.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use tracing::debug;

/// Units of the card punch device.
pub const PUNCH_UNITS: u8 = 4;
/// Unit whose attached file receives printed listings.
pub const PRINTER_UNIT: u8 = 0;

#[derive(Debug, Error)]
pub enum UnitError {
    #[error("no such device: {0}")]
    NoDevice(String),
    #[error("no such unit: {0}")]
    NoUnit(String),
    #[error("unit {0} is not attached")]
    NotAttached(String),
    #[error("failed to read unit table {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse unit table {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write unit table {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Unit number named by a deck source token: `CDP1`, `CDP2` or `CDP3`,
/// in any case. Anything else is a file name.
pub fn source_unit(token: &str) -> Option<u8> {
    let (prefix, digit) = token.split_at_checked(3)?;
    if !prefix.eq_ignore_ascii_case("CDP") {
        return None;
    }
    match digit {
        "1" | "2" | "3" => digit.parse().ok(),
        _ => None,
    }
}

pub fn unit_name(unit: u8) -> String {
    format!("CDP{unit}")
}

/// Access to attached card punch units.
pub trait Units {
    /// File attached to `unit`, or `None` when the unit is detached.
    fn attached(&self, unit: u8) -> Result<Option<PathBuf>, UnitError>;
    /// Detach `unit` and return the file it was attached to.
    fn detach(&mut self, unit: u8) -> Result<PathBuf, UnitError>;
}

/// No card punch device configured at all.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoUnits;

impl Units for NoUnits {
    fn attached(&self, unit: u8) -> Result<Option<PathBuf>, UnitError> {
        Err(UnitError::NoDevice(unit_name(unit)))
    }

    fn detach(&mut self, unit: u8) -> Result<PathBuf, UnitError> {
        Err(UnitError::NoDevice(unit_name(unit)))
    }
}

/// Unit table backed by a JSON file. Changes are written back immediately.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UnitTable {
    #[serde(default, deserialize_with = "lowercase_keys")]
    units: BTreeMap<String, Option<PathBuf>>,
    #[serde(skip)]
    path: Option<PathBuf>,
}

impl UnitTable {
    pub fn load(path: &Path) -> Result<Self, UnitError> {
        let raw = fs::read_to_string(path).map_err(|source| UnitError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut table: UnitTable =
            serde_json::from_str(&raw).map_err(|source| UnitError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        table.path = Some(path.to_path_buf());
        debug!(path = %path.display(), units = table.units.len(), "loaded unit table");
        Ok(table)
    }

    /// Load the table, or start an empty one bound to `path` if the file
    /// does not exist yet.
    pub fn load_or_default(path: &Path) -> Result<Self, UnitError> {
        if path.exists() {
            return Self::load(path);
        }
        Ok(Self {
            units: BTreeMap::new(),
            path: Some(path.to_path_buf()),
        })
    }

    pub fn save(&self) -> Result<(), UnitError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let raw = serde_json::to_string_pretty(self).map_err(|source| UnitError::Parse {
            path: path.clone(),
            source,
        })?;
        fs::write(path, raw).map_err(|source| UnitError::Write {
            path: path.clone(),
            source,
        })
    }

    /// Attach `file` to `unit`, creating the unit entry if needed.
    pub fn attach(&mut self, unit: u8, file: PathBuf) -> Result<(), UnitError> {
        if unit >= PUNCH_UNITS {
            return Err(UnitError::NoUnit(unit_name(unit)));
        }
        self.units.insert(key(unit), Some(file));
        self.save()
    }

    /// Every known unit with its attached file.
    pub fn entries(&self) -> impl Iterator<Item = (&str, Option<&Path>)> {
        self.units
            .iter()
            .map(|(name, file)| (name.as_str(), file.as_deref()))
    }

    fn slot(&self, unit: u8) -> Result<&Option<PathBuf>, UnitError> {
        self.units
            .get(&key(unit))
            .ok_or_else(|| UnitError::NoUnit(unit_name(unit)))
    }
}

impl Units for UnitTable {
    fn attached(&self, unit: u8) -> Result<Option<PathBuf>, UnitError> {
        Ok(self.slot(unit)?.clone())
    }

    fn detach(&mut self, unit: u8) -> Result<PathBuf, UnitError> {
        let file = self
            .slot(unit)?
            .clone()
            .ok_or_else(|| UnitError::NotAttached(unit_name(unit)))?;
        self.units.insert(key(unit), None);
        self.save()?;
        debug!(unit = %unit_name(unit), file = %file.display(), "detached unit");
        Ok(file)
    }
}

fn key(unit: u8) -> String {
    format!("cdp{unit}")
}

/// Unit names are case-insensitive; keys are stored as `cdpN`.
fn lowercase_keys<'de, D>(de: D) -> Result<BTreeMap<String, Option<PathBuf>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = BTreeMap::<String, Option<PathBuf>>::deserialize(de)?;
    Ok(raw
        .into_iter()
        .map(|(name, file)| (name.to_ascii_lowercase(), file))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_unit_tokens() {
        assert_eq!(source_unit("CDP1"), Some(1));
        assert_eq!(source_unit("cdp3"), Some(3));
        assert_eq!(source_unit("CDP0"), None);
        assert_eq!(source_unit("CDP4"), None);
        assert_eq!(source_unit("CDP12"), None);
        assert_eq!(source_unit("deck.crd"), None);
        assert_eq!(source_unit("CD"), None);
    }

    #[test]
    fn detach_follows_attach_state() {
        let mut table: UnitTable =
            serde_json::from_str(r#"{"units": {"cdp1": "a.crd", "cdp2": null}}"#).unwrap();
        assert!(matches!(table.detach(3), Err(UnitError::NoUnit(_))));
        assert!(matches!(table.detach(2), Err(UnitError::NotAttached(_))));
        assert_eq!(table.detach(1).unwrap(), PathBuf::from("a.crd"));
        assert!(matches!(table.detach(1), Err(UnitError::NotAttached(_))));
        assert_eq!(table.attached(1).unwrap(), None);
    }

    #[test]
    fn unit_names_in_table_ignore_case() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("units.json");
        fs::write(&path, r#"{"units": {"CDP1": "a.crd", "Cdp0": null}}"#).unwrap();
        let mut table = UnitTable::load(&path).unwrap();
        assert_eq!(table.attached(0).unwrap(), None);
        assert_eq!(table.detach(1).unwrap(), PathBuf::from("a.crd"));
        let names: Vec<&str> = table.entries().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["cdp0", "cdp1"]);
    }

    #[test]
    fn missing_device_reports_no_device() {
        assert!(matches!(NoUnits.detach(1), Err(UnitError::NoDevice(_))));
    }

    #[test]
    fn table_persists_detach() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("units.json");
        let mut table = UnitTable::load_or_default(&path).unwrap();
        table.attach(1, PathBuf::from("punch.crd")).unwrap();
        table.attach(0, PathBuf::from("print.txt")).unwrap();
        assert!(matches!(
            table.attach(4, PathBuf::from("x")),
            Err(UnitError::NoUnit(_))
        ));

        let mut reloaded = UnitTable::load(&path).unwrap();
        assert_eq!(reloaded.detach(1).unwrap(), PathBuf::from("punch.crd"));
        let after = UnitTable::load(&path).unwrap();
        assert_eq!(after.attached(1).unwrap(), None);
        assert_eq!(after.attached(0).unwrap(), Some(PathBuf::from("print.txt")));
    }
}
