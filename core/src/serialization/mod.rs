//! Cosave persistence
//!
//! The cosave is a sequence of typed, versioned records written next to a
//! save game. Each subsystem owns one record type; the profiles record holds
//! the selection cache and the exclusion set. The whole file is bincode.
//!
//! [`save_callback`], [`load_callback`] and [`revert_callback`] mirror the
//! host's serialization hooks.

mod error;
mod record;

use std::fs;
use std::io::{Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

pub use error::SerializationError;
pub use record::{CacheRecord, ProfilesRecord};

use crate::distribution::Distribution;
use crate::forms::FormLookup;

/// Four-byte record tag.
pub type RecordType = [u8; 4];

/// Tag of the profiles record.
pub const PROFILES_RECORD: RecordType = *b"\0prf";

/// Current version of the profiles record.
pub const PROFILES_VERSION: u32 = 1;

/// Printable form of a record tag. Non-printable bytes become `_`.
pub fn record_type_name(record_type: RecordType) -> String {
    record_type
        .iter()
        .map(|&b| {
            if b.is_ascii_graphic() || b == b' ' {
                b as char
            } else {
                '_'
            }
        })
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Cosave Container
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub record_type: RecordType,
    pub version: u32,
    pub data: Vec<u8>,
}

impl Record {
    /// Fail unless the record carries `expected`.
    pub fn check_version(&self, expected: u32) -> Result<(), SerializationError> {
        if self.version != expected {
            return Err(SerializationError::VersionMismatch {
                record: record_type_name(self.record_type),
                found: self.version,
                expected,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cosave {
    records: Vec<Record>,
}

impl Cosave {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_record(&mut self, record_type: RecordType, version: u32, data: Vec<u8>) {
        self.records.push(Record {
            record_type,
            version,
            data,
        });
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn write_to<W: Write>(&self, writer: W) -> Result<(), SerializationError> {
        bincode::serialize_into(writer, self)?;
        Ok(())
    }

    pub fn read_from<R: Read>(reader: R) -> Result<Self, SerializationError> {
        Ok(bincode::deserialize_from(reader)?)
    }

    /// Write to `path` through a temporary file and rename.
    pub fn save(&self, path: &Path) -> Result<(), SerializationError> {
        let bytes = bincode::serialize(self)?;
        let temp_path = path.with_extension("cosave.tmp");

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| SerializationError::WriteFile {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(&temp_path, bytes).map_err(|source| SerializationError::WriteFile {
            path: temp_path.clone(),
            source,
        })?;
        fs::rename(&temp_path, path).map_err(|source| SerializationError::WriteFile {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::debug!(path = %path.display(), records = self.records.len(), "Saved cosave");
        Ok(())
    }

    /// Read from `path`. `None` when no cosave exists yet.
    pub fn load(path: &Path) -> Result<Option<Self>, SerializationError> {
        if !path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(path).map_err(|source| SerializationError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        let cosave: Cosave = bincode::deserialize(&bytes)?;
        tracing::debug!(path = %path.display(), records = cosave.records.len(), "Loaded cosave");
        Ok(Some(cosave))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Host Callbacks
// ─────────────────────────────────────────────────────────────────────────────

/// Append the profiles record to `cosave`.
pub fn save_callback(
    distribution: &Distribution,
    cosave: &mut Cosave,
) -> Result<(), SerializationError> {
    let mut data = Vec::new();
    distribution.save(&mut data)?;
    cosave.write_record(PROFILES_RECORD, PROFILES_VERSION, data);
    Ok(())
}

/// Restore state from every record this plugin understands.
///
/// State from the previous save is dropped first, so a cosave without a
/// usable profiles record leaves the distribution empty. Unknown records and
/// version mismatches are logged and skipped. Returns the number of records
/// applied.
pub fn load_callback(
    distribution: &mut Distribution,
    cosave: &Cosave,
    lookup: &dyn FormLookup,
) -> usize {
    distribution.revert();
    let mut applied = 0;
    for record in cosave.records() {
        let name = record_type_name(record.record_type);
        match record.record_type {
            PROFILES_RECORD => {
                if let Err(e) = record.check_version(PROFILES_VERSION) {
                    tracing::error!(error = %e, "Skipping cosave record");
                    continue;
                }
                match distribution.load(record.data.as_slice(), lookup) {
                    Ok(()) => applied += 1,
                    Err(e) => {
                        tracing::error!(record = %name, error = %e, "Failed to read cosave record");
                        distribution.revert();
                    }
                }
            }
            _ => tracing::warn!(record = %name, "Unknown cosave record type"),
        }
    }
    applied
}

/// Drop all per-save state.
pub fn revert_callback(distribution: &mut Distribution) {
    distribution.revert();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_type_names_are_printable() {
        assert_eq!(record_type_name(PROFILES_RECORD), "_prf");
        assert_eq!(record_type_name(*b"ABCD"), "ABCD");
        assert_eq!(record_type_name([0xFF, b'a', 0x07, b'z']), "_a_z");
    }

    #[test]
    fn version_check_reports_both_versions() {
        let record = Record {
            record_type: PROFILES_RECORD,
            version: 2,
            data: Vec::new(),
        };
        assert!(record.check_version(2).is_ok());
        match record.check_version(1) {
            Err(SerializationError::VersionMismatch {
                record,
                found,
                expected,
            }) => {
                assert_eq!(record, "_prf");
                assert_eq!(found, 2);
                assert_eq!(expected, 1);
            }
            other => panic!("expected VersionMismatch, got {other:?}"),
        }
    }

    #[test]
    fn cosave_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("saves").join("slot1.cosave");
        assert!(Cosave::load(&path).unwrap().is_none());

        let mut cosave = Cosave::new();
        cosave.write_record(*b"TEST", 3, vec![1, 2, 3]);
        cosave.save(&path).unwrap();

        let loaded = Cosave::load(&path).unwrap().unwrap();
        assert_eq!(loaded, cosave);
        assert_eq!(loaded.records()[0].version, 3);
    }

    #[test]
    fn truncated_cosave_is_an_error() {
        let mut bytes = Vec::new();
        let mut cosave = Cosave::new();
        cosave.write_record(PROFILES_RECORD, 1, vec![9; 16]);
        cosave.write_to(&mut bytes).unwrap();
        bytes.truncate(bytes.len() / 2);
        assert!(matches!(
            Cosave::read_from(bytes.as_slice()),
            Err(SerializationError::Encode(_))
        ));
    }
}
