//! Error types for cosave persistence

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SerializationError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to read cosave {path}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write cosave {path}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("encoding error: {0}")]
    Encode(#[from] bincode::Error),

    #[error("record '{record}' has version {found}, expected {expected}")]
    VersionMismatch {
        record: String,
        found: u32,
        expected: u32,
    },
}
