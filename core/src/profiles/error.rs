//! Error types for profile loading and application

use std::path::PathBuf;
use thiserror::Error;

use crate::actor::FormId;
use dynbody_types::ProfileKind;

/// Errors while building a profile from its assets
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("profile name derived from {path} is empty")]
    EmptyName { path: PathBuf },

    #[error("profile {path} is missing required assets: {reason}")]
    MissingAssets { path: PathBuf, reason: String },

    #[error("failed to read directory {path}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read {path}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse slider TOML in {path}")]
    ParseToml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("duplicate {kind} profile '{name}'")]
    Duplicate { kind: ProfileKind, name: String },
}

/// Errors while applying a profile to a character
#[derive(Debug, Error)]
pub enum ApplyError {
    #[error("actor {name} ({form_id:08X}) has no face head part")]
    MissingFacePart { form_id: FormId, name: String },

    #[error("actor {name} ({form_id:08X}) has no skin")]
    MissingSkin { form_id: FormId, name: String },

    #[error("no {kind} profile named '{name}'")]
    UnknownProfile { kind: ProfileKind, name: String },
}
