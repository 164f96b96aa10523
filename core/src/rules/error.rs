//! Error types for rule loading

use std::path::PathBuf;
use thiserror::Error;

/// Errors while loading a rule file
#[derive(Debug, Error)]
pub enum RuleError {
    #[error("failed to read rule file {path}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read rule directory {path}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse rule TOML in {path}")]
    ParseToml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to parse rule JSON in {path}")]
    ParseJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("rule '{rule}' has no target")]
    MissingTarget { rule: String },

    #[error("rule '{rule}' has target token '{token}', expected \"*\"")]
    InvalidToken { rule: String, token: String },

    #[error("rule '{rule}' resolved none of its target selectors")]
    UnresolvedTarget { rule: String },

    #[error("rule '{rule}' has no usable profiles and no wildcard")]
    NoProfiles { rule: String },
}
