//! Error types for configuration and session setup

use thiserror::Error;

use crate::forms::FormTableError;
use crate::rules::RuleError;
use crate::serialization::SerializationError;

/// Errors during configuration operations
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration")]
    Load(#[from] confy::ConfyError),

    #[error("failed to save configuration")]
    Save(#[source] confy::ConfyError),

    #[error("data root {path} does not exist")]
    MissingDataRoot { path: std::path::PathBuf },
}

/// Errors while opening a session from a configuration
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Forms(#[from] FormTableError),

    #[error(transparent)]
    Rules(#[from] RuleError),

    #[error(transparent)]
    Cosave(#[from] SerializationError),
}
