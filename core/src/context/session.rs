//! Session bootstrap
//!
//! Wires a configuration into a ready [`Distribution`]: loads the form table,
//! both profile trees and the rules, and owns the cosave location.

use dynbody_types::AppConfig;

use super::{ConfigError, SessionError};
use crate::distribution::Distribution;
use crate::forms::FormTable;
use crate::profiles::Profiles;
use crate::rules;
use crate::serialization::{self, Cosave};

/// Everything a host callback needs, owned in one place.
#[derive(Debug)]
pub struct Session {
    pub config: AppConfig,
    pub forms: FormTable,
    pub distribution: Distribution,
}

impl Session {
    pub fn open(config: AppConfig) -> Result<Self, SessionError> {
        let root = &config.data_root;
        if !root.as_os_str().is_empty() && !root.exists() {
            return Err(ConfigError::MissingDataRoot { path: root.clone() }.into());
        }

        let forms = FormTable::load(&config.forms_path())?;
        let profiles = Profiles::load(&config.texture_dir(), &config.slider_dir());
        let rules = rules::load_rules(&config.rule_dir(), &profiles, &forms)?;
        let distribution = Distribution::new(profiles, rules, config.rng_seed);

        Ok(Self {
            config,
            forms,
            distribution,
        })
    }

    /// Write the current selections to the configured cosave.
    pub fn save_cosave(&self) -> Result<(), SessionError> {
        let mut cosave = Cosave::new();
        serialization::save_callback(&self.distribution, &mut cosave)?;
        cosave.save(&self.config.cosave_file())?;
        Ok(())
    }

    /// Restore selections from the configured cosave, if one exists.
    ///
    /// Selections from the previous save never survive, even when the cosave
    /// is missing or unreadable. Returns whether a cosave was found.
    pub fn load_cosave(&mut self) -> Result<bool, SessionError> {
        let path = self.config.cosave_file();
        let loaded = Cosave::load(&path).inspect_err(|_| {
            serialization::revert_callback(&mut self.distribution);
        })?;
        let Some(cosave) = loaded else {
            tracing::info!(path = %path.display(), "No cosave, starting fresh");
            serialization::revert_callback(&mut self.distribution);
            return Ok(false);
        };
        serialization::load_callback(&mut self.distribution, &cosave, &self.forms);
        Ok(true)
    }
}
