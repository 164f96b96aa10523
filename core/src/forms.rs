//! Form resolution
//!
//! Rule files name characters, races, factions and keywords by string. The
//! host turns those strings into [`FormId`]s through [`FormLookup`];
//! [`FormTable`] is a table-backed implementation used by the CLI and tests.
//!
//! Accepted selector forms:
//! - `0x0001A696` — literal form id
//! - `0x01A696|Skyrim.esm` — id local to a plugin, mapped through load order
//! - `KhajiitRace` — editor id

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::actor::FormId;

/// Top byte of runtime-created forms.
const RUNTIME_INDEX: u32 = 0xFF;
/// Top byte of forms from light plugins.
const LIGHT_INDEX: u32 = 0xFE;

/// Resolves rule-file selector strings to form ids.
pub trait FormLookup {
    /// Resolve a selector string. `None` when nothing matches.
    fn resolve(&self, selector: &str) -> Option<FormId>;

    /// Map a form id read from a save to the current load order.
    ///
    /// Defaults to identity; hosts whose load order can shift between
    /// sessions override this. `None` drops the saved entry.
    fn remap_saved(&self, form_id: FormId) -> Option<FormId> {
        Some(form_id)
    }
}

/// Errors loading a form table
#[derive(Debug, Error)]
pub enum FormTableError {
    #[error("failed to read form table {path}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse form table TOML in {path}")]
    ParseToml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// On-disk layout of `forms.toml`.
#[derive(Debug, Default, Deserialize)]
struct FormTableFile {
    #[serde(default)]
    plugins: HashMap<String, u32>,
    #[serde(default)]
    light_plugins: HashMap<String, u32>,
    #[serde(default)]
    editor_ids: HashMap<String, FormId>,
}

/// Table-backed [`FormLookup`]. All names compare case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct FormTable {
    plugins: HashMap<String, u32>,
    light_plugins: HashMap<String, u32>,
    editor_ids: HashMap<String, FormId>,
}

impl FormTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a table from a TOML file. A missing file yields an empty table.
    pub fn load(path: &Path) -> Result<Self, FormTableError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No form table, using literal ids only");
            return Ok(Self::new());
        }
        let content = fs::read_to_string(path).map_err(|source| FormTableError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        let file: FormTableFile =
            toml::from_str(&content).map_err(|source| FormTableError::ParseToml {
                path: path.to_path_buf(),
                source,
            })?;

        let mut table = Self::new();
        for (name, index) in file.plugins {
            table.add_plugin(&name, index);
        }
        for (name, index) in file.light_plugins {
            table.add_light_plugin(&name, index);
        }
        for (name, id) in file.editor_ids {
            table.add_editor_id(&name, id);
        }
        Ok(table)
    }

    pub fn add_plugin(&mut self, name: &str, load_index: u32) -> &mut Self {
        self.plugins.insert(name.to_lowercase(), load_index);
        self
    }

    pub fn add_light_plugin(&mut self, name: &str, light_index: u32) -> &mut Self {
        self.light_plugins.insert(name.to_lowercase(), light_index);
        self
    }

    pub fn add_editor_id(&mut self, editor_id: &str, form_id: FormId) -> &mut Self {
        self.editor_ids.insert(editor_id.to_lowercase(), form_id);
        self
    }

    fn resolve_plugin_local(&self, local: &str, plugin: &str) -> Option<FormId> {
        let local = parse_hex(local)?;
        let plugin = plugin.trim().to_lowercase();
        if let Some(&index) = self.plugins.get(&plugin) {
            return Some((index << 24) | (local & 0x00FF_FFFF));
        }
        self.light_plugins
            .get(&plugin)
            .map(|&index| (LIGHT_INDEX << 24) | ((index & 0xFFF) << 12) | (local & 0xFFF))
    }
}

impl FormLookup for FormTable {
    fn resolve(&self, selector: &str) -> Option<FormId> {
        let selector = selector.trim();
        if let Some((local, plugin)) = selector.split_once('|') {
            return self.resolve_plugin_local(local, plugin);
        }
        if selector.starts_with("0x") || selector.starts_with("0X") {
            return parse_hex(selector);
        }
        self.editor_ids.get(&selector.to_lowercase()).copied()
    }

    /// Keep saved ids whose plugin is still loaded. A table without any
    /// load order keeps everything.
    fn remap_saved(&self, form_id: FormId) -> Option<FormId> {
        if self.plugins.is_empty() && self.light_plugins.is_empty() {
            return Some(form_id);
        }
        let loaded = match form_origin(form_id) {
            FormOrigin::Runtime => true,
            FormOrigin::Plugin { index } => self.plugins.values().any(|&i| i == index),
            FormOrigin::LightPlugin { index } => self.light_plugins.values().any(|&i| i == index),
        };
        if !loaded {
            tracing::debug!(
                form_id,
                local_id = %local_id_hex(form_id),
                origin = ?form_origin(form_id),
                "Saved form's plugin is no longer loaded"
            );
        }
        loaded.then_some(form_id)
    }
}

fn parse_hex(s: &str) -> Option<FormId> {
    let s = s.trim();
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    u32::from_str_radix(digits, 16).ok()
}

/// Which kind of file a form id belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormOrigin {
    Runtime,
    Plugin { index: u32 },
    LightPlugin { index: u32 },
}

/// Decode the load-order origin of a form id.
pub fn form_origin(form_id: FormId) -> FormOrigin {
    match form_id >> 24 {
        RUNTIME_INDEX => FormOrigin::Runtime,
        LIGHT_INDEX => FormOrigin::LightPlugin {
            index: (form_id & 0x00FF_F000) >> 12,
        },
        index => FormOrigin::Plugin { index },
    }
}

/// Six-digit local id of a form, for log output.
pub fn local_id_hex(form_id: FormId) -> String {
    format!("{:06x}", form_id & 0x00FF_FFFF)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> FormTable {
        let mut t = FormTable::new();
        t.add_plugin("Skyrim.esm", 0)
            .add_plugin("MyMod.esp", 0x2A)
            .add_light_plugin("Tiny.esl", 3)
            .add_editor_id("KhajiitRace", 0x13745);
        t
    }

    #[test]
    fn resolves_literal_hex() {
        assert_eq!(table().resolve("0x00000014"), Some(0x14));
        assert_eq!(table().resolve("0XFF000800"), Some(0xFF00_0800));
        assert_eq!(table().resolve("0xnothex"), None);
    }

    #[test]
    fn resolves_plugin_relative_ids() {
        let t = table();
        assert_eq!(t.resolve("0x01A696|Skyrim.esm"), Some(0x0001_A696));
        assert_eq!(t.resolve("800|mymod.ESP"), Some(0x2A00_0800));
        assert_eq!(t.resolve("0x801|Tiny.esl"), Some(0xFE00_3801));
        assert_eq!(t.resolve("0x801|Missing.esp"), None);
    }

    #[test]
    fn resolves_editor_ids_case_insensitively() {
        assert_eq!(table().resolve("khajiitrace"), Some(0x13745));
        assert_eq!(table().resolve("ArgonianRace"), None);
    }

    #[test]
    fn decodes_origin() {
        assert_eq!(form_origin(0xFF00_0001), FormOrigin::Runtime);
        assert_eq!(form_origin(0xFE00_3801), FormOrigin::LightPlugin { index: 3 });
        assert_eq!(form_origin(0x2A00_0800), FormOrigin::Plugin { index: 0x2A });
        assert_eq!(local_id_hex(0x2A00_0800), "000800");
    }

    #[test]
    fn remaps_saved_ids_against_load_order() {
        let t = table();
        assert_eq!(t.remap_saved(0x0001_A696), Some(0x0001_A696));
        assert_eq!(t.remap_saved(0x2A00_0800), Some(0x2A00_0800));
        assert_eq!(t.remap_saved(0xFE00_3801), Some(0xFE00_3801));
        assert_eq!(t.remap_saved(0xFF00_0001), Some(0xFF00_0001));
        assert_eq!(t.remap_saved(0x0500_0800), None);
        assert_eq!(t.remap_saved(0xFE00_7801), None);

        let literal_only = FormTable::new();
        assert_eq!(literal_only.remap_saved(0x0500_0800), Some(0x0500_0800));
    }

    #[test]
    fn loads_table_from_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("forms.toml");
        fs::write(
            &path,
            "[plugins]\n\"Skyrim.esm\" = 0\n[editor_ids]\nNordRace = 0x13746\n",
        )
        .unwrap();
        let t = FormTable::load(&path).unwrap();
        assert_eq!(t.resolve("nordrace"), Some(0x13746));
        assert_eq!(t.resolve("0x14|Skyrim.esm"), Some(0x14));

        let missing = FormTable::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(missing.resolve("NordRace"), None);
    }
}
