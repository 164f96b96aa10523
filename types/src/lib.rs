//! Shared configuration types for dynbody
//!
//! This crate contains serializable types shared between the engine
//! (dynbody-core) and its front ends. Persistence of [`AppConfig`] lives in
//! dynbody-core behind the `AppConfigExt` trait.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Character Attributes
// ─────────────────────────────────────────────────────────────────────────────

/// Biological sex of a character as reported by the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    #[default]
    Male,
    Female,
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sex::Male => f.write_str("male"),
            Sex::Female => f.write_str("female"),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Profile Kinds
// ─────────────────────────────────────────────────────────────────────────────

/// The kinds of profile a character can carry, one selection slot each.
///
/// The discriminant doubles as the slot index into a profile array, so the
/// order here is also the order slots are persisted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileKind {
    Texture = 0,
    Slider = 1,
}

impl ProfileKind {
    /// Number of selection slots per character.
    pub const COUNT: usize = 2;

    /// All kinds in slot order.
    pub const ALL: [ProfileKind; Self::COUNT] = [ProfileKind::Texture, ProfileKind::Slider];

    /// Slot index of this kind.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Key used for this kind's profile list in rule files.
    pub fn rule_key(self) -> &'static str {
        match self {
            ProfileKind::Texture => "textures",
            ProfileKind::Slider => "sliders",
        }
    }
}

impl fmt::Display for ProfileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfileKind::Texture => f.write_str("texture"),
            ProfileKind::Slider => f.write_str("slider"),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Application Config
// ─────────────────────────────────────────────────────────────────────────────

/// Top-level configuration.
///
/// Directory fields left empty resolve relative to `data_root` (see the
/// `*_dir` accessors).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Game data directory that holds the texture and rule trees.
    #[serde(default)]
    pub data_root: PathBuf,

    /// Texture profile root. Defaults to `<data_root>/textures/dynbody`.
    #[serde(default)]
    pub texture_root: Option<PathBuf>,

    /// Slider profile root. Defaults to `<data_root>/dynbody/sliders`.
    #[serde(default)]
    pub slider_root: Option<PathBuf>,

    /// Rule file root. Defaults to `<data_root>/dynbody/rules`.
    #[serde(default)]
    pub rule_root: Option<PathBuf>,

    /// Editor-id / plugin table used to resolve rule selectors.
    /// Defaults to `<data_root>/dynbody/forms.toml`.
    #[serde(default)]
    pub forms_file: Option<PathBuf>,

    /// Cosave written by `save` and read by `load`.
    #[serde(default)]
    pub cosave_path: Option<PathBuf>,

    /// Delay between a model load and profile application.
    #[serde(default = "default_apply_delay_ms")]
    pub apply_delay_ms: u64,

    /// Fixed seed for tie-breaking. `None` seeds from entropy.
    #[serde(default)]
    pub rng_seed: Option<u64>,
}

fn default_apply_delay_ms() -> u64 {
    2000
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::with_data_root(PathBuf::new())
    }
}

impl AppConfig {
    /// Create a config rooted at `data_root` with every other field defaulted.
    pub fn with_data_root(data_root: PathBuf) -> Self {
        Self {
            data_root,
            texture_root: None,
            slider_root: None,
            rule_root: None,
            forms_file: None,
            cosave_path: None,
            apply_delay_ms: default_apply_delay_ms(),
            rng_seed: None,
        }
    }

    pub fn texture_dir(&self) -> PathBuf {
        self.texture_root
            .clone()
            .unwrap_or_else(|| self.data_root.join("textures").join("dynbody"))
    }

    pub fn slider_dir(&self) -> PathBuf {
        self.slider_root
            .clone()
            .unwrap_or_else(|| self.data_root.join("dynbody").join("sliders"))
    }

    pub fn rule_dir(&self) -> PathBuf {
        self.rule_root
            .clone()
            .unwrap_or_else(|| self.data_root.join("dynbody").join("rules"))
    }

    pub fn forms_path(&self) -> PathBuf {
        self.forms_file
            .clone()
            .unwrap_or_else(|| self.data_root.join("dynbody").join("forms.toml"))
    }

    pub fn cosave_file(&self) -> PathBuf {
        self.cosave_path
            .clone()
            .unwrap_or_else(|| self.data_root.join("dynbody").join("dynbody.cosave"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_kind_slots_follow_declaration_order() {
        for (i, kind) in ProfileKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config: AppConfig = toml::from_str("data_root = \"/game/Data\"").unwrap();
        assert_eq!(config.apply_delay_ms, 2000);
        assert_eq!(config.rng_seed, None);
        assert_eq!(
            config.texture_dir(),
            PathBuf::from("/game/Data").join("textures").join("dynbody")
        );
        assert_eq!(
            config.rule_dir(),
            PathBuf::from("/game/Data").join("dynbody").join("rules")
        );
    }

    #[test]
    fn explicit_roots_override_data_root() {
        let config: AppConfig = toml::from_str(
            "data_root = \"/game/Data\"\nslider_root = \"/presets\"\nrng_seed = 7",
        )
        .unwrap();
        assert_eq!(config.slider_dir(), PathBuf::from("/presets"));
        assert_eq!(config.rng_seed, Some(7));
    }
}
