//! Slider profiles
//!
//! A slider profile is one TOML file under the slider root. The file stem is
//! the profile name. Each slider carries its value at the smallest and
//! biggest NPC weight; the applied value is interpolated by the character's
//! weight.
//!
//! ```toml
//! sex = "female"          # optional, profile applies to both sexes without it
//!
//! [sliders]
//! Breasts = { small = 10, big = 60 }
//! Butt = { small = 0, big = 35 }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use dynbody_types::{ProfileKind, Sex};

use crate::actor::Character;
use crate::host::CharacterHost;

use super::{ApplyError, Profile, ProfileError, split_private_name};

/// Key all morphs set by this plugin are stored under.
pub const MORPH_KEY: &str = "DynBody_Morph";

/// Slider values at weight 0 and weight 100, in percent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct SliderRange {
    #[serde(default)]
    pub small: i32,
    #[serde(default)]
    pub big: i32,
}

impl SliderRange {
    /// Morph value for a 0..=1 weight factor.
    pub fn interpolate(&self, weight: f32) -> f32 {
        let value = (self.big - self.small) as f32 * weight + self.small as f32;
        value / 100.0
    }
}

#[derive(Debug, Deserialize)]
struct SliderFile {
    #[serde(default)]
    sex: Option<Sex>,
    #[serde(default)]
    sliders: BTreeMap<String, SliderRange>,
}

#[derive(Debug, Clone)]
pub struct SliderProfile {
    name: String,
    private: bool,
    sex: Option<Sex>,
    sliders: BTreeMap<String, SliderRange>,
}

impl SliderProfile {
    /// Parse a profile from its TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ProfileError> {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let (name, private) = split_private_name(&stem).ok_or_else(|| ProfileError::EmptyName {
            path: path.to_path_buf(),
        })?;

        let content = fs::read_to_string(path).map_err(|source| ProfileError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        let file: SliderFile = toml::from_str(&content).map_err(|source| ProfileError::ParseToml {
            path: path.to_path_buf(),
            source,
        })?;

        if file.sliders.is_empty() {
            return Err(ProfileError::MissingAssets {
                path: path.to_path_buf(),
                reason: "no sliders defined".to_string(),
            });
        }

        Ok(Self {
            name,
            private,
            sex: file.sex,
            sliders: file.sliders,
        })
    }

    pub fn sex(&self) -> Option<Sex> {
        self.sex
    }

    pub fn sliders(&self) -> impl Iterator<Item = (&str, &SliderRange)> {
        self.sliders.iter().map(|(name, range)| (name.as_str(), range))
    }
}

impl Profile for SliderProfile {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_private(&self) -> bool {
        self.private
    }

    fn kind(&self) -> ProfileKind {
        ProfileKind::Slider
    }

    fn is_applicable(&self, actor: &Character) -> bool {
        self.sex.is_none_or(|sex| sex == actor.sex)
    }

    fn apply(&self, actor: &Character, host: &mut dyn CharacterHost) -> Result<(), ApplyError> {
        let weight = actor.weight_factor();
        for (slider, range) in &self.sliders {
            host.set_morph(actor.form_id, slider, MORPH_KEY, range.interpolate(weight));
        }
        host.update_body_morphs(actor.form_id);
        Ok(())
    }
}
