//! Host engine seam
//!
//! Profiles never touch the engine directly. Applying a profile is expressed
//! as calls on [`CharacterHost`], which the game-side glue implements against
//! the real model. [`RecordingHost`] records the calls instead, for dry runs
//! and tests.

use std::fmt;

use crate::actor::FormId;

/// Texture slots of a shader texture set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureType {
    Diffuse = 0,
    Normal = 1,
    SubsurfaceTint = 2,
    Height = 3,
    Specular = 4,
}

impl TextureType {
    pub const COUNT: usize = 5;

    pub const ALL: [TextureType; Self::COUNT] = [
        TextureType::Diffuse,
        TextureType::Normal,
        TextureType::SubsurfaceTint,
        TextureType::Height,
        TextureType::Specular,
    ];

    /// Classify a `.dds` file by its suffix. `None` for non-dds files.
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let name = file_name.to_lowercase();
        if name.ends_with("_msn.dds") {
            Some(TextureType::Normal)
        } else if name.ends_with("_s.dds") {
            Some(TextureType::Specular)
        } else if name.ends_with("_sk.dds") {
            Some(TextureType::SubsurfaceTint)
        } else if name.ends_with("map.dds") {
            Some(TextureType::Height)
        } else if name.ends_with(".dds") {
            Some(TextureType::Diffuse)
        } else {
            None
        }
    }
}

/// Texture paths per slot. Empty slots keep whatever the model already has.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextureSet {
    paths: [Option<String>; TextureType::COUNT],
}

impl TextureSet {
    pub fn set(&mut self, ty: TextureType, path: impl Into<String>) {
        self.paths[ty as usize] = Some(path.into());
    }

    pub fn get(&self, ty: TextureType) -> Option<&str> {
        self.paths[ty as usize].as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.iter().all(Option::is_none)
    }

    /// Copy of this set with the normal map replaced.
    pub fn with_normal(&self, normal: &str) -> Self {
        let mut set = self.clone();
        set.set(TextureType::Normal, normal);
        set
    }
}

/// Model part a texture set is applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyPart {
    Head,
    Body,
    Hands,
}

impl fmt::Display for BodyPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BodyPart::Head => f.write_str("head"),
            BodyPart::Body => f.write_str("body"),
            BodyPart::Hands => f.write_str("hands"),
        }
    }
}

/// Engine operations profiles are applied through.
pub trait CharacterHost {
    /// Rebuild the character's 3D model from its base data.
    fn reset_model(&mut self, actor: FormId);

    fn update_skin_color(&mut self, actor: FormId);

    /// Swap the textures of every facegen geometry under `part`.
    fn set_texture_set(&mut self, actor: FormId, part: BodyPart, textures: &TextureSet);

    /// Set one body morph value under `key`.
    fn set_morph(&mut self, actor: FormId, slider: &str, key: &str, value: f32);

    /// Push pending morphs to the model and refresh its weight.
    fn update_body_morphs(&mut self, actor: FormId);
}

/// One recorded [`CharacterHost`] call.
#[derive(Debug, Clone, PartialEq)]
pub enum HostCall {
    ResetModel(FormId),
    UpdateSkinColor(FormId),
    SetTextureSet {
        actor: FormId,
        part: BodyPart,
        textures: TextureSet,
    },
    SetMorph {
        actor: FormId,
        slider: String,
        key: String,
        value: f32,
    },
    UpdateBodyMorphs(FormId),
}

/// Host that records calls instead of touching a model.
#[derive(Debug, Default)]
pub struct RecordingHost {
    pub calls: Vec<HostCall>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls_for(&self, actor: FormId) -> impl Iterator<Item = &HostCall> {
        self.calls.iter().filter(move |call| match call {
            HostCall::ResetModel(id)
            | HostCall::UpdateSkinColor(id)
            | HostCall::UpdateBodyMorphs(id) => *id == actor,
            HostCall::SetTextureSet { actor: id, .. } | HostCall::SetMorph { actor: id, .. } => {
                *id == actor
            }
        })
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }
}

impl CharacterHost for RecordingHost {
    fn reset_model(&mut self, actor: FormId) {
        self.calls.push(HostCall::ResetModel(actor));
    }

    fn update_skin_color(&mut self, actor: FormId) {
        self.calls.push(HostCall::UpdateSkinColor(actor));
    }

    fn set_texture_set(&mut self, actor: FormId, part: BodyPart, textures: &TextureSet) {
        self.calls.push(HostCall::SetTextureSet {
            actor,
            part,
            textures: textures.clone(),
        });
    }

    fn set_morph(&mut self, actor: FormId, slider: &str, key: &str, value: f32) {
        self.calls.push(HostCall::SetMorph {
            actor,
            slider: slider.to_string(),
            key: key.to_string(),
            value,
        });
    }

    fn update_body_morphs(&mut self, actor: FormId) {
        self.calls.push(HostCall::UpdateBodyMorphs(actor));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_texture_suffixes() {
        assert_eq!(TextureType::from_file_name("body_msn.dds"), Some(TextureType::Normal));
        assert_eq!(TextureType::from_file_name("Body_S.DDS"), Some(TextureType::Specular));
        assert_eq!(TextureType::from_file_name("body_sk.dds"), Some(TextureType::SubsurfaceTint));
        assert_eq!(TextureType::from_file_name("headmap.dds"), Some(TextureType::Height));
        assert_eq!(TextureType::from_file_name("body.dds"), Some(TextureType::Diffuse));
        assert_eq!(TextureType::from_file_name("readme.txt"), None);
    }

    #[test]
    fn with_normal_keeps_other_slots() {
        let mut set = TextureSet::default();
        assert!(set.is_empty());
        set.set(TextureType::Diffuse, "head.dds");
        set.set(TextureType::Normal, "head_msn.dds");
        let swapped = set.with_normal("khajiit/head_msn.dds");
        assert_eq!(swapped.get(TextureType::Diffuse), Some("head.dds"));
        assert_eq!(swapped.get(TextureType::Normal), Some("khajiit/head_msn.dds"));
    }
}
