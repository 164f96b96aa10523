//! Texture profiles
//!
//! A texture profile is one folder under the texture root:
//!
//! ```text
//! <root>/<ProfileName>/
//!     <BodyFamily>/        folder holding any file with "body" in its name
//!         femalebody_1.dds, femalebody_1_msn.dds, femalehands_1.dds,
//!         femalehead.dds, femaleheadvampire.dds, ...
//!     <RaceFolder>/        any other folder: per-race head normals
//!         femalehead_msn.dds, femaleheadvampire_msn.dds
//! ```
//!
//! The body family folder name is what the profile is applicable to: a
//! character qualifies when its current body normal map lives in a folder of
//! the same name.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use dynbody_types::ProfileKind;

use crate::actor::{Character, texture_family};
use crate::host::{BodyPart, CharacterHost, TextureSet, TextureType};

use super::{ApplyError, Profile, ProfileError, split_private_name};

#[derive(Debug, Clone)]
pub struct TextureProfile {
    name: String,
    private: bool,
    /// Lower-cased name of the body family folder.
    body_family: String,
    head: TextureSet,
    head_vampire: TextureSet,
    body: TextureSet,
    hands: TextureSet,
    /// Race folder (lower-cased) -> head normal map.
    head_normals: HashMap<String, String>,
    head_normals_vampire: HashMap<String, String>,
}

impl TextureProfile {
    /// Build a profile from its folder.
    pub fn from_dir(dir: &Path) -> Result<Self, ProfileError> {
        let raw_name = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let (name, private) = split_private_name(&raw_name).ok_or_else(|| {
            ProfileError::EmptyName {
                path: dir.to_path_buf(),
            }
        })?;

        let mut profile = Self {
            name,
            private,
            body_family: String::new(),
            head: TextureSet::default(),
            head_vampire: TextureSet::default(),
            body: TextureSet::default(),
            hands: TextureSet::default(),
            head_normals: HashMap::new(),
            head_normals_vampire: HashMap::new(),
        };
        tracing::debug!(profile = %profile.name, "Reading texture profile");

        for sub in sorted_entries(dir)? {
            if !sub.is_dir() {
                continue;
            }
            let files = sorted_entries(&sub)?;
            if has_body_textures(&files) {
                if !profile.body_family.is_empty() {
                    tracing::warn!(
                        profile = %profile.name,
                        folder = %sub.display(),
                        "Profile has more than one body folder, ignoring"
                    );
                    continue;
                }
                profile.body_family = folder_key(&sub);
                profile.read_body_folder(&files);
            } else {
                profile.read_extra_folder(&sub, &files);
            }
        }

        if profile.body_family.is_empty() {
            return Err(ProfileError::MissingAssets {
                path: dir.to_path_buf(),
                reason: "no folder with body textures".to_string(),
            });
        }
        if profile.body.is_empty() {
            return Err(ProfileError::MissingAssets {
                path: dir.to_path_buf(),
                reason: "body folder has no .dds body textures".to_string(),
            });
        }
        Ok(profile)
    }

    fn read_body_folder(&mut self, files: &[PathBuf]) {
        // Generic head files fill both head sets; vampire files then override
        // the vampire set, whatever the directory order was.
        let mut dds: Vec<(String, &PathBuf, TextureType)> = files
            .iter()
            .filter_map(|path| {
                let file_name = path.file_name()?.to_string_lossy().to_lowercase();
                let ty = TextureType::from_file_name(&file_name)?;
                Some((file_name, path, ty))
            })
            .collect();
        dds.sort_by_key(|(file_name, _, _)| file_name.contains("headvampire"));

        for (file_name, path, ty) in dds {
            let path = texture_path(path);
            if file_name.contains("body") {
                self.body.set(ty, path);
            } else if file_name.contains("hand") {
                self.hands.set(ty, path);
            } else if file_name.contains("headvampire") {
                self.head_vampire.set(ty, path);
            } else if file_name.contains("head") {
                self.head.set(ty, path.clone());
                self.head_vampire.set(ty, path);
            } else {
                tracing::debug!(profile = %self.name, file = %file_name, "Unused texture file");
            }
        }
    }

    fn read_extra_folder(&mut self, folder: &Path, files: &[PathBuf]) {
        let key = folder_key(folder);
        for path in files {
            let Some(file_name) = path.file_name().map(|n| n.to_string_lossy().to_lowercase())
            else {
                continue;
            };
            if TextureType::from_file_name(&file_name).is_none() {
                continue;
            }
            if file_name.contains("vampire") {
                self.head_normals_vampire.insert(key.clone(), texture_path(path));
            } else if file_name.contains("head") {
                self.head_normals.insert(key.clone(), texture_path(path));
            }
        }
    }

    pub fn body_family(&self) -> &str {
        &self.body_family
    }

    pub fn textures(&self, part: BodyPart, vampire: bool) -> &TextureSet {
        match part {
            BodyPart::Head if vampire => &self.head_vampire,
            BodyPart::Head => &self.head,
            BodyPart::Body => &self.body,
            BodyPart::Hands => &self.hands,
        }
    }

    /// Head normal override for a race folder, if the profile ships one.
    pub fn head_normal(&self, race_folder: &str, vampire: bool) -> Option<&str> {
        let vampire_normal = vampire
            .then(|| self.head_normals_vampire.get(race_folder))
            .flatten();
        vampire_normal
            .or_else(|| self.head_normals.get(race_folder))
            .map(String::as_str)
    }

    fn apply_head(&self, actor: &Character, host: &mut dyn CharacterHost) -> Result<(), ApplyError> {
        if !actor.skin.has_face_part {
            return Err(ApplyError::MissingFacePart {
                form_id: actor.form_id,
                name: actor.name.clone(),
            });
        }
        let vampire = actor.is_vampire();
        let set = self.textures(BodyPart::Head, vampire);
        let normal = actor
            .skin
            .head_normal
            .as_deref()
            .and_then(texture_family)
            .and_then(|race| self.head_normal(&race, vampire));
        match normal {
            Some(normal) => host.set_texture_set(actor.form_id, BodyPart::Head, &set.with_normal(normal)),
            None => host.set_texture_set(actor.form_id, BodyPart::Head, set),
        }
        Ok(())
    }

    fn apply_skin(&self, actor: &Character, host: &mut dyn CharacterHost) -> Result<(), ApplyError> {
        if !actor.skin.has_skin {
            return Err(ApplyError::MissingSkin {
                form_id: actor.form_id,
                name: actor.name.clone(),
            });
        }
        host.set_texture_set(actor.form_id, BodyPart::Body, &self.body);
        if !self.hands.is_empty() {
            host.set_texture_set(actor.form_id, BodyPart::Hands, &self.hands);
        }
        Ok(())
    }
}

impl Profile for TextureProfile {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_private(&self) -> bool {
        self.private
    }

    fn kind(&self) -> ProfileKind {
        ProfileKind::Texture
    }

    fn is_applicable(&self, actor: &Character) -> bool {
        actor
            .skin
            .body_normal
            .as_deref()
            .and_then(texture_family)
            .is_some_and(|family| family == self.body_family)
    }

    fn apply(&self, actor: &Character, host: &mut dyn CharacterHost) -> Result<(), ApplyError> {
        host.reset_model(actor.form_id);
        host.update_skin_color(actor.form_id);
        self.apply_head(actor, host)?;
        self.apply_skin(actor, host)
    }
}

fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>, ProfileError> {
    let entries = fs::read_dir(dir).map_err(|source| ProfileError::ReadDir {
        path: dir.to_path_buf(),
        source,
    })?;
    let mut paths: Vec<PathBuf> = entries.flatten().map(|e| e.path()).collect();
    paths.sort();
    Ok(paths)
}

fn has_body_textures(files: &[PathBuf]) -> bool {
    files.iter().any(|path| {
        path.is_file()
            && path
                .file_name()
                .is_some_and(|n| n.to_string_lossy().to_lowercase().contains("body"))
    })
}

fn folder_key(folder: &Path) -> String {
    folder
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

fn texture_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
