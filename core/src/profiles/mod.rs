//! Profile registry
//!
//! This module provides:
//! - **Profiles**: named, immutable asset bundles ([`TextureProfile`],
//!   [`SliderProfile`]) sharing the [`Profile`] contract
//! - **Registries**: per-kind owned collections addressed by stable
//!   [`ProfileHandle`] indices, looked up by case-insensitive name
//! - **Loading**: one directory tree per kind, parsed in parallel; bad entries
//!   are logged and skipped
//!
//! Profiles are created once at startup and never mutated. Rules and the
//! selection cache refer to them by handle only.

mod error;
mod slider;
mod texture;

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

pub use dynbody_types::ProfileKind;
pub use error::{ApplyError, ProfileError};
pub use slider::{MORPH_KEY, SliderProfile, SliderRange};
pub use texture::TextureProfile;

use crate::actor::Character;
use crate::host::CharacterHost;

/// Contract shared by every profile kind.
pub trait Profile: Send + Sync {
    /// Visible name, without the privacy marker.
    fn name(&self) -> &str;

    /// Private profiles never take part in wildcard expansion.
    fn is_private(&self) -> bool;

    fn kind(&self) -> ProfileKind;

    /// Whether this profile's assets fit the character at all.
    fn is_applicable(&self, actor: &Character) -> bool;

    /// Apply the profile through the host.
    fn apply(&self, actor: &Character, host: &mut dyn CharacterHost) -> Result<(), ApplyError>;
}

/// Split a raw asset name into its visible name and privacy flag.
///
/// A leading dot marks the profile private and is stripped. Returns `None`
/// when nothing is left.
pub(crate) fn split_private_name(raw: &str) -> Option<(String, bool)> {
    let (name, private) = match raw.strip_prefix('.') {
        Some(rest) => (rest, true),
        None => (raw, false),
    };
    let name = name.trim();
    (!name.is_empty()).then(|| (name.to_string(), private))
}

// ─────────────────────────────────────────────────────────────────────────────
// Registry
// ─────────────────────────────────────────────────────────────────────────────

/// Stable index of a profile inside its kind's registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProfileHandle(u32);

impl ProfileHandle {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Owned collection of one profile kind.
#[derive(Debug)]
pub struct ProfileRegistry<P> {
    profiles: Vec<P>,
    /// Lower-cased name -> handle
    by_name: HashMap<String, ProfileHandle>,
}

impl<P> Default for ProfileRegistry<P> {
    fn default() -> Self {
        Self {
            profiles: Vec::new(),
            by_name: HashMap::new(),
        }
    }
}

impl<P: Profile> ProfileRegistry<P> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a profile. Names are unique per registry, ignoring case.
    pub fn insert(&mut self, profile: P) -> Result<ProfileHandle, ProfileError> {
        let key = profile.name().to_lowercase();
        if self.by_name.contains_key(&key) {
            return Err(ProfileError::Duplicate {
                kind: profile.kind(),
                name: profile.name().to_string(),
            });
        }
        let handle = ProfileHandle(self.profiles.len() as u32);
        self.profiles.push(profile);
        self.by_name.insert(key, handle);
        Ok(handle)
    }

    pub fn get(&self, handle: ProfileHandle) -> Option<&P> {
        self.profiles.get(handle.index())
    }

    /// Case-insensitive lookup.
    pub fn find(&self, name: &str) -> Option<ProfileHandle> {
        self.by_name.get(&name.to_lowercase()).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ProfileHandle, &P)> {
        self.profiles
            .iter()
            .enumerate()
            .map(|(i, p)| (ProfileHandle(i as u32), p))
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Profile Set
// ─────────────────────────────────────────────────────────────────────────────

/// All loaded profiles, one registry per kind.
#[derive(Debug, Default)]
pub struct Profiles {
    pub textures: ProfileRegistry<TextureProfile>,
    pub sliders: ProfileRegistry<SliderProfile>,
}

impl Profiles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load both kinds from their roots.
    pub fn load(texture_root: &Path, slider_root: &Path) -> Self {
        tracing::info!(root = %texture_root.display(), "Loading texture profiles");
        let textures = load_registry(texture_root, Path::is_dir, |p| TextureProfile::from_dir(p));
        tracing::info!(count = textures.len(), "Loaded texture profiles");

        tracing::info!(root = %slider_root.display(), "Loading slider profiles");
        let sliders = load_registry(
            slider_root,
            |p| p.is_file() && p.extension().is_some_and(|ext| ext == "toml"),
            |p| SliderProfile::from_file(p),
        );
        tracing::info!(count = sliders.len(), "Loaded slider profiles");

        Self { textures, sliders }
    }

    pub fn get(&self, kind: ProfileKind, handle: ProfileHandle) -> Option<&dyn Profile> {
        match kind {
            ProfileKind::Texture => self.textures.get(handle).map(|p| p as &dyn Profile),
            ProfileKind::Slider => self.sliders.get(handle).map(|p| p as &dyn Profile),
        }
    }

    pub fn find(&self, kind: ProfileKind, name: &str) -> Option<ProfileHandle> {
        match kind {
            ProfileKind::Texture => self.textures.find(name),
            ProfileKind::Slider => self.sliders.find(name),
        }
    }

    /// Every profile of one kind with its handle.
    pub fn iter_kind(
        &self,
        kind: ProfileKind,
    ) -> Box<dyn Iterator<Item = (ProfileHandle, &dyn Profile)> + '_> {
        match kind {
            ProfileKind::Texture => {
                Box::new(self.textures.iter().map(|(h, p)| (h, p as &dyn Profile)))
            }
            ProfileKind::Slider => Box::new(self.sliders.iter().map(|(h, p)| (h, p as &dyn Profile))),
        }
    }

    pub fn for_each(&self, kind: ProfileKind, mut callback: impl FnMut(&dyn Profile)) {
        for (_, profile) in self.iter_kind(kind) {
            callback(profile);
        }
    }

    pub fn len(&self, kind: ProfileKind) -> usize {
        match kind {
            ProfileKind::Texture => self.textures.len(),
            ProfileKind::Slider => self.sliders.len(),
        }
    }

    /// Name of the profile behind a handle, if the handle is live.
    pub fn name_of(&self, kind: ProfileKind, handle: ProfileHandle) -> Option<&str> {
        self.get(kind, handle).map(|p| p.name())
    }
}

/// Scan `root` for entries accepted by `filter`, build profiles in parallel,
/// and insert them in path order. Failures are logged per entry.
fn load_registry<P, F, B>(root: &Path, filter: F, build: B) -> ProfileRegistry<P>
where
    P: Profile,
    F: Fn(&Path) -> bool,
    B: Fn(&Path) -> Result<P, ProfileError> + Sync,
{
    let mut registry = ProfileRegistry::new();

    let entries = match fs::read_dir(root) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::error!(root = %root.display(), error = %e, "Profile root is not readable");
            return registry;
        }
    };
    let mut paths: Vec<PathBuf> = entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| filter(p))
        .collect();
    paths.sort();

    let built: Vec<(PathBuf, Result<P, ProfileError>)> = paths
        .into_par_iter()
        .map(|path| {
            let result = build(&path);
            (path, result)
        })
        .collect();

    for (path, result) in built {
        match result.and_then(|profile| {
            let name = profile.name().to_string();
            registry.insert(profile).map(|_| name)
        }) {
            Ok(name) => tracing::debug!(profile = %name, "Added profile"),
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "Skipping profile"),
        }
    }
    registry
}
