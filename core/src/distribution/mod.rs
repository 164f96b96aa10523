//! Profile distribution
//!
//! [`Distribution`] decides which texture and slider profile each character
//! wears and remembers the answer:
//! - Rules are scored per kind; only rules at the best priority level compete
//! - Ties are broken uniformly at random, then each rule's candidates are
//!   shuffled and the first applicable one wins
//! - When no rule yields a profile and any rule targets everyone, a random
//!   applicable public profile is drawn instead
//! - Results are cached per character until cleared; excluded characters get
//!   nothing and are never cached
//!
//! The cache and exclusion set persist by profile name (see
//! [`crate::serialization`]).

use std::collections::{HashMap, HashSet};
use std::io::{Read, Write};

use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;

use dynbody_types::{ProfileKind, Sex};

use crate::actor::{Character, FormId};
use crate::forms::FormLookup;
use crate::host::CharacterHost;
use crate::profiles::{ApplyError, Profile, ProfileHandle, Profiles};
use crate::rules::{MatchPriority, ProfileList, Rule};
use crate::serialization::{CacheRecord, ProfilesRecord, SerializationError};


/// One selection slot per profile kind, indexed by [`ProfileKind::index`].
pub type ProfileArray = [Option<ProfileHandle>; ProfileKind::COUNT];

/// Owned selection state: registries, rules, cache, exclusions and RNG.
#[derive(Debug)]
pub struct Distribution {
    profiles: Profiles,
    rules: Vec<Rule>,
    cache: HashMap<FormId, ProfileArray>,
    excluded: HashSet<FormId>,
    rng: ChaCha8Rng,
    /// Player sex seen when character creation last opened.
    player_sex: Option<Sex>,
}

impl Distribution {
    /// `seed` fixes tie-breaking for reproducible runs; `None` uses entropy.
    pub fn new(profiles: Profiles, rules: Vec<Rule>, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self {
            profiles,
            rules,
            cache: HashMap::new(),
            excluded: HashSet::new(),
            rng,
            player_sex: None,
        }
    }

    pub fn profiles(&self) -> &Profiles {
        &self.profiles
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Cached selection without triggering one.
    pub fn cached(&self, form_id: FormId) -> Option<&ProfileArray> {
        self.cache.get(&form_id)
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_excluded(&self, form_id: FormId) -> bool {
        self.excluded.contains(&form_id)
    }

    pub fn excluded(&self) -> impl Iterator<Item = FormId> + '_ {
        self.excluded.iter().copied()
    }

    /// Name of the profile in one slot of a selection.
    pub fn slot_name(&self, profiles: &ProfileArray, kind: ProfileKind) -> Option<&str> {
        profiles[kind.index()].and_then(|handle| self.profiles.name_of(kind, handle))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Selection
    // ─────────────────────────────────────────────────────────────────────────

    /// Resolve every slot for `actor`, reusing the cache where possible.
    pub fn select_profiles(&mut self, actor: &Character) -> ProfileArray {
        if self.excluded.contains(&actor.form_id) {
            tracing::trace!(actor = actor.form_id, "Excluded from distribution");
            return [None; ProfileKind::COUNT];
        }

        if actor.is_player {
            self.check_player_sex(actor);
        }

        let mut selected = self.cache.get(&actor.form_id).copied().unwrap_or_default();

        for kind in ProfileKind::ALL {
            if selected[kind.index()].is_some() {
                continue;
            }
            let choice = select_slot(&self.profiles, &self.rules, &mut self.rng, kind, actor);
            if let Some(handle) = choice {
                tracing::debug!(
                    actor = actor.form_id,
                    %kind,
                    profile = self.profiles.name_of(kind, handle).unwrap_or_default(),
                    "Selected profile"
                );
            }
            selected[kind.index()] = choice;
        }

        self.cache.insert(actor.form_id, selected);
        selected
    }

    /// Current selection, selecting first when nothing is cached.
    pub fn get_profiles(&mut self, actor: &Character) -> ProfileArray {
        self.select_profiles(actor)
    }

    /// Select and apply every resolved slot. Failures are logged per slot.
    pub fn apply_profiles(&mut self, actor: &Character, host: &mut dyn CharacterHost) {
        let selected = self.select_profiles(actor);
        for kind in ProfileKind::ALL {
            let Some(handle) = selected[kind.index()] else {
                continue;
            };
            let Some(profile) = self.profiles.get(kind, handle) else {
                continue;
            };
            if let Err(e) = profile.apply(actor, host) {
                tracing::error!(
                    actor = actor.form_id,
                    %kind,
                    profile = profile.name(),
                    error = %e,
                    "Failed to apply profile"
                );
            }
        }
    }

    /// Apply a named profile and pin it in the character's slot.
    ///
    /// A manual choice also lifts an exclusion.
    pub fn apply_profile_by_name(
        &mut self,
        kind: ProfileKind,
        actor: &Character,
        name: &str,
        host: &mut dyn CharacterHost,
    ) -> Result<(), ApplyError> {
        let handle = self
            .profiles
            .find(kind, name)
            .ok_or_else(|| ApplyError::UnknownProfile {
                kind,
                name: name.to_string(),
            })?;
        if let Some(profile) = self.profiles.get(kind, handle) {
            profile.apply(actor, host)?;
        }

        self.excluded.remove(&actor.form_id);
        self.cache.entry(actor.form_id).or_default()[kind.index()] = Some(handle);
        tracing::debug!(actor = actor.form_id, %kind, profile = name, "Applied profile manually");
        Ok(())
    }

    /// Forget the character's selection. `exclude` suppresses future
    /// auto-selection; otherwise the character is re-included.
    pub fn clear_profiles(&mut self, form_id: FormId, exclude: bool) {
        self.cache.remove(&form_id);
        if exclude {
            self.excluded.insert(form_id);
        } else {
            self.excluded.remove(&form_id);
        }
        tracing::debug!(actor = form_id, exclude, "Cleared profiles");
    }

    /// Record the player's sex when character creation opens.
    pub fn observe_player_sex(&mut self, sex: Sex) {
        self.player_sex = Some(sex);
    }

    fn check_player_sex(&mut self, actor: &Character) {
        if let Some(seen) = self.player_sex
            && seen != actor.sex
        {
            tracing::info!(from = %seen, to = %actor.sex, "Player sex changed, reselecting");
            self.cache.remove(&actor.form_id);
            self.player_sex = Some(actor.sex);
        }
    }

    pub fn for_each_profile(&self, kind: ProfileKind, callback: impl FnMut(&dyn Profile)) {
        self.profiles.for_each(kind, callback);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Persistence
    // ─────────────────────────────────────────────────────────────────────────

    /// Snapshot of cache and exclusions, by profile name.
    pub fn to_record(&self) -> ProfilesRecord {
        let mut entries: Vec<CacheRecord> = self
            .cache
            .iter()
            .map(|(&form_id, slots)| CacheRecord {
                form_id,
                profiles: ProfileKind::ALL
                    .iter()
                    .map(|&kind| self.slot_name(slots, kind).unwrap_or_default().to_string())
                    .collect(),
            })
            .collect();
        entries.sort_by_key(|e| e.form_id);

        let mut excluded: Vec<FormId> = self.excluded.iter().copied().collect();
        excluded.sort_unstable();

        ProfilesRecord { entries, excluded }
    }

    /// Replace cache and exclusions from a record.
    ///
    /// Names no longer in the registry leave their slot empty; ids the
    /// lookup cannot remap are dropped.
    pub fn restore(&mut self, record: ProfilesRecord, lookup: &dyn FormLookup) {
        self.revert();

        for entry in record.entries {
            let Some(form_id) = lookup.remap_saved(entry.form_id) else {
                tracing::warn!(form_id = entry.form_id, "Dropping cache entry for unknown form");
                continue;
            };
            let mut slots: ProfileArray = [None; ProfileKind::COUNT];
            for (kind, name) in ProfileKind::ALL.into_iter().zip(&entry.profiles) {
                if name.is_empty() {
                    continue;
                }
                slots[kind.index()] = self.profiles.find(kind, name);
                if slots[kind.index()].is_none() {
                    tracing::warn!(form_id, %kind, profile = %name, "Saved profile no longer exists");
                }
            }
            self.cache.insert(form_id, slots);
        }

        for id in record.excluded {
            match lookup.remap_saved(id) {
                Some(form_id) => {
                    self.excluded.insert(form_id);
                }
                None => tracing::warn!(form_id = id, "Dropping exclusion for unknown form"),
            }
        }

        tracing::info!(
            cached = self.cache.len(),
            excluded = self.excluded.len(),
            "Restored profile selections"
        );
    }

    /// Write cache and exclusions to `writer`.
    pub fn save<W: Write>(&self, writer: W) -> Result<(), SerializationError> {
        bincode::serialize_into(writer, &self.to_record())?;
        Ok(())
    }

    /// Replace cache and exclusions with what `reader` holds.
    pub fn load<R: Read>(
        &mut self,
        reader: R,
        lookup: &dyn FormLookup,
    ) -> Result<(), SerializationError> {
        let record: ProfilesRecord = bincode::deserialize_from(reader)?;
        self.restore(record, lookup);
        Ok(())
    }

    /// Drop all per-save state.
    pub fn revert(&mut self) {
        self.cache.clear();
        self.excluded.clear();
    }
}

/// Pick one profile of `kind` for `actor`, or `None`.
fn select_slot(
    profiles: &Profiles,
    rules: &[Rule],
    rng: &mut ChaCha8Rng,
    kind: ProfileKind,
    actor: &Character,
) -> Option<ProfileHandle> {
    let mut best = MatchPriority::None;
    let mut tied: Vec<&Rule> = Vec::new();
    let mut wildcard_target = false;

    for rule in rules {
        wildcard_target |= rule.has_wildcard_target();
        if !rule.offers(kind) {
            continue;
        }
        let priority = rule.conditions.match_priority(actor);
        if !priority.is_match() || priority > best {
            continue;
        }
        if priority < best {
            best = priority;
            tied.clear();
        }
        tied.push(rule);
    }

    tied.shuffle(rng);
    for rule in tied {
        let mut candidates = match rule.profiles(kind) {
            ProfileList::Explicit(handles) => handles.clone(),
            ProfileList::Wildcard => public_profiles(profiles, kind),
        };
        candidates.shuffle(rng);
        let found = candidates
            .into_iter()
            .find(|&handle| is_applicable(profiles, kind, handle, actor));
        if found.is_some() {
            tracing::trace!(actor = actor.form_id, rule = %rule.name, ?best, "Rule matched");
            return found;
        }
    }

    if !wildcard_target {
        return None;
    }
    let fallback: Vec<ProfileHandle> = public_profiles(profiles, kind)
        .into_iter()
        .filter(|&handle| is_applicable(profiles, kind, handle, actor))
        .collect();
    fallback.choose(rng).copied()
}

fn public_profiles(profiles: &Profiles, kind: ProfileKind) -> Vec<ProfileHandle> {
    profiles
        .iter_kind(kind)
        .filter(|(_, p)| !p.is_private())
        .map(|(handle, _)| handle)
        .collect()
}

fn is_applicable(
    profiles: &Profiles,
    kind: ProfileKind,
    handle: ProfileHandle,
    actor: &Character,
) -> bool {
    profiles
        .get(kind, handle)
        .is_some_and(|p| p.is_applicable(actor))
}
