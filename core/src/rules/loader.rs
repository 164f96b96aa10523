//! Rule loading
//!
//! Walks the rule root recursively. Each `.toml` or `.json` file is one rule
//! named after its file stem. Rules sharing a name across folders are merged.

use std::fs;
use std::path::{Path, PathBuf};

use dynbody_types::ProfileKind;

use super::definition::{RuleFile, TargetSelector, TargetSpec, WILDCARD};
use super::{ConditionData, ProfileList, Rule, RuleError};
use crate::actor::FormId;
use crate::forms::FormLookup;
use crate::profiles::Profiles;

/// Read and parse a single rule file. The format follows the extension.
pub fn parse_rule_file(path: &Path) -> Result<RuleFile, RuleError> {
    let content = fs::read_to_string(path).map_err(|source| RuleError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;

    if path.extension().is_some_and(|ext| ext == "json") {
        serde_json::from_str(&content).map_err(|source| RuleError::ParseJson {
            path: path.to_path_buf(),
            source,
        })
    } else {
        toml::from_str(&content).map_err(|source| RuleError::ParseToml {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Load every rule under `dir`. A missing directory yields no rules.
///
/// Broken files are logged and skipped; only an unreadable root fails.
pub fn load_rules(
    dir: &Path,
    profiles: &Profiles,
    lookup: &dyn FormLookup,
) -> Result<Vec<Rule>, RuleError> {
    if !dir.exists() {
        tracing::warn!(dir = %dir.display(), "Rule directory does not exist");
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    collect_rule_files(dir, &mut files)?;
    files.sort();

    let mut rules: Vec<Rule> = Vec::new();
    for path in files {
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        let file = match parse_rule_file(&path) {
            Ok(file) => file,
            Err(e) => {
                tracing::warn!(error = %e, "Skipping rule file");
                continue;
            }
        };

        match build_rule(&name, &file, profiles, lookup) {
            Ok(rule) => {
                if let Some(existing) = rules
                    .iter_mut()
                    .find(|r| r.name.eq_ignore_ascii_case(&rule.name))
                {
                    tracing::debug!(rule = %rule.name, path = %path.display(), "Merging rule");
                    existing.merge(rule);
                } else {
                    tracing::debug!(rule = %rule.name, "Added rule");
                    rules.push(rule);
                }
            }
            Err(e) => tracing::error!(path = %path.display(), error = %e, "Rejected rule"),
        }
    }

    tracing::info!(count = rules.len(), "Loaded rules");
    Ok(rules)
}

pub(super) fn collect_rule_files(dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), RuleError> {
    let entries = read_rule_dir(dir)?;
    collect_entries(entries, files);
    Ok(())
}

/// Nested folders only warn on failure; the rest of the tree still loads.
pub(super) fn collect_subdir(dir: &Path, files: &mut Vec<PathBuf>) {
    match read_rule_dir(dir) {
        Ok(entries) => collect_entries(entries, files),
        Err(e) => tracing::warn!(error = %e, "Skipping rule folder"),
    }
}

fn collect_entries(entries: fs::ReadDir, files: &mut Vec<PathBuf>) {
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_subdir(&path, files);
        } else if path
            .extension()
            .is_some_and(|ext| ext == "toml" || ext == "json")
        {
            files.push(path);
        }
    }
}

fn read_rule_dir(dir: &Path) -> Result<fs::ReadDir, RuleError> {
    fs::read_dir(dir).map_err(|source| RuleError::ReadDir {
        path: dir.to_path_buf(),
        source,
    })
}

/// Turn a parsed rule file into a [`Rule`].
pub fn build_rule(
    name: &str,
    file: &RuleFile,
    profiles: &Profiles,
    lookup: &dyn FormLookup,
) -> Result<Rule, RuleError> {
    let conditions = match &file.target {
        None => {
            return Err(RuleError::MissingTarget {
                rule: name.to_string(),
            });
        }
        Some(TargetSpec::Token(token)) if token.trim() == WILDCARD => ConditionData::wildcard(),
        Some(TargetSpec::Token(token)) => {
            return Err(RuleError::InvalidToken {
                rule: name.to_string(),
                token: token.clone(),
            });
        }
        Some(TargetSpec::Selector(selector)) if selector.is_empty() => {
            return Err(RuleError::MissingTarget {
                rule: name.to_string(),
            });
        }
        Some(TargetSpec::Selector(selector)) => {
            let conditions = resolve_selector(name, selector, lookup);
            if conditions.is_empty() {
                return Err(RuleError::UnresolvedTarget {
                    rule: name.to_string(),
                });
            }
            conditions
        }
    };

    let textures = resolve_profile_list(name, ProfileKind::Texture, &file.textures, profiles);
    let sliders = resolve_profile_list(name, ProfileKind::Slider, &file.sliders, profiles);

    if !textures.offers() && !sliders.offers() && !conditions.wildcard {
        return Err(RuleError::NoProfiles {
            rule: name.to_string(),
        });
    }

    Ok(Rule::new(name, conditions)
        .with_profiles(ProfileKind::Texture, textures)
        .with_profiles(ProfileKind::Slider, sliders))
}

fn resolve_selector(rule: &str, selector: &TargetSelector, lookup: &dyn FormLookup) -> ConditionData {
    let mut conditions = ConditionData::default();

    let lists: [(&str, &Vec<String>, fn(&mut ConditionData, FormId)); 5] = [
        ("reference", &selector.references, ConditionData::add_reference),
        ("actor base", &selector.actor_bases, ConditionData::add_actor_base),
        ("keyword", &selector.keywords, ConditionData::add_keyword),
        ("faction", &selector.factions, ConditionData::add_faction),
        ("race", &selector.races, ConditionData::add_race),
    ];

    for (what, entries, add) in lists {
        for entry in entries {
            match lookup.resolve(entry) {
                Some(id) => add(&mut conditions, id),
                None => tracing::warn!(rule, selector = %entry, "Unresolved {what}, skipping"),
            }
        }
    }
    conditions
}

fn resolve_profile_list(
    rule: &str,
    kind: ProfileKind,
    names: &[String],
    profiles: &Profiles,
) -> ProfileList {
    let mut list = ProfileList::default();
    for name in names {
        let name = name.trim();
        if name == WILDCARD {
            list = ProfileList::Wildcard;
            continue;
        }
        if list.is_wildcard() {
            tracing::debug!(rule, profile = name, "Ignoring {kind} profile after wildcard");
            continue;
        }
        match profiles.find(kind, name) {
            Some(handle) => list.push(handle),
            None => tracing::warn!(rule, profile = name, "Unknown {kind} profile, skipping"),
        }
    }
    list
}
