//! Script-facing functions
//!
//! Thin wrappers the game's scripting layer binds to. Scripts may pass a
//! stale or missing character; every function then logs and returns a
//! neutral value instead of failing.

use dynbody_types::ProfileKind;

use crate::actor::Character;
use crate::distribution::Distribution;
use crate::host::CharacterHost;
use crate::profiles::Profile;

/// Names of texture profiles, restricted to those that fit `actor` if given.
pub fn get_texture_profiles(distribution: &Distribution, actor: Option<&Character>) -> Vec<String> {
    profile_names(distribution, ProfileKind::Texture, actor)
}

/// Names of slider profiles, restricted to those that fit `actor` if given.
pub fn get_slider_profiles(distribution: &Distribution, actor: Option<&Character>) -> Vec<String> {
    profile_names(distribution, ProfileKind::Slider, actor)
}

fn profile_names(
    distribution: &Distribution,
    kind: ProfileKind,
    actor: Option<&Character>,
) -> Vec<String> {
    let mut names = Vec::new();
    distribution.for_each_profile(kind, |profile: &dyn Profile| {
        if actor.is_none_or(|a| profile.is_applicable(a)) {
            names.push(profile.name().to_string());
        }
    });
    names
}

pub fn apply_texture_profile(
    distribution: &mut Distribution,
    actor: Option<&Character>,
    name: &str,
    host: &mut dyn CharacterHost,
) -> bool {
    apply_named(distribution, ProfileKind::Texture, actor, name, host)
}

pub fn apply_slider_profile(
    distribution: &mut Distribution,
    actor: Option<&Character>,
    name: &str,
    host: &mut dyn CharacterHost,
) -> bool {
    apply_named(distribution, ProfileKind::Slider, actor, name, host)
}

fn apply_named(
    distribution: &mut Distribution,
    kind: ProfileKind,
    actor: Option<&Character>,
    name: &str,
    host: &mut dyn CharacterHost,
) -> bool {
    let Some(actor) = actor else {
        tracing::trace!(%kind, profile = name, "apply called without a character");
        return false;
    };
    match distribution.apply_profile_by_name(kind, actor, name, host) {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(actor = actor.form_id, error = %e, "Script apply failed");
            false
        }
    }
}

/// Selected profile names in slot order; empty strings for unresolved slots.
pub fn get_profiles(
    distribution: &mut Distribution,
    actor: Option<&Character>,
) -> [String; ProfileKind::COUNT] {
    let Some(actor) = actor else {
        tracing::trace!("get_profiles called without a character");
        return Default::default();
    };
    let selected = distribution.get_profiles(actor);
    ProfileKind::ALL.map(|kind| {
        distribution
            .slot_name(&selected, kind)
            .unwrap_or_default()
            .to_string()
    })
}

pub fn clear_profiles(distribution: &mut Distribution, actor: Option<&Character>, exclude: bool) {
    match actor {
        Some(actor) => distribution.clear_profiles(actor.form_id, exclude),
        None => tracing::trace!("clear_profiles called without a character"),
    }
}

pub fn reset_model(actor: Option<&Character>, host: &mut dyn CharacterHost) {
    match actor {
        Some(actor) => host.reset_model(actor.form_id),
        None => tracing::trace!("reset_model called without a character"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{HostCall, RecordingHost};
    use crate::rules::{ConditionData, ProfileList, Rule};
    use crate::test_support::{female, male, profile_fixture};

    fn setup() -> (tempfile::TempDir, Distribution) {
        let fixture = profile_fixture(&["Freckled", ".Scarred"], &["Curvy"]);
        let rules = vec![
            Rule::new("Everyone", ConditionData::wildcard())
                .with_profiles(ProfileKind::Texture, ProfileList::Wildcard)
                .with_profiles(ProfileKind::Slider, ProfileList::Wildcard),
        ];
        (fixture.dir, Distribution::new(fixture.profiles, rules, Some(3)))
    }

    #[test]
    fn lists_profiles_with_optional_filter() {
        let (_dir, dist) = setup();
        let mut all = get_texture_profiles(&dist, None);
        all.sort();
        assert_eq!(all, vec!["Freckled", "Scarred"]);
        assert!(get_texture_profiles(&dist, Some(&male(1, 2))).is_empty());
        assert_eq!(get_slider_profiles(&dist, Some(&male(1, 2))), vec!["Curvy"]);
    }

    #[test]
    fn get_profiles_returns_names() {
        let (_dir, mut dist) = setup();
        assert_eq!(
            get_profiles(&mut dist, Some(&female(0x100, 2))),
            ["Freckled".to_string(), "Curvy".to_string()]
        );
        assert_eq!(get_profiles(&mut dist, None), [String::new(), String::new()]);
    }

    #[test]
    fn apply_and_clear_through_script_calls() {
        let (_dir, mut dist) = setup();
        let actor = female(0x100, 2);
        let mut host = RecordingHost::new();

        assert!(apply_texture_profile(&mut dist, Some(&actor), "Scarred", &mut host));
        assert_eq!(get_profiles(&mut dist, Some(&actor))[0], "Scarred");
        assert!(!apply_slider_profile(&mut dist, Some(&actor), "Missing", &mut host));
        assert!(!apply_slider_profile(&mut dist, None, "Curvy", &mut host));

        clear_profiles(&mut dist, Some(&actor), true);
        assert_eq!(get_profiles(&mut dist, Some(&actor)), [String::new(), String::new()]);
        clear_profiles(&mut dist, None, true);
    }

    #[test]
    fn reset_model_forwards_to_host() {
        let mut host = RecordingHost::new();
        reset_model(Some(&female(0x100, 2)), &mut host);
        reset_model(None, &mut host);
        assert_eq!(host.calls, vec![HostCall::ResetModel(0x100)]);
    }
}
