use std::fs;
use std::path::Path;

use tempfile::TempDir;

use super::*;
use crate::forms::FormTable;
use crate::profiles::Profiles;
use dynbody_types::ProfileKind;

// ═══════════════════════════════════════════════════════════════════════════
// Test Helpers
// ═══════════════════════════════════════════════════════════════════════════

const KHAJIIT_RACE: u32 = 0x13745;
const NORD_RACE: u32 = 0x13746;

fn write(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// Texture profiles KhajiitSkin, DefaultSkin and private .Secret;
/// slider profiles Curvy and Slim.
fn make_profiles(root: &Path) -> Profiles {
    let textures = root.join("textures");
    for name in ["KhajiitSkin", "DefaultSkin", ".Secret"] {
        write(&textures.join(name).join("FemaleBody").join("femalebody_1.dds"), "");
    }
    let sliders = root.join("sliders");
    write(&sliders.join("Curvy.toml"), "[sliders]\nBreasts = { big = 50 }\n");
    write(&sliders.join("Slim.toml"), "[sliders]\nWaist = { small = 10 }\n");
    Profiles::load(&textures, &sliders)
}

fn make_lookup() -> FormTable {
    let mut table = FormTable::new();
    table
        .add_plugin("Skyrim.esm", 0)
        .add_editor_id("KhajiitRace", KHAJIIT_RACE)
        .add_editor_id("NordRace", NORD_RACE);
    table
}

fn parse(content: &str) -> RuleFile {
    toml::from_str(content).unwrap()
}

fn setup() -> (TempDir, Profiles, FormTable) {
    let dir = tempfile::tempdir().unwrap();
    let profiles = make_profiles(dir.path());
    (dir, profiles, make_lookup())
}

// ═══════════════════════════════════════════════════════════════════════════
// build_rule
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_builds_race_rule() {
    let (_dir, profiles, lookup) = setup();
    let file = parse("textures = [\"KhajiitSkin\"]\n[target]\nraces = [\"KhajiitRace\"]\n");

    let rule = build_rule("Khajiit", &file, &profiles, &lookup).unwrap();
    assert_eq!(rule.name, "Khajiit");
    assert_eq!(rule.conditions.races, vec![KHAJIIT_RACE]);
    assert!(!rule.has_wildcard_target());

    let khajiit = profiles.find(ProfileKind::Texture, "KhajiitSkin").unwrap();
    assert_eq!(
        rule.profiles(ProfileKind::Texture),
        &ProfileList::Explicit(vec![khajiit])
    );
    assert!(rule.offers(ProfileKind::Texture));
    assert!(!rule.offers(ProfileKind::Slider));
}

#[test]
fn test_missing_target_is_rejected() {
    let (_dir, profiles, lookup) = setup();

    let no_target = parse("textures = [\"KhajiitSkin\"]\n");
    assert!(matches!(
        build_rule("r", &no_target, &profiles, &lookup),
        Err(RuleError::MissingTarget { .. })
    ));

    let empty_table = parse("textures = [\"KhajiitSkin\"]\n[target]\n");
    assert!(matches!(
        build_rule("r", &empty_table, &profiles, &lookup),
        Err(RuleError::MissingTarget { .. })
    ));
}

#[test]
fn test_non_wildcard_token_is_rejected() {
    let (_dir, profiles, lookup) = setup();
    let file = parse("target = \"everyone\"\ntextures = [\"KhajiitSkin\"]\n");
    match build_rule("r", &file, &profiles, &lookup) {
        Err(RuleError::InvalidToken { token, .. }) => assert_eq!(token, "everyone"),
        other => panic!("expected InvalidToken, got {other:?}"),
    }
}

#[test]
fn test_unresolvable_entries_are_skipped() {
    let (_dir, profiles, lookup) = setup();
    let file = parse(
        "textures = [\"KhajiitSkin\", \"NoSuchSkin\"]\n\
         [target]\nraces = [\"KhajiitRace\", \"ArgonianRace\"]\n",
    );

    let rule = build_rule("r", &file, &profiles, &lookup).unwrap();
    assert_eq!(rule.conditions.races, vec![KHAJIIT_RACE]);
    let ProfileList::Explicit(handles) = rule.profiles(ProfileKind::Texture) else {
        panic!("expected explicit list");
    };
    assert_eq!(handles.len(), 1);
}

#[test]
fn test_fully_unresolved_target_is_rejected() {
    let (_dir, profiles, lookup) = setup();
    let file = parse("textures = [\"KhajiitSkin\"]\n[target]\nraces = [\"ArgonianRace\"]\n");
    assert!(matches!(
        build_rule("r", &file, &profiles, &lookup),
        Err(RuleError::UnresolvedTarget { .. })
    ));
}

#[test]
fn test_rule_without_profiles_is_rejected() {
    let (_dir, profiles, lookup) = setup();
    let file = parse("textures = [\"NoSuchSkin\"]\n[target]\nraces = [\"NordRace\"]\n");
    assert!(matches!(
        build_rule("r", &file, &profiles, &lookup),
        Err(RuleError::NoProfiles { .. })
    ));
}

#[test]
fn test_wildcard_target_without_profiles_is_kept() {
    let (_dir, profiles, lookup) = setup();
    let file = parse("target = \"*\"\n");
    let rule = build_rule("Fallback", &file, &profiles, &lookup).unwrap();
    assert!(rule.has_wildcard_target());
    assert!(!rule.offers(ProfileKind::Texture));
    assert!(!rule.offers(ProfileKind::Slider));
}

#[test]
fn test_wildcard_entry_replaces_explicit_profiles() {
    let (_dir, profiles, lookup) = setup();
    let file = parse(
        "sliders = [\"Curvy\", \"*\", \"Slim\"]\ntextures = [\"DefaultSkin\"]\n\
         [target]\nreferences = [\"0x00000014\"]\n",
    );
    let rule = build_rule("r", &file, &profiles, &lookup).unwrap();
    assert!(rule.profiles(ProfileKind::Slider).is_wildcard());
    assert!(!rule.profiles(ProfileKind::Texture).is_wildcard());
    assert_eq!(rule.conditions.references, vec![0x14]);
}

#[test]
fn test_selectors_resolve_through_lookup() {
    let (_dir, profiles, lookup) = setup();
    let file = parse(
        "sliders = [\"curvy\"]\n[target]\n\
         actor_bases = [\"0x01A696|Skyrim.esm\"]\n\
         keywords = [\"0x0001D6A3\"]\n\
         factions = [\"0x5C84E\"]\n",
    );
    let rule = build_rule("r", &file, &profiles, &lookup).unwrap();
    assert_eq!(rule.conditions.actor_bases, vec![0x01A696]);
    assert_eq!(rule.conditions.keywords, vec![0x1D6A3]);
    assert_eq!(rule.conditions.factions, vec![0x5C84E]);
    assert!(rule.offers(ProfileKind::Slider));
}

// ═══════════════════════════════════════════════════════════════════════════
// load_rules
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_loads_directory_recursively_and_skips_bad_files() {
    let (dir, profiles, lookup) = setup();
    let rules_dir = dir.path().join("rules");
    write(
        &rules_dir.join("Khajiit.toml"),
        "textures = [\"KhajiitSkin\"]\n[target]\nraces = [\"KhajiitRace\"]\n",
    );
    write(
        &rules_dir.join("nested").join("Everyone.json"),
        r#"{ "target": "*", "textures": ["DefaultSkin"], "sliders": ["*"] }"#,
    );
    write(&rules_dir.join("Broken.toml"), "target = [");
    write(&rules_dir.join("NoTarget.toml"), "textures = [\"DefaultSkin\"]\n");
    write(&rules_dir.join("readme.txt"), "not a rule");

    let rules = load_rules(&rules_dir, &profiles, &lookup).unwrap();
    let names: Vec<&str> = rules.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Khajiit", "Everyone"]);
    assert!(rules[1].has_wildcard_target());
    assert!(rules[1].profiles(ProfileKind::Slider).is_wildcard());
}

#[test]
fn test_missing_directory_yields_no_rules() {
    let (dir, profiles, lookup) = setup();
    let rules = load_rules(&dir.path().join("absent"), &profiles, &lookup).unwrap();
    assert!(rules.is_empty());
}

#[test]
fn test_same_named_rules_are_merged() {
    let (dir, profiles, lookup) = setup();
    let rules_dir = dir.path().join("rules");
    write(
        &rules_dir.join("a").join("Beast.toml"),
        "textures = [\"KhajiitSkin\"]\n[target]\nraces = [\"KhajiitRace\"]\n",
    );
    write(
        &rules_dir.join("b").join("Beast.toml"),
        "textures = [\"KhajiitSkin\", \"DefaultSkin\"]\n[target]\nraces = [\"NordRace\"]\n",
    );

    let rules = load_rules(&rules_dir, &profiles, &lookup).unwrap();
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0].conditions.races, vec![KHAJIIT_RACE, NORD_RACE]);
    let ProfileList::Explicit(handles) = rules[0].profiles(ProfileKind::Texture) else {
        panic!("expected explicit list");
    };
    assert_eq!(handles.len(), 2);
}

#[test]
fn test_unreadable_subfolder_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let rules_dir = dir.path().join("rules");
    write(&rules_dir.join("Everyone.toml"), "target = \"*\"\n");
    write(&rules_dir.join("nested").join("Nords.toml"), "target = \"*\"\n");

    let mut files = Vec::new();
    collect_rule_files(&rules_dir, &mut files).unwrap();
    assert_eq!(files.len(), 2);

    // A folder that vanished between listing and reading
    collect_subdir(&rules_dir.join("gone"), &mut files);
    assert_eq!(files.len(), 2);

    assert!(matches!(
        collect_rule_files(&dir.path().join("gone"), &mut files),
        Err(RuleError::ReadDir { .. })
    ));
}
