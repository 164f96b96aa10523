//! Character scenarios
//!
//! Without a running game the CLI reads characters from a TOML file.
//! Race, faction and keyword entries are form selectors, resolved through
//! the session's form table.
//!
//! ```toml
//! [[character]]
//! form_id = 0x00000100
//! base_id = 0x0001A696
//! name = "J'zargo"
//! race = "KhajiitRace"
//! sex = "male"
//! weight = 40.0
//! keywords = ["Vampire"]
//! body_normal = "textures/actors/character/KhajiitMale/bodymale_msn.dds"
//! ```

use std::fs;
use std::path::Path;

use serde::Deserialize;

use dynbody_core::{Character, FormId, FormLookup, Sex, SkinState};

#[derive(Debug, Deserialize)]
struct ScenarioFile {
    #[serde(default, rename = "character")]
    characters: Vec<CharacterSpec>,
}

#[derive(Debug, Deserialize)]
struct CharacterSpec {
    form_id: FormId,
    #[serde(default)]
    base_id: FormId,
    #[serde(default)]
    name: String,
    #[serde(default)]
    race: String,
    #[serde(default)]
    sex: Sex,
    #[serde(default = "default_weight")]
    weight: f32,
    #[serde(default)]
    is_player: bool,
    #[serde(default)]
    factions: Vec<String>,
    #[serde(default)]
    keywords: Vec<String>,
    #[serde(default)]
    body_normal: Option<String>,
    #[serde(default)]
    head_normal: Option<String>,
    #[serde(default = "default_true")]
    has_face_part: bool,
    #[serde(default = "default_true")]
    has_skin: bool,
}

fn default_weight() -> f32 {
    50.0
}

fn default_true() -> bool {
    true
}

/// Load every character from a scenario file.
pub fn load_characters(path: &Path, lookup: &dyn FormLookup) -> Result<Vec<Character>, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    let file: ScenarioFile = toml::from_str(&content)
        .map_err(|e| format!("Failed to parse {}: {}", path.display(), e))?;

    Ok(file
        .characters
        .into_iter()
        .map(|spec| build_character(spec, lookup))
        .collect())
}

fn build_character(spec: CharacterSpec, lookup: &dyn FormLookup) -> Character {
    let resolve_all = |selectors: &[String]| -> Vec<FormId> {
        selectors
            .iter()
            .filter_map(|s| {
                let id = lookup.resolve(s);
                if id.is_none() {
                    tracing::warn!(actor = spec.form_id, selector = %s, "Unresolved selector");
                }
                id
            })
            .collect()
    };

    let race_id = if spec.race.is_empty() {
        0
    } else {
        lookup.resolve(&spec.race).unwrap_or_else(|| {
            tracing::warn!(actor = spec.form_id, race = %spec.race, "Unresolved race");
            0
        })
    };

    Character {
        form_id: spec.form_id,
        base_id: spec.base_id,
        race_id,
        factions: resolve_all(spec.factions.as_slice()),
        keywords: resolve_all(spec.keywords.as_slice()),
        keyword_names: spec.keywords.clone(),
        race_editor_id: spec.race,
        name: spec.name,
        sex: spec.sex,
        weight: spec.weight,
        is_player: spec.is_player,
        skin: SkinState {
            body_normal: spec.body_normal,
            head_normal: spec.head_normal,
            has_face_part: spec.has_face_part,
            has_skin: spec.has_skin,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dynbody_core::FormTable;

    #[test]
    fn loads_and_resolves_characters() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scenario.toml");
        fs::write(
            &path,
            r#"
[[character]]
form_id = 0x100
base_id = 0x1A696
name = "J'zargo"
race = "KhajiitRace"
keywords = ["Vampire", "0x0001D6A3", "Unknown"]
body_normal = "textures/actors/character/KhajiitMale/bodymale_msn.dds"

[[character]]
form_id = 0x14
sex = "female"
is_player = true
has_skin = false
"#,
        )
        .unwrap();

        let mut forms = FormTable::new();
        forms
            .add_editor_id("KhajiitRace", 0x13745)
            .add_editor_id("Vampire", 0xA82BB);
        let characters = load_characters(&path, &forms).unwrap();
        assert_eq!(characters.len(), 2);

        let jzargo = &characters[0];
        assert_eq!(jzargo.race_id, 0x13745);
        assert_eq!(jzargo.race_editor_id, "KhajiitRace");
        assert_eq!(jzargo.keywords, vec![0xA82BB, 0x1D6A3]);
        assert!(jzargo.is_vampire());
        assert_eq!(jzargo.weight, 50.0);
        assert!(jzargo.skin.has_face_part);

        let player = &characters[1];
        assert!(player.is_player);
        assert_eq!(player.sex, Sex::Female);
        assert!(!player.skin.has_skin);
    }

    #[test]
    fn bad_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        fs::write(&path, "[[character]\n").unwrap();
        let err = load_characters(&path, &FormTable::new()).unwrap_err();
        assert!(err.contains("broken.toml"));
    }
}
