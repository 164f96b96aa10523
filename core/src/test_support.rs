//! Fixtures shared by the unit tests

use std::fs;
use std::path::Path;

use tempfile::TempDir;

use crate::actor::{Character, FormId, Sex};
use crate::profiles::Profiles;

pub const FEMALE_BODY_NORMAL: &str = "textures/actors/character/FemaleBody/femalebody_1_msn.dds";
pub const MALE_BODY_NORMAL: &str = "textures/actors/character/MaleBody/malebody_1_msn.dds";

pub fn write(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// Profile folders on disk plus the loaded registries.
pub struct ProfileFixture {
    pub dir: TempDir,
    pub profiles: Profiles,
}

/// Female texture profiles (`FemaleBody` family) and unisex slider profiles.
///
/// A leading dot makes a profile private, as on disk.
pub fn profile_fixture(textures: &[&str], sliders: &[&str]) -> ProfileFixture {
    let dir = tempfile::tempdir().unwrap();
    let texture_root = dir.path().join("textures");
    let slider_root = dir.path().join("sliders");
    fs::create_dir_all(&texture_root).unwrap();
    fs::create_dir_all(&slider_root).unwrap();

    for name in textures {
        let body = texture_root.join(name).join("FemaleBody");
        write(&body.join("femalebody_1.dds"), "");
        write(&body.join("femalebody_1_msn.dds"), "");
        write(&body.join("femalehands_1.dds"), "");
        write(&body.join("femalehead.dds"), "");
    }
    for name in sliders {
        write(
            &slider_root.join(format!("{name}.toml")),
            "[sliders]\nBreasts = { small = 0, big = 100 }\n",
        );
    }

    let profiles = Profiles::load(&texture_root, &slider_root);
    ProfileFixture { dir, profiles }
}

/// A female character whose model carries the `FemaleBody` texture family.
pub fn female(form_id: FormId, race_id: FormId) -> Character {
    let mut c = Character::new(form_id, form_id + 0x1000, race_id);
    c.sex = Sex::Female;
    c.skin.body_normal = Some(FEMALE_BODY_NORMAL.to_string());
    c.skin.head_normal = Some("textures/actors/character/Nord/femalehead_msn.dds".to_string());
    c.skin.has_face_part = true;
    c.skin.has_skin = true;
    c
}

/// A male character. Female texture profiles never apply to him.
pub fn male(form_id: FormId, race_id: FormId) -> Character {
    let mut c = female(form_id, race_id);
    c.sex = Sex::Male;
    c.skin.body_normal = Some(MALE_BODY_NORMAL.to_string());
    c
}
