//! Character snapshots
//!
//! The host engine describes each character it wants profiles for as a
//! [`Character`]: identity, matching attributes, and the skin state the
//! texture profiles inspect. The core never holds on to engine objects.

pub use dynbody_types::Sex;

/// Engine form identifier.
pub type FormId = u32;

/// Keyword marking vampires, whose heads take the vampire texture set.
pub const VAMPIRE_KEYWORD: &str = "Vampire";

/// Snapshot of a character at the time profiles are selected or applied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Character {
    /// Reference (placed actor) id. Cache and exclusion key.
    pub form_id: FormId,
    /// Actor-base (NPC template) id.
    pub base_id: FormId,
    pub race_id: FormId,
    pub race_editor_id: String,
    pub name: String,
    pub sex: Sex,
    /// NPC weight slider, 0..=100.
    pub weight: f32,
    pub is_player: bool,
    pub factions: Vec<FormId>,
    pub keywords: Vec<FormId>,
    /// Editor ids of the character's keywords, for string keyword checks.
    pub keyword_names: Vec<String>,
    pub skin: SkinState,
}

/// What the texture pipeline currently shows on the character's model.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SkinState {
    /// Normal map of the first visible body geometry.
    pub body_normal: Option<String>,
    /// Normal map of the face geometry.
    pub head_normal: Option<String>,
    pub has_face_part: bool,
    pub has_skin: bool,
}

impl Character {
    pub fn new(form_id: FormId, base_id: FormId, race_id: FormId) -> Self {
        Self {
            form_id,
            base_id,
            race_id,
            weight: 50.0,
            ..Default::default()
        }
    }

    pub fn in_faction(&self, faction: FormId) -> bool {
        self.factions.contains(&faction)
    }

    pub fn has_keyword(&self, keyword: FormId) -> bool {
        self.keywords.contains(&keyword)
    }

    pub fn has_keyword_name(&self, name: &str) -> bool {
        self.keyword_names
            .iter()
            .any(|k| k.eq_ignore_ascii_case(name))
    }

    pub fn is_vampire(&self) -> bool {
        self.has_keyword_name(VAMPIRE_KEYWORD)
    }

    /// Weight as a 0..=1 interpolation factor.
    pub fn weight_factor(&self) -> f32 {
        (self.weight / 100.0).clamp(0.0, 1.0)
    }
}

/// Name of the folder directly containing a texture file, lower-cased.
///
/// `textures/actors/character/KhajiitMale/body_msn.dds` yields `khajiitmale`.
/// Returns `None` when the path has no parent folder.
pub fn texture_family(path: &str) -> Option<String> {
    let mut parts = path.rsplit(['\\', '/']);
    parts.next()?;
    parts
        .next()
        .filter(|folder| !folder.is_empty())
        .map(str::to_lowercase)
}
