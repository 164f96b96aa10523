//! Rule file types
//!
//! Rule files are declarative: one rule per file, TOML or JSON.
//!
//! ```toml
//! textures = ["KhajiitSkin"]
//! sliders = ["*"]
//!
//! [target]
//! races = ["KhajiitRace"]
//! keywords = ["0x0001D6A3|Skyrim.esm"]
//! ```
//!
//! `target = "*"` targets every character not claimed by a more specific
//! rule. A `"*"` inside a profile list stands for every public profile of
//! that kind, expanded at selection time.

use serde::{Deserialize, Serialize};

/// Token for "everything" in targets and profile lists.
pub const WILDCARD: &str = "*";

/// A rule file as written by authors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleFile {
    #[serde(default)]
    pub target: Option<TargetSpec>,

    /// Texture profile names, or `"*"`.
    #[serde(default)]
    pub textures: Vec<String>,

    /// Slider profile names, or `"*"`.
    #[serde(default)]
    pub sliders: Vec<String>,
}

/// Either the wildcard token or a selector table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TargetSpec {
    Token(String),
    Selector(TargetSelector),
}

/// Target selector lists. Entries are form selector strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TargetSelector {
    #[serde(default)]
    pub references: Vec<String>,
    #[serde(default)]
    pub actor_bases: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub factions: Vec<String>,
    #[serde(default)]
    pub races: Vec<String>,
}

impl TargetSelector {
    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
            && self.actor_bases.is_empty()
            && self.keywords.is_empty()
            && self.factions.is_empty()
            && self.races.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_selector_target() {
        let file: RuleFile = toml::from_str(
            "textures = [\"KhajiitSkin\"]\n[target]\nraces = [\"KhajiitRace\"]\n",
        )
        .unwrap();
        let Some(TargetSpec::Selector(selector)) = file.target else {
            panic!("expected selector target");
        };
        assert_eq!(selector.races, vec!["KhajiitRace"]);
        assert!(selector.references.is_empty());
        assert_eq!(file.textures, vec!["KhajiitSkin"]);
        assert!(file.sliders.is_empty());
    }

    #[test]
    fn parses_wildcard_target() {
        let file: RuleFile = toml::from_str("target = \"*\"\nsliders = [\"*\"]\n").unwrap();
        assert_eq!(file.target, Some(TargetSpec::Token(WILDCARD.to_string())));

        let json: RuleFile =
            serde_json::from_str(r#"{ "target": "*", "textures": ["DefaultSkin"] }"#).unwrap();
        assert_eq!(json.target, Some(TargetSpec::Token(WILDCARD.to_string())));
    }

    #[test]
    fn target_is_optional_at_parse_time() {
        let file: RuleFile = toml::from_str("textures = [\"A\"]\n").unwrap();
        assert!(file.target.is_none());
    }
}
