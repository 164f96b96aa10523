//! Rule configuration
//!
//! A rule pairs target criteria ([`ConditionData`]) with one profile list per
//! kind. Rules are loaded once from the rule root and never change afterwards.

pub mod condition;
mod definition;
mod error;
mod loader;

#[cfg(test)]
mod loader_tests;

pub use condition::{ConditionData, MatchPriority};
pub use definition::{RuleFile, TargetSelector, TargetSpec, WILDCARD};
pub use error::RuleError;
pub use loader::{build_rule, load_rules, parse_rule_file};
#[cfg(test)]
use loader::{collect_rule_files, collect_subdir};

use dynbody_types::ProfileKind;

use crate::profiles::ProfileHandle;

/// Profiles a rule offers for one kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileList {
    Explicit(Vec<ProfileHandle>),
    /// Every public profile of the kind, expanded at selection time.
    Wildcard,
}

impl Default for ProfileList {
    fn default() -> Self {
        ProfileList::Explicit(Vec::new())
    }
}

impl ProfileList {
    /// Whether the list can contribute a candidate at all.
    pub fn offers(&self) -> bool {
        match self {
            ProfileList::Explicit(handles) => !handles.is_empty(),
            ProfileList::Wildcard => true,
        }
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, ProfileList::Wildcard)
    }

    fn push(&mut self, handle: ProfileHandle) {
        if let ProfileList::Explicit(handles) = self
            && !handles.contains(&handle)
        {
            handles.push(handle);
        }
    }

    /// Append another list. A wildcard on either side wins.
    fn merge(&mut self, other: ProfileList) {
        match other {
            ProfileList::Wildcard => *self = ProfileList::Wildcard,
            ProfileList::Explicit(handles) => {
                for handle in handles {
                    self.push(handle);
                }
            }
        }
    }
}

/// A loaded rule.
#[derive(Debug, Clone)]
pub struct Rule {
    pub name: String,
    pub conditions: ConditionData,
    profiles: [ProfileList; ProfileKind::COUNT],
}

impl Rule {
    pub fn new(name: impl Into<String>, conditions: ConditionData) -> Self {
        Self {
            name: name.into(),
            conditions,
            profiles: Default::default(),
        }
    }

    /// Builder used by tests and programmatic setups.
    pub fn with_profiles(mut self, kind: ProfileKind, list: ProfileList) -> Self {
        self.profiles[kind.index()] = list;
        self
    }

    pub fn profiles(&self, kind: ProfileKind) -> &ProfileList {
        &self.profiles[kind.index()]
    }

    pub fn offers(&self, kind: ProfileKind) -> bool {
        self.profiles(kind).offers()
    }

    /// True when the rule targets every character.
    pub fn has_wildcard_target(&self) -> bool {
        self.conditions.wildcard
    }

    /// Fold another rule with the same name into this one.
    pub fn merge(&mut self, other: Rule) {
        self.conditions.merge(other.conditions);
        for (mine, theirs) in self.profiles.iter_mut().zip(other.profiles) {
            mine.merge(theirs);
        }
    }
}
