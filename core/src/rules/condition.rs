//! Condition matching
//!
//! Scores a character against a rule's target criteria. Checks run from the
//! most specific criterion to the least and stop at the first hit, so one
//! rule yields exactly one [`MatchPriority`] per character.

use crate::actor::{Character, FormId};

/// How specifically a rule matched a character.
///
/// Ordered by precedence: a lower value wins. `None` means no match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MatchPriority {
    Reference = 0,
    ActorBase = 1,
    /// Faction membership or keyword
    Group = 2,
    Race = 3,
    Wildcard = 4,
    None = 5,
}

impl MatchPriority {
    pub fn is_match(self) -> bool {
        self != MatchPriority::None
    }
}

/// Accumulated target criteria of a rule.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConditionData {
    pub references: Vec<FormId>,
    pub actor_bases: Vec<FormId>,
    pub factions: Vec<FormId>,
    pub keywords: Vec<FormId>,
    pub races: Vec<FormId>,
    /// Matches every character not claimed by a more specific criterion.
    pub wildcard: bool,
}

fn push_unique(list: &mut Vec<FormId>, id: FormId) {
    if !list.contains(&id) {
        list.push(id);
    }
}

impl ConditionData {
    pub fn wildcard() -> Self {
        Self {
            wildcard: true,
            ..Default::default()
        }
    }

    pub fn add_reference(&mut self, id: FormId) {
        push_unique(&mut self.references, id);
    }

    pub fn add_actor_base(&mut self, id: FormId) {
        push_unique(&mut self.actor_bases, id);
    }

    pub fn add_faction(&mut self, id: FormId) {
        push_unique(&mut self.factions, id);
    }

    pub fn add_keyword(&mut self, id: FormId) {
        push_unique(&mut self.keywords, id);
    }

    pub fn add_race(&mut self, id: FormId) {
        push_unique(&mut self.races, id);
    }

    /// Append every criterion of `other`, keeping lists duplicate-free.
    pub fn merge(&mut self, other: ConditionData) {
        for id in other.references {
            self.add_reference(id);
        }
        for id in other.actor_bases {
            self.add_actor_base(id);
        }
        for id in other.factions {
            self.add_faction(id);
        }
        for id in other.keywords {
            self.add_keyword(id);
        }
        for id in other.races {
            self.add_race(id);
        }
        self.wildcard |= other.wildcard;
    }

    /// True when no criterion could ever match.
    pub fn is_empty(&self) -> bool {
        !self.wildcard
            && self.references.is_empty()
            && self.actor_bases.is_empty()
            && self.factions.is_empty()
            && self.keywords.is_empty()
            && self.races.is_empty()
    }

    /// Score `actor` against these criteria.
    pub fn match_priority(&self, actor: &Character) -> MatchPriority {
        if self.references.contains(&actor.form_id) {
            MatchPriority::Reference
        } else if self.actor_bases.contains(&actor.base_id) {
            MatchPriority::ActorBase
        } else if self.factions.iter().any(|&f| actor.in_faction(f))
            || self.keywords.iter().any(|&k| actor.has_keyword(k))
        {
            MatchPriority::Group
        } else if self.races.contains(&actor.race_id) {
            MatchPriority::Race
        } else if self.wildcard {
            MatchPriority::Wildcard
        } else {
            MatchPriority::None
        }
    }
}
