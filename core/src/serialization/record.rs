//! Payload of the profiles record
//!
//! Selections persist by profile name. Handles are registry indices and do
//! not survive a change to the profile folders between sessions.

use serde::{Deserialize, Serialize};

use crate::actor::FormId;

/// One cached selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheRecord {
    pub form_id: FormId,
    /// Profile name per slot, in slot order. Empty for an unresolved slot.
    pub profiles: Vec<String>,
}

/// Cache and exclusion set as written to the cosave.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfilesRecord {
    pub entries: Vec<CacheRecord>,
    pub excluded: Vec<FormId>,
}
