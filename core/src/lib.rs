//! dynbody core
//!
//! Rule-driven assignment of texture and body-slider profiles to game
//! characters. The host engine hands in [`Character`] snapshots and receives
//! calls on a [`CharacterHost`]; everything in between lives here.

pub mod actor;
pub mod api;
pub mod context;
pub mod distribution;
pub mod forms;
pub mod hooks;
pub mod host;
pub mod profiles;
pub mod rules;
pub mod serialization;

#[cfg(test)]
pub(crate) mod test_support;

// Re-exports for convenience
pub use actor::{Character, FormId, Sex, SkinState};
pub use context::{AppConfig, AppConfigExt, ConfigError, Session, SessionError};
pub use distribution::{Distribution, ProfileArray};
pub use forms::{FormLookup, FormTable};
pub use hooks::ModelLoadScheduler;
pub use host::{BodyPart, CharacterHost, RecordingHost, TextureSet, TextureType};
pub use profiles::{
    ApplyError, Profile, ProfileError, ProfileHandle, ProfileKind, Profiles, SliderProfile,
    TextureProfile,
};
pub use rules::{ConditionData, MatchPriority, Rule, RuleError, load_rules};
pub use serialization::{Cosave, SerializationError};
