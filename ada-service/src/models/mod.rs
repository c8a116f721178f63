pub mod campaign;
pub mod character;
pub mod dialogue;
pub mod journal;
pub mod script;
pub mod user;

pub use campaign::{AiDmState, Campaign, CampaignMode};
pub use character::{
    Ability, AbilityScores, Character, CharacterClass, CharacterSheet, Equipment, Race, Skill,
};
pub use dialogue::{Dialogue, DialogueRole};
pub use journal::Journal;
pub use script::Script;
pub use user::User;
