use crate::models::{AbilityScores, CharacterSheet, Equipment, Skill};
use serde::Deserialize;
use std::collections::BTreeSet;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct ForgeRequest {
    #[serde(default)]
    #[validate(length(max = 10000, message = "Narrative must be at most 10000 characters"))]
    pub narrative: String,

    #[validate(length(max = 100))]
    pub name: Option<String>,

    pub level: Option<u32>,

    pub campaign_id: Option<String>,
}

fn default_level() -> u8 {
    1
}

/// Manual sheet entry. Hit points and armor class may be left out and are
/// then derived from the rest of the sheet.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCharacterRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 1, max = 50))]
    pub race: String,
    #[serde(rename = "class")]
    #[validate(length(min = 1, max = 50))]
    pub character_class: String,
    #[serde(default = "default_level")]
    #[validate(range(min = 1, max = 20))]
    pub level: u8,
    pub background: Option<String>,
    pub alignment: Option<String>,
    #[serde(default)]
    #[validate(nested)]
    pub ability_scores: AbilityScores,
    #[serde(default)]
    pub skills: BTreeSet<Skill>,
    #[serde(default)]
    pub equipment: Equipment,
    pub hit_points: Option<i32>,
    pub armor_class: Option<i32>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub spells: Vec<String>,
    #[validate(length(max = 10000))]
    pub narrative: Option<String>,
}

impl CreateCharacterRequest {
    /// Splits into the sheet (derived fields still unset) and the narrative.
    pub fn into_parts(self) -> (CharacterSheet, Option<String>) {
        let sheet = CharacterSheet {
            name: self.name.trim().to_string(),
            race: self.race,
            character_class: self.character_class,
            level: self.level,
            background: self.background,
            alignment: self.alignment,
            ability_scores: self.ability_scores,
            skills: self.skills,
            equipment: self.equipment,
            hit_points: self.hit_points.unwrap_or(0),
            armor_class: self.armor_class.unwrap_or(0),
            proficiency_bonus: 0,
            features: self.features,
            spells: self.spells,
        };
        (sheet, self.narrative)
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct PortraitRequest {
    #[validate(url(message = "portrait_url must be a valid URL"))]
    pub portrait_url: String,
}
