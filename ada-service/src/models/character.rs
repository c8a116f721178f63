use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ability {
    Strength,
    Dexterity,
    Constitution,
    Intelligence,
    Wisdom,
    Charisma,
}

impl Ability {
    pub const ALL: [Ability; 6] = [
        Ability::Strength,
        Ability::Dexterity,
        Ability::Constitution,
        Ability::Intelligence,
        Ability::Wisdom,
        Ability::Charisma,
    ];

    pub fn abbreviation(&self) -> &'static str {
        match self {
            Ability::Strength => "STR",
            Ability::Dexterity => "DEX",
            Ability::Constitution => "CON",
            Ability::Intelligence => "INT",
            Ability::Wisdom => "WIS",
            Ability::Charisma => "CHA",
        }
    }
}

/// The eighteen 5e skills, declared alphabetically so sets iterate in
/// sheet order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Skill {
    Acrobatics,
    AnimalHandling,
    Arcana,
    Athletics,
    Deception,
    History,
    Insight,
    Intimidation,
    Investigation,
    Medicine,
    Nature,
    Perception,
    Performance,
    Persuasion,
    Religion,
    SleightOfHand,
    Stealth,
    Survival,
}

impl Skill {
    pub const ALL: [Skill; 18] = [
        Skill::Acrobatics,
        Skill::AnimalHandling,
        Skill::Arcana,
        Skill::Athletics,
        Skill::Deception,
        Skill::History,
        Skill::Insight,
        Skill::Intimidation,
        Skill::Investigation,
        Skill::Medicine,
        Skill::Nature,
        Skill::Perception,
        Skill::Performance,
        Skill::Persuasion,
        Skill::Religion,
        Skill::SleightOfHand,
        Skill::Stealth,
        Skill::Survival,
    ];

    pub fn ability(&self) -> Ability {
        match self {
            Skill::Athletics => Ability::Strength,
            Skill::Acrobatics | Skill::SleightOfHand | Skill::Stealth => Ability::Dexterity,
            Skill::Arcana
            | Skill::History
            | Skill::Investigation
            | Skill::Nature
            | Skill::Religion => Ability::Intelligence,
            Skill::AnimalHandling
            | Skill::Insight
            | Skill::Medicine
            | Skill::Perception
            | Skill::Survival => Ability::Wisdom,
            Skill::Deception | Skill::Intimidation | Skill::Performance | Skill::Persuasion => {
                Ability::Charisma
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Skill::Acrobatics => "Acrobatics",
            Skill::AnimalHandling => "Animal Handling",
            Skill::Arcana => "Arcana",
            Skill::Athletics => "Athletics",
            Skill::Deception => "Deception",
            Skill::History => "History",
            Skill::Insight => "Insight",
            Skill::Intimidation => "Intimidation",
            Skill::Investigation => "Investigation",
            Skill::Medicine => "Medicine",
            Skill::Nature => "Nature",
            Skill::Perception => "Perception",
            Skill::Performance => "Performance",
            Skill::Persuasion => "Persuasion",
            Skill::Religion => "Religion",
            Skill::SleightOfHand => "Sleight of Hand",
            Skill::Stealth => "Stealth",
            Skill::Survival => "Survival",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Race {
    Human,
    Elf,
    Dwarf,
    Halfling,
    Gnome,
    HalfElf,
    HalfOrc,
    Tiefling,
    Dragonborn,
}

impl Race {
    pub fn name(&self) -> &'static str {
        match self {
            Race::Human => "Human",
            Race::Elf => "Elf",
            Race::Dwarf => "Dwarf",
            Race::Halfling => "Halfling",
            Race::Gnome => "Gnome",
            Race::HalfElf => "Half-Elf",
            Race::HalfOrc => "Half-Orc",
            Race::Tiefling => "Tiefling",
            Race::Dragonborn => "Dragonborn",
        }
    }
}

impl fmt::Display for Race {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharacterClass {
    Barbarian,
    Bard,
    Cleric,
    Druid,
    Fighter,
    Monk,
    Paladin,
    Ranger,
    Rogue,
    Sorcerer,
    Warlock,
    Wizard,
}

impl CharacterClass {
    pub const ALL: [CharacterClass; 12] = [
        CharacterClass::Barbarian,
        CharacterClass::Bard,
        CharacterClass::Cleric,
        CharacterClass::Druid,
        CharacterClass::Fighter,
        CharacterClass::Monk,
        CharacterClass::Paladin,
        CharacterClass::Ranger,
        CharacterClass::Rogue,
        CharacterClass::Sorcerer,
        CharacterClass::Warlock,
        CharacterClass::Wizard,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            CharacterClass::Barbarian => "Barbarian",
            CharacterClass::Bard => "Bard",
            CharacterClass::Cleric => "Cleric",
            CharacterClass::Druid => "Druid",
            CharacterClass::Fighter => "Fighter",
            CharacterClass::Monk => "Monk",
            CharacterClass::Paladin => "Paladin",
            CharacterClass::Ranger => "Ranger",
            CharacterClass::Rogue => "Rogue",
            CharacterClass::Sorcerer => "Sorcerer",
            CharacterClass::Warlock => "Warlock",
            CharacterClass::Wizard => "Wizard",
        }
    }

    pub fn from_name(name: &str) -> Option<CharacterClass> {
        let wanted = normalize_name(name);
        Self::ALL
            .into_iter()
            .find(|class| normalize_name(class.name()) == wanted)
    }
}

impl fmt::Display for CharacterClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase().replace(['-', '_'], " ")
}

fn default_score() -> i32 {
    10
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct AbilityScores {
    #[serde(default = "default_score")]
    #[validate(range(min = 1, max = 30))]
    pub strength: i32,
    #[serde(default = "default_score")]
    #[validate(range(min = 1, max = 30))]
    pub dexterity: i32,
    #[serde(default = "default_score")]
    #[validate(range(min = 1, max = 30))]
    pub constitution: i32,
    #[serde(default = "default_score")]
    #[validate(range(min = 1, max = 30))]
    pub intelligence: i32,
    #[serde(default = "default_score")]
    #[validate(range(min = 1, max = 30))]
    pub wisdom: i32,
    #[serde(default = "default_score")]
    #[validate(range(min = 1, max = 30))]
    pub charisma: i32,
}

impl Default for AbilityScores {
    fn default() -> Self {
        Self {
            strength: 10,
            dexterity: 10,
            constitution: 10,
            intelligence: 10,
            wisdom: 10,
            charisma: 10,
        }
    }
}

impl AbilityScores {
    pub fn get(&self, ability: Ability) -> i32 {
        match ability {
            Ability::Strength => self.strength,
            Ability::Dexterity => self.dexterity,
            Ability::Constitution => self.constitution,
            Ability::Intelligence => self.intelligence,
            Ability::Wisdom => self.wisdom,
            Ability::Charisma => self.charisma,
        }
    }

    pub fn set(&mut self, ability: Ability, score: i32) {
        let slot = match ability {
            Ability::Strength => &mut self.strength,
            Ability::Dexterity => &mut self.dexterity,
            Ability::Constitution => &mut self.constitution,
            Ability::Intelligence => &mut self.intelligence,
            Ability::Wisdom => &mut self.wisdom,
            Ability::Charisma => &mut self.charisma,
        };
        *slot = score;
    }

    pub fn modifier(&self, ability: Ability) -> i32 {
        crate::services::rules::ability_modifier(self.get(ability))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Equipment {
    #[serde(default)]
    pub weapons: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub armor: Option<String>,
    #[serde(default)]
    pub tools: Vec<String>,
    #[serde(default)]
    pub gear: Vec<String>,
}

fn default_level() -> u8 {
    1
}

fn default_hit_points() -> i32 {
    10
}

fn default_armor_class() -> i32 {
    10
}

fn default_proficiency() -> i32 {
    2
}

/// A complete 5e character sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct CharacterSheet {
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
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alignment: Option<String>,
    #[serde(default)]
    #[validate(nested)]
    pub ability_scores: AbilityScores,
    #[serde(default)]
    pub skills: BTreeSet<Skill>,
    #[serde(default)]
    pub equipment: Equipment,
    #[serde(default = "default_hit_points")]
    pub hit_points: i32,
    #[serde(default = "default_armor_class")]
    pub armor_class: i32,
    #[serde(default = "default_proficiency")]
    pub proficiency_bonus: i32,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub spells: Vec<String>,
}

impl CharacterSheet {
    pub fn skill_bonus(&self, skill: Skill) -> i32 {
        let base = self.ability_scores.modifier(skill.ability());
        if self.skills.contains(&skill) {
            base + self.proficiency_bonus
        } else {
            base
        }
    }

    /// Plain-text rendering of the sheet.
    pub fn summary(&self) -> String {
        let scores = &self.ability_scores;
        let mut lines = vec![
            format!("=== {} ===", self.name),
            format!(
                "Race: {} | Class: {} | Level: {}",
                self.race, self.character_class, self.level
            ),
            format!(
                "Background: {} | Alignment: {}",
                self.background.as_deref().unwrap_or("None"),
                self.alignment.as_deref().unwrap_or("None")
            ),
            String::new(),
            "Ability Scores:".to_string(),
        ];
        for ability in Ability::ALL {
            lines.push(format!(
                "  {}: {} ({:+})",
                ability.abbreviation(),
                scores.get(ability),
                scores.modifier(ability)
            ));
        }
        lines.push(String::new());
        lines.push(format!(
            "HP: {} | AC: {} | Proficiency: +{}",
            self.hit_points, self.armor_class, self.proficiency_bonus
        ));

        if !self.skills.is_empty() {
            let names: Vec<&str> = self.skills.iter().map(|s| s.name()).collect();
            lines.push(String::new());
            lines.push(format!("Proficient Skills: {}", names.join(", ")));
        }

        lines.push(String::new());
        lines.push("Skill Bonuses:".to_string());
        for skill in Skill::ALL {
            lines.push(format!(
                "  {} ({}): {:+}",
                skill.name(),
                skill.ability().abbreviation(),
                self.skill_bonus(skill)
            ));
        }

        let equipment = &self.equipment;
        if !equipment.weapons.is_empty() {
            lines.push(String::new());
            lines.push(format!("Weapons: {}", equipment.weapons.join(", ")));
        }
        if let Some(armor) = &equipment.armor {
            lines.push(format!("Armor: {}", armor));
        }
        if !equipment.tools.is_empty() {
            lines.push(format!("Tools: {}", equipment.tools.join(", ")));
        }
        if !equipment.gear.is_empty() {
            lines.push(format!("Gear: {}", equipment.gear.join(", ")));
        }

        if !self.features.is_empty() {
            lines.push(String::new());
            lines.push(format!("Features: {}", self.features.join(", ")));
        }
        if !self.spells.is_empty() {
            lines.push(String::new());
            lines.push(format!("Spells: {}", self.spells.join(", ")));
        }

        lines.join("\n")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Character {
    pub id: String,
    pub owner: String,
    #[serde(flatten)]
    pub sheet: CharacterSheet,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub narrative: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub campaign_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub portrait_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Character {
    pub fn new(owner: &str, sheet: CharacterSheet, narrative: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            owner: owner.to_string(),
            sheet,
            narrative,
            campaign_id: None,
            portrait_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
