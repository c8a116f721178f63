//! Derived 5e statistics and the class and race lookup tables.

use crate::models::{Ability, AbilityScores, CharacterClass, CharacterSheet, Race, Skill};

pub const MIN_SCORE: i32 = 1;
pub const MAX_SCORE: i32 = 30;

pub fn ability_modifier(score: i32) -> i32 {
    (score - 10).div_euclid(2)
}

pub fn proficiency_bonus(level: u8) -> i32 {
    2 + (i32::from(level.max(1)) - 1) / 4
}

/// Hit die for a class name; unrecognised classes roll a d8.
pub fn hit_die(class_name: &str) -> i32 {
    CharacterClass::from_name(class_name)
        .map(|class| class.hit_die())
        .unwrap_or(8)
}

/// Maximum die at first level, average (`die/2 + 1`) for each level after.
pub fn hit_points(class_name: &str, level: u8, constitution: i32) -> i32 {
    let die = hit_die(class_name);
    let con = ability_modifier(constitution);
    let level = i32::from(level.max(1));

    if level == 1 {
        (die + con).max(1)
    } else {
        let first = die + con;
        let rest = (die / 2 + 1 + con) * (level - 1);
        (first + rest).max(level)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArmorWeight {
    Light,
    Medium,
    Heavy,
}

/// Searched in order by case-insensitive substring; longer names that
/// contain a shorter entry come first.
const ARMOR_TABLE: [(&str, i32, ArmorWeight); 11] = [
    ("studded leather", 12, ArmorWeight::Light),
    ("leather", 11, ArmorWeight::Light),
    ("hide", 12, ArmorWeight::Medium),
    ("chain shirt", 13, ArmorWeight::Medium),
    ("scale mail", 14, ArmorWeight::Medium),
    ("breastplate", 14, ArmorWeight::Medium),
    ("half plate", 15, ArmorWeight::Medium),
    ("ring mail", 14, ArmorWeight::Heavy),
    ("chain mail", 16, ArmorWeight::Heavy),
    ("splint", 17, ArmorWeight::Heavy),
    ("plate", 18, ArmorWeight::Heavy),
];

pub fn lookup_armor(armor: &str) -> Option<(i32, ArmorWeight)> {
    let armor = armor.to_lowercase();
    ARMOR_TABLE
        .iter()
        .find(|(name, _, _)| armor.contains(name))
        .map(|(_, base, weight)| (*base, *weight))
}

pub fn armor_class(dexterity: i32, armor: Option<&str>) -> i32 {
    let dex = ability_modifier(dexterity);
    match armor.filter(|a| !a.trim().is_empty()).and_then(lookup_armor) {
        Some((base, ArmorWeight::Light)) => base + dex,
        Some((base, ArmorWeight::Medium)) => base + dex.min(2),
        Some((base, ArmorWeight::Heavy)) => base,
        None => 10 + dex,
    }
}

/// Proficiency always follows level. Hit points and armor class are only
/// filled in when missing or below their floor.
pub fn apply_game_rules(sheet: &mut CharacterSheet) {
    sheet.proficiency_bonus = proficiency_bonus(sheet.level);

    if sheet.hit_points < 1 {
        sheet.hit_points = hit_points(
            &sheet.character_class,
            sheet.level,
            sheet.ability_scores.constitution,
        );
    }

    if sheet.armor_class < 10 {
        sheet.armor_class = armor_class(
            sheet.ability_scores.dexterity,
            sheet.equipment.armor.as_deref(),
        );
    }
}

pub fn apply_racial_bonuses(scores: &mut AbilityScores, race: Race) {
    match race {
        Race::Human => {
            for ability in Ability::ALL {
                bump(scores, ability, 1);
            }
        }
        Race::HalfElf => {
            bump(scores, Ability::Charisma, 2);
            let mut others: Vec<Ability> = Ability::ALL
                .into_iter()
                .filter(|a| *a != Ability::Charisma)
                .collect();
            // Stable sort keeps sheet order among equal scores
            others.sort_by_key(|a| std::cmp::Reverse(scores.get(*a)));
            for ability in others.into_iter().take(2) {
                bump(scores, ability, 1);
            }
        }
        other => {
            for (ability, bonus) in other.ability_bonuses() {
                bump(scores, *ability, *bonus);
            }
        }
    }
}

fn bump(scores: &mut AbilityScores, ability: Ability, bonus: i32) {
    let score = (scores.get(ability) + bonus).clamp(MIN_SCORE, MAX_SCORE);
    scores.set(ability, score);
}

impl Race {
    /// Fixed bonuses. Human and Half-Elf are resolved in [`apply_racial_bonuses`].
    pub fn ability_bonuses(&self) -> &'static [(Ability, i32)] {
        match self {
            Race::Human | Race::HalfElf => &[],
            Race::Elf => &[(Ability::Dexterity, 2)],
            Race::Dwarf => &[(Ability::Constitution, 2)],
            Race::Halfling => &[(Ability::Dexterity, 2)],
            Race::Gnome => &[(Ability::Intelligence, 2)],
            Race::HalfOrc => &[(Ability::Strength, 2), (Ability::Constitution, 1)],
            Race::Tiefling => &[(Ability::Charisma, 2), (Ability::Intelligence, 1)],
            Race::Dragonborn => &[(Ability::Strength, 2), (Ability::Charisma, 1)],
        }
    }

    pub fn traits(&self) -> &'static [&'static str] {
        match self {
            Race::Human => &["Versatile", "Extra Language"],
            Race::Elf => &["Darkvision", "Fey Ancestry", "Trance"],
            Race::Dwarf => &["Darkvision", "Dwarven Resilience", "Stonecunning"],
            Race::Halfling => &["Lucky", "Brave", "Halfling Nimbleness"],
            Race::Gnome => &["Darkvision", "Gnome Cunning"],
            Race::HalfElf => &["Darkvision", "Fey Ancestry", "Skill Versatility"],
            Race::HalfOrc => &["Darkvision", "Relentless Endurance", "Savage Attacks"],
            Race::Tiefling => &["Darkvision", "Hellish Resistance", "Infernal Legacy"],
            Race::Dragonborn => &["Draconic Ancestry", "Breath Weapon", "Damage Resistance"],
        }
    }
}

/// Starting equipment handed out by a class.
pub struct StartingKit {
    pub weapons: &'static [&'static str],
    pub armor: Option<&'static str>,
    pub tools: &'static [&'static str],
    pub gear: &'static [&'static str],
}

impl CharacterClass {
    pub fn hit_die(&self) -> i32 {
        match self {
            CharacterClass::Barbarian => 12,
            CharacterClass::Fighter | CharacterClass::Paladin | CharacterClass::Ranger => 10,
            CharacterClass::Cleric
            | CharacterClass::Druid
            | CharacterClass::Monk
            | CharacterClass::Rogue
            | CharacterClass::Bard
            | CharacterClass::Warlock => 8,
            CharacterClass::Sorcerer | CharacterClass::Wizard => 6,
        }
    }

    /// Abilities from most to least important for the class.
    pub fn ability_priority(&self) -> [Ability; 6] {
        use Ability::*;
        match self {
            CharacterClass::Barbarian => [Strength, Constitution, Dexterity, Wisdom, Charisma, Intelligence],
            CharacterClass::Bard => [Charisma, Dexterity, Constitution, Wisdom, Intelligence, Strength],
            CharacterClass::Cleric => [Wisdom, Constitution, Strength, Charisma, Dexterity, Intelligence],
            CharacterClass::Druid => [Wisdom, Constitution, Dexterity, Intelligence, Charisma, Strength],
            CharacterClass::Fighter => [Strength, Constitution, Dexterity, Wisdom, Charisma, Intelligence],
            CharacterClass::Monk => [Dexterity, Wisdom, Constitution, Strength, Intelligence, Charisma],
            CharacterClass::Paladin => [Strength, Charisma, Constitution, Wisdom, Dexterity, Intelligence],
            CharacterClass::Ranger => [Dexterity, Wisdom, Constitution, Strength, Intelligence, Charisma],
            CharacterClass::Rogue => [Dexterity, Intelligence, Constitution, Charisma, Wisdom, Strength],
            CharacterClass::Sorcerer => [Charisma, Constitution, Dexterity, Wisdom, Intelligence, Strength],
            CharacterClass::Warlock => [Charisma, Constitution, Dexterity, Wisdom, Intelligence, Strength],
            CharacterClass::Wizard => [Intelligence, Constitution, Dexterity, Wisdom, Charisma, Strength],
        }
    }

    pub fn skill_proficiencies(&self) -> &'static [Skill] {
        match self {
            CharacterClass::Barbarian => &[Skill::Athletics, Skill::Survival],
            CharacterClass::Bard => &[Skill::Performance, Skill::Persuasion, Skill::Deception],
            CharacterClass::Cleric => &[Skill::Insight, Skill::Religion],
            CharacterClass::Druid => &[Skill::Nature, Skill::Survival],
            CharacterClass::Fighter => &[Skill::Athletics, Skill::Intimidation],
            CharacterClass::Monk => &[Skill::Acrobatics, Skill::Stealth],
            CharacterClass::Paladin => &[Skill::Athletics, Skill::Persuasion],
            CharacterClass::Ranger => &[Skill::Perception, Skill::Stealth, Skill::Survival],
            CharacterClass::Rogue => &[
                Skill::Stealth,
                Skill::SleightOfHand,
                Skill::Perception,
                Skill::Deception,
            ],
            CharacterClass::Sorcerer => &[Skill::Arcana, Skill::Persuasion],
            CharacterClass::Warlock => &[Skill::Arcana, Skill::Deception],
            CharacterClass::Wizard => &[Skill::Arcana, Skill::History],
        }
    }

    pub fn level_one_features(&self) -> &'static [&'static str] {
        match self {
            CharacterClass::Barbarian => &["Rage", "Unarmored Defense"],
            CharacterClass::Bard => &["Bardic Inspiration", "Spellcasting"],
            CharacterClass::Cleric => &["Spellcasting", "Divine Domain"],
            CharacterClass::Druid => &["Druidic", "Spellcasting"],
            CharacterClass::Fighter => &["Fighting Style", "Second Wind"],
            CharacterClass::Monk => &["Unarmored Defense", "Martial Arts"],
            CharacterClass::Paladin => &["Divine Sense", "Lay on Hands"],
            CharacterClass::Ranger => &["Favored Enemy", "Natural Explorer"],
            CharacterClass::Rogue => &["Expertise", "Sneak Attack", "Thieves' Cant"],
            CharacterClass::Sorcerer => &["Spellcasting", "Sorcerous Origin"],
            CharacterClass::Warlock => &["Otherworldly Patron", "Pact Magic"],
            CharacterClass::Wizard => &["Spellcasting", "Arcane Recovery"],
        }
    }

    pub fn starting_kit(&self) -> StartingKit {
        match self {
            CharacterClass::Barbarian => StartingKit {
                weapons: &["Greataxe", "Handaxe"],
                armor: None,
                tools: &[],
                gear: &["Explorer's Pack"],
            },
            CharacterClass::Bard => StartingKit {
                weapons: &["Rapier", "Dagger"],
                armor: Some("Leather Armor"),
                tools: &["Lute"],
                gear: &["Entertainer's Pack"],
            },
            CharacterClass::Cleric => StartingKit {
                weapons: &["Mace"],
                armor: Some("Scale Mail"),
                tools: &[],
                gear: &["Priest's Pack", "Holy Symbol"],
            },
            CharacterClass::Druid => StartingKit {
                weapons: &["Scimitar"],
                armor: Some("Leather Armor"),
                tools: &["Herbalism Kit"],
                gear: &["Explorer's Pack", "Druidic Focus"],
            },
            CharacterClass::Fighter => StartingKit {
                weapons: &["Longsword", "Light Crossbow"],
                armor: Some("Chain Mail"),
                tools: &[],
                gear: &["Dungeoneer's Pack"],
            },
            CharacterClass::Monk => StartingKit {
                weapons: &["Shortsword", "Dart"],
                armor: None,
                tools: &[],
                gear: &["Explorer's Pack"],
            },
            CharacterClass::Paladin => StartingKit {
                weapons: &["Longsword", "Javelin"],
                armor: Some("Chain Mail"),
                tools: &[],
                gear: &["Priest's Pack", "Holy Symbol"],
            },
            CharacterClass::Ranger => StartingKit {
                weapons: &["Longbow", "Shortsword"],
                armor: Some("Scale Mail"),
                tools: &[],
                gear: &["Explorer's Pack"],
            },
            CharacterClass::Rogue => StartingKit {
                weapons: &["Rapier", "Shortbow"],
                armor: Some("Leather Armor"),
                tools: &["Thieves' Tools"],
                gear: &["Burglar's Pack"],
            },
            CharacterClass::Sorcerer => StartingKit {
                weapons: &["Light Crossbow", "Dagger"],
                armor: None,
                tools: &[],
                gear: &["Dungeoneer's Pack", "Arcane Focus"],
            },
            CharacterClass::Warlock => StartingKit {
                weapons: &["Light Crossbow", "Dagger"],
                armor: Some("Leather Armor"),
                tools: &[],
                gear: &["Scholar's Pack", "Arcane Focus"],
            },
            CharacterClass::Wizard => StartingKit {
                weapons: &["Quarterstaff", "Dagger"],
                armor: None,
                tools: &[],
                gear: &["Scholar's Pack", "Spellbook"],
            },
        }
    }

    /// Spells a first-level caster starts with; empty for non-casters.
    pub fn default_spells(&self) -> &'static [&'static str] {
        match self {
            CharacterClass::Bard => &["Vicious Mockery", "Healing Word", "Charm Person"],
            CharacterClass::Cleric => &["Sacred Flame", "Guidance", "Cure Wounds", "Bless"],
            CharacterClass::Druid => &["Druidcraft", "Produce Flame", "Entangle", "Goodberry"],
            CharacterClass::Sorcerer => &["Fire Bolt", "Prestidigitation", "Magic Missile", "Shield"],
            CharacterClass::Warlock => &["Eldritch Blast", "Minor Illusion", "Hex"],
            CharacterClass::Wizard => &["Fire Bolt", "Mage Hand", "Magic Missile", "Shield"],
            _ => &[],
        }
    }
}
