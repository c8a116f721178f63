//! Narrative-to-sheet forging.
//!
//! Free text is lowercased with punctuation folded to spaces, then matched
//! against keyword tables on word boundaries. Within one table the earliest
//! occurrence wins and a longer phrase beats a shorter one at the same spot,
//! so "half-elf" resolves to Half-Elf rather than Elf.

use super::rules::{self, MAX_SCORE, MIN_SCORE};
use super::text::{normalize, Haystack};
use crate::models::{Ability, AbilityScores, CharacterClass, CharacterSheet, Equipment, Race, Skill};
use std::collections::BTreeSet;

pub const STANDARD_ARRAY: [i32; 6] = [15, 14, 13, 12, 10, 8];
pub const FALLBACK_NAME: &str = "Unnamed Adventurer";
const MAX_NAME_WORDS: usize = 3;

const RACES: &[(&str, Race)] = &[
    ("human", Race::Human),
    ("elf", Race::Elf),
    ("elven", Race::Elf),
    ("elvish", Race::Elf),
    ("high elf", Race::Elf),
    ("wood elf", Race::Elf),
    ("drow", Race::Elf),
    ("dwarf", Race::Dwarf),
    ("dwarven", Race::Dwarf),
    ("dwarvish", Race::Dwarf),
    ("halfling", Race::Halfling),
    ("hobbit", Race::Halfling),
    ("gnome", Race::Gnome),
    ("gnomish", Race::Gnome),
    ("half-elf", Race::HalfElf),
    ("half-elven", Race::HalfElf),
    ("half-orc", Race::HalfOrc),
    ("orc", Race::HalfOrc),
    ("orcish", Race::HalfOrc),
    ("tiefling", Race::Tiefling),
    ("dragonborn", Race::Dragonborn),
    ("draconic", Race::Dragonborn),
];

const CLASS_NAMES: &[(&str, CharacterClass)] = &[
    ("barbarian", CharacterClass::Barbarian),
    ("bard", CharacterClass::Bard),
    ("cleric", CharacterClass::Cleric),
    ("druid", CharacterClass::Druid),
    ("fighter", CharacterClass::Fighter),
    ("monk", CharacterClass::Monk),
    ("paladin", CharacterClass::Paladin),
    ("ranger", CharacterClass::Ranger),
    ("rogue", CharacterClass::Rogue),
    ("sorcerer", CharacterClass::Sorcerer),
    ("sorceress", CharacterClass::Sorcerer),
    ("warlock", CharacterClass::Warlock),
    ("wizard", CharacterClass::Wizard),
];

const CLASS_SYNONYMS: &[(&str, CharacterClass)] = &[
    ("berserker", CharacterClass::Barbarian),
    ("minstrel", CharacterClass::Bard),
    ("musician", CharacterClass::Bard),
    ("singer", CharacterClass::Bard),
    ("priest", CharacterClass::Cleric),
    ("priestess", CharacterClass::Cleric),
    ("healer", CharacterClass::Cleric),
    ("nature priest", CharacterClass::Druid),
    ("shapeshifter", CharacterClass::Druid),
    ("warrior", CharacterClass::Fighter),
    ("soldier", CharacterClass::Fighter),
    ("knight", CharacterClass::Fighter),
    ("swordsman", CharacterClass::Fighter),
    ("mercenary", CharacterClass::Fighter),
    ("gladiator", CharacterClass::Fighter),
    ("martial artist", CharacterClass::Monk),
    ("holy warrior", CharacterClass::Paladin),
    ("crusader", CharacterClass::Paladin),
    ("hunter", CharacterClass::Ranger),
    ("archer", CharacterClass::Ranger),
    ("tracker", CharacterClass::Ranger),
    ("thief", CharacterClass::Rogue),
    ("assassin", CharacterClass::Rogue),
    ("burglar", CharacterClass::Rogue),
    ("scoundrel", CharacterClass::Rogue),
    ("witch", CharacterClass::Warlock),
    ("hexblade", CharacterClass::Warlock),
    ("mage", CharacterClass::Wizard),
    ("archmage", CharacterClass::Wizard),
    ("magic user", CharacterClass::Wizard),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Background {
    Acolyte,
    Charlatan,
    Criminal,
    Entertainer,
    FolkHero,
    GuildArtisan,
    Hermit,
    Noble,
    Outlander,
    Sage,
    Sailor,
    Soldier,
    Urchin,
}

impl Background {
    pub fn name(&self) -> &'static str {
        match self {
            Background::Acolyte => "Acolyte",
            Background::Charlatan => "Charlatan",
            Background::Criminal => "Criminal",
            Background::Entertainer => "Entertainer",
            Background::FolkHero => "Folk Hero",
            Background::GuildArtisan => "Guild Artisan",
            Background::Hermit => "Hermit",
            Background::Noble => "Noble",
            Background::Outlander => "Outlander",
            Background::Sage => "Sage",
            Background::Sailor => "Sailor",
            Background::Soldier => "Soldier",
            Background::Urchin => "Urchin",
        }
    }

    pub fn skills(&self) -> [Skill; 2] {
        match self {
            Background::Acolyte => [Skill::Insight, Skill::Religion],
            Background::Charlatan => [Skill::Deception, Skill::SleightOfHand],
            Background::Criminal => [Skill::Deception, Skill::Stealth],
            Background::Entertainer => [Skill::Acrobatics, Skill::Performance],
            Background::FolkHero => [Skill::AnimalHandling, Skill::Survival],
            Background::GuildArtisan => [Skill::Insight, Skill::Persuasion],
            Background::Hermit => [Skill::Medicine, Skill::Religion],
            Background::Noble => [Skill::History, Skill::Persuasion],
            Background::Outlander => [Skill::Athletics, Skill::Survival],
            Background::Sage => [Skill::Arcana, Skill::History],
            Background::Sailor => [Skill::Athletics, Skill::Perception],
            Background::Soldier => [Skill::Athletics, Skill::Intimidation],
            Background::Urchin => [Skill::SleightOfHand, Skill::Stealth],
        }
    }
}

const BACKGROUNDS: &[(&str, Background)] = &[
    ("acolyte", Background::Acolyte),
    ("temple", Background::Acolyte),
    ("monastery", Background::Acolyte),
    ("charlatan", Background::Charlatan),
    ("con artist", Background::Charlatan),
    ("swindler", Background::Charlatan),
    ("criminal", Background::Criminal),
    ("smuggler", Background::Criminal),
    ("outlaw", Background::Criminal),
    ("entertainer", Background::Entertainer),
    ("performer", Background::Entertainer),
    ("circus", Background::Entertainer),
    ("folk hero", Background::FolkHero),
    ("farmer", Background::FolkHero),
    ("artisan", Background::GuildArtisan),
    ("blacksmith", Background::GuildArtisan),
    ("craftsman", Background::GuildArtisan),
    ("guild", Background::GuildArtisan),
    ("hermit", Background::Hermit),
    ("recluse", Background::Hermit),
    ("noble", Background::Noble),
    ("nobility", Background::Noble),
    ("aristocrat", Background::Noble),
    ("prince", Background::Noble),
    ("princess", Background::Noble),
    ("outlander", Background::Outlander),
    ("nomad", Background::Outlander),
    ("wilderness", Background::Outlander),
    ("sage", Background::Sage),
    ("scholar", Background::Sage),
    ("librarian", Background::Sage),
    ("sailor", Background::Sailor),
    ("pirate", Background::Sailor),
    ("soldier", Background::Soldier),
    ("army", Background::Soldier),
    ("military", Background::Soldier),
    ("veteran", Background::Soldier),
    ("street urchin", Background::Urchin),
    ("urchin", Background::Urchin),
    ("orphan", Background::Urchin),
];

const ALIGNMENTS: &[(&str, &str)] = &[
    ("lawful good", "Lawful Good"),
    ("neutral good", "Neutral Good"),
    ("chaotic good", "Chaotic Good"),
    ("lawful neutral", "Lawful Neutral"),
    ("true neutral", "True Neutral"),
    ("neutral", "True Neutral"),
    ("chaotic neutral", "Chaotic Neutral"),
    ("lawful evil", "Lawful Evil"),
    ("neutral evil", "Neutral Evil"),
    ("chaotic evil", "Chaotic Evil"),
];

const ABILITY_CUES: &[(&str, Ability)] = &[
    ("strong", Ability::Strength),
    ("strength", Ability::Strength),
    ("muscular", Ability::Strength),
    ("mighty", Ability::Strength),
    ("powerful", Ability::Strength),
    ("brawny", Ability::Strength),
    ("agile", Ability::Dexterity),
    ("dexterous", Ability::Dexterity),
    ("nimble", Ability::Dexterity),
    ("quick", Ability::Dexterity),
    ("graceful", Ability::Dexterity),
    ("swift", Ability::Dexterity),
    ("tough", Ability::Constitution),
    ("hardy", Ability::Constitution),
    ("sturdy", Ability::Constitution),
    ("resilient", Ability::Constitution),
    ("clever", Ability::Intelligence),
    ("smart", Ability::Intelligence),
    ("intelligent", Ability::Intelligence),
    ("brilliant", Ability::Intelligence),
    ("studious", Ability::Intelligence),
    ("wise", Ability::Wisdom),
    ("perceptive", Ability::Wisdom),
    ("insightful", Ability::Wisdom),
    ("intuitive", Ability::Wisdom),
    ("charismatic", Ability::Charisma),
    ("charming", Ability::Charisma),
    ("persuasive", Ability::Charisma),
    ("eloquent", Ability::Charisma),
];

const SKILL_CUES: &[(&str, Skill)] = &[
    ("acrobatics", Skill::Acrobatics),
    ("acrobat", Skill::Acrobatics),
    ("animal handling", Skill::AnimalHandling),
    ("arcana", Skill::Arcana),
    ("athletics", Skill::Athletics),
    ("athletic", Skill::Athletics),
    ("deception", Skill::Deception),
    ("liar", Skill::Deception),
    ("history", Skill::History),
    ("insight", Skill::Insight),
    ("intimidation", Skill::Intimidation),
    ("intimidating", Skill::Intimidation),
    ("investigation", Skill::Investigation),
    ("investigator", Skill::Investigation),
    ("detective", Skill::Investigation),
    ("medicine", Skill::Medicine),
    ("nature", Skill::Nature),
    ("perception", Skill::Perception),
    ("keen eyed", Skill::Perception),
    ("performance", Skill::Performance),
    ("persuasion", Skill::Persuasion),
    ("religion", Skill::Religion),
    ("religious", Skill::Religion),
    ("sleight of hand", Skill::SleightOfHand),
    ("pickpocket", Skill::SleightOfHand),
    ("stealth", Skill::Stealth),
    ("stealthy", Skill::Stealth),
    ("sneaky", Skill::Stealth),
    ("survival", Skill::Survival),
    ("survivalist", Skill::Survival),
];

const WEAPONS: &[(&str, &str)] = &[
    ("dagger", "Dagger"),
    ("daggers", "Dagger"),
    ("longsword", "Longsword"),
    ("long sword", "Longsword"),
    ("sword", "Longsword"),
    ("shortsword", "Shortsword"),
    ("short sword", "Shortsword"),
    ("greatsword", "Greatsword"),
    ("greataxe", "Greataxe"),
    ("battleaxe", "Battleaxe"),
    ("handaxe", "Handaxe"),
    ("axe", "Handaxe"),
    ("warhammer", "Warhammer"),
    ("hammer", "Warhammer"),
    ("maul", "Maul"),
    ("mace", "Mace"),
    ("rapier", "Rapier"),
    ("scimitar", "Scimitar"),
    ("quarterstaff", "Quarterstaff"),
    ("staff", "Quarterstaff"),
    ("spear", "Spear"),
    ("javelin", "Javelin"),
    ("trident", "Trident"),
    ("halberd", "Halberd"),
    ("glaive", "Glaive"),
    ("flail", "Flail"),
    ("morningstar", "Morningstar"),
    ("whip", "Whip"),
    ("club", "Club"),
    ("sickle", "Sickle"),
    ("sling", "Sling"),
    ("dart", "Dart"),
    ("darts", "Dart"),
    ("longbow", "Longbow"),
    ("shortbow", "Shortbow"),
    ("crossbow", "Light Crossbow"),
    ("light crossbow", "Light Crossbow"),
    ("hand crossbow", "Hand Crossbow"),
    ("heavy crossbow", "Heavy Crossbow"),
];

const ARMOR: &[(&str, &str)] = &[
    ("leather", "Leather Armor"),
    ("leather armor", "Leather Armor"),
    ("studded leather", "Studded Leather"),
    ("hide armor", "Hide Armor"),
    ("chain shirt", "Chain Shirt"),
    ("scale mail", "Scale Mail"),
    ("breastplate", "Breastplate"),
    ("half plate", "Half Plate"),
    ("ring mail", "Ring Mail"),
    ("chain mail", "Chain Mail"),
    ("chainmail", "Chain Mail"),
    ("splint", "Splint"),
    ("plate armor", "Plate Armor"),
    ("full plate", "Plate Armor"),
];

const NO_ARMOR: &[(&str, ())] = &[("unarmored", ()), ("no armor", ()), ("without armor", ())];

const SPELLS: &[(&str, &str)] = &[
    ("fire bolt", "Fire Bolt"),
    ("firebolt", "Fire Bolt"),
    ("fireball", "Fireball"),
    ("magic missile", "Magic Missile"),
    ("mage hand", "Mage Hand"),
    ("prestidigitation", "Prestidigitation"),
    ("burning hands", "Burning Hands"),
    ("lightning bolt", "Lightning Bolt"),
    ("thunderwave", "Thunderwave"),
    ("misty step", "Misty Step"),
    ("detect magic", "Detect Magic"),
    ("counterspell", "Counterspell"),
    ("invisibility", "Invisibility"),
    ("cure wounds", "Cure Wounds"),
    ("healing word", "Healing Word"),
    ("sacred flame", "Sacred Flame"),
    ("guidance", "Guidance"),
    ("bless", "Bless"),
    ("eldritch blast", "Eldritch Blast"),
    ("hex", "Hex"),
    ("minor illusion", "Minor Illusion"),
    ("charm person", "Charm Person"),
    ("vicious mockery", "Vicious Mockery"),
    ("druidcraft", "Druidcraft"),
    ("produce flame", "Produce Flame"),
    ("entangle", "Entangle"),
    ("goodberry", "Goodberry"),
    ("hunter's mark", "Hunter's Mark"),
    ("speak with animals", "Speak with Animals"),
];

/// Race named in the text, Human when none is.
pub fn detect_race(text: &str) -> Race {
    Haystack::new(text).first_match(RACES).unwrap_or(Race::Human)
}

/// Class named in the text. Class names take precedence over synonyms; Fighter
/// when neither appears.
pub fn detect_class(text: &str) -> CharacterClass {
    let haystack = Haystack::new(text);
    haystack
        .first_match(CLASS_NAMES)
        .or_else(|| haystack.first_match(CLASS_SYNONYMS))
        .unwrap_or(CharacterClass::Fighter)
}

pub fn detect_background(text: &str) -> Option<Background> {
    Haystack::new(text).first_match(BACKGROUNDS)
}

pub fn detect_alignment(text: &str) -> Option<&'static str> {
    Haystack::new(text).first_match(ALIGNMENTS)
}

/// Capitalised words following "named", "called" or "name is".
pub fn detect_name(text: &str) -> Option<String> {
    let words: Vec<&str> = text.split_whitespace().collect();

    for (i, word) in words.iter().enumerate() {
        let cue = bare_word(word).to_lowercase();
        let start = match cue.as_str() {
            "named" | "called" => i + 1,
            "name" if words
                .get(i + 1)
                .is_some_and(|next| bare_word(next).eq_ignore_ascii_case("is")) =>
            {
                i + 2
            }
            _ => continue,
        };
        // A cue word that itself ends a clause ("I am called.") names nothing
        if ends_clause(word) {
            continue;
        }

        let mut parts = Vec::new();
        for raw in words.iter().skip(start).take(MAX_NAME_WORDS) {
            let part = bare_word(raw);
            if !part.chars().next().is_some_and(char::is_uppercase) {
                break;
            }
            parts.push(part);
            if ends_clause(raw) {
                break;
            }
        }

        if !parts.is_empty() {
            return Some(parts.join(" "));
        }
    }

    None
}

fn bare_word(word: &str) -> &str {
    word.trim_matches(|c: char| !c.is_alphanumeric() && c != '\'' && c != '-')
        .trim_matches(|c| c == '\'' || c == '-')
}

fn ends_clause(word: &str) -> bool {
    word.ends_with([',', '.', ';', ':', '!', '?', ')'])
}

/// "level 5" or "5th level"; clamped to 1..=20.
pub fn detect_level(text: &str) -> Option<u8> {
    let normalized = normalize(text);
    let tokens: Vec<&str> = normalized.split(' ').collect();

    for (i, token) in tokens.iter().enumerate() {
        let candidate = if *token == "level" {
            tokens.get(i + 1).and_then(|next| next.parse::<u32>().ok())
        } else if tokens.get(i + 1) == Some(&"level") {
            ordinal(token)
        } else {
            None
        };
        if let Some(level) = candidate {
            return Some(clamp_level(level));
        }
    }
    None
}

fn ordinal(token: &str) -> Option<u32> {
    ["st", "nd", "rd", "th"]
        .iter()
        .find_map(|suffix| token.strip_suffix(suffix))
        .and_then(|digits| digits.parse().ok())
}

pub fn clamp_level(level: u32) -> u8 {
    level.clamp(1, 20) as u8
}

/// Abilities emphasised in the text, in order of first appearance.
pub fn detect_emphasis(text: &str) -> Vec<Ability> {
    let haystack = Haystack::new(text);
    let mut firsts: Vec<(usize, Ability)> = Ability::ALL
        .into_iter()
        .filter_map(|ability| {
            ABILITY_CUES
                .iter()
                .filter(|(_, a)| *a == ability)
                .filter_map(|(phrase, _)| haystack.position(phrase))
                .min()
                .map(|pos| (pos, ability))
        })
        .collect();
    firsts.sort();
    firsts.into_iter().map(|(_, ability)| ability).collect()
}

/// Standard array over the class priority with emphasised abilities moved to
/// the front, then racial bonuses.
pub fn assign_scores(class: CharacterClass, race: Race, emphasis: &[Ability]) -> AbilityScores {
    let mut order: Vec<Ability> = emphasis.to_vec();
    for ability in class.ability_priority() {
        if !order.contains(&ability) {
            order.push(ability);
        }
    }

    let mut scores = AbilityScores::default();
    for (ability, score) in order.into_iter().zip(STANDARD_ARRAY) {
        scores.set(ability, score);
    }
    rules::apply_racial_bonuses(&mut scores, race);
    for ability in Ability::ALL {
        scores.set(ability, scores.get(ability).clamp(MIN_SCORE, MAX_SCORE));
    }
    scores
}

/// Optional caller-supplied values that win over anything read from the text.
#[derive(Debug, Default, Clone)]
pub struct ForgeOverrides {
    pub name: Option<String>,
    pub level: Option<u32>,
}

pub fn forge(narrative: &str, overrides: &ForgeOverrides) -> CharacterSheet {
    let haystack = Haystack::new(narrative);

    let race = detect_race(narrative);
    let class = detect_class(narrative);
    let background = detect_background(narrative);

    let name = overrides
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .or_else(|| detect_name(narrative))
        .unwrap_or_else(|| FALLBACK_NAME.to_string());

    let level = overrides
        .level
        .map(clamp_level)
        .or_else(|| detect_level(narrative))
        .unwrap_or(1);

    let ability_scores = assign_scores(class, race, &detect_emphasis(narrative));

    let mut skills: BTreeSet<Skill> = class.skill_proficiencies().iter().copied().collect();
    if let Some(background) = background {
        skills.extend(background.skills());
    }
    skills.extend(haystack.all_matches(SKILL_CUES));

    let kit = class.starting_kit();
    let named_weapons = haystack.all_matches(WEAPONS);
    let weapons = if named_weapons.is_empty() {
        kit.weapons.iter().map(|w| w.to_string()).collect()
    } else {
        named_weapons.into_iter().map(str::to_string).collect()
    };
    let armor = if haystack.contains_any(NO_ARMOR) {
        None
    } else {
        haystack
            .first_match(ARMOR)
            .or(kit.armor)
            .map(str::to_string)
    };

    let named_spells = haystack.all_matches(SPELLS);
    let spells = if named_spells.is_empty() {
        class.default_spells().iter().map(|s| s.to_string()).collect()
    } else {
        named_spells.into_iter().map(str::to_string).collect()
    };

    let mut features: Vec<String> = Vec::new();
    for feature in class.level_one_features().iter().chain(race.traits()) {
        if !features.iter().any(|f| f == feature) {
            features.push(feature.to_string());
        }
    }

    let mut sheet = CharacterSheet {
        name,
        race: race.name().to_string(),
        character_class: class.name().to_string(),
        level,
        background: background.map(|b| b.name().to_string()),
        alignment: detect_alignment(narrative).map(str::to_string),
        ability_scores,
        skills,
        equipment: Equipment {
            weapons,
            armor,
            tools: kit.tools.iter().map(|t| t.to_string()).collect(),
            gear: kit.gear.iter().map(|g| g.to_string()).collect(),
        },
        hit_points: 0,
        armor_class: 0,
        proficiency_bonus: 0,
        features,
        spells,
    };
    rules::apply_game_rules(&mut sheet);
    sheet
}
