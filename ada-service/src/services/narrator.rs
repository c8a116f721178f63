//! Narration for AI-DM campaigns.
//!
//! The [`Narrator`] trait keeps turn handling independent of how prose is
//! produced. [`LocalNarrator`] is deterministic and runs in-process.

use super::text::Haystack;
use crate::models::{Dialogue, DialogueRole};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NarratorError {
    #[error("Narrator unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid narration request: {0}")]
    InvalidRequest(String),
}

/// Everything the narrator sees for one turn.
#[derive(Debug, Clone)]
pub struct NarrationRequest {
    pub campaign_name: String,
    /// Title of the attached script, if any.
    pub script_title: Option<String>,
    pub actor: String,
    pub action: String,
    /// Turn number being played, starting at 1.
    pub turn: u64,
    /// Most recent log entries, oldest first.
    pub history: Vec<Dialogue>,
}

#[async_trait]
pub trait Narrator: Send + Sync {
    async fn narrate(&self, request: &NarrationRequest) -> Result<String, NarratorError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Combat,
    Social,
    Exploration,
    Stealth,
    Magic,
    Rest,
    Other,
}

const INTENT_CUES: &[(&str, Intent)] = &[
    ("attack", Intent::Combat),
    ("strike", Intent::Combat),
    ("fight", Intent::Combat),
    ("swing", Intent::Combat),
    ("stab", Intent::Combat),
    ("slash", Intent::Combat),
    ("shoot", Intent::Combat),
    ("charge", Intent::Combat),
    ("punch", Intent::Combat),
    ("parry", Intent::Combat),
    ("kill", Intent::Combat),
    ("talk", Intent::Social),
    ("speak", Intent::Social),
    ("ask", Intent::Social),
    ("say", Intent::Social),
    ("tell", Intent::Social),
    ("greet", Intent::Social),
    ("persuade", Intent::Social),
    ("convince", Intent::Social),
    ("negotiate", Intent::Social),
    ("bribe", Intent::Social),
    ("intimidate", Intent::Social),
    ("look", Intent::Exploration),
    ("search", Intent::Exploration),
    ("explore", Intent::Exploration),
    ("examine", Intent::Exploration),
    ("investigate", Intent::Exploration),
    ("inspect", Intent::Exploration),
    ("open", Intent::Exploration),
    ("enter", Intent::Exploration),
    ("climb", Intent::Exploration),
    ("follow", Intent::Exploration),
    ("travel", Intent::Exploration),
    ("sneak", Intent::Stealth),
    ("hide", Intent::Stealth),
    ("creep", Intent::Stealth),
    ("tiptoe", Intent::Stealth),
    ("steal", Intent::Stealth),
    ("pickpocket", Intent::Stealth),
    ("cast", Intent::Magic),
    ("spell", Intent::Magic),
    ("magic", Intent::Magic),
    ("conjure", Intent::Magic),
    ("ritual", Intent::Magic),
    ("rest", Intent::Rest),
    ("sleep", Intent::Rest),
    ("camp", Intent::Rest),
    ("eat", Intent::Rest),
    ("drink", Intent::Rest),
    ("meditate", Intent::Rest),
];

/// Intent of the earliest cue in the action.
pub fn classify(action: &str) -> Intent {
    Haystack::new(action)
        .first_match(INTENT_CUES)
        .unwrap_or(Intent::Other)
}

const ECHO_LIMIT: usize = 80;

/// First sentence of the previous DM entry, shortened.
fn previous_beat(history: &[Dialogue]) -> Option<String> {
    let last = history
        .iter()
        .rev()
        .find(|entry| entry.role == DialogueRole::Dm)?;
    let sentence = last
        .content
        .split_inclusive(['.', '!', '?'])
        .next()
        .unwrap_or(last.content.as_str())
        .trim();
    if sentence.is_empty() {
        return None;
    }
    if sentence.chars().count() <= ECHO_LIMIT {
        return Some(sentence.to_string());
    }
    let clipped: String = sentence.chars().take(ECHO_LIMIT).collect();
    Some(format!("{}...", clipped.trim_end()))
}

#[derive(Debug, Default, Clone, Copy)]
pub struct LocalNarrator;

impl LocalNarrator {
    pub fn new() -> Self {
        Self
    }

    fn render(&self, request: &NarrationRequest) -> String {
        let actor = request.actor.as_str();
        let place = request
            .script_title
            .as_deref()
            .unwrap_or(request.campaign_name.as_str());

        let opening = if request.turn <= 1 {
            match &request.script_title {
                Some(title) => format!("The tale of {} begins.", title),
                None => format!("A new chapter opens in {}.", request.campaign_name),
            }
        } else {
            match previous_beat(&request.history) {
                Some(beat) => format!("Still echoing: \"{}\"", beat),
                None => format!("The story of {} continues.", request.campaign_name),
            }
        };

        let body = match classify(&request.action) {
            Intent::Combat => format!(
                "{actor} lunges into the fray. Steel rings out as the blow finds its mark, \
                 and the foe staggers back, wary now of {actor}'s resolve."
            ),
            Intent::Social => format!(
                "{actor} speaks, and the words hang in the air. The listener weighs them \
                 carefully before answering with a guarded nod."
            ),
            Intent::Exploration => format!(
                "{actor} presses onward through {place}, senses sharp. Details surface from \
                 the gloom: old tracks, a draft of cold air, a path not yet taken."
            ),
            Intent::Stealth => format!(
                "{actor} melts into the shadows of {place}. For a breathless moment no one \
                 notices, and the way ahead lies open."
            ),
            Intent::Magic => format!(
                "{actor} gathers arcane power. The air crackles as the weave answers, bending \
                 the moment to {actor}'s will."
            ),
            Intent::Rest => format!(
                "{actor} takes a moment to rest. The fire burns low, and for now {place} keeps \
                 its dangers at bay."
            ),
            Intent::Other => format!(
                "{actor} chooses to {}. The world of {place} shifts in response, and new \
                 possibilities unfold.",
                request.action.trim().trim_end_matches(['.', '!', '?'])
            ),
        };

        format!("{} {} What do you do next?", opening, body)
    }
}

#[async_trait]
impl Narrator for LocalNarrator {
    async fn narrate(&self, request: &NarrationRequest) -> Result<String, NarratorError> {
        if request.action.trim().is_empty() {
            return Err(NarratorError::InvalidRequest(
                "action must not be empty".to_string(),
            ));
        }
        Ok(self.render(request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(action: &str, turn: u64, history: Vec<Dialogue>) -> NarrationRequest {
        NarrationRequest {
            campaign_name: "Lost Mine".to_string(),
            script_title: None,
            actor: "Aria".to_string(),
            action: action.to_string(),
            turn,
            history,
        }
    }

    #[test]
    fn classifies_by_earliest_cue() {
        assert_eq!(classify("I attack the goblin"), Intent::Combat);
        assert_eq!(classify("sneak past, then attack"), Intent::Stealth);
        assert_eq!(classify("Cast a spell of light"), Intent::Magic);
        assert_eq!(classify("ask the innkeeper about rumors"), Intent::Social);
        assert_eq!(classify("search the room"), Intent::Exploration);
        assert_eq!(classify("make camp for the night"), Intent::Rest);
        assert_eq!(classify("dance wildly"), Intent::Other);
    }

    #[tokio::test]
    async fn opening_turn_names_the_script() {
        let mut req = request("look around", 1, vec![]);
        req.script_title = Some("The Sunless Citadel".to_string());
        let text = LocalNarrator::new().narrate(&req).await.unwrap();

        assert!(text.starts_with("The tale of The Sunless Citadel begins."));
        assert!(text.contains("Aria presses onward through The Sunless Citadel"));
        assert!(text.ends_with("What do you do next?"));
    }

    #[tokio::test]
    async fn later_turns_echo_previous_beat() {
        let dm = Dialogue::new(
            "c1",
            DialogueRole::Dm,
            "DM".to_string(),
            None,
            "A troll bursts through the door! It roars.".to_string(),
            1,
        );
        let text = LocalNarrator::new()
            .narrate(&request("attack the troll", 2, vec![dm]))
            .await
            .unwrap();
        assert!(text.starts_with("Still echoing: \"A troll bursts through the door!\""));
        assert!(text.contains("Aria lunges into the fray"));
    }

    #[tokio::test]
    async fn same_input_same_output() {
        let narrator = LocalNarrator::new();
        let req = request("dance wildly.", 3, vec![]);
        let first = narrator.narrate(&req).await.unwrap();
        let second = narrator.narrate(&req).await.unwrap();
        assert_eq!(first, second);
        assert!(first.contains("Aria chooses to dance wildly. The world of Lost Mine"));
    }

    #[tokio::test]
    async fn rejects_blank_action() {
        let result = LocalNarrator::new().narrate(&request("   ", 1, vec![])).await;
        assert!(matches!(result, Err(NarratorError::InvalidRequest(_))));
    }
}
