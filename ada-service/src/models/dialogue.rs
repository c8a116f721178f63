use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogueRole {
    Player,
    Dm,
    Narrator,
}

/// One entry of a campaign's conversation log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dialogue {
    pub id: String,
    pub campaign_id: String,
    pub role: DialogueRole,
    pub speaker: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub character_id: Option<String>,
    pub content: String,
    pub turn: u64,
    pub created_at: DateTime<Utc>,
}

impl Dialogue {
    pub fn new(
        campaign_id: &str,
        role: DialogueRole,
        speaker: String,
        character_id: Option<String>,
        content: String,
        turn: u64,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            campaign_id: campaign_id.to_string(),
            role,
            speaker,
            character_id,
            content,
            turn,
            created_at: Utc::now(),
        }
    }
}
