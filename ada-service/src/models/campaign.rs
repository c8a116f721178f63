use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignMode {
    /// A person runs the table; the dialogue log is a play record.
    #[default]
    Human,
    /// Narrative turns come from the narrator.
    AiDm,
}

/// Turn counter and rewind point of an AI-DM campaign.
///
/// `checkpoint` is a position in the campaign's dialogue log; entries past it
/// are discarded on rewind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiDmState {
    pub turn: u64,
    pub checkpoint: usize,
    pub checkpoint_turn: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Campaign {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub owner: String,
    #[serde(default)]
    pub mode: CampaignMode,
    #[serde(default)]
    pub members: Vec<String>,
    #[serde(default)]
    pub character_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script_id: Option<String>,
    #[serde(default)]
    pub ai_dm: AiDmState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Campaign {
    pub fn new(owner: &str, name: String, description: Option<String>, mode: CampaignMode) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            description,
            owner: owner.to_string(),
            mode,
            members: vec![owner.to_string()],
            character_ids: Vec::new(),
            script_id: None,
            ai_dm: AiDmState::default(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_owner(&self, username: &str) -> bool {
        self.owner == username
    }

    pub fn is_member(&self, username: &str) -> bool {
        self.is_owner(username) || self.members.iter().any(|m| m == username)
    }

    pub fn add_member(&mut self, username: &str) {
        if !self.members.iter().any(|m| m == username) {
            self.members.push(username.to_string());
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
