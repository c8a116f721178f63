use crate::services::chronicle::ParsedEntry;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Journal {
    pub id: String,
    pub owner: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub campaign_id: Option<String>,
    pub title: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_number: Option<u32>,
    #[serde(default)]
    pub characters: Vec<String>,
    #[serde(default)]
    pub locations: Vec<String>,
    #[serde(default)]
    pub key_events: Vec<String>,
    pub raw_notes: String,
    pub created_at: DateTime<Utc>,
}

impl Journal {
    pub fn new(
        owner: &str,
        campaign_id: Option<String>,
        session_number: Option<u32>,
        entry: ParsedEntry,
        raw_notes: String,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            owner: owner.to_string(),
            campaign_id,
            title: entry.title,
            content: entry.content,
            session_number,
            characters: entry.characters,
            locations: entry.locations,
            key_events: entry.key_events,
            raw_notes,
            created_at: Utc::now(),
        }
    }
}
