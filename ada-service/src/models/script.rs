use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Scenario text a campaign owner prepares ahead of play.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Script {
    pub id: String,
    pub owner: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub campaign_id: Option<String>,
    pub title: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Script {
    pub fn new(owner: &str, title: String, body: String, campaign_id: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            owner: owner.to_string(),
            campaign_id,
            title,
            body,
            created_at: now,
            updated_at: now,
        }
    }
}
