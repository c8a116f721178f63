use crate::models::{Campaign, CampaignMode, Character, Dialogue, DialogueRole};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCampaignRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    #[validate(length(max = 2000))]
    pub description: Option<String>,

    #[serde(default)]
    pub mode: CampaignMode,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LinkCharacterRequest {
    #[validate(length(min = 1, message = "character_id is required"))]
    pub character_id: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AttachScriptRequest {
    #[validate(length(min = 1, message = "script_id is required"))]
    pub script_id: String,
}

/// A campaign with its linked characters resolved.
#[derive(Debug, Serialize)]
pub struct CampaignDetail {
    #[serde(flatten)]
    pub campaign: Campaign,
    pub characters: Vec<Character>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct PostDialogueRequest {
    /// Defaults to the caller's username.
    #[validate(length(min = 1, max = 100))]
    pub speaker: Option<String>,

    #[validate(length(min = 1, max = 4000, message = "Content must be 1-4000 characters"))]
    pub content: String,

    pub role: Option<DialogueRole>,

    pub character_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DialogueLog {
    pub campaign_id: String,
    pub entries: Vec<Dialogue>,
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub summary: String,
}
