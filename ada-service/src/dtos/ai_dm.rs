use crate::models::Dialogue;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct TurnRequest {
    #[validate(length(min = 1, message = "campaign_id is required"))]
    pub campaign_id: String,

    /// Length is checked against the configured maximum in the handler.
    #[serde(default)]
    pub action: String,

    pub character_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TurnResponse {
    pub turn: u64,
    pub narration: String,
    pub player: Dialogue,
    pub dm: Dialogue,
}

#[derive(Debug, Deserialize, Validate)]
pub struct HistoryQuery {
    #[validate(range(min = 1, message = "limit must be at least 1"))]
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub campaign_id: String,
    pub turn: u64,
    pub checkpoint: usize,
    pub total: usize,
    pub entries: Vec<Dialogue>,
}

#[derive(Debug, Serialize)]
pub struct CheckpointResponse {
    pub campaign_id: String,
    pub checkpoint: usize,
    pub turn: u64,
}

#[derive(Debug, Serialize)]
pub struct RewindResponse {
    pub campaign_id: String,
    pub turn: u64,
    pub checkpoint: usize,
    pub removed: usize,
}
