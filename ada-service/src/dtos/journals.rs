use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateJournalRequest {
    #[serde(default)]
    #[validate(length(max = 20000, message = "Notes must be at most 20000 characters"))]
    pub notes: String,

    #[validate(range(min = 1))]
    pub session_number: Option<u32>,

    pub campaign_id: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct JournalFilter {
    pub campaign_id: Option<String>,
}
