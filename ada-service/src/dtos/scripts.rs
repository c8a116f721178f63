use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateScriptRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    #[serde(default)]
    #[validate(length(max = 50000))]
    pub body: String,

    pub campaign_id: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateScriptRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: Option<String>,

    #[validate(length(max = 50000))]
    pub body: Option<String>,
}
