use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Register and login share one body. Missing fields deserialize as empty
/// so the handler can answer with a single 400.
#[derive(Debug, Deserialize, Validate)]
pub struct CredentialsRequest {
    #[serde(default)]
    #[validate(length(max = 64, message = "Username must be at most 64 characters"))]
    pub username: String,

    #[serde(default)]
    #[validate(length(max = 256, message = "Password must be at most 256 characters"))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub ok: bool,
    pub username: String,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub username: String,
    pub created_at: DateTime<Utc>,
    pub campaigns: usize,
    pub characters: usize,
}
