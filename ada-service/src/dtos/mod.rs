pub mod ai_dm;
pub mod auth;
pub mod campaigns;
pub mod characters;
pub mod journals;
pub mod scripts;

use serde::Serialize;

/// Bare acknowledgement body: `{"ok": true}`.
#[derive(Debug, Serialize)]
pub struct OkResponse {
    pub ok: bool,
}

impl OkResponse {
    pub fn new() -> Self {
        Self { ok: true }
    }
}

impl Default for OkResponse {
    fn default() -> Self {
        Self::new()
    }
}
