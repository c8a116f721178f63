//! Key builders for the flat store namespace.

pub fn user(username: &str) -> String {
    format!("user:{}", username)
}

pub fn session(token: &str) -> String {
    format!("session:{}", token)
}

pub fn character(id: &str) -> String {
    format!("character:{}", id)
}

pub fn campaign(id: &str) -> String {
    format!("campaign:{}", id)
}

pub fn journal(id: &str) -> String {
    format!("journal:{}", id)
}

pub fn script(id: &str) -> String {
    format!("script:{}", id)
}

pub fn dialogue(id: &str) -> String {
    format!("dialogue:{}", id)
}

pub fn campaigns_by_user(username: &str) -> String {
    format!("campaignsByUser:{}", username)
}

pub fn characters_by_user(username: &str) -> String {
    format!("charactersByUser:{}", username)
}

pub fn dialogue_by_campaign(campaign_id: &str) -> String {
    format!("dialogueByCampaign:{}", campaign_id)
}

pub fn journals_by_user(username: &str) -> String {
    format!("journalsByUser:{}", username)
}

pub fn scripts_by_user(username: &str) -> String {
    format!("scriptsByUser:{}", username)
}
