//! Record lookups with ownership and membership checks.
//!
//! Missing records are 404; records the caller may not touch are 403.

use super::keys;
use super::repository::Repository;
use crate::models::{Campaign, Character, Journal, Script};
use service_core::error::AppError;

pub async fn campaign(repo: &Repository, id: &str) -> Result<Campaign, AppError> {
    repo.load::<Campaign>(&keys::campaign(id))
        .await?
        .ok_or_else(|| AppError::not_found("Campaign not found"))
}

pub async fn campaign_for_member(
    repo: &Repository,
    id: &str,
    username: &str,
) -> Result<Campaign, AppError> {
    let campaign = campaign(repo, id).await?;
    if !campaign.is_member(username) {
        return Err(AppError::forbidden("Not a member of this campaign"));
    }
    Ok(campaign)
}

pub async fn campaign_for_owner(
    repo: &Repository,
    id: &str,
    username: &str,
) -> Result<Campaign, AppError> {
    let campaign = campaign(repo, id).await?;
    if !campaign.is_owner(username) {
        return Err(AppError::forbidden("Only the campaign owner can do that"));
    }
    Ok(campaign)
}

pub async fn character(repo: &Repository, id: &str) -> Result<Character, AppError> {
    repo.load::<Character>(&keys::character(id))
        .await?
        .ok_or_else(|| AppError::not_found("Character not found"))
}

pub async fn character_for_owner(
    repo: &Repository,
    id: &str,
    username: &str,
) -> Result<Character, AppError> {
    let character = character(repo, id).await?;
    if character.owner != username {
        return Err(AppError::forbidden("Not your character"));
    }
    Ok(character)
}

/// The owner may read a character, and so may the owner of the campaign it
/// is linked to.
pub async fn character_for_reader(
    repo: &Repository,
    id: &str,
    username: &str,
) -> Result<Character, AppError> {
    let character = character(repo, id).await?;
    if character.owner == username {
        return Ok(character);
    }
    if let Some(campaign_id) = &character.campaign_id {
        if let Some(campaign) = repo.load::<Campaign>(&keys::campaign(campaign_id)).await? {
            if campaign.is_owner(username) {
                return Ok(character);
            }
        }
    }
    Err(AppError::forbidden("Not your character"))
}

pub async fn journal_for_owner(
    repo: &Repository,
    id: &str,
    username: &str,
) -> Result<Journal, AppError> {
    let journal = repo
        .load::<Journal>(&keys::journal(id))
        .await?
        .ok_or_else(|| AppError::not_found("Journal not found"))?;
    if journal.owner != username {
        return Err(AppError::forbidden("Not your journal"));
    }
    Ok(journal)
}

pub async fn script_for_owner(
    repo: &Repository,
    id: &str,
    username: &str,
) -> Result<Script, AppError> {
    let script = repo
        .load::<Script>(&keys::script(id))
        .await?
        .ok_or_else(|| AppError::not_found("Script not found"))?;
    if script.owner != username {
        return Err(AppError::forbidden("Not your script"));
    }
    Ok(script)
}
