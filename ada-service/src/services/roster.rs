//! Linking characters into campaigns.
//!
//! Each step is its own write; a failure part way leaves earlier writes in
//! place.

use super::keys;
use super::repository::Repository;
use crate::models::{Campaign, Character};
use service_core::error::AppError;

/// Links `character` into `campaign` and makes `username` a member.
pub async fn link_character(
    repo: &Repository,
    campaign: &mut Campaign,
    character: &mut Character,
    username: &str,
) -> Result<(), AppError> {
    match &character.campaign_id {
        Some(existing) if existing != &campaign.id => {
            return Err(AppError::conflict("Character already belongs to another campaign"));
        }
        _ => {}
    }

    if !campaign.character_ids.iter().any(|id| id == &character.id) {
        campaign.character_ids.push(character.id.clone());
    }
    campaign.add_member(username);
    campaign.touch();
    repo.save(&keys::campaign(&campaign.id), campaign).await?;

    character.campaign_id = Some(campaign.id.clone());
    character.touch();
    repo.save(&keys::character(&character.id), character).await?;

    repo.index_push(&keys::campaigns_by_user(username), &campaign.id)
        .await?;

    tracing::info!(
        campaign_id = %campaign.id,
        character_id = %character.id,
        username,
        "Character linked to campaign"
    );
    Ok(())
}

/// Removes the link both ways. Membership is kept.
pub async fn unlink_character(
    repo: &Repository,
    campaign: &mut Campaign,
    character: &mut Character,
) -> Result<(), AppError> {
    campaign.character_ids.retain(|id| id != &character.id);
    campaign.touch();
    repo.save(&keys::campaign(&campaign.id), campaign).await?;

    if character.campaign_id.as_deref() == Some(campaign.id.as_str()) {
        character.campaign_id = None;
        character.touch();
        repo.save(&keys::character(&character.id), character).await?;
    }

    tracing::info!(
        campaign_id = %campaign.id,
        character_id = %character.id,
        "Character unlinked from campaign"
    );
    Ok(())
}
