use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use service_core::error::AppError;

use crate::{
    dtos::{
        campaigns::{
            AttachScriptRequest, CampaignDetail, CreateCampaignRequest, DialogueLog,
            LinkCharacterRequest, PostDialogueRequest, SummaryResponse,
        },
        OkResponse,
    },
    middleware::AuthUser,
    models::{Campaign, CampaignMode, Character, Dialogue, DialogueRole, Journal, Script},
    services::{access, chronicle, keys, roster},
    utils::ValidatedJson,
    AppState,
};

pub async fn create_campaign(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidatedJson(req): ValidatedJson<CreateCampaignRequest>,
) -> Result<impl IntoResponse, AppError> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err(AppError::bad_request("Campaign name is required"));
    }
    let description = req
        .description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty());

    let campaign = Campaign::new(&user.username, name.to_string(), description, req.mode);
    state
        .repo
        .save(&keys::campaign(&campaign.id), &campaign)
        .await?;
    state
        .repo
        .index_push(&keys::campaigns_by_user(&user.username), &campaign.id)
        .await?;

    tracing::info!(
        campaign_id = %campaign.id,
        owner = %user.username,
        mode = ?campaign.mode,
        "Campaign created"
    );
    Ok((StatusCode::CREATED, Json(campaign)))
}

pub async fn list_campaigns(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let ids = state
        .repo
        .index(&keys::campaigns_by_user(&user.username))
        .await?;
    let campaigns: Vec<Campaign> = state.repo.load_many(&ids, keys::campaign).await?;
    Ok(Json(campaigns))
}

pub async fn get_campaign(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let campaign = access::campaign_for_member(&state.repo, &id, &user.username).await?;
    let characters: Vec<Character> = state
        .repo
        .load_many(&campaign.character_ids, keys::character)
        .await?;
    Ok(Json(CampaignDetail {
        campaign,
        characters,
    }))
}

pub async fn delete_campaign(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let campaign = access::campaign_for_owner(&state.repo, &id, &user.username).await?;

    let characters: Vec<Character> = state
        .repo
        .load_many(&campaign.character_ids, keys::character)
        .await?;
    for mut character in characters {
        if character.campaign_id.as_deref() == Some(campaign.id.as_str()) {
            character.campaign_id = None;
            character.touch();
            state
                .repo
                .save(&keys::character(&character.id), &character)
                .await?;
        }
    }

    state.sessions.clear(&campaign.id).await?;
    state.repo.remove(&keys::campaign(&campaign.id)).await?;
    state
        .repo
        .index_remove(&keys::campaigns_by_user(&user.username), &campaign.id)
        .await?;

    tracing::info!(campaign_id = %campaign.id, owner = %user.username, "Campaign deleted");
    Ok(Json(OkResponse::new()))
}

pub async fn link_character(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<LinkCharacterRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut campaign = access::campaign(&state.repo, &id).await?;
    let mut character =
        access::character_for_owner(&state.repo, &req.character_id, &user.username).await?;

    roster::link_character(&state.repo, &mut campaign, &mut character, &user.username).await?;

    Ok(Json(campaign))
}

pub async fn unlink_character(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path((id, character_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let mut campaign = access::campaign(&state.repo, &id).await?;
    let mut character = access::character(&state.repo, &character_id).await?;

    if character.owner != user.username && !campaign.is_owner(&user.username) {
        return Err(AppError::forbidden(
            "Only the character or campaign owner can do that",
        ));
    }
    if !campaign.character_ids.iter().any(|cid| cid == &character.id) {
        return Err(AppError::not_found("Character is not in this campaign"));
    }

    roster::unlink_character(&state.repo, &mut campaign, &mut character).await?;
    Ok(Json(OkResponse::new()))
}

pub async fn attach_script(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<AttachScriptRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut campaign = access::campaign_for_owner(&state.repo, &id, &user.username).await?;
    let mut script = access::script_for_owner(&state.repo, &req.script_id, &user.username).await?;

    // Release the script this campaign played before
    if let Some(old_id) = campaign.script_id.as_deref().filter(|old| *old != script.id) {
        if let Some(mut old) = state.repo.load::<Script>(&keys::script(old_id)).await? {
            if old.campaign_id.as_deref() == Some(campaign.id.as_str()) {
                old.campaign_id = None;
                old.updated_at = chrono::Utc::now();
                state.repo.save(&keys::script(&old.id), &old).await?;
            }
        }
    }

    // And the campaign that played this script before
    if let Some(previous_id) = script.campaign_id.as_deref().filter(|prev| *prev != campaign.id) {
        if let Some(mut previous) = state
            .repo
            .load::<Campaign>(&keys::campaign(previous_id))
            .await?
        {
            if previous.script_id.as_deref() == Some(script.id.as_str()) {
                previous.script_id = None;
                previous.touch();
                state
                    .repo
                    .save(&keys::campaign(&previous.id), &previous)
                    .await?;
            }
        }
    }

    campaign.script_id = Some(script.id.clone());
    campaign.touch();
    state
        .repo
        .save(&keys::campaign(&campaign.id), &campaign)
        .await?;

    script.campaign_id = Some(campaign.id.clone());
    script.updated_at = chrono::Utc::now();
    state.repo.save(&keys::script(&script.id), &script).await?;

    tracing::info!(campaign_id = %campaign.id, script_id = %script.id, "Script attached");
    Ok(Json(campaign))
}

pub async fn list_dialogue(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let campaign = access::campaign_for_member(&state.repo, &id, &user.username).await?;
    let view = state.sessions.history(&campaign, usize::MAX).await?;
    Ok(Json(DialogueLog {
        campaign_id: campaign.id,
        entries: view.entries,
    }))
}

/// DM and narrator lines belong to the human DM (the campaign owner). In
/// AI-DM campaigns they come only from the narrator.
fn check_dialogue_role(
    campaign: &Campaign,
    role: DialogueRole,
    username: &str,
) -> Result<(), AppError> {
    if role == DialogueRole::Player {
        return Ok(());
    }
    if campaign.mode == CampaignMode::AiDm {
        return Err(AppError::forbidden(
            "Only the narrator speaks as the DM in AI-DM campaigns",
        ));
    }
    if !campaign.is_owner(username) {
        return Err(AppError::forbidden("Only the campaign owner can post as the DM"));
    }
    Ok(())
}

pub async fn post_dialogue(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<PostDialogueRequest>,
) -> Result<impl IntoResponse, AppError> {
    let campaign = access::campaign_for_member(&state.repo, &id, &user.username).await?;

    let content = req.content.trim();
    if content.is_empty() {
        return Err(AppError::bad_request("Content is required"));
    }

    let role = req.role.unwrap_or(DialogueRole::Player);
    check_dialogue_role(&campaign, role, &user.username)?;

    if let Some(character_id) = &req.character_id {
        let character =
            access::character_for_owner(&state.repo, character_id, &user.username).await?;
        if character.campaign_id.as_deref() != Some(campaign.id.as_str()) {
            return Err(AppError::bad_request("Character is not in this campaign"));
        }
    }

    let speaker = req
        .speaker
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| user.username.clone());

    let entry = Dialogue::new(
        &campaign.id,
        role,
        speaker,
        req.character_id,
        content.to_string(),
        campaign.ai_dm.turn,
    );
    state.sessions.append(&entry).await?;

    Ok((StatusCode::CREATED, Json(entry)))
}

/// Chronicle digest of every member journal filed under the campaign,
/// oldest first.
pub async fn campaign_summary(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let campaign = access::campaign_for_member(&state.repo, &id, &user.username).await?;

    let mut journals: Vec<Journal> = Vec::new();
    for member in &campaign.members {
        let ids = state.repo.index(&keys::journals_by_user(member)).await?;
        let entries: Vec<Journal> = state.repo.load_many(&ids, keys::journal).await?;
        journals.extend(
            entries
                .into_iter()
                .filter(|j| j.campaign_id.as_deref() == Some(campaign.id.as_str())),
        );
    }
    journals.sort_by_key(|j| j.created_at);

    Ok(Json(SummaryResponse {
        summary: chronicle::summarize(&journals),
    }))
}
