use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use service_core::error::AppError;
use validator::{ValidationError, ValidationErrors};

use crate::{
    dtos::ai_dm::{
        CheckpointResponse, HistoryQuery, HistoryResponse, RewindResponse, TurnRequest,
        TurnResponse,
    },
    middleware::AuthUser,
    models::{Campaign, CampaignMode},
    services::access,
    utils::{ValidatedJson, ValidatedQuery},
    AppState,
};

fn action_too_long(max: usize) -> AppError {
    let mut error = ValidationError::new("length");
    error.message = Some(format!("Action must be at most {} characters", max).into());
    let mut errors = ValidationErrors::new();
    errors.add("action", error);
    AppError::ValidationError(errors)
}

fn require_ai_dm(campaign: &Campaign) -> Result<(), AppError> {
    if campaign.mode != CampaignMode::AiDm {
        return Err(AppError::bad_request("Campaign is not in AI-DM mode"));
    }
    Ok(())
}

pub async fn take_turn(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidatedJson(req): ValidatedJson<TurnRequest>,
) -> Result<impl IntoResponse, AppError> {
    let action = req.action.trim();
    if action.is_empty() {
        return Err(AppError::bad_request("Action is required"));
    }
    let max = state.config.ai_dm.max_action_length;
    if action.chars().count() > max {
        return Err(action_too_long(max));
    }

    let mut campaign = access::campaign(&state.repo, &req.campaign_id).await?;
    require_ai_dm(&campaign)?;
    if !campaign.is_member(&user.username) {
        return Err(AppError::forbidden("Not a member of this campaign"));
    }

    let actor = match &req.character_id {
        Some(character_id) => {
            let character =
                access::character_for_owner(&state.repo, character_id, &user.username).await?;
            if character.campaign_id.as_deref() != Some(campaign.id.as_str()) {
                return Err(AppError::bad_request("Character is not in this campaign"));
            }
            character.sheet.name
        }
        None => user.username.clone(),
    };

    let outcome = state
        .sessions
        .take_turn(&mut campaign, actor, req.character_id, action.to_string())
        .await?;

    Ok(Json(TurnResponse {
        turn: outcome.turn,
        narration: outcome.narration,
        player: outcome.player,
        dm: outcome.dm,
    }))
}

pub async fn history(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(campaign_id): Path<String>,
    ValidatedQuery(query): ValidatedQuery<HistoryQuery>,
) -> Result<impl IntoResponse, AppError> {
    let campaign = access::campaign_for_member(&state.repo, &campaign_id, &user.username).await?;
    let limit = query
        .limit
        .unwrap_or_else(|| state.sessions.history_window());

    let view = state.sessions.history(&campaign, limit).await?;
    Ok(Json(HistoryResponse {
        campaign_id: campaign.id,
        turn: view.turn,
        checkpoint: view.checkpoint,
        total: view.total,
        entries: view.entries,
    }))
}

pub async fn checkpoint(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(campaign_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let mut campaign =
        access::campaign_for_owner(&state.repo, &campaign_id, &user.username).await?;
    require_ai_dm(&campaign)?;

    state.sessions.checkpoint(&mut campaign).await?;

    Ok(Json(CheckpointResponse {
        campaign_id: campaign.id,
        checkpoint: campaign.ai_dm.checkpoint,
        turn: campaign.ai_dm.turn,
    }))
}

pub async fn rewind(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(campaign_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let mut campaign =
        access::campaign_for_owner(&state.repo, &campaign_id, &user.username).await?;
    require_ai_dm(&campaign)?;

    let removed = state.sessions.rewind(&mut campaign).await?;

    Ok(Json(RewindResponse {
        campaign_id: campaign.id,
        turn: campaign.ai_dm.turn,
        checkpoint: campaign.ai_dm.checkpoint,
        removed,
    }))
}
