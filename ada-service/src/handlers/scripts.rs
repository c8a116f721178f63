use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use service_core::error::AppError;

use crate::{
    dtos::{
        scripts::{CreateScriptRequest, UpdateScriptRequest},
        OkResponse,
    },
    middleware::AuthUser,
    models::{Campaign, Script},
    services::{access, keys},
    utils::ValidatedJson,
    AppState,
};

pub async fn create_script(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidatedJson(req): ValidatedJson<CreateScriptRequest>,
) -> Result<impl IntoResponse, AppError> {
    let title = req.title.trim();
    if title.is_empty() {
        return Err(AppError::bad_request("Title is required"));
    }

    if let Some(campaign_id) = &req.campaign_id {
        access::campaign_for_owner(&state.repo, campaign_id, &user.username).await?;
    }

    let script = Script::new(&user.username, title.to_string(), req.body, req.campaign_id);
    state.repo.save(&keys::script(&script.id), &script).await?;
    state
        .repo
        .index_push(&keys::scripts_by_user(&user.username), &script.id)
        .await?;

    tracing::info!(script_id = %script.id, owner = %user.username, "Script created");
    Ok((StatusCode::CREATED, Json(script)))
}

pub async fn list_scripts(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let ids = state
        .repo
        .index(&keys::scripts_by_user(&user.username))
        .await?;
    let scripts: Vec<Script> = state.repo.load_many(&ids, keys::script).await?;
    Ok(Json(scripts))
}

pub async fn get_script(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let script = access::script_for_owner(&state.repo, &id, &user.username).await?;
    Ok(Json(script))
}

pub async fn update_script(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateScriptRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut script = access::script_for_owner(&state.repo, &id, &user.username).await?;

    if let Some(title) = req.title {
        let title = title.trim();
        if title.is_empty() {
            return Err(AppError::bad_request("Title is required"));
        }
        script.title = title.to_string();
    }
    if let Some(body) = req.body {
        script.body = body;
    }
    script.updated_at = Utc::now();
    state.repo.save(&keys::script(&script.id), &script).await?;

    Ok(Json(script))
}

pub async fn delete_script(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let script = access::script_for_owner(&state.repo, &id, &user.username).await?;

    // Detach from the campaign that plays it
    if let Some(campaign_id) = &script.campaign_id {
        if let Some(mut campaign) = state
            .repo
            .load::<Campaign>(&keys::campaign(campaign_id))
            .await?
        {
            if campaign.script_id.as_deref() == Some(script.id.as_str()) {
                campaign.script_id = None;
                campaign.touch();
                state
                    .repo
                    .save(&keys::campaign(&campaign.id), &campaign)
                    .await?;
            }
        }
    }

    state.repo.remove(&keys::script(&script.id)).await?;
    state
        .repo
        .index_remove(&keys::scripts_by_user(&user.username), &script.id)
        .await?;

    tracing::info!(script_id = %script.id, owner = %user.username, "Script deleted");
    Ok(Json(OkResponse::new()))
}
