use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use metrics::counter;
use service_core::error::AppError;

use crate::{
    dtos::{
        campaigns::SummaryResponse,
        characters::{CreateCharacterRequest, ForgeRequest, PortraitRequest},
        OkResponse,
    },
    middleware::AuthUser,
    models::{Campaign, Character},
    services::{
        access,
        forge::{forge, ForgeOverrides},
        keys, roster, rules,
    },
    utils::ValidatedJson,
    AppState,
};

async fn persist_new(state: &AppState, character: &Character) -> Result<(), AppError> {
    state
        .repo
        .save(&keys::character(&character.id), character)
        .await?;
    state
        .repo
        .index_push(&keys::characters_by_user(&character.owner), &character.id)
        .await?;
    Ok(())
}

pub async fn forge_character(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidatedJson(req): ValidatedJson<ForgeRequest>,
) -> Result<impl IntoResponse, AppError> {
    let narrative = req.narrative.trim();
    if narrative.is_empty() {
        return Err(AppError::bad_request("Narrative is required"));
    }

    // Resolve the campaign before writing anything
    let mut campaign = match &req.campaign_id {
        Some(id) => Some(access::campaign(&state.repo, id).await?),
        None => None,
    };

    let overrides = ForgeOverrides {
        name: req.name.clone(),
        level: req.level,
    };
    let sheet = forge(narrative, &overrides);
    let mut character = Character::new(&user.username, sheet, Some(narrative.to_string()));
    persist_new(&state, &character).await?;

    if let Some(campaign) = campaign.as_mut() {
        roster::link_character(&state.repo, campaign, &mut character, &user.username).await?;
    }

    counter!("ada_characters_forged_total").increment(1);
    tracing::info!(
        character_id = %character.id,
        owner = %user.username,
        race = %character.sheet.race,
        class = %character.sheet.character_class,
        level = character.sheet.level,
        "Character forged"
    );

    Ok((StatusCode::CREATED, Json(character)))
}

pub async fn create_character(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidatedJson(req): ValidatedJson<CreateCharacterRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (mut sheet, narrative) = req.into_parts();
    if sheet.name.is_empty() {
        return Err(AppError::bad_request("Name is required"));
    }
    rules::apply_game_rules(&mut sheet);

    let character = Character::new(&user.username, sheet, narrative);
    persist_new(&state, &character).await?;

    tracing::info!(character_id = %character.id, owner = %user.username, "Character created");
    Ok((StatusCode::CREATED, Json(character)))
}

pub async fn list_characters(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let ids = state
        .repo
        .index(&keys::characters_by_user(&user.username))
        .await?;
    let characters: Vec<Character> = state.repo.load_many(&ids, keys::character).await?;
    Ok(Json(characters))
}

pub async fn get_character(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let character = access::character_for_reader(&state.repo, &id, &user.username).await?;
    Ok(Json(character))
}

pub async fn delete_character(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let character = access::character_for_owner(&state.repo, &id, &user.username).await?;

    if let Some(campaign_id) = &character.campaign_id {
        if let Some(mut campaign) = state
            .repo
            .load::<Campaign>(&keys::campaign(campaign_id))
            .await?
        {
            campaign.character_ids.retain(|cid| cid != &character.id);
            campaign.touch();
            state
                .repo
                .save(&keys::campaign(&campaign.id), &campaign)
                .await?;
        }
    }

    state.repo.remove(&keys::character(&character.id)).await?;
    state
        .repo
        .index_remove(&keys::characters_by_user(&user.username), &character.id)
        .await?;

    tracing::info!(character_id = %character.id, owner = %user.username, "Character deleted");
    Ok(Json(OkResponse::new()))
}

pub async fn set_portrait(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<PortraitRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut character = access::character_for_owner(&state.repo, &id, &user.username).await?;
    character.portrait_url = Some(req.portrait_url);
    character.touch();
    state
        .repo
        .save(&keys::character(&character.id), &character)
        .await?;
    Ok(Json(character))
}

pub async fn character_summary(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let character = access::character_for_reader(&state.repo, &id, &user.username).await?;
    Ok(Json(SummaryResponse {
        summary: character.sheet.summary(),
    }))
}
