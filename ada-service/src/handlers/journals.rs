use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use service_core::error::AppError;

use crate::{
    dtos::{
        journals::{CreateJournalRequest, JournalFilter},
        OkResponse,
    },
    middleware::AuthUser,
    models::Journal,
    services::{access, chronicle, keys},
    utils::{ValidatedJson, ValidatedQuery},
    AppState,
};

pub async fn create_journal(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidatedJson(req): ValidatedJson<CreateJournalRequest>,
) -> Result<impl IntoResponse, AppError> {
    let notes = req.notes.trim();
    if notes.is_empty() {
        return Err(AppError::bad_request("Notes are required"));
    }

    if let Some(campaign_id) = &req.campaign_id {
        access::campaign_for_member(&state.repo, campaign_id, &user.username).await?;
    }

    let parsed = chronicle::parse_notes(notes, req.session_number);
    let journal = Journal::new(
        &user.username,
        req.campaign_id,
        req.session_number,
        parsed,
        notes.to_string(),
    );
    state
        .repo
        .save(&keys::journal(&journal.id), &journal)
        .await?;
    state
        .repo
        .index_push(&keys::journals_by_user(&user.username), &journal.id)
        .await?;

    tracing::info!(
        journal_id = %journal.id,
        owner = %user.username,
        characters = journal.characters.len(),
        key_events = journal.key_events.len(),
        "Journal entry recorded"
    );
    Ok((StatusCode::CREATED, Json(journal)))
}

pub async fn list_journals(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidatedQuery(filter): ValidatedQuery<JournalFilter>,
) -> Result<impl IntoResponse, AppError> {
    let ids = state
        .repo
        .index(&keys::journals_by_user(&user.username))
        .await?;
    let mut journals: Vec<Journal> = state.repo.load_many(&ids, keys::journal).await?;

    if let Some(campaign_id) = filter.campaign_id.as_deref() {
        journals.retain(|j| j.campaign_id.as_deref() == Some(campaign_id));
    }
    Ok(Json(journals))
}

pub async fn get_journal(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let journal = access::journal_for_owner(&state.repo, &id, &user.username).await?;
    Ok(Json(journal))
}

pub async fn delete_journal(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let journal = access::journal_for_owner(&state.repo, &id, &user.username).await?;
    state.repo.remove(&keys::journal(&journal.id)).await?;
    state
        .repo
        .index_remove(&keys::journals_by_user(&user.username), &journal.id)
        .await?;
    Ok(Json(OkResponse::new()))
}
