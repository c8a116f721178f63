use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use service_core::error::AppError;

use crate::{
    dtos::{
        auth::{CredentialsRequest, LoginResponse, MeResponse},
        OkResponse,
    },
    middleware::AuthUser,
    models::User,
    services::keys,
    utils::{hash_password, verify_password, Password, PasswordHashString, ValidatedJson},
    AppState,
};

const INVALID_CREDENTIALS: &str = "Invalid username or password";

fn credentials(req: CredentialsRequest) -> Result<(String, Password), AppError> {
    let username = req.username.trim().to_string();
    if username.is_empty() || req.password.is_empty() {
        return Err(AppError::bad_request("Username and password are required"));
    }
    Ok((username, Password::new(req.password)))
}

pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CredentialsRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (username, password) = credentials(req)?;
    let key = keys::user(&username);

    if state.repo.get_raw(&key).await?.is_some() {
        return Err(AppError::conflict("Username already exists"));
    }

    let password_hash = hash_password(&password)?;
    let user = User::new(username.clone(), password_hash.into_string());
    state.repo.save(&key, &user).await?;

    tracing::info!(username = %username, "User registered");
    Ok((StatusCode::CREATED, Json(OkResponse::new())))
}

pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CredentialsRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (username, password) = credentials(req)?;

    let user = state
        .repo
        .load::<User>(&keys::user(&username))
        .await?
        .ok_or_else(|| AppError::unauthorized(INVALID_CREDENTIALS))?;

    if verify_password(&password, &PasswordHashString::new(user.password_hash)).is_err() {
        tracing::warn!(username = %username, "Failed login attempt");
        return Err(AppError::unauthorized(INVALID_CREDENTIALS));
    }

    let token = uuid::Uuid::new_v4().to_string();
    state
        .repo
        .put_raw_with_expiry(
            &keys::session(&token),
            username.clone(),
            state.config.session.ttl_seconds,
        )
        .await?;

    tracing::info!(username = %username, "User logged in");
    Ok((
        StatusCode::OK,
        Json(LoginResponse {
            ok: true,
            username,
            token,
        }),
    ))
}

pub async fn logout(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    state.repo.remove(&keys::session(&user.token)).await?;
    tracing::info!(username = %user.username, "User logged out");
    Ok(Json(OkResponse::new()))
}

pub async fn me(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let record = state
        .repo
        .load::<User>(&keys::user(&user.username))
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    let campaigns = state
        .repo
        .index(&keys::campaigns_by_user(&user.username))
        .await?
        .len();
    let characters = state
        .repo
        .index(&keys::characters_by_user(&user.username))
        .await?
        .len();

    Ok(Json(MeResponse {
        username: record.username,
        created_at: record.created_at,
        campaigns,
        characters,
    }))
}
