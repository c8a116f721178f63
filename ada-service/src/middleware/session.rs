use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};
use service_core::error::AppError;

use crate::{services::keys, AppState};

/// The logged-in caller, resolved from the bearer token.
#[derive(Debug, Clone)]
pub struct SessionUser {
    pub username: String,
    pub token: String,
}

fn bearer_token(req: &Request) -> Option<&str> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Rejects requests without a live session token.
pub async fn session_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(&req)
        .ok_or_else(|| AppError::unauthorized("Missing or invalid Authorization header"))?
        .to_string();

    let username = state
        .repo
        .get_raw(&keys::session(&token))
        .await?
        .ok_or_else(|| AppError::unauthorized("Invalid or expired session"))?;

    tracing::Span::current().record("user", username.as_str());

    req.extensions_mut().insert(SessionUser { username, token });

    Ok(next.run(req).await)
}

/// Extractor for the session placed by [`session_middleware`].
pub struct AuthUser(pub SessionUser);

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<SessionUser>()
            .ok_or_else(|| AppError::unauthorized("Not logged in"))?;

        Ok(AuthUser(user.clone()))
    }
}
