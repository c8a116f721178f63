pub mod config;
pub mod dtos;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    middleware::{from_fn, from_fn_with_state},
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use service_core::error::AppError;
use service_core::middleware::{
    metrics::metrics_middleware,
    rate_limit::{create_ip_rate_limiter, ip_rate_limit_middleware, IpRateLimiter},
    security_headers::security_headers_middleware,
    tracing::{http_trace_layer, request_id_middleware},
};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::config::{AdaConfig, StoreBackend};
use crate::services::{KvStore, MemoryStore, Narrator, RedisStore, Repository, SessionService};

#[derive(Clone)]
pub struct AppState {
    pub config: AdaConfig,
    pub repo: Repository,
    pub sessions: SessionService,
    pub login_rate_limiter: IpRateLimiter,
    pub register_rate_limiter: IpRateLimiter,
}

impl AppState {
    pub fn new(config: AdaConfig, store: Arc<dyn KvStore>, narrator: Arc<dyn Narrator>) -> Self {
        let repo = Repository::new(store);
        let sessions = SessionService::new(repo.clone(), narrator, config.ai_dm.history_window);
        let login_rate_limiter = create_ip_rate_limiter(
            config.rate_limit.login_attempts,
            config.rate_limit.login_window_seconds,
        );
        let register_rate_limiter = create_ip_rate_limiter(
            config.rate_limit.register_attempts,
            config.rate_limit.register_window_seconds,
        );

        Self {
            config,
            repo,
            sessions,
            login_rate_limiter,
            register_rate_limiter,
        }
    }
}

/// Opens the store backend selected in configuration.
pub async fn connect_store(config: &AdaConfig) -> Result<Arc<dyn KvStore>, AppError> {
    match config.store.backend {
        StoreBackend::Memory => {
            tracing::info!("Using in-memory store");
            Ok(Arc::new(MemoryStore::new()))
        }
        StoreBackend::Redis => {
            let url = config.store.redis_url.as_ref().ok_or_else(|| {
                AppError::ConfigError(anyhow::anyhow!("REDIS_URL is not configured"))
            })?;
            let store = RedisStore::connect(url).await.map_err(|e| {
                tracing::error!(error = %e, "Failed to connect to Redis");
                AppError::ServiceUnavailable
            })?;
            tracing::info!("Using Redis store");
            Ok(Arc::new(store))
        }
    }
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins = if allowed_origins.iter().any(|o| o == "*") {
        AllowOrigin::mirror_request()
    } else {
        AllowOrigin::list(allowed_origins.iter().filter_map(|o| {
            o.parse::<HeaderValue>()
                .map_err(|e| tracing::error!("Invalid CORS origin '{}': {}", o, e))
                .ok()
        }))
    };

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({ "error": "Not Found" })),
    )
}

pub fn build_router(state: AppState) -> Router {
    let login_route = Router::new()
        .route("/api/login", post(handlers::auth::login))
        .layer(from_fn_with_state(
            state.login_rate_limiter.clone(),
            ip_rate_limit_middleware,
        ));

    let register_route = Router::new()
        .route("/api/register", post(handlers::auth::register))
        .layer(from_fn_with_state(
            state.register_rate_limiter.clone(),
            ip_rate_limit_middleware,
        ));

    let protected = Router::new()
        .route("/api/logout", post(handlers::auth::logout))
        .route("/api/me", get(handlers::auth::me))
        // Characters
        .route(
            "/api/characters",
            get(handlers::characters::list_characters).post(handlers::characters::create_character),
        )
        .route(
            "/api/characters/forge",
            post(handlers::characters::forge_character),
        )
        .route(
            "/api/characters/:id",
            get(handlers::characters::get_character).delete(handlers::characters::delete_character),
        )
        .route(
            "/api/characters/:id/portrait",
            put(handlers::characters::set_portrait),
        )
        .route(
            "/api/characters/:id/summary",
            get(handlers::characters::character_summary),
        )
        // Campaigns
        .route(
            "/api/campaigns",
            get(handlers::campaigns::list_campaigns).post(handlers::campaigns::create_campaign),
        )
        .route(
            "/api/campaigns/:id",
            get(handlers::campaigns::get_campaign).delete(handlers::campaigns::delete_campaign),
        )
        .route(
            "/api/campaigns/:id/characters",
            post(handlers::campaigns::link_character),
        )
        .route(
            "/api/campaigns/:id/characters/:character_id",
            axum::routing::delete(handlers::campaigns::unlink_character),
        )
        .route(
            "/api/campaigns/:id/script",
            put(handlers::campaigns::attach_script),
        )
        .route(
            "/api/campaigns/:id/dialogue",
            get(handlers::campaigns::list_dialogue).post(handlers::campaigns::post_dialogue),
        )
        .route(
            "/api/campaigns/:id/summary",
            get(handlers::campaigns::campaign_summary),
        )
        // Journals
        .route(
            "/api/journals",
            get(handlers::journals::list_journals).post(handlers::journals::create_journal),
        )
        .route(
            "/api/journals/:id",
            get(handlers::journals::get_journal).delete(handlers::journals::delete_journal),
        )
        // Scripts
        .route(
            "/api/scripts",
            get(handlers::scripts::list_scripts).post(handlers::scripts::create_script),
        )
        .route(
            "/api/scripts/:id",
            get(handlers::scripts::get_script)
                .put(handlers::scripts::update_script)
                .delete(handlers::scripts::delete_script),
        )
        // AI-DM
        .route("/api/ai-dm/turn", post(handlers::ai_dm::take_turn))
        .route(
            "/api/ai-dm/:campaign_id/history",
            get(handlers::ai_dm::history),
        )
        .route(
            "/api/ai-dm/:campaign_id/checkpoint",
            post(handlers::ai_dm::checkpoint),
        )
        .route(
            "/api/ai-dm/:campaign_id/rewind",
            post(handlers::ai_dm::rewind),
        )
        .route_layer(from_fn_with_state(
            state.clone(),
            middleware::session_middleware,
        ));

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/metrics", get(handlers::metrics::metrics))
        .route("/api/health", get(handlers::health::api_health))
        .merge(login_route)
        .merge(register_route)
        .merge(protected)
        .fallback(not_found)
        .with_state(state.clone())
        .layer(from_fn(metrics_middleware))
        .layer(http_trace_layer())
        .layer(from_fn(request_id_middleware))
        .layer(from_fn(security_headers_middleware))
        .layer(cors_layer(&state.config.security.allowed_origins))
}
