//! Shared helpers for ada-service integration tests.
//!
//! Each test builds its own router over a fresh in-memory store and drives
//! it in-process with `oneshot`.

#![allow(dead_code)]

use ada_service::{
    build_router,
    config::AdaConfig,
    services::{LocalNarrator, MemoryStore},
    AppState,
};
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::util::ServiceExt;

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

impl TestApp {
    pub fn spawn() -> Self {
        Self::with_config(AdaConfig::local())
    }

    pub fn with_config(config: AdaConfig) -> Self {
        let state = AppState::new(
            config,
            Arc::new(MemoryStore::new()),
            Arc::new(LocalNarrator::new()),
        );
        let router = build_router(state.clone());
        Self { router, state }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let body = match body {
            Some(value) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, value)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(token), Some(body))
            .await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, Some(token), None).await
    }

    /// Registers `username` and returns a session token.
    pub async fn login_as(&self, username: &str) -> String {
        let credentials = json!({ "username": username, "password": "correct horse" });

        let (status, _) = self
            .request(Method::POST, "/api/register", None, Some(credentials.clone()))
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = self
            .request(Method::POST, "/api/login", None, Some(credentials))
            .await;
        assert_eq!(status, StatusCode::OK);
        body["token"].as_str().unwrap().to_string()
    }

    pub async fn create_campaign(&self, token: &str, name: &str, mode: &str) -> String {
        let (status, body) = self
            .post(
                "/api/campaigns",
                token,
                json!({ "name": name, "mode": mode }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_str().unwrap().to_string()
    }

    pub async fn forge(&self, token: &str, narrative: &str) -> Value {
        let (status, body) = self
            .post(
                "/api/characters/forge",
                token,
                json!({ "narrative": narrative }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        body
    }
}
