//! Welcome and health endpoints.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

use super::MessageResponse;

#[derive(Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub default_provider: String,
    /// Providers with usable credentials.
    pub providers: Vec<String>,
}

/// Welcome message
#[utoipa::path(
    get,
    path = "/",
    tag = "Health",
    responses((status = 200, description = "Welcome message", body = MessageResponse))
)]
pub async fn welcome() -> Json<MessageResponse> {
    Json(MessageResponse::new("Welcome to the StudyBot API"))
}

/// Server health
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "Health",
    responses((status = 200, description = "Server is up", body = HealthResponse))
)]
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: "StudyBot API",
        version: env!("CARGO_PKG_VERSION"),
        default_provider: state.gateway.default_provider().to_string(),
        providers: state
            .gateway
            .available()
            .into_iter()
            .map(|p| p.to_string())
            .collect(),
    })
}
