//! HTTP router construction.
//!
//! Assembles all Axum routes, middleware, and OpenAPI docs into a single `Router`.

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::middleware;
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::api::{chat, doc, flashcards, generate, health, materials};
use crate::rate_limit::rate_limit;
use crate::state::AppState;

/// Room for multipart framing and form fields on top of the file itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// `*` allows any origin; anything else is a single allowed origin.
fn cors_layer(origin: &str) -> CorsLayer {
    if origin.trim() == "*" {
        return CorsLayer::permissive();
    }
    match origin.parse::<HeaderValue>() {
        Ok(value) => CorsLayer::new()
            .allow_origin(value)
            .allow_methods(Any)
            .allow_headers(Any),
        Err(_) => {
            warn!("invalid CORS_ORIGIN '{}', allowing any origin", origin);
            CorsLayer::permissive()
        }
    }
}

/// Build the complete application router with all routes and middleware.
pub fn build_router(state: Arc<AppState>) -> Router {
    let upload_limit = state.config.upload.max_upload_size + MULTIPART_OVERHEAD;

    let api = Router::new()
        .route("/health", get(health::health))
        .route("/generate/completion", post(generate::completion))
        // Flashcards: /generate MUST precede /{id}
        .route("/flashcards/generate", post(flashcards::generate))
        .route(
            "/flashcards",
            get(flashcards::list).post(flashcards::create),
        )
        .route(
            "/flashcards/{id}",
            put(flashcards::update).delete(flashcards::delete),
        )
        .route("/flashcards/{id}/review", post(flashcards::review))
        // Materials
        .route(
            "/materials/upload",
            post(materials::upload).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/materials", get(materials::list))
        .route(
            "/materials/{id}",
            get(materials::get)
                .patch(materials::update)
                .delete(materials::delete),
        )
        .route("/materials/{id}/summarize", post(materials::summarize))
        .route("/materials/{id}/flashcards", post(materials::flashcards))
        // Chat
        .route("/chat/message", post(chat::message))
        .route(
            "/chat/history",
            get(chat::history).delete(chat::clear_history),
        );

    Router::new()
        .route("/", get(health::welcome))
        .nest("/api", api)
        .layer(middleware::from_fn(rate_limit))
        .layer(cors_layer(&state.config.server.cors_origin))
        .with_state(state)
        .merge(Scalar::with_url("/docs", doc::ApiDoc::openapi()))
}
