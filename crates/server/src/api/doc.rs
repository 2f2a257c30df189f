//! OpenAPI documentation aggregator.
//!
//! Collects all `#[utoipa::path]`-annotated handlers and `ToSchema`-derived
//! types into a single OpenAPI 3.1 document, served via Scalar UI at `/docs`.

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "StudyBot API",
        version = "0.1.0",
        description = "Personal study assistant: flashcards, material summaries and grounded chat.",
    ),
    tags(
        (name = "Health", description = "Welcome and server health"),
        (name = "Generate", description = "Free-form text completion"),
        (name = "Flashcards", description = "Flashcard generation, CRUD and reviews"),
        (name = "Materials", description = "Material upload, text extraction, summaries and flashcards"),
        (name = "Chat", description = "Questions answered from the user's materials"),
    ),
    paths(
        // Health
        crate::api::health::welcome,
        crate::api::health::health,
        // Generate
        crate::api::generate::completion,
        // Flashcards
        crate::api::flashcards::generate,
        crate::api::flashcards::create,
        crate::api::flashcards::list,
        crate::api::flashcards::update,
        crate::api::flashcards::delete,
        crate::api::flashcards::review,
        // Materials
        crate::api::materials::upload,
        crate::api::materials::list,
        crate::api::materials::get,
        crate::api::materials::update,
        crate::api::materials::delete,
        crate::api::materials::summarize,
        crate::api::materials::flashcards,
        // Chat
        crate::api::chat::message,
        crate::api::chat::history,
        crate::api::chat::clear_history,
    ),
    components(schemas(
        crate::error::ErrorResponse,
        crate::api::MessageResponse,
        crate::api::health::HealthResponse,
        crate::api::generate::CompletionRequest,
        crate::api::generate::CompletionResponse,
        crate::api::flashcards::GenerateFlashcardsRequest,
        crate::api::flashcards::GeneratedFlashcards,
        crate::api::materials::MaterialList,
        crate::api::materials::SummarizeRequest,
        crate::api::materials::SummaryResponse,
        crate::api::materials::MaterialFlashcardsRequest,
        crate::api::chat::ChatRequest,
        crate::api::chat::ChatHistory,
        crate::api::chat::ClearedHistory,
    ))
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_route_is_documented() {
        let doc = ApiDoc::openapi();
        for path in [
            "/",
            "/api/health",
            "/api/generate/completion",
            "/api/flashcards",
            "/api/flashcards/generate",
            "/api/flashcards/{id}",
            "/api/flashcards/{id}/review",
            "/api/materials",
            "/api/materials/upload",
            "/api/materials/{id}",
            "/api/materials/{id}/summarize",
            "/api/materials/{id}/flashcards",
            "/api/chat/message",
            "/api/chat/history",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
