//! HTTP surface for the study assistant: flashcards, materials and chat over
//! the generation gateway and the record store.

pub mod api;
pub mod auth;
pub mod error;
pub mod rate_limit;
pub mod router;
pub mod state;

pub use router::build_router;
pub use state::AppState;
