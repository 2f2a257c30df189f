pub mod chat;
pub mod doc;
pub mod flashcards;
pub mod generate;
pub mod health;
pub mod materials;

use serde::de::DeserializeOwned;
use serde::Serialize;
use studybot_core::{from_record, Record, StudyError};
use studybot_storage::Collection;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Serialize, utoipa::ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Most flashcards or summary points one request may ask for.
pub const MAX_ITEMS: usize = 50;

pub(crate) fn default_count() -> usize {
    5
}

/// Reject a requested item count outside `1..=MAX_ITEMS`.
pub(crate) fn check_item_count(field: &str, value: usize) -> Result<(), ApiError> {
    if (1..=MAX_ITEMS).contains(&value) {
        Ok(())
    } else {
        Err(ApiError::BadRequest(format!(
            "{field} must be between 1 and {MAX_ITEMS}, got {value}"
        )))
    }
}

/// Load one of the user's records and decode it, or 404 as `kind`.
pub(crate) async fn fetch<T: DeserializeOwned>(
    state: &AppState,
    collection: Collection,
    kind: &'static str,
    user_id: &str,
    id: &str,
) -> Result<T, ApiError> {
    let record = state
        .store
        .get(collection, user_id, id)
        .await?
        .ok_or_else(|| StudyError::not_found(kind, id))?;
    Ok(from_record(record)?)
}

pub(crate) fn decode_all<T: DeserializeOwned>(records: Vec<Record>) -> Result<Vec<T>, ApiError> {
    records
        .into_iter()
        .map(|r| from_record(r).map_err(ApiError::from))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_count_bounds() {
        assert!(check_item_count("count", 1).is_ok());
        assert!(check_item_count("count", MAX_ITEMS).is_ok());
        assert!(check_item_count("count", 0).is_err());
        assert!(check_item_count("num_points", MAX_ITEMS + 1).is_err());
    }
}
