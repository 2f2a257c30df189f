use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use studybot_core::Record;

use crate::error::StorageError;

/// Named record collections. Every record is owned by exactly one user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Flashcards,
    Materials,
    ChatMessages,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Flashcards => "flashcards",
            Collection::Materials => "materials",
            Collection::ChatMessages => "chat_messages",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Document store scoped by collection and user.
///
/// Records are JSON objects keyed by their `id` field. Lookups never cross
/// users: a record owned by someone else behaves exactly like a missing one.
#[async_trait]
pub trait Store: Send + Sync {
    /// Insert or replace a record. Keeps a caller-supplied `id`, otherwise
    /// assigns a fresh UUID; always stamps `user_id`. Returns the stored record.
    async fn put(
        &self,
        collection: Collection,
        user_id: &str,
        record: Record,
    ) -> Result<Record, StorageError>;

    /// All of the user's records in insertion order.
    async fn list(&self, collection: Collection, user_id: &str)
        -> Result<Vec<Record>, StorageError>;

    async fn get(
        &self,
        collection: Collection,
        user_id: &str,
        id: &str,
    ) -> Result<Option<Record>, StorageError>;

    /// Shallow-merge `partial` into an existing record and set `updated_at`.
    /// `id` and `user_id` cannot be changed this way.
    async fn update(
        &self,
        collection: Collection,
        user_id: &str,
        id: &str,
        partial: Record,
    ) -> Result<Option<Record>, StorageError>;

    async fn delete(
        &self,
        collection: Collection,
        user_id: &str,
        id: &str,
    ) -> Result<bool, StorageError>;

    /// Remove all of the user's records in a collection; returns how many.
    async fn clear(&self, collection: Collection, user_id: &str) -> Result<usize, StorageError>;
}
