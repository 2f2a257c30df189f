//! In-process [`Store`] backed by a lock-guarded map. Contents are lost on
//! restart.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use indexmap::IndexMap;
use serde_json::Value;
use studybot_core::Record;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::StorageError;
use crate::store::{Collection, Store};

type Bucket = IndexMap<String, Record>;

#[derive(Default)]
pub struct MemoryStore {
    buckets: RwLock<HashMap<(Collection, String), Bucket>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn key(collection: Collection, user_id: &str) -> (Collection, String) {
    (collection, user_id.to_string())
}

fn record_id(record: &Record) -> Result<Option<String>, StorageError> {
    match record.get("id") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(id)) if !id.is_empty() => Ok(Some(id.clone())),
        Some(other) => Err(StorageError::InvalidRecord(format!(
            "id must be a non-empty string, got {other}"
        ))),
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn put(
        &self,
        collection: Collection,
        user_id: &str,
        mut record: Record,
    ) -> Result<Record, StorageError> {
        let id = match record_id(&record)? {
            Some(id) => id,
            None => uuid::Uuid::new_v4().to_string(),
        };
        record.insert("id".into(), Value::String(id.clone()));
        record.insert("user_id".into(), Value::String(user_id.to_string()));

        let mut buckets = self.buckets.write().await;
        buckets
            .entry(key(collection, user_id))
            .or_default()
            .insert(id.clone(), record.clone());
        debug!("stored {collection}/{id} for {user_id}");
        Ok(record)
    }

    async fn list(
        &self,
        collection: Collection,
        user_id: &str,
    ) -> Result<Vec<Record>, StorageError> {
        let buckets = self.buckets.read().await;
        Ok(buckets
            .get(&key(collection, user_id))
            .map(|bucket| bucket.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn get(
        &self,
        collection: Collection,
        user_id: &str,
        id: &str,
    ) -> Result<Option<Record>, StorageError> {
        let buckets = self.buckets.read().await;
        Ok(buckets
            .get(&key(collection, user_id))
            .and_then(|bucket| bucket.get(id))
            .cloned())
    }

    async fn update(
        &self,
        collection: Collection,
        user_id: &str,
        id: &str,
        partial: Record,
    ) -> Result<Option<Record>, StorageError> {
        let now = serde_json::to_value(Utc::now())?;
        let mut buckets = self.buckets.write().await;
        let Some(record) = buckets
            .get_mut(&key(collection, user_id))
            .and_then(|bucket| bucket.get_mut(id))
        else {
            return Ok(None);
        };

        for (field, value) in partial {
            if field != "id" && field != "user_id" {
                record.insert(field, value);
            }
        }
        record.insert("updated_at".into(), now);
        Ok(Some(record.clone()))
    }

    async fn delete(
        &self,
        collection: Collection,
        user_id: &str,
        id: &str,
    ) -> Result<bool, StorageError> {
        let mut buckets = self.buckets.write().await;
        let removed = buckets
            .get_mut(&key(collection, user_id))
            .and_then(|bucket| bucket.shift_remove(id))
            .is_some();
        if removed {
            debug!("deleted {collection}/{id} for {user_id}");
        }
        Ok(removed)
    }

    async fn clear(&self, collection: Collection, user_id: &str) -> Result<usize, StorageError> {
        let mut buckets = self.buckets.write().await;
        let removed = buckets
            .remove(&key(collection, user_id))
            .map_or(0, |bucket| bucket.len());
        debug!("cleared {removed} {collection} records for {user_id}");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rec(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[tokio::test]
    async fn put_assigns_id_and_owner() {
        let store = MemoryStore::new();
        let stored = store
            .put(Collection::Flashcards, "alice", rec(json!({"question": "Q"})))
            .await
            .unwrap();

        let id = stored["id"].as_str().unwrap();
        assert!(uuid::Uuid::parse_str(id).is_ok());
        assert_eq!(stored["user_id"], "alice");
        assert_eq!(stored["question"], "Q");

        let fetched = store.get(Collection::Flashcards, "alice", id).await.unwrap();
        assert_eq!(fetched, Some(stored));
    }

    #[tokio::test]
    async fn put_keeps_supplied_id_and_replaces() {
        let store = MemoryStore::new();
        store
            .put(Collection::Materials, "alice", rec(json!({"id": "m1", "title": "old"})))
            .await
            .unwrap();
        store
            .put(Collection::Materials, "alice", rec(json!({"id": "m1", "title": "new"})))
            .await
            .unwrap();

        let all = store.list(Collection::Materials, "alice").await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0]["title"], "new");
    }

    #[tokio::test]
    async fn non_string_id_is_rejected() {
        let store = MemoryStore::new();
        let err = store
            .put(Collection::Materials, "alice", rec(json!({"id": 7})))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::InvalidRecord(_)));
    }

    #[tokio::test]
    async fn list_preserves_insertion_order_after_delete() {
        let store = MemoryStore::new();
        for id in ["a", "b", "c"] {
            store
                .put(Collection::ChatMessages, "u", rec(json!({"id": id})))
                .await
                .unwrap();
        }
        assert!(store.delete(Collection::ChatMessages, "u", "b").await.unwrap());
        assert!(!store.delete(Collection::ChatMessages, "u", "b").await.unwrap());

        let ids: Vec<_> = store
            .list(Collection::ChatMessages, "u")
            .await
            .unwrap()
            .into_iter()
            .map(|r| r["id"].clone())
            .collect();
        assert_eq!(ids, vec![json!("a"), json!("c")]);
    }

    #[tokio::test]
    async fn update_merges_shallowly() {
        let store = MemoryStore::new();
        let stored = store
            .put(
                Collection::Materials,
                "alice",
                rec(json!({"title": "T", "metadata": {"a": 1}, "size": 3})),
            )
            .await
            .unwrap();
        let id = stored["id"].as_str().unwrap();

        let updated = store
            .update(
                Collection::Materials,
                "alice",
                id,
                rec(json!({"metadata": {"b": 2}, "id": "hijack", "user_id": "mallory"})),
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated["metadata"], json!({"b": 2}));
        assert_eq!(updated["title"], "T");
        assert_eq!(updated["id"], id);
        assert_eq!(updated["user_id"], "alice");
        assert!(updated["updated_at"].is_string());
    }

    #[tokio::test]
    async fn other_users_records_are_invisible() {
        let store = MemoryStore::new();
        let stored = store
            .put(Collection::Flashcards, "alice", rec(json!({"question": "Q"})))
            .await
            .unwrap();
        let id = stored["id"].as_str().unwrap();

        assert!(store.get(Collection::Flashcards, "bob", id).await.unwrap().is_none());
        assert!(store
            .update(Collection::Flashcards, "bob", id, Record::new())
            .await
            .unwrap()
            .is_none());
        assert!(!store.delete(Collection::Flashcards, "bob", id).await.unwrap());
        assert!(store.list(Collection::Flashcards, "bob").await.unwrap().is_empty());
        assert!(store.get(Collection::Flashcards, "alice", id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn collections_are_separate() {
        let store = MemoryStore::new();
        store
            .put(Collection::Flashcards, "u", rec(json!({"id": "x"})))
            .await
            .unwrap();
        assert!(store.get(Collection::Materials, "u", "x").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn clear_counts_removed() {
        let store = MemoryStore::new();
        for _ in 0..3 {
            store
                .put(Collection::ChatMessages, "u", Record::new())
                .await
                .unwrap();
        }
        store
            .put(Collection::ChatMessages, "other", Record::new())
            .await
            .unwrap();

        assert_eq!(store.clear(Collection::ChatMessages, "u").await.unwrap(), 3);
        assert_eq!(store.clear(Collection::ChatMessages, "u").await.unwrap(), 0);
        assert_eq!(store.list(Collection::ChatMessages, "other").await.unwrap().len(), 1);
    }
}
