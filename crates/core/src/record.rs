//! Persisted study records and their conversion to and from opaque store records.
//!
//! The storage collaborator only sees JSON objects; these typed views are what
//! the route layer works with.

use chrono::{DateTime, Utc};
use indexmap::IndexSet;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::StudyError;

/// An opaque key/value record as held by the store.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// Free-form tags: set semantics, insertion order kept for display.
pub type Tags = IndexSet<String>;

/// Serialize a typed value into a store record. Fails if it is not a JSON object.
pub fn to_record<T: Serialize>(value: &T) -> Result<Record, StudyError> {
    match serde_json::to_value(value)? {
        serde_json::Value::Object(map) => Ok(map),
        other => Err(StudyError::InvalidInput(format!(
            "expected an object record, got {other}"
        ))),
    }
}

/// Deserialize a store record into its typed view.
pub fn from_record<T: DeserializeOwned>(record: Record) -> Result<T, StudyError> {
    Ok(serde_json::from_value(serde_json::Value::Object(record))?)
}

// ── Flashcards ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Flashcard {
    pub id: String,
    pub user_id: String,
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub tags: Tags,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub review_count: u32,
    #[serde(default)]
    pub last_reviewed: Option<DateTime<Utc>>,
}

/// Fields supplied when creating or replacing a flashcard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewFlashcard {
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub tags: Tags,
}

impl NewFlashcard {
    /// Record for a fresh card: unreviewed, never updated.
    pub fn into_record(self, now: DateTime<Utc>) -> Result<Record, StudyError> {
        let mut record = to_record(&self)?;
        record.insert("created_at".into(), serde_json::to_value(now)?);
        record.insert("updated_at".into(), serde_json::Value::Null);
        record.insert("review_count".into(), 0.into());
        record.insert("last_reviewed".into(), serde_json::Value::Null);
        Ok(record)
    }
}

// ── Materials ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Material {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub filename: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub text_content: String,
    #[serde(default)]
    pub metadata: Record,
    #[serde(default)]
    pub tags: Tags,
    pub uploaded_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMaterial {
    pub title: String,
    pub filename: String,
    pub description: String,
    pub content_type: Option<String>,
    pub size: u64,
    pub text_content: String,
    pub metadata: Record,
    pub tags: Tags,
}

impl NewMaterial {
    pub fn into_record(self, now: DateTime<Utc>) -> Result<Record, StudyError> {
        let mut record = to_record(&self)?;
        record.insert("uploaded_at".into(), serde_json::to_value(now)?);
        Ok(record)
    }
}

/// Partial material update; absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MaterialUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Tags>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Record>,
}

// ── Chat ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub id: String,
    pub user_id: String,
    pub content: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
    /// Set when the assistant reply is a placeholder after a provider failure.
    #[serde(default)]
    pub degraded: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewChatMessage {
    pub content: String,
    pub sender: Sender,
    pub degraded: bool,
}

impl NewChatMessage {
    pub fn into_record(self, now: DateTime<Utc>) -> Result<Record, StudyError> {
        let mut record = to_record(&self)?;
        record.insert("timestamp".into(), serde_json::to_value(now)?);
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_drop_duplicates_and_keep_order() {
        let card: NewFlashcard = serde_json::from_value(serde_json::json!({
            "question": "Q",
            "answer": "A",
            "tags": ["biology", "cells", "biology", "exam"],
        }))
        .unwrap();
        let tags: Vec<&str> = card.tags.iter().map(String::as_str).collect();
        assert_eq!(tags, vec!["biology", "cells", "exam"]);
    }

    #[test]
    fn new_flashcard_record_is_unreviewed() {
        let now = Utc::now();
        let record = NewFlashcard {
            question: "What is ATP?".into(),
            answer: "Energy currency".into(),
            tags: Tags::new(),
        }
        .into_record(now)
        .unwrap();
        assert_eq!(record["review_count"], 0);
        assert!(record["last_reviewed"].is_null());
        assert!(!record.contains_key("id"));
    }

    #[test]
    fn flashcard_roundtrips_through_record() {
        let mut record = NewFlashcard {
            question: "Q".into(),
            answer: "A".into(),
            tags: ["t1".to_string()].into_iter().collect(),
        }
        .into_record(Utc::now())
        .unwrap();
        record.insert("id".into(), "abc".into());
        record.insert("user_id".into(), "u1".into());

        let card: Flashcard = from_record(record).unwrap();
        assert_eq!(card.id, "abc");
        assert_eq!(card.user_id, "u1");
        assert_eq!(card.review_count, 0);
        assert!(card.tags.contains("t1"));
    }

    #[test]
    fn material_update_serializes_only_present_fields() {
        let update = MaterialUpdate {
            title: Some("Renamed".into()),
            ..Default::default()
        };
        let record = to_record(&update).unwrap();
        assert_eq!(record.len(), 1);
        assert_eq!(record["title"], "Renamed");
    }

    #[test]
    fn non_object_values_are_rejected() {
        let err = to_record(&vec![1, 2, 3]).unwrap_err();
        assert!(matches!(err, StudyError::InvalidInput(_)));
    }
}
