use thiserror::Error;

#[derive(Error, Debug)]
pub enum StudyError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl StudyError {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        StudyError::NotFound { kind, id: id.into() }
    }
}
