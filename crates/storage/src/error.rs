use thiserror::Error;

use studybot_core::StudyError;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("invalid record: {0}")]
    InvalidRecord(String),
}

impl From<StorageError> for StudyError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::Serialize(e) => StudyError::Serialize(e),
            StorageError::InvalidRecord(msg) => StudyError::InvalidInput(msg),
        }
    }
}
