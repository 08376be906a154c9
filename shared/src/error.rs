use thiserror::Error;
use serde_json::Error as JsonError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum SharedError {
    #[error("Conversion error: {0}")]
    Conversion(String),

    #[error("Invalid subscription status: {0}")]
    InvalidSubscriptionStatus(String),

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),
}

impl From<JsonError> for SharedError {
    fn from(error: JsonError) -> Self {
        Self::Conversion(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SharedError>;
