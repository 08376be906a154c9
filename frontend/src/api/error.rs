use serde::Deserialize;
use shared::SharedError;
use thiserror::Error;

/// Failure of a remote query, shared by every waiter of a de-duplicated request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Remote store returned {status}: {message}")]
    Remote {
        status: u16,
        code: Option<String>,
        message: String,
    },

    #[error("Failed to decode response: {0}")]
    Decode(String),
}

/// Error body returned by the PostgREST layer of the remote store.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreErrorBody {
    #[serde(default)]
    pub code: Option<String>,
    pub message: String,
    #[serde(default)]
    pub details: Option<String>,
}

impl QueryError {
    pub fn from_body(status: u16, status_text: &str, body: &str) -> Self {
        match serde_json::from_str::<StoreErrorBody>(body) {
            Ok(parsed) => {
                let message = match parsed.details {
                    Some(details) if !details.is_empty() => format!("{} ({})", parsed.message, details),
                    _ => parsed.message,
                };
                QueryError::Remote { status, code: parsed.code, message }
            }
            Err(_) => QueryError::Remote {
                status,
                code: None,
                message: status_text.to_string(),
            },
        }
    }
}

impl From<serde_json::Error> for QueryError {
    fn from(error: serde_json::Error) -> Self {
        QueryError::Decode(error.to_string())
    }
}

impl From<SharedError> for QueryError {
    fn from(error: SharedError) -> Self {
        QueryError::Decode(error.to_string())
    }
}

impl From<gloo_net::Error> for QueryError {
    fn from(error: gloo_net::Error) -> Self {
        QueryError::Transport(error.to_string())
    }
}
