use gloo_storage::{LocalStorage, Storage};
use log::debug;
use serde::{Deserialize, Serialize};

const SESSION_KEY: &str = "session";

/// Sign-in state persisted by the auth flow.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredSession {
    pub user_id: String,
    pub access_token: String,
}

pub fn load() -> Option<StoredSession> {
    match LocalStorage::get::<StoredSession>(SESSION_KEY) {
        Ok(session) if !session.user_id.is_empty() => Some(session),
        Ok(_) => None,
        Err(e) => {
            debug!("No stored session: {}", e);
            None
        }
    }
}

pub fn current_user_id() -> Option<String> {
    load().map(|s| s.user_id)
}

pub fn access_token() -> Option<String> {
    load().map(|s| s.access_token).filter(|t| !t.is_empty())
}
