//! Storage collaborator for per-user session records.
//!
//! The core only needs a get/set interface keyed by user id. Durable backends are out of scope;
//! [`InMemoryStore`] keeps records for the lifetime of the process.

mod memory;

pub use memory::InMemoryStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Errors raised by session stores.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Backend could not read or write the record.
    #[error("storage backend failure: {0}")]
    Backend(String),
}

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The person asking questions.
    User,
    /// The document assistant.
    Bot,
}

/// One entry of a user's chat log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Unique message identifier.
    pub id: String,
    /// Message author.
    pub role: Role,
    /// Message body.
    pub text: String,
    /// RFC3339 creation timestamp.
    pub timestamp: String,
}

impl ChatMessage {
    /// Create a message stamped with a fresh id and the current time.
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            text: text.into(),
            timestamp: current_timestamp_rfc3339(),
        }
    }
}

/// Everything persisted for one user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Current aggregated document text.
    pub document: String,
    /// Ordered chat log.
    pub history: Vec<ChatMessage>,
}

/// Get/set interface over per-user records.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Load the record for `user_id`; unknown users yield an empty record.
    async fn load(&self, user_id: &str) -> Result<UserRecord, StorageError>;

    /// Replace the record for `user_id`.
    async fn save(&self, user_id: &str, record: UserRecord) -> Result<(), StorageError>;
}

/// Current timestamp formatted for chat messages.
pub(crate) fn current_timestamp_rfc3339() -> String {
    time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}
