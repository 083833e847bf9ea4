//! Process-local session store.

use super::{SessionStore, StorageError, UserRecord};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Keeps user records in memory.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    records: RwLock<HashMap<String, UserRecord>>,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemoryStore {
    async fn load(&self, user_id: &str) -> Result<UserRecord, StorageError> {
        let records = self.records.read().await;
        Ok(records.get(user_id).cloned().unwrap_or_default())
    }

    async fn save(&self, user_id: &str, record: UserRecord) -> Result<(), StorageError> {
        let mut records = self.records.write().await;
        records.insert(user_id.to_string(), record);
        Ok(())
    }
}
