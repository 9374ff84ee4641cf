use crate::error::StoreError;
use async_trait::async_trait;
use learn_sync_models::{QuizCompletionRecord, UserRecord};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// A stored document together with the version it was read at
#[derive(Debug, Clone, PartialEq)]
pub struct Versioned<T> {
    pub record: T,
    pub version: u64,
}

/// Document store holding one record per learner plus their completion log.
///
/// `put_user` is a compare-and-swap: `expected_version` must match the version
/// currently stored (`None` meaning "does not exist yet"), otherwise
/// `StoreError::VersionConflict` is returned and nothing is written.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    fn store_name(&self) -> &str;

    async fn get_user(&self, user_id: &str) -> Result<Option<Versioned<UserRecord>>, StoreError>;

    /// Returns the new version on success
    async fn put_user(&self, record: UserRecord, expected_version: Option<u64>) -> Result<u64, StoreError>;

    async fn list_users(&self) -> Result<Vec<String>, StoreError>;

    async fn completions(&self, user_id: &str) -> Result<Vec<QuizCompletionRecord>, StoreError>;

    async fn append_completion(&self, user_id: &str, record: QuizCompletionRecord) -> Result<(), StoreError>;
}

pub(crate) fn check_version(
    user_id: &str,
    expected: Option<u64>,
    found: Option<u64>,
) -> Result<u64, StoreError> {
    if expected != found {
        return Err(StoreError::VersionConflict {
            user_id: user_id.to_string(),
            expected,
            found,
        });
    }
    Ok(found.map(|v| v + 1).unwrap_or(1))
}

#[derive(Debug, Default)]
struct MemoryState {
    users: HashMap<String, Versioned<UserRecord>>,
    completions: HashMap<String, Vec<QuizCompletionRecord>>,
}

/// In-process store, used for tests and dry runs
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn store_name(&self) -> &str {
        "memory"
    }

    async fn get_user(&self, user_id: &str) -> Result<Option<Versioned<UserRecord>>, StoreError> {
        Ok(self.state.read().await.users.get(user_id).cloned())
    }

    async fn put_user(&self, record: UserRecord, expected_version: Option<u64>) -> Result<u64, StoreError> {
        let mut state = self.state.write().await;
        let found = state.users.get(&record.user_id).map(|v| v.version);
        let version = check_version(&record.user_id, expected_version, found)?;
        state.users.insert(record.user_id.clone(), Versioned { record, version });
        Ok(version)
    }

    async fn list_users(&self) -> Result<Vec<String>, StoreError> {
        let state = self.state.read().await;
        let mut users: Vec<String> = state.users.keys().cloned().collect();
        users.sort();
        Ok(users)
    }

    async fn completions(&self, user_id: &str) -> Result<Vec<QuizCompletionRecord>, StoreError> {
        Ok(self.state.read().await.completions.get(user_id).cloned().unwrap_or_default())
    }

    async fn append_completion(&self, user_id: &str, record: QuizCompletionRecord) -> Result<(), StoreError> {
        self.state
            .write()
            .await
            .completions
            .entry(user_id.to_string())
            .or_default()
            .push(record);
        Ok(())
    }
}
