use crate::error::StoreError;
use crate::store::{check_version, DocumentStore, Versioned};
use async_trait::async_trait;
use learn_sync_models::{QuizCompletionRecord, UserRecord};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info};

/// On-disk envelope for a user document
#[derive(Debug, Serialize, Deserialize)]
struct UserDocument {
    version: u64,
    record: UserRecord,
}

/// Store keeping one JSON document per learner under a data directory.
///
/// Layout:
/// - `users/<user_id>.json` - versioned user record
/// - `completions/<user_id>.json` - completion log
///
/// Writes go through a temp file and a rename. The version check is only
/// atomic within this process; separate processes sharing a directory can
/// still race.
pub struct JsonFileStore {
    users_dir: PathBuf,
    completions_dir: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(data_dir: &Path) -> Result<Self, StoreError> {
        let users_dir = data_dir.join("users");
        let completions_dir = data_dir.join("completions");
        for dir in [&users_dir, &completions_dir] {
            std::fs::create_dir_all(dir).map_err(|source| StoreError::Io {
                path: dir.clone(),
                source,
            })?;
        }
        Ok(Self {
            users_dir,
            completions_dir,
            write_lock: Mutex::new(()),
        })
    }

    fn user_path(&self, user_id: &str) -> Result<PathBuf, StoreError> {
        Ok(self.users_dir.join(format!("{}.json", checked_key(user_id)?)))
    }

    fn completions_path(&self, user_id: &str) -> Result<PathBuf, StoreError> {
        Ok(self.completions_dir.join(format!("{}.json", checked_key(user_id)?)))
    }
}

/// User ids become file names, so anything that could escape the directory is refused
fn checked_key(user_id: &str) -> Result<&str, StoreError> {
    let valid = !user_id.is_empty()
        && user_id != "."
        && user_id != ".."
        && user_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '@'));
    if valid {
        Ok(user_id)
    } else {
        Err(StoreError::InvalidKey(user_id.to_string()))
    }
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StoreError> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "Document miss (file does not exist)");
            return Ok(None);
        }
        Err(source) => {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    serde_json::from_str(&content)
        .map(Some)
        .map_err(|e| StoreError::Corrupt {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
}

async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    let json = serde_json::to_string_pretty(value).map_err(|e| StoreError::Corrupt {
        path: path.to_path_buf(),
        reason: format!("failed to serialize: {}", e),
    })?;

    let tmp_path = path.with_extension("json.tmp");
    let io_err = |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };
    tokio::fs::write(&tmp_path, json).await.map_err(io_err)?;
    tokio::fs::rename(&tmp_path, path).await.map_err(io_err)?;
    Ok(())
}

#[async_trait]
impl DocumentStore for JsonFileStore {
    fn store_name(&self) -> &str {
        "json"
    }

    async fn get_user(&self, user_id: &str) -> Result<Option<Versioned<UserRecord>>, StoreError> {
        let path = self.user_path(user_id)?;
        let Some(document) = read_json::<UserDocument>(&path).await? else {
            return Ok(None);
        };
        // Writes go to the file named after the embedded id, so a mismatch could never be updated
        if document.record.user_id != user_id {
            return Err(StoreError::Corrupt {
                path,
                reason: format!("document belongs to user '{}'", document.record.user_id),
            });
        }
        Ok(Some(Versioned {
            record: document.record,
            version: document.version,
        }))
    }

    async fn put_user(&self, record: UserRecord, expected_version: Option<u64>) -> Result<u64, StoreError> {
        let path = self.user_path(&record.user_id)?;
        let _guard = self.write_lock.lock().await;

        let current: Option<UserDocument> = read_json(&path).await?;
        let version = check_version(&record.user_id, expected_version, current.map(|doc| doc.version))?;

        let entries = record.watchlist.len();
        let user_id = record.user_id.clone();
        write_json(&path, &UserDocument { version, record }).await?;
        debug!(user_id = %user_id, version, entries, "User document saved");
        Ok(version)
    }

    async fn list_users(&self) -> Result<Vec<String>, StoreError> {
        let io_err = |source| StoreError::Io {
            path: self.users_dir.clone(),
            source,
        };
        let mut dir = tokio::fs::read_dir(&self.users_dir).await.map_err(io_err)?;
        let mut users = Vec::new();
        while let Some(entry) = dir.next_entry().await.map_err(io_err)? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                users.push(stem.to_string());
            }
        }
        users.sort();
        Ok(users)
    }

    async fn completions(&self, user_id: &str) -> Result<Vec<QuizCompletionRecord>, StoreError> {
        let path = self.completions_path(user_id)?;
        Ok(read_json(&path).await?.unwrap_or_default())
    }

    async fn append_completion(&self, user_id: &str, record: QuizCompletionRecord) -> Result<(), StoreError> {
        let path = self.completions_path(user_id)?;
        let _guard = self.write_lock.lock().await;

        let mut records: Vec<QuizCompletionRecord> = read_json(&path).await?.unwrap_or_default();
        records.push(record);
        write_json(&path, &records).await?;
        info!(user_id = %user_id, total = records.len(), "Completion recorded");
        Ok(())
    }
}
