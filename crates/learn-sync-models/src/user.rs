use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::watchlist::WatchlistEntry;

/// The per-learner document held by the document store
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub user_id: String,
    #[serde(default)]
    pub watchlist: Vec<WatchlistEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl UserRecord {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            watchlist: Vec::new(),
            updated_at: None,
        }
    }
}
