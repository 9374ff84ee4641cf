use serde::{Deserialize, Serialize};
use crate::status::WatchlistStatus;

/// The derived progress fields of a watchlist entry
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSnapshot {
    pub completed_quizzes: i64,
    pub progress: i64,
    pub status: WatchlistStatus,
}
