use serde::{Deserialize, Serialize};

/// Learner-facing state of a watchlist entry, derived from progress
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum WatchlistStatus {
    /// At least one video still has no completed quiz (stored as "in_progress")
    #[default]
    InProgress,
    /// Every video in the course has a completed quiz (stored as "completed")
    Completed,
}

impl WatchlistStatus {
    /// Status for a given progress percentage. Only exactly 100 counts as completed.
    pub fn from_progress(progress: i64) -> Self {
        if progress == 100 {
            WatchlistStatus::Completed
        } else {
            WatchlistStatus::InProgress
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WatchlistStatus::InProgress => "in_progress",
            WatchlistStatus::Completed => "completed",
        }
    }
}

impl std::fmt::Display for WatchlistStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
