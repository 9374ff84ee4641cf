use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::progress::ProgressSnapshot;
use crate::status::WatchlistStatus;

/// One learner's relationship to one course.
///
/// `completed_quizzes`, `progress` and `status` are derived from the learner's
/// quiz completion records and are only ever rewritten by the reconciler.
/// Counts are signed so that malformed stored documents can be detected and
/// rejected instead of silently coerced.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistEntry {
    pub course_id: String,
    #[serde(default)]
    pub course_title: String,
    #[serde(default)]
    pub course_description: String,
    #[serde(default)]
    pub instructor: String,
    #[serde(default)]
    pub thumbnail: String,
    pub total_videos: i64,
    #[serde(default)]
    pub completed_quizzes: i64,
    #[serde(default)]
    pub progress: i64,
    #[serde(default)]
    pub status: WatchlistStatus,
    pub added_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_accessed: Option<DateTime<Utc>>,
}

impl WatchlistEntry {
    /// Timestamp used to pick a survivor among duplicates
    pub fn recency(&self) -> DateTime<Utc> {
        self.last_accessed.unwrap_or(self.added_at)
    }

    pub fn progress_snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            completed_quizzes: self.completed_quizzes,
            progress: self.progress,
            status: self.status,
        }
    }

    pub fn apply_progress(&mut self, snapshot: ProgressSnapshot) {
        self.completed_quizzes = snapshot.completed_quizzes;
        self.progress = snapshot.progress;
        self.status = snapshot.status;
    }
}
