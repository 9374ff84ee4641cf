use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One finished quiz for one video of one course.
///
/// Records are append-only. A learner may retake a quiz, so several records can
/// share the same (course_id, video_id) pair; only distinct videos count toward progress.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuizCompletionRecord {
    pub course_id: String,
    pub video_id: String,
    pub score: f64,
    pub completed_at: DateTime<Utc>,
}
