use serde::{Deserialize, Serialize};

/// Course metadata captured at the moment a learner opens it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CourseSnapshot {
    pub course_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub instructor_display_name: String,
    #[serde(default)]
    pub thumbnail: String,
    pub total_videos: i64,
}
