// Progress derivation from quiz completion records

use crate::error::ValidationError;
use crate::validate::non_negative;
use learn_sync_models::{ProgressSnapshot, QuizCompletionRecord, WatchlistStatus};
use std::collections::{HashMap, HashSet};

/// Compute the derived progress fields for one course.
///
/// Only distinct `video_id`s count, so retaking a quiz never inflates the
/// count. A course with no videos reports 0% rather than dividing by zero.
pub fn compute_progress(
    course_id: &str,
    total_videos: i64,
    records: &[QuizCompletionRecord],
) -> Result<ProgressSnapshot, ValidationError> {
    non_negative(course_id, "totalVideos", total_videos)?;

    let completed = records
        .iter()
        .filter(|record| record.course_id == course_id)
        .map(|record| record.video_id.as_str())
        .collect::<HashSet<_>>()
        .len() as i64;

    Ok(snapshot_for(completed, total_videos))
}

fn snapshot_for(completed_quizzes: i64, total_videos: i64) -> ProgressSnapshot {
    let progress = if total_videos == 0 {
        0
    } else {
        let ratio = (completed_quizzes as f64) * 100.0 / (total_videos as f64);
        // Completion records may reference videos that no longer exist in the course
        (ratio.round() as i64).clamp(0, 100)
    };

    ProgressSnapshot {
        completed_quizzes,
        progress,
        status: WatchlistStatus::from_progress(progress),
    }
}

/// Distinct completed videos per course, built once per reconciliation pass
#[derive(Debug, Default)]
pub struct CompletionIndex<'a> {
    videos_by_course: HashMap<&'a str, HashSet<&'a str>>,
}

impl<'a> CompletionIndex<'a> {
    pub fn new(records: &'a [QuizCompletionRecord]) -> Self {
        let mut videos_by_course: HashMap<&'a str, HashSet<&'a str>> = HashMap::new();
        for record in records {
            videos_by_course
                .entry(record.course_id.as_str())
                .or_default()
                .insert(record.video_id.as_str());
        }
        Self { videos_by_course }
    }

    pub fn completed_videos(&self, course_id: &str) -> i64 {
        self.videos_by_course
            .get(course_id)
            .map(|videos| videos.len() as i64)
            .unwrap_or(0)
    }

    /// Same result as [`compute_progress`] without rescanning the records
    pub fn progress_for(&self, course_id: &str, total_videos: i64) -> Result<ProgressSnapshot, ValidationError> {
        non_negative(course_id, "totalVideos", total_videos)?;
        Ok(snapshot_for(self.completed_videos(course_id), total_videos))
    }
}
