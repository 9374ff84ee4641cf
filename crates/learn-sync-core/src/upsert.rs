// Course-open handling: add a watchlist entry or touch an existing one

use crate::error::ValidationError;
use crate::progress::compute_progress;
use crate::validate::{validate_entries, validate_records, validate_snapshot};
use chrono::{DateTime, Utc};
use learn_sync_models::{CourseSnapshot, QuizCompletionRecord, WatchlistEntry};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertOutcome {
    pub entries: Vec<WatchlistEntry>,
    pub is_new_entry: bool,
}

/// Record that a learner opened a course.
///
/// A course not yet on the watchlist gets a new entry whose progress reflects
/// any completion records that already exist. A course already present only
/// has `last_accessed` bumped; progress is left for [`crate::reconcile`] so
/// opening a course stays cheap. Duplicates are not collapsed here either:
/// only the first matching entry is touched.
pub fn upsert_entry(
    existing: &[WatchlistEntry],
    snapshot: &CourseSnapshot,
    records: &[QuizCompletionRecord],
    now: DateTime<Utc>,
) -> Result<UpsertOutcome, ValidationError> {
    validate_snapshot(snapshot)?;
    validate_entries(existing)?;

    let mut entries = existing.to_vec();

    if let Some(entry) = entries.iter_mut().find(|e| e.course_id == snapshot.course_id) {
        entry.last_accessed = Some(now);
        return Ok(UpsertOutcome {
            entries,
            is_new_entry: false,
        });
    }

    validate_records(records)?;
    entries.push(new_entry(snapshot, records, now)?);
    Ok(UpsertOutcome {
        entries,
        is_new_entry: true,
    })
}

fn new_entry(
    snapshot: &CourseSnapshot,
    records: &[QuizCompletionRecord],
    now: DateTime<Utc>,
) -> Result<WatchlistEntry, ValidationError> {
    let progress = compute_progress(&snapshot.course_id, snapshot.total_videos, records)?;
    Ok(WatchlistEntry {
        course_id: snapshot.course_id.clone(),
        course_title: snapshot.title.clone(),
        course_description: snapshot.description.clone(),
        instructor: snapshot.instructor_display_name.clone(),
        thumbnail: snapshot.thumbnail.clone(),
        total_videos: snapshot.total_videos,
        completed_quizzes: progress.completed_quizzes,
        progress: progress.progress,
        status: progress.status,
        added_at: now,
        last_accessed: Some(now),
    })
}
