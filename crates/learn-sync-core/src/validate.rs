// Input checks shared by the reconciler entry points

use crate::error::ValidationError;
use learn_sync_models::{CourseSnapshot, QuizCompletionRecord, WatchlistEntry};

pub fn validate_entry(entry: &WatchlistEntry) -> Result<(), ValidationError> {
    checked_id("courseId", &entry.course_id)?;
    non_negative(&entry.course_id, "totalVideos", entry.total_videos)?;
    non_negative(&entry.course_id, "completedQuizzes", entry.completed_quizzes)?;
    if !(0..=100).contains(&entry.progress) {
        return Err(ValidationError::ValueOutOfRange {
            course_id: entry.course_id.clone(),
            field: "progress",
            value: entry.progress,
            min: 0,
            max: 100,
        });
    }
    Ok(())
}

pub fn validate_entries(entries: &[WatchlistEntry]) -> Result<(), ValidationError> {
    entries.iter().try_for_each(validate_entry)
}

pub fn validate_record(record: &QuizCompletionRecord) -> Result<(), ValidationError> {
    checked_id("courseId", &record.course_id)?;
    checked_id("videoId", &record.video_id)?;
    if !record.score.is_finite() {
        return Err(ValidationError::InvalidScore {
            course_id: record.course_id.clone(),
            video_id: record.video_id.clone(),
        });
    }
    Ok(())
}

pub fn validate_records(records: &[QuizCompletionRecord]) -> Result<(), ValidationError> {
    records.iter().try_for_each(validate_record)
}

pub fn validate_snapshot(snapshot: &CourseSnapshot) -> Result<(), ValidationError> {
    checked_id("courseId", &snapshot.course_id)?;
    non_negative(&snapshot.course_id, "totalVideos", snapshot.total_videos)
}

/// Ids are matched byte-for-byte, so padded ids are refused rather than
/// silently treated as a different course or video
fn checked_id(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyField { field });
    }
    if value.trim() != value {
        return Err(ValidationError::Malformed {
            what: field.to_string(),
            reason: format!("'{}' has leading or trailing whitespace", value),
        });
    }
    Ok(())
}

pub(crate) fn non_negative(course_id: &str, field: &'static str, value: i64) -> Result<(), ValidationError> {
    if value < 0 {
        return Err(ValidationError::NegativeCount {
            course_id: course_id.to_string(),
            field,
            value,
        });
    }
    Ok(())
}

/// Decode a raw watchlist array (as stored inside a user document).
///
/// Type mismatches such as a non-numeric `totalVideos` surface as
/// `ValidationError::Malformed` rather than being coerced.
pub fn decode_entries(value: serde_json::Value) -> Result<Vec<WatchlistEntry>, ValidationError> {
    let entries: Vec<WatchlistEntry> = serde_json::from_value(value).map_err(|e| ValidationError::Malformed {
        what: "watchlist".to_string(),
        reason: e.to_string(),
    })?;
    validate_entries(&entries)?;
    Ok(entries)
}

/// Decode a raw array of quiz completion records
pub fn decode_records(value: serde_json::Value) -> Result<Vec<QuizCompletionRecord>, ValidationError> {
    let records: Vec<QuizCompletionRecord> = serde_json::from_value(value).map_err(|e| ValidationError::Malformed {
        what: "completion records".to_string(),
        reason: e.to_string(),
    })?;
    validate_records(&records)?;
    Ok(records)
}
