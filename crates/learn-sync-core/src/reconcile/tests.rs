use super::*;
use chrono::{DateTime, TimeZone, Utc};
use learn_sync_models::WatchlistStatus;

fn day(d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, d, 0, 0, 0).unwrap()
}

fn create_entry(course_id: &str, title: &str, total_videos: i64, added: u32, accessed: Option<u32>) -> WatchlistEntry {
    WatchlistEntry {
        course_id: course_id.to_string(),
        course_title: title.to_string(),
        course_description: format!("{} description", title),
        instructor: "Ada".to_string(),
        thumbnail: String::new(),
        total_videos,
        completed_quizzes: 0,
        progress: 0,
        status: WatchlistStatus::InProgress,
        added_at: day(added),
        last_accessed: accessed.map(day),
    }
}

fn create_record(course_id: &str, video_id: &str, score: f64) -> QuizCompletionRecord {
    QuizCompletionRecord {
        course_id: course_id.to_string(),
        video_id: video_id.to_string(),
        score,
        completed_at: day(10),
    }
}

#[test]
fn test_duplicate_pair_keeps_most_recent() {
    let entries = vec![
        create_entry("c1", "A", 4, 1, Some(1)),
        create_entry("c1", "B", 4, 1, Some(5)),
    ];
    let records = vec![create_record("c1", "v1", 80.0), create_record("c1", "v2", 60.0)];

    let outcome = reconcile(&entries, &records).unwrap();
    assert_eq!(outcome.entries.len(), 1);
    let survivor = &outcome.entries[0];
    assert_eq!(survivor.course_title, "B");
    assert_eq!(survivor.completed_quizzes, 2);
    assert_eq!(survivor.progress, 50);
    assert_eq!(survivor.status, WatchlistStatus::InProgress);
    assert!(outcome.changed);
    assert_eq!(outcome.duplicates_removed, 1);
}

#[test]
fn test_single_entry_completed() {
    let entries = vec![create_entry("c2", "Done", 5, 1, Some(2))];
    let records: Vec<_> = (1..=5).map(|i| create_record("c2", &format!("v{}", i), 100.0)).collect();

    let outcome = reconcile(&entries, &records).unwrap();
    assert_eq!(outcome.entries[0].progress, 100);
    assert_eq!(outcome.entries[0].status, WatchlistStatus::Completed);
    assert!(outcome.changed);
    assert_eq!(outcome.recomputed, 1);
}

#[test]
fn test_single_entry_zero_videos() {
    let entries = vec![create_entry("c3", "Empty", 0, 1, None)];
    let outcome = reconcile(&entries, &[create_record("c3", "v1", 50.0)]).unwrap();
    assert_eq!(outcome.entries[0].progress, 0);
    assert_eq!(outcome.entries[0].status, WatchlistStatus::InProgress);
    assert_eq!(outcome.entries[0].completed_quizzes, 1);
}

#[test]
fn test_retakes_counted_once() {
    let entries = vec![create_entry("c4", "Retakes", 2, 1, None)];
    let records = vec![create_record("c4", "v1", 30.0), create_record("c4", "v1", 90.0)];
    let outcome = reconcile(&entries, &records).unwrap();
    assert_eq!(outcome.entries[0].completed_quizzes, 1);
    assert_eq!(outcome.entries[0].progress, 50);
}

#[test]
fn test_second_pass_reports_no_change() {
    let entries = vec![
        create_entry("c1", "A", 4, 1, Some(3)),
        create_entry("c2", "B", 2, 1, None),
        create_entry("c1", "A2", 4, 2, Some(2)),
        create_entry("c3", "C", 0, 1, None),
    ];
    let records = vec![
        create_record("c1", "v1", 80.0),
        create_record("c2", "v1", 80.0),
        create_record("c2", "v2", 70.0),
    ];

    let first = reconcile(&entries, &records).unwrap();
    assert!(first.changed);
    let second = reconcile(&first.entries, &records).unwrap();
    assert!(!second.changed);
    assert_eq!(second.entries, first.entries);
    assert_eq!(second.duplicates_removed, 0);
    assert_eq!(second.recomputed, 0);
}

#[test]
fn test_already_correct_single_entry_unchanged() {
    let mut entry = create_entry("c1", "A", 2, 1, None);
    entry.completed_quizzes = 1;
    entry.progress = 50;
    let outcome = reconcile(&[entry.clone()], &[create_record("c1", "v9", 10.0)]).unwrap();
    assert!(!outcome.changed);
    assert_eq!(outcome.entries, vec![entry]);
}

#[test]
fn test_equal_timestamps_later_entry_wins() {
    let entries = vec![
        create_entry("c1", "first", 3, 1, Some(4)),
        create_entry("c1", "second", 3, 1, Some(4)),
    ];
    let outcome = reconcile(&entries, &[]).unwrap();
    assert_eq!(outcome.entries.len(), 1);
    assert_eq!(outcome.entries[0].course_title, "second");
    assert!(outcome.changed);
}

#[test]
fn test_missing_last_accessed_falls_back_to_added_at() {
    let entries = vec![
        create_entry("c1", "old-but-accessed", 3, 1, Some(3)),
        create_entry("c1", "newly-added", 3, 6, None),
    ];
    let outcome = reconcile(&entries, &[]).unwrap();
    assert_eq!(outcome.entries[0].course_title, "newly-added");
}

#[test]
fn test_every_course_appears_once() {
    let entries = vec![
        create_entry("c1", "a", 1, 1, None),
        create_entry("c1", "b", 1, 2, None),
        create_entry("c1", "c", 1, 3, None),
        create_entry("c2", "d", 1, 1, None),
        create_entry("c2", "e", 1, 1, None),
    ];
    let outcome = reconcile(&entries, &[]).unwrap();
    let ids: Vec<&str> = outcome.entries.iter().map(|e| e.course_id.as_str()).collect();
    assert_eq!(ids, vec!["c1", "c2"]);
    assert_eq!(outcome.duplicates_removed, 3);
}

#[test]
fn test_order_follows_first_appearance() {
    let entries = vec![
        create_entry("c2", "two", 1, 1, Some(1)),
        create_entry("c1", "one", 1, 1, Some(1)),
        create_entry("c2", "two-newer", 1, 1, Some(9)),
        create_entry("c3", "three", 1, 1, Some(1)),
    ];
    let outcome = reconcile(&entries, &[]).unwrap();
    let titles: Vec<&str> = outcome.entries.iter().map(|e| e.course_title.as_str()).collect();
    assert_eq!(titles, vec!["two-newer", "one", "three"]);
}

#[test]
fn test_stale_progress_is_corrected() {
    let mut entry = create_entry("c1", "A", 4, 1, None);
    entry.completed_quizzes = 4;
    entry.progress = 100;
    entry.status = WatchlistStatus::Completed;
    let outcome = reconcile(&[entry], &[create_record("c1", "v1", 90.0)]).unwrap();
    assert!(outcome.changed);
    assert_eq!(outcome.entries[0].completed_quizzes, 1);
    assert_eq!(outcome.entries[0].progress, 25);
    assert_eq!(outcome.entries[0].status, WatchlistStatus::InProgress);
}

#[test]
fn test_empty_watchlist() {
    let outcome = reconcile(&[], &[create_record("c1", "v1", 90.0)]).unwrap();
    assert!(outcome.entries.is_empty());
    assert!(!outcome.changed);
}

#[test]
fn test_negative_total_rejected_without_output() {
    let entries = vec![create_entry("c1", "ok", 2, 1, None), create_entry("c2", "bad", -3, 1, None)];
    let err = reconcile(&entries, &[]).unwrap_err();
    assert_eq!(
        err,
        ValidationError::NegativeCount {
            course_id: "c2".to_string(),
            field: "totalVideos",
            value: -3,
        }
    );
}

#[test]
fn test_progress_out_of_range_rejected() {
    let mut entry = create_entry("c1", "A", 2, 1, None);
    entry.progress = 140;
    let err = reconcile(&[entry], &[]).unwrap_err();
    assert!(matches!(err, ValidationError::ValueOutOfRange { field: "progress", .. }));
}

#[test]
fn test_malformed_record_rejected() {
    let entries = vec![create_entry("c1", "A", 2, 1, None)];
    let err = reconcile(&entries, &[create_record("c1", "v1", f64::NAN)]).unwrap_err();
    assert!(matches!(err, ValidationError::InvalidScore { .. }));
}

#[test]
fn test_padded_course_id_is_not_a_separate_course() {
    let entries = vec![create_entry("c1", "A", 2, 1, None), create_entry("c1 ", "A", 2, 2, None)];
    let err = reconcile(&entries, &[]).unwrap_err();
    assert!(matches!(err, ValidationError::Malformed { .. }));
}
