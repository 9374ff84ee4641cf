use crate::error::ValidationError;
use crate::progress::compute_progress;
use crate::reconcile::{reconcile, ReconcileOutcome};
use crate::upsert::upsert_entry;
use crate::validate::validate_record;
use chrono::{DateTime, Utc};
use learn_sync_models::{CourseSnapshot, QuizCompletionRecord, WatchlistEntry};
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// A watchlist keyed by course id.
///
/// Uniqueness of `course_id` holds by construction, so the common paths never
/// need a dedup pass. Stored arrays that predate this type go through
/// [`KeyedWatchlist::from_entries`], which runs the reconciler as a repair step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyedWatchlist {
    entries: Vec<WatchlistEntry>,
    positions: HashMap<String, usize>,
}

impl KeyedWatchlist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a raw (possibly duplicated) array, returning what the repair changed
    pub fn from_entries(
        raw: &[WatchlistEntry],
        records: &[QuizCompletionRecord],
    ) -> Result<(Self, ReconcileOutcome), ValidationError> {
        let outcome = reconcile(raw, records)?;
        let watchlist = Self::from_unique(outcome.entries.clone());
        Ok((watchlist, outcome))
    }

    fn from_unique(entries: Vec<WatchlistEntry>) -> Self {
        let positions = entries
            .iter()
            .enumerate()
            .map(|(position, entry)| (entry.course_id.clone(), position))
            .collect();
        Self { entries, positions }
    }

    pub fn get(&self, course_id: &str) -> Option<&WatchlistEntry> {
        self.positions.get(course_id).map(|&position| &self.entries[position])
    }

    pub fn contains(&self, course_id: &str) -> bool {
        self.positions.contains_key(course_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[WatchlistEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<WatchlistEntry> {
        self.entries
    }

    /// [`crate::upsert_entry`] over the keyed entries; returns whether an entry was added
    pub fn open_course(
        &mut self,
        snapshot: &CourseSnapshot,
        records: &[QuizCompletionRecord],
        now: DateTime<Utc>,
    ) -> Result<bool, ValidationError> {
        let outcome = upsert_entry(&self.entries, snapshot, records, now)?;
        if outcome.is_new_entry {
            self.positions.insert(snapshot.course_id.clone(), self.entries.len());
        }
        self.entries = outcome.entries;
        Ok(outcome.is_new_entry)
    }

    /// Refresh the entry a new completion belongs to.
    ///
    /// `records` must already include `record`. Returns whether the entry's
    /// derived fields moved; completions for courses not on the list are a no-op.
    pub fn apply_completion(
        &mut self,
        record: &QuizCompletionRecord,
        records: &[QuizCompletionRecord],
    ) -> Result<bool, ValidationError> {
        validate_record(record)?;
        let Some(&position) = self.positions.get(&record.course_id) else {
            return Ok(false);
        };

        let entry = &mut self.entries[position];
        let snapshot = compute_progress(&entry.course_id, entry.total_videos, records)?;
        if entry.progress_snapshot() == snapshot {
            return Ok(false);
        }
        entry.apply_progress(snapshot);
        Ok(true)
    }

    /// Merge another replica of the same learner's watchlist.
    ///
    /// Union by course id, the more recent entry surviving each collision and
    /// progress recomputed from `records`. The result does not depend on which
    /// side is `self`: equal timestamps fall back to comparing the entries field
    /// by field, and entries come out ordered by `added_at`, then course id.
    /// Merging the result with either input again is a no-op.
    pub fn merge(&self, other: &KeyedWatchlist, records: &[QuizCompletionRecord]) -> Result<Self, ValidationError> {
        let mut winners: HashMap<&str, &WatchlistEntry> = HashMap::new();
        for entry in self.entries.iter().chain(other.entries.iter()) {
            match winners.entry(entry.course_id.as_str()) {
                Entry::Vacant(slot) => {
                    slot.insert(entry);
                }
                Entry::Occupied(mut slot) => {
                    if merge_rank(entry) > merge_rank(slot.get()) {
                        slot.insert(entry);
                    }
                }
            }
        }

        let mut merged: Vec<WatchlistEntry> = winners.into_values().cloned().collect();
        merged.sort_by(|a, b| a.added_at.cmp(&b.added_at).then_with(|| a.course_id.cmp(&b.course_id)));

        // Keys are already unique; this validates and recomputes progress
        let outcome = reconcile(&merged, records)?;
        Ok(Self::from_unique(outcome.entries))
    }
}

type MergeRank<'a> = (
    DateTime<Utc>,
    DateTime<Utc>,
    Option<DateTime<Utc>>,
    &'a str,
    &'a str,
    &'a str,
    &'a str,
    i64,
    i64,
    i64,
    &'static str,
);

/// Total order over replicas of one course: recency first, then every other field
fn merge_rank(entry: &WatchlistEntry) -> MergeRank<'_> {
    (
        entry.recency(),
        entry.added_at,
        entry.last_accessed,
        entry.course_title.as_str(),
        entry.course_description.as_str(),
        entry.instructor.as_str(),
        entry.thumbnail.as_str(),
        entry.total_videos,
        entry.completed_quizzes,
        entry.progress,
        entry.status.as_str(),
    )
}
