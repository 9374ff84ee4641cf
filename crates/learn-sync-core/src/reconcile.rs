// Watchlist reconciliation: dedup by course, recompute derived progress, detect changes

use crate::error::ValidationError;
use crate::progress::CompletionIndex;
use crate::validate::{validate_entries, validate_records};
use learn_sync_models::{QuizCompletionRecord, WatchlistEntry};
use serde::Serialize;
use std::collections::HashMap;

/// Result of a reconciliation pass
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileOutcome {
    /// Deduplicated entries, in order of each course's first appearance
    pub entries: Vec<WatchlistEntry>,
    /// Whether `entries` differs materially from the input and should be written back
    pub changed: bool,
    /// Number of duplicate entries discarded
    pub duplicates_removed: usize,
    /// Number of surviving entries whose derived progress fields were corrected
    pub recomputed: usize,
}

/// Reconcile a stored watchlist against the learner's completion records.
///
/// Entries sharing a `course_id` collapse to the one with the latest
/// `last_accessed` (falling back to `added_at`); on equal timestamps the entry
/// later in the input wins. Every survivor gets its progress fields recomputed.
///
/// `changed` is set when any duplicate was dropped or any derived field was
/// corrected. Running this again on its own output reports `changed == false`.
pub fn reconcile(
    raw_entries: &[WatchlistEntry],
    records: &[QuizCompletionRecord],
) -> Result<ReconcileOutcome, ValidationError> {
    validate_entries(raw_entries)?;
    validate_records(records)?;

    let index = CompletionIndex::new(records);

    // Group positions by course, remembering first-appearance order
    let mut order: Vec<&str> = Vec::new();
    let mut groups: HashMap<&str, Vec<usize>> = HashMap::new();
    for (position, entry) in raw_entries.iter().enumerate() {
        let key = entry.course_id.as_str();
        match groups.get_mut(key) {
            Some(positions) => positions.push(position),
            None => {
                order.push(key);
                groups.insert(key, vec![position]);
            }
        }
    }

    let mut entries = Vec::with_capacity(order.len());
    let mut duplicates_removed = 0;
    let mut recomputed = 0;

    for course_id in order {
        let positions = &groups[course_id];
        let survivor_position = select_survivor(raw_entries, positions);
        duplicates_removed += positions.len() - 1;

        let mut survivor = raw_entries[survivor_position].clone();
        let snapshot = index.progress_for(&survivor.course_id, survivor.total_videos)?;
        if survivor.progress_snapshot() != snapshot {
            survivor.apply_progress(snapshot);
            recomputed += 1;
        }
        entries.push(survivor);
    }

    Ok(ReconcileOutcome {
        changed: duplicates_removed > 0 || recomputed > 0,
        entries,
        duplicates_removed,
        recomputed,
    })
}

/// Latest recency wins; `>=` lets a later position win a tie
fn select_survivor(raw_entries: &[WatchlistEntry], positions: &[usize]) -> usize {
    let mut best = positions[0];
    for &position in &positions[1..] {
        if raw_entries[position].recency() >= raw_entries[best].recency() {
            best = position;
        }
    }
    best
}

#[cfg(test)]
mod tests;
