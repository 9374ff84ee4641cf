use crate::error::{ServiceError, StoreError};
use crate::keyed::KeyedWatchlist;
use crate::reconcile::reconcile;
use crate::store::DocumentStore;
use crate::validate::validate_record;
use chrono::{DateTime, Utc};
use learn_sync_config::ReconcileConfig;
use learn_sync_models::{CourseSnapshot, QuizCompletionRecord, UserRecord, WatchlistEntry};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

#[derive(Debug, Clone, Serialize)]
pub struct ServiceOptions {
    pub recompute_on_completion: bool,
    pub max_write_attempts: u32,
    /// Compute everything but never write back
    pub dry_run: bool,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        Self::from(&ReconcileConfig::default())
    }
}

impl From<&ReconcileConfig> for ServiceOptions {
    fn from(config: &ReconcileConfig) -> Self {
        Self {
            recompute_on_completion: config.recompute_on_completion,
            max_write_attempts: config.max_write_attempts.max(1),
            dry_run: false,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileReport {
    pub user_id: String,
    pub entries: Vec<WatchlistEntry>,
    pub changed: bool,
    pub written: bool,
    pub duplicates_removed: usize,
    /// Derived-field corrections applied. After a quiz completion the refreshed
    /// entry is counted on top of any stale entries repaired alongside it.
    pub recomputed: usize,
    pub attempts: u32,
    #[serde(skip)]
    pub duration: Duration,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenCourseReport {
    pub user_id: String,
    pub course_id: String,
    pub is_new_entry: bool,
    pub entry: Option<WatchlistEntry>,
    /// Duplicates collapsed while loading the stored watchlist
    pub duplicates_removed: usize,
    pub written: bool,
}

/// Outcome of one user within `reconcile_all`
#[derive(Debug)]
pub struct BatchItem {
    pub user_id: String,
    pub result: Result<ReconcileReport, ServiceError>,
}

/// Runs the reconciler against a document store.
///
/// Every write is a read-modify-write guarded by the store's version check.
/// On a conflict the record is re-read and the reconciler re-applied, up to
/// `max_write_attempts` times. Nothing is written when reconciliation fails.
pub struct WatchlistService<S: DocumentStore + ?Sized> {
    store: Arc<S>,
    options: ServiceOptions,
    clock: Clock,
}

impl<S: DocumentStore + ?Sized> WatchlistService<S> {
    pub fn new(store: Arc<S>, mut options: ServiceOptions) -> Self {
        options.max_write_attempts = options.max_write_attempts.max(1);
        Self {
            store,
            options,
            clock: Arc::new(Utc::now),
        }
    }

    pub fn with_clock(mut self, clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn set_dry_run(&mut self, dry_run: bool) {
        self.options.dry_run = dry_run;
    }

    pub fn options(&self) -> &ServiceOptions {
        &self.options
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Dashboard read: the stored watchlist as-is, empty for unknown users
    pub async fn watchlist(&self, user_id: &str) -> Result<Vec<WatchlistEntry>, ServiceError> {
        Ok(self
            .store
            .get_user(user_id)
            .await?
            .map(|versioned| versioned.record.watchlist)
            .unwrap_or_default())
    }

    /// A learner opened a course: add it to their watchlist or bump `last_accessed`.
    ///
    /// The stored list is loaded into a [`KeyedWatchlist`], so duplicates left by
    /// older writers are collapsed and progress recomputed in the same write.
    #[instrument(skip(self, snapshot), fields(course_id = %snapshot.course_id))]
    pub async fn open_course(&self, user_id: &str, snapshot: &CourseSnapshot) -> Result<OpenCourseReport, ServiceError> {
        for attempt in 1..=self.options.max_write_attempts {
            let current = self.store.get_user(user_id).await?;
            let (mut record, version) = match current {
                Some(versioned) => (versioned.record, Some(versioned.version)),
                None => (UserRecord::new(user_id), None),
            };
            let records = self.store.completions(user_id).await?;

            let now = (self.clock)();
            let (mut watchlist, repair) = KeyedWatchlist::from_entries(&record.watchlist, &records)?;
            let is_new_entry = watchlist.open_course(snapshot, &records, now)?;
            let entry = watchlist.get(&snapshot.course_id).cloned();

            if self.options.dry_run {
                return Ok(OpenCourseReport {
                    user_id: user_id.to_string(),
                    course_id: snapshot.course_id.clone(),
                    is_new_entry,
                    entry,
                    duplicates_removed: repair.duplicates_removed,
                    written: false,
                });
            }

            record.watchlist = watchlist.into_entries();
            record.updated_at = Some(now);
            match self.store.put_user(record, version).await {
                Ok(new_version) => {
                    info!(
                        operation = "open_course",
                        user_id,
                        is_new_entry,
                        duplicates_removed = repair.duplicates_removed,
                        version = new_version,
                        "Course opened"
                    );
                    return Ok(OpenCourseReport {
                        user_id: user_id.to_string(),
                        course_id: snapshot.course_id.clone(),
                        is_new_entry,
                        entry,
                        duplicates_removed: repair.duplicates_removed,
                        written: true,
                    });
                }
                Err(StoreError::VersionConflict { .. }) => {
                    warn!(operation = "open_course", user_id, attempt, "Concurrent write detected, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(ServiceError::WriteContention {
            user_id: user_id.to_string(),
            attempts: self.options.max_write_attempts,
        })
    }

    /// Reconcile one learner's stored watchlist, writing back only when something changed
    #[instrument(skip(self))]
    pub async fn reconcile_user(&self, user_id: &str) -> Result<ReconcileReport, ServiceError> {
        let start = Instant::now();

        for attempt in 1..=self.options.max_write_attempts {
            let Some(current) = self.store.get_user(user_id).await? else {
                debug!(operation = "reconcile_user", user_id, "No stored record, nothing to reconcile");
                return Ok(ReconcileReport {
                    user_id: user_id.to_string(),
                    entries: Vec::new(),
                    changed: false,
                    written: false,
                    duplicates_removed: 0,
                    recomputed: 0,
                    attempts: attempt,
                    duration: start.elapsed(),
                });
            };
            let records = self.store.completions(user_id).await?;
            let outcome = reconcile(&current.record.watchlist, &records)?;

            let mut report = ReconcileReport {
                user_id: user_id.to_string(),
                entries: outcome.entries.clone(),
                changed: outcome.changed,
                written: false,
                duplicates_removed: outcome.duplicates_removed,
                recomputed: outcome.recomputed,
                attempts: attempt,
                duration: start.elapsed(),
            };

            if !outcome.changed {
                debug!(operation = "reconcile_user", user_id, "Watchlist already consistent, skipping write");
                return Ok(report);
            }
            if self.options.dry_run {
                info!(
                    operation = "reconcile_user",
                    user_id,
                    duplicates_removed = outcome.duplicates_removed,
                    recomputed = outcome.recomputed,
                    "Dry run: changes not written"
                );
                return Ok(report);
            }

            let mut record = current.record;
            record.watchlist = outcome.entries;
            record.updated_at = Some((self.clock)());
            match self.store.put_user(record, Some(current.version)).await {
                Ok(version) => {
                    report.written = true;
                    report.duration = start.elapsed();
                    info!(
                        operation = "reconcile_user",
                        user_id,
                        version,
                        duplicates_removed = report.duplicates_removed,
                        recomputed = report.recomputed,
                        duration_ms = report.duration.as_millis() as u64,
                        "Watchlist reconciled"
                    );
                    return Ok(report);
                }
                Err(StoreError::VersionConflict { .. }) => {
                    warn!(operation = "reconcile_user", user_id, attempt, "Concurrent write detected, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(ServiceError::WriteContention {
            user_id: user_id.to_string(),
            attempts: self.options.max_write_attempts,
        })
    }

    /// Append a completion record; with `recompute_on_completion` the watchlist
    /// is refreshed immediately so dashboards never show stale progress.
    ///
    /// The refreshed watchlist is computed before the completion is appended, so
    /// a stored watchlist that fails validation leaves both documents untouched.
    #[instrument(skip(self, record), fields(course_id = %record.course_id, video_id = %record.video_id))]
    pub async fn record_completion(
        &self,
        user_id: &str,
        record: QuizCompletionRecord,
    ) -> Result<Option<ReconcileReport>, ServiceError> {
        validate_record(&record)?;

        if self.options.dry_run {
            info!(operation = "record_completion", user_id, "Dry run: completion not recorded");
            return Ok(None);
        }

        if !self.options.recompute_on_completion {
            self.store.append_completion(user_id, record).await?;
            return Ok(None);
        }

        let start = Instant::now();
        let current = self.store.get_user(user_id).await?;
        let mut records = self.store.completions(user_id).await?;
        let prepared = match current {
            Some(versioned) => {
                let (mut watchlist, repair) = KeyedWatchlist::from_entries(&versioned.record.watchlist, &records)?;
                records.push(record.clone());
                let refreshed = watchlist.apply_completion(&record, &records)?;
                Some((versioned, watchlist, repair, refreshed))
            }
            None => None,
        };

        self.store.append_completion(user_id, record).await?;

        let Some((versioned, watchlist, repair, refreshed)) = prepared else {
            return self.reconcile_user(user_id).await.map(Some);
        };

        let mut report = ReconcileReport {
            user_id: user_id.to_string(),
            entries: watchlist.entries().to_vec(),
            changed: repair.changed || refreshed,
            written: false,
            duplicates_removed: repair.duplicates_removed,
            recomputed: repair.recomputed + usize::from(refreshed),
            attempts: 1,
            duration: start.elapsed(),
        };
        if !report.changed {
            debug!(operation = "record_completion", user_id, "Watchlist unaffected by completion");
            return Ok(Some(report));
        }

        let mut user = versioned.record;
        user.watchlist = watchlist.into_entries();
        user.updated_at = Some((self.clock)());
        match self.store.put_user(user, Some(versioned.version)).await {
            Ok(version) => {
                report.written = true;
                report.duration = start.elapsed();
                info!(
                    operation = "record_completion",
                    user_id,
                    version,
                    refreshed,
                    duplicates_removed = report.duplicates_removed,
                    "Watchlist refreshed after completion"
                );
                Ok(Some(report))
            }
            Err(StoreError::VersionConflict { .. }) => {
                // The completion is already stored; a full pass over the fresh record picks it up
                warn!(operation = "record_completion", user_id, "Concurrent write detected, reconciling from scratch");
                self.reconcile_user(user_id).await.map(Some)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Reconcile every known learner. A failure for one user is reported in its
    /// `BatchItem` and does not stop the rest.
    pub async fn reconcile_all(&self) -> Result<Vec<BatchItem>, ServiceError> {
        let users = self.store.list_users().await?;
        info!(operation = "reconcile_all", users = users.len(), store = self.store.store_name(), "Starting batch reconciliation");

        let mut items = Vec::with_capacity(users.len());
        for user_id in users {
            let result = self.reconcile_user(&user_id).await;
            if let Err(ref e) = result {
                warn!(operation = "reconcile_all", user_id = %user_id, error = %e, "Reconciliation failed for user");
            }
            items.push(BatchItem { user_id, result });
        }
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use crate::store::{MemoryStore, Versioned};
    use async_trait::async_trait;
    use chrono::TimeZone;
    use learn_sync_models::WatchlistStatus;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap()
    }

    fn snapshot(course_id: &str, total_videos: i64) -> CourseSnapshot {
        CourseSnapshot {
            course_id: course_id.to_string(),
            title: "Async Rust".to_string(),
            description: "Futures and executors".to_string(),
            instructor_display_name: "Tokio".to_string(),
            thumbnail: String::new(),
            total_videos,
        }
    }

    fn completion(course_id: &str, video_id: &str) -> QuizCompletionRecord {
        QuizCompletionRecord {
            course_id: course_id.to_string(),
            video_id: video_id.to_string(),
            score: 80.0,
            completed_at: fixed_now(),
        }
    }

    fn service(store: Arc<MemoryStore>) -> WatchlistService<MemoryStore> {
        WatchlistService::new(store, ServiceOptions::default()).with_clock(fixed_now)
    }

    #[tokio::test]
    async fn test_open_course_creates_user_and_entry() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(store.clone());

        let report = svc.open_course("u1", &snapshot("c1", 4)).await.unwrap();
        assert!(report.is_new_entry);
        assert!(report.written);

        let stored = store.get_user("u1").await.unwrap().unwrap();
        assert_eq!(stored.version, 1);
        assert_eq!(stored.record.watchlist.len(), 1);
        assert_eq!(stored.record.watchlist[0].last_accessed, Some(fixed_now()));

        let again = svc.open_course("u1", &snapshot("c1", 4)).await.unwrap();
        assert!(!again.is_new_entry);
        assert_eq!(store.get_user("u1").await.unwrap().unwrap().record.watchlist.len(), 1);
    }

    #[tokio::test]
    async fn test_reconcile_skips_write_when_consistent() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(store.clone());
        svc.open_course("u1", &snapshot("c1", 4)).await.unwrap();

        let report = svc.reconcile_user("u1").await.unwrap();
        assert!(!report.changed);
        assert!(!report.written);
        assert_eq!(store.get_user("u1").await.unwrap().unwrap().version, 1);
    }

    #[tokio::test]
    async fn test_reconcile_repairs_duplicates_and_writes_once() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(store.clone());
        svc.open_course("u1", &snapshot("c1", 4)).await.unwrap();

        let mut stored = store.get_user("u1").await.unwrap().unwrap();
        let duplicate = stored.record.watchlist[0].clone();
        stored.record.watchlist.push(duplicate);
        store.put_user(stored.record, Some(stored.version)).await.unwrap();
        store.append_completion("u1", completion("c1", "v1")).await.unwrap();
        store.append_completion("u1", completion("c1", "v2")).await.unwrap();

        let report = svc.reconcile_user("u1").await.unwrap();
        assert!(report.changed);
        assert!(report.written);
        assert_eq!(report.duplicates_removed, 1);
        assert_eq!(report.entries.len(), 1);
        assert_eq!(report.entries[0].progress, 50);

        let second = svc.reconcile_user("u1").await.unwrap();
        assert!(!second.changed);
        assert!(!second.written);
    }

    #[tokio::test]
    async fn test_record_completion_recomputes_immediately() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(store.clone());
        svc.open_course("u1", &snapshot("c1", 1)).await.unwrap();

        let report = svc.record_completion("u1", completion("c1", "v1")).await.unwrap().unwrap();
        assert!(report.written);
        let entry = &svc.watchlist("u1").await.unwrap()[0];
        assert_eq!(entry.progress, 100);
        assert_eq!(entry.status, WatchlistStatus::Completed);
    }

    #[tokio::test]
    async fn test_record_completion_without_recompute() {
        let store = Arc::new(MemoryStore::new());
        let options = ServiceOptions {
            recompute_on_completion: false,
            ..ServiceOptions::default()
        };
        let svc = WatchlistService::new(store.clone(), options).with_clock(fixed_now);
        svc.open_course("u1", &snapshot("c1", 1)).await.unwrap();

        assert!(svc.record_completion("u1", completion("c1", "v1")).await.unwrap().is_none());
        assert_eq!(svc.watchlist("u1").await.unwrap()[0].progress, 0);
        assert_eq!(store.completions("u1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_dry_run_never_writes() {
        let store = Arc::new(MemoryStore::new());
        let mut svc = service(store.clone());
        svc.open_course("u1", &snapshot("c1", 2)).await.unwrap();
        store.append_completion("u1", completion("c1", "v1")).await.unwrap();

        svc.set_dry_run(true);
        let report = svc.reconcile_user("u1").await.unwrap();
        assert!(report.changed);
        assert!(!report.written);
        assert_eq!(store.get_user("u1").await.unwrap().unwrap().record.watchlist[0].progress, 0);
    }

    #[tokio::test]
    async fn test_invalid_record_leaves_store_untouched() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(store.clone());
        svc.open_course("u1", &snapshot("c1", 2)).await.unwrap();

        let mut stored = store.get_user("u1").await.unwrap().unwrap();
        stored.record.watchlist[0].total_videos = -1;
        store.put_user(stored.record.clone(), Some(stored.version)).await.unwrap();

        let err = svc.reconcile_user("u1").await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        let after = store.get_user("u1").await.unwrap().unwrap();
        assert_eq!(after.version, 2);
        assert_eq!(after.record, stored.record);
    }

    #[tokio::test]
    async fn test_broken_watchlist_rejects_completion_before_append() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(store.clone());
        svc.open_course("u1", &snapshot("c1", 2)).await.unwrap();

        let mut stored = store.get_user("u1").await.unwrap().unwrap();
        stored.record.watchlist[0].total_videos = -1;
        store.put_user(stored.record, Some(stored.version)).await.unwrap();

        let err = svc.record_completion("u1", completion("c1", "v1")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(ValidationError::NegativeCount { .. })));
        assert!(store.completions("u1").await.unwrap().is_empty());
        assert_eq!(store.get_user("u1").await.unwrap().unwrap().version, 2);
    }

    #[tokio::test]
    async fn test_record_completion_for_unknown_user_is_stored() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(store.clone());

        let report = svc.record_completion("u9", completion("c1", "v1")).await.unwrap().unwrap();
        assert!(!report.written);
        assert!(report.entries.is_empty());
        assert_eq!(store.completions("u9").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_open_course_repairs_stored_duplicates() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(store.clone());
        svc.open_course("u1", &snapshot("c1", 2)).await.unwrap();

        let mut stored = store.get_user("u1").await.unwrap().unwrap();
        let duplicate = stored.record.watchlist[0].clone();
        stored.record.watchlist.push(duplicate);
        store.put_user(stored.record, Some(stored.version)).await.unwrap();

        let report = svc.open_course("u1", &snapshot("c2", 3)).await.unwrap();
        assert!(report.is_new_entry);
        assert_eq!(report.duplicates_removed, 1);
        let ids: Vec<String> = svc.watchlist("u1").await.unwrap().into_iter().map(|e| e.course_id).collect();
        assert_eq!(ids, vec!["c1", "c2"]);
    }

    #[tokio::test]
    async fn test_zero_write_attempts_still_writes_once() {
        let store = Arc::new(MemoryStore::new());
        let options = ServiceOptions {
            max_write_attempts: 0,
            ..ServiceOptions::default()
        };
        let svc = WatchlistService::new(store.clone(), options).with_clock(fixed_now);
        assert_eq!(svc.options().max_write_attempts, 1);

        let report = svc.open_course("u1", &snapshot("c1", 2)).await.unwrap();
        assert!(report.written);
        assert_eq!(store.get_user("u1").await.unwrap().unwrap().version, 1);
    }

    #[tokio::test]
    async fn test_unknown_user_reconciles_to_nothing() {
        let svc = service(Arc::new(MemoryStore::new()));
        let report = svc.reconcile_user("ghost").await.unwrap();
        assert!(!report.changed);
        assert!(report.entries.is_empty());
        assert!(svc.watchlist("ghost").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reconcile_all_continues_past_failures() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(store.clone());
        svc.open_course("good", &snapshot("c1", 2)).await.unwrap();
        svc.open_course("bad", &snapshot("c1", 2)).await.unwrap();
        let mut broken = store.get_user("bad").await.unwrap().unwrap();
        broken.record.watchlist[0].progress = 250;
        store.put_user(broken.record, Some(broken.version)).await.unwrap();

        let items = svc.reconcile_all().await.unwrap();
        assert_eq!(items.len(), 2);
        let bad = items.iter().find(|i| i.user_id == "bad").unwrap();
        let good = items.iter().find(|i| i.user_id == "good").unwrap();
        assert!(bad.result.is_err());
        assert!(good.result.is_ok());
    }

    /// Store that injects a competing write before the first `put_user`
    struct RacingStore {
        inner: MemoryStore,
        races_left: AtomicU32,
    }

    #[async_trait]
    impl DocumentStore for RacingStore {
        fn store_name(&self) -> &str {
            "racing"
        }

        async fn get_user(&self, user_id: &str) -> Result<Option<Versioned<UserRecord>>, StoreError> {
            self.inner.get_user(user_id).await
        }

        async fn put_user(&self, record: UserRecord, expected_version: Option<u64>) -> Result<u64, StoreError> {
            if self.races_left.load(Ordering::SeqCst) > 0 {
                self.races_left.fetch_sub(1, Ordering::SeqCst);
                let current = self.inner.get_user(&record.user_id).await?;
                let mut competing = current.as_ref().map(|v| v.record.clone()).unwrap_or_else(|| UserRecord::new(&record.user_id));
                competing.updated_at = Some(Utc::now());
                self.inner.put_user(competing, current.map(|v| v.version)).await?;
            }
            self.inner.put_user(record, expected_version).await
        }

        async fn list_users(&self) -> Result<Vec<String>, StoreError> {
            self.inner.list_users().await
        }

        async fn completions(&self, user_id: &str) -> Result<Vec<QuizCompletionRecord>, StoreError> {
            self.inner.completions(user_id).await
        }

        async fn append_completion(&self, user_id: &str, record: QuizCompletionRecord) -> Result<(), StoreError> {
            self.inner.append_completion(user_id, record).await
        }
    }

    #[tokio::test]
    async fn test_version_conflict_is_retried() {
        let store = Arc::new(RacingStore {
            inner: MemoryStore::new(),
            races_left: AtomicU32::new(1),
        });
        let svc = WatchlistService::new(store.clone(), ServiceOptions::default()).with_clock(fixed_now);

        let report = svc.open_course("u1", &snapshot("c1", 3)).await.unwrap();
        assert!(report.written);
        let stored = store.get_user("u1").await.unwrap().unwrap();
        assert_eq!(stored.version, 2);
        assert_eq!(stored.record.watchlist.len(), 1);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let store = Arc::new(RacingStore {
            inner: MemoryStore::new(),
            races_left: AtomicU32::new(10),
        });
        let options = ServiceOptions {
            max_write_attempts: 2,
            ..ServiceOptions::default()
        };
        let svc = WatchlistService::new(store, options).with_clock(fixed_now);

        let err = svc.open_course("u1", &snapshot("c1", 3)).await.unwrap_err();
        assert!(matches!(err, ServiceError::WriteContention { attempts: 2, .. }));
    }

    #[tokio::test]
    async fn test_record_completion_conflict_falls_back_to_reconcile() {
        let store = Arc::new(RacingStore {
            inner: MemoryStore::new(),
            races_left: AtomicU32::new(0),
        });
        let svc = WatchlistService::new(store.clone(), ServiceOptions::default()).with_clock(fixed_now);
        svc.open_course("u1", &snapshot("c1", 1)).await.unwrap();

        store.races_left.store(1, Ordering::SeqCst);
        let report = svc.record_completion("u1", completion("c1", "v1")).await.unwrap().unwrap();
        assert!(report.written);
        assert_eq!(report.entries[0].progress, 100);
        assert_eq!(store.completions("u1").await.unwrap().len(), 1);

        let stored = store.get_user("u1").await.unwrap().unwrap();
        assert_eq!(stored.version, 3);
        assert_eq!(stored.record.watchlist[0].status, WatchlistStatus::Completed);
    }
}
