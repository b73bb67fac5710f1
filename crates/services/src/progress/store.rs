use std::sync::Arc;

use lesson_core::model::{LessonCatalog, LessonProgress, UserProgress};
use lesson_core::sync::{default_progress, synchronize};
use storage::repository::{ProgressRecordRepository, StorageError};
use tracing::{debug, error, info, warn};

use super::overview::ProgressOverview;
use crate::Clock;

/// Storage key of the learner's progress record.
pub const PROGRESS_KEY: &str = "thaiLearningAdventureProgress_v1";

/// Points awarded for each correctly answered quiz question.
pub const CORRECT_ANSWER_POINTS: u32 = 10;

/// Durable per-lesson progress, kept in step with the lesson catalog.
///
/// Every mutation reloads the stored record first, so it never writes back a stale copy
/// held by a caller. Storage failures are logged and never returned: a missing or corrupt
/// record degrades to fresh default progress.
///
/// Writers that share one backend from separate processes are last-write-wins; there is
/// no version check on save.
#[derive(Clone)]
pub struct ProgressStore {
    clock: Clock,
    repo: Arc<dyn ProgressRecordRepository>,
    catalog: Arc<LessonCatalog>,
    key: String,
}

impl ProgressStore {
    #[must_use]
    pub fn new(
        clock: Clock,
        repo: Arc<dyn ProgressRecordRepository>,
        catalog: Arc<LessonCatalog>,
    ) -> Self {
        Self {
            clock,
            repo,
            catalog,
            key: PROGRESS_KEY.to_owned(),
        }
    }

    /// Use a different storage key, e.g. one per learner profile.
    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    #[must_use]
    pub fn catalog(&self) -> &LessonCatalog {
        &self.catalog
    }

    /// Read progress and synchronize it with the catalog, persisting only if the
    /// synchronization changed something.
    ///
    /// An absent or corrupt record is replaced by the default on disk. If the backend
    /// cannot be read at all, the default is returned for this call only and the stored
    /// record is left alone.
    pub async fn load(&self) -> UserProgress {
        self.read().await.progress
    }

    /// Write the whole record. Failures are logged; the in-memory value stays usable.
    pub async fn save(&self, progress: &UserProgress) {
        if let Err(err) = self
            .repo
            .save_progress(&self.key, progress, self.clock.now())
            .await
        {
            error!(key = %self.key, error = %err, "failed to save progress");
        }
    }

    pub async fn lesson_progress(&self, lesson_id: &str) -> Option<LessonProgress> {
        self.load().await.get(lesson_id).cloned()
    }

    pub async fn overview(&self) -> ProgressOverview {
        ProgressOverview::build(&self.catalog, &self.load().await)
    }

    /// Mark `item_key` of `lesson_id` completed and move the lesson cursor to `index`.
    pub async fn record_item_completion(
        &self,
        lesson_id: &str,
        item_key: &str,
        index: usize,
    ) -> UserProgress {
        let Snapshot {
            mut progress,
            writable,
        } = self.read().await;
        if progress.record_item_completion(lesson_id, item_key, index) {
            debug!(lesson_id, item_key, index, "item completed");
            self.save_if(writable, &progress).await;
        } else {
            warn!(lesson_id, "cannot record completion for unknown lesson");
        }
        progress
    }

    /// Add `points` to the lesson score and unlock the next lesson once every item of
    /// this one has been completed.
    pub async fn award_score_and_maybe_unlock_next(
        &self,
        lesson_id: &str,
        points: u32,
    ) -> UserProgress {
        let Snapshot {
            mut progress,
            writable,
        } = self.read().await;
        let outcome = progress.award_score(&self.catalog, lesson_id, points);
        if !outcome.awarded {
            warn!(lesson_id, "cannot award score for unknown lesson");
            return progress;
        }
        if let Some(next) = &outcome.unlocked_next {
            info!(lesson_id, unlocked = %next, "next lesson unlocked");
        }
        self.save_if(writable, &progress).await;
        progress
    }

    /// Drop all progress and start over.
    pub async fn reset(&self) -> UserProgress {
        if let Err(err) = self.repo.delete_progress(&self.key).await {
            error!(key = %self.key, error = %err, "failed to delete progress");
        }
        info!(key = %self.key, "progress reset");
        self.save_default().await
    }

    async fn read(&self) -> Snapshot {
        match self.repo.get_progress(&self.key).await {
            Ok(Some(stored)) => {
                let (synced, changed) = synchronize(stored, &self.catalog);
                if changed {
                    debug!(key = %self.key, "progress synchronized with catalog");
                    self.save(&synced).await;
                }
                Snapshot::stored(synced)
            }
            Ok(None) => {
                info!(key = %self.key, "no stored progress; starting fresh");
                Snapshot::stored(self.save_default().await)
            }
            Err(StorageError::Serialization(err)) => {
                warn!(key = %self.key, error = %err, "stored progress is corrupt; starting fresh");
                Snapshot::stored(self.save_default().await)
            }
            Err(err) => {
                warn!(key = %self.key, error = %err, "progress storage unreadable; using defaults for now");
                Snapshot {
                    progress: default_progress(&self.catalog),
                    writable: false,
                }
            }
        }
    }

    /// Persists `progress` only when it was derived from a record that was actually read.
    async fn save_if(&self, writable: bool, progress: &UserProgress) {
        if writable {
            self.save(progress).await;
        } else {
            warn!(key = %self.key, "skipping save; stored progress could not be read");
        }
    }

    async fn save_default(&self) -> UserProgress {
        let progress = default_progress(&self.catalog);
        self.save(&progress).await;
        progress
    }
}

/// Progress as read for one operation. `writable` is false when it is a stand-in
/// for a record the backend failed to return.
struct Snapshot {
    progress: UserProgress,
    writable: bool,
}

impl Snapshot {
    fn stored(progress: UserProgress) -> Self {
        Self {
            progress,
            writable: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lesson_core::model::{LessonDescriptor, LessonId, LessonKind};
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use lesson_core::time::{fixed_clock, fixed_now};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use storage::repository::InMemoryRepository;

    fn catalog() -> LessonCatalog {
        let lesson = |id: &str, items: &[&str]| {
            LessonDescriptor::new(
                id,
                id,
                "",
                LessonKind::Consonants,
                items.iter().map(|s| (*s).to_owned()).collect(),
            )
            .unwrap()
        };
        LessonCatalog::new(vec![
            lesson("A", &["x", "y"]),
            lesson("B", &["z"]),
            lesson("C", &["w"]),
        ])
        .unwrap()
    }

    /// Delegates to an in-memory repository, failing the next `n` reads.
    #[derive(Clone, Default)]
    struct FlakyReads {
        inner: InMemoryRepository,
        failing_reads: Arc<AtomicUsize>,
    }

    impl FlakyReads {
        fn fail_next_reads(&self, n: usize) {
            self.failing_reads.store(n, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl ProgressRecordRepository for FlakyReads {
        async fn get_progress(&self, key: &str) -> Result<Option<UserProgress>, StorageError> {
            let remaining = self.failing_reads.load(Ordering::SeqCst);
            if remaining > 0 {
                self.failing_reads.store(remaining - 1, Ordering::SeqCst);
                return Err(StorageError::Connection("database is locked".into()));
            }
            self.inner.get_progress(key).await
        }

        async fn save_progress(
            &self,
            key: &str,
            progress: &UserProgress,
            saved_at: DateTime<Utc>,
        ) -> Result<(), StorageError> {
            self.inner.save_progress(key, progress, saved_at).await
        }

        async fn delete_progress(&self, key: &str) -> Result<(), StorageError> {
            self.inner.delete_progress(key).await
        }
    }

    async fn complete_lesson_a(store: &ProgressStore) -> UserProgress {
        store.record_item_completion("A", "x", 0).await;
        store.record_item_completion("A", "y", 1).await;
        store.award_score_and_maybe_unlock_next("A", 10).await
    }

    fn store(repo: &InMemoryRepository) -> ProgressStore {
        ProgressStore::new(fixed_clock(), Arc::new(repo.clone()), Arc::new(catalog()))
    }

    #[tokio::test]
    async fn load_creates_and_persists_default() {
        let repo = InMemoryRepository::new();
        let progress = store(&repo).load().await;

        assert!(progress.is_unlocked("A"));
        assert!(!progress.is_unlocked("B"));
        assert!(repo.raw(PROGRESS_KEY).is_some());
        assert_eq!(repo.saved_at(PROGRESS_KEY), Some(fixed_now()));
    }

    #[tokio::test]
    async fn corrupt_record_degrades_to_default() {
        let repo = InMemoryRepository::new();
        repo.put_raw(PROGRESS_KEY, "{\"A\": 42");
        let progress = store(&repo).load().await;
        assert_eq!(progress, default_progress(&catalog()));
        assert!(repo.raw(PROGRESS_KEY).unwrap().contains("completedItems"));
    }

    #[tokio::test]
    async fn unavailable_storage_still_returns_progress() {
        let repo = InMemoryRepository::new();
        repo.set_unavailable(true);
        let store = store(&repo);

        let progress = store.load().await;
        assert!(progress.is_unlocked("A"));
        let progress = store.record_item_completion("A", "x", 0).await;
        assert_eq!(progress.get("A").unwrap().completed_count(), 1);
        let progress = store.reset().await;
        assert_eq!(progress, default_progress(&catalog()));
    }

    #[tokio::test]
    async fn load_twice_is_stable() {
        let repo = InMemoryRepository::new();
        let store = store(&repo);
        let first = store.load().await;
        let second = store.load().await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn load_repairs_locked_first_lesson() {
        let repo = InMemoryRepository::new();
        repo.put_raw(
            PROGRESS_KEY,
            r#"{"A":{"completedItems":[],"score":0,"unlocked":false,"lastItemIndex":0,"totalItems":2}}"#,
        );
        let progress = store(&repo).load().await;
        assert!(progress.is_unlocked("A"));
        assert!(progress.contains("B"));
        assert!(repo.raw(PROGRESS_KEY).unwrap().contains("\"B\""));
    }

    #[tokio::test]
    async fn completion_is_idempotent_and_cursor_follows_index() {
        let repo = InMemoryRepository::new();
        let store = store(&repo);
        store.record_item_completion("A", "y", 1).await;
        let progress = store.record_item_completion("A", "y", 0).await;

        let lesson = progress.get("A").unwrap();
        assert_eq!(lesson.completed_count(), 1);
        assert_eq!(lesson.last_item_index(), 0);
        assert_eq!(store.lesson_progress("A").await.as_ref(), Some(lesson));
    }

    #[tokio::test]
    async fn unlocks_next_after_full_completion() {
        let repo = InMemoryRepository::new();
        let store = store(&repo);
        store.record_item_completion("A", "x", 0).await;
        store.record_item_completion("A", "y", 1).await;
        let progress = store.award_score_and_maybe_unlock_next("A", 10).await;

        let a = progress.get("A").unwrap();
        assert_eq!(a.completed_count(), 2);
        assert!(a.has_completed("x") && a.has_completed("y"));
        assert_eq!(a.score(), 10);
        assert!(progress.is_unlocked("B"));
        assert!(!progress.is_unlocked("C"));
    }

    #[tokio::test]
    async fn score_accumulates_without_unlock_when_incomplete() {
        let repo = InMemoryRepository::new();
        let store = store(&repo);
        store.record_item_completion("A", "x", 0).await;
        store.award_score_and_maybe_unlock_next("A", 10).await;
        let progress = store.award_score_and_maybe_unlock_next("A", 5).await;

        assert_eq!(progress.get("A").unwrap().score(), 15);
        assert!(!progress.is_unlocked("B"));
    }

    #[tokio::test]
    async fn unlock_uses_catalog_item_count_not_stored_total() {
        let repo = InMemoryRepository::new();
        repo.put_raw(
            PROGRESS_KEY,
            r#"{"A":{"completedItems":["x"],"score":0,"unlocked":true,"lastItemIndex":0,"totalItems":1}}"#,
        );
        let progress = store(&repo).award_score_and_maybe_unlock_next("A", 10).await;
        assert!(!progress.is_unlocked("B"));
    }

    #[tokio::test]
    async fn reset_restores_defaults() {
        let repo = InMemoryRepository::new();
        let store = store(&repo);
        store.record_item_completion("A", "x", 0).await;
        store.record_item_completion("A", "y", 1).await;
        store.award_score_and_maybe_unlock_next("A", 10).await;

        let progress = store.reset().await;
        for (id, lesson) in progress.iter() {
            assert!(lesson.completed_items().is_empty());
            assert_eq!(lesson.score(), 0);
            assert_eq!(lesson.unlocked(), id == &LessonId::new("A"));
        }
        assert_eq!(store.load().await, progress);
    }

    #[tokio::test]
    async fn unknown_lesson_leaves_progress_untouched() {
        let repo = InMemoryRepository::new();
        let store = store(&repo);
        let before = store.load().await;
        let after = store.record_item_completion("missing", "x", 0).await;
        assert_eq!(before, after);
        let after = store.award_score_and_maybe_unlock_next("missing", 10).await;
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn custom_key_is_isolated() {
        let repo = InMemoryRepository::new();
        let other = store(&repo).with_key("learner-2");
        other.record_item_completion("A", "x", 0).await;
        assert!(repo.raw("learner-2").is_some());
        assert!(repo.raw(PROGRESS_KEY).is_none());
    }

    #[tokio::test]
    async fn failed_read_does_not_overwrite_stored_progress() {
        let repo = FlakyReads::default();
        let store = ProgressStore::new(fixed_clock(), Arc::new(repo.clone()), Arc::new(catalog()));
        let before = complete_lesson_a(&store).await;
        assert!(before.is_unlocked("B"));

        repo.fail_next_reads(1);
        assert_eq!(store.load().await, default_progress(&catalog()));

        let after = store.load().await;
        assert_eq!(after, before);
        assert_eq!(after.get("A").unwrap().score(), 10);
        assert!(after.is_unlocked("B"));
    }

    #[tokio::test]
    async fn mutation_during_failed_read_is_not_persisted() {
        let repo = FlakyReads::default();
        let store = ProgressStore::new(fixed_clock(), Arc::new(repo.clone()), Arc::new(catalog()));
        let before = complete_lesson_a(&store).await;

        repo.fail_next_reads(1);
        let scratch = store.award_score_and_maybe_unlock_next("A", 5).await;
        assert_eq!(scratch.get("A").unwrap().score(), 5);
        repo.fail_next_reads(1);
        let scratch = store.record_item_completion("C", "w", 0).await;
        assert_eq!(scratch.get("C").unwrap().completed_count(), 1);

        assert_eq!(store.load().await, before);
    }
}
