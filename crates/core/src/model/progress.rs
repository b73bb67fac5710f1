use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::model::catalog::LessonCatalog;
use crate::model::ids::LessonId;

/// Progress through a single lesson.
///
/// Missing fields in a stored record fall back to their defaults, which is how older
/// records are patched forward.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LessonProgress {
    completed_items: BTreeSet<String>,
    score: u32,
    unlocked: bool,
    last_item_index: usize,
    total_items: usize,
}

impl LessonProgress {
    #[must_use]
    pub fn fresh(total_items: usize, unlocked: bool) -> Self {
        Self {
            completed_items: BTreeSet::new(),
            score: 0,
            unlocked,
            last_item_index: 0,
            total_items,
        }
    }

    #[must_use]
    pub fn completed_items(&self) -> &BTreeSet<String> {
        &self.completed_items
    }

    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.completed_items.len()
    }

    #[must_use]
    pub fn has_completed(&self, item_key: &str) -> bool {
        self.completed_items.contains(item_key)
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn unlocked(&self) -> bool {
        self.unlocked
    }

    #[must_use]
    pub fn last_item_index(&self) -> usize {
        self.last_item_index
    }

    #[must_use]
    pub fn total_items(&self) -> usize {
        self.total_items
    }

    /// Whether every item counted by the stored `total_items` has been seen.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.total_items > 0 && self.completed_items.len() >= self.total_items
    }

    /// Marks `item_key` completed and moves the cursor to `index`.
    ///
    /// The cursor follows the item currently on screen, so it may move backwards.
    /// Returns `true` if the key was not yet completed.
    pub fn record_item(&mut self, item_key: &str, index: usize) -> bool {
        self.last_item_index = index;
        self.completed_items.insert(item_key.to_owned())
    }

    pub fn add_score(&mut self, points: u32) {
        self.score = self.score.saturating_add(points);
    }

    /// Unlocks the lesson. Returns `true` if it was locked before. There is no way back.
    pub fn unlock(&mut self) -> bool {
        !std::mem::replace(&mut self.unlocked, true)
    }

    /// Returns `true` if the value changed.
    pub fn set_total_items(&mut self, total_items: usize) -> bool {
        if self.total_items == total_items {
            return false;
        }
        self.total_items = total_items;
        true
    }
}

/// What `UserProgress::award_score` did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AwardOutcome {
    /// `false` when the lesson has no progress entry.
    pub awarded: bool,
    pub unlocked_next: Option<LessonId>,
}

/// Progress for every lesson, keyed by lesson id. Persisted as one record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserProgress {
    lessons: BTreeMap<LessonId, LessonProgress>,
}

impl UserProgress {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, lesson_id: &str) -> Option<&LessonProgress> {
        self.lessons.get(lesson_id)
    }

    pub fn get_mut(&mut self, lesson_id: &str) -> Option<&mut LessonProgress> {
        self.lessons.get_mut(lesson_id)
    }

    pub fn insert(&mut self, lesson_id: LessonId, progress: LessonProgress) {
        self.lessons.insert(lesson_id, progress);
    }

    #[must_use]
    pub fn contains(&self, lesson_id: &str) -> bool {
        self.lessons.contains_key(lesson_id)
    }

    #[must_use]
    pub fn is_unlocked(&self, lesson_id: &str) -> bool {
        self.get(lesson_id).is_some_and(LessonProgress::unlocked)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&LessonId, &LessonProgress)> {
        self.lessons.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lessons.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lessons.is_empty()
    }

    /// Records that `item_key` at `index` was taught. Returns `false` for an unknown lesson.
    pub fn record_item_completion(&mut self, lesson_id: &str, item_key: &str, index: usize) -> bool {
        match self.get_mut(lesson_id) {
            Some(progress) => {
                progress.record_item(item_key, index);
                true
            }
            None => false,
        }
    }

    /// Adds `points` to the lesson score, then unlocks the next catalog lesson when every
    /// item of this lesson (as counted by the catalog, not the stored total) is completed.
    pub fn award_score(
        &mut self,
        catalog: &LessonCatalog,
        lesson_id: &str,
        points: u32,
    ) -> AwardOutcome {
        let Some(progress) = self.get_mut(lesson_id) else {
            return AwardOutcome::default();
        };
        progress.add_score(points);
        let completed = progress.completed_count();

        let mut outcome = AwardOutcome {
            awarded: true,
            unlocked_next: None,
        };
        let Some(lesson) = catalog.get(lesson_id) else {
            return outcome;
        };
        if completed < lesson.item_count() {
            return outcome;
        }
        if let Some(next) = catalog.next_after(lesson_id) {
            if let Some(next_progress) = self.get_mut(next.id().as_str()) {
                if next_progress.unlock() {
                    outcome.unlocked_next = Some(next.id().clone());
                }
            }
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LessonDescriptor, LessonKind};
    use crate::sync::default_progress;

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
        LessonCatalog::new(vec![lesson("A", &["x", "y"]), lesson("B", &["z"])]).unwrap()
    }

    #[test]
    fn record_item_is_idempotent_and_cursor_follows_view() {
        let mut progress = LessonProgress::fresh(3, true);
        assert!(progress.record_item("x", 2));
        assert!(!progress.record_item("x", 0));
        assert_eq!(progress.completed_count(), 1);
        assert_eq!(progress.last_item_index(), 0);
    }

    #[test]
    fn unlock_is_one_way() {
        let mut progress = LessonProgress::fresh(1, false);
        assert!(progress.unlock());
        assert!(!progress.unlock());
        assert!(progress.unlocked());
    }

    #[test]
    fn award_unlocks_next_only_when_all_items_completed() {
        let catalog = catalog();
        let mut progress = default_progress(&catalog);

        progress.record_item_completion("A", "x", 0);
        let outcome = progress.award_score(&catalog, "A", 10);
        assert!(outcome.awarded);
        assert_eq!(outcome.unlocked_next, None);
        assert!(!progress.is_unlocked("B"));

        progress.record_item_completion("A", "y", 1);
        let outcome = progress.award_score(&catalog, "A", 10);
        assert_eq!(outcome.unlocked_next, Some(LessonId::new("B")));
        assert!(progress.is_unlocked("B"));
        assert_eq!(progress.get("A").unwrap().score(), 20);

        let outcome = progress.award_score(&catalog, "A", 0);
        assert_eq!(outcome.unlocked_next, None);
    }

    #[test]
    fn award_on_last_lesson_or_unknown_lesson() {
        let catalog = catalog();
        let mut progress = default_progress(&catalog);
        progress.record_item_completion("B", "z", 0);
        let outcome = progress.award_score(&catalog, "B", 5);
        assert!(outcome.awarded);
        assert_eq!(outcome.unlocked_next, None);

        let outcome = progress.award_score(&catalog, "missing", 5);
        assert!(!outcome.awarded);
    }

    #[test]
    fn serializes_in_record_shape() {
        let mut progress = UserProgress::new();
        let mut lesson = LessonProgress::fresh(2, true);
        lesson.record_item("x", 1);
        progress.insert(LessonId::new("A"), lesson);

        let json = serde_json::to_value(&progress).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "A": {
                    "completedItems": ["x"],
                    "score": 0,
                    "unlocked": true,
                    "lastItemIndex": 1,
                    "totalItems": 2
                }
            })
        );
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let progress: UserProgress =
            serde_json::from_str(r#"{"A":{"completedItems":["x","x"],"unlocked":true}}"#).unwrap();
        let lesson = progress.get("A").unwrap();
        assert_eq!(lesson.completed_count(), 1);
        assert_eq!(lesson.score(), 0);
        assert_eq!(lesson.total_items(), 0);
    }
}
