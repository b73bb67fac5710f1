//! Reconciles stored progress with the current lesson catalog.
//!
//! Runs on every load so that lessons added to the catalog show up, item counts follow
//! catalog edits, and the first lesson is always playable. Entries for lessons that left
//! the catalog are kept as-is.

use crate::model::{LessonCatalog, LessonProgress, UserProgress};

/// Progress for a learner who has done nothing yet: only the first lesson unlocked.
#[must_use]
pub fn default_progress(catalog: &LessonCatalog) -> UserProgress {
    let mut progress = UserProgress::new();
    for lesson in catalog.iter() {
        progress.insert(
            lesson.id().clone(),
            LessonProgress::fresh(lesson.item_count(), catalog.is_first(lesson.id())),
        );
    }
    progress
}

/// Returns the synchronized progress and whether anything had to change.
///
/// `completed_items` is never truncated when a lesson shrinks, so it may exceed
/// `total_items` afterwards.
#[must_use]
pub fn synchronize(mut stored: UserProgress, catalog: &LessonCatalog) -> (UserProgress, bool) {
    let mut changed = false;

    for lesson in catalog.iter() {
        let is_first = catalog.is_first(lesson.id());
        match stored.get_mut(lesson.id().as_str()) {
            None => {
                stored.insert(
                    lesson.id().clone(),
                    LessonProgress::fresh(lesson.item_count(), is_first),
                );
                changed = true;
            }
            Some(progress) => {
                changed |= progress.set_total_items(lesson.item_count());
                if is_first {
                    changed |= progress.unlock();
                }
            }
        }
    }

    (stored, changed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LessonDescriptor, LessonId, LessonKind};

    fn lesson(id: &str, items: &[&str]) -> LessonDescriptor {
        LessonDescriptor::new(
            id,
            id,
            "",
            LessonKind::Vowels,
            items.iter().map(|s| (*s).to_owned()).collect(),
        )
        .unwrap()
    }

    fn catalog() -> LessonCatalog {
        LessonCatalog::new(vec![lesson("A", &["x", "y"]), lesson("B", &["z"])]).unwrap()
    }

    #[test]
    fn default_unlocks_only_first() {
        let progress = default_progress(&catalog());
        assert_eq!(progress.len(), 2);
        assert!(progress.is_unlocked("A"));
        assert!(!progress.is_unlocked("B"));
        assert_eq!(progress.get("A").unwrap().total_items(), 2);
    }

    #[test]
    fn adds_missing_lessons() {
        let mut stored = UserProgress::new();
        stored.insert(LessonId::new("A"), LessonProgress::fresh(2, true));
        let (synced, changed) = synchronize(stored, &catalog());
        assert!(changed);
        assert!(synced.contains("B"));
        assert!(!synced.is_unlocked("B"));
    }

    #[test]
    fn refreshes_total_items_without_truncating() {
        let mut stored = default_progress(&catalog());
        {
            let a = stored.get_mut("A").unwrap();
            a.record_item("x", 0);
            a.record_item("y", 1);
            a.record_item("old", 2);
            a.set_total_items(5);
        }
        let (synced, changed) = synchronize(stored, &catalog());
        assert!(changed);
        let a = synced.get("A").unwrap();
        assert_eq!(a.total_items(), 2);
        assert_eq!(a.completed_count(), 3);
    }

    #[test]
    fn forces_first_lesson_unlocked() {
        let mut stored = UserProgress::new();
        stored.insert(LessonId::new("A"), LessonProgress::fresh(2, false));
        stored.insert(LessonId::new("B"), LessonProgress::fresh(1, false));
        let (synced, changed) = synchronize(stored, &catalog());
        assert!(changed);
        assert!(synced.is_unlocked("A"));
    }

    #[test]
    fn is_idempotent() {
        let (once, _) = synchronize(UserProgress::new(), &catalog());
        let (twice, changed) = synchronize(once.clone(), &catalog());
        assert!(!changed);
        assert_eq!(once, twice);
    }

    #[test]
    fn keeps_lessons_removed_from_catalog() {
        let mut stored = default_progress(&catalog());
        stored.insert(LessonId::new("retired"), LessonProgress::fresh(4, true));
        let (synced, changed) = synchronize(stored, &catalog());
        assert!(!changed);
        assert!(synced.contains("retired"));
    }
}
