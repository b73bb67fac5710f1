use crate::progress::ProgressStore;

use super::state::Navigation;

/// The lesson after `lesson_id` if it is unlocked, otherwise home.
///
/// Reads fresh progress so an unlock earned moments ago is seen.
pub async fn next_destination(store: &ProgressStore, lesson_id: &str) -> Navigation {
    let Some(next) = store.catalog().next_after(lesson_id) else {
        return Navigation::Home;
    };
    let next_id = next.id().clone();
    if store.load().await.is_unlocked(next_id.as_str()) {
        Navigation::Lesson(next_id)
    } else {
        Navigation::Home
    }
}

/// Index to resume a lesson at: the stored cursor when it is still valid, else the start.
#[must_use]
pub fn initial_index(last_item_index: usize, item_count: usize) -> usize {
    if last_item_index < item_count {
        last_item_index
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use lesson_core::model::{LessonCatalog, LessonId};
    use lesson_core::time::fixed_clock;
    use storage::repository::InMemoryRepository;

    #[test]
    fn stale_cursor_clamps_to_start() {
        assert_eq!(initial_index(7, 3), 0);
        assert_eq!(initial_index(3, 3), 0);
        assert_eq!(initial_index(2, 3), 2);
    }

    #[tokio::test]
    async fn destination_depends_on_unlock() {
        let repo = InMemoryRepository::new();
        let store = ProgressStore::new(
            fixed_clock(),
            Arc::new(repo),
            Arc::new(LessonCatalog::thai_starter()),
        );

        assert_eq!(next_destination(&store, "consonants1").await, Navigation::Home);

        for (i, item) in ["ก", "ข", "ค", "ฆ", "ง", "จ", "ฉ", "ช"].iter().enumerate() {
            store.record_item_completion("consonants1", item, i).await;
        }
        store.award_score_and_maybe_unlock_next("consonants1", 10).await;
        assert_eq!(
            next_destination(&store, "consonants1").await,
            Navigation::Lesson(LessonId::new("vowels1"))
        );
        assert_eq!(next_destination(&store, "vocabulary1").await, Navigation::Home);
        assert_eq!(next_destination(&store, "missing").await, Navigation::Home);
    }
}
