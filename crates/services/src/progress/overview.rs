use lesson_core::model::{LessonCatalog, LessonId, UserProgress};

/// One lesson's line on the profile screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonOverview {
    pub lesson_id: LessonId,
    pub title: String,
    pub completed: usize,
    pub total: usize,
    pub score: u32,
    pub unlocked: bool,
}

impl LessonOverview {
    /// Completion percentage, capped at 100 (completed items may outnumber a shrunk lesson).
    #[must_use]
    pub fn percent(&self) -> u8 {
        percent(self.completed, self.total)
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.completed >= self.total
    }
}

/// Totals across the whole catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressOverview {
    pub completed_items: usize,
    pub total_items: usize,
    pub total_score: u32,
    pub completed_lessons: usize,
    pub lesson_count: usize,
    pub lessons: Vec<LessonOverview>,
}

impl ProgressOverview {
    /// Summarize `progress` in catalog order. Item totals come from the stored
    /// `total_items`, which the load-time synchronization keeps current.
    #[must_use]
    pub fn build(catalog: &LessonCatalog, progress: &UserProgress) -> Self {
        let lessons: Vec<LessonOverview> = catalog
            .iter()
            .map(|lesson| {
                let stored = progress.get(lesson.id().as_str());
                LessonOverview {
                    lesson_id: lesson.id().clone(),
                    title: lesson.title().to_owned(),
                    completed: stored.map_or(0, |p| p.completed_count()),
                    total: stored.map_or(lesson.item_count(), |p| p.total_items()),
                    score: stored.map_or(0, |p| p.score()),
                    unlocked: stored.is_some_and(|p| p.unlocked()),
                }
            })
            .collect();

        Self {
            completed_items: lessons.iter().map(|l| l.completed).sum(),
            total_items: lessons.iter().map(|l| l.total).sum(),
            total_score: lessons
                .iter()
                .fold(0_u32, |acc, l| acc.saturating_add(l.score)),
            completed_lessons: lessons.iter().filter(|l| l.is_complete()).count(),
            lesson_count: catalog.len(),
            lessons,
        }
    }

    #[must_use]
    pub fn percent(&self) -> u8 {
        percent(self.completed_items, self.total_items)
    }
}

fn percent(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let pct = completed.min(total).saturating_mul(100) / total;
    u8::try_from(pct).unwrap_or(100)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lesson_core::sync::default_progress;

    #[test]
    fn empty_progress_overview() {
        let catalog = LessonCatalog::thai_starter();
        let overview = ProgressOverview::build(&catalog, &default_progress(&catalog));
        assert_eq!(overview.completed_items, 0);
        assert_eq!(overview.total_items, 17);
        assert_eq!(overview.total_score, 0);
        assert_eq!(overview.completed_lessons, 0);
        assert_eq!(overview.lesson_count, 4);
        assert_eq!(overview.percent(), 0);
        assert!(overview.lessons[0].unlocked);
        assert!(!overview.lessons[1].unlocked);
    }

    #[test]
    fn counts_completed_lessons_and_scores() {
        let catalog = LessonCatalog::thai_starter();
        let mut progress = default_progress(&catalog);
        for (i, item) in ["อะ", "อิ", "อุ"].iter().enumerate() {
            progress.record_item_completion("vowels1", item, i);
        }
        progress.record_item_completion("consonants1", "ก", 0);
        progress.award_score(&catalog, "vowels1", 10);
        progress.award_score(&catalog, "consonants1", 10);

        let overview = ProgressOverview::build(&catalog, &progress);
        assert_eq!(overview.completed_items, 4);
        assert_eq!(overview.total_score, 20);
        assert_eq!(overview.completed_lessons, 1);
        assert_eq!(overview.lessons[1].percent(), 100);
        assert_eq!(overview.lessons[0].percent(), 12);
    }
}
