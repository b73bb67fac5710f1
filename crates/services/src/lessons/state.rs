use lesson_core::model::LessonId;

/// Sub-state of the end-of-lesson activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityPhase {
    Loading,
    Ready,
    /// The question could not be fetched; a single-option stand-in is shown.
    Error,
}

/// Where a `LessonRunner` is within its lesson. Item states carry the item index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerState {
    /// The lesson is not unlocked; the caller must navigate away.
    Locked,
    Loading(usize),
    Ready(usize),
    Error(usize),
    Activity(ActivityPhase),
    Done,
}

impl RunnerState {
    #[must_use]
    pub fn item_index(self) -> Option<usize> {
        match self {
            RunnerState::Loading(i) | RunnerState::Ready(i) | RunnerState::Error(i) => Some(i),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_loading(self) -> bool {
        matches!(
            self,
            RunnerState::Loading(_) | RunnerState::Activity(ActivityPhase::Loading)
        )
    }

    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, RunnerState::Locked | RunnerState::Done)
    }
}

/// Where the learner should be sent when a lesson ends or cannot be shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Home,
    Lesson(LessonId),
}

/// Result of moving forward from a ready item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    /// Now loading the item at this index.
    Item(usize),
    /// Now loading the end-of-lesson question.
    Activity,
    /// The lesson had no activity and is over.
    Finished(Navigation),
}

/// Result of answering the activity question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub option: usize,
    pub correct: bool,
    pub points_awarded: u32,
    pub explanation: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_index_only_for_item_states() {
        assert_eq!(RunnerState::Loading(2).item_index(), Some(2));
        assert_eq!(RunnerState::Error(0).item_index(), Some(0));
        assert_eq!(RunnerState::Activity(ActivityPhase::Ready).item_index(), None);
        assert_eq!(RunnerState::Done.item_index(), None);
    }

    #[test]
    fn loading_and_terminal_flags() {
        assert!(RunnerState::Activity(ActivityPhase::Loading).is_loading());
        assert!(!RunnerState::Ready(0).is_loading());
        assert!(RunnerState::Locked.is_terminal());
        assert!(!RunnerState::Error(1).is_terminal());
    }
}
