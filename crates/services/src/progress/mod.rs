mod overview;
mod store;

pub use overview::{LessonOverview, ProgressOverview};
pub use store::{CORRECT_ANSWER_POINTS, PROGRESS_KEY, ProgressStore};
