//! Lesson flow: the per-lesson state machine and where it sends the learner afterwards.

mod navigation;
mod runner;
mod state;

pub use navigation::{initial_index, next_destination};
pub use runner::{ItemFetch, LessonRunner, QuizFetch};
pub use state::{ActivityPhase, Advance, AnswerOutcome, Navigation, RunnerState};
