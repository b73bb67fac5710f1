#![forbid(unsafe_code)]

pub mod app_services;
pub mod error;
pub mod lessons;
pub mod progress;
pub mod provider;

pub use lesson_core::Clock;

pub use app_services::AppServices;
pub use error::{AppServicesError, ProviderConfigError, ProviderError, RunnerError};
pub use lessons::{
    ActivityPhase, Advance, AnswerOutcome, LessonRunner, Navigation, RunnerState, next_destination,
};
pub use progress::{
    CORRECT_ANSWER_POINTS, LessonOverview, PROGRESS_KEY, ProgressOverview, ProgressStore,
};
pub use provider::{ContentProvider, GenerativeContentProvider, PlaceholderProvider};
