mod catalog;
mod content;
mod ids;
mod lesson;
mod progress;

pub use catalog::{CatalogError, LessonCatalog};
pub use content::{GeneratedContent, QuizOption, QuizQuestion};
pub use ids::LessonId;
pub use lesson::{LessonDescriptor, LessonKind};
pub use progress::{AwardOutcome, LessonProgress, UserProgress};
