//! Content provider: the external generative-text service that writes teaching material
//! and quiz questions.

mod config;
mod http;
mod parse;
mod placeholder;

use async_trait::async_trait;
use lesson_core::model::{GeneratedContent, QuizQuestion};

pub use config::ProviderConfig;
pub use http::GenerativeContentProvider;
pub use parse::{parse_lesson_material, parse_quiz_question, strip_json_fence};
pub use placeholder::{PlaceholderProvider, placeholder_material, placeholder_quiz};

/// Narrow contract the lesson runner depends on.
///
/// Failures are absorbed here: `None` means "nothing usable for this request" and the
/// caller decides how to recover.
#[async_trait]
pub trait ContentProvider: Send + Sync {
    /// Teaching material for `item_key`. The returned `item_key` always equals the input
    /// and `thai_script` is always filled.
    async fn generate_lesson_material(
        &self,
        prompt: &str,
        item_key: &str,
    ) -> Option<GeneratedContent>;

    async fn generate_quiz_question(&self, prompt: &str) -> Option<QuizQuestion>;
}
