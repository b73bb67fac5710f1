use lesson_core::model::{GeneratedContent, QuizQuestion};
use lesson_core::script::backfill_display_script;

use crate::error::ProviderError;

/// Removes a surrounding Markdown code fence (```` ```json ... ``` ````), if present.
///
/// Text that is not entirely fenced, or whose fence is empty, is returned trimmed.
#[must_use]
pub fn strip_json_fence(text: &str) -> &str {
    let trimmed = text.trim();
    if trimmed.len() < 6 || !trimmed.starts_with("```") || !trimmed.ends_with("```") {
        return trimmed;
    }
    let inner = &trimmed[3..trimmed.len() - 3];
    let body = inner
        .trim_start_matches(|c: char| c.is_alphanumeric() || c == '_')
        .trim();
    if body.is_empty() { trimmed } else { body }
}

/// Parse lesson material and pin it to `item_key`.
///
/// The provider's own `itemKey` is discarded and `thaiScript` is backfilled from the
/// display-script rule chain.
///
/// # Errors
///
/// Returns `ProviderError::Malformed` if the text is not a JSON object.
pub fn parse_lesson_material(text: &str, item_key: &str) -> Result<GeneratedContent, ProviderError> {
    let mut content: GeneratedContent = serde_json::from_str(strip_json_fence(text))
        .map_err(|e| ProviderError::Malformed(e.to_string()))?;
    item_key.clone_into(&mut content.item_key);
    backfill_display_script(&mut content);
    Ok(content)
}

/// Parse a quiz question.
///
/// # Errors
///
/// Returns `ProviderError::Malformed` if required fields are missing or there are no options.
pub fn parse_quiz_question(text: &str) -> Result<QuizQuestion, ProviderError> {
    let quiz: QuizQuestion = serde_json::from_str(strip_json_fence(text))
        .map_err(|e| ProviderError::Malformed(e.to_string()))?;
    if quiz.options.is_empty() {
        return Err(ProviderError::Malformed("quiz has no options".into()));
    }
    Ok(quiz)
}
