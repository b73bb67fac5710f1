use async_trait::async_trait;
use lesson_core::model::{GeneratedContent, QuizOption, QuizQuestion};
use lesson_core::prompt::combined_form;
use lesson_core::script::backfill_display_script;

use super::ContentProvider;

const MISSING_KEY_LABEL: &str = "(API key missing)";

/// Deterministic stand-in material so lessons stay usable without credentials.
#[must_use]
pub fn placeholder_material(item_key: &str) -> GeneratedContent {
    let mut content = GeneratedContent {
        item_key: item_key.to_owned(),
        description: Some(format!("Sample description for {item_key} {MISSING_KEY_LABEL}")),
        example_word: Some(format!("example-{item_key}")),
        image_suggestion: Some(format!("A cute picture for {item_key}")),
        pronunciation: Some(format!("Sound of {item_key}")),
        combined_sound: item_key.contains('+').then(|| combined_form(item_key)),
        ..GeneratedContent::default()
    };
    backfill_display_script(&mut content);
    content
}

/// Deterministic stand-in quiz; the first option is correct.
#[must_use]
pub fn placeholder_quiz() -> QuizQuestion {
    QuizQuestion {
        question: format!("Sample question {MISSING_KEY_LABEL}"),
        options: vec![
            QuizOption {
                text: "Answer 1 (correct)".into(),
                correct: true,
            },
            QuizOption {
                text: "Answer 2".into(),
                correct: false,
            },
            QuizOption {
                text: "Answer 3".into(),
                correct: false,
            },
        ],
        explanation: Some(format!("This explanation is shown {MISSING_KEY_LABEL}")),
    }
}

/// Provider that always answers with placeholder content.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderProvider;

#[async_trait]
impl ContentProvider for PlaceholderProvider {
    async fn generate_lesson_material(
        &self,
        _prompt: &str,
        item_key: &str,
    ) -> Option<GeneratedContent> {
        Some(placeholder_material(item_key))
    }

    async fn generate_quiz_question(&self, _prompt: &str) -> Option<QuizQuestion> {
        Some(placeholder_quiz())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combination_placeholder_joins_parts() {
        let content = placeholder_material("ก+อะ");
        assert_eq!(content.combined_sound.as_deref(), Some("กอะ"));
        assert_eq!(content.display_script(), "กอะ");
        assert!(content.description.unwrap().contains(MISSING_KEY_LABEL));
    }

    #[test]
    fn vowel_placeholder_uses_diacritic_form() {
        assert_eq!(placeholder_material("อะ").display_script(), "◌ะ");
        assert_eq!(placeholder_material("แม่").display_script(), "แม่");
    }

    #[test]
    fn placeholder_quiz_first_option_correct() {
        let quiz = placeholder_quiz();
        assert_eq!(quiz.options.len(), 3);
        assert_eq!(quiz.is_correct(0), Some(true));
        assert_eq!(quiz.is_correct(1), Some(false));
    }

    #[tokio::test]
    async fn placeholder_provider_is_deterministic() {
        let provider = PlaceholderProvider;
        let a = provider.generate_lesson_material("p", "ข").await;
        let b = provider.generate_lesson_material("other", "ข").await;
        assert_eq!(a, b);
        assert!(provider.generate_quiz_question("q").await.is_some());
    }
}
