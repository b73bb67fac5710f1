use serde::{Deserialize, Serialize};

/// Teaching material for one lesson item, as produced by the content provider.
///
/// Never persisted. `item_key` always names the item being taught; the provider's own
/// value for it is overwritten on arrival.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GeneratedContent {
    pub item_key: String,
    pub character: Option<String>,
    pub description: Option<String>,
    pub example_word: Option<String>,
    pub image_suggestion: Option<String>,
    pub pronunciation: Option<String>,
    pub combined_sound: Option<String>,
    pub sentence: Option<String>,
    pub thai_script: Option<String>,
}

impl GeneratedContent {
    #[must_use]
    pub fn for_item(item_key: impl Into<String>) -> Self {
        Self {
            item_key: item_key.into(),
            ..Self::default()
        }
    }

    /// Script shown large on screen; falls back to the item key.
    #[must_use]
    pub fn display_script(&self) -> &str {
        self.thai_script
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(&self.item_key)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizOption {
    pub text: String,
    #[serde(default)]
    pub correct: bool,
}

/// One multiple-choice question for the end-of-lesson activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<QuizOption>,
    #[serde(default)]
    pub explanation: Option<String>,
}

impl QuizQuestion {
    /// Single "close" option stand-in used when no question could be produced.
    #[must_use]
    pub fn closed(question: impl Into<String>, explanation: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            options: vec![QuizOption {
                text: "Close".into(),
                correct: false,
            }],
            explanation: Some(explanation.into()),
        }
    }

    /// Whether the option at `index` is marked correct; `None` for an unknown index.
    #[must_use]
    pub fn is_correct(&self, index: usize) -> Option<bool> {
        self.options.get(index).map(|option| option.correct)
    }
}
