use serde::{Deserialize, Serialize};

use crate::model::catalog::CatalogError;
use crate::model::content::GeneratedContent;
use crate::model::ids::LessonId;
use crate::prompt;

/// What a lesson teaches; selects the prompt shape sent to the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LessonKind {
    Consonants,
    Vowels,
    Combinations,
    Vocabulary,
    Sentences,
}

impl LessonKind {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            LessonKind::Consonants => "consonants",
            LessonKind::Vowels => "vowels",
            LessonKind::Combinations => "combinations",
            LessonKind::Vocabulary => "vocabulary",
            LessonKind::Sentences => "sentences",
        }
    }
}

/// Immutable description of one lesson: its ordered items and whether it ends in a quiz.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonDescriptor {
    id: LessonId,
    title: String,
    description: String,
    kind: LessonKind,
    items: Vec<String>,
    has_activity: bool,
}

impl LessonDescriptor {
    /// Creates a lesson with an end-of-lesson activity.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::EmptyLessonId` for a blank id and
    /// `CatalogError::EmptyItems` when `items` is empty.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        kind: LessonKind,
        items: Vec<String>,
    ) -> Result<Self, CatalogError> {
        let id = id.into().trim().to_owned();
        if id.is_empty() {
            return Err(CatalogError::EmptyLessonId);
        }
        if items.is_empty() {
            return Err(CatalogError::EmptyItems { id });
        }

        Ok(Self {
            id: LessonId::new(id),
            title: title.into(),
            description: description.into(),
            kind,
            items,
            has_activity: true,
        })
    }

    #[must_use]
    pub fn without_activity(mut self) -> Self {
        self.has_activity = false;
        self
    }

    #[must_use]
    pub fn id(&self) -> &LessonId {
        &self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn kind(&self) -> LessonKind {
        self.kind
    }

    #[must_use]
    pub fn items(&self) -> &[String] {
        &self.items
    }

    #[must_use]
    pub fn item(&self, index: usize) -> Option<&str> {
        self.items.get(index).map(String::as_str)
    }

    #[must_use]
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn last_index(&self) -> usize {
        self.items.len().saturating_sub(1)
    }

    #[must_use]
    pub fn has_activity(&self) -> bool {
        self.has_activity
    }

    /// Prompt asking the provider for teaching material about `item`.
    #[must_use]
    pub fn material_prompt(&self, item: &str) -> String {
        prompt::material_prompt(self.kind, item)
    }

    /// Prompt for the end-of-lesson quiz, or `None` when the lesson has no activity.
    #[must_use]
    pub fn activity_prompt(&self, item: &str, taught: &GeneratedContent) -> Option<String> {
        self.has_activity
            .then(|| prompt::activity_prompt(self.kind, item, taught))
    }
}
