use std::collections::HashSet;

use thiserror::Error;

use crate::model::ids::LessonId;
use crate::model::lesson::{LessonDescriptor, LessonKind};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("catalog must contain at least one lesson")]
    Empty,

    #[error("lesson id cannot be empty")]
    EmptyLessonId,

    #[error("duplicate lesson id: {id}")]
    DuplicateLesson { id: String },

    #[error("lesson {id} has no items")]
    EmptyItems { id: String },
}

/// Ordered, read-only list of lessons. Order drives unlocking: finishing lesson `n`
/// unlocks lesson `n + 1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonCatalog {
    lessons: Vec<LessonDescriptor>,
}

impl LessonCatalog {
    /// Builds a catalog from lessons in teaching order.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Empty` for an empty list and
    /// `CatalogError::DuplicateLesson` if two lessons share an id.
    pub fn new(lessons: Vec<LessonDescriptor>) -> Result<Self, CatalogError> {
        if lessons.is_empty() {
            return Err(CatalogError::Empty);
        }
        let mut seen = HashSet::with_capacity(lessons.len());
        for lesson in &lessons {
            if !seen.insert(lesson.id().as_str()) {
                return Err(CatalogError::DuplicateLesson {
                    id: lesson.id().to_string(),
                });
            }
        }
        Ok(Self { lessons })
    }

    /// The four starter lessons: consonants, vowels, combinations, vocabulary.
    ///
    /// # Panics
    ///
    /// Panics if the built-in lesson table is invalid.
    #[must_use]
    pub fn thai_starter() -> Self {
        let lesson = |id: &str, title: &str, description: &str, kind, items: &[&str]| {
            LessonDescriptor::new(
                id,
                title,
                description,
                kind,
                items.iter().map(|s| (*s).to_owned()).collect(),
            )
            .expect("built-in lesson should be valid")
        };

        Self::new(vec![
            lesson(
                "consonants1",
                "Lesson 1: Thai consonants (ก-ช)",
                "The first eight Thai consonants: ก, ข, ค, ฆ, ง, จ, ฉ, ช",
                LessonKind::Consonants,
                &["ก", "ข", "ค", "ฆ", "ง", "จ", "ฉ", "ช"],
            ),
            lesson(
                "vowels1",
                "Lesson 2: Thai vowels (อะ, อิ, อุ)",
                "The first three Thai vowels: sara a, sara i, sara u",
                LessonKind::Vowels,
                &["อะ", "อิ", "อุ"],
            ),
            lesson(
                "combinations1",
                "Lesson 3: Building syllables (ก + vowel)",
                "Combine ก, ข, ค with the vowels อะ, อิ, อุ",
                LessonKind::Combinations,
                &["ก+อะ", "ข+อิ", "ค+อุ"],
            ),
            lesson(
                "vocabulary1",
                "Lesson 4: First words (แม่, พ่อ, บ้าน)",
                "Everyday words for home and family",
                LessonKind::Vocabulary,
                &["แม่", "พ่อ", "บ้าน"],
            ),
        ])
        .expect("built-in catalog should be valid")
    }

    #[must_use]
    pub fn first(&self) -> &LessonDescriptor {
        // `new` rejects empty catalogs.
        &self.lessons[0]
    }

    #[must_use]
    pub fn is_first(&self, id: &LessonId) -> bool {
        self.first().id() == id
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&LessonDescriptor> {
        self.lessons.iter().find(|lesson| lesson.id().as_str() == id)
    }

    #[must_use]
    pub fn position(&self, id: &str) -> Option<usize> {
        self.lessons
            .iter()
            .position(|lesson| lesson.id().as_str() == id)
    }

    /// The lesson immediately after `id` in catalog order, if any.
    #[must_use]
    pub fn next_after(&self, id: &str) -> Option<&LessonDescriptor> {
        self.position(id).and_then(|pos| self.lessons.get(pos + 1))
    }

    pub fn iter(&self) -> impl Iterator<Item = &LessonDescriptor> {
        self.lessons.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lessons.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lessons.is_empty()
    }
}
