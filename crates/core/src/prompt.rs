//! Prompt builders for the content provider.
//!
//! Every prompt asks for a bare JSON object with a fixed key set so the response can be
//! deserialized into `GeneratedContent` or `QuizQuestion`.

use crate::model::{GeneratedContent, LessonKind};
use crate::script::diacritic_form;

const MATERIAL_KEYS: &[&str] = &[
    "itemKey",
    "thaiScript",
    "description",
    "exampleWord",
    "imageSuggestion",
    "pronunciation",
];
const COMBINATION_KEYS: &[&str] = &[
    "itemKey",
    "thaiScript",
    "combinedSound",
    "description",
    "exampleWord",
    "imageSuggestion",
    "pronunciation",
];
const WORD_KEYS: &[&str] = &[
    "itemKey",
    "thaiScript",
    "description",
    "sentence",
    "imageSuggestion",
    "pronunciation",
];
const QUIZ_KEYS: &[&str] = &["question", "options", "explanation"];

fn json_prompt(instruction: &str, keys: &[&str]) -> String {
    format!(
        "{instruction} Please respond strictly with a JSON object. The JSON object must only \
         contain the following keys: {}. Ensure the response is a valid JSON.",
        keys.join(", ")
    )
}

/// Splits a combination item such as `ก+อะ` into its parts.
#[must_use]
pub fn combination_parts(item: &str) -> (&str, &str) {
    item.split_once('+').unwrap_or((item, ""))
}

/// Joins a combination item into the written syllable (`ก+อะ` becomes `กอะ`).
#[must_use]
pub fn combined_form(item: &str) -> String {
    item.split('+').collect()
}

#[must_use]
pub fn material_prompt(kind: LessonKind, item: &str) -> String {
    match kind {
        LessonKind::Consonants => json_prompt(
            &format!(
                "Generate teaching material for a 5-year-old about the Thai consonant '{item}'. \
                 Include: 1. A simple description of '{item}'. 2. An example word starting with \
                 '{item}' (1 word). 3. A description for a cute illustration related to the \
                 example word. 4. The phonetic sound of the consonant '{item}' (e.g. 'Gor Gai'). \
                 Ensure itemKey is '{item}' and thaiScript is '{item}'."
            ),
            MATERIAL_KEYS,
        ),
        LessonKind::Vowels => {
            let script = diacritic_form(item).unwrap_or(item);
            json_prompt(
                &format!(
                    "Generate teaching material for a 5-year-old about the Thai vowel '{item}'. \
                     Include: 1. A simple description of the vowel '{item}'. 2. An example word \
                     containing the vowel '{item}' (1 word). 3. A description for a cute \
                     illustration related to the example word. 4. The phonetic sound of the \
                     vowel '{item}'. Ensure itemKey is '{item}' and thaiScript is '{script}'."
                ),
                MATERIAL_KEYS,
            )
        }
        LessonKind::Combinations => {
            let (consonant, vowel) = combination_parts(item);
            let combined = combined_form(item);
            json_prompt(
                &format!(
                    "Generate teaching material for a 5-year-old about combining the Thai \
                     consonant '{consonant}' with the vowel '{vowel}'. Include: 1. The resulting \
                     combined sound/syllable. 2. A simple explanation. 3. An example word \
                     containing this combination (1 word). 4. A description for a cute \
                     illustration related to the example word. 5. The phonetic sound of the \
                     combined syllable. Ensure itemKey is '{item}' and thaiScript is '{combined}'."
                ),
                COMBINATION_KEYS,
            )
        }
        LessonKind::Vocabulary => json_prompt(
            &format!(
                "Generate teaching material for a 5-year-old about the Thai vocabulary word \
                 '{item}'. Include: 1. A simple explanation of the meaning of '{item}'. 2. A \
                 simple sentence using '{item}' (1 sentence). 3. A description for a cute \
                 illustration related to '{item}'. 4. The phonetic sound of '{item}'. Ensure \
                 itemKey is '{item}' and thaiScript is '{item}'."
            ),
            WORD_KEYS,
        ),
        LessonKind::Sentences => json_prompt(
            &format!(
                "Generate teaching material for a 5-year-old about the short Thai sentence \
                 '{item}'. Include: 1. A simple explanation of what it means. 2. The sentence \
                 itself. 3. A description for a cute illustration of the sentence. 4. How to \
                 pronounce it. Ensure itemKey is '{item}' and thaiScript is '{item}'."
            ),
            WORD_KEYS,
        ),
    }
}

#[must_use]
pub fn activity_prompt(kind: LessonKind, item: &str, taught: &GeneratedContent) -> String {
    let example = taught.example_word.as_deref().unwrap_or(item);
    let instruction = match kind {
        LessonKind::Consonants | LessonKind::Vowels => {
            let noun = if kind == LessonKind::Consonants {
                "consonant"
            } else {
                "vowel"
            };
            format!(
                "A 5-year-old has just learned about the {noun} '{item}' and the word \
                 '{example}'. Create one multiple-choice question to test their understanding. \
                 Include one correct option and two incorrect options. The question should be \
                 about '{item}' or '{example}'. Provide a brief explanation for the correct answer."
            )
        }
        LessonKind::Combinations => {
            let syllable = taught
                .combined_sound
                .as_deref()
                .or(taught.thai_script.as_deref())
                .unwrap_or(item);
            format!(
                "A 5-year-old has just learned about combining to make '{syllable}' and the \
                 word '{example}'. Create one multiple-choice question. Include one correct \
                 option and two incorrect options. The question should be about '{syllable}' or \
                 '{example}'. Provide a brief explanation."
            )
        }
        LessonKind::Vocabulary | LessonKind::Sentences => {
            let sentence = taught.sentence.as_deref().unwrap_or(item);
            format!(
                "A 5-year-old has just learned the word '{item}' and the sentence '{sentence}'. \
                 Create one multiple-choice question to test their understanding of the word \
                 '{item}'. Include one correct option and two incorrect options. Provide a \
                 brief explanation."
            )
        }
    };
    json_prompt(&instruction, QUIZ_KEYS)
}
