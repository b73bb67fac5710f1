//! Picks the script shown for a generated item.
//!
//! Providers are inconsistent about which field carries the Thai script, so the
//! display script is resolved by walking `DISPLAY_SCRIPT_RULES` top to bottom and taking
//! the first rule that yields a non-blank value. New item categories get a new rule.

use crate::model::GeneratedContent;

/// A named fallback step.
#[derive(Clone, Copy)]
pub struct ScriptRule {
    pub name: &'static str,
    pub resolve: fn(&GeneratedContent) -> Option<String>,
}

/// Vowels that are only diacritics; shown on a dotted-circle carrier.
const DIACRITIC_FORMS: &[(&str, &str)] = &[("อะ", "◌ะ"), ("อิ", "◌ิ"), ("อุ", "◌ุ")];

pub const DISPLAY_SCRIPT_RULES: &[ScriptRule] = &[
    ScriptRule {
        name: "thai_script",
        resolve: |content| content.thai_script.clone(),
    },
    ScriptRule {
        name: "character",
        resolve: |content| content.character.clone(),
    },
    ScriptRule {
        name: "diacritic_form",
        resolve: |content| diacritic_form(&content.item_key).map(str::to_owned),
    },
    ScriptRule {
        name: "combined_sound",
        resolve: |content| content.combined_sound.clone(),
    },
    ScriptRule {
        name: "item_key",
        resolve: |content| Some(content.item_key.clone()),
    },
];

/// Display form of a diacritic-only vowel item, if `item_key` is one.
#[must_use]
pub fn diacritic_form(item_key: &str) -> Option<&'static str> {
    DIACRITIC_FORMS
        .iter()
        .find(|(key, _)| *key == item_key)
        .map(|(_, form)| *form)
}

#[must_use]
pub fn resolve_display_script(content: &GeneratedContent) -> String {
    resolve_with(DISPLAY_SCRIPT_RULES, content)
}

#[must_use]
pub fn resolve_with(rules: &[ScriptRule], content: &GeneratedContent) -> String {
    rules
        .iter()
        .filter_map(|rule| (rule.resolve)(content))
        .find(|value| !value.trim().is_empty())
        .unwrap_or_else(|| content.item_key.clone())
}

/// Fills `thai_script` in place from the rule chain.
pub fn backfill_display_script(content: &mut GeneratedContent) {
    content.thai_script = Some(resolve_display_script(content));
}
