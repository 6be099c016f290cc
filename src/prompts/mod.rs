//! Prompt templates: configuration model, indexing, and interpolation.
//!
//! Prompts are configured per note type and per deck. The host stores the
//! whole configuration as one JSON document, modeled here as [`PromptMap`]:
//!
//! ```text
//! note_types -> note type name -> deck id (string) -> { fields, extras }
//! ```
//!
//! Deck `"0"` is the synthetic global scope
//! ([`DeckId::GLOBAL`](crate::core::DeckId)); deck-specific entries
//! override it field by field. All lookups are case-insensitive over field
//! names - the host preserves whatever casing the user typed, so every
//! accessor lowercases on the way in.
//!
//! Templates reference other fields with double-curly placeholders:
//! `Translate {{Front}} into German`. [`prompt_fields`] extracts the
//! referenced names and [`interpolate_prompt`] substitutes current note
//! values, with a policy switch for how empty references are handled.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use regex::Regex;

use crate::config::{ChatProvider, ImageProvider, TtsProvider};
use crate::core::{DeckId, SmartFieldType};
use crate::note::{NoteFields, field_value_ci};

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{\{(.+?)\}\}").unwrap());

/// Per-field generation settings stored alongside each template.
///
/// The `use_custom_model` switch gates the per-type overrides: when it is
/// off, the overrides are cleared and the global
/// [`EngineConfig`](crate::config::EngineConfig) defaults apply.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FieldExtras {
    /// Which generation capability fills this field.
    #[serde(rename = "type")]
    pub field_type: SmartFieldType,
    /// Whether the field generates during normal (non-target) runs.
    /// Non-automatic fields only generate when explicitly requested.
    pub automatic: bool,
    /// Whether the per-field overrides below are in effect.
    pub use_custom_model: bool,

    /// Chat provider override.
    pub chat_provider: Option<ChatProvider>,
    /// Chat model override.
    pub chat_model: Option<String>,
    /// Chat temperature override.
    pub chat_temperature: Option<u8>,

    /// Text-to-speech provider override.
    pub tts_provider: Option<TtsProvider>,
    /// Text-to-speech model override.
    pub tts_model: Option<String>,
    /// Text-to-speech voice override.
    pub tts_voice: Option<String>,

    /// Image provider override.
    pub image_provider: Option<ImageProvider>,
    /// Image model override.
    pub image_model: Option<String>,
}

impl Default for FieldExtras {
    fn default() -> Self {
        Self {
            field_type: SmartFieldType::Chat,
            automatic: true,
            use_custom_model: false,
            chat_provider: None,
            chat_model: None,
            chat_temperature: None,
            tts_provider: None,
            tts_model: None,
            tts_voice: None,
            image_provider: None,
            image_model: None,
        }
    }
}

impl FieldExtras {
    /// Drop every per-type override unless custom models are enabled.
    fn normalized(mut self) -> Self {
        if !self.use_custom_model {
            self.chat_provider = None;
            self.chat_model = None;
            self.chat_temperature = None;
            self.tts_provider = None;
            self.tts_model = None;
            self.tts_voice = None;
            self.image_provider = None;
            self.image_model = None;
        }
        self
    }
}

/// Templates and extras for one note type within one deck scope.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DeckPrompts {
    /// Field name (canonical casing) to prompt template.
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
    /// Field name to per-field settings.
    #[serde(default)]
    pub extras: BTreeMap<String, FieldExtras>,
}

impl DeckPrompts {
    fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// The full prompt configuration, as persisted by the host.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PromptMap {
    /// Note type name to deck scope (stringified deck id) to prompts.
    #[serde(default)]
    pub note_types: BTreeMap<String, BTreeMap<String, DeckPrompts>>,
}

impl PromptMap {
    /// All templates that apply to a note of the given type in the given
    /// deck, keyed by lowercase field name.
    ///
    /// Deck-specific prompts win; global-scope prompts fill in the rest.
    /// Returns an empty map when nothing is configured - callers must
    /// treat that as "nothing to generate", not an error.
    pub fn prompts_for_note(&self, note_type: &str, deck_id: DeckId) -> BTreeMap<String, String> {
        let Some(scopes) = self.note_types.get(note_type) else {
            return BTreeMap::new();
        };

        let mut merged: BTreeMap<String, String> = scopes
            .get(&deck_id.to_string())
            .map(|deck| {
                deck.fields.iter().map(|(f, t)| (f.to_lowercase(), t.clone())).collect()
            })
            .unwrap_or_default();

        if let Some(global) = scopes.get(&DeckId::GLOBAL.to_string()) {
            for (field, template) in &global.fields {
                merged.entry(field.to_lowercase()).or_insert_with(|| template.clone());
            }
        }

        merged
    }

    /// Per-field settings for one field, falling back to the global deck
    /// scope. `None` for plain (non-generated) fields.
    pub fn extras_for_field(
        &self,
        note_type: &str,
        field: &str,
        deck_id: DeckId,
    ) -> Option<FieldExtras> {
        let scopes = self.note_types.get(note_type)?;
        let lower = field.to_lowercase();

        let lookup = |scope: DeckId| -> Option<FieldExtras> {
            scopes
                .get(&scope.to_string())?
                .extras
                .iter()
                .find(|(name, _)| name.to_lowercase() == lower)
                .map(|(_, extras)| extras.clone())
        };

        lookup(deck_id).or_else(|| lookup(DeckId::GLOBAL))
    }

    /// Install or replace the prompt for one field in one deck scope,
    /// creating note-type and deck scaffolding as needed.
    ///
    /// Extras are normalized on the way in: per-type overrides are cleared
    /// unless `use_custom_model` is set.
    pub fn set_prompt(
        &mut self,
        note_type: &str,
        deck_id: DeckId,
        field: &str,
        template: &str,
        extras: FieldExtras,
    ) {
        let deck = self
            .note_types
            .entry(note_type.to_string())
            .or_default()
            .entry(deck_id.to_string())
            .or_default();

        deck.fields.insert(field.to_string(), template.to_string());
        deck.extras.insert(field.to_string(), extras.normalized());
    }

    /// Remove one field's prompt from one deck scope, pruning empty deck
    /// and note-type entries afterwards.
    pub fn remove_prompt(&mut self, note_type: &str, deck_id: DeckId, field: &str) {
        let lower = field.to_lowercase();
        let Some(scopes) = self.note_types.get_mut(note_type) else {
            return;
        };

        if let Some(deck) = scopes.get_mut(&deck_id.to_string()) {
            deck.fields.retain(|name, _| name.to_lowercase() != lower);
            deck.extras.retain(|name, _| name.to_lowercase() != lower);
            if deck.is_empty() {
                scopes.remove(&deck_id.to_string());
            }
        }

        if scopes.is_empty() {
            self.note_types.remove(note_type);
        }
    }

    /// Smart fields whose template references another smart field's
    /// output, lowercase. Hosts use this to warn before operations that
    /// would regenerate a whole dependency chain.
    pub fn chained_fields(&self, note_type: &str, deck_id: DeckId) -> BTreeSet<String> {
        let prompts = self.prompts_for_note(note_type, deck_id);
        let mut chained = BTreeSet::new();

        for (field, template) in &prompts {
            let references_smart_field = prompt_fields(template)
                .iter()
                .any(|input| input != field && prompts.contains_key(input));
            if references_smart_field {
                chained.insert(field.clone());
            }
        }

        chained
    }
}

/// Extract the field names referenced by a template, lowercased, in order
/// of appearance. Duplicate references are preserved.
pub fn prompt_fields(template: &str) -> Vec<String> {
    PLACEHOLDER
        .captures_iter(template)
        .map(|caps| caps[1].to_lowercase())
        .collect()
}

/// Substitute current note values into a template, case-insensitively.
///
/// Returns `None` when the prompt should not be sent at all:
/// - every referenced field is empty, or
/// - some referenced field is empty and `allow_empty` is false.
///
/// A template with no placeholders passes through unchanged. References to
/// fields the note does not have substitute as empty strings.
pub fn interpolate_prompt(
    template: &str,
    note: &dyn NoteFields,
    allow_empty: bool,
) -> Option<String> {
    let fields = prompt_fields(template);
    if fields.is_empty() {
        return Some(template.to_string());
    }

    let values: Vec<String> = fields.iter().map(|f| field_value_ci(note, f)).collect();
    let any_filled = values.iter().any(|v| !v.is_empty());
    let all_filled = values.iter().all(|v| !v.is_empty());

    if !any_filled || !(allow_empty || all_filled) {
        tracing::debug!("prompt has empty referenced fields, skipping interpolation");
        return None;
    }

    let substituted = PLACEHOLDER.replace_all(template, |caps: &regex::Captures<'_>| {
        field_value_ci(note, &caps[1].to_lowercase())
    });
    Some(substituted.into_owned())
}
