//! Prompt validation, used when saving a prompt from the host's editor.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use tracing::warn;

use crate::config::EngineConfig;
use crate::constants::FIELD_SUGGESTION_THRESHOLD;
use crate::core::{DeckId, SmartFieldsError};
use crate::note::NoteFields;
use crate::prompts::{PromptMap, prompt_fields};

use super::{FieldGraph, build_graph, has_cycle};

/// Check a candidate prompt template for configuration mistakes.
///
/// `prompt_map` must already contain the candidate template under
/// `target_field` (callers validate a modified copy of their map before
/// committing it), so the cycle check sees the graph as it would be after
/// saving.
///
/// Returns the first violated rule's message, or `None` when the template
/// is acceptable:
/// 1. every referenced field must exist on the note type,
/// 2. referenced fields must be chat-typed - speech and image fields have
///    no interpolatable text output,
/// 3. the template must not reference the field it generates,
/// 4. the resulting dependency graph must be acyclic.
pub fn prompt_has_error(
    template: &str,
    note: &dyn NoteFields,
    deck_id: DeckId,
    target_field: Option<&str>,
    prompt_map: &PromptMap,
    config: &EngineConfig,
) -> Option<String> {
    let note_fields: BTreeSet<String> =
        note.field_names().iter().map(|f| f.to_lowercase()).collect();
    let references = prompt_fields(template);

    for input in &references {
        if !note_fields.contains(input) {
            return Some(match closest_field(input, &note_fields) {
                Some(suggestion) => {
                    format!("Invalid field in prompt: {input}. Did you mean '{suggestion}'?")
                }
                None => format!("Invalid field in prompt: {input}"),
            });
        }

        let referenceable = prompt_map
            .extras_for_field(note.note_type(), input, deck_id)
            .is_none_or(|extras| extras.field_type.is_referenceable());
        if !referenceable {
            return Some("Cannot reference text-to-speech or image fields in prompts".to_string());
        }
    }

    if let Some(target) = target_field {
        let target_lower = target.to_lowercase();
        if references.iter().any(|input| *input == target_lower) {
            return Some("Cannot reference the target field in the prompt".to_string());
        }
    }

    let graph = build_graph(note, prompt_map, config, false, deck_id, None).unwrap_or_else(|e| {
        warn!("prompt validation could not build a graph: {e}");
        FieldGraph::default()
    });
    if has_cycle(&graph) {
        return Some(SmartFieldsError::CircularPrompts.to_string());
    }

    None
}

/// The closest existing field name to a misspelled reference, if any is
/// close enough to be worth suggesting.
fn closest_field(input: &str, fields: &BTreeSet<String>) -> Option<String> {
    fields
        .iter()
        .map(|field| (strsim::jaro_winkler(input, field), field))
        .filter(|(score, _)| *score >= FIELD_SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal))
        .map(|(_, field)| field.clone())
}
