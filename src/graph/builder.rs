//! Graph construction from prompt templates.

use std::collections::BTreeSet;

use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::core::{DeckId, SmartFieldType, SmartFieldsError};
use crate::note::NoteFields;
use crate::prompts::{FieldExtras, PromptMap, prompt_fields};
use crate::resolver::FieldPayload;

use super::{FieldGraph, FieldNode};

/// Build the dependency graph of generatable fields for one note.
///
/// Creates a [`FieldNode`] for every field that exists on the note type
/// *and* has a configured template, then wires producer→consumer edges by
/// scanning each template for `{{field}}` references. References to fields
/// without their own template are pure inputs, not dependencies, and
/// contribute no edge; so do references to fields the note type lacks
/// (whether such references are *valid* is [`prompt_has_error`]'s concern,
/// not the builder's).
///
/// When `target_field` is set the graph is trimmed to the target and its
/// transitive inputs before returning, and every non-target node that
/// survives is marked [`generate_despite_manual`](FieldNode::generate_despite_manual).
///
/// An empty graph is a normal result meaning "nothing to generate" - it is
/// returned when the note type has no prompts at all or none of its fields
/// carry one. The only error case is a `target_field` that names a field
/// without a template.
///
/// [`prompt_has_error`]: super::prompt_has_error
pub fn build_graph(
    note: &dyn NoteFields,
    prompt_map: &PromptMap,
    config: &EngineConfig,
    overwrite_fields: bool,
    deck_id: DeckId,
    target_field: Option<&str>,
) -> Result<FieldGraph, SmartFieldsError> {
    debug!("building field graph for note {}", note.id());

    let prompts = prompt_map.prompts_for_note(note.note_type(), deck_id);
    if prompts.is_empty() {
        debug!("no prompts configured for note type '{}'", note.note_type());
        return Ok(FieldGraph::default());
    }

    let target = target_field.map(str::to_lowercase);
    let mut graph = FieldGraph::default();

    // Iterate the note's fields rather than the prompt map to capture the
    // canonical capitalization for later writes.
    for display_field in note.field_names() {
        let field = display_field.to_lowercase();
        let Some(template) = prompts.get(&field) else {
            continue;
        };

        let extras = match prompt_map.extras_for_field(note.note_type(), &field, deck_id) {
            Some(extras) => extras,
            None => {
                warn!("templated field '{field}' has no settings entry, using defaults");
                FieldExtras::default()
            }
        };

        let existing_value = note.get_field(&display_field).unwrap_or_default();
        graph.insert(FieldNode {
            field: field.clone(),
            is_target: target.as_deref() == Some(field.as_str()),
            display_field,
            existing_value,
            in_edges: Vec::new(),
            out_edges: Vec::new(),
            is_manual: !extras.automatic,
            overwrite: overwrite_fields,
            generate_despite_manual: false,
            payload: payload_for(template, &extras, config),
            deck_id,
            aborted: false,
            did_update: false,
        });
    }

    if graph.is_empty() {
        debug!("none of the note's fields carry a template");
        return Ok(graph);
    }

    for (field, template) in &prompts {
        if !graph.contains(field) {
            continue;
        }
        for input in prompt_fields(template) {
            if graph.contains(&input) {
                graph.add_edge(&input, field);
            }
        }
    }

    match target {
        Some(target) => prune_to_target(graph, &target),
        None => Ok(graph),
    }
}

/// Trim the graph to `target` plus its transitive inputs.
///
/// Walks backward over `in_edges` from the target; everything reached is
/// kept and forced past its manual flag. The target itself is not forced -
/// being the target already authorizes generation, and the distinction
/// matters to the scheduler's overwrite rule. Edges pointing out of the
/// kept set are dropped so the pruned graph stays symmetric.
fn prune_to_target(graph: FieldGraph, target: &str) -> Result<FieldGraph, SmartFieldsError> {
    let Some(target_node) = graph.get(target) else {
        return Err(SmartFieldsError::TargetNotFound {
            field: target.to_string(),
        });
    };

    let mut keep: BTreeSet<String> = BTreeSet::new();
    keep.insert(target.to_string());
    let mut explore: Vec<String> = target_node.in_edges.clone();
    while let Some(current) = explore.pop() {
        if !keep.insert(current.clone()) {
            continue;
        }
        if let Some(node) = graph.get(&current) {
            explore.extend(node.in_edges.iter().cloned());
        }
    }

    let mut pruned = FieldGraph::default();
    for (field, mut node) in graph.into_nodes() {
        if !keep.contains(&field) {
            continue;
        }
        if field != target {
            node.generate_despite_manual = true;
        }
        node.out_edges.retain(|consumer| keep.contains(consumer));
        pruned.insert(node);
    }

    debug!("pruned graph to target '{target}' and {} inputs", pruned.len() - 1);
    Ok(pruned)
}

/// Resolve a field's generation payload from its extras, falling back to
/// the global configuration for any option without a custom override.
fn payload_for(template: &str, extras: &FieldExtras, config: &EngineConfig) -> FieldPayload {
    let custom = extras.use_custom_model;
    match extras.field_type {
        SmartFieldType::Chat => FieldPayload::Chat {
            prompt: template.to_string(),
            provider: custom
                .then_some(extras.chat_provider)
                .flatten()
                .unwrap_or(config.chat_provider),
            model: custom
                .then(|| extras.chat_model.clone())
                .flatten()
                .unwrap_or_else(|| config.chat_model.clone()),
            temperature: custom
                .then_some(extras.chat_temperature)
                .flatten()
                .unwrap_or(config.chat_temperature),
        },
        SmartFieldType::Tts => FieldPayload::Tts {
            input: template.to_string(),
            provider: custom
                .then_some(extras.tts_provider)
                .flatten()
                .unwrap_or(config.tts_provider),
            model: custom
                .then(|| extras.tts_model.clone())
                .flatten()
                .unwrap_or_else(|| config.tts_model.clone()),
            voice: custom
                .then(|| extras.tts_voice.clone())
                .flatten()
                .unwrap_or_else(|| config.tts_voice.clone()),
        },
        SmartFieldType::Image => FieldPayload::Image {
            prompt: template.to_string(),
            provider: custom
                .then_some(extras.image_provider)
                .flatten()
                .unwrap_or(config.image_provider),
            model: custom
                .then(|| extras.image_model.clone())
                .flatten()
                .unwrap_or_else(|| config.image_model.clone()),
        },
    }
}
