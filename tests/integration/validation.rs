//! Prompt validation flows, as exercised when the user saves a prompt.

use smartfields::config::EngineConfig;
use smartfields::core::{DeckId, NoteId};
use smartfields::graph::{build_graph, has_cycle, prompt_has_error};
use smartfields::prompts::FieldExtras;

use crate::common::{NOTE_TYPE, note_with, prompt_map};

#[tokio::test]
async fn test_acyclic_template_sets_pass_the_cycle_check() {
    let note = note_with(NoteId(1), &[("f1", "1"), ("f2", "2"), ("f3", ""), ("f4", "")]);
    let sets: &[&[(&str, &str)]] = &[
        &[("f3", "{{f1}}"), ("f4", "{{f2}}")],
        &[("f2", "{{f1}}"), ("f3", "{{f2}}"), ("f4", "{{f3}}")],
        // Diamond: shared input, shared output, no loop.
        &[("f2", "{{f1}}"), ("f3", "{{f1}}"), ("f4", "{{f2}} {{f3}}")],
    ];

    for templates in sets {
        let map = prompt_map(templates, &[]);
        let graph = build_graph(&note, &map, &EngineConfig::default(), true, DeckId::GLOBAL, None)
            .unwrap();
        assert!(!has_cycle(&graph), "unexpected cycle for {templates:?}");
    }
}

#[tokio::test]
async fn test_reference_loop_fails_the_cycle_check() {
    let note = note_with(NoteId(1), &[("f1", "1"), ("f2", "2"), ("f3", ""), ("f4", "")]);
    let map = prompt_map(&[("f2", "{{f1}} {{f4}}"), ("f3", "{{f2}}"), ("f4", "{{f3}}")], &[]);
    let graph =
        build_graph(&note, &map, &EngineConfig::default(), true, DeckId::GLOBAL, None).unwrap();
    assert!(has_cycle(&graph));
}

#[tokio::test]
async fn test_saving_a_prompt_that_closes_a_loop_is_rejected() {
    let note = note_with(NoteId(1), &[("f1", "1"), ("f2", ""), ("f3", "")]);

    // Existing config: f3 depends on f2. The user now edits f2 to
    // reference f3; validation sees the candidate map with the edit
    // already applied.
    let mut candidate = prompt_map(&[("f3", "{{f2}}")], &[]);
    candidate.set_prompt(NOTE_TYPE, DeckId::GLOBAL, "f2", "{{f3}}", FieldExtras::default());

    let error = prompt_has_error(
        "{{f3}}",
        &note,
        DeckId::GLOBAL,
        Some("f2"),
        &candidate,
        &EngineConfig::default(),
    )
    .unwrap();
    assert!(error.contains("cycle"));
}

#[tokio::test]
async fn test_saving_a_valid_prompt_passes() {
    let note = note_with(NoteId(1), &[("f1", "1"), ("f2", ""), ("f3", "")]);
    let mut candidate = prompt_map(&[("f3", "{{f2}}")], &[]);
    candidate.set_prompt(NOTE_TYPE, DeckId::GLOBAL, "f2", "{{f1}}", FieldExtras::default());

    let error = prompt_has_error(
        "{{f1}}",
        &note,
        DeckId::GLOBAL,
        Some("f2"),
        &candidate,
        &EngineConfig::default(),
    );
    assert_eq!(error, None);
}

#[tokio::test]
async fn test_misspelled_reference_gets_a_suggestion() {
    let note = note_with(NoteId(1), &[("Translation", ""), ("Sentence", "x")]);
    let map = prompt_map(&[], &[]);

    let error = prompt_has_error(
        "{{sentnce}}",
        &note,
        DeckId::GLOBAL,
        Some("Translation"),
        &map,
        &EngineConfig::default(),
    )
    .unwrap();
    assert!(error.contains("Did you mean 'sentence'?"), "got: {error}");
}
