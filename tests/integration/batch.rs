//! Batch generation: concurrent notes, failure isolation, request guard.

use smartfields::config::EngineConfig;
use smartfields::core::{DeckId, NoteId, SmartFieldsError};
use smartfields::note::{InMemoryNote, NoteFields};
use smartfields::processor::{NoteProcessor, ProcessOptions};
use smartfields::utils::progress::NoopProgress;

use crate::common::{EchoResolver, init_tracing, note_with, prompt_map};

fn chain_prompts() -> smartfields::prompts::PromptMap {
    prompt_map(&[("f2", "{{f1}}")], &[])
}

#[tokio::test]
async fn test_batch_commits_successes_despite_failures() {
    init_tracing();
    // Note 2's resolver calls blow up; notes 1 and 3 must still land.
    let resolver = EchoResolver {
        fail_notes: vec![NoteId(2)],
    };
    let processor = NoteProcessor::new(resolver, EngineConfig::default(), chain_prompts());

    let mut n1 = note_with(NoteId(1), &[("f1", "a"), ("f2", "")]);
    let mut n2 = note_with(NoteId(2), &[("f1", "b"), ("f2", "")]);
    let mut n3 = note_with(NoteId(3), &[("f1", "c"), ("f2", "")]);

    let report = processor
        .process_notes_batch(
            vec![
                (&mut n1 as &mut dyn NoteFields, DeckId::GLOBAL),
                (&mut n2 as &mut dyn NoteFields, DeckId::GLOBAL),
                (&mut n3 as &mut dyn NoteFields, DeckId::GLOBAL),
            ],
            false,
            &NoopProgress,
        )
        .await;

    assert_eq!(report.updated, vec![NoteId(1), NoteId(3)]);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, NoteId(2));
    assert_eq!(n1.get_field("f2").unwrap(), "p_a");
    assert_eq!(n2.get_field("f2").unwrap(), "");
    assert_eq!(n3.get_field("f2").unwrap(), "p_c");
}

#[tokio::test]
async fn test_batch_skips_notes_without_prompts() {
    let processor =
        NoteProcessor::new(EchoResolver::default(), EngineConfig::default(), chain_prompts());

    let mut configured = note_with(NoteId(1), &[("f1", "a"), ("f2", "")]);
    let mut unconfigured = InMemoryNote::new("other_type", NoteId(2))
        .with_field("f1", "b")
        .with_field("f2", "");

    let report = processor
        .process_notes_batch(
            vec![
                (&mut configured as &mut dyn NoteFields, DeckId::GLOBAL),
                (&mut unconfigured as &mut dyn NoteFields, DeckId::GLOBAL),
            ],
            false,
            &NoopProgress,
        )
        .await;

    assert_eq!(report.updated, vec![NoteId(1)]);
    assert_eq!(report.skipped, vec![NoteId(2)]);
    assert_eq!(unconfigured.get_field("f2").unwrap(), "");
}

#[tokio::test]
async fn test_batch_counts_untouched_notes_as_skipped() {
    let processor =
        NoteProcessor::new(EchoResolver::default(), EngineConfig::default(), chain_prompts());

    // Already filled, no overwrite: processed but nothing updated.
    let mut note = note_with(NoteId(1), &[("f1", "a"), ("f2", "done")]);
    let report = processor
        .process_notes_batch(
            vec![(&mut note as &mut dyn NoteFields, DeckId::GLOBAL)],
            false,
            &NoopProgress,
        )
        .await;

    assert!(report.updated.is_empty());
    assert_eq!(report.skipped, vec![NoteId(1)]);
}

#[tokio::test]
async fn test_batch_waves_cover_all_notes() {
    init_tracing();
    let config = EngineConfig {
        batch_limit: 1,
        ..EngineConfig::default()
    };
    let processor = NoteProcessor::new(EchoResolver::default(), config, chain_prompts());

    let mut n1 = note_with(NoteId(1), &[("f1", "a"), ("f2", "")]);
    let mut n2 = note_with(NoteId(2), &[("f1", "b"), ("f2", "")]);
    let mut n3 = note_with(NoteId(3), &[("f1", "c"), ("f2", "")]);

    let report = processor
        .process_notes_batch(
            vec![
                (&mut n1 as &mut dyn NoteFields, DeckId::GLOBAL),
                (&mut n2 as &mut dyn NoteFields, DeckId::GLOBAL),
                (&mut n3 as &mut dyn NoteFields, DeckId::GLOBAL),
            ],
            false,
            &NoopProgress,
        )
        .await;

    assert_eq!(report.updated.len(), 3);
    assert_eq!(n2.get_field("f2").unwrap(), "p_b");
}

#[tokio::test]
async fn test_overlapping_request_for_same_note_is_rejected() {
    let processor =
        NoteProcessor::new(EchoResolver::default(), EngineConfig::default(), chain_prompts());
    let mut note = note_with(NoteId(7), &[("f1", "a"), ("f2", "")]);

    // Simulate an in-flight request holding the note's permit.
    let permit = processor.guard().try_begin(NoteId(7)).unwrap();
    let result = processor
        .process_note(&mut note, DeckId::GLOBAL, &ProcessOptions::default(), &NoopProgress)
        .await;
    assert!(matches!(
        result,
        Err(SmartFieldsError::RequestInProgress { note }) if note == NoteId(7)
    ));

    // Releasing the permit unblocks the note.
    drop(permit);
    let report = processor
        .process_note(&mut note, DeckId::GLOBAL, &ProcessOptions::default(), &NoopProgress)
        .await
        .unwrap();
    assert!(report.did_update());
}
