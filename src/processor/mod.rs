//! Per-note and batch generation orchestration.
//!
//! [`NoteProcessor`] ties the pipeline together: index the prompts
//! configured for the note's type and deck, build the dependency graph,
//! and hand it to the [`Scheduler`](crate::scheduler::Scheduler). It also
//! runs whole batches of notes, dispatching them concurrently in
//! rate-limit-sized waves with per-note failure isolation: a batch of ten
//! notes where two fail still commits updates for the other eight.
//!
//! Failure posture: a broken prompt configuration degrades to "nothing to
//! generate" with a logged error rather than surfacing to the host's UI
//! loop. Only mistakes the user must fix before any work can start - an
//! unknown target field, an overlapping request for the same note - are
//! returned as errors.

pub mod guard;

pub use guard::{RequestGuard, RequestPermit};

use std::sync::atomic::{AtomicUsize, Ordering};

use futures::future;
use tracing::{debug, error, warn};

use crate::config::EngineConfig;
use crate::core::{DeckId, NoteId, SmartFieldsError};
use crate::graph::build_graph;
use crate::note::NoteFields;
use crate::prompts::PromptMap;
use crate::resolver::FieldResolver;
use crate::scheduler::{ScheduleReport, Scheduler};
use crate::utils::progress::{NoopProgress, ProgressSink};

/// Options for one generation request.
#[derive(Debug, Clone, Default)]
pub struct ProcessOptions {
    /// Replace existing non-empty field values.
    pub overwrite_fields: bool,
    /// Generate only this field and its transitive inputs.
    ///
    /// Combining a target with `overwrite_fields` also regenerates the
    /// already-filled inputs before the target, not just the target. An
    /// odd combination, but this is the established behavior and hosts
    /// do not offer both switches at once.
    pub target_field: Option<String>,
}

/// Outcome of a batch run, by note.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Notes where at least one field was (re)computed.
    pub updated: Vec<NoteId>,
    /// Notes where the request or any field resolution failed.
    pub failed: Vec<(NoteId, SmartFieldsError)>,
    /// Notes with nothing to generate.
    pub skipped: Vec<NoteId>,
}

/// Drives smart-field generation for notes.
pub struct NoteProcessor<R: FieldResolver> {
    resolver: R,
    config: EngineConfig,
    prompts: PromptMap,
    guard: RequestGuard,
}

impl<R: FieldResolver> NoteProcessor<R> {
    /// Create a processor over a resolver, configuration, and prompt map.
    pub fn new(resolver: R, config: EngineConfig, prompts: PromptMap) -> Self {
        Self {
            resolver,
            config,
            prompts,
            guard: RequestGuard::new(),
        }
    }

    /// The active engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The active prompt configuration.
    pub fn prompts(&self) -> &PromptMap {
        &self.prompts
    }

    /// Swap in a new prompt configuration (after the host saves an edit).
    pub fn set_prompts(&mut self, prompts: PromptMap) {
        self.prompts = prompts;
    }

    /// The per-note request registry, shared with any host UI that wants
    /// to disable controls while a note is busy.
    pub fn guard(&self) -> &RequestGuard {
        &self.guard
    }

    /// Generate smart fields for a single note.
    ///
    /// Fields are mutated in place through the [`NoteFields`] trait; the
    /// host persists the note afterwards if
    /// [`did_update`](ScheduleReport::did_update) says anything changed
    /// (new, unsaved notes are filled in memory only).
    ///
    /// Returns an empty report when no prompts apply to this note type and
    /// deck. Fails fast when the note already has a request in flight or
    /// `target_field` names an unconfigured field.
    pub async fn process_note(
        &self,
        note: &mut dyn NoteFields,
        deck_id: DeckId,
        options: &ProcessOptions,
        progress: &dyn ProgressSink,
    ) -> Result<ScheduleReport, SmartFieldsError> {
        let _permit = self.guard.try_begin(note.id())?;

        if self.prompts.prompts_for_note(note.note_type(), deck_id).is_empty() {
            debug!("no prompts for note type '{}', nothing to generate", note.note_type());
            return Ok(ScheduleReport::default());
        }

        let graph = match build_graph(
            note,
            &self.prompts,
            &self.config,
            options.overwrite_fields,
            deck_id,
            options.target_field.as_deref(),
        ) {
            Ok(graph) => graph,
            Err(e @ SmartFieldsError::TargetNotFound { .. }) => return Err(e),
            Err(e) => {
                // A broken configuration must never take the host down.
                error!("error creating field graph: {e}");
                return Ok(ScheduleReport::default());
            }
        };

        if graph.is_empty() {
            return Ok(ScheduleReport::default());
        }

        let report = Scheduler::new(graph, &self.config, &self.resolver).run(note, progress).await;
        Ok(report)
    }

    /// Generate smart fields for a batch of `(note, deck)` pairs.
    ///
    /// Notes without applicable prompts are skipped up front. The rest run
    /// concurrently in waves of [`batch_limit`](EngineConfig::batch_limit)
    /// notes; within a wave every note completes independently, and one
    /// note's failure never aborts its siblings. `progress` counts whole
    /// notes, not fields.
    pub async fn process_notes_batch(
        &self,
        notes: Vec<(&mut dyn NoteFields, DeckId)>,
        overwrite_fields: bool,
        progress: &dyn ProgressSink,
    ) -> BatchReport {
        let mut report = BatchReport::default();

        let mut queue: Vec<(&mut dyn NoteFields, DeckId)> = Vec::new();
        for (note, deck_id) in notes {
            if self.prompts.prompts_for_note(note.note_type(), deck_id).is_empty() {
                debug!("note {} has no prompts, skipping", note.id());
                report.skipped.push(note.id());
            } else {
                queue.push((note, deck_id));
            }
        }
        if queue.is_empty() {
            debug!("no notes to process");
            return report;
        }

        let total = queue.len();
        let completed = AtomicUsize::new(0);
        let options = ProcessOptions {
            overwrite_fields,
            target_field: None,
        };
        progress.begin(total);

        let wave_size = self.config.batch_limit.max(1);
        let mut queue = queue.into_iter();
        loop {
            let wave: Vec<_> = queue.by_ref().take(wave_size).collect();
            if wave.is_empty() {
                break;
            }
            debug!("processing wave of {} notes", wave.len());

            let results = future::join_all(wave.into_iter().map(|(note, deck_id)| {
                let options = &options;
                let completed = &completed;
                async move {
                    let id = note.id();
                    let result = self.process_note(note, deck_id, options, &NoopProgress).await;
                    let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                    progress.node_resolved(done, total);
                    (id, result)
                }
            }))
            .await;

            for (id, result) in results {
                match result {
                    Err(e) => {
                        error!("error processing note {id}: {e}");
                        report.failed.push((id, e));
                    }
                    Ok(note_report) => {
                        if let Some((field, e)) = note_report.failed.into_iter().next() {
                            warn!("note {id}: field '{field}' failed to resolve");
                            report.failed.push((id, SmartFieldsError::Resolve(e)));
                        } else if note_report.updated.is_empty() {
                            report.skipped.push(id);
                        } else {
                            report.updated.push(id);
                        }
                    }
                }
            }
        }

        progress.finish();
        debug!(
            "batch done: {} updated, {} failed, {} skipped",
            report.updated.len(),
            report.failed.len(),
            report.skipped.len()
        );
        report
    }
}
