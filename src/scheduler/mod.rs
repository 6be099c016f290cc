//! Tiered-parallel execution of a field graph.
//!
//! The scheduler consumes a [`FieldGraph`] one frontier at a time. A
//! frontier is every node with no unresolved producers; all of its nodes
//! are dispatched concurrently, and the scheduler waits for the whole tier
//! to complete before touching the note or the graph (a fan-out/fan-in
//! barrier). Completion order within a tier is meaningless - results are
//! re-associated with their nodes by field identifier, never by finish
//! time.
//!
//! After the barrier, a serial settlement step applies the per-node
//! resolution policy's outcome: values are written to the note, abort
//! flags propagate forward over `out_edges`, the resolved node is removed
//! from every consumer's `in_edges`, and the node leaves the graph. This
//! is the only place the note or the graph is mutated, so no cross-task
//! interference is possible; the sole suspension point is the call into
//! the external [`FieldResolver`].
//!
//! # Resolution policy
//!
//! Evaluated per node, in this order - the order is load-bearing:
//!
//! 1. an aborted node does nothing;
//! 2. a manual node that is neither the target nor a forced dependency of
//!    it aborts, poisoning its descendants;
//! 3. a node with an existing non-empty value keeps it unless it is the
//!    target or overwrite mode is on - consumers still see the value for
//!    interpolation;
//! 4. otherwise the template is interpolated against the note's current
//!    values (producers resolved in earlier tiers have already been
//!    written) and handed to the resolver.
//!
//! A resolver error is that node's failure alone: siblings keep their
//! results and the run continues. A declined resolution (`Ok(None)`)
//! leaves the field unfilled without aborting anything.

use futures::future;
use tracing::{debug, error, warn};

use crate::config::EngineConfig;
use crate::core::ResolveError;
use crate::graph::FieldGraph;
use crate::note::NoteFields;
use crate::prompts::interpolate_prompt;
use crate::resolver::{FieldResolver, ResolveRequest};
use crate::utils::progress::ProgressSink;

/// Outcome of one scheduling run.
#[derive(Debug, Default)]
pub struct ScheduleReport {
    /// Fields whose value was actually (re)computed.
    pub updated: Vec<String>,
    /// Fields that resolved without generating: aborted, manual, reused
    /// an existing value, declined, or skipped on empty interpolation.
    pub skipped: Vec<String>,
    /// Fields whose resolver call failed, with the failure.
    pub failed: Vec<(String, ResolveError)>,
}

impl ScheduleReport {
    /// Whether any field value was (re)computed.
    pub fn did_update(&self) -> bool {
        !self.updated.is_empty()
    }
}

/// How a frontier node settles without calling the resolver, or the
/// request to dispatch.
enum Dispatch {
    Settled(NodeOutcome),
    Call(ResolveRequest),
}

enum NodeOutcome {
    /// A blocked ancestor already poisoned this node.
    AlreadyAborted,
    /// Manual field outside target-mode participation; aborts descendants.
    ManualBlock,
    /// Existing value kept; consumers interpolate against it.
    Reused(String),
    /// Interpolation produced nothing to send (empty referenced fields).
    EmptyPrompt,
    /// The resolver declined (no capacity); field stays unfilled.
    Declined,
    /// The resolver produced a value.
    Generated(String),
    /// The resolver failed; isolated to this node.
    Failed(ResolveError),
}

/// Drives one note's field graph to completion.
pub struct Scheduler<'a> {
    graph: FieldGraph,
    config: &'a EngineConfig,
    resolver: &'a dyn FieldResolver,
}

impl<'a> Scheduler<'a> {
    /// Take ownership of a cycle-free graph for one run.
    pub fn new(
        graph: FieldGraph,
        config: &'a EngineConfig,
        resolver: &'a dyn FieldResolver,
    ) -> Self {
        Self {
            graph,
            config,
            resolver,
        }
    }

    /// Execute the graph tier by tier, mutating the note's fields in place.
    pub async fn run(
        mut self,
        note: &mut dyn NoteFields,
        progress: &dyn ProgressSink,
    ) -> ScheduleReport {
        let total = self.graph.len();
        let mut report = ScheduleReport::default();
        if total == 0 {
            return report;
        }

        progress.begin(total);
        let mut completed = 0;

        while !self.graph.is_empty() {
            let frontier = self.graph.frontier();
            if frontier.is_empty() {
                // Unreachable on cycle-checked input; bail instead of
                // spinning if a cyclic graph slipped through.
                warn!(
                    "scheduler stalled with {} unresolved nodes; graphs must be cycle-checked before scheduling",
                    self.graph.len()
                );
                break;
            }
            debug!("dispatching frontier: {frontier:?}");

            let dispatches: Vec<Dispatch> =
                frontier.iter().map(|field| self.plan_node(field, &*note)).collect();

            let resolver = self.resolver;
            let outcomes = future::join_all(dispatches.into_iter().map(|dispatch| async move {
                match dispatch {
                    Dispatch::Settled(outcome) => outcome,
                    Dispatch::Call(request) => match resolver.resolve(request).await {
                        Ok(Some(value)) => NodeOutcome::Generated(value),
                        Ok(None) => NodeOutcome::Declined,
                        Err(e) => NodeOutcome::Failed(e),
                    },
                }
            }))
            .await;

            for (field, outcome) in frontier.into_iter().zip(outcomes) {
                self.settle_node(&field, outcome, note, &mut report);
                completed += 1;
                progress.node_resolved(completed, total);
            }
        }

        progress.finish();
        report
    }

    /// Apply resolution-policy steps 1-3 and, where generation is called
    /// for, interpolate the template into a dispatchable request.
    fn plan_node(&self, field: &str, note: &dyn NoteFields) -> Dispatch {
        let Some(node) = self.graph.get(field) else {
            return Dispatch::Settled(NodeOutcome::AlreadyAborted);
        };

        if node.aborted {
            debug!("skipping field '{field}': an ancestor aborted");
            return Dispatch::Settled(NodeOutcome::AlreadyAborted);
        }

        if node.is_manual && !(node.is_target || node.generate_despite_manual) {
            debug!("manual field '{field}' does not generate automatically");
            return Dispatch::Settled(NodeOutcome::ManualBlock);
        }

        let value = note.get_field(&node.display_field).unwrap_or_default();
        if !value.is_empty() && !(node.is_target || node.overwrite) {
            return Dispatch::Settled(NodeOutcome::Reused(value));
        }

        match interpolate_prompt(node.payload.text(), note, self.config.allow_empty_fields) {
            None => Dispatch::Settled(NodeOutcome::EmptyPrompt),
            Some(text) => Dispatch::Call(ResolveRequest {
                field: node.field.clone(),
                note_id: note.id(),
                note_type: note.note_type().to_string(),
                payload: node.payload.with_text(text),
            }),
        }
    }

    /// Serial post-barrier step for one node: write its value, propagate
    /// aborts forward, unlink it from consumers, and drop it.
    fn settle_node(
        &mut self,
        field: &str,
        outcome: NodeOutcome,
        note: &mut dyn NoteFields,
        report: &mut ScheduleReport,
    ) {
        let Some(mut node) = self.graph.remove(field) else {
            return;
        };

        match outcome {
            NodeOutcome::AlreadyAborted | NodeOutcome::EmptyPrompt | NodeOutcome::Declined => {
                report.skipped.push(node.field.clone());
            }
            NodeOutcome::ManualBlock => {
                node.aborted = true;
                report.skipped.push(node.field.clone());
            }
            NodeOutcome::Reused(value) => {
                note.set_field(&node.display_field, &value);
                report.skipped.push(node.field.clone());
            }
            NodeOutcome::Generated(value) => {
                debug!("updating field '{field}'");
                note.set_field(&node.display_field, &value);
                node.did_update = true;
                report.updated.push(node.field.clone());
            }
            NodeOutcome::Failed(e) => {
                error!("field '{field}' failed to resolve: {e}");
                report.failed.push((node.field.clone(), e));
            }
        }

        if node.aborted {
            for consumer in &node.out_edges {
                if let Some(downstream) = self.graph.get_mut(consumer) {
                    downstream.aborted = true;
                }
            }
        }

        for consumer in &node.out_edges {
            if let Some(downstream) = self.graph.get_mut(consumer) {
                downstream.in_edges.retain(|producer| producer != field);
            }
        }
    }
}
