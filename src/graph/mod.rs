//! Field-dependency graph construction and validation.
//!
//! This module provides the graph data structure and algorithms needed to
//! generate interdependent smart fields in the right order: building a
//! dependency graph from prompt templates, detecting reference cycles,
//! and trimming the graph to a single requested field and its transitive
//! inputs.
//!
//! # Structure
//!
//! The graph is arena-style: [`FieldGraph`] is a map from lowercase field
//! identifier to [`FieldNode`], and it is the sole owner of every node.
//! Edges are stored as identifier lists on each node rather than as
//! references, which keeps ownership simple and makes graph snapshots
//! trivially serializable for inspection and tests. A producer→consumer
//! edge means "the consumer's template references the producer's field".
//!
//! Edge lists are kept symmetric at all times: node A appears in B's
//! `in_edges` exactly when B appears in A's `out_edges`. The
//! [`Scheduler`](crate::scheduler::Scheduler) relies on this when it
//! destructively unlinks resolved nodes, which is also why nothing outside
//! the graph should hold on to node data across a scheduling run.
//!
//! # Lifecycle
//!
//! Graphs are built fresh per generation request by [`build_graph`],
//! consumed in place by the scheduler, and discarded. Nothing here
//! persists; only the resulting field values survive, inside the host's
//! note storage.

pub mod builder;
pub mod cycle;
pub mod validate;

pub use builder::build_graph;
pub use cycle::has_cycle;
pub use validate::prompt_has_error;

use serde::Serialize;
use std::collections::BTreeMap;

use crate::core::DeckId;
use crate::resolver::FieldPayload;

/// One generatable field on a note.
///
/// Created by [`build_graph`], mutated in place by the scheduler (edges
/// removed as dependencies resolve, flags set), and discarded when the
/// request completes.
#[derive(Debug, Clone, Serialize)]
pub struct FieldNode {
    /// Canonical lowercase identifier; unique within a graph.
    pub field: String,
    /// Original-case field name as stored on the note.
    pub display_field: String,
    /// Field content captured at graph-build time.
    pub existing_value: String,
    /// Producers this node waits on, by field identifier.
    pub in_edges: Vec<String>,
    /// Consumers waiting on this node, by field identifier.
    pub out_edges: Vec<String>,
    /// Whether the field only generates when explicitly requested.
    pub is_manual: bool,
    /// Whether an existing non-empty value should be replaced.
    pub overwrite: bool,
    /// Whether this is the field explicitly requested in target mode.
    pub is_target: bool,
    /// Set on dependencies of the target: they must run even when manual,
    /// because the user asked for the target's value and an unfilled
    /// dependency would leave a hole in the interpolated prompt.
    pub generate_despite_manual: bool,
    /// The generation request template and provider options.
    pub payload: FieldPayload,
    /// Deck context the prompt was resolved in.
    pub deck_id: DeckId,
    /// Set during scheduling when a blocked ancestor prevents generation.
    pub aborted: bool,
    /// Set once a value was actually (re)computed for this field.
    pub did_update: bool,
}

/// Arena of field nodes, keyed by lowercase field identifier.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct FieldGraph {
    nodes: BTreeMap<String, FieldNode>,
}

impl FieldGraph {
    /// Number of unresolved nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph has no nodes left.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether a field identifier is present.
    pub fn contains(&self, field: &str) -> bool {
        self.nodes.contains_key(field)
    }

    /// Borrow a node by field identifier.
    pub fn get(&self, field: &str) -> Option<&FieldNode> {
        self.nodes.get(field)
    }

    /// Mutably borrow a node by field identifier.
    pub fn get_mut(&mut self, field: &str) -> Option<&mut FieldNode> {
        self.nodes.get_mut(field)
    }

    /// Insert a node, keyed by its own `field` identifier.
    pub fn insert(&mut self, node: FieldNode) {
        self.nodes.insert(node.field.clone(), node);
    }

    /// Remove and return a node.
    pub fn remove(&mut self, field: &str) -> Option<FieldNode> {
        self.nodes.remove(field)
    }

    /// Iterate field identifiers.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    /// Iterate nodes.
    pub fn nodes(&self) -> impl Iterator<Item = &FieldNode> {
        self.nodes.values()
    }

    /// Consume the graph into its nodes.
    pub fn into_nodes(self) -> impl Iterator<Item = (String, FieldNode)> {
        self.nodes.into_iter()
    }

    /// Add a producer→consumer edge, keeping both edge lists symmetric.
    ///
    /// A no-op when either endpoint is missing or the edge already exists,
    /// so duplicate template references collapse to one edge.
    pub fn add_edge(&mut self, producer: &str, consumer: &str) {
        if !self.nodes.contains_key(producer) || !self.nodes.contains_key(consumer) {
            return;
        }
        let exists = self
            .nodes
            .get(producer)
            .is_some_and(|node| node.out_edges.iter().any(|e| e == consumer));
        if exists {
            return;
        }
        if let Some(node) = self.nodes.get_mut(producer) {
            node.out_edges.push(consumer.to_string());
        }
        if let Some(node) = self.nodes.get_mut(consumer) {
            node.in_edges.push(producer.to_string());
        }
    }

    /// The current frontier: every node with no unresolved producers.
    pub fn frontier(&self) -> Vec<String> {
        self.nodes
            .iter()
            .filter(|(_, node)| node.in_edges.is_empty())
            .map(|(field, _)| field.clone())
            .collect()
    }
}
