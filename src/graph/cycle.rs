//! Cycle detection over field graphs.

use std::collections::HashSet;

use super::FieldGraph;

/// Whether the graph contains a dependency cycle.
///
/// Runs an iterative depth-first traversal from every node, following
/// `out_edges`. Each stack entry carries its own copy of the path taken to
/// reach it: two branches may legitimately share a node (a diamond) without
/// forming a cycle, so a single shared visited-set would report false
/// positives. A cycle exists exactly when a node recurs on its *own* path.
///
/// The explicit stack keeps the traversal safe on pathological inputs
/// where recursion depth would track graph size. Pure function; the graph
/// is not mutated.
pub fn has_cycle(graph: &FieldGraph) -> bool {
    for start in graph.fields() {
        let mut explore: Vec<(&str, HashSet<&str>)> = vec![(start, HashSet::new())];

        while let Some((current, path)) = explore.pop() {
            if path.contains(current) {
                return true;
            }
            let Some(node) = graph.get(current) else {
                continue;
            };
            if node.out_edges.is_empty() {
                continue;
            }

            let mut extended = path;
            extended.insert(current);
            for neighbor in &node.out_edges {
                explore.push((neighbor.as_str(), extended.clone()));
            }
        }
    }

    false
}
