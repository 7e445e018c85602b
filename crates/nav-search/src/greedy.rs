//! Greedy best-first search.

use rustc_hash::{FxHashMap, FxHashSet};

use nav_core::{NodeId, SearchLimits};
use nav_graph::Graph;

use crate::frontier::{Budget, MinQueue, precheck};
use crate::path::reconstruct_path;
use crate::{SearchReport, SearchResult};

/// Expands the node that looks closest to the goal, ignoring cost so far.
///
/// Nodes are marked visited when first discovered, so each is queued at
/// most once.  Fast on open road grids, but the path is not guaranteed to
/// be the cheapest.
pub(crate) fn greedy(
    graph: &Graph,
    start: NodeId,
    goal: NodeId,
    limits: &SearchLimits,
) -> SearchResult<SearchReport> {
    if let Some(report) = precheck(graph, start, goal)? {
        return Ok(report);
    }

    let mut budget = Budget::new(limits);
    let mut open = MinQueue::new();
    let mut visited: FxHashSet<NodeId> = FxHashSet::default();
    let mut came_from: FxHashMap<NodeId, NodeId> = FxHashMap::default();

    visited.insert(start);
    open.push(graph.heuristic(start, goal), 0.0, start);

    while let Some(entry) = open.pop() {
        if !budget.try_expand() {
            return Ok(budget.timed_out());
        }
        let current = entry.node;
        if current == goal {
            let path = reconstruct_path(start, goal, &came_from);
            return Ok(SearchReport::from_path(budget.expanded, path));
        }

        for next in graph.neighbors(current) {
            if visited.insert(next) {
                came_from.insert(next, current);
                open.push(graph.heuristic(next, goal), 0.0, next);
            }
        }
    }

    Ok(SearchReport::no_path(budget.expanded))
}
