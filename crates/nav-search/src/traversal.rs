//! Unweighted traversals: breadth-first and depth-first.
//!
//! Both record a node's predecessor when it is first discovered and never
//! queue it again.  Edge costs are ignored.

use std::collections::VecDeque;

use rustc_hash::{FxHashMap, FxHashSet};

use nav_core::{NodeId, SearchLimits};
use nav_graph::Graph;

use crate::frontier::{Budget, precheck};
use crate::path::reconstruct_path;
use crate::{SearchReport, SearchResult};

/// FIFO traversal: the returned path has the fewest edges, not the least
/// cost.
pub(crate) fn breadth_first(
    graph: &Graph,
    start: NodeId,
    goal: NodeId,
    limits: &SearchLimits,
) -> SearchResult<SearchReport> {
    if let Some(report) = precheck(graph, start, goal)? {
        return Ok(report);
    }

    let mut budget = Budget::new(limits);
    let mut queue = VecDeque::from([start]);
    let mut seen: FxHashSet<NodeId> = FxHashSet::from_iter([start]);
    let mut came_from: FxHashMap<NodeId, NodeId> = FxHashMap::default();

    while let Some(current) = queue.pop_front() {
        if !budget.try_expand() {
            return Ok(budget.timed_out());
        }
        if current == goal {
            let path = reconstruct_path(start, goal, &came_from);
            return Ok(SearchReport::from_path(budget.expanded, path));
        }
        for next in graph.neighbors(current) {
            if seen.insert(next) {
                came_from.insert(next, current);
                queue.push_back(next);
            }
        }
    }

    Ok(SearchReport::no_path(budget.expanded))
}

/// LIFO traversal.  Finds *a* path if one exists; no optimality of any
/// kind.
pub(crate) fn depth_first(
    graph: &Graph,
    start: NodeId,
    goal: NodeId,
    limits: &SearchLimits,
) -> SearchResult<SearchReport> {
    if let Some(report) = precheck(graph, start, goal)? {
        return Ok(report);
    }

    let mut budget = Budget::new(limits);
    let mut stack = vec![start];
    let mut seen: FxHashSet<NodeId> = FxHashSet::from_iter([start]);
    let mut came_from: FxHashMap<NodeId, NodeId> = FxHashMap::default();

    while let Some(current) = stack.pop() {
        if !budget.try_expand() {
            return Ok(budget.timed_out());
        }
        if current == goal {
            let path = reconstruct_path(start, goal, &came_from);
            return Ok(SearchReport::from_path(budget.expanded, path));
        }
        for next in graph.neighbors(current) {
            if seen.insert(next) {
                came_from.insert(next, current);
                stack.push(next);
            }
        }
    }

    Ok(SearchReport::no_path(budget.expanded))
}
