//! Unidirectional A*.

use rustc_hash::FxHashMap;

use nav_core::{NodeId, SearchLimits};
use nav_graph::Graph;

use crate::frontier::{Budget, MinQueue, precheck};
use crate::path::reconstruct_path;
use crate::{SearchReport, SearchResult};

/// Best-first search on `g + h` with the graph's geodesic heuristic.
///
/// A neighbour is (re)queued whenever a strictly cheaper tentative `g` is
/// found, even if it is already queued or was settled before; duplicates
/// whose `g` has since been beaten are skipped on pop.  Optimal when the
/// heuristic is consistent and costs are non-negative.
pub(crate) fn astar(
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
    let mut g_score: FxHashMap<NodeId, f64> = FxHashMap::default();
    let mut came_from: FxHashMap<NodeId, NodeId> = FxHashMap::default();

    g_score.insert(start, 0.0);
    open.push(graph.heuristic(start, goal), 0.0, start);

    while let Some(entry) = open.pop() {
        let current = entry.node;
        if entry.g > g_score[&current] {
            continue;
        }
        if !budget.try_expand() {
            return Ok(budget.timed_out());
        }
        if current == goal {
            let path = reconstruct_path(start, goal, &came_from);
            return Ok(SearchReport::from_path(budget.expanded, path));
        }

        for link in graph.out_links(current) {
            let tentative = entry.g + link.cost;
            let known = g_score.get(&link.node).copied().unwrap_or(f64::INFINITY);
            if tentative < known {
                came_from.insert(link.node, current);
                g_score.insert(link.node, tentative);
                open.push(tentative + graph.heuristic(link.node, goal), tentative, link.node);
            }
        }
    }

    Ok(SearchReport::no_path(budget.expanded))
}
