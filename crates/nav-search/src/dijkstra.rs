//! Uniform-cost search (Dijkstra).

use rustc_hash::FxHashMap;

use nav_core::{NodeId, SearchLimits};
use nav_graph::Graph;

use crate::frontier::{Budget, MinQueue, precheck};
use crate::path::reconstruct_path;
use crate::{SearchReport, SearchResult};

/// Standard Dijkstra relaxation keyed by accumulated cost; stops at the
/// first pop of `goal`.
pub(crate) fn dijkstra(
    graph: &Graph,
    start: NodeId,
    goal: NodeId,
    limits: &SearchLimits,
) -> SearchResult<SearchReport> {
    if let Some(report) = precheck(graph, start, goal)? {
        return Ok(report);
    }

    let mut budget = Budget::new(limits);
    // dist[v] = best known cost to reach v.
    let mut dist: FxHashMap<NodeId, f64> = FxHashMap::default();
    let mut came_from: FxHashMap<NodeId, NodeId> = FxHashMap::default();
    let mut heap = MinQueue::new();

    dist.insert(start, 0.0);
    heap.push(0.0, 0.0, start);

    while let Some(entry) = heap.pop() {
        let node = entry.node;
        // Skip stale heap entries.
        if entry.g > dist[&node] {
            continue;
        }
        if !budget.try_expand() {
            return Ok(budget.timed_out());
        }
        if node == goal {
            let path = reconstruct_path(start, goal, &came_from);
            return Ok(SearchReport::from_path(budget.expanded, path));
        }

        for link in graph.out_links(node) {
            let new_cost = entry.g + link.cost;
            if new_cost < dist.get(&link.node).copied().unwrap_or(f64::INFINITY) {
                dist.insert(link.node, new_cost);
                came_from.insert(link.node, node);
                heap.push(new_cost, new_cost, link.node);
            }
        }
    }

    Ok(SearchReport::no_path(budget.expanded))
}
