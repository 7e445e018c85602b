//! Edge-relaxation search (Bellman-Ford).

use rustc_hash::FxHashMap;

use nav_core::{NodeId, SearchLimits};
use nav_graph::Graph;

use crate::frontier::{Budget, precheck};
use crate::path::reconstruct_path;
use crate::{SearchOutcome, SearchReport, SearchResult};

/// Up to `|V| - 1` full passes over the flat edge list, then one more pass
/// to detect a negative cycle reachable from `start`.
///
/// The only strategy that is correct with negative edge costs.  Passes stop
/// early once one makes no change.  The budget is checked once per pass and
/// `max_expansions` caps the number of passes; `expanded` in the report is
/// the number of nodes that were reached.
pub(crate) fn bellman_ford(
    graph: &Graph,
    start: NodeId,
    goal: NodeId,
    limits: &SearchLimits,
) -> SearchResult<SearchReport> {
    if let Some(report) = precheck(graph, start, goal)? {
        return Ok(report);
    }

    let mut budget = Budget::new(limits);
    let mut dist: FxHashMap<NodeId, f64> = FxHashMap::default();
    let mut prev: FxHashMap<NodeId, NodeId> = FxHashMap::default();
    dist.insert(start, 0.0);

    let edges = graph.edges();
    for _ in 1..graph.node_count() {
        if !budget.try_expand() {
            let mut report = budget.timed_out();
            report.expanded = dist.len();
            return Ok(report);
        }
        let mut changed = false;
        for e in edges {
            let Some(&du) = dist.get(&e.from) else {
                continue;
            };
            let candidate = du + e.cost;
            if candidate < dist.get(&e.to).copied().unwrap_or(f64::INFINITY) {
                dist.insert(e.to, candidate);
                prev.insert(e.to, e.from);
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }

    let reached = dist.len();
    let relaxes = edges.iter().any(|e| {
        dist.get(&e.from)
            .is_some_and(|&du| du + e.cost < dist.get(&e.to).copied().unwrap_or(f64::INFINITY))
    });
    if relaxes {
        log::warn!("negative cycle reachable from {start}");
        return Ok(SearchReport { expanded: reached, outcome: SearchOutcome::NegativeCycle });
    }

    if !dist.contains_key(&goal) {
        return Ok(SearchReport::no_path(reached));
    }
    let path = reconstruct_path(start, goal, &prev);
    Ok(SearchReport::from_path(reached, path))
}
