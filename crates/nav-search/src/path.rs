//! Path reconstruction and measurement shared by every strategy.

use rustc_hash::FxHashMap;

use nav_core::NodeId;
use nav_graph::Graph;

/// Walk predecessor links back from `goal` to `start`.
///
/// Returns `None` if the chain breaks (a node with no predecessor before
/// `start` is reached) or loops; callers treat both as "no path".
pub fn reconstruct_path(
    start: NodeId,
    goal: NodeId,
    came_from: &FxHashMap<NodeId, NodeId>,
) -> Option<Vec<NodeId>> {
    let mut path = vec![goal];
    let mut current = goal;
    while current != start {
        // A simple path never has more hops than there are links.
        if path.len() > came_from.len() {
            return None;
        }
        current = *came_from.get(&current)?;
        path.push(current);
    }
    path.reverse();
    Some(path)
}

/// Total length of `path`: the cheapest edge cost between each consecutive
/// pair, or the straight-line distance where no edge exists.
pub fn path_distance_m(graph: &Graph, path: &[NodeId]) -> f64 {
    path.windows(2)
        .map(|w| {
            let cost = graph.cost(w[0], w[1]);
            if cost.is_finite() { cost } else { graph.heuristic(w[0], w[1]) }
        })
        .sum()
}
