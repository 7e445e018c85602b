//! Bidirectional A*, single-threaded and deterministic.
//!
//! # Potentials
//!
//! Both frontiers use the averaged potential
//!
//! ```text
//! p(v) = (h(v, goal) - h(start, v)) / 2
//! ```
//!
//! forward keys are `g_f(v) + p(v) - p(start)` and backward keys are
//! `g_b(v) - p(v) + p(goal)`.  With a consistent `h` both reduced edge
//! costs are non-negative, and the two keys of any node sum to the reduced
//! cost of the best start→v→goal route through it.  The search can
//! therefore stop as soon as the best meeting cost found (in reduced units)
//! is no greater than the sum of both frontiers' minimum keys; no unexplored
//! route can beat it.
//!
//! Each round expands the side whose open set is currently smaller.

use rustc_hash::{FxHashMap, FxHashSet};

use nav_core::{NodeId, SearchLimits};
use nav_graph::{Graph, Link};

use crate::frontier::{Budget, MinQueue, precheck};
use crate::path::reconstruct_path;
use crate::{SearchReport, SearchResult};

struct Side {
    open:   MinQueue,
    g:      FxHashMap<NodeId, f64>,
    /// Forward: predecessor.  Backward: successor toward the goal.
    parent: FxHashMap<NodeId, NodeId>,
    closed: FxHashSet<NodeId>,
}

impl Side {
    fn new(origin: NodeId, key: f64) -> Self {
        let mut side = Self {
            open:   MinQueue::new(),
            g:      FxHashMap::default(),
            parent: FxHashMap::default(),
            closed: FxHashSet::default(),
        };
        side.g.insert(origin, 0.0);
        side.open.push(key, 0.0, origin);
        side
    }

    fn g(&self, node: NodeId) -> f64 {
        self.g.get(&node).copied().unwrap_or(f64::INFINITY)
    }
}

#[derive(Copy, Clone, PartialEq)]
enum Direction {
    Forward,
    Backward,
}

pub(crate) fn bidirectional_astar(
    graph: &Graph,
    start: NodeId,
    goal: NodeId,
    limits: &SearchLimits,
) -> SearchResult<SearchReport> {
    if let Some(report) = precheck(graph, start, goal)? {
        return Ok(report);
    }

    let potential = |v: NodeId| (graph.heuristic(v, goal) - graph.heuristic(start, v)) * 0.5;
    let (p_start, p_goal) = (potential(start), potential(goal));
    // Reduced cost of a start→goal route = real cost + offset.
    let offset = p_goal - p_start;

    let mut budget = Budget::new(limits);
    let mut fwd = Side::new(start, 0.0);
    let mut bwd = Side::new(goal, 0.0);
    let mut best = f64::INFINITY;
    let mut meeting: Option<NodeId> = None;

    loop {
        let (Some(f_min), Some(b_min)) = (fwd.open.min_key(), bwd.open.min_key()) else {
            break;
        };
        if best + offset <= f_min + b_min {
            break;
        }

        let dir = if fwd.open.len() <= bwd.open.len() {
            Direction::Forward
        } else {
            Direction::Backward
        };
        let (this, other) = match dir {
            Direction::Forward => (&mut fwd, &bwd),
            Direction::Backward => (&mut bwd, &fwd),
        };

        let Some(entry) = this.open.pop() else {
            break;
        };
        let node = entry.node;
        if entry.g > this.g(node) || this.closed.contains(&node) {
            continue;
        }
        if !budget.try_expand() {
            return Ok(budget.timed_out());
        }
        this.closed.insert(node);

        let links: &[Link] = match dir {
            Direction::Forward => graph.out_links(node),
            Direction::Backward => graph.in_links(node),
        };
        for link in links {
            let next = link.node;
            let tentative = entry.g + link.cost;
            if tentative < this.g(next) {
                this.g.insert(next, tentative);
                this.parent.insert(next, node);
                let key = match dir {
                    Direction::Forward => tentative + potential(next) - p_start,
                    Direction::Backward => tentative - potential(next) + p_goal,
                };
                this.open.push(key, tentative, next);
            }
            let through = this.g(next) + other.g(next);
            if through < best {
                best = through;
                meeting = Some(next);
            }
        }
    }

    let Some(meet) = meeting else {
        return Ok(SearchReport::no_path(budget.expanded));
    };
    let path = join_halves(start, goal, meet, &fwd.parent, &bwd.parent);
    Ok(SearchReport::from_path(budget.expanded, path))
}

/// Concatenate `start → meet` (forward predecessors) with `meet → goal`
/// (backward successors), keeping `meet` once.
pub(crate) fn join_halves(
    start: NodeId,
    goal: NodeId,
    meet: NodeId,
    forward: &FxHashMap<NodeId, NodeId>,
    backward: &FxHashMap<NodeId, NodeId>,
) -> Option<Vec<NodeId>> {
    let mut path = reconstruct_path(start, meet, forward)?;
    let mut tail = reconstruct_path(goal, meet, backward)?;
    tail.reverse();
    path.extend(tail.into_iter().skip(1));
    Some(path)
}
