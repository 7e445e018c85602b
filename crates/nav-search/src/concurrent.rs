//! Bidirectional A* with both directions running at once.
//!
//! The two directions are plain A* searches (forward toward the goal,
//! backward toward the start over incoming links) executed by
//! `rayon::join`.  They meet through a [`Rendezvous`] guarded by a mutex:
//! every settled node is published together with its cost, and a side that
//! settles a node the other side has already settled proposes the joined
//! route as the best meeting.
//!
//! A side stops once its smallest queued key is no less than the best
//! meeting cost.  With a consistent heuristic the smallest key of either
//! A* frontier is a lower bound on every route not yet found, so the first
//! side to reach that point has proven the best meeting optimal and raises
//! the shared stop state.  Exhausting a frontier also stops the search:
//! every node reachable from that side was settled, including the other
//! side's origin.
//!
//! The stop state is set once.  Whichever side stops first decides between
//! a finished search and an exhausted budget, and a late budget check on
//! the other side cannot overwrite it.
//!
//! The expansion cap and deadline are shared by both sides.  Expansion
//! counts and the exact meeting node depend on thread timing; path cost
//! does not.

use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Instant;

use rustc_hash::{FxHashMap, FxHashSet};

use nav_core::{NodeId, SearchLimits};
use nav_graph::Graph;

use crate::bidirectional::join_halves;
use crate::frontier::{MinQueue, precheck};
use crate::{SearchReport, SearchResult};

const FORWARD: usize = 0;
const BACKWARD: usize = 1;

const RUNNING: u8 = 0;
const FINISHED: u8 = 1;
const TIMED_OUT: u8 = 2;

#[derive(Default)]
struct Rendezvous {
    settled: [FxHashMap<NodeId, f64>; 2],
    best:    Option<(f64, NodeId)>,
}

impl Rendezvous {
    fn best_cost(&self) -> f64 {
        self.best.map_or(f64::INFINITY, |(cost, _)| cost)
    }
}

pub(crate) struct Shared<'a> {
    graph:          &'a Graph,
    start:          NodeId,
    goal:           NodeId,
    meet:           Mutex<Rendezvous>,
    state:          AtomicU8,
    expanded:       AtomicUsize,
    max_expansions: Option<usize>,
    deadline:       Option<Instant>,
}

impl<'a> Shared<'a> {
    pub(crate) fn new(graph: &'a Graph, start: NodeId, goal: NodeId, limits: &SearchLimits) -> Self {
        let mut meet = Rendezvous::default();
        meet.settled[FORWARD].insert(start, 0.0);
        meet.settled[BACKWARD].insert(goal, 0.0);
        Self {
            graph,
            start,
            goal,
            meet: Mutex::new(meet),
            state: AtomicU8::new(RUNNING),
            expanded: AtomicUsize::new(0),
            max_expansions: limits.max_expansions,
            deadline: limits.timeout().and_then(|t| Instant::now().checked_add(t)),
        }
    }

    fn rendezvous(&self) -> std::sync::MutexGuard<'_, Rendezvous> {
        self.meet.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Move from running to `to`.  No-op if a side already stopped.
    fn stop(&self, to: u8) {
        let _ = self.state.compare_exchange(RUNNING, to, Ordering::AcqRel, Ordering::Acquire);
    }

    pub(crate) fn finish(&self) {
        self.stop(FINISHED);
    }

    pub(crate) fn is_done(&self) -> bool {
        self.state.load(Ordering::Acquire) != RUNNING
    }

    pub(crate) fn is_timed_out(&self) -> bool {
        self.state.load(Ordering::Acquire) == TIMED_OUT
    }

    /// Count one expansion against the shared budget.
    pub(crate) fn try_expand(&self) -> bool {
        let prev = self.expanded.fetch_add(1, Ordering::AcqRel);
        let over_cap = self.max_expansions.is_some_and(|m| prev >= m);
        let late = self.deadline.is_some_and(|d| Instant::now() >= d);
        if over_cap || late {
            self.stop(TIMED_OUT);
            return false;
        }
        true
    }

    fn heuristic(&self, side: usize, node: NodeId) -> f64 {
        match side {
            FORWARD => self.graph.heuristic(node, self.goal),
            _ => self.graph.heuristic(self.start, node),
        }
    }

    /// One direction of the search.  Returns its parent map: predecessors
    /// for the forward side, successors toward the goal for the backward
    /// side.
    fn run_side(&self, side: usize) -> FxHashMap<NodeId, NodeId> {
        let origin = if side == FORWARD { self.start } else { self.goal };
        let other = 1 - side;

        let mut open = MinQueue::new();
        let mut g_score: FxHashMap<NodeId, f64> = FxHashMap::default();
        let mut parent: FxHashMap<NodeId, NodeId> = FxHashMap::default();
        let mut closed: FxHashSet<NodeId> = FxHashSet::default();

        g_score.insert(origin, 0.0);
        open.push(self.heuristic(side, origin), 0.0, origin);

        while !self.is_done() {
            let Some(entry) = open.pop() else {
                self.finish();
                break;
            };
            let node = entry.node;
            if entry.g > g_score[&node] || closed.contains(&node) {
                continue;
            }
            {
                let meet = self.rendezvous();
                if entry.key >= meet.best_cost() {
                    drop(meet);
                    self.finish();
                    break;
                }
            }
            if !self.try_expand() {
                break;
            }
            closed.insert(node);

            {
                let mut meet = self.rendezvous();
                meet.settled[side].insert(node, entry.g);
                if let Some(&g_other) = meet.settled[other].get(&node) {
                    let through = entry.g + g_other;
                    if through < meet.best_cost() {
                        meet.best = Some((through, node));
                    }
                }
            }

            let links = if side == FORWARD {
                self.graph.out_links(node)
            } else {
                self.graph.in_links(node)
            };
            for link in links {
                let tentative = entry.g + link.cost;
                let known = g_score.get(&link.node).copied().unwrap_or(f64::INFINITY);
                if tentative < known {
                    g_score.insert(link.node, tentative);
                    parent.insert(link.node, node);
                    closed.remove(&link.node);
                    open.push(tentative + self.heuristic(side, link.node), tentative, link.node);
                }
            }
        }
        parent
    }
}

pub(crate) fn concurrent_bidirectional_astar(
    graph: &Graph,
    start: NodeId,
    goal: NodeId,
    limits: &SearchLimits,
) -> SearchResult<SearchReport> {
    if let Some(report) = precheck(graph, start, goal)? {
        return Ok(report);
    }

    let shared = Shared::new(graph, start, goal, limits);
    let (forward, backward) =
        rayon::join(|| shared.run_side(FORWARD), || shared.run_side(BACKWARD));

    let mut expanded = shared.expanded.load(Ordering::Acquire);
    if let Some(cap) = shared.max_expansions {
        expanded = expanded.min(cap);
    }
    if shared.is_timed_out() {
        log::warn!("search budget exhausted after {expanded} expansions");
        return Ok(SearchReport::timed_out(expanded));
    }

    let best = shared.rendezvous().best;
    let Some((cost, meet)) = best else {
        return Ok(SearchReport::no_path(expanded));
    };
    log::trace!("directions met at {meet}, cost {cost:.3}");
    let path = join_halves(start, goal, meet, &forward, &backward);
    Ok(SearchReport::from_path(expanded, path))
}
