//! Shared search plumbing: priority queue, budget, and the common prechecks.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::Instant;

use nav_core::{NodeId, SearchLimits};
use nav_graph::Graph;

use crate::{SearchError, SearchReport, SearchResult};

// ── Priority queue ────────────────────────────────────────────────────────────

/// Heap entry.  `g` is the accumulated cost when the entry was pushed, used
/// to recognise stale duplicates after a cheaper route was queued.
#[derive(Copy, Clone, Debug)]
pub(crate) struct QueueEntry {
    pub key:  f64,
    pub g:    f64,
    pub seq:  u64,
    pub node: NodeId,
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse so BinaryHeap (max-heap) pops the smallest key first;
        // equal keys pop in insertion order.
        other
            .key
            .total_cmp(&self.key)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueueEntry {}

/// Min-priority queue with deterministic FIFO tie-breaking.
pub(crate) struct MinQueue {
    heap: BinaryHeap<QueueEntry>,
    seq:  u64,
}

impl MinQueue {
    pub fn new() -> Self {
        Self { heap: BinaryHeap::new(), seq: 0 }
    }

    pub fn push(&mut self, key: f64, g: f64, node: NodeId) {
        self.heap.push(QueueEntry { key, g, seq: self.seq, node });
        self.seq += 1;
    }

    pub fn pop(&mut self) -> Option<QueueEntry> {
        self.heap.pop()
    }

    /// Smallest key currently queued (stale entries included, which only
    /// makes the bound more conservative).
    pub fn min_key(&self) -> Option<f64> {
        self.heap.peek().map(|e| e.key)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }
}

// ── Budget ────────────────────────────────────────────────────────────────────

/// Expansion counter plus the optional cap and deadline from [`SearchLimits`].
pub(crate) struct Budget {
    pub expanded:   usize,
    max_expansions: Option<usize>,
    deadline:       Option<Instant>,
}

impl Budget {
    pub fn new(limits: &SearchLimits) -> Self {
        Self {
            expanded:       0,
            max_expansions: limits.max_expansions,
            deadline:       limits.timeout().and_then(|t| Instant::now().checked_add(t)),
        }
    }

    /// `true` once the cap is reached or the deadline has passed.
    #[inline]
    pub fn exhausted(&self) -> bool {
        self.max_expansions.is_some_and(|m| self.expanded >= m)
            || self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Count one expansion, or return `false` without counting if the
    /// budget is already spent.
    #[inline]
    pub fn try_expand(&mut self) -> bool {
        if self.exhausted() {
            return false;
        }
        self.expanded += 1;
        true
    }

    pub fn timed_out(&self) -> SearchReport {
        log::warn!("search budget exhausted after {} expansions", self.expanded);
        SearchReport::timed_out(self.expanded)
    }
}

// ── Prechecks ─────────────────────────────────────────────────────────────────

/// Edge-case policy shared by every strategy.
///
/// - unknown start or goal → error;
/// - start or goal is an obstacle → `NoPath`, zero expansions;
/// - `start == goal` → the single-node path, zero expansions.
///
/// Returns `Ok(None)` when a real search is needed.
pub(crate) fn precheck(graph: &Graph, start: NodeId, goal: NodeId) -> SearchResult<Option<SearchReport>> {
    for node in [start, goal] {
        if !graph.contains(node) {
            return Err(SearchError::UnknownNode(node));
        }
    }
    if graph.is_obstacle(start) || graph.is_obstacle(goal) {
        return Ok(Some(SearchReport::no_path(0)));
    }
    if start == goal {
        return Ok(Some(SearchReport::found(0, vec![start])));
    }
    Ok(None)
}
