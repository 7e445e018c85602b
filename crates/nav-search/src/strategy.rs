//! Search strategy trait and the strategy table.
//!
//! # Pluggability
//!
//! Every strategy is a stateless unit struct implementing [`PathSearch`];
//! frontiers and score maps live only for the duration of one call, so a
//! single instance can serve any number of threads at once.  [`Algorithm`]
//! is the same set as a closed enum, for choosing a strategy by name at
//! runtime.

use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use thiserror::Error;

use nav_core::{NodeId, SearchLimits};
use nav_graph::Graph;

use crate::{SearchOutcome, SearchReport, SearchResult};

// ── PathSearch trait ──────────────────────────────────────────────────────────

/// A shortest-path (or any-path) strategy over a [`Graph`].
///
/// # Contract
///
/// - unknown `start` or `goal` → `Err(SearchError::UnknownNode)`;
/// - `start` or `goal` is an obstacle → `NoPath`, zero expansions;
/// - `start == goal` → `Found([start])`, zero expansions;
/// - a found path begins with `start`, ends with `goal`, and every
///   consecutive pair is joined by an edge of the graph.
///
/// # Thread safety
///
/// Implementations must be `Send + Sync`; searches over the same graph
/// snapshot may run on many threads at once.
pub trait PathSearch: Send + Sync {
    /// Short stable name, as accepted by `Algorithm::from_str`.
    fn name(&self) -> &'static str;

    fn search(
        &self,
        graph: &Graph,
        start: NodeId,
        goal: NodeId,
        limits: &SearchLimits,
    ) -> SearchResult<SearchReport>;

    /// [`search`](Self::search) without a budget.
    fn run(&self, graph: &Graph, start: NodeId, goal: NodeId) -> SearchResult<SearchReport> {
        self.search(graph, start, goal, &SearchLimits::UNBOUNDED)
    }
}

// ── Strategies ────────────────────────────────────────────────────────────────

macro_rules! strategy {
    ($(#[$doc:meta])* $ty:ident, $name:literal, $func:path) => {
        $(#[$doc])*
        #[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
        pub struct $ty;

        impl PathSearch for $ty {
            fn name(&self) -> &'static str {
                $name
            }

            fn search(
                &self,
                graph: &Graph,
                start: NodeId,
                goal: NodeId,
                limits: &SearchLimits,
            ) -> SearchResult<SearchReport> {
                let t0 = Instant::now();
                let report = $func(graph, start, goal, limits)?;
                log_summary($name, start, goal, &report, t0);
                Ok(report)
            }
        }
    };
}

strategy!(
    /// Unidirectional A* on `g + h`.  Optimal for non-negative costs.
    AStar, "astar", crate::astar::astar
);
strategy!(
    /// Two A* frontiers that alternate by open-set size.  Optimal and
    /// deterministic.
    BidirectionalAStar, "bidirectional-astar", crate::bidirectional::bidirectional_astar
);
strategy!(
    /// Both A* directions on separate threads.  Optimal; expansion counts
    /// vary between runs.
    ConcurrentBidirectionalAStar,
    "concurrent-bidirectional-astar",
    crate::concurrent::concurrent_bidirectional_astar
);
strategy!(
    /// Greedy best-first on `h` alone.  Fast, not optimal.
    GreedyBestFirst, "greedy", crate::greedy::greedy
);
strategy!(
    /// Uniform-cost search.  Optimal for non-negative costs.
    Dijkstra, "dijkstra", crate::dijkstra::dijkstra
);
strategy!(
    /// Fewest edges, ignoring cost.
    BreadthFirst, "bfs", crate::traversal::breadth_first
);
strategy!(
    /// Depth-first traversal.  Returns some path if one exists, with no
    /// bound on its cost or length.
    DepthFirst, "dfs", crate::traversal::depth_first
);
strategy!(
    /// Full edge-list relaxation.  Handles negative costs and reports
    /// negative cycles reachable from the start.
    BellmanFord, "bellman-ford", crate::bellman_ford::bellman_ford
);

fn log_summary(name: &str, start: NodeId, goal: NodeId, report: &SearchReport, t0: Instant) {
    let outcome = match &report.outcome {
        SearchOutcome::Found(path) => format!("found {} node(s)", path.len()),
        SearchOutcome::NoPath => "no path".to_owned(),
        SearchOutcome::NegativeCycle => "negative cycle".to_owned(),
        SearchOutcome::TimedOut => "timed out".to_owned(),
    };
    log::debug!(
        "{name} {start} -> {goal}: {outcome}, {} expanded in {:.2?}",
        report.expanded,
        t0.elapsed()
    );
}

// ── Algorithm ─────────────────────────────────────────────────────────────────

/// Runtime-selectable strategy.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Algorithm {
    AStar,
    BidirectionalAStar,
    ConcurrentBidirectionalAStar,
    GreedyBestFirst,
    Dijkstra,
    BreadthFirst,
    DepthFirst,
    BellmanFord,
}

impl Algorithm {
    pub const ALL: [Algorithm; 8] = [
        Algorithm::AStar,
        Algorithm::BidirectionalAStar,
        Algorithm::ConcurrentBidirectionalAStar,
        Algorithm::GreedyBestFirst,
        Algorithm::Dijkstra,
        Algorithm::BreadthFirst,
        Algorithm::DepthFirst,
        Algorithm::BellmanFord,
    ];

    /// The unit strategy behind this variant.
    pub fn strategy(self) -> &'static dyn PathSearch {
        match self {
            Algorithm::AStar => &AStar,
            Algorithm::BidirectionalAStar => &BidirectionalAStar,
            Algorithm::ConcurrentBidirectionalAStar => &ConcurrentBidirectionalAStar,
            Algorithm::GreedyBestFirst => &GreedyBestFirst,
            Algorithm::Dijkstra => &Dijkstra,
            Algorithm::BreadthFirst => &BreadthFirst,
            Algorithm::DepthFirst => &DepthFirst,
            Algorithm::BellmanFord => &BellmanFord,
        }
    }

    /// Whether a found path is guaranteed minimum-cost (non-negative costs).
    pub fn is_optimal(self) -> bool {
        !matches!(
            self,
            Algorithm::GreedyBestFirst | Algorithm::BreadthFirst | Algorithm::DepthFirst
        )
    }
}

impl PathSearch for Algorithm {
    fn name(&self) -> &'static str {
        self.strategy().name()
    }

    fn search(
        &self,
        graph: &Graph,
        start: NodeId,
        goal: NodeId,
        limits: &SearchLimits,
    ) -> SearchResult<SearchReport> {
        self.strategy().search(graph, start, goal, limits)
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown algorithm {0:?}")]
pub struct ParseAlgorithmError(pub String);

impl FromStr for Algorithm {
    type Err = ParseAlgorithmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Algorithm::ALL
            .into_iter()
            .find(|a| a.name() == wanted)
            .ok_or_else(|| ParseAlgorithmError(s.to_owned()))
    }
}
