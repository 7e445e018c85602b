//! Search results.

use nav_core::NodeId;

/// How a search ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Ordered node sequence from start to goal, both inclusive.
    Found(Vec<NodeId>),
    /// The reachable space was exhausted without reaching the goal, or the
    /// start/goal is an obstacle.
    NoPath,
    /// Relaxation search found a negative-cost cycle reachable from start.
    NegativeCycle,
    /// The expansion cap or deadline was hit first.
    TimedOut,
}

/// Result of one search invocation: effort spent plus outcome.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchReport {
    /// Nodes settled (queue pops that were expanded).  Reporting only.
    pub expanded: usize,
    pub outcome:  SearchOutcome,
}

impl SearchReport {
    pub fn found(expanded: usize, path: Vec<NodeId>) -> Self {
        Self { expanded, outcome: SearchOutcome::Found(path) }
    }

    pub fn no_path(expanded: usize) -> Self {
        Self { expanded, outcome: SearchOutcome::NoPath }
    }

    pub fn timed_out(expanded: usize) -> Self {
        Self { expanded, outcome: SearchOutcome::TimedOut }
    }

    /// A `Found` report when `path` is `Some`, otherwise `NoPath`.
    pub fn from_path(expanded: usize, path: Option<Vec<NodeId>>) -> Self {
        match path {
            Some(p) => Self::found(expanded, p),
            None => Self::no_path(expanded),
        }
    }

    pub fn path(&self) -> Option<&[NodeId]> {
        match &self.outcome {
            SearchOutcome::Found(p) => Some(p),
            _ => None,
        }
    }

    pub fn into_path(self) -> Option<Vec<NodeId>> {
        match self.outcome {
            SearchOutcome::Found(p) => Some(p),
            _ => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self.outcome, SearchOutcome::Found(_))
    }
}
