//! Search error type.

use thiserror::Error;

use nav_core::NodeId;

/// Caller mistakes that make a search meaningless.
///
/// Expected outcomes ("no path", "negative cycle", "budget exhausted") are
/// reported through [`SearchOutcome`](crate::SearchOutcome) instead.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SearchError {
    #[error("node {0} not found in graph")]
    UnknownNode(NodeId),
}

pub type SearchResult<T> = Result<T, SearchError>;
