//! Graph-subsystem error type.

use thiserror::Error;

use nav_core::NodeId;

/// Errors produced by `nav-graph`.
///
/// These are caller mistakes (bad ids, bad costs, bad radii) and I/O
/// failures.  "No route" is never an error here; it is a search outcome.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("node {0} not found in graph")]
    UnknownNode(NodeId),

    #[error("node {0} already exists")]
    DuplicateNode(NodeId),

    #[error("invalid cost {cost} on edge {from} -> {to}")]
    InvalidCost { from: NodeId, to: NodeId, cost: f64 },

    #[error("invalid coordinate ({lat}, {lon}) for node {id}")]
    InvalidCoordinate { id: NodeId, lat: f64, lon: f64 },

    #[error("invalid query coordinate ({lat}, {lon})")]
    InvalidQuery { lat: f64, lon: f64 },

    #[error("invalid radius search: {0}")]
    InvalidRadius(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parse error: {0}")]
    Parse(String),
}

pub type GraphResult<T> = Result<T, GraphError>;
