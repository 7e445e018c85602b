//! CSV graph loader.
//!
//! The map-data collaborator decides which directed edges a source segment
//! produces (one-way, access, construction); by the time data reaches this
//! loader it is a plain node list and a plain directed edge list.
//!
//! # CSV format
//!
//! ```csv
//! id,lat,lon
//! 1001,21.0285,105.8542
//! 1002,21.0291,105.8550
//! ```
//!
//! ```csv
//! from,to,cost
//! 1001,1002,96.4
//! 1002,1001,96.4
//! ```
//!
//! Edge costs must be finite and non-negative; edges referencing unknown
//! nodes fail the whole load.

use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use nav_core::NodeId;

use crate::{Graph, GraphError, GraphResult};

// ── CSV records ───────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct NodeRecord {
    id:  u64,
    lat: f64,
    lon: f64,
}

#[derive(Deserialize)]
struct EdgeRecord {
    from: u64,
    to:   u64,
    cost: f64,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load a graph from a node CSV file and an edge CSV file.
pub fn load_graph_csv(nodes: &Path, edges: &Path) -> GraphResult<Graph> {
    let node_file = std::fs::File::open(nodes)?;
    let edge_file = std::fs::File::open(edges)?;
    load_graph_reader(node_file, edge_file)
}

/// Like [`load_graph_csv`] but accepts any `Read` sources.
///
/// Useful for testing (pass a `std::io::Cursor`) or loading from network
/// streams.
pub fn load_graph_reader<N: Read, E: Read>(nodes: N, edges: E) -> GraphResult<Graph> {
    let mut graph = Graph::new();

    let mut node_reader = csv::Reader::from_reader(nodes);
    for result in node_reader.deserialize::<NodeRecord>() {
        let row = result.map_err(|e| GraphError::Parse(e.to_string()))?;
        graph.add_node(NodeId(row.id), row.lat, row.lon)?;
    }

    let mut edge_reader = csv::Reader::from_reader(edges);
    let mut edge_rows = 0usize;
    for result in edge_reader.deserialize::<EdgeRecord>() {
        let row = result.map_err(|e| GraphError::Parse(e.to_string()))?;
        graph.add_edge(NodeId(row.from), NodeId(row.to), row.cost)?;
        edge_rows += 1;
    }

    log::debug!(
        "loaded graph: {} nodes, {} edges ({} edge rows)",
        graph.node_count(),
        graph.edge_count(),
        edge_rows
    );
    Ok(graph)
}
