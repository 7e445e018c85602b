//! R-tree spatial index over node coordinates.
//!
//! # Geometry
//!
//! Entries are stored as Earth-centred points on the unit sphere rather than
//! raw `[lat, lon]` pairs.  Euclidean (chord) distance between two such
//! points grows strictly with their great-circle distance, so the R-tree's
//! nearest-neighbour order is the exact geodesic order and a metre radius
//! converts to a chord radius without approximation.
//!
//! # Staleness
//!
//! The index is a derived cache.  [`SpatialIndex::invalidate`] sets the
//! dirty bit whenever the node set changes; [`SpatialIndex::rebuild`] is the
//! only operation that clears it.  Obstacle membership is filtered by the
//! caller at query time, so obstacle edits never make the index stale.

use rstar::{PointDistance, RTree, RTreeObject, AABB};

use nav_core::geo::chord_2_for_metres;
use nav_core::{GeoPoint, NodeId};

// ── R-tree node entry ─────────────────────────────────────────────────────────

/// Entry stored in the R-tree: a unit-sphere point with its `NodeId`.
#[derive(Clone, Debug)]
struct NodeEntry {
    point: [f64; 3],
    id:    NodeId,
}

impl RTreeObject for NodeEntry {
    type Envelope = AABB<[f64; 3]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for NodeEntry {
    /// Squared chord length on the unit sphere.
    fn distance_2(&self, point: &[f64; 3]) -> f64 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        let dz = self.point[2] - point[2];
        dx * dx + dy * dy + dz * dz
    }
}

// ── SpatialIndex ──────────────────────────────────────────────────────────────

/// Nearest-node index with an explicit dirty bit.
#[derive(Clone, Debug)]
pub struct SpatialIndex {
    tree:  RTree<NodeEntry>,
    dirty: bool,
}

impl SpatialIndex {
    /// An empty, clean index.
    pub fn new() -> Self {
        Self { tree: RTree::new(), dirty: false }
    }

    /// Mark the index stale.  The next query through the owning graph
    /// rebuilds it.
    #[inline]
    pub fn invalidate(&mut self) {
        self.dirty = true;
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Replace the index contents and clear the dirty bit.
    ///
    /// Bulk loading is O(N log N), much faster than N single inserts.
    pub fn rebuild<I>(&mut self, nodes: I)
    where
        I: IntoIterator<Item = (NodeId, GeoPoint)>,
    {
        let entries: Vec<NodeEntry> = nodes
            .into_iter()
            .map(|(id, pos)| NodeEntry { point: pos.unit_vector(), id })
            .collect();
        log::debug!("rebuilding spatial index over {} nodes", entries.len());
        self.tree = RTree::bulk_load(entries);
        self.dirty = false;
    }

    /// All indexed nodes in ascending great-circle distance from `pos`.
    pub fn nearest_iter(&self, pos: GeoPoint) -> impl Iterator<Item = NodeId> + '_ {
        self.tree
            .nearest_neighbor_iter(&pos.unit_vector())
            .map(|e| e.id)
    }

    /// Nodes within `radius_m` metres (great-circle) of `pos`, unordered.
    pub fn within_radius(&self, pos: GeoPoint, radius_m: f64) -> impl Iterator<Item = NodeId> + '_ {
        self.tree
            .locate_within_distance(pos.unit_vector(), chord_2_for_metres(radius_m))
            .map(|e| e.id)
    }
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self::new()
    }
}
