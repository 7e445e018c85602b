//! Road graph representation with a destructive obstacle overlay.
//!
//! # Data layout
//!
//! Nodes live in dense *slots* (insertion order) so per-node data is stored
//! in parallel `Vec`s.  A `FxHashMap<NodeId, usize>` translates the loader's
//! opaque IDs into slots:
//!
//! ```text
//! slots[id] = s      ids[s] = id      node_pos[s]      out_links[s]      in_links[s]
//! ```
//!
//! Every directed edge is stored three times: as an out-link of its source,
//! an in-link of its destination (for reverse searches), and once in the
//! flat `edges` list (for full edge scans such as Bellman-Ford).
//!
//! # Obstacles
//!
//! Obstructing a node physically detaches every incident edge (outgoing and
//! incoming) from all three stores and caches them under that node.  Clearing
//! the obstacle reattaches exactly the cached edges.  An obstacle therefore
//! has no links at all and no edge ends at one, so `neighbors`, `cost`, and
//! `has_edge` need no filtering on the query path.
//!
//! A cached edge whose other endpoint is still obstructed at restore time is
//! handed to that endpoint's cache instead, and comes back when it clears.
//!
//! Every edge carries a registration sequence number.  All three stores stay
//! sorted by it, so a restored edge goes back to its original position and a
//! round trip leaves iteration order untouched.

use std::sync::{PoisonError, RwLock, RwLockReadGuard};

use rayon::prelude::*;
use rustc_hash::{FxHashMap, FxHashSet};

use nav_core::{BoundingBox, GeoPoint, NodeId, SnapConfig};

use crate::spatial::SpatialIndex;
use crate::{GraphError, GraphResult};

// ── Edge records ──────────────────────────────────────────────────────────────

/// A directed, weighted edge.  `cost` is normally metres.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Edge {
    pub from: NodeId,
    pub to:   NodeId,
    pub cost: f64,
    seq:      u64,
}

/// One adjacency entry: the node at the other end of an edge and its cost.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Link {
    pub node: NodeId,
    pub cost: f64,
    seq:      u64,
}

// ── Graph ─────────────────────────────────────────────────────────────────────

/// Directed road graph, obstacle overlay, and nearest-node index.
pub struct Graph {
    // ── Node data (indexed by slot) ───────────────────────────────────────
    slots:    FxHashMap<NodeId, usize>,
    ids:      Vec<NodeId>,
    node_pos: Vec<GeoPoint>,

    // ── Adjacency (indexed by slot) ───────────────────────────────────────
    out_links: Vec<Vec<Link>>,
    in_links:  Vec<Vec<Link>>,

    /// Flat edge list in registration order.
    edges:    Vec<Edge>,
    next_seq: u64,

    // ── Obstacle overlay ──────────────────────────────────────────────────
    obstacles: FxHashSet<NodeId>,
    /// Edges detached by obstructing a node, keyed by that node.
    detached:  FxHashMap<NodeId, Vec<Edge>>,

    // ── Spatial index ─────────────────────────────────────────────────────
    spatial: RwLock<SpatialIndex>,
}

impl Graph {
    pub fn new() -> Self {
        Self::with_capacity(0, 0)
    }

    /// Pre-allocate for the expected number of nodes and edges to reduce
    /// reallocations when bulk-loading map data.
    pub fn with_capacity(nodes: usize, edges: usize) -> Self {
        let mut slots = FxHashMap::default();
        slots.reserve(nodes);
        Self {
            slots,
            ids:       Vec::with_capacity(nodes),
            node_pos:  Vec::with_capacity(nodes),
            out_links: Vec::with_capacity(nodes),
            in_links:  Vec::with_capacity(nodes),
            edges:     Vec::with_capacity(edges),
            next_seq:  0,
            obstacles: FxHashSet::default(),
            detached:  FxHashMap::default(),
            spatial:   RwLock::new(SpatialIndex::new()),
        }
    }

    // ── Graph dimensions ──────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.ids.len()
    }

    /// Number of edges currently attached (detached obstacle edges excluded).
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn obstacle_count(&self) -> usize {
        self.obstacles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.slots.contains_key(&node)
    }

    /// All node IDs in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.ids.iter().copied()
    }

    /// Every attached directed edge, in registration order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn position(&self, node: NodeId) -> Option<GeoPoint> {
        self.slots.get(&node).map(|&s| self.node_pos[s])
    }

    // ── Construction ──────────────────────────────────────────────────────

    /// Register a node at `(lat, lon)` degrees.
    ///
    /// # Errors
    ///
    /// [`GraphError::DuplicateNode`] if `id` is already present (nodes are
    /// immutable once added), [`GraphError::InvalidCoordinate`] for
    /// non-finite or out-of-range coordinates.
    pub fn add_node(&mut self, id: NodeId, lat: f64, lon: f64) -> GraphResult<()> {
        if self.slots.contains_key(&id) {
            return Err(GraphError::DuplicateNode(id));
        }
        let pos = GeoPoint::try_new(lat, lon)
            .map_err(|_| GraphError::InvalidCoordinate { id, lat, lon })?;

        let slot = self.ids.len();
        self.slots.insert(id, slot);
        self.ids.push(id);
        self.node_pos.push(pos);
        self.out_links.push(Vec::new());
        self.in_links.push(Vec::new());
        self.invalidate_spatial();
        Ok(())
    }

    /// Add a **directed** edge with a finite, non-negative cost.
    ///
    /// Returns `Ok(false)` without storing anything if either endpoint is
    /// currently an obstacle.  Parallel edges are kept.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId, cost: f64) -> GraphResult<bool> {
        if !cost.is_finite() || cost < 0.0 {
            return Err(GraphError::InvalidCost { from, to, cost });
        }
        self.insert_edge(from, to, cost)
    }

    /// Like [`add_edge`](Self::add_edge) but also accepts finite negative
    /// costs.  Only the relaxation-based search is correct on such graphs;
    /// the queue-based strategies assume non-negative costs.
    pub fn add_signed_edge(&mut self, from: NodeId, to: NodeId, cost: f64) -> GraphResult<bool> {
        if !cost.is_finite() {
            return Err(GraphError::InvalidCost { from, to, cost });
        }
        self.insert_edge(from, to, cost)
    }

    /// Convenience: add edges in **both directions** for a two-way street.
    pub fn add_road(&mut self, a: NodeId, b: NodeId, cost: f64) -> GraphResult<bool> {
        let forward = self.add_edge(a, b, cost)?;
        let backward = self.add_edge(b, a, cost)?;
        Ok(forward && backward)
    }

    fn insert_edge(&mut self, from: NodeId, to: NodeId, cost: f64) -> GraphResult<bool> {
        let from_slot = self.slot(from)?;
        let to_slot = self.slot(to)?;
        if self.obstacles.contains(&from) || self.obstacles.contains(&to) {
            log::debug!("ignoring edge {from} -> {to}: endpoint is an obstacle");
            return Ok(false);
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.attach(from_slot, to_slot, Edge { from, to, cost, seq });
        Ok(true)
    }

    /// Insert `edge` into all three stores at its sequence position.  Returns
    /// `false` if an edge with the same sequence number is already attached.
    fn attach(&mut self, from_slot: usize, to_slot: usize, edge: Edge) -> bool {
        let Err(at) = self.edges.binary_search_by_key(&edge.seq, |e| e.seq) else {
            return false;
        };
        self.edges.insert(at, edge);
        let (cost, seq) = (edge.cost, edge.seq);
        insert_by_seq(&mut self.out_links[from_slot], Link { node: edge.to, cost, seq });
        insert_by_seq(&mut self.in_links[to_slot], Link { node: edge.from, cost, seq });
        true
    }

    #[inline]
    fn slot(&self, node: NodeId) -> GraphResult<usize> {
        self.slots.get(&node).copied().ok_or(GraphError::UnknownNode(node))
    }

    // ── Graph traversal ───────────────────────────────────────────────────

    /// Outgoing links of `node`; empty for obstacles and unknown nodes.
    #[inline]
    pub fn out_links(&self, node: NodeId) -> &[Link] {
        match self.slots.get(&node) {
            Some(&s) => &self.out_links[s],
            None => &[],
        }
    }

    /// Incoming links of `node` (`Link::node` is the edge source).
    #[inline]
    pub fn in_links(&self, node: NodeId) -> &[Link] {
        match self.slots.get(&node) {
            Some(&s) => &self.in_links[s],
            None => &[],
        }
    }

    /// Destinations of `node`'s outgoing edges, one per edge (parallel edges
    /// repeat).  Never yields an obstacle.
    pub fn neighbors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.out_links(node).iter().map(|l| l.node)
    }

    /// Cheapest stored cost of an edge `from -> to`, or `f64::INFINITY` if
    /// there is none (including when `to` is an obstacle).
    pub fn cost(&self, from: NodeId, to: NodeId) -> f64 {
        self.out_links(from)
            .iter()
            .filter(|l| l.node == to)
            .map(|l| l.cost)
            .fold(f64::INFINITY, f64::min)
    }

    pub fn has_edge(&self, from: NodeId, to: NodeId) -> bool {
        self.out_links(from).iter().any(|l| l.node == to)
    }

    /// Great-circle distance in metres between two nodes.
    ///
    /// This is a consistent lower bound on travel cost as long as every edge
    /// costs at least the straight-line length between its endpoints, which
    /// holds for loaders that derive costs from geometry.  Unknown nodes
    /// yield `0.0`, which is trivially admissible.
    pub fn heuristic(&self, from: NodeId, to: NodeId) -> f64 {
        match (self.position(from), self.position(to)) {
            (Some(a), Some(b)) => a.distance_m(b),
            _ => 0.0,
        }
    }

    // ── Obstacles ─────────────────────────────────────────────────────────

    pub fn is_obstacle(&self, node: NodeId) -> bool {
        self.obstacles.contains(&node)
    }

    /// Currently obstructed nodes, in no particular order.
    pub fn obstacles(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.obstacles.iter().copied()
    }

    /// Mark `node` impassable.  Returns `false` if it already was.
    pub fn add_obstacle(&mut self, node: NodeId) -> GraphResult<bool> {
        Ok(!self.add_obstacles(&[node])?.is_empty())
    }

    /// Clear `node`'s obstacle status and restore its edges.  Returns
    /// `false` (and does nothing) if it was not an obstacle.
    pub fn remove_obstacle(&mut self, node: NodeId) -> GraphResult<bool> {
        Ok(!self.remove_obstacles(&[node])?.is_empty())
    }

    /// Obstruct a batch of nodes with a single pass over the flat edge list.
    ///
    /// All IDs are validated before anything changes.  Returns the nodes
    /// that were newly obstructed, in input order.
    pub fn add_obstacles(&mut self, nodes: &[NodeId]) -> GraphResult<Vec<NodeId>> {
        for &n in nodes {
            self.slot(n)?;
        }

        let mut added = Vec::new();
        for &node in nodes {
            if !self.obstacles.insert(node) {
                continue;
            }
            let cached = self.detach(node);
            self.detached.entry(node).or_default().extend(cached);
            added.push(node);
        }

        if !added.is_empty() {
            let obstacles = &self.obstacles;
            self.edges
                .retain(|e| !obstacles.contains(&e.from) && !obstacles.contains(&e.to));
            log::debug!(
                "obstructed {} node(s); {} edges remain attached",
                added.len(),
                self.edges.len()
            );
        }
        Ok(added)
    }

    /// Clear a batch of obstacles.  Returns the nodes that were actually
    /// obstacles, in input order.
    pub fn remove_obstacles(&mut self, nodes: &[NodeId]) -> GraphResult<Vec<NodeId>> {
        for &n in nodes {
            self.slot(n)?;
        }

        let mut removed = Vec::new();
        for &node in nodes {
            if self.obstacles.remove(&node) {
                removed.push(node);
            }
        }
        for &node in &removed {
            self.reattach(node);
        }
        if !removed.is_empty() {
            log::debug!(
                "cleared {} obstacle(s); {} edges attached",
                removed.len(),
                self.edges.len()
            );
        }
        Ok(removed)
    }

    /// Strip every link touching `node` from both adjacency directions and
    /// return the edges removed.  The flat list is pruned by the caller.
    fn detach(&mut self, node: NodeId) -> Vec<Edge> {
        let slot = self.slots[&node];
        let outgoing = std::mem::take(&mut self.out_links[slot]);
        let incoming = std::mem::take(&mut self.in_links[slot]);

        let mut cached = Vec::with_capacity(outgoing.len() + incoming.len());
        for link in &outgoing {
            if link.node != node {
                let s = self.slots[&link.node];
                self.in_links[s].retain(|l| l.node != node);
            }
            cached.push(Edge { from: node, to: link.node, cost: link.cost, seq: link.seq });
        }
        for link in &incoming {
            // Self-loops were already cached as outgoing.
            if link.node != node {
                let s = self.slots[&link.node];
                self.out_links[s].retain(|l| l.node != node);
                cached.push(Edge { from: link.node, to: node, cost: link.cost, seq: link.seq });
            }
        }
        cached
    }

    /// Re-insert the edges cached for `node` at their original positions.
    /// An edge that is already attached is never inserted twice.
    fn reattach(&mut self, node: NodeId) {
        let cached = self.detached.remove(&node).unwrap_or_default();
        for edge in cached {
            let other = if edge.from == node { edge.to } else { edge.from };
            if other != node && self.obstacles.contains(&other) {
                self.detached.entry(other).or_default().push(edge);
                continue;
            }
            let from_slot = self.slots[&edge.from];
            let to_slot = self.slots[&edge.to];
            if !self.attach(from_slot, to_slot, edge) {
                log::warn!("edge {} -> {} was cached while attached", edge.from, edge.to);
            }
        }
    }

    // ── Spatial queries ───────────────────────────────────────────────────

    fn invalidate_spatial(&mut self) {
        self.spatial
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .invalidate();
    }

    /// Read access to the spatial index, rebuilding it first if stale.
    pub fn spatial_index(&self) -> RwLockReadGuard<'_, SpatialIndex> {
        {
            let index = self.spatial.read().unwrap_or_else(PoisonError::into_inner);
            if !index.is_dirty() {
                return index;
            }
        }
        {
            let mut index = self.spatial.write().unwrap_or_else(PoisonError::into_inner);
            // Another reader may have rebuilt it while we waited.
            if index.is_dirty() {
                index.rebuild(self.ids.iter().copied().zip(self.node_pos.iter().copied()));
            }
        }
        self.spatial.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Closest non-obstacle node to `(lat, lon)` by great-circle distance,
    /// with no radius bound.  `None` if every node is an obstacle, the graph
    /// is empty, or the query is not a valid coordinate.
    pub fn find_nearest_node(&self, lat: f64, lon: f64) -> Option<NodeId> {
        let origin = GeoPoint::try_new(lat, lon).ok()?;
        let index = self.spatial_index();
        let found = index
            .nearest_iter(origin)
            .find(|n| !self.obstacles.contains(n));
        found
    }

    /// Expanding-ring nearest-node search.
    ///
    /// Searches radii `initial_radius`, `initial_radius + step`, … and finally
    /// `max_radius` itself (all metres), returning the geodesically closest
    /// non-obstacle node inside the first ring that holds one.  Equidistant
    /// candidates resolve to the smaller `NodeId`.  Returns `None` once
    /// `max_radius` has been searched without success.
    ///
    /// # Errors
    ///
    /// [`GraphError::InvalidRadius`] if `step <= 0` or any radius is negative
    /// or non-finite, [`GraphError::InvalidQuery`] for a non-finite or
    /// out-of-range query coordinate.
    pub fn find_nearest_node_within_radius(
        &self,
        lat: f64,
        lon: f64,
        initial_radius: f64,
        step: f64,
        max_radius: f64,
    ) -> GraphResult<Option<NodeId>> {
        let radii_ok = initial_radius.is_finite()
            && max_radius.is_finite()
            && initial_radius >= 0.0
            && max_radius >= 0.0;
        if !radii_ok || !step.is_finite() || step <= 0.0 {
            return Err(GraphError::InvalidRadius(format!(
                "initial={initial_radius} step={step} max={max_radius}"
            )));
        }

        let origin =
            GeoPoint::try_new(lat, lon).map_err(|_| GraphError::InvalidQuery { lat, lon })?;
        let index = self.spatial_index();
        let mut radius = initial_radius.min(max_radius);
        loop {
            let best = index
                .within_radius(origin, radius)
                .filter(|n| !self.obstacles.contains(n))
                .filter_map(|n| self.position(n).map(|p| (origin.distance_m(p), n)))
                .min_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
            if let Some((_, node)) = best {
                return Ok(Some(node));
            }
            if radius >= max_radius {
                return Ok(None);
            }
            radius = (radius + step).min(max_radius);
        }
    }

    /// [`find_nearest_node_within_radius`](Self::find_nearest_node_within_radius)
    /// with parameters from a [`SnapConfig`].
    pub fn snap(&self, pos: GeoPoint, config: &SnapConfig) -> GraphResult<Option<NodeId>> {
        self.find_nearest_node_within_radius(
            pos.lat,
            pos.lon,
            config.initial_radius_m,
            config.step_m,
            config.max_radius_m,
        )
    }

    /// Non-obstacle nodes whose coordinates fall inside `bbox`, in insertion
    /// order.  The scan runs in parallel; map extracts can hold millions of
    /// nodes.
    pub fn nodes_in_bbox(&self, bbox: &BoundingBox) -> Vec<NodeId> {
        (0..self.ids.len())
            .into_par_iter()
            .filter(|&s| bbox.contains(self.node_pos[s]))
            .map(|s| self.ids[s])
            .filter(|n| !self.obstacles.contains(n))
            .collect()
    }
}

fn insert_by_seq(links: &mut Vec<Link>, link: Link) {
    let at = links.partition_point(|l| l.seq < link.seq);
    links.insert(at, link);
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Graph {
    fn clone(&self) -> Self {
        let spatial = self.spatial.read().unwrap_or_else(PoisonError::into_inner).clone();
        Self {
            slots:     self.slots.clone(),
            ids:       self.ids.clone(),
            node_pos:  self.node_pos.clone(),
            out_links: self.out_links.clone(),
            in_links:  self.in_links.clone(),
            edges:     self.edges.clone(),
            next_seq:  self.next_seq,
            obstacles: self.obstacles.clone(),
            detached:  self.detached.clone(),
            spatial:   RwLock::new(spatial),
        }
    }
}

impl std::fmt::Debug for Graph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Graph")
            .field("nodes", &self.ids.len())
            .field("edges", &self.edges.len())
            .field("obstacles", &self.obstacles.len())
            .finish()
    }
}
