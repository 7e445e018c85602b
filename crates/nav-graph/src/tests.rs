//! Unit tests for nav-graph.
//!
//! All tests use hand-crafted graphs so they run without any map file.

#[cfg(test)]
mod helpers {
    use nav_core::NodeId;

    use crate::Graph;

    /// Spacing between line nodes, in degrees of latitude (~11 m).
    pub const STEP_DEG: f64 = 0.0001;

    /// Five nodes on a north-south line, two-way edges of 20 m between
    /// consecutive nodes (always above the ~11 m straight-line gap).
    ///
    /// ```text
    /// 1 ── 2 ── 3 ── 4 ── 5
    /// ```
    pub fn line_graph() -> (Graph, [NodeId; 5]) {
        let mut g = Graph::new();
        let ids = [NodeId(1), NodeId(2), NodeId(3), NodeId(4), NodeId(5)];
        for (i, &id) in ids.iter().enumerate() {
            g.add_node(id, i as f64 * STEP_DEG, 0.0).unwrap();
        }
        for w in ids.windows(2) {
            g.add_road(w[0], w[1], 20.0).unwrap();
        }
        (g, ids)
    }

    /// 3 × 3 grid, node id = 10 * row + col, two-way edges of 20 m.
    pub fn grid_graph() -> Graph {
        let mut g = Graph::new();
        for r in 0..3u64 {
            for c in 0..3u64 {
                g.add_node(NodeId(10 * r + c), r as f64 * STEP_DEG, c as f64 * STEP_DEG)
                    .unwrap();
            }
        }
        for r in 0..3u64 {
            for c in 0..3u64 {
                let n = NodeId(10 * r + c);
                if c < 2 {
                    g.add_road(n, NodeId(10 * r + c + 1), 20.0).unwrap();
                }
                if r < 2 {
                    g.add_road(n, NodeId(10 * (r + 1) + c), 20.0).unwrap();
                }
            }
        }
        g
    }

    /// Sorted `(neighbor, cost bits)` pairs, for exact adjacency comparison.
    pub fn out_signature(g: &Graph, n: NodeId) -> Vec<(NodeId, u64)> {
        let mut v: Vec<_> = g.out_links(n).iter().map(|l| (l.node, l.cost.to_bits())).collect();
        v.sort();
        v
    }

    pub fn in_signature(g: &Graph, n: NodeId) -> Vec<(NodeId, u64)> {
        let mut v: Vec<_> = g.in_links(n).iter().map(|l| (l.node, l.cost.to_bits())).collect();
        v.sort();
        v
    }

    pub fn edge_signature(g: &Graph) -> Vec<(NodeId, NodeId, u64)> {
        let mut v: Vec<_> = g.edges().iter().map(|e| (e.from, e.to, e.cost.to_bits())).collect();
        v.sort();
        v
    }
}

// ── Construction ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod construction {
    use nav_core::NodeId;

    use crate::{Graph, GraphError};

    #[test]
    fn empty_graph() {
        let g = Graph::new();
        assert_eq!(g.node_count(), 0);
        assert_eq!(g.edge_count(), 0);
        assert!(g.is_empty());
    }

    #[test]
    fn duplicate_node_rejected() {
        let mut g = Graph::new();
        g.add_node(NodeId(1), 0.0, 0.0).unwrap();
        let err = g.add_node(NodeId(1), 1.0, 1.0).unwrap_err();
        assert!(matches!(err, GraphError::DuplicateNode(NodeId(1))));
        // Original coordinates are untouched.
        assert_eq!(g.position(NodeId(1)).unwrap().lat, 0.0);
    }

    #[test]
    fn invalid_coordinate_rejected() {
        let mut g = Graph::new();
        assert!(matches!(
            g.add_node(NodeId(1), f64::NAN, 0.0),
            Err(GraphError::InvalidCoordinate { .. })
        ));
        assert!(g.is_empty());
    }

    #[test]
    fn edge_to_unknown_node_rejected() {
        let mut g = Graph::new();
        g.add_node(NodeId(1), 0.0, 0.0).unwrap();
        assert!(matches!(
            g.add_edge(NodeId(1), NodeId(9), 1.0),
            Err(GraphError::UnknownNode(NodeId(9)))
        ));
        assert_eq!(g.edge_count(), 0);
    }

    #[test]
    fn invalid_costs_rejected() {
        let mut g = Graph::new();
        g.add_node(NodeId(1), 0.0, 0.0).unwrap();
        g.add_node(NodeId(2), 0.0, 0.001).unwrap();
        for bad in [-1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                g.add_edge(NodeId(1), NodeId(2), bad),
                Err(GraphError::InvalidCost { .. })
            ));
        }
        // Signed edges accept negatives but still not non-finite values.
        assert!(g.add_signed_edge(NodeId(1), NodeId(2), -3.0).unwrap());
        assert!(g.add_signed_edge(NodeId(1), NodeId(2), f64::NEG_INFINITY).is_err());
        assert_eq!(g.cost(NodeId(1), NodeId(2)), -3.0);
    }

    #[test]
    fn directed_only_edge() {
        let mut g = Graph::new();
        g.add_node(NodeId(1), 0.0, 0.0).unwrap();
        g.add_node(NodeId(2), 0.0, 0.001).unwrap();
        g.add_edge(NodeId(1), NodeId(2), 5.0).unwrap();
        assert!(g.has_edge(NodeId(1), NodeId(2)));
        assert!(!g.has_edge(NodeId(2), NodeId(1)));
        assert_eq!(g.cost(NodeId(2), NodeId(1)), f64::INFINITY);
        assert_eq!(g.in_links(NodeId(2))[0].node, NodeId(1));
    }

    #[test]
    fn parallel_edges_cost_is_minimum() {
        let mut g = Graph::new();
        g.add_node(NodeId(1), 0.0, 0.0).unwrap();
        g.add_node(NodeId(2), 0.0, 0.001).unwrap();
        g.add_edge(NodeId(1), NodeId(2), 9.0).unwrap();
        g.add_edge(NodeId(1), NodeId(2), 4.0).unwrap();
        assert_eq!(g.cost(NodeId(1), NodeId(2)), 4.0);
        assert_eq!(g.neighbors(NodeId(1)).count(), 2);
        assert_eq!(g.edge_count(), 2);
    }

    #[test]
    fn unknown_node_is_isolated() {
        let (g, _) = super::helpers::line_graph();
        assert_eq!(g.neighbors(NodeId(99)).count(), 0);
        assert_eq!(g.cost(NodeId(99), NodeId(1)), f64::INFINITY);
        assert!(!g.has_edge(NodeId(99), NodeId(1)));
        assert_eq!(g.heuristic(NodeId(99), NodeId(1)), 0.0);
    }

    #[test]
    fn heuristic_is_geodesic_metres() {
        let (g, [a, _, _, _, e]) = super::helpers::line_graph();
        let h = g.heuristic(a, e);
        // 4 × 0.0001° of latitude ≈ 44.5 m
        assert!((h - 44.48).abs() < 0.1, "got {h}");
        assert_eq!(g.heuristic(a, a), 0.0);
        // Never above the 80 m of road between them.
        assert!(h <= 80.0);
    }

    #[test]
    fn nodes_iterate_in_insertion_order() {
        let (g, ids) = super::helpers::line_graph();
        assert_eq!(g.nodes().collect::<Vec<_>>(), ids.to_vec());
    }
}

// ── Obstacles ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod obstacles {
    use nav_core::NodeId;

    use super::helpers::{edge_signature, grid_graph, in_signature, line_graph, out_signature};
    use crate::{Graph, GraphError};

    #[test]
    fn obstacle_detaches_incident_edges() {
        let (mut g, [a, b, c, d, _]) = line_graph();
        assert!(g.add_obstacle(c).unwrap());
        assert!(g.is_obstacle(c));
        assert_eq!(g.neighbors(c).count(), 0);
        assert!(!g.has_edge(b, c));
        assert!(!g.has_edge(d, c));
        assert_eq!(g.cost(b, c), f64::INFINITY);
        assert!(g.edges().iter().all(|e| e.from != c && e.to != c));
        // Unrelated edges survive.
        assert!(g.has_edge(a, b));
        assert_eq!(g.edge_count(), 4);
    }

    #[test]
    fn add_obstacle_is_idempotent() {
        let (mut g, [_, _, c, _, _]) = line_graph();
        assert!(g.add_obstacle(c).unwrap());
        let edges = edge_signature(&g);
        assert!(!g.add_obstacle(c).unwrap());
        assert_eq!(edge_signature(&g), edges);
        assert_eq!(g.obstacle_count(), 1);

        // A single removal fully restores after a double add.
        assert!(g.remove_obstacle(c).unwrap());
        assert_eq!(g.edge_count(), 8);
    }

    #[test]
    fn remove_never_obstructed_is_noop() {
        let (mut g, [_, b, _, _, _]) = line_graph();
        let before = edge_signature(&g);
        assert!(!g.remove_obstacle(b).unwrap());
        assert_eq!(edge_signature(&g), before);
    }

    #[test]
    fn unknown_node_obstacle_is_error() {
        let (mut g, _) = line_graph();
        assert!(matches!(g.add_obstacle(NodeId(42)), Err(GraphError::UnknownNode(_))));
        assert!(matches!(g.remove_obstacle(NodeId(42)), Err(GraphError::UnknownNode(_))));
    }

    #[test]
    fn round_trip_restores_exactly() {
        let mut g = grid_graph();
        // Add a parallel edge and a one-way edge touching the centre.
        g.add_edge(NodeId(11), NodeId(12), 35.0).unwrap();
        g.add_edge(NodeId(0), NodeId(11), 30.0).unwrap();

        let nodes: Vec<NodeId> = g.nodes().collect();
        let before_out: Vec<_> = nodes.iter().map(|&n| out_signature(&g, n)).collect();
        let before_in: Vec<_> = nodes.iter().map(|&n| in_signature(&g, n)).collect();
        let before_edges = edge_signature(&g);
        let before_costs: Vec<f64> =
            nodes.iter().flat_map(|&u| nodes.iter().map(move |&v| (u, v))).map(|(u, v)| g.cost(u, v)).collect();

        g.add_obstacle(NodeId(11)).unwrap();
        g.remove_obstacle(NodeId(11)).unwrap();

        let after_out: Vec<_> = nodes.iter().map(|&n| out_signature(&g, n)).collect();
        let after_in: Vec<_> = nodes.iter().map(|&n| in_signature(&g, n)).collect();
        let after_costs: Vec<f64> =
            nodes.iter().flat_map(|&u| nodes.iter().map(move |&v| (u, v))).map(|(u, v)| g.cost(u, v)).collect();
        assert_eq!(after_out, before_out);
        assert_eq!(after_in, before_in);
        assert_eq!(edge_signature(&g), before_edges);
        assert_eq!(after_costs, before_costs);
    }

    #[test]
    fn round_trip_keeps_adjacency_order() {
        let (mut g, [a, b, c, _, _]) = line_graph();
        assert_eq!(g.neighbors(b).collect::<Vec<_>>(), vec![a, c]);
        let before_edges = g.edges().to_vec();

        g.add_obstacle(a).unwrap();
        g.remove_obstacle(a).unwrap();
        assert_eq!(g.neighbors(b).collect::<Vec<_>>(), vec![a, c]);
        assert_eq!(g.in_links(b).iter().map(|l| l.node).collect::<Vec<_>>(), vec![a, c]);
        assert_eq!(g.edges(), &before_edges[..]);
    }

    #[test]
    fn overlapping_obstacles_keep_edge_order() {
        let mut g = grid_graph();
        let nodes: Vec<NodeId> = g.nodes().collect();
        let before_out: Vec<Vec<NodeId>> = nodes.iter().map(|&n| g.neighbors(n).collect()).collect();
        let before_edges = g.edges().to_vec();

        g.add_obstacles(&[NodeId(11), NodeId(1), NodeId(12)]).unwrap();
        g.remove_obstacle(NodeId(1)).unwrap();
        g.remove_obstacles(&[NodeId(12), NodeId(11)]).unwrap();

        let after_out: Vec<Vec<NodeId>> = nodes.iter().map(|&n| g.neighbors(n).collect()).collect();
        assert_eq!(after_out, before_out);
        assert_eq!(g.edges(), &before_edges[..]);
    }

    #[test]
    fn adjacent_obstacles_restore_in_any_order() {
        for first_cleared in [0usize, 1] {
            let (mut g, [_, b, c, _, _]) = line_graph();
            let before = edge_signature(&g);
            g.add_obstacle(b).unwrap();
            g.add_obstacle(c).unwrap();
            assert_eq!(g.edge_count(), 2); // only 4 ↔ 5 left

            let order = if first_cleared == 0 { [b, c] } else { [c, b] };
            g.remove_obstacle(order[0]).unwrap();
            // The b ↔ c road must stay detached while one end is obstructed.
            assert!(!g.has_edge(b, c));
            assert!(!g.has_edge(c, b));
            g.remove_obstacle(order[1]).unwrap();

            assert_eq!(edge_signature(&g), before, "clearing order {order:?}");
        }
    }

    #[test]
    fn self_loop_cached_once() {
        let mut g = Graph::new();
        g.add_node(NodeId(1), 0.0, 0.0).unwrap();
        g.add_edge(NodeId(1), NodeId(1), 2.0).unwrap();
        g.add_obstacle(NodeId(1)).unwrap();
        assert_eq!(g.edge_count(), 0);
        g.remove_obstacle(NodeId(1)).unwrap();
        assert_eq!(g.edge_count(), 1);
        assert_eq!(g.out_links(NodeId(1)).len(), 1);
        assert_eq!(g.in_links(NodeId(1)).len(), 1);
    }

    #[test]
    fn edge_touching_obstacle_is_ignored() {
        let (mut g, [a, _, c, _, _]) = line_graph();
        g.add_obstacle(c).unwrap();
        assert!(!g.add_edge(a, c, 5.0).unwrap());
        assert!(!g.add_edge(c, a, 5.0).unwrap());
        g.remove_obstacle(c).unwrap();
        // The rejected edges were never stored, so they do not reappear.
        assert!(!g.has_edge(a, c));
        assert!(!g.has_edge(c, a));
    }

    #[test]
    fn batch_obstacles_report_new_nodes_only() {
        let (mut g, [a, b, c, _, _]) = line_graph();
        g.add_obstacle(b).unwrap();
        let added = g.add_obstacles(&[a, b, c, a]).unwrap();
        assert_eq!(added, vec![a, c]);
        let removed = g.remove_obstacles(&[c, NodeId(4)]).unwrap();
        assert_eq!(removed, vec![c]);
    }

    #[test]
    fn batch_with_unknown_node_changes_nothing() {
        let (mut g, [a, ..]) = line_graph();
        assert!(g.add_obstacles(&[a, NodeId(77)]).is_err());
        assert!(!g.is_obstacle(a));
        assert_eq!(g.edge_count(), 8);
    }

    #[test]
    fn random_round_trips_restore_graph() {
        use rand::rngs::SmallRng;
        use rand::{Rng, SeedableRng};

        let mut rng = SmallRng::seed_from_u64(7);
        let mut g = grid_graph();
        let before = edge_signature(&g);
        let ordered = g.edges().to_vec();
        let nodes: Vec<NodeId> = g.nodes().collect();

        for _ in 0..50 {
            let batch: Vec<NodeId> =
                (0..rng.gen_range(1..5)).map(|_| nodes[rng.gen_range(0..nodes.len())]).collect();
            g.add_obstacles(&batch).unwrap();
            // Clear a random subset, then everything else.
            let partial: Vec<NodeId> = batch.iter().copied().filter(|_| rng.gen_bool(0.5)).collect();
            g.remove_obstacles(&partial).unwrap();
            g.remove_obstacles(&nodes).unwrap();
            assert_eq!(edge_signature(&g), before);
            assert_eq!(g.edges(), &ordered[..]);
        }
    }
}

// ── Spatial queries ───────────────────────────────────────────────────────────

#[cfg(test)]
mod spatial {
    use nav_core::{GeoPoint, NodeId, SnapConfig};

    use super::helpers::{STEP_DEG, grid_graph, line_graph};
    use crate::{Graph, GraphError};

    #[test]
    fn nearest_exact_position() {
        let (g, [a, ..]) = line_graph();
        assert_eq!(g.find_nearest_node(0.0, 0.0), Some(a));
    }

    #[test]
    fn nearest_between_nodes() {
        let (g, [a, b, ..]) = line_graph();
        assert_eq!(g.find_nearest_node(0.4 * STEP_DEG, 0.0), Some(a));
        assert_eq!(g.find_nearest_node(0.6 * STEP_DEG, 0.0), Some(b));
    }

    #[test]
    fn nearest_skips_obstacles() {
        let (mut g, [a, b, ..]) = line_graph();
        g.add_obstacle(a).unwrap();
        assert_eq!(g.find_nearest_node(0.0, 0.0), Some(b));
    }

    #[test]
    fn empty_graph_returns_none() {
        let g = Graph::new();
        assert!(g.find_nearest_node(0.0, 0.0).is_none());
        assert!(g.find_nearest_node_within_radius(0.0, 0.0, 10.0, 10.0, 100.0).unwrap().is_none());
    }

    #[test]
    fn index_goes_dirty_on_insert_and_rebuilds_lazily() {
        let (mut g, _) = line_graph();
        assert!(g.spatial_index().len() == 5);
        g.add_node(NodeId(6), 1.0, 1.0).unwrap();
        assert_eq!(g.find_nearest_node(1.0, 1.0), Some(NodeId(6)));
        let index = g.spatial_index();
        assert!(!index.is_dirty());
        assert_eq!(index.len(), 6);
    }

    #[test]
    fn obstacle_edits_do_not_dirty_index() {
        let (mut g, [_, _, c, _, _]) = line_graph();
        drop(g.spatial_index());
        g.add_obstacle(c).unwrap();
        assert!(!g.spatial_index().is_dirty());
    }

    #[test]
    fn radius_search_grows_until_hit() {
        let (g, [_, _, _, _, e]) = line_graph();
        // Query 1 km north of node 5; first ring (10 m) is empty.
        let lat = 4.0 * STEP_DEG + 0.009;
        let hit = g.find_nearest_node_within_radius(lat, 0.0, 10.0, 100.0, 2_000.0).unwrap();
        assert_eq!(hit, Some(e));
        // Capped below the gap: nothing.
        let miss = g.find_nearest_node_within_radius(lat, 0.0, 10.0, 100.0, 900.0).unwrap();
        assert_eq!(miss, None);
    }

    #[test]
    fn radius_search_checks_max_radius_exactly() {
        let (g, [a, ..]) = line_graph();
        // Node 1 sits ~111 m south; step overshoots but max_radius is searched.
        let lat = -0.001;
        let hit = g.find_nearest_node_within_radius(lat, 0.0, 0.0, 1_000.0, 120.0).unwrap();
        assert_eq!(hit, Some(a));
    }

    #[test]
    fn radius_search_returns_closest_in_ring() {
        let g = grid_graph();
        // Near the centre node 11, a big first ring covers the whole grid.
        let hit = g
            .find_nearest_node_within_radius(1.1 * STEP_DEG, 0.9 * STEP_DEG, 500.0, 10.0, 500.0)
            .unwrap();
        assert_eq!(hit, Some(NodeId(11)));
    }

    #[test]
    fn radius_search_never_returns_obstacle() {
        let mut g = grid_graph();
        let all: Vec<NodeId> = g.nodes().collect();
        g.add_obstacles(&all).unwrap();
        let hit = g.find_nearest_node_within_radius(0.0, 0.0, 1.0, 50.0, 5_000.0).unwrap();
        assert_eq!(hit, None);

        g.remove_obstacle(NodeId(22)).unwrap();
        let hit = g.find_nearest_node_within_radius(0.0, 0.0, 1.0, 50.0, 5_000.0).unwrap();
        assert_eq!(hit, Some(NodeId(22)));
    }

    #[test]
    fn radius_search_rejects_bad_parameters() {
        let (g, _) = line_graph();
        for (i, s, m) in [(10.0, 0.0, 100.0), (10.0, -5.0, 100.0), (-1.0, 5.0, 100.0), (1.0, 5.0, f64::NAN)] {
            assert!(matches!(
                g.find_nearest_node_within_radius(0.0, 0.0, i, s, m),
                Err(GraphError::InvalidRadius(_))
            ));
        }
    }

    #[test]
    fn invalid_query_coordinate_finds_nothing() {
        let (g, _) = line_graph();
        for (lat, lon) in [(f64::NAN, 0.0), (0.0, f64::NAN), (91.0, 0.0), (0.0, f64::INFINITY)] {
            assert_eq!(g.find_nearest_node(lat, lon), None);
            assert!(matches!(
                g.find_nearest_node_within_radius(lat, lon, 10.0, 100.0, 1_000.0),
                Err(GraphError::InvalidQuery { .. })
            ));
        }
    }

    #[test]
    fn snap_rejects_invalid_position() {
        let (g, _) = line_graph();
        let pos = GeoPoint { lat: f64::NAN, lon: 0.0 };
        assert!(matches!(
            g.snap(pos, &SnapConfig::default()),
            Err(GraphError::InvalidQuery { .. })
        ));
    }

    #[test]
    fn snap_uses_config() {
        let (g, [a, ..]) = line_graph();
        let cfg = SnapConfig::default();
        assert_eq!(g.snap(GeoPoint::new(0.0, 0.0001), &cfg).unwrap(), Some(a));
        assert_eq!(g.snap(GeoPoint::new(1.0, 1.0), &cfg).unwrap(), None);
    }

    #[test]
    fn nodes_in_bbox_excludes_obstacles() {
        let mut g = grid_graph();
        g.add_obstacle(NodeId(0)).unwrap();
        let bbox = nav_core::BoundingBox::from_corners(-1.0, -1.0, 1.5 * STEP_DEG, 1.5 * STEP_DEG);
        assert_eq!(g.nodes_in_bbox(&bbox), vec![NodeId(1), NodeId(10), NodeId(11)]);
    }
}

// ── Shared snapshots ──────────────────────────────────────────────────────────

#[cfg(test)]
mod shared {
    use crate::SharedGraph;

    #[test]
    fn snapshot_is_isolated_from_later_updates() {
        let (g, [_, _, c, _, _]) = super::helpers::line_graph();
        let shared = SharedGraph::new(g);
        let before = shared.snapshot();

        assert!(shared.update(|g| g.add_obstacle(c)).unwrap());
        assert!(shared.is_obstacle(c));
        assert!(!before.is_obstacle(c));
        assert_eq!(before.edge_count(), 8);
        assert_eq!(shared.snapshot().edge_count(), 4);
    }

    #[test]
    fn clones_share_state() {
        let (g, [a, ..]) = super::helpers::line_graph();
        let shared = SharedGraph::new(g);
        let other = shared.clone();
        other.update(|g| g.add_obstacle(a)).unwrap();
        assert!(shared.is_obstacle(a));
        assert!(shared.update(|g| g.remove_obstacle(a)).unwrap());
        assert!(!other.is_obstacle(a));
    }
}

// ── Obstacle manager ──────────────────────────────────────────────────────────

#[cfg(test)]
mod manager {
    use nav_core::{NodeId, RegionId};

    use super::helpers::{STEP_DEG, grid_graph};
    use crate::{ObstacleManager, SharedGraph};

    fn manager() -> ObstacleManager {
        ObstacleManager::new(SharedGraph::new(grid_graph()))
    }

    /// Box over the bottom-left 2 × 2 block: nodes 0, 1, 10, 11.
    const BOX: (f64, f64, f64, f64) = (-0.5 * STEP_DEG, -0.5 * STEP_DEG, 1.5 * STEP_DEG, 1.5 * STEP_DEG);

    #[test]
    fn region_applies_and_undoes() {
        let m = manager();
        let (la, lo, lb, lob) = BOX;
        let batch = m.add_area_obstacles(lb, lob, la, lo).unwrap().wait().unwrap().unwrap();

        assert_eq!(batch.id, RegionId(0));
        assert_eq!(batch.nodes, vec![NodeId(0), NodeId(1), NodeId(10), NodeId(11)]);
        for n in &batch.nodes {
            assert!(m.is_obstacle(*n));
        }
        assert!(!m.is_obstacle(NodeId(2)));
        assert_eq!(m.region_count(), 1);

        let undone = m.remove_last_region().unwrap().unwrap();
        assert_eq!(undone, batch);
        let snapshot = m.graph().snapshot();
        assert_eq!(snapshot.obstacle_count(), 0);
        assert_eq!(snapshot.edge_count(), grid_graph().edge_count());
        assert!(m.remove_last_region().unwrap().is_none());
    }

    #[test]
    fn region_undo_keeps_prior_obstacles() {
        let m = manager();
        m.add_obstacle(NodeId(11)).unwrap();
        m.add_obstacle(NodeId(22)).unwrap();

        let (la, lo, lb, lob) = BOX;
        let batch = m.add_area_obstacles(la, lo, lb, lob).unwrap().wait().unwrap().unwrap();
        assert!(!batch.nodes.contains(&NodeId(11)));

        m.remove_last_region().unwrap();
        // Obstacle membership returns to exactly the pre-region state.
        assert!(m.is_obstacle(NodeId(11)));
        assert!(m.is_obstacle(NodeId(22)));
        for n in [0, 1, 10] {
            assert!(!m.is_obstacle(NodeId(n)));
        }
    }

    #[test]
    fn regions_undo_in_stack_order() {
        let m = manager();
        let (la, lo, lb, lob) = BOX;
        let first = m.add_area_obstacles(la, lo, lb, lob).unwrap().wait().unwrap().unwrap();
        // Whole grid: only the five nodes outside the first box are new.
        let second = m
            .add_area_obstacles(-1.0, -1.0, 1.0, 1.0)
            .unwrap()
            .wait()
            .unwrap()
            .unwrap();
        assert_eq!(second.id, RegionId(1));
        assert_eq!(second.nodes.len(), 5);

        assert_eq!(m.remove_last_region().unwrap().unwrap().id, second.id);
        for n in &first.nodes {
            assert!(m.is_obstacle(*n));
        }
        assert_eq!(m.graph().snapshot().obstacle_count(), 4);
    }

    #[test]
    fn empty_region_is_recorded() {
        let m = manager();
        let batch = m.add_area_obstacles(50.0, 50.0, 51.0, 51.0).unwrap().wait().unwrap().unwrap();
        assert!(batch.nodes.is_empty());
        assert_eq!(m.region_count(), 1);
    }

    #[test]
    fn cancelled_region_is_all_or_nothing() {
        let m = manager();
        let (la, lo, lb, lob) = BOX;
        let task = m.add_area_obstacles(la, lo, lb, lob).unwrap();
        task.cancel();
        match task.wait().unwrap() {
            None => {
                assert_eq!(m.region_count(), 0);
                assert_eq!(m.graph().snapshot().obstacle_count(), 0);
            }
            Some(batch) => {
                assert_eq!(m.region_count(), 1);
                assert_eq!(m.graph().snapshot().obstacle_count(), batch.nodes.len());
            }
        }
    }

    #[test]
    fn point_undo_stack() {
        let m = manager();
        assert!(m.add_obstacle(NodeId(1)).unwrap());
        assert!(m.add_obstacle(NodeId(2)).unwrap());
        assert!(!m.add_obstacle(NodeId(2)).unwrap()); // not recorded twice
        assert_eq!(m.points(), vec![NodeId(1), NodeId(2)]);

        assert_eq!(m.remove_last_point().unwrap(), Some(NodeId(2)));
        assert!(!m.is_obstacle(NodeId(2)));
        assert!(m.is_obstacle(NodeId(1)));
        assert_eq!(m.remove_last_point().unwrap(), Some(NodeId(1)));
        assert_eq!(m.remove_last_point().unwrap(), None);
    }

    #[test]
    fn direct_removal_disowns_node() {
        let m = manager();
        let (la, lo, lb, lob) = BOX;
        m.add_area_obstacles(la, lo, lb, lob).unwrap().wait().unwrap();

        // Clear one region node by hand, then re-obstruct it as a point.
        assert!(m.remove_obstacle(NodeId(0)).unwrap());
        assert!(m.add_obstacle(NodeId(0)).unwrap());

        let undone = m.remove_last_region().unwrap().unwrap();
        assert!(!undone.nodes.contains(&NodeId(0)));
        // The point still owns it.
        assert!(m.is_obstacle(NodeId(0)));
        assert_eq!(m.points(), vec![NodeId(0)]);
        assert_eq!(m.remove_last_point().unwrap(), Some(NodeId(0)));
        assert!(!m.is_obstacle(NodeId(0)));
    }

    #[test]
    fn clear_undoes_everything() {
        let m = manager();
        m.add_obstacle(NodeId(22)).unwrap();
        let (la, lo, lb, lob) = BOX;
        m.add_area_obstacles(la, lo, lb, lob).unwrap().wait().unwrap();
        assert_eq!(m.clear().unwrap(), 5);
        assert_eq!(m.graph().snapshot().obstacle_count(), 0);
        assert_eq!(m.region_count(), 0);
        assert!(m.points().is_empty());
    }

    #[test]
    fn unknown_point_is_error() {
        let m = manager();
        assert!(m.add_obstacle(NodeId(999)).is_err());
        assert!(m.points().is_empty());
    }
}

// ── CSV loading ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod loader {
    use std::io::Cursor;

    use nav_core::NodeId;

    use crate::{GraphError, load_graph_reader};

    const NODES: &str = "id,lat,lon\n1,21.0285,105.8542\n2,21.0291,105.8550\n3,21.0300,105.8560\n";

    #[test]
    fn loads_nodes_and_edges() {
        let edges = "from,to,cost\n1,2,105.0\n2,1,105.0\n2,3,140.5\n";
        let g = load_graph_reader(Cursor::new(NODES), Cursor::new(edges)).unwrap();
        assert_eq!(g.node_count(), 3);
        assert_eq!(g.edge_count(), 3);
        assert_eq!(g.cost(NodeId(2), NodeId(3)), 140.5);
        assert!(!g.has_edge(NodeId(3), NodeId(2)));
    }

    #[test]
    fn unknown_endpoint_fails() {
        let edges = "from,to,cost\n1,9,10.0\n";
        let err = load_graph_reader(Cursor::new(NODES), Cursor::new(edges)).unwrap_err();
        assert!(matches!(err, GraphError::UnknownNode(NodeId(9))));
    }

    #[test]
    fn malformed_row_fails() {
        let edges = "from,to,cost\n1,2,abc\n";
        let err = load_graph_reader(Cursor::new(NODES), Cursor::new(edges)).unwrap_err();
        assert!(matches!(err, GraphError::Parse(_)));
    }

    #[test]
    fn duplicate_node_row_fails() {
        let nodes = "id,lat,lon\n1,0,0\n1,0,0\n";
        let err = load_graph_reader(Cursor::new(nodes), Cursor::new("from,to,cost\n")).unwrap_err();
        assert!(matches!(err, GraphError::DuplicateNode(NodeId(1))));
    }
}
