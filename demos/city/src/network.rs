//! Synthetic street grid in central Mobile, Alabama.
//!
//! Node layout (`size × size` nodes, row = south→north, col = west→east):
//!
//! ```text
//!  row size-1:  (size-1)*size … size*size-1
//!       …
//!  row 0:       0 1 2 …       size-1
//! ```
//!
//! Node id = `row * size + col`.  Roughly 110 m between rows and 95 m between
//! columns.  Each block edge costs its straight-line length times a random
//! detour factor in `[1.0, 1.4)`, so the geodesic heuristic stays
//! consistent.  About one street in ten is one-way.

use anyhow::Result;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use nav_core::{BoundingBox, GeoPoint, NodeId};
use nav_graph::Graph;

const LAT_MIN:  f64 = 30.66;
const LAT_STEP: f64 = 0.001;
const LON_MIN:  f64 = -88.09;
const LON_STEP: f64 = 0.001;

const ONE_WAY_SHARE: f64 = 0.1;

pub struct Grid {
    pub graph: Graph,
    pub size:  usize,
}

impl Grid {
    pub fn node(&self, row: usize, col: usize) -> NodeId {
        NodeId((row * self.size + col) as u64)
    }

    pub fn position(&self, row: usize, col: usize) -> GeoPoint {
        GeoPoint::new(LAT_MIN + row as f64 * LAT_STEP, LON_MIN + col as f64 * LON_STEP)
    }

    /// Box covering the middle third of the grid.
    pub fn centre_box(&self) -> BoundingBox {
        let lo = self.position(self.size / 3, self.size / 3);
        let hi = self.position(2 * self.size / 3, 2 * self.size / 3);
        BoundingBox::from_corners(lo.lat, lo.lon, hi.lat, hi.lon)
    }
}

/// Build a `size × size` grid from `seed`.
pub fn build_grid(size: usize, seed: u64) -> Result<Grid> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut grid = Grid { graph: Graph::with_capacity(size * size, 4 * size * size), size };

    for row in 0..size {
        for col in 0..size {
            let p = grid.position(row, col);
            let id = grid.node(row, col);
            grid.graph.add_node(id, p.lat, p.lon)?;
        }
    }

    for row in 0..size {
        for col in 0..size {
            let a = grid.node(row, col);
            let mut street = |b: NodeId| -> Result<()> {
                let cost = grid.graph.heuristic(a, b) * rng.gen_range(1.0..1.4);
                if rng.gen_bool(ONE_WAY_SHARE) {
                    grid.graph.add_edge(a, b, cost)?;
                } else {
                    grid.graph.add_road(a, b, cost)?;
                }
                Ok(())
            };
            if col + 1 < size {
                street(NodeId(a.get() + 1))?;
            }
            if row + 1 < size {
                street(NodeId(a.get() + size as u64))?;
            }
        }
    }

    Ok(grid)
}
