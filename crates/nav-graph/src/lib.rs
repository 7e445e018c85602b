//! `nav-graph`: road graph, obstacle overlay, and spatial indexing.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                  |
//! |--------------|-----------------------------------------------------------|
//! | [`graph`]    | `Graph` (slot-indexed adjacency + obstacles), `Edge`, `Link` |
//! | [`spatial`]  | `SpatialIndex` (R-tree cache with an explicit dirty bit)  |
//! | [`shared`]   | `SharedGraph` (snapshot-swapping concurrent handle)       |
//! | [`obstacle`] | `ObstacleManager`, `RegionTask`, `RegionBatch`            |
//! | [`loader`]   | `load_graph_csv`, `load_graph_reader`                     |
//! | [`error`]    | `GraphError`, `GraphResult<T>`                            |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on `nav-core` types.       |

pub mod error;
pub mod graph;
pub mod loader;
pub mod obstacle;
pub mod shared;
pub mod spatial;

#[cfg(test)]
mod tests;

pub use error::{GraphError, GraphResult};
pub use graph::{Edge, Graph, Link};
pub use loader::{load_graph_csv, load_graph_reader};
pub use obstacle::{ObstacleError, ObstacleManager, ObstacleResult, RegionBatch, RegionTask};
pub use shared::SharedGraph;
pub use spatial::SpatialIndex;
