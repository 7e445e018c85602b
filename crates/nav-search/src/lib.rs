//! `nav-search`: interchangeable path searches over a `nav-graph` graph.
//!
//! # Crate layout
//!
//! | Module            | Contents                                                |
//! |-------------------|---------------------------------------------------------|
//! | [`strategy`]      | `PathSearch` trait, `Algorithm`, the strategy structs  |
//! | [`report`]        | `SearchReport`, `SearchOutcome`                         |
//! | [`path`]          | `reconstruct_path`, `path_distance_m`                   |
//! | [`error`]         | `SearchError`, `SearchResult<T>`                        |
//!
//! The algorithms themselves live in private modules, one per family:
//! `astar`, `bidirectional`, `concurrent`, `greedy`, `dijkstra`,
//! `traversal` (BFS and DFS) and `bellman_ford`.
//!
//! # Obstacles
//!
//! Obstacles are removed from the graph's adjacency when placed, so the
//! searches never test for them while expanding.  Only the start and goal
//! are checked up front.
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on `nav-core` types.       |

mod astar;
mod bellman_ford;
mod bidirectional;
mod concurrent;
mod dijkstra;
mod frontier;
mod greedy;
mod traversal;

pub mod error;
pub mod path;
pub mod report;
pub mod strategy;


pub use error::{SearchError, SearchResult};
pub use path::{path_distance_m, reconstruct_path};
pub use report::{SearchOutcome, SearchReport};
pub use strategy::{
    AStar, Algorithm, BellmanFord, BidirectionalAStar, BreadthFirst, ConcurrentBidirectionalAStar,
    DepthFirst, Dijkstra, GreedyBestFirst, ParseAlgorithmError, PathSearch,
};
