//! `nav-core`: foundational types for the road-network routing engine.
//!
//! This crate is a dependency of every other `nav-*` crate.  It has no
//! `nav-*` dependencies and minimal external ones (only `thiserror`, plus
//! optional `serde`).
//!
//! # What lives here
//!
//! | Module     | Contents                                                 |
//! |------------|----------------------------------------------------------|
//! | [`ids`]    | `NodeId`, `RegionId`                                     |
//! | [`geo`]    | `GeoPoint`, `BoundingBox`, haversine, unit-sphere helpers|
//! | [`config`] | `SearchLimits`, `SnapConfig`, `NavConfig`                |
//! | [`error`]  | `CoreError`, `CoreResult`                                |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to public types and         |
//! |         | `NavConfig::from_json`.                                    |

pub mod config;
pub mod error;
pub mod geo;
pub mod ids;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{NavConfig, SearchLimits, SnapConfig};
pub use error::{CoreError, CoreResult};
pub use geo::{BoundingBox, GeoPoint};
pub use ids::{NodeId, RegionId};
