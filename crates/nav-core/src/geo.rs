//! Geographic coordinate type and spatial utilities.
//!
//! `GeoPoint` uses `f64` latitude/longitude.  Edge costs handed to the graph
//! are usually haversine lengths computed by the loader, and the search
//! heuristic must never exceed them; keeping both in double precision avoids
//! rounding the heuristic above an edge's own length.

use crate::CoreError;

/// Mean Earth radius in metres.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A WGS-84 geographic coordinate in degrees.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    #[inline]
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Like [`GeoPoint::new`] but rejects non-finite values and latitudes
    /// outside `[-90, 90]` / longitudes outside `[-180, 180]`.
    pub fn try_new(lat: f64, lon: f64) -> Result<Self, CoreError> {
        let valid = lat.is_finite()
            && lon.is_finite()
            && (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&lon);
        if valid {
            Ok(Self { lat, lon })
        } else {
            Err(CoreError::InvalidCoordinate { lat, lon })
        }
    }

    /// Haversine great-circle distance in metres.
    pub fn distance_m(self, other: GeoPoint) -> f64 {
        let d_lat = (other.lat - self.lat).to_radians();
        let d_lon = (other.lon - self.lon).to_radians();

        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();

        let a = (d_lat * 0.5).sin().powi(2)
            + lat1.cos() * lat2.cos() * (d_lon * 0.5).sin().powi(2);

        // Clamp: rounding can push `a` a hair above 1 for antipodal points.
        let c = 2.0 * a.clamp(0.0, 1.0).sqrt().asin();
        EARTH_RADIUS_M * c
    }

    /// Position on the unit sphere (`[x, y, z]`, Earth-centred).
    ///
    /// Straight-line (chord) distance between two such vectors is a strictly
    /// increasing function of great-circle distance, so a Euclidean
    /// nearest-neighbour query over these points returns nodes in exact
    /// geodesic order.
    pub fn unit_vector(self) -> [f64; 3] {
        let lat = self.lat.to_radians();
        let lon = self.lon.to_radians();
        [lat.cos() * lon.cos(), lat.cos() * lon.sin(), lat.sin()]
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lon)
    }
}

/// Squared chord length on the unit sphere equivalent to a great-circle
/// distance of `metres`.  Used to turn metre radii into R-tree query radii.
pub fn chord_2_for_metres(metres: f64) -> f64 {
    let angle = (metres / EARTH_RADIUS_M).min(std::f64::consts::PI);
    let chord = 2.0 * (angle * 0.5).sin();
    chord * chord
}

// ── BoundingBox ───────────────────────────────────────────────────────────────

/// Axis-aligned lat/lon rectangle, inclusive on every edge.
///
/// Built from any two opposite corners; the constructor normalises them so
/// `min_* <= max_*`.  Boxes crossing the antimeridian are not supported.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoundingBox {
    pub min_lat: f64,
    pub min_lon: f64,
    pub max_lat: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    pub fn from_corners(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> Self {
        Self {
            min_lat: lat1.min(lat2),
            min_lon: lon1.min(lon2),
            max_lat: lat1.max(lat2),
            max_lon: lon1.max(lon2),
        }
    }

    #[inline]
    pub fn contains(&self, p: GeoPoint) -> bool {
        (self.min_lat..=self.max_lat).contains(&p.lat)
            && (self.min_lon..=self.max_lon).contains(&p.lon)
    }

    /// Midpoint of the box, e.g. for placing a region marker.
    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(
            (self.min_lat + self.max_lat) * 0.5,
            (self.min_lon + self.max_lon) * 0.5,
        )
    }
}

impl std::fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{:.6}, {:.6}] × [{:.6}, {:.6}]",
            self.min_lat, self.max_lat, self.min_lon, self.max_lon
        )
    }
}
