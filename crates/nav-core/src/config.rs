//! Engine configuration.
//!
//! Plain structs with sensible `Default`s.  The application crate typically
//! loads a [`NavConfig`] from a JSON file (feature = `"serde"`) and hands the
//! pieces to the graph and the search strategies.

use std::time::Duration;

use crate::{CoreError, CoreResult};

// ── SearchLimits ──────────────────────────────────────────────────────────────

/// Optional bounds on a single search invocation.
///
/// Searches on disconnected or obstacle-sealed regions otherwise explore
/// everything reachable before giving up.  When a bound is hit the search
/// reports a timed-out outcome, distinct from "no path".
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SearchLimits {
    /// Stop after this many node expansions.  `None` = unbounded.
    pub max_expansions: Option<usize>,

    /// Stop once this much wall-clock time has elapsed.  `None` = unbounded.
    pub timeout_ms: Option<u64>,
}

impl SearchLimits {
    /// No expansion cap, no deadline.
    pub const UNBOUNDED: SearchLimits = SearchLimits { max_expansions: None, timeout_ms: None };

    pub fn with_max_expansions(mut self, n: usize) -> Self {
        self.max_expansions = Some(n);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
        self
    }

    #[inline]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    pub fn is_unbounded(&self) -> bool {
        self.max_expansions.is_none() && self.timeout_ms.is_none()
    }
}

// ── SnapConfig ────────────────────────────────────────────────────────────────

/// Expanding-ring parameters for snapping a clicked coordinate to a node.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SnapConfig {
    /// First search radius, metres.  Default: 50.
    pub initial_radius_m: f64,
    /// Radius growth per ring, metres.  Default: 50.
    pub step_m: f64,
    /// Give up beyond this radius, metres.  Default: 1000.
    pub max_radius_m: f64,
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self { initial_radius_m: 50.0, step_m: 50.0, max_radius_m: 1_000.0 }
    }
}

impl SnapConfig {
    pub fn validate(&self) -> CoreResult<()> {
        let finite = self.initial_radius_m.is_finite()
            && self.step_m.is_finite()
            && self.max_radius_m.is_finite();
        if !finite || self.initial_radius_m < 0.0 || self.max_radius_m < 0.0 {
            return Err(CoreError::Config(format!(
                "snap radii must be finite and non-negative: {self:?}"
            )));
        }
        if self.step_m <= 0.0 {
            return Err(CoreError::Config(format!(
                "snap step must be positive, got {}",
                self.step_m
            )));
        }
        Ok(())
    }
}

// ── NavConfig ─────────────────────────────────────────────────────────────────

/// Top-level engine configuration.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NavConfig {
    pub search: SearchLimits,
    pub snap:   SnapConfig,
}

impl NavConfig {
    pub fn validate(&self) -> CoreResult<()> {
        if self.search.max_expansions == Some(0) {
            return Err(CoreError::Config("max_expansions must be at least 1".into()));
        }
        self.snap.validate()
    }

    /// Parse and validate a JSON configuration document.  Missing fields
    /// take their defaults.
    #[cfg(feature = "serde")]
    pub fn from_json(text: &str) -> CoreResult<Self> {
        let config: NavConfig =
            serde_json::from_str(text).map_err(|e| CoreError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}
