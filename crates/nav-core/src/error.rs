//! Core error type.
//!
//! Sub-crates define their own error enums and wrap `CoreError` as one
//! variant where a core validation can fail on their behalf.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid coordinate ({lat}, {lon})")]
    InvalidCoordinate { lat: f64, lon: f64 },

    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for `nav-core`.
pub type CoreResult<T> = Result<T, CoreError>;
