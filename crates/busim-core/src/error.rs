//! Core error type.
//!
//! Covers the configuration-error class: bad coordinates, bad speeds, bad
//! parameters.  Sub-crates wrap `CoreError` as one variant of their own enums.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid coordinate ({lat}, {lon})")]
    InvalidCoordinate { lat: f64, lon: f64 },

    #[error("invalid speed {0} km/h")]
    InvalidSpeed(f64),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for `busim-core`.
pub type CoreResult<T> = Result<T, CoreError>;
