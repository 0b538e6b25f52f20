//! Route-subsystem error type.

use thiserror::Error;

use busim_core::{CoreError, GeoPoint};

/// Errors produced by `busim-route` and by route/stop sources.
///
/// Source failures are reported here but never abort vehicle creation: the
/// sim crate turns them into straight-line mode or an empty stop list.
#[derive(Debug, Error)]
pub enum RouteError {
    #[error("no route from {from} to {to}")]
    NoRoute { from: GeoPoint, to: GeoPoint },

    #[error("source unavailable: {0}")]
    Unavailable(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type RouteResult<T> = Result<T, RouteError>;
