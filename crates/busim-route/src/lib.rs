//! `busim-route`: route polylines, stop extraction, and external sources.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                      |
//! |-------------|---------------------------------------------------------------|
//! | [`route`]   | `Route` (polyline + cumulative table), `RouteProjection`      |
//! | [`stops`]   | `StopCandidate`, `Stop`, `extract_stops`                      |
//! | [`source`]  | `RouteSource` / `StopSource` traits, `BoundingBox`, fixtures  |
//! | [`loader`]  | CSV loaders for polylines and stop candidates                 |
//! | [`error`]   | `RouteError`, `RouteResult<T>`                                |

pub mod error;
pub mod loader;
pub mod route;
pub mod source;
pub mod stops;

#[cfg(test)]
mod tests;

pub use error::{RouteError, RouteResult};
pub use loader::{load_candidates_csv, load_candidates_reader, load_polyline_csv, load_polyline_reader};
pub use route::{Route, RouteProjection};
pub use source::{BoundingBox, FixedRouteSource, RouteSource, StopCatalog, StopSource, StraightLineSource};
pub use stops::{Stop, StopCandidate, extract_stops};
