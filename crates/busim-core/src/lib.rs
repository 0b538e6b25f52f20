//! `busim-core`: foundational types for the `busim` route simulation engine.
//!
//! This crate is a dependency of every other `busim-*` crate.  It has no
//! `busim-*` dependencies and minimal external ones (only `thiserror`, plus
//! optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                                 |
//! |-----------------|----------------------------------------------------------|
//! | [`ids`]         | `VehicleId`                                              |
//! | [`geo`]         | `GeoPoint`, haversine distance, `LocalScale`, projection |
//! | [`time`]        | `Timestamp` (wall-clock milliseconds)                    |
//! | [`config`]      | `SimParams`: thresholds and defaults                     |
//! | [`error`]       | `CoreError`, `CoreResult`                                |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod config;
pub mod error;
pub mod geo;
pub mod ids;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::SimParams;
pub use error::{CoreError, CoreResult};
pub use geo::{GeoPoint, LocalScale, SegmentProjection};
pub use ids::VehicleId;
pub use time::Timestamp;
