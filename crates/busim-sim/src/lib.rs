//! `busim-sim`: vehicle state machine and the shared simulation registry.
//!
//! # Poll-driven stepping
//!
//! ```text
//! client request at wall time `now`
//!   └─ Registry::snapshot(now)
//!        for each vehicle (own lock, optionally on Rayon's pool):
//!          ① Vehicle::advance   consume now - last_update as distance,
//!                               enter/leave dwell, detect arrival
//!          ② Vehicle::report    position, remaining km, ETA, state
//!        → Vec<VehicleReport> sorted by id
//! ```
//!
//! There is no background timer.  A vehicle nobody asks about does not move
//! until the next request, and then covers the whole elapsed interval at once.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                 |
//! |--------------|----------------------------------------------------------|
//! | [`vehicle`]  | `Vehicle`, `VehicleState`, `VehicleEvent`                |
//! | [`builder`]  | `VehicleBuilder`: route and stop resolution              |
//! | [`registry`] | `Registry`: per-vehicle locking, snapshots, destination  |
//! | [`report`]   | `VehicleReport`, `VehicleStatus`                         |
//! | [`tracker`]  | `PositionTracker` for real GPS clients                   |
//! | [`observer`] | `SnapshotObserver`, `NoopObserver`                       |
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                 |
//! |------------|--------------------------------------------------------|
//! | `parallel` | Advances vehicles on Rayon's thread pool in snapshots. |
//! | `fx-hash`  | FxHash instead of SipHash for the id maps.             |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use busim_core::{GeoPoint, SimParams, Timestamp};
//! use busim_route::StraightLineSource;
//! use busim_sim::{Registry, VehicleBuilder};
//!
//! let registry = Registry::new(SimParams::default());
//! let bus = VehicleBuilder::new("bus-1", GeoPoint::new(-33.4579, -70.6495), 30.0)
//!     .route_source(&StraightLineSource)
//!     .build(registry.destination(), registry.params(), Timestamp::now())?;
//! registry.start_vehicle(bus);
//! let reports = registry.snapshot(Timestamp::now());
//! ```

pub mod builder;
pub mod error;
pub mod observer;
pub mod registry;
pub mod report;
pub mod tracker;
pub mod vehicle;


pub use builder::VehicleBuilder;
pub use error::{SimError, SimResult};
pub use observer::{NoopObserver, SnapshotObserver};
pub use registry::Registry;
pub use report::{VehicleReport, VehicleStatus};
pub use tracker::{PositionTracker, TrackReport};
pub use vehicle::{Vehicle, VehicleEvent, VehicleState};
