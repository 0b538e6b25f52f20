//! Status records handed to the serving layer.
//!
//! These are the only types that leave the registry.  They are plain data
//! with serde derives; the internal state machine types stay private to
//! [`crate::vehicle`].

use serde::{Deserialize, Serialize};

use busim_core::{GeoPoint, VehicleId};

use crate::vehicle::VehicleState;

/// Coarse vehicle state as shown to clients.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleStatus {
    Moving,
    Dwelling,
    Arrived,
}

impl VehicleStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            VehicleStatus::Moving   => "moving",
            VehicleStatus::Dwelling => "dwelling",
            VehicleStatus::Arrived  => "arrived",
        }
    }
}

impl From<VehicleState> for VehicleStatus {
    fn from(state: VehicleState) -> Self {
        match state {
            VehicleState::Moving          => VehicleStatus::Moving,
            VehicleState::Dwelling { .. } => VehicleStatus::Dwelling,
            VehicleState::Arrived         => VehicleStatus::Arrived,
        }
    }
}

impl std::fmt::Display for VehicleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One vehicle's status after advancing it to the snapshot time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleReport {
    pub id:                    VehicleId,
    /// A routed vehicle dwelling at a stop reports the stop's foot point on
    /// the route, which can sit up to `max_match_m` from [`Stop::point`].
    ///
    /// [`Stop::point`]: busim_route::Stop::point
    pub position:              GeoPoint,
    pub speed_kmh:             f64,
    pub remaining_distance_km: f64,
    pub eta_minutes:           f64,
    pub state:                 VehicleStatus,
    pub stops_total:           usize,
    pub stops_served:          usize,
}
