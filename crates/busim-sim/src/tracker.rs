//! Distance and ETA for real clients that report their own GPS position.
//!
//! Unlike simulated vehicles, tracked clients move on their own; the tracker
//! only remembers each client's previous fix to estimate a speed from the
//! next one.

use std::sync::{Mutex, PoisonError};

use log::debug;
use serde::{Deserialize, Serialize};

use busim_core::{GeoPoint, SimParams, Timestamp};

use crate::SimResult;

#[cfg(feature = "fx-hash")]
type FixMap = rustc_hash::FxHashMap<String, Fix>;
#[cfg(not(feature = "fx-hash"))]
type FixMap = std::collections::HashMap<String, Fix>;

/// Estimated speeds at or below this are treated as standing still and the
/// default speed is used for the ETA instead.
const MIN_ESTIMATED_SPEED_KMH: f64 = 0.5;

/// Answer to one position update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackReport {
    /// Straight-line distance to the destination.
    pub distance_km: f64,
    pub eta_min:     f64,
    /// Speed estimated from the previous fix.  `None` on a client's first
    /// report.
    pub speed_kmh:   Option<f64>,
}

#[derive(Copy, Clone, Debug)]
struct Fix {
    point: GeoPoint,
    at:    Timestamp,
}

/// Last known fix per client id.
pub struct PositionTracker {
    default_speed_kmh: f64,
    fixes:             Mutex<FixMap>,
}

impl PositionTracker {
    pub fn new(params: &SimParams) -> Self {
        Self {
            default_speed_kmh: params.default_speed_kmh,
            fixes:             Mutex::new(FixMap::default()),
        }
    }

    /// Record `point` for `client_id` and report distance and ETA to
    /// `destination`.
    ///
    /// A fix older than the stored one yields no speed estimate.
    pub fn update(
        &self,
        client_id:   &str,
        point:       GeoPoint,
        destination: GeoPoint,
        now:         Timestamp,
    ) -> SimResult<TrackReport> {
        let point = point.validated()?;
        let distance_km = point.distance_km(destination);

        let previous = {
            let mut fixes = self.fixes.lock().unwrap_or_else(PoisonError::into_inner);
            fixes.insert(client_id.to_owned(), Fix { point, at: now })
        };

        let speed_kmh = previous.and_then(|prev| {
            let dt_ms = now - prev.at;
            (dt_ms >= 0).then(|| {
                let hours = dt_ms.max(1) as f64 / 3_600_000.0;
                prev.point.distance_km(point) / hours
            })
        });

        let eta_speed = match speed_kmh {
            Some(s) if s > MIN_ESTIMATED_SPEED_KMH => s,
            _ => self.default_speed_kmh,
        };
        let eta_min = distance_km / eta_speed * 60.0;

        debug!("client {client_id}: {distance_km:.3} km to go, eta {eta_min:.1} min");
        Ok(TrackReport { distance_km, eta_min, speed_kmh })
    }

    /// Drop a client's history.  Unknown ids are a no-op.
    pub fn forget(&self, client_id: &str) -> bool {
        self.fixes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(client_id)
            .is_some()
    }

    pub fn len(&self) -> usize {
        self.fixes.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
