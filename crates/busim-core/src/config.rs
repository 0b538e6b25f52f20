//! Simulation parameters.
//!
//! The stop-matching and dwell thresholds are empirical; they are kept as
//! plain fields with the field-tested values as defaults.  Applications load
//! overrides from a JSON file (with the `serde` feature) and call
//! [`SimParams::validate`] before handing them to the engine.

use crate::{CoreError, CoreResult, GeoPoint};

/// Tunable thresholds and defaults shared by the route and sim crates.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimParams {
    /// Candidates farther than this from the route are not stops.  Default 60.
    pub max_match_m: f64,

    /// Minimum along-route spacing between retained stops.  Default 80.
    pub min_gap_m: f64,

    /// Fallback-mode vehicles within this radius of the destination snap to
    /// it and arrive; route-mode vehicles within it of the route end do the
    /// same.  Default 20.
    pub arrival_radius_m: f64,

    /// A vehicle within this radius of its next stop begins to dwell.
    /// Default 20.
    pub dwell_radius_m: f64,

    /// Seconds spent at each stop.  Default 5.
    pub dwell_secs: f64,

    /// A vehicle further than this from its route's first point is snapped
    /// onto it on its first movement.  Default 10.
    pub placement_tolerance_m: f64,

    /// ETA divides by `max(speed, speed_epsilon_kmh)`.
    pub speed_epsilon_kmh: f64,

    /// Speed assumed when none is supplied or observed.  Default 30 km/h.
    pub default_speed_kmh: f64,

    /// Initial process-wide destination.
    pub default_destination: GeoPoint,
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            max_match_m:           60.0,
            min_gap_m:             80.0,
            arrival_radius_m:      20.0,
            dwell_radius_m:        20.0,
            dwell_secs:            5.0,
            placement_tolerance_m: 10.0,
            speed_epsilon_kmh:     1e-3,
            default_speed_kmh:     30.0,
            default_destination:   GeoPoint::new(-33.4624, -70.6550),
        }
    }
}

impl SimParams {
    /// Reject non-finite or negative thresholds, a non-positive epsilon or
    /// default speed, and an invalid default destination.
    pub fn validate(&self) -> CoreResult<()> {
        let non_negative = [
            ("max_match_m",           self.max_match_m),
            ("min_gap_m",             self.min_gap_m),
            ("arrival_radius_m",      self.arrival_radius_m),
            ("dwell_radius_m",        self.dwell_radius_m),
            ("dwell_secs",            self.dwell_secs),
            ("placement_tolerance_m", self.placement_tolerance_m),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(CoreError::Config(format!(
                    "{name} must be a finite non-negative number, got {value}"
                )));
            }
        }
        let positive = [
            ("speed_epsilon_kmh", self.speed_epsilon_kmh),
            ("default_speed_kmh", self.default_speed_kmh),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(CoreError::Config(format!("{name} must be positive, got {value}")));
            }
        }
        self.default_destination.validated()?;
        Ok(())
    }
}
