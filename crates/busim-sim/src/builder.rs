//! Fluent builder that resolves a vehicle's route and stops before it is
//! registered.

use log::{debug, warn};

use busim_core::{CoreError, GeoPoint, SimParams, Timestamp, VehicleId};
use busim_route::{
    BoundingBox, Route, RouteSource, Stop, StopCandidate, StopSource, extract_stops,
};

use crate::{SimResult, Vehicle};

/// Fluent builder for a [`Vehicle`].
///
/// # Required inputs
///
/// - id, origin, speed (km/h)
///
/// # Optional inputs
///
/// | Method               | Effect                                               |
/// |----------------------|------------------------------------------------------|
/// | `.route(points)`     | Use this polyline instead of asking a source         |
/// | `.route_source(src)` | Ask `src` for a polyline origin → destination        |
/// | `.candidates(list)`  | Match these stop candidates to the route             |
/// | `.stop_source(src)`  | Ask `src` for candidates around the route            |
/// | `.stops(list)`       | Use already-extracted stops as is                    |
/// | `.strict(true)`      | Reject speed ≤ 0 instead of treating it as parked    |
///
/// Source calls happen inside [`build`](Self::build), before the vehicle
/// reaches the registry, so a slow source never holds a registry lock.
/// Source failures are logged and degrade the vehicle: no route means
/// straight-line mode, no candidates means no stops.
///
/// # Example
///
/// ```rust,ignore
/// let vehicle = VehicleBuilder::new("bus-1", origin, 30.0)
///     .route_source(&directions)
///     .stop_source(&catalog)
///     .build(registry.destination(), registry.params(), Timestamp::now())?;
/// registry.start_vehicle(vehicle);
/// ```
pub struct VehicleBuilder<'a> {
    id:           VehicleId,
    origin:       GeoPoint,
    speed_kmh:    f64,
    route:        Option<Vec<GeoPoint>>,
    route_source: Option<&'a dyn RouteSource>,
    candidates:   Option<Vec<StopCandidate>>,
    stop_source:  Option<&'a dyn StopSource>,
    stops:        Option<Vec<Stop>>,
    strict:       bool,
}

impl<'a> VehicleBuilder<'a> {
    pub fn new(id: impl Into<VehicleId>, origin: GeoPoint, speed_kmh: f64) -> Self {
        Self {
            id: id.into(),
            origin,
            speed_kmh,
            route:        None,
            route_source: None,
            candidates:   None,
            stop_source:  None,
            stops:        None,
            strict:       false,
        }
    }

    /// Use `points` as the route.  Takes precedence over a route source.
    pub fn route(mut self, points: Vec<GeoPoint>) -> Self {
        self.route = Some(points);
        self
    }

    pub fn route_source(mut self, source: &'a dyn RouteSource) -> Self {
        self.route_source = Some(source);
        self
    }

    /// Match `candidates` to the route.  Takes precedence over a stop source.
    pub fn candidates(mut self, candidates: Vec<StopCandidate>) -> Self {
        self.candidates = Some(candidates);
        self
    }

    pub fn stop_source(mut self, source: &'a dyn StopSource) -> Self {
        self.stop_source = Some(source);
        self
    }

    /// Attach pre-extracted stops.  Takes precedence over candidates and
    /// stop sources, and is the only way to give a routeless vehicle stops.
    pub fn stops(mut self, stops: Vec<Stop>) -> Self {
        self.stops = Some(stops);
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Validate inputs, resolve route and stops, and return the vehicle.
    ///
    /// # Errors
    ///
    /// [`CoreError::InvalidCoordinate`] for an invalid origin;
    /// [`CoreError::InvalidSpeed`] for a non-finite speed, or a speed ≤ 0 in
    /// strict mode.
    pub fn build(self, destination: GeoPoint, params: &SimParams, now: Timestamp) -> SimResult<Vehicle> {
        let origin = self.origin.validated()?;
        let speed_ok = if self.strict { self.speed_kmh > 0.0 } else { !self.speed_kmh.is_nan() };
        if !speed_ok || self.speed_kmh.is_infinite() {
            return Err(CoreError::InvalidSpeed(self.speed_kmh).into());
        }

        let route = self.resolve_route(origin, destination);
        let stops = match (self.stops, &route) {
            (Some(stops), _) => stops,
            (None, Some(route)) => resolve_stops(route, self.candidates, self.stop_source, params),
            (None, None) => Vec::new(),
        };

        debug!(
            "vehicle {} built: {} route points, {} stops",
            self.id,
            route.as_ref().map_or(0, Route::len),
            stops.len()
        );
        Ok(Vehicle::new(self.id, origin, self.speed_kmh, route, stops, now))
    }

    fn resolve_route(&self, origin: GeoPoint, destination: GeoPoint) -> Option<Route> {
        let points = match (&self.route, self.route_source) {
            (Some(points), _) => points.clone(),
            (None, Some(source)) => match source.route(origin, destination) {
                Ok(points) => points,
                Err(e) => {
                    warn!("vehicle {}: route lookup failed ({e}); using straight-line mode", self.id);
                    return None;
                }
            },
            (None, None) => return None,
        };

        let route = Route::new(points);
        if route.is_none() {
            warn!("vehicle {}: route has fewer than two points; using straight-line mode", self.id);
        }
        route
    }
}

fn resolve_stops(
    route:      &Route,
    candidates: Option<Vec<StopCandidate>>,
    source:     Option<&dyn StopSource>,
    params:     &SimParams,
) -> Vec<Stop> {
    let candidates = match (candidates, source) {
        (Some(candidates), _) => candidates,
        (None, Some(source)) => {
            let bbox = BoundingBox::around(route, params.max_match_m);
            match source.candidates(&bbox) {
                Ok(candidates) => candidates,
                Err(e) => {
                    warn!("stop lookup failed ({e}); vehicle will not dwell");
                    return Vec::new();
                }
            }
        }
        (None, None) => return Vec::new(),
    };
    extract_stops(route, candidates, params)
}
