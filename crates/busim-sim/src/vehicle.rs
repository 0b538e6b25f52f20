//! Per-vehicle simulation state and the advancement state machine.
//!
//! # States
//!
//! ```text
//!            reach next stop              dwell expires
//!   MOVING ──────────────────▶ DWELLING ───────────────▶ MOVING
//!     │
//!     │ route end / destination reached
//!     ▼
//!   ARRIVED  (terminal; a new start replaces the vehicle)
//! ```
//!
//! # Clock handling
//!
//! [`Vehicle::advance`] converts `now - last_update` into distance.  The
//! clock is re-based at both dwell edges: entering a dwell sets
//! `last_update = now`, every tick spent dwelling does the same, and the tick
//! that ends the dwell does not move the vehicle.  Elapsed time is therefore
//! charged to exactly one of "waiting" or "driving", however irregularly the
//! caller polls.

use busim_core::{GeoPoint, LocalScale, SimParams, Timestamp, VehicleId};
use busim_route::{Route, Stop};

use crate::report::{VehicleReport, VehicleStatus};

/// Movement state of a vehicle.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum VehicleState {
    Moving,
    /// Stopped at a stop until the given time.
    Dwelling { until: Timestamp },
    Arrived,
}

/// A state change produced by one [`Vehicle::advance`] call.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum VehicleEvent {
    /// Began dwelling at `stops[stop]`.
    DwellStarted { stop: usize },
    DwellEnded,
    Arrived,
}

/// A simulated vehicle.
///
/// Route and stops are fixed at construction.  A vehicle built without a
/// route stays in straight-line mode toward the shared destination for its
/// whole life.
#[derive(Debug, Clone)]
pub struct Vehicle {
    pub id:       VehicleId,
    pub position: GeoPoint,
    /// km/h.  Zero or negative means parked.
    pub speed_kmh: f64,

    route:       Option<Route>,
    /// Index of the route point the vehicle last passed.  Never decreases.
    segment:     usize,
    /// Whether the one-time snap onto the route start has been evaluated.
    placed:      bool,
    stops:       Vec<Stop>,
    /// Index of the next stop to serve; equals `stops.len()` once all are
    /// served.
    next_stop:   usize,
    state:       VehicleState,
    last_update: Timestamp,
}

impl Vehicle {
    pub fn new(
        id:        VehicleId,
        origin:    GeoPoint,
        speed_kmh: f64,
        route:     Option<Route>,
        stops:     Vec<Stop>,
        now:       Timestamp,
    ) -> Self {
        Self {
            id,
            position: origin,
            speed_kmh,
            route,
            segment: 0,
            placed: false,
            stops,
            next_stop: 0,
            state: VehicleState::Moving,
            last_update: now,
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn route(&self) -> Option<&Route> {
        self.route.as_ref()
    }

    pub fn segment(&self) -> usize {
        self.segment
    }

    pub fn stops(&self) -> &[Stop] {
        &self.stops
    }

    /// Number of stops already served.
    pub fn stops_served(&self) -> usize {
        self.next_stop
    }

    pub fn state(&self) -> VehicleState {
        self.state
    }

    pub fn last_update(&self) -> Timestamp {
        self.last_update
    }

    pub fn is_arrived(&self) -> bool {
        self.state == VehicleState::Arrived
    }

    // ── Advancement ───────────────────────────────────────────────────────

    /// Consume the wall-clock time elapsed since the last call.
    ///
    /// `destination` is only used when the vehicle has no route.  A `now`
    /// earlier than the last update is ignored rather than rewinding the
    /// clock, so a late-arriving request can never make later time count
    /// twice.
    pub fn advance(&mut self, destination: GeoPoint, now: Timestamp, params: &SimParams) -> Option<VehicleEvent> {
        match self.state {
            VehicleState::Arrived => {
                self.touch(now);
                return None;
            }
            VehicleState::Dwelling { until } => {
                self.touch(now);
                if now >= until {
                    self.state = VehicleState::Moving;
                    return Some(VehicleEvent::DwellEnded);
                }
                return None;
            }
            VehicleState::Moving => {}
        }

        let dt_secs = now.secs_since(self.last_update);
        if dt_secs <= 0.0 {
            return None;
        }
        self.last_update = now;
        if self.speed_kmh.is_nan() || self.speed_kmh <= 0.0 {
            return None;
        }
        let step_km = self.speed_kmh * dt_secs / 3_600.0;

        let arrived = if self.route.is_some() {
            self.step_along_route(step_km, params)
        } else {
            self.step_toward(destination, step_km, params)
        };
        // A stop at the end of the trip is served before the vehicle counts
        // as arrived; the next moving tick then arrives without moving.
        if let Some(event) = self.try_enter_dwell(now, params) {
            return Some(event);
        }
        if arrived {
            self.state = VehicleState::Arrived;
            return Some(VehicleEvent::Arrived);
        }
        None
    }

    fn touch(&mut self, now: Timestamp) {
        self.last_update = self.last_update.max(now);
    }

    /// Walk `step_km` forward along the route.  Returns `true` on arrival.
    fn step_along_route(&mut self, step_km: f64, params: &SimParams) -> bool {
        let Some(route) = self.route.as_ref() else {
            return false;
        };
        let last = route.last_index();

        if !self.placed {
            self.placed = true;
            if self.position.distance_m(route.start()) > params.placement_tolerance_m {
                self.position = route.start();
                self.segment = 0;
            }
        }

        // The next unserved stop caps the step: the vehicle stops there and
        // dwells instead of driving past it between two polls.  A stop
        // already reached allows no movement until it has been served.
        let mut budget = step_km;
        if let Some(stop) = self.stops.get(self.next_stop) {
            let to_stop = stop.along_km - route.along_at(self.segment, self.position);
            budget = budget.min(to_stop.max(0.0));
        }

        while budget > 0.0 && self.segment < last {
            let next = route.point(self.segment + 1);
            let d = self.position.distance_km(next);
            if budget >= d {
                self.position = next;
                self.segment += 1;
                budget -= d;
            } else {
                self.position = self.position.lerp(next, budget / d);
                budget = 0.0;
            }
        }

        if self.segment >= last {
            return true;
        }

        // Close enough to the end, with nothing left to serve.
        let all_served = self.next_stop >= self.stops.len();
        if all_served && route.remaining_from(self.segment, self.position) * 1_000.0 <= params.arrival_radius_m {
            self.position = route.end();
            self.segment = last;
            return true;
        }
        false
    }

    /// Straight-line move toward `destination`.  Returns `true` on arrival.
    ///
    /// An unserved stop within `dwell_radius_m` of the straight path caps the
    /// step the same way it does on a route: a step that would reach it ends
    /// exactly on the stop.
    fn step_toward(&mut self, destination: GeoPoint, step_km: f64, params: &SimParams) -> bool {
        let dist_m = self.position.distance_m(destination);
        if dist_m <= params.arrival_radius_m {
            self.position = destination;
            return true;
        }

        let scale = LocalScale::at(self.position.lat);
        let (east, north) = scale.to_local(self.position, destination);
        let norm = east.hypot(north);
        if norm <= 0.0 {
            self.position = destination;
            return true;
        }
        let step_m = step_km * 1_000.0;

        if let Some(stop) = self.stops.get(self.next_stop) {
            let (stop_east, stop_north) = scale.to_local(self.position, stop.point);
            let ahead_m = (stop_east * east + stop_north * north) / norm;
            let lateral_m = (stop_east * north - stop_north * east).abs() / norm;
            if ahead_m >= 0.0 && ahead_m < dist_m && lateral_m <= params.dwell_radius_m && step_m >= ahead_m {
                self.position = stop.point;
                return false;
            }
        }

        if step_m >= dist_m {
            self.position = destination;
            return true;
        }
        self.position = scale.from_local(self.position, east / norm * step_m, north / norm * step_m);

        if self.position.distance_m(destination) <= params.arrival_radius_m {
            self.position = destination;
            return true;
        }
        false
    }

    /// Start dwelling if the next unserved stop has been reached.
    ///
    /// Route mode compares along-route distances, so stops matched up to
    /// `max_match_m` off the route are still served; the vehicle snaps to the
    /// stop's foot point on the route, not to [`Stop::point`].  Straight-line
    /// mode uses the plain radius and snaps onto the stop itself.
    fn try_enter_dwell(&mut self, now: Timestamp, params: &SimParams) -> Option<VehicleEvent> {
        let stop = self.stops.get(self.next_stop)?;
        let (stop_along, stop_point) = (stop.along_km, stop.point);

        let reached = match self.route.as_ref() {
            Some(route) => {
                let along = route.along_at(self.segment, self.position);
                if along >= stop_along - params.dwell_radius_m / 1_000.0 {
                    if stop_along > along {
                        let (segment, point) = route.locate(stop_along);
                        self.segment = self.segment.max(segment);
                        self.position = point;
                    }
                    true
                } else {
                    false
                }
            }
            None => {
                if self.position.distance_m(stop_point) <= params.dwell_radius_m {
                    self.position = stop_point;
                    true
                } else {
                    false
                }
            }
        };
        if !reached {
            return None;
        }

        let index = self.next_stop;
        self.next_stop += 1;
        self.state = VehicleState::Dwelling { until: now.plus_secs(params.dwell_secs) };
        self.last_update = now;
        Some(VehicleEvent::DwellStarted { stop: index })
    }

    // ── Read-only queries ─────────────────────────────────────────────────

    /// Distance still to travel: along the route if one is attached,
    /// otherwise straight to `destination`.  Zero once arrived.
    pub fn remaining_km(&self, destination: GeoPoint) -> f64 {
        if self.is_arrived() {
            return 0.0;
        }
        match &self.route {
            Some(route) => route.remaining_from(self.segment, self.position),
            None => self.position.distance_km(destination),
        }
    }

    /// Minutes until arrival: driving time at the current speed plus the
    /// dwell still owed (the rest of the current dwell and one full dwell per
    /// unserved stop).  Zero once arrived.
    pub fn eta_minutes(&self, destination: GeoPoint, now: Timestamp, params: &SimParams) -> f64 {
        if self.is_arrived() {
            return 0.0;
        }
        let speed = self.speed_kmh.max(params.speed_epsilon_kmh);
        let drive_min = self.remaining_km(destination) / speed * 60.0;

        let current_dwell_secs = match self.state {
            VehicleState::Dwelling { until } => until.secs_since(now).max(0.0),
            _ => 0.0,
        };
        let unserved = self.stops.len().saturating_sub(self.next_stop) as f64;
        drive_min + (current_dwell_secs + params.dwell_secs * unserved) / 60.0
    }

    /// Plain record of the vehicle's current state.  Does not advance it.
    pub fn report(&self, destination: GeoPoint, now: Timestamp, params: &SimParams) -> VehicleReport {
        VehicleReport {
            id:                    self.id.clone(),
            position:              self.position,
            speed_kmh:             self.speed_kmh,
            remaining_distance_km: self.remaining_km(destination),
            eta_minutes:           self.eta_minutes(destination, now, params),
            state:                 VehicleStatus::from(self.state),
            stops_total:           self.stops.len(),
            stops_served:          self.next_stop,
        }
    }
}
