//! The shared vehicle registry.
//!
//! # Locking
//!
//! ```text
//! RwLock<map id → Arc<Mutex<Vehicle>>>   held only to insert, remove, list
//!            │
//!            └─ Mutex<Vehicle>           held while one vehicle advances
//! ```
//!
//! A snapshot clones the entry handles under the map read lock, releases it,
//! then advances each vehicle under its own mutex.  Starts and stops for
//! other ids never wait on a snapshot in progress, and concurrent snapshots
//! serialize per vehicle only.  No route or stop source is ever called while
//! a registry lock is held: [`VehicleBuilder`][crate::VehicleBuilder] does
//! that work before [`Registry::start_vehicle`].

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use log::{debug, info};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use busim_core::{GeoPoint, SimParams, Timestamp, VehicleId};
use busim_route::{Route, Stop};

use crate::{SimResult, SnapshotObserver, Vehicle, VehicleEvent, VehicleReport};

#[cfg(feature = "fx-hash")]
type VehicleMap = rustc_hash::FxHashMap<VehicleId, Arc<Mutex<Vehicle>>>;
#[cfg(not(feature = "fx-hash"))]
type VehicleMap = std::collections::HashMap<VehicleId, Arc<Mutex<Vehicle>>>;

/// Shared mapping of vehicle id to simulated vehicle, plus the destination
/// used by routeless vehicles.
///
/// `Registry` is `Send + Sync`; wrap it in an `Arc` to share it between
/// request handlers.  Every method takes `&self`.
pub struct Registry {
    params:      SimParams,
    destination: RwLock<GeoPoint>,
    vehicles:    RwLock<VehicleMap>,
}

impl Registry {
    /// Empty registry whose destination starts at
    /// `params.default_destination`.
    pub fn new(params: SimParams) -> Self {
        Self {
            destination: RwLock::new(params.default_destination),
            vehicles:    RwLock::new(VehicleMap::default()),
            params,
        }
    }

    pub fn params(&self) -> &SimParams {
        &self.params
    }

    // ── Destination ───────────────────────────────────────────────────────

    pub fn destination(&self) -> GeoPoint {
        *self.destination.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the shared destination.
    ///
    /// Routes already attached to vehicles are not recomputed; the new
    /// destination only affects straight-line vehicles.
    pub fn set_destination(&self, point: GeoPoint) -> SimResult<()> {
        let point = point.validated()?;
        *self.destination.write().unwrap_or_else(PoisonError::into_inner) = point;
        info!("destination set to {point}");
        Ok(())
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────

    /// Register a vehicle from already-resolved parts, replacing any vehicle
    /// with the same id.
    ///
    /// Explicit `stops` are used as given.  Without them, a vehicle gets no
    /// stops; use [`VehicleBuilder`][crate::VehicleBuilder] to match stop
    /// candidates to the route.
    pub fn start(
        &self,
        id:        impl Into<VehicleId>,
        origin:    GeoPoint,
        speed_kmh: f64,
        route:     Option<Route>,
        stops:     Option<Vec<Stop>>,
        now:       Timestamp,
    ) {
        let vehicle = Vehicle::new(id.into(), origin, speed_kmh, route, stops.unwrap_or_default(), now);
        self.start_vehicle(vehicle);
    }

    /// Register `vehicle`, replacing any vehicle with the same id.
    pub fn start_vehicle(&self, vehicle: Vehicle) {
        let id = vehicle.id.clone();
        info!(
            "vehicle {id} started at {} ({} km/h, {}, {} stops)",
            vehicle.position,
            vehicle.speed_kmh,
            if vehicle.route().is_some() { "route" } else { "straight-line" },
            vehicle.stops().len()
        );
        let replaced = self.write_map().insert(id.clone(), Arc::new(Mutex::new(vehicle)));
        if replaced.is_some() {
            debug!("vehicle {id} replaced an existing entry");
        }
    }

    /// Remove a vehicle.  Returns whether one was present; an unknown id is a
    /// no-op.
    pub fn stop(&self, id: &str) -> bool {
        let removed = self.write_map().remove(id).is_some();
        if removed {
            info!("vehicle {id} stopped");
        }
        removed
    }

    pub fn contains(&self, id: &str) -> bool {
        self.read_map().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.read_map().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read_map().is_empty()
    }

    /// Registered ids in ascending order.
    pub fn ids(&self) -> Vec<VehicleId> {
        let mut ids: Vec<VehicleId> = self.read_map().keys().cloned().collect();
        ids.sort();
        ids
    }

    // ── Stepping ──────────────────────────────────────────────────────────

    /// Advance every vehicle to `now` toward the stored destination and
    /// report them, sorted by id.
    pub fn snapshot(&self, now: Timestamp) -> Vec<VehicleReport> {
        self.snapshot_at(self.destination(), now)
    }

    /// Advance every vehicle to `now` toward `destination` and report them,
    /// sorted by id.
    ///
    /// A vehicle removed while the snapshot runs may still appear in it.
    pub fn snapshot_at(&self, destination: GeoPoint, now: Timestamp) -> Vec<VehicleReport> {
        let mut entries: Vec<(VehicleId, Arc<Mutex<Vehicle>>)> = self
            .read_map()
            .iter()
            .map(|(id, v)| (id.clone(), Arc::clone(v)))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        #[cfg(feature = "parallel")]
        let reports = entries
            .par_iter()
            .map(|(_, v)| self.advance_one(v, destination, now))
            .collect();

        #[cfg(not(feature = "parallel"))]
        let reports = entries
            .iter()
            .map(|(_, v)| self.advance_one(v, destination, now))
            .collect();

        reports
    }

    /// Advance one vehicle to `now` and report it.  `None` for an unknown id.
    pub fn status(&self, id: &str, now: Timestamp) -> Option<VehicleReport> {
        let entry = self.read_map().get(id).map(Arc::clone)?;
        Some(self.advance_one(&entry, self.destination(), now))
    }

    /// Run `f` with the vehicle locked, without advancing it.  `None` for an
    /// unknown id.
    pub fn with_vehicle<T>(&self, id: &str, f: impl FnOnce(&Vehicle) -> T) -> Option<T> {
        let entry = self.read_map().get(id).map(Arc::clone)?;
        let vehicle = lock(&entry);
        Some(f(&vehicle))
    }

    /// Take a snapshot at `now` and hand it to `observer`.
    pub fn poll<O: SnapshotObserver>(&self, now: Timestamp, observer: &mut O) -> Vec<VehicleReport> {
        let reports = self.snapshot(now);
        observer.on_snapshot(now, &reports);
        reports
    }

    // ── Internals ─────────────────────────────────────────────────────────

    fn advance_one(&self, entry: &Mutex<Vehicle>, destination: GeoPoint, now: Timestamp) -> VehicleReport {
        let mut vehicle = lock(entry);
        if let Some(event) = vehicle.advance(destination, now, &self.params) {
            log_event(&vehicle, event, now);
        }
        vehicle.report(destination, now, &self.params)
    }

    fn read_map(&self) -> std::sync::RwLockReadGuard<'_, VehicleMap> {
        self.vehicles.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_map(&self) -> std::sync::RwLockWriteGuard<'_, VehicleMap> {
        self.vehicles.write().unwrap_or_else(PoisonError::into_inner)
    }
}

// A panic inside `advance` leaves the vehicle in a consistent state (every
// field write is complete), so a poisoned entry is still usable.
fn lock(entry: &Mutex<Vehicle>) -> MutexGuard<'_, Vehicle> {
    entry.lock().unwrap_or_else(PoisonError::into_inner)
}

fn log_event(vehicle: &Vehicle, event: VehicleEvent, now: Timestamp) {
    match event {
        VehicleEvent::DwellStarted { stop } => {
            let name = vehicle.stops().get(stop).map_or("?", |s| s.name.as_str());
            debug!("{now}: vehicle {} dwelling at stop {stop} ({name})", vehicle.id);
        }
        VehicleEvent::DwellEnded => debug!("{now}: vehicle {} leaving stop", vehicle.id),
        VehicleEvent::Arrived => debug!("{now}: vehicle {} arrived at {}", vehicle.id, vehicle.position),
    }
}
