//! Route and stop-candidate sources.
//!
//! # Pluggability
//!
//! The engine consumes routes and stop candidates through the [`RouteSource`]
//! and [`StopSource`] traits, so applications can plug in a directions API,
//! an OSM extract, or a fixture without touching the engine.  Both are
//! called once per vehicle, before the vehicle enters the registry; a failure
//! is never fatal: the caller degrades to straight-line mode or to zero
//! stops.
//!
//! Provided implementations:
//!
//! | Type                   | Behaviour                                         |
//! |------------------------|---------------------------------------------------|
//! | [`FixedRouteSource`]   | A preset polyline, joined to origin/destination   |
//! | [`StraightLineSource`] | Two-point route origin → destination              |
//! | [`StopCatalog`]        | In-memory R-tree of named stops, queried by bbox  |

use rstar::{AABB, RTree, RTreeObject};
use serde::{Deserialize, Serialize};

use busim_core::geo::METERS_PER_DEG_LAT;
use busim_core::{GeoPoint, LocalScale};

use crate::{Route, RouteError, RouteResult, StopCandidate};

// ── Traits ────────────────────────────────────────────────────────────────────

/// Produces a polyline from `origin` to `destination`.
///
/// Implementations must be `Send + Sync` so one source can serve concurrent
/// start requests.
pub trait RouteSource: Send + Sync {
    fn route(&self, origin: GeoPoint, destination: GeoPoint) -> RouteResult<Vec<GeoPoint>>;
}

/// Produces unordered stop candidates inside a bounding region.
pub trait StopSource: Send + Sync {
    fn candidates(&self, bbox: &BoundingBox) -> RouteResult<Vec<StopCandidate>>;
}

// ── BoundingBox ───────────────────────────────────────────────────────────────

/// Axis-aligned lat/lon rectangle.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub min_lon: f64,
    pub max_lat: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    /// Smallest box containing every route point, grown by `margin_m` on all
    /// sides so stops just off the route's extremes are still found.
    pub fn around(route: &Route, margin_m: f64) -> Self {
        let mut b = BoundingBox {
            min_lat: f64::INFINITY,
            min_lon: f64::INFINITY,
            max_lat: f64::NEG_INFINITY,
            max_lon: f64::NEG_INFINITY,
        };
        for p in route.points() {
            b.min_lat = b.min_lat.min(p.lat);
            b.min_lon = b.min_lon.min(p.lon);
            b.max_lat = b.max_lat.max(p.lat);
            b.max_lon = b.max_lon.max(p.lon);
        }

        // Use the latitude nearest a pole for the widest longitude margin.
        let worst_lat = b.min_lat.abs().max(b.max_lat.abs());
        let scale = LocalScale::at(worst_lat);
        let d_lat = margin_m / METERS_PER_DEG_LAT;
        let d_lon = if scale.m_per_deg_lon > 0.0 { margin_m / scale.m_per_deg_lon } else { 180.0 };

        BoundingBox {
            min_lat: (b.min_lat - d_lat).max(-90.0),
            min_lon: (b.min_lon - d_lon).max(-180.0),
            max_lat: (b.max_lat + d_lat).min(90.0),
            max_lon: (b.max_lon + d_lon).min(180.0),
        }
    }

    pub fn contains(&self, p: GeoPoint) -> bool {
        p.lat >= self.min_lat && p.lat <= self.max_lat && p.lon >= self.min_lon && p.lon <= self.max_lon
    }

    fn envelope(&self) -> AABB<[f64; 2]> {
        AABB::from_corners([self.min_lat, self.min_lon], [self.max_lat, self.max_lon])
    }
}

// ── FixedRouteSource ──────────────────────────────────────────────────────────

/// Serves the same preset polyline for every request.
///
/// If the requested origin (destination) lies farther than
/// `join_tolerance_m` from the polyline's first (last) point, it is
/// prepended (appended) so the route actually connects the two.
#[derive(Debug, Clone)]
pub struct FixedRouteSource {
    pub points:           Vec<GeoPoint>,
    pub join_tolerance_m: f64,
}

impl FixedRouteSource {
    pub fn new(points: Vec<GeoPoint>) -> Self {
        Self { points, join_tolerance_m: 10.0 }
    }
}

impl RouteSource for FixedRouteSource {
    fn route(&self, origin: GeoPoint, destination: GeoPoint) -> RouteResult<Vec<GeoPoint>> {
        let (Some(&first), Some(&last)) = (self.points.first(), self.points.last()) else {
            return Err(RouteError::NoRoute { from: origin, to: destination });
        };

        let mut out = Vec::with_capacity(self.points.len() + 2);
        if origin.distance_m(first) > self.join_tolerance_m {
            out.push(origin);
        }
        out.extend_from_slice(&self.points);
        if destination.distance_m(last) > self.join_tolerance_m {
            out.push(destination);
        }
        if out.len() < 2 {
            return Err(RouteError::NoRoute { from: origin, to: destination });
        }
        Ok(out)
    }
}

// ── StraightLineSource ────────────────────────────────────────────────────────

/// Two-point route straight from origin to destination.
///
/// Useful when no directions service is available but stop matching should
/// still run against the direct line.
pub struct StraightLineSource;

impl RouteSource for StraightLineSource {
    fn route(&self, origin: GeoPoint, destination: GeoPoint) -> RouteResult<Vec<GeoPoint>> {
        if origin == destination {
            return Err(RouteError::NoRoute { from: origin, to: destination });
        }
        Ok(vec![origin, destination])
    }
}

// ── StopCatalog ───────────────────────────────────────────────────────────────

/// Entry stored in the R-tree: a 2-D `[lat, lon]` point with its stop name.
#[derive(Clone)]
struct CatalogEntry {
    point: [f64; 2], // [lat, lon]
    name:  String,
}

impl RTreeObject for CatalogEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

/// In-memory stop index answering bounding-box queries.
///
/// Bulk-loaded once; queries are O(log N + k).
pub struct StopCatalog {
    tree: RTree<CatalogEntry>,
}

impl StopCatalog {
    pub fn new(candidates: Vec<StopCandidate>) -> Self {
        let entries: Vec<CatalogEntry> = candidates
            .into_iter()
            .map(|c| CatalogEntry { point: [c.point.lat, c.point.lon], name: c.name })
            .collect();
        Self { tree: RTree::bulk_load(entries) }
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// All stops inside `bbox`, in no particular order.
    pub fn within(&self, bbox: &BoundingBox) -> Vec<StopCandidate> {
        self.tree
            .locate_in_envelope(&bbox.envelope())
            .map(|e| StopCandidate::new(e.name.clone(), GeoPoint::new(e.point[0], e.point[1])))
            .collect()
    }
}

impl StopSource for StopCatalog {
    fn candidates(&self, bbox: &BoundingBox) -> RouteResult<Vec<StopCandidate>> {
        Ok(self.within(bbox))
    }
}
