//! Route polyline with a cached cumulative-distance table.
//!
//! # Data layout
//!
//! A [`Route`] stores its points and, in a parallel array, the along-route
//! distance from the first point to each point:
//!
//! ```text
//! points:        p0    p1    p2    p3
//! cumulative_km: 0.0   d01   d01+d12   d01+d12+d23 (= total_length_km)
//! ```
//!
//! Segment `i` runs from `points[i]` to `points[i + 1]`.  The table is built
//! once in [`Route::new`]; the polyline is immutable afterwards, so every
//! along-route query is either O(1) or a binary search.

use busim_core::geo::project_point_to_segment;
use busim_core::GeoPoint;

/// Where a point falls relative to a route.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RouteProjection {
    /// Perpendicular offset from the nearest segment, metres.
    pub lateral_m: f64,
    /// Distance from the route origin to the foot point, kilometres.
    pub along_km: f64,
    /// Index of the segment the foot point lies on.
    pub segment: usize,
}

/// An ordered polyline a vehicle follows, with at least two points.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    points:        Vec<GeoPoint>,
    cumulative_km: Vec<f64>,
}

impl Route {
    /// Build a route, or `None` if fewer than two points are given.  A route
    /// that short is treated as absent and the vehicle falls back to
    /// straight-line mode.
    pub fn new(points: Vec<GeoPoint>) -> Option<Self> {
        if points.len() < 2 {
            return None;
        }
        let mut cumulative_km = Vec::with_capacity(points.len());
        let mut total = 0.0;
        cumulative_km.push(0.0);
        for pair in points.windows(2) {
            total += pair[0].distance_km(pair[1]);
            cumulative_km.push(total);
        }
        Some(Self { points, cumulative_km })
    }

    // ── Dimensions ────────────────────────────────────────────────────────

    #[inline]
    pub fn points(&self) -> &[GeoPoint] {
        &self.points
    }

    #[inline]
    pub fn point(&self, index: usize) -> GeoPoint {
        self.points[index]
    }

    /// Number of points (always ≥ 2).
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always `false`; present for API symmetry with `len`.
    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Index of the final point.
    #[inline]
    pub fn last_index(&self) -> usize {
        self.points.len() - 1
    }

    #[inline]
    pub fn start(&self) -> GeoPoint {
        self.points[0]
    }

    #[inline]
    pub fn end(&self) -> GeoPoint {
        self.points[self.last_index()]
    }

    // ── Lengths ───────────────────────────────────────────────────────────

    /// Sum of the great-circle lengths of all segments.
    #[inline]
    pub fn total_length_km(&self) -> f64 {
        self.cumulative_km[self.last_index()]
    }

    /// Along-route distance from the origin to `points[index]`.
    #[inline]
    pub fn cumulative_km(&self, index: usize) -> f64 {
        self.cumulative_km[index]
    }

    /// Length of segment `index` (`points[index] → points[index + 1]`).
    #[inline]
    pub fn segment_length_km(&self, index: usize) -> f64 {
        self.cumulative_km[index + 1] - self.cumulative_km[index]
    }

    /// Distance still to travel for a vehicle at `position` on segment
    /// `index`: to the next point, then every full segment after it.
    ///
    /// Returns `0.0` once `index` reaches the final point.
    pub fn remaining_from(&self, index: usize, position: GeoPoint) -> f64 {
        if index >= self.last_index() {
            return 0.0;
        }
        let next = index + 1;
        position.distance_km(self.points[next]) + (self.total_length_km() - self.cumulative_km[next])
    }

    /// Along-route distance of a vehicle at `position` on segment `index`.
    pub fn along_at(&self, index: usize, position: GeoPoint) -> f64 {
        let index = index.min(self.last_index());
        self.cumulative_km[index] + self.points[index].distance_km(position)
    }

    // ── Geometry ──────────────────────────────────────────────────────────

    /// Project `p` onto the nearest segment.
    ///
    /// Scans every segment (O(route length)); ties on lateral offset go to the
    /// earliest segment.  Intended for stop extraction, not per-tick use.
    pub fn project(&self, p: GeoPoint) -> RouteProjection {
        let mut best = RouteProjection {
            lateral_m: f64::INFINITY,
            along_km:  0.0,
            segment:   0,
        };
        for (i, pair) in self.points.windows(2).enumerate() {
            let proj = project_point_to_segment(p, pair[0], pair[1]);
            if proj.lateral_m < best.lateral_m {
                best = RouteProjection {
                    lateral_m: proj.lateral_m,
                    along_km:  self.cumulative_km[i] + proj.t * self.segment_length_km(i),
                    segment:   i,
                };
            }
        }
        best
    }

    /// The point at `along_km` from the origin and the segment it lies on.
    ///
    /// `along_km` is clamped to `[0, total_length_km]`.  A position exactly
    /// on an interior point is reported on the segment that starts there.
    pub fn locate(&self, along_km: f64) -> (usize, GeoPoint) {
        let along = along_km.clamp(0.0, self.total_length_km());
        let last_segment = self.last_index() - 1;
        let segment = self
            .cumulative_km
            .partition_point(|&c| c <= along)
            .saturating_sub(1)
            .min(last_segment);

        let len = self.segment_length_km(segment);
        let t = if len > 0.0 {
            ((along - self.cumulative_km[segment]) / len).clamp(0.0, 1.0)
        } else {
            0.0
        };
        (segment, self.points[segment].lerp(self.points[segment + 1], t))
    }
}
