//! Stop extraction: unordered candidate points → ordered stops along a route.

use log::debug;
use serde::{Deserialize, Serialize};

use busim_core::{GeoPoint, SimParams};

use crate::Route;

/// A raw stop location as returned by a stop source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopCandidate {
    pub name:  String,
    pub point: GeoPoint,
}

impl StopCandidate {
    pub fn new(name: impl Into<String>, point: GeoPoint) -> Self {
        Self { name: name.into(), point }
    }
}

/// A stop matched to a specific route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    pub name:      String,
    /// The candidate's own location (not its projection).  Routed vehicles
    /// dwell at the projection instead; only straight-line vehicles snap
    /// here.
    pub point:     GeoPoint,
    /// Distance from the route origin to the stop's projection.
    pub along_km:  f64,
    /// Distance from the stop to the route, metres.
    pub lateral_m: f64,
}

/// Match `candidates` to `route` and return the retained stops sorted by
/// `along_km`.
///
/// 1. Project every candidate onto the route.
/// 2. Drop candidates farther than `params.max_match_m` from the route, or
///    whose projection falls outside `[0, total_length_km]`.
/// 3. Sort by `along_km`.
/// 4. Walk the sorted list: a candidate within `params.min_gap_m` of the
///    last retained stop replaces it only if it lies closer to the route;
///    otherwise it becomes a new stop.
///
/// An empty input yields an empty output.
pub fn extract_stops<I>(route: &Route, candidates: I, params: &SimParams) -> Vec<Stop>
where
    I: IntoIterator<Item = StopCandidate>,
{
    let total_km = route.total_length_km();
    let mut seen = 0usize;

    let mut matched: Vec<Stop> = candidates
        .into_iter()
        .inspect(|_| seen += 1)
        .filter_map(|c| {
            let proj = route.project(c.point);
            let on_route = proj.lateral_m <= params.max_match_m
                && (0.0..=total_km).contains(&proj.along_km);
            on_route.then(|| Stop {
                name:      c.name,
                point:     c.point,
                along_km:  proj.along_km,
                lateral_m: proj.lateral_m,
            })
        })
        .collect();

    // Stable sort keeps source order for exact along-route ties.
    matched.sort_by(|a, b| a.along_km.total_cmp(&b.along_km));
    let matched_count = matched.len();

    let min_gap_km = params.min_gap_m / 1_000.0;
    let mut stops: Vec<Stop> = Vec::with_capacity(matched.len());
    for stop in matched {
        match stops.last_mut() {
            Some(last) if stop.along_km - last.along_km < min_gap_km => {
                if stop.lateral_m < last.lateral_m {
                    *last = stop;
                }
            }
            _ => stops.push(stop),
        }
    }

    debug!(
        "stop extraction: {seen} candidates, {matched_count} within {} m, {} retained",
        params.max_match_m,
        stops.len()
    );
    stops
}
