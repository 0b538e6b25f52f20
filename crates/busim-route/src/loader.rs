//! CSV loaders for route polylines and stop candidates.
//!
//! # CSV formats
//!
//! Polyline: one row per point, in travel order:
//!
//! ```csv
//! lat,lon
//! -33.4579,-70.6495
//! -33.4590,-70.6510
//! ```
//!
//! Stop candidates: one row per stop, any order:
//!
//! ```csv
//! name,lat,lon
//! PA421 - Parada 3,-33.4601,-70.6522
//! ```
//!
//! Every coordinate is validated; an out-of-range row fails the whole load.

use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use busim_core::GeoPoint;

use crate::{RouteError, RouteResult, StopCandidate};

// ── CSV records ───────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct PointRecord {
    lat: f64,
    lon: f64,
}

#[derive(Deserialize)]
struct CandidateRecord {
    name: String,
    lat:  f64,
    lon:  f64,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load a route polyline from a CSV file.
pub fn load_polyline_csv(path: &Path) -> RouteResult<Vec<GeoPoint>> {
    let file = std::fs::File::open(path).map_err(RouteError::Io)?;
    load_polyline_reader(file)
}

/// Like [`load_polyline_csv`] but accepts any `Read` source.
pub fn load_polyline_reader<R: Read>(reader: R) -> RouteResult<Vec<GeoPoint>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    csv_reader
        .deserialize::<PointRecord>()
        .map(|result| -> RouteResult<GeoPoint> {
            let row = result.map_err(|e| RouteError::Parse(e.to_string()))?;
            Ok(GeoPoint::new(row.lat, row.lon).validated()?)
        })
        .collect()
}

/// Load stop candidates from a CSV file.
pub fn load_candidates_csv(path: &Path) -> RouteResult<Vec<StopCandidate>> {
    let file = std::fs::File::open(path).map_err(RouteError::Io)?;
    load_candidates_reader(file)
}

/// Like [`load_candidates_csv`] but accepts any `Read` source.
pub fn load_candidates_reader<R: Read>(reader: R) -> RouteResult<Vec<StopCandidate>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    csv_reader
        .deserialize::<CandidateRecord>()
        .map(|result| -> RouteResult<StopCandidate> {
            let row = result.map_err(|e| RouteError::Parse(e.to_string()))?;
            let point = GeoPoint::new(row.lat, row.lon).validated()?;
            Ok(StopCandidate::new(row.name.trim(), point))
        })
        .collect()
}
