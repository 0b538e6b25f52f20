//! santiago: one routed bus and one straight-line bus in central Santiago,
//! polled at irregular intervals the way dashboard clients poll the service.
//!
//! ```text
//! cargo run -p santiago                 # default parameters
//! cargo run -p santiago -- params.json  # SimParams overrides
//! RUST_LOG=debug cargo run -p santiago  # dwell / arrival transitions
//! ```
//!
//! Reports go to `output/santiago/` as CSV.

mod fixtures;

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use log::{info, warn};

use busim_core::{GeoPoint, SimParams, Timestamp};
use busim_output::{CsvWriter, ReportObserver};
use busim_route::{FixedRouteSource, StopCatalog};
use busim_sim::{PositionTracker, Registry, SnapshotObserver, VehicleBuilder, VehicleReport};

// ── Constants ─────────────────────────────────────────────────────────────────

const START_UNIX_SECS: i64 = 1_700_000_000;
const ORIGIN:          GeoPoint = GeoPoint::new(-33.4579, -70.6495);
const OUTPUT_DIR:      &str = "output/santiago";

/// Seconds after start at which a client asks for a snapshot.  Deliberately
/// uneven: bursts, repeats, and long silences.
const POLL_OFFSETS_SECS: [f64; 16] = [
    0.0, 3.0, 9.0, 14.0, 14.0, 30.0, 31.5, 47.0, 70.0, 71.0, 95.0, 120.0, 160.0, 161.0, 200.0, 300.0,
];

/// The straight-line bus is cancelled after this poll offset.
const CANCEL_AFTER_SECS: f64 = 120.0;

// ── Parameters ────────────────────────────────────────────────────────────────

fn load_params() -> Result<SimParams> {
    let Some(path) = std::env::args().nth(1) else {
        return Ok(SimParams::default());
    };
    let text = std::fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
    let params: SimParams = serde_json::from_str(&text).with_context(|| format!("parsing {path}"))?;
    params.validate()?;
    info!("loaded parameters from {path}");
    Ok(params)
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let params = load_params()?;
    let registry = Registry::new(params);
    let t0 = Timestamp::from_secs(START_UNIX_SECS);

    // 1. Collaborators: a fixed polyline and an in-memory stop index.
    let routes = FixedRouteSource::new(fixtures::route()?);
    let catalog = StopCatalog::new(fixtures::stop_candidates()?);
    info!("stop catalog: {} candidates", catalog.len());

    // 2. Vehicles.  Route and stop lookups happen here, before registration.
    let routed = VehicleBuilder::new("bus-101", ORIGIN, 25.0)
        .route_source(&routes)
        .stop_source(&catalog)
        .build(registry.destination(), registry.params(), t0)?;
    for stop in routed.stops() {
        info!("bus-101 stop {:>22} at {:.3} km ({:.1} m off route)", stop.name, stop.along_km, stop.lateral_m);
    }
    registry.start_vehicle(routed);

    let direct = VehicleBuilder::new("bus-202", ORIGIN, 18.0)
        .build(registry.destination(), registry.params(), t0)?;
    registry.start_vehicle(direct);

    // 3. Output.
    std::fs::create_dir_all(OUTPUT_DIR)?;
    let mut obs = ReportObserver::new(CsvWriter::new(Path::new(OUTPUT_DIR))?);

    // 4. Poll.
    let wall = Instant::now();
    let mut last: Vec<VehicleReport> = Vec::new();
    for offset in POLL_OFFSETS_SECS {
        let now = t0.plus_secs(offset);
        last = registry.poll(now, &mut obs);
        for r in &last {
            println!(
                "t+{offset:>5.1}s  {:<8} {:<9} {:>8.5},{:>9.5}  {:>6.3} km  eta {:>5.2} min  stops {}/{}",
                r.id,
                r.state.as_str(),
                r.position.lat,
                r.position.lon,
                r.remaining_distance_km,
                r.eta_minutes,
                r.stops_served,
                r.stops_total,
            );
        }
        if offset == CANCEL_AFTER_SECS {
            registry.stop("bus-202");
        }
    }
    // Unknown ids are a no-op.
    registry.stop("bus-999");

    obs.on_finish();
    if let Some(e) = obs.take_error() {
        warn!("output error: {e}");
    }
    println!();
    println!("{} polls in {:.3} ms", POLL_OFFSETS_SECS.len(), wall.elapsed().as_secs_f64() * 1e3);
    println!("  {OUTPUT_DIR}/vehicle_reports.csv");
    println!("  {OUTPUT_DIR}/poll_summaries.csv");

    // 5. Final status as the serving layer would send it.
    println!();
    println!("{}", serde_json::to_string_pretty(&last)?);

    // 6. A real phone reporting its own position.
    let tracker = PositionTracker::new(registry.params());
    let destination = registry.destination();
    let first = tracker.update("phone-1", GeoPoint::new(-33.4590, -70.6502), destination, t0)?;
    let second = tracker.update("phone-1", GeoPoint::new(-33.4601, -70.6515), destination, t0.plus_secs(40.0))?;
    println!();
    for (label, r) in [("first fix", first), ("second fix", second)] {
        let speed = r.speed_kmh.map_or_else(|| "n/a".to_owned(), |s| format!("{s:.1} km/h"));
        println!("phone-1 {label:<10}  {:.3} km  eta {:.2} min  speed {speed}", r.distance_km, r.eta_min);
    }

    Ok(())
}
