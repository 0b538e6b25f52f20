//! Flat row types written by output backends.

use busim_core::Timestamp;
use busim_sim::{VehicleReport, VehicleStatus};

/// One vehicle's report at one poll.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub unix_ms:       i64,
    pub vehicle_id:    String,
    pub lat:           f64,
    pub lon:           f64,
    pub speed_kmh:     f64,
    pub remaining_km:  f64,
    pub eta_min:       f64,
    pub state:         VehicleStatus,
    pub stops_served:  u32,
    pub stops_total:   u32,
}

impl ReportRow {
    pub fn from_report(now: Timestamp, report: &VehicleReport) -> Self {
        Self {
            unix_ms:      now.as_millis(),
            vehicle_id:   report.id.to_string(),
            lat:          report.position.lat,
            lon:          report.position.lon,
            speed_kmh:    report.speed_kmh,
            remaining_km: report.remaining_distance_km,
            eta_min:      report.eta_minutes,
            state:        report.state,
            stops_served: u32::try_from(report.stops_served).unwrap_or(u32::MAX),
            stops_total:  u32::try_from(report.stops_total).unwrap_or(u32::MAX),
        }
    }
}

/// How many vehicles were in each state at one poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PollSummaryRow {
    pub unix_ms:  i64,
    pub vehicles: u32,
    pub moving:   u32,
    pub dwelling: u32,
    pub arrived:  u32,
}

impl PollSummaryRow {
    pub fn from_reports(now: Timestamp, reports: &[VehicleReport]) -> Self {
        let mut row = PollSummaryRow { unix_ms: now.as_millis(), ..Default::default() };
        for r in reports {
            row.vehicles += 1;
            match r.state {
                VehicleStatus::Moving   => row.moving += 1,
                VehicleStatus::Dwelling => row.dwelling += 1,
                VehicleStatus::Arrived  => row.arrived += 1,
            }
        }
        row
    }
}
