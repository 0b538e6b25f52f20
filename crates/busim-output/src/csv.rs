//! CSV output backend.
//!
//! Creates two files in the configured output directory:
//! - `vehicle_reports.csv`
//! - `poll_summaries.csv`

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::writer::OutputWriter;
use crate::{OutputResult, PollSummaryRow, ReportRow};

/// Writes reports to two CSV files.
pub struct CsvWriter {
    reports:   Writer<File>,
    summaries: Writer<File>,
    finished:  bool,
}

impl CsvWriter {
    /// Create the two CSV files in `dir` and write the header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut reports = Writer::from_path(dir.join("vehicle_reports.csv"))?;
        reports.write_record([
            "unix_ms",
            "vehicle_id",
            "lat",
            "lon",
            "speed_kmh",
            "remaining_km",
            "eta_min",
            "state",
            "stops_served",
            "stops_total",
        ])?;

        let mut summaries = Writer::from_path(dir.join("poll_summaries.csv"))?;
        summaries.write_record(["unix_ms", "vehicles", "moving", "dwelling", "arrived"])?;

        Ok(Self { reports, summaries, finished: false })
    }
}

impl OutputWriter for CsvWriter {
    fn write_reports(&mut self, rows: &[ReportRow]) -> OutputResult<()> {
        for row in rows {
            self.reports.write_record(&[
                row.unix_ms.to_string(),
                row.vehicle_id.clone(),
                row.lat.to_string(),
                row.lon.to_string(),
                format!("{:.3}", row.speed_kmh),
                format!("{:.4}", row.remaining_km),
                format!("{:.2}", row.eta_min),
                row.state.as_str().to_owned(),
                row.stops_served.to_string(),
                row.stops_total.to_string(),
            ])?;
        }
        Ok(())
    }

    fn write_poll_summary(&mut self, row: &PollSummaryRow) -> OutputResult<()> {
        self.summaries.write_record(&[
            row.unix_ms.to_string(),
            row.vehicles.to_string(),
            row.moving.to_string(),
            row.dwelling.to_string(),
            row.arrived.to_string(),
        ])?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.reports.flush()?;
        self.summaries.flush()?;
        Ok(())
    }
}
