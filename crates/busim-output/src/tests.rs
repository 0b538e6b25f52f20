//! Integration tests for busim-output.

#[cfg(test)]
mod helpers {
    use busim_core::{GeoPoint, Timestamp, VehicleId};
    use busim_sim::{VehicleReport, VehicleStatus};

    use crate::ReportRow;

    pub const T0: Timestamp = Timestamp(1_700_000_000_000);

    pub fn report(id: &str, state: VehicleStatus) -> VehicleReport {
        VehicleReport {
            id:                    VehicleId::new(id),
            position:              GeoPoint::new(-33.4579, -70.6495),
            speed_kmh:             30.0,
            remaining_distance_km: 1.25,
            eta_minutes:           2.5,
            state,
            stops_total:           4,
            stops_served:          1,
        }
    }

    pub fn row(id: &str) -> ReportRow {
        ReportRow::from_report(T0, &report(id, VehicleStatus::Moving))
    }
}

// ── Rows ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod row_tests {
    use busim_sim::VehicleStatus;

    use super::helpers::{T0, report};
    use crate::{PollSummaryRow, ReportRow};

    #[test]
    fn report_row_flattens_position() {
        let row = ReportRow::from_report(T0, &report("bus-1", VehicleStatus::Dwelling));

        assert_eq!(row.unix_ms, T0.as_millis());
        assert_eq!(row.vehicle_id, "bus-1");
        assert_eq!((row.lat, row.lon), (-33.4579, -70.6495));
        assert_eq!(row.state, VehicleStatus::Dwelling);
        assert_eq!((row.stops_served, row.stops_total), (1, 4));
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn oversized_stop_counts_saturate() {
        let mut r = report("bus-1", VehicleStatus::Moving);
        r.stops_total = usize::MAX;

        let row = ReportRow::from_report(T0, &r);

        assert_eq!((row.stops_served, row.stops_total), (1, u32::MAX));
    }

    #[test]
    fn summary_counts_states() {
        let reports = [
            report("a", VehicleStatus::Moving),
            report("b", VehicleStatus::Dwelling),
            report("c", VehicleStatus::Moving),
            report("d", VehicleStatus::Arrived),
        ];

        let row = PollSummaryRow::from_reports(T0, &reports);

        assert_eq!(row, PollSummaryRow { unix_ms: T0.as_millis(), vehicles: 4, moving: 2, dwelling: 1, arrived: 1 });
    }

    #[test]
    fn summary_of_nothing_is_zero() {
        let row = PollSummaryRow::from_reports(T0, &[]);
        assert_eq!(row.vehicles, 0);
    }
}

// ── CSV ───────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod csv_tests {
    use tempfile::TempDir;

    use busim_core::{GeoPoint, SimParams};
    use busim_route::Route;
    use busim_sim::{Registry, SnapshotObserver};

    use super::helpers::{T0, row};
    use crate::csv::CsvWriter;
    use crate::row::PollSummaryRow;
    use crate::writer::OutputWriter;
    use crate::ReportObserver;

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    #[test]
    fn csv_files_created() {
        let dir = tmp();
        let _w = CsvWriter::new(dir.path()).unwrap();
        assert!(dir.path().join("vehicle_reports.csv").exists());
        assert!(dir.path().join("poll_summaries.csv").exists());
    }

    #[test]
    fn csv_headers_correct() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();

        let mut rdr = csv::Reader::from_path(dir.path().join("vehicle_reports.csv")).unwrap();
        let headers: Vec<_> = rdr.headers().unwrap().iter().map(str::to_owned).collect();
        assert_eq!(
            headers,
            [
                "unix_ms", "vehicle_id", "lat", "lon", "speed_kmh", "remaining_km", "eta_min", "state",
                "stops_served", "stops_total",
            ]
        );

        let mut rdr2 = csv::Reader::from_path(dir.path().join("poll_summaries.csv")).unwrap();
        let headers2: Vec<_> = rdr2.headers().unwrap().iter().map(str::to_owned).collect();
        assert_eq!(headers2, ["unix_ms", "vehicles", "moving", "dwelling", "arrived"]);
    }

    #[test]
    fn csv_reports_written() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_reports(&[row("a"), row("b")]).unwrap();
        w.finish().unwrap();

        let mut rdr = csv::Reader::from_path(dir.path().join("vehicle_reports.csv")).unwrap();
        let read_rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(read_rows.len(), 2);
        assert_eq!(&read_rows[0][0], "1700000000000"); // unix_ms
        assert_eq!(&read_rows[0][1], "a");
        assert_eq!(&read_rows[1][1], "b");
        assert_eq!(&read_rows[0][5], "1.2500");        // remaining_km
        assert_eq!(&read_rows[0][7], "moving");
    }

    #[test]
    fn csv_poll_summary_written() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        let summary = PollSummaryRow { unix_ms: 42, vehicles: 3, moving: 1, dwelling: 1, arrived: 1 };
        w.write_poll_summary(&summary).unwrap();
        w.finish().unwrap();

        let mut rdr = csv::Reader::from_path(dir.path().join("poll_summaries.csv")).unwrap();
        let read_rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(read_rows.len(), 1);
        assert_eq!(read_rows[0].iter().collect::<Vec<_>>(), ["42", "3", "1", "1", "1"]);
    }

    #[test]
    fn csv_finish_idempotent() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();
        w.finish().unwrap();
    }

    #[test]
    fn registry_polls_to_csv() {
        let dir = tmp();
        let params = SimParams { default_destination: GeoPoint::new(0.0, 0.01), ..SimParams::default() };
        let registry = Registry::new(params);
        let route = Route::new(vec![GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 0.01)]).unwrap();
        registry.start("routed", route.start(), 36.0, Some(route), None, T0);
        registry.start("direct", GeoPoint::new(0.0, 0.0), 36.0, None, None, T0);

        let mut obs = ReportObserver::new(CsvWriter::new(dir.path()).unwrap());
        for secs in [10.0, 25.0, 200.0] {
            registry.poll(T0.plus_secs(secs), &mut obs);
        }
        obs.on_finish();
        assert!(obs.take_error().is_none());

        let mut rdr = csv::Reader::from_path(dir.path().join("vehicle_reports.csv")).unwrap();
        let rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 6);
        // Sorted by id within each poll.
        assert_eq!(&rows[0][1], "direct");
        assert_eq!(&rows[1][1], "routed");
        assert_eq!(&rows[5][7], "arrived");

        let mut rdr = csv::Reader::from_path(dir.path().join("poll_summaries.csv")).unwrap();
        let summaries: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(summaries.len(), 3);
        assert_eq!(&summaries[2][4], "2"); // both arrived
    }
}

// ── Observer error handling ───────────────────────────────────────────────────

#[cfg(test)]
mod observer_tests {
    use busim_sim::{SnapshotObserver, VehicleStatus};

    use super::helpers::{T0, report};
    use crate::{OutputError, OutputResult, OutputWriter, PollSummaryRow, ReportObserver, ReportRow};

    /// Counts calls; fails every report batch.
    #[derive(Default)]
    struct Flaky {
        batches:   usize,
        summaries: usize,
        finished:  usize,
    }

    impl OutputWriter for Flaky {
        fn write_reports(&mut self, _rows: &[ReportRow]) -> OutputResult<()> {
            self.batches += 1;
            Err(OutputError::Io(std::io::Error::other(format!("disk full #{}", self.batches))))
        }

        fn write_poll_summary(&mut self, _row: &PollSummaryRow) -> OutputResult<()> {
            self.summaries += 1;
            Ok(())
        }

        fn finish(&mut self) -> OutputResult<()> {
            self.finished += 1;
            Ok(())
        }
    }

    #[test]
    fn first_error_is_kept() {
        let mut obs = ReportObserver::new(Flaky::default());
        let reports = [report("a", VehicleStatus::Moving)];

        obs.on_snapshot(T0, &reports);
        obs.on_snapshot(T0, &reports);

        let err = obs.take_error().unwrap();
        assert!(err.to_string().contains("disk full #1"));
        assert!(obs.take_error().is_none());
    }

    #[test]
    fn empty_snapshot_writes_only_summary() {
        let mut obs = ReportObserver::new(Flaky::default());

        obs.on_snapshot(T0, &[]);
        obs.on_finish();

        assert!(obs.take_error().is_none());
        let w = obs.into_writer();
        assert_eq!((w.batches, w.summaries, w.finished), (0, 1, 1));
    }
}

// ── SQLite ────────────────────────────────────────────────────────────────────

#[cfg(all(test, feature = "sqlite"))]
mod sqlite_tests {
    use tempfile::TempDir;

    use super::helpers::row;
    use crate::row::PollSummaryRow;
    use crate::sqlite::SqliteWriter;
    use crate::writer::OutputWriter;

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    #[test]
    fn sqlite_db_created() {
        let dir = tmp();
        let _w = SqliteWriter::new(dir.path()).unwrap();
        assert!(dir.path().join("output.db").exists());
    }

    #[test]
    fn sqlite_report_count() {
        let dir = tmp();
        let mut w = SqliteWriter::new(dir.path()).unwrap();
        w.write_reports(&[row("a"), row("b"), row("c")]).unwrap();
        w.finish().unwrap();

        let conn = rusqlite::Connection::open(dir.path().join("output.db")).unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM vehicle_reports", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 3);
    }

    #[test]
    fn sqlite_state_stored_as_text() {
        let dir = tmp();
        let mut w = SqliteWriter::new(dir.path()).unwrap();
        w.write_reports(&[row("a")]).unwrap();
        w.finish().unwrap();

        let conn = rusqlite::Connection::open(dir.path().join("output.db")).unwrap();
        let (id, state): (String, String) = conn
            .query_row("SELECT vehicle_id, state FROM vehicle_reports", [], |r| Ok((r.get(0)?, r.get(1)?)))
            .unwrap();
        assert_eq!(id, "a");
        assert_eq!(state, "moving");
    }

    #[test]
    fn sqlite_poll_summary() {
        let dir = tmp();
        let mut w = SqliteWriter::new(dir.path()).unwrap();
        w.write_poll_summary(&PollSummaryRow { unix_ms: 7, vehicles: 2, moving: 2, dwelling: 0, arrived: 0 })
            .unwrap();
        w.finish().unwrap();

        let conn = rusqlite::Connection::open(dir.path().join("output.db")).unwrap();
        let (ms, moving): (i64, i64) = conn
            .query_row("SELECT unix_ms, moving FROM poll_summaries", [], |r| Ok((r.get(0)?, r.get(1)?)))
            .unwrap();
        assert_eq!((ms, moving), (7, 2));
    }
}
