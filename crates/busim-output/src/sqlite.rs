//! SQLite output backend (feature `sqlite`).
//!
//! Creates a single `output.db` file in the configured output directory with
//! two tables: `vehicle_reports` and `poll_summaries`.

use std::path::Path;

use rusqlite::Connection;

use crate::writer::OutputWriter;
use crate::{OutputResult, PollSummaryRow, ReportRow};

/// Writes reports to an SQLite database.
pub struct SqliteWriter {
    conn:     Connection,
    finished: bool,
}

impl SqliteWriter {
    /// Open (or create) `output.db` in `dir` and initialise the schema.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let conn = Connection::open(dir.join("output.db"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous  = NORMAL;
             CREATE TABLE IF NOT EXISTS vehicle_reports (
                 unix_ms      INTEGER NOT NULL,
                 vehicle_id   TEXT    NOT NULL,
                 lat          REAL    NOT NULL,
                 lon          REAL    NOT NULL,
                 speed_kmh    REAL    NOT NULL,
                 remaining_km REAL    NOT NULL,
                 eta_min      REAL    NOT NULL,
                 state        TEXT    NOT NULL,
                 stops_served INTEGER NOT NULL,
                 stops_total  INTEGER NOT NULL
             );
             CREATE TABLE IF NOT EXISTS poll_summaries (
                 unix_ms  INTEGER NOT NULL,
                 vehicles INTEGER NOT NULL,
                 moving   INTEGER NOT NULL,
                 dwelling INTEGER NOT NULL,
                 arrived  INTEGER NOT NULL
             );",
        )?;

        Ok(Self { conn, finished: false })
    }
}

impl OutputWriter for SqliteWriter {
    fn write_reports(&mut self, rows: &[ReportRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO vehicle_reports \
                 (unix_ms, vehicle_id, lat, lon, speed_kmh, remaining_km, eta_min, state, stops_served, stops_total) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            )?;
            for row in rows {
                stmt.execute(rusqlite::params![
                    row.unix_ms,
                    row.vehicle_id,
                    row.lat,
                    row.lon,
                    row.speed_kmh,
                    row.remaining_km,
                    row.eta_min,
                    row.state.as_str(),
                    row.stops_served,
                    row.stops_total,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn write_poll_summary(&mut self, row: &PollSummaryRow) -> OutputResult<()> {
        self.conn.execute(
            "INSERT INTO poll_summaries (unix_ms, vehicles, moving, dwelling, arrived) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![row.unix_ms, row.vehicles, row.moving, row.dwelling, row.arrived],
        )?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    }
}
