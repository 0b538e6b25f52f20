//! `ReportObserver<W>`: bridges `SnapshotObserver` to an `OutputWriter`.

use busim_core::Timestamp;
use busim_sim::{SnapshotObserver, VehicleReport};

use crate::row::{PollSummaryRow, ReportRow};
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

/// A [`SnapshotObserver`] that writes every polled snapshot to any
/// [`OutputWriter`] backend.
///
/// Errors from the writer are stored internally because `SnapshotObserver`
/// methods have no return value.  Once polling is done, call
/// [`on_finish`](SnapshotObserver::on_finish) and check for errors with
/// [`take_error`][Self::take_error].
pub struct ReportObserver<W: OutputWriter> {
    writer:     W,
    last_error: Option<OutputError>,
}

impl<W: OutputWriter> ReportObserver<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, last_error: None }
    }

    /// Take the stored write error, if any.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Unwrap the inner writer.
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> SnapshotObserver for ReportObserver<W> {
    fn on_snapshot(&mut self, now: Timestamp, reports: &[VehicleReport]) {
        if !reports.is_empty() {
            let rows: Vec<ReportRow> = reports.iter().map(|r| ReportRow::from_report(now, r)).collect();
            let result = self.writer.write_reports(&rows);
            self.store_err(result);
        }

        let result = self.writer.write_poll_summary(&PollSummaryRow::from_reports(now, reports));
        self.store_err(result);
    }

    fn on_finish(&mut self) {
        let result = self.writer.finish();
        self.store_err(result);
    }
}
