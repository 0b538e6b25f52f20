//! The `OutputWriter` trait implemented by all backend writers.

use crate::{OutputResult, PollSummaryRow, ReportRow};

/// Trait implemented by the CSV and SQLite writers.
///
/// Errors are returned here but stored by [`ReportObserver`][crate::ReportObserver],
/// whose hooks cannot fail; retrieve them with
/// [`take_error`][crate::ReportObserver::take_error].
pub trait OutputWriter {
    /// Write one row per vehicle from a single snapshot.
    fn write_reports(&mut self, rows: &[ReportRow]) -> OutputResult<()>;

    /// Write the per-poll state counts.
    fn write_poll_summary(&mut self, row: &PollSummaryRow) -> OutputResult<()>;

    /// Flush and close all underlying handles.  Safe to call more than once.
    fn finish(&mut self) -> OutputResult<()>;
}
