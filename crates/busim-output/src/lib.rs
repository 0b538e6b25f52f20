//! `busim-output`: writers that persist registry snapshots.
//!
//! | Feature   | Backend | Files created                                   |
//! |-----------|---------|-------------------------------------------------|
//! | *(none)*  | CSV     | `vehicle_reports.csv`, `poll_summaries.csv`     |
//! | `sqlite`  | SQLite  | `output.db`                                     |
//!
//! All backends implement [`OutputWriter`] and are driven by
//! [`ReportObserver`], which implements `busim_sim::SnapshotObserver`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use busim_output::{CsvWriter, ReportObserver};
//!
//! let writer = CsvWriter::new(Path::new("./output"))?;
//! let mut obs = ReportObserver::new(writer);
//! registry.poll(Timestamp::now(), &mut obs);
//! obs.on_finish();
//! if let Some(e) = obs.take_error() {
//!     log::error!("output error: {e}");
//! }
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(test)]
mod tests;

pub use csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use observer::ReportObserver;
pub use row::{PollSummaryRow, ReportRow};
pub use writer::OutputWriter;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteWriter;
