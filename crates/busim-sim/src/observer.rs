//! Snapshot observer trait for report sinks.

use busim_core::Timestamp;

use crate::VehicleReport;

/// Callbacks invoked by [`Registry::poll`][crate::Registry::poll].
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
///
/// # Example: console printer
///
/// ```rust,ignore
/// struct Printer;
///
/// impl SnapshotObserver for Printer {
///     fn on_snapshot(&mut self, now: Timestamp, reports: &[VehicleReport]) {
///         for r in reports {
///             println!("{now} {} {} {:.2} km", r.id, r.state, r.remaining_distance_km);
///         }
///     }
/// }
/// ```
pub trait SnapshotObserver {
    /// Called after every vehicle has been advanced to `now`.
    fn on_snapshot(&mut self, _now: Timestamp, _reports: &[VehicleReport]) {}

    /// Called once when the caller is done polling.
    fn on_finish(&mut self) {}
}

/// A [`SnapshotObserver`] that does nothing.
pub struct NoopObserver;

impl SnapshotObserver for NoopObserver {}
