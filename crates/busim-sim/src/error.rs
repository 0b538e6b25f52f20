use busim_core::CoreError;
use thiserror::Error;

/// Errors from the sim crate.
///
/// Only configuration problems are errors here; collaborator failures
/// degrade the vehicle and unknown ids are no-ops.
#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type SimResult<T> = Result<T, SimError>;
