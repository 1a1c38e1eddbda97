use beacon_core::BeaconError;
use thiserror::Error;

/// Errors that abort an aggregation before any chunk is dispatched.
///
/// Failures of individual chunks are never reported through this type, see
/// [`crate::worker::WorkerFailure`].
#[derive(Error, Debug)]
pub enum SplitQueryError {
    #[error(transparent)]
    Beacon(#[from] BeaconError),

    #[error("Failed to build the chunk worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("Can't set up chunk worker: {0}")]
    WorkerSetup(String),
}

pub type Result<T> = std::result::Result<T, SplitQueryError>;
