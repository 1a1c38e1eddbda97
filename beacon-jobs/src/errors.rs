use beacon_core::BeaconError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum JobError {
    #[error(transparent)]
    Beacon(#[from] BeaconError),

    #[error("Invalid query id: {0:?}")]
    InvalidQueryId(String),

    /// The ticket no longer owns the job: it was re-claimed as stale, or the
    /// job is already DONE.
    #[error("Lost claim on job {query_id} (attempt {attempt})")]
    LostClaim { query_id: String, attempt: u32 },

    #[error("Corrupted job record {0}: {1}")]
    CorruptedRecord(String, serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, JobError>;
