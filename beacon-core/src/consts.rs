//! Defaults and environment variable names for [`crate::config::BeaconConfig`].

/// Largest span (in bases) of one chunk handed to a worker.
pub const DEFAULT_SPLIT_SIZE: u64 = 1_000_000;

/// Upper bound on chunk invocations in flight for one aggregation.
pub const DEFAULT_MAX_CONCURRENCY: usize = 64;

/// Largest number of chunks one region may be split into.
pub const DEFAULT_MAX_CHUNKS: u64 = 10_000;

/// Matches the execution limit of the remote workers.
pub const DEFAULT_WORKER_TIMEOUT_SECS: u64 = 900;

/// A RUNNING job whose claim is older than this may be re-claimed.
pub const DEFAULT_STALE_AFTER_SECS: u64 = 3600;

/// Job store folder under the home directory when nothing else is configured.
pub const DEFAULT_JOB_STORE_SUBFOLDER: &str = ".beacon/jobs";

// Environment variable names

/// Overrides [`DEFAULT_SPLIT_SIZE`].
pub const SPLIT_SIZE_ENV: &str = "BEACON_SPLIT_SIZE";

/// Overrides [`DEFAULT_MAX_CONCURRENCY`].
pub const MAX_CONCURRENCY_ENV: &str = "BEACON_MAX_CONCURRENCY";

/// Overrides [`DEFAULT_MAX_CHUNKS`].
pub const MAX_CHUNKS_ENV: &str = "BEACON_MAX_CHUNKS";

/// URL of the chunk worker endpoint.
pub const WORKER_URL_ENV: &str = "BEACON_WORKER_URL";

/// Overrides [`DEFAULT_WORKER_TIMEOUT_SECS`].
pub const WORKER_TIMEOUT_ENV: &str = "BEACON_WORKER_TIMEOUT";

/// Folder holding persisted job records.
///
/// # Example
///
/// ```bash
/// export BEACON_JOB_STORE=/var/lib/beacon/jobs
/// ```
pub const JOB_STORE_ENV: &str = "BEACON_JOB_STORE";

/// Overrides [`DEFAULT_STALE_AFTER_SECS`].
pub const STALE_AFTER_ENV: &str = "BEACON_STALE_AFTER";

/// Message attached to answers for queries that are still executing.
pub const QUERY_RUNNING_MESSAGE: &str = "Query still running.";
