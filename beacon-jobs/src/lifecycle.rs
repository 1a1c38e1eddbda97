//! The job state machine seen by request handlers.
//!
//! ```text
//! NEW --claim--> RUNNING --complete--> DONE
//!                   |  ^
//!   execution error |  | stale claim re-acquired
//!                   v  |
//!                  NEW-+
//! ```

use std::panic::{AssertUnwindSafe, catch_unwind, resume_unwind};

use chrono::{TimeDelta, Utc};
use log::{info, warn};
use serde_json::Value;

use beacon_core::{BeaconConfig, BeaconError};

use crate::errors::{JobError, Result};
use crate::models::{JobRecord, JobStatus, JobTicket};
use crate::store::{Claim, JobStore, validate_query_id};

/// What a request for a query id ended up doing.
#[derive(Debug, Clone, PartialEq)]
pub enum JobOutcome {
    /// This request ran the query; the record is DONE
    Completed(JobRecord),
    /// Another request is running it; nothing was executed
    InProgress(JobRecord),
    /// Finished earlier; the record carries the cached response
    Cached(JobRecord),
}

impl JobOutcome {
    pub fn record(&self) -> &JobRecord {
        match self {
            JobOutcome::Completed(r) | JobOutcome::InProgress(r) | JobOutcome::Cached(r) => r,
        }
    }

    pub fn status(&self) -> JobStatus {
        self.record().status
    }

    /// The final response, absent while the query is still running.
    pub fn response(&self) -> Option<&Value> {
        self.record().cached_response.as_ref()
    }
}

/// Runs each query id at most once and serves repeated requests from the store.
pub struct JobManager<S: JobStore> {
    store: S,
    stale_after: TimeDelta,
}

impl<S: JobStore> JobManager<S> {
    pub fn new(store: S, config: &BeaconConfig) -> Self {
        let secs = i64::try_from(config.stale_after_secs).unwrap_or(i64::MAX);
        let stale_after = TimeDelta::try_seconds(secs).unwrap_or(TimeDelta::MAX);
        JobManager::with_stale_after(store, stale_after)
    }

    pub fn with_stale_after(store: S, stale_after: TimeDelta) -> Self {
        JobManager { store, stale_after }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Current state; an unknown query id is NEW.
    pub fn status(&self, query_id: &str) -> Result<JobStatus> {
        validate_query_id(query_id)?;
        Ok(self
            .store
            .get(query_id)?
            .map_or(JobStatus::New, |record| record.status))
    }

    /// Fetch the record of a submitted query.
    pub fn poll(&self, query_id: &str) -> Result<JobRecord> {
        validate_query_id(query_id)?;
        self.store
            .get(query_id)?
            .ok_or_else(|| BeaconError::JobNotFound(query_id.to_string()).into())
    }

    ///
    /// Run `execute` for `query_id` unless it is already running or done.
    ///
    /// Only the request that claims the job executes; if `execute` fails or
    /// panics the claim is released, leaving the job NEW, and the error (or
    /// panic) is passed on to the caller.
    ///
    pub fn run<F, E>(&self, query_id: &str, execute: F) -> std::result::Result<JobOutcome, E>
    where
        F: FnOnce() -> std::result::Result<Value, E>,
        E: From<JobError>,
    {
        validate_query_id(query_id)?;
        let ticket = match self.store.claim(query_id, Utc::now(), self.stale_after)? {
            Claim::Acquired(ticket) => ticket,
            Claim::InProgress(record) => {
                info!("Job {} is still RUNNING", query_id);
                return Ok(JobOutcome::InProgress(record));
            }
            Claim::Done(record) => {
                info!("Job {} is DONE, serving cached response", query_id);
                return Ok(JobOutcome::Cached(record));
            }
        };

        let response = match catch_unwind(AssertUnwindSafe(execute)) {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                self.release(&ticket);
                return Err(e);
            }
            Err(panic) => {
                warn!("Job {} panicked while executing", query_id);
                self.release(&ticket);
                resume_unwind(panic);
            }
        };

        let record = self.store.complete(&ticket, response, Utc::now())?;
        Ok(JobOutcome::Completed(record))
    }

    fn release(&self, ticket: &JobTicket) {
        if let Err(e) = self.store.release(ticket) {
            warn!("Failed to release job {}: {}", ticket.query_id, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryJobStore;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn manager() -> JobManager<MemoryJobStore> {
        JobManager::with_stale_after(MemoryJobStore::new(), TimeDelta::seconds(3600))
    }

    #[test]
    fn test_unknown_job_is_new_and_not_found() {
        let jobs = manager();
        assert_eq!(jobs.status("Q1").unwrap(), JobStatus::New);
        assert!(matches!(
            jobs.poll("Q1"),
            Err(JobError::Beacon(BeaconError::JobNotFound(id))) if id == "Q1"
        ));
    }

    #[test]
    fn test_run_then_cached() {
        let jobs = manager();
        let first = jobs
            .run("Q1", || Ok::<_, JobError>(json!({"exists": true})))
            .unwrap();
        assert!(matches!(first, JobOutcome::Completed(_)));
        assert_eq!(first.status(), JobStatus::Done);
        assert!(first.record().elapsed_time.is_some());

        let second = jobs
            .run("Q1", || -> std::result::Result<Value, JobError> {
                panic!("must not execute twice")
            })
            .unwrap();
        assert!(matches!(second, JobOutcome::Cached(_)));
        assert_eq!(second.response(), Some(&json!({"exists": true})));
        assert_eq!(jobs.status("Q1").unwrap(), JobStatus::Done);
    }

    #[test]
    fn test_failed_execution_leaves_job_new() {
        let jobs = manager();
        let err = jobs
            .run("Q1", || {
                Err::<Value, JobError>(BeaconError::InvalidConfiguration("boom".into()).into())
            })
            .unwrap_err();
        assert!(matches!(err, JobError::Beacon(_)));
        assert_eq!(jobs.status("Q1").unwrap(), JobStatus::New);

        let retry = jobs.run("Q1", || Ok::<_, JobError>(json!({}))).unwrap();
        assert!(matches!(retry, JobOutcome::Completed(_)));
    }

    #[test]
    fn test_panicking_execution_releases_claim() {
        let jobs = manager();
        let panicked = std::panic::catch_unwind(AssertUnwindSafe(|| {
            jobs.run("Q1", || -> std::result::Result<Value, JobError> {
                panic!("merge overflow")
            })
        }));
        assert!(panicked.is_err());
        assert_eq!(jobs.status("Q1").unwrap(), JobStatus::New);

        let retry = jobs.run("Q1", || Ok::<_, JobError>(json!({}))).unwrap();
        assert!(matches!(retry, JobOutcome::Completed(_)));
    }

    #[test]
    fn test_invalid_query_id_is_rejected_before_claim() {
        let jobs = manager();
        let err = jobs
            .run("../x", || Ok::<_, JobError>(json!({})))
            .unwrap_err();
        assert!(matches!(err, JobError::InvalidQueryId(_)));
    }

    #[test]
    fn test_stale_running_job_is_rerun() {
        let store = MemoryJobStore::new();
        let stale_at = Utc::now() - TimeDelta::seconds(10);
        store
            .claim("Q1", stale_at, TimeDelta::seconds(5))
            .unwrap();

        let jobs = JobManager::with_stale_after(store, TimeDelta::seconds(5));
        let outcome = jobs.run("Q1", || Ok::<_, JobError>(json!({"exists": false}))).unwrap();
        let JobOutcome::Completed(record) = outcome else {
            panic!("stale job must be re-run");
        };
        assert_eq!(record.attempt, 2);
    }
}
