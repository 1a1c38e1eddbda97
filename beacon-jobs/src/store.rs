//! The job store boundary and the transition rules every store applies
//! atomically under its own lock.

use chrono::{DateTime, TimeDelta, Utc};
use log::{info, warn};
use serde_json::Value;

use crate::errors::{JobError, Result};
use crate::models::{JobRecord, JobStatus, JobTicket};

/// Result of trying to take ownership of a query.
#[derive(Debug, Clone, PartialEq)]
pub enum Claim {
    /// The caller owns the execution and must complete or release the ticket
    Acquired(JobTicket),
    /// Another execution holds a live claim
    InProgress(JobRecord),
    /// Already finished; serve the cached response
    Done(JobRecord),
}

/// Keyed persistence of [`JobRecord`]s.
///
/// `claim`, `complete` and `release` must each be atomic with respect to
/// every other call for the same query id, which is what guarantees a single
/// writer on the DONE transition.
pub trait JobStore: Send + Sync {
    fn get(&self, query_id: &str) -> Result<Option<JobRecord>>;

    fn claim(&self, query_id: &str, now: DateTime<Utc>, stale_after: TimeDelta) -> Result<Claim>;

    fn complete(&self, ticket: &JobTicket, response: Value, now: DateTime<Utc>)
    -> Result<JobRecord>;

    /// Drop a claim whose execution failed, so the next request starts afresh.
    fn release(&self, ticket: &JobTicket) -> Result<()>;
}

///
/// Decide a claim against the currently stored record.
///
/// # Returns
/// - the claim, and the record to persist if the store must be written
///
pub(crate) fn decide_claim(
    existing: Option<JobRecord>,
    query_id: &str,
    now: DateTime<Utc>,
    stale_after: TimeDelta,
) -> (Claim, Option<JobRecord>) {
    match existing {
        None => {
            info!("Job {} is NEW, starting execution", query_id);
            let record = JobRecord::running(query_id, now);
            (Claim::Acquired(record.ticket()), Some(record))
        }
        Some(record) if record.status == JobStatus::Done => (Claim::Done(record), None),
        Some(mut record) => {
            if now - record.claimed_at < stale_after {
                return (Claim::InProgress(record), None);
            }
            warn!(
                "Job {} has been RUNNING since {} (attempt {}), re-claiming as stale",
                query_id, record.claimed_at, record.attempt
            );
            record.attempt += 1;
            record.claimed_at = now;
            (Claim::Acquired(record.ticket()), Some(record))
        }
    }
}

///
/// Apply the RUNNING → DONE transition for `ticket`.
///
/// Fails with [`JobError::LostClaim`] unless the stored record is RUNNING under
/// the same attempt.
///
pub(crate) fn apply_complete(
    existing: Option<JobRecord>,
    ticket: &JobTicket,
    response: Value,
    now: DateTime<Utc>,
) -> Result<JobRecord> {
    let lost = || JobError::LostClaim {
        query_id: ticket.query_id.clone(),
        attempt: ticket.attempt,
    };
    let mut record = existing.ok_or_else(lost)?;
    if record.status != JobStatus::Running || record.attempt != ticket.attempt {
        return Err(lost());
    }

    let elapsed = (now - record.start_time).num_milliseconds() as f64 / 1000.0;
    record.status = JobStatus::Done;
    record.elapsed_time = Some(elapsed);
    record.cached_response = Some(response);
    info!("Job {} is DONE after {:.3}s", ticket.query_id, elapsed);
    Ok(record)
}

/// Whether `existing` is still owned by `ticket` and may be released.
pub(crate) fn owns(existing: Option<&JobRecord>, ticket: &JobTicket) -> bool {
    existing.is_some_and(|r| r.status == JobStatus::Running && r.attempt == ticket.attempt)
}

/// Query ids double as file names, so only a conservative alphabet is accepted.
pub fn validate_query_id(query_id: &str) -> Result<()> {
    let valid = !query_id.is_empty()
        && query_id.len() <= 128
        && !query_id.starts_with('.')
        && query_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if valid {
        Ok(())
    } else {
        Err(JobError::InvalidQueryId(query_id.to_string()))
    }
}
