use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum JobStatus {
    /// Never seen; nothing is persisted in this state
    New,
    Running,
    Done,
}

/// Persisted state of one query.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JobRecord {
    pub query_id: String,
    pub status: JobStatus,
    /// First receipt of the query
    pub start_time: DateTime<Utc>,
    /// When the current execution claimed the job
    pub claimed_at: DateTime<Utc>,
    /// Bumped on every claim; a ticket is only valid for its own attempt
    pub attempt: u32,
    /// Seconds between `start_time` and completion
    pub elapsed_time: Option<f64>,
    pub cached_response: Option<Value>,
}

impl JobRecord {
    pub fn running(query_id: &str, now: DateTime<Utc>) -> Self {
        JobRecord {
            query_id: query_id.to_string(),
            status: JobStatus::Running,
            start_time: now,
            claimed_at: now,
            attempt: 1,
            elapsed_time: None,
            cached_response: None,
        }
    }

    pub fn is_done(&self) -> bool {
        self.status == JobStatus::Done
    }

    pub fn ticket(&self) -> JobTicket {
        JobTicket {
            query_id: self.query_id.clone(),
            attempt: self.attempt,
        }
    }
}

/// Proof of ownership of a RUNNING job, handed to the one execution allowed
/// to complete it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobTicket {
    pub query_id: String,
    pub attempt: u32,
}
