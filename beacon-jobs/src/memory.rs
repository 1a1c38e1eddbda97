use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, TimeDelta, Utc};
use serde_json::Value;

use crate::errors::Result;
use crate::models::{JobRecord, JobTicket};
use crate::store::{Claim, JobStore, apply_complete, decide_claim, owns};

/// Process-local job store; every transition runs under one mutex.
#[derive(Debug, Default)]
pub struct MemoryJobStore {
    records: Mutex<HashMap<String, JobRecord>>,
}

impl MemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, JobRecord>> {
        // a panic while holding the lock cannot leave a half-written record
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl JobStore for MemoryJobStore {
    fn get(&self, query_id: &str) -> Result<Option<JobRecord>> {
        Ok(self.lock().get(query_id).cloned())
    }

    fn claim(&self, query_id: &str, now: DateTime<Utc>, stale_after: TimeDelta) -> Result<Claim> {
        let mut records = self.lock();
        let (claim, write) = decide_claim(records.get(query_id).cloned(), query_id, now, stale_after);
        if let Some(record) = write {
            records.insert(query_id.to_string(), record);
        }
        Ok(claim)
    }

    fn complete(
        &self,
        ticket: &JobTicket,
        response: Value,
        now: DateTime<Utc>,
    ) -> Result<JobRecord> {
        let mut records = self.lock();
        let done = apply_complete(records.get(&ticket.query_id).cloned(), ticket, response, now)?;
        records.insert(ticket.query_id.clone(), done.clone());
        Ok(done)
    }

    fn release(&self, ticket: &JobTicket) -> Result<()> {
        let mut records = self.lock();
        if owns(records.get(&ticket.query_id), ticket) {
            records.remove(&ticket.query_id);
        }
        Ok(())
    }
}
