//! Job store keeping one JSON file per query in a folder, shared safely
//! between processes through an advisory lock on the folder.

use std::fs::{self, File, OpenOptions, create_dir_all};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeDelta, Utc};
use fs2::FileExt;
use serde_json::Value;

use crate::errors::{JobError, Result};
use crate::models::{JobRecord, JobTicket};
use crate::store::{Claim, JobStore, apply_complete, decide_claim, owns, validate_query_id};

const LOCK_FILE: &str = ".lock";
const RECORD_EXT: &str = "json";

/// Holds the folder lock until dropped.
struct FolderLock(File);

impl Drop for FolderLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.0);
    }
}

///
/// Job records stored as `<folder>/<query_id>.json`.
///
/// # Examples
///
/// ```rust,no_run
/// use beacon_jobs::FileJobStore;
///
/// # fn main() -> beacon_jobs::Result<()> {
/// let store = FileJobStore::open("/var/lib/beacon/jobs")?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct FileJobStore {
    folder: PathBuf,
}

impl FileJobStore {
    /// Open (creating if needed) a store rooted at `folder`.
    pub fn open<P: AsRef<Path>>(folder: P) -> Result<Self> {
        let folder = folder.as_ref().to_path_buf();
        create_dir_all(&folder)?;
        Ok(FileJobStore { folder })
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// Only validated ids are joined into the folder.
    fn record_path(&self, query_id: &str) -> Result<PathBuf> {
        validate_query_id(query_id)?;
        Ok(self.folder.join(format!("{}.{}", query_id, RECORD_EXT)))
    }

    fn lock(&self) -> Result<FolderLock> {
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.folder.join(LOCK_FILE))?;
        file.lock_exclusive()?;
        Ok(FolderLock(file))
    }

    fn read(&self, query_id: &str) -> Result<Option<JobRecord>> {
        let raw = match fs::read_to_string(self.record_path(query_id)?) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| JobError::CorruptedRecord(query_id.to_string(), e))
    }

    /// Write through a temporary file so readers never see a partial record.
    fn write(&self, record: &JobRecord) -> Result<()> {
        let path = self.record_path(&record.query_id)?;
        let tmp_path = path.with_extension("json.tmp");
        let raw = serde_json::to_vec_pretty(record)
            .map_err(|e| JobError::CorruptedRecord(record.query_id.clone(), e))?;

        let mut tmp = File::create(&tmp_path)?;
        tmp.write_all(&raw)?;
        tmp.sync_all()?;
        fs::rename(&tmp_path, &path)?;
        Ok(())
    }
}

impl JobStore for FileJobStore {
    fn get(&self, query_id: &str) -> Result<Option<JobRecord>> {
        let _guard = self.lock()?;
        self.read(query_id)
    }

    fn claim(&self, query_id: &str, now: DateTime<Utc>, stale_after: TimeDelta) -> Result<Claim> {
        let _guard = self.lock()?;
        let (claim, write) = decide_claim(self.read(query_id)?, query_id, now, stale_after);
        if let Some(record) = write {
            self.write(&record)?;
        }
        Ok(claim)
    }

    fn complete(
        &self,
        ticket: &JobTicket,
        response: Value,
        now: DateTime<Utc>,
    ) -> Result<JobRecord> {
        let _guard = self.lock()?;
        let done = apply_complete(self.read(&ticket.query_id)?, ticket, response, now)?;
        self.write(&done)?;
        Ok(done)
    }

    fn release(&self, ticket: &JobTicket) -> Result<()> {
        let _guard = self.lock()?;
        if owns(self.read(&ticket.query_id)?.as_ref(), ticket) {
            fs::remove_file(self.record_path(&ticket.query_id)?)?;
        }
        Ok(())
    }
}
