//! Tracks every top-level query as a job so that repeated polls observe a
//! consistent NEW → RUNNING → DONE lifecycle and the query runs at most once.
pub mod errors;
pub mod file;
pub mod lifecycle;
pub mod memory;
pub mod models;
pub mod store;

pub use errors::{JobError, Result};
pub use file::FileJobStore;
pub use lifecycle::{JobManager, JobOutcome};
pub use memory::MemoryJobStore;
pub use models::{JobRecord, JobStatus, JobTicket};
pub use store::{Claim, JobStore};
