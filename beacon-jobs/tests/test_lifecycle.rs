//! Concurrent requests for the same query id, against both job stores.

use std::sync::Barrier;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use beacon_jobs::{
    FileJobStore, JobError, JobManager, JobOutcome, JobStatus, JobStore, MemoryJobStore,
};
use chrono::TimeDelta;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

const THREADS: usize = 8;

fn race<S: JobStore>(jobs: &JobManager<S>) -> (usize, Vec<JobOutcome>) {
    let executions = AtomicUsize::new(0);
    let barrier = Barrier::new(THREADS);

    let outcomes = thread::scope(|scope| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                scope.spawn(|| {
                    barrier.wait();
                    jobs.run("Q1", || -> Result<Value, JobError> {
                        executions.fetch_add(1, Ordering::SeqCst);
                        thread::sleep(Duration::from_millis(200));
                        Ok(json!({"exists": true, "numTotalResults": 4}))
                    })
                    .unwrap()
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .collect::<Vec<_>>()
    });

    (executions.load(Ordering::SeqCst), outcomes)
}

fn check_single_execution<S: JobStore>(jobs: JobManager<S>) {
    let (executions, outcomes) = race(&jobs);
    assert_eq!(executions, 1);

    let completed = outcomes
        .iter()
        .filter(|o| matches!(o, JobOutcome::Completed(_)))
        .count();
    assert_eq!(completed, 1);
    for outcome in &outcomes {
        match outcome {
            JobOutcome::Completed(_) | JobOutcome::Cached(_) => {
                assert_eq!(outcome.status(), JobStatus::Done);
            }
            JobOutcome::InProgress(record) => {
                assert_eq!(record.status, JobStatus::Running);
                assert_eq!(outcome.response(), None);
            }
        }
    }

    // every later poll sees the one final state
    let record = jobs.poll("Q1").unwrap();
    assert_eq!(record.status, JobStatus::Done);
    assert_eq!(
        record.cached_response,
        Some(json!({"exists": true, "numTotalResults": 4}))
    );
    let again = jobs
        .run("Q1", || -> Result<Value, JobError> { panic!("already done") })
        .unwrap();
    assert!(matches!(again, JobOutcome::Cached(_)));
}

#[test]
fn test_concurrent_requests_execute_once_in_memory() {
    check_single_execution(JobManager::with_stale_after(
        MemoryJobStore::new(),
        TimeDelta::seconds(3600),
    ));
}

#[test]
fn test_concurrent_requests_execute_once_on_disk() {
    let tempdir = tempfile::tempdir().unwrap();
    let store = FileJobStore::open(tempdir.path()).unwrap();
    check_single_execution(JobManager::with_stale_after(store, TimeDelta::seconds(3600)));
}

#[test]
fn test_two_stores_on_one_folder_share_state() {
    let tempdir = tempfile::tempdir().unwrap();
    let first = JobManager::with_stale_after(
        FileJobStore::open(tempdir.path()).unwrap(),
        TimeDelta::seconds(3600),
    );
    let second = JobManager::with_stale_after(
        FileJobStore::open(tempdir.path()).unwrap(),
        TimeDelta::seconds(3600),
    );

    first
        .run("Q7", || Ok::<_, JobError>(json!({"exists": false})))
        .unwrap();
    let outcome = second
        .run("Q7", || -> Result<Value, JobError> { panic!("served by the other store") })
        .unwrap();
    assert_eq!(outcome.response(), Some(&json!({"exists": false})));
}
